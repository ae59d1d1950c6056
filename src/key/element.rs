//! Key Element Module
//!
//! The primitive kinds a cache key may be built from, and their canonical
//! string formatting.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

// == Key Element ==
/// A single component of a [`CacheKey`](super::CacheKey).
#[derive(Debug, Clone, PartialEq)]
pub enum KeyElement {
    /// Absent value, formats as an empty string
    Null,
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Float32(f32),
    Bool(bool),
    Char(char),
    Duration(Duration),
    /// Date/time without zone information
    DateTime(NaiveDateTime),
    /// Date/time carrying a zone offset
    DateTimeOffset(DateTime<FixedOffset>),
}

impl KeyElement {
    /// Falls back to the value's `Display` output for kinds without a
    /// dedicated variant.
    pub fn display<T: fmt::Display>(value: T) -> Self {
        KeyElement::Text(value.to_string())
    }

    // == Format ==
    /// Returns the canonical string form of this element.
    pub fn format(&self) -> String {
        match self {
            KeyElement::Null => String::new(),
            KeyElement::Text(s) => s.clone(),
            KeyElement::Int(v) => v.to_string(),
            KeyElement::UInt(v) => v.to_string(),
            KeyElement::Float(v) => format_float(v.to_string(), format!("{v:E}"), 15),
            KeyElement::Float32(v) => format_float(v.to_string(), format!("{v:E}"), 7),
            KeyElement::Bool(v) => v.to_string(),
            KeyElement::Char(c) => c.to_string(),
            KeyElement::Duration(d) => format_duration(d),
            KeyElement::DateTime(dt) => format_date_time(dt),
            KeyElement::DateTimeOffset(dt) => {
                let local = dt.naive_local();
                if local.time() == NaiveTime::MIN {
                    format!("{}({})", local.format("%Y-%m-%d"), dt.format("%:z"))
                } else {
                    format!("{}{}", round_trip(&local), dt.format("%:z"))
                }
            }
        }
    }
}

impl fmt::Display for KeyElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Shortest round-trip digits, switching to `1E+21` / `1E-05` notation when
/// the decimal exponent falls outside `-4..max_exponent`.
fn format_float(plain: String, scientific: String, max_exponent: i32) -> String {
    match plain.as_str() {
        "inf" => return "Infinity".to_string(),
        "-inf" => return "-Infinity".to_string(),
        _ => {}
    }
    let Some((mantissa, exponent)) = scientific.split_once('E') else {
        return plain;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return plain;
    };
    if (-4..max_exponent).contains(&exponent) {
        return plain;
    }
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}E{sign}{:02}", exponent.abs())
}

/// `yyyy-MM-ddTHH:mm:ss.fffffff`, seven fractional digits (100ns ticks).
fn round_trip(dt: &NaiveDateTime) -> String {
    let ticks = (dt.nanosecond() % 1_000_000_000) / 100;
    format!("{}.{:07}", dt.format("%Y-%m-%dT%H:%M:%S"), ticks)
}

fn format_date_time(dt: &NaiveDateTime) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        round_trip(dt)
    }
}

/// `[-][d.]hh:mm:ss[.fffffff]`
fn format_duration(d: &Duration) -> String {
    let negative = *d < Duration::zero();
    let abs = if negative { -*d } else { *d };
    let secs = abs.num_seconds();
    let ticks = abs.subsec_nanos() / 100;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    let days = secs / 86_400;
    if days > 0 {
        out.push_str(&format!("{days}."));
    }
    out.push_str(&format!(
        "{:02}:{:02}:{:02}",
        (secs % 86_400) / 3_600,
        (secs % 3_600) / 60,
        secs % 60
    ));
    if ticks > 0 {
        out.push_str(&format!(".{ticks:07}"));
    }
    out
}

// == Conversions ==
macro_rules! impl_from {
    ($variant:ident, $target:ty; $($source:ty),*) => {
        $(
            impl From<$source> for KeyElement {
                fn from(value: $source) -> Self {
                    KeyElement::$variant(value as $target)
                }
            }
        )*
    };
}

impl_from!(Int, i64; i8, i16, i32, i64, isize);
impl_from!(UInt, u64; u8, u16, u32, u64, usize);

impl From<f64> for KeyElement {
    fn from(value: f64) -> Self {
        KeyElement::Float(value)
    }
}

impl From<f32> for KeyElement {
    fn from(value: f32) -> Self {
        KeyElement::Float32(value)
    }
}

impl From<bool> for KeyElement {
    fn from(value: bool) -> Self {
        KeyElement::Bool(value)
    }
}

impl From<char> for KeyElement {
    fn from(value: char) -> Self {
        KeyElement::Char(value)
    }
}

impl From<&str> for KeyElement {
    fn from(value: &str) -> Self {
        KeyElement::Text(value.to_string())
    }
}

impl From<String> for KeyElement {
    fn from(value: String) -> Self {
        KeyElement::Text(value)
    }
}

impl From<Duration> for KeyElement {
    fn from(value: Duration) -> Self {
        KeyElement::Duration(value)
    }
}

impl From<NaiveDate> for KeyElement {
    fn from(value: NaiveDate) -> Self {
        KeyElement::DateTime(value.and_time(NaiveTime::MIN))
    }
}

impl From<NaiveDateTime> for KeyElement {
    fn from(value: NaiveDateTime) -> Self {
        KeyElement::DateTime(value)
    }
}

impl From<DateTime<FixedOffset>> for KeyElement {
    fn from(value: DateTime<FixedOffset>) -> Self {
        KeyElement::DateTimeOffset(value)
    }
}

impl From<DateTime<Utc>> for KeyElement {
    fn from(value: DateTime<Utc>) -> Self {
        KeyElement::DateTimeOffset(value.fixed_offset())
    }
}

impl<T: Into<KeyElement>> From<Option<T>> for KeyElement {
    fn from(value: Option<T>) -> Self {
        value.map_or(KeyElement::Null, Into::into)
    }
}
