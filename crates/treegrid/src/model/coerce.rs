//! Coercion of written values to a slot's declared type.
//!
//! [`coerce`] is permissive: when no conversion applies it hands back the
//! original value, and the slot decides whether to store it.
//!
//! Rules, first match wins:
//!
//! 1. null becomes null for nullable targets, otherwise the target's default
//! 2. values that already fit pass through
//! 3. nullable targets are unwrapped
//! 4. enums parse from text (case-insensitive) or take a numeric ordinal
//! 5. uuids, date/times and durations parse from text
//! 6. generic numeric/text/char/bool conversion
//! 7. anything else is returned unchanged

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use uuid::Uuid;

use treegrid_core::logging::targets;

use super::reflect::TypeDesc;
use super::value::Value;

/// Convert `value` to `target`, or return it unchanged.
///
/// ```
/// use treegrid::model::{coerce, TypeDesc, Value};
///
/// assert_eq!(coerce(Value::from("5"), &TypeDesc::Int), Value::Int(5));
/// assert_eq!(coerce(Value::Null, &TypeDesc::Int), Value::Int(0));
/// assert_eq!(coerce(Value::from("five"), &TypeDesc::Int), Value::from("five"));
/// ```
pub fn coerce(value: Value, target: &TypeDesc) -> Value {
    if value.is_null() {
        return if target.is_nullable() {
            Value::Null
        } else {
            target.default_value()
        };
    }

    if target.accepts(&value) {
        return value;
    }

    if let TypeDesc::Nullable(inner) = target {
        return coerce(value, inner);
    }

    let converted = match target {
        TypeDesc::Enum(descriptor) => match &value {
            Value::Text(text) => descriptor.parse(text).map(|o| Value::Enum(descriptor.value(o))),
            other => ordinal_of(other).map(|o| Value::Enum(descriptor.value(o))),
        },
        TypeDesc::Uuid => value
            .as_str()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(Value::Uuid),
        TypeDesc::DateTime => match &value {
            Value::Text(text) => parse_datetime(text).map(Value::DateTime),
            Value::Date(date) => Some(Value::DateTime(date.and_time(NaiveTime::MIN))),
            _ => None,
        },
        TypeDesc::Duration => value.as_str().and_then(parse_duration).map(Value::Duration),
        _ => convert(&value, target),
    };

    match converted {
        Some(converted) => converted,
        None => {
            tracing::trace!(
                target: targets::ACCESSOR,
                from = %value.type_name(),
                to = %target,
                "no conversion, keeping original value"
            );
            value
        }
    }
}

/// Integer reading of a value for enum ordinals and numeric targets.
fn ordinal_of(value: &Value) -> Option<i64> {
    match value {
        Value::Int(n) => Some(*n),
        Value::UInt(n) => i64::try_from(*n).ok(),
        Value::Float(x) => float_to_i64(*x),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Char(c) => Some(i64::from(u32::from(*c))),
        Value::Enum(e) => Some(e.ordinal),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Round half to even, rejecting values outside `i64`.
fn float_to_i64(x: f64) -> Option<i64> {
    let rounded = x.round_ties_even();
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}

fn convert(value: &Value, target: &TypeDesc) -> Option<Value> {
    match target {
        TypeDesc::Text => {
            (value.is_leaf() && !value.is_sentinel()).then(|| Value::Text(value.to_string()))
        }
        TypeDesc::Bool => match value {
            Value::Text(s) => match s.trim() {
                t if t.eq_ignore_ascii_case("true") => Some(Value::Bool(true)),
                t if t.eq_ignore_ascii_case("false") => Some(Value::Bool(false)),
                _ => None,
            },
            Value::Int(n) => Some(Value::Bool(*n != 0)),
            Value::UInt(n) => Some(Value::Bool(*n != 0)),
            Value::Float(x) => Some(Value::Bool(*x != 0.0)),
            _ => None,
        },
        TypeDesc::Int => ordinal_of(value).map(Value::Int),
        TypeDesc::UInt => match value {
            Value::UInt(n) => Some(Value::UInt(*n)),
            Value::Text(s) => s.trim().parse().ok().map(Value::UInt),
            other => ordinal_of(other)
                .and_then(|n| u64::try_from(n).ok())
                .map(Value::UInt),
        },
        TypeDesc::Float => match value {
            Value::Text(s) => s.trim().parse().ok().map(Value::Float),
            Value::Int(n) => Some(Value::Float(*n as f64)),
            Value::UInt(n) => Some(Value::Float(*n as f64)),
            Value::Bool(b) => Some(Value::Float(if *b { 1.0 } else { 0.0 })),
            _ => None,
        },
        TypeDesc::Char => match value {
            Value::Text(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Value::Char(c)),
                    _ => None,
                }
            }
            Value::Int(_) | Value::UInt(_) => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .and_then(char::from_u32)
                .map(Value::Char),
            _ => None,
        },
        TypeDesc::Date => match value {
            Value::Text(s) => parse_date(s).map(Value::Date),
            Value::DateTime(dt) => Some(Value::Date(dt.date())),
            _ => None,
        },
        TypeDesc::Time => match value {
            Value::Text(s) => parse_time(s).map(Value::Time),
            Value::DateTime(dt) => Some(Value::Time(dt.time())),
            _ => None,
        },
        _ => None,
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a date/time in ISO-8601, RFC 3339 or `MM/DD/YYYY` form.
///
/// A bare date parses as midnight. An RFC 3339 offset is dropped, keeping
/// the wall-clock time as written.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| parse_date(text).map(|d| d.and_time(NaiveTime::MIN)))
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    ["%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
}

/// Parse a duration of the form `[-][d.]hh:mm[:ss[.fffffff]]`, or a bare
/// whole number of days.
///
/// ```
/// use chrono::TimeDelta;
/// use treegrid::model::parse_duration;
///
/// assert_eq!(parse_duration("01:30:00"), Some(TimeDelta::minutes(90)));
/// assert_eq!(parse_duration("2.00:00:01"), Some(TimeDelta::seconds(2 * 86_400 + 1)));
/// assert_eq!(parse_duration("3"), Some(TimeDelta::days(3)));
/// assert_eq!(parse_duration("25:00"), None);
/// ```
pub fn parse_duration(text: &str) -> Option<TimeDelta> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if body.is_empty() {
        return None;
    }

    let magnitude = if body.contains(':') {
        let parts: Vec<&str> = body.split(':').collect();
        if !(2..=3).contains(&parts.len()) {
            return None;
        }

        let (days, hours) = match parts[0].split_once('.') {
            Some((d, h)) => (parse_digits(d)?, parse_digits(h)?),
            None => (0, parse_digits(parts[0])?),
        };
        let minutes = parse_digits(parts[1])?;
        let (seconds, nanos) = match parts.get(2) {
            Some(part) => match part.split_once('.') {
                Some((s, frac)) => (parse_digits(s)?, parse_fraction(frac)?),
                None => (parse_digits(part)?, 0),
            },
            None => (0, 0),
        };
        if hours >= 24 || minutes >= 60 || seconds >= 60 {
            return None;
        }

        let total_seconds = days
            .checked_mul(86_400)?
            .checked_add(hours * 3_600 + minutes * 60 + seconds)?;
        TimeDelta::new(total_seconds, nanos)?
    } else {
        TimeDelta::try_days(parse_digits(body)?)?
    };

    Some(if negative { -magnitude } else { magnitude })
}

fn parse_digits(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Up to nine fractional digits, as nanoseconds.
fn parse_fraction(text: &str) -> Option<u32> {
    if text.is_empty() || text.len() > 9 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let padded = format!("{:0<9}", text);
    padded.parse().ok()
}

/// Format a duration as `[-][d.]hh:mm:ss[.fffffff]`.
///
/// The fraction is printed with seven digits, and only when non-zero.
pub fn format_duration(duration: TimeDelta) -> String {
    let negative = duration < TimeDelta::zero();
    let magnitude = duration.abs();
    let total_seconds = magnitude.num_seconds();
    let ticks = magnitude.subsec_nanos() / 100;

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if days > 0 {
        out.push_str(&format!("{}.", days));
    }
    out.push_str(&format!("{:02}:{:02}:{:02}", hours, minutes, seconds));
    if ticks > 0 {
        out.push_str(&format!(".{:07}", ticks));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::{EnumDescriptor, Sentinel};

    static ROLE: EnumDescriptor =
        EnumDescriptor::new("Role", &[("Intern", 0), ("Engineer", 1), ("Lead", 2)]);
    static OPTIONAL_INT: TypeDesc = TypeDesc::Int;

    #[test]
    fn test_null_handling() {
        assert_eq!(coerce(Value::Null, &TypeDesc::Text), Value::Null);
        assert_eq!(coerce(Value::Null, &TypeDesc::Int), Value::Int(0));
        assert_eq!(coerce(Value::Null, &TypeDesc::Nullable(&OPTIONAL_INT)), Value::Null);
        assert_eq!(
            coerce(Value::Null, &TypeDesc::Enum(&ROLE)),
            Value::Enum(ROLE.value(0))
        );
    }

    #[test]
    fn test_passthrough_and_nullable_unwrap() {
        assert_eq!(coerce(Value::Int(3), &TypeDesc::Int), Value::Int(3));
        assert_eq!(coerce(Value::from("x"), &TypeDesc::Any), Value::from("x"));
        assert_eq!(
            coerce(Value::from("12"), &TypeDesc::Nullable(&OPTIONAL_INT)),
            Value::Int(12)
        );
    }

    #[test]
    fn test_enum_coercion() {
        let target = TypeDesc::Enum(&ROLE);
        assert_eq!(coerce(Value::from("lead"), &target), Value::Enum(ROLE.value(2)));
        assert_eq!(coerce(Value::Int(1), &target), Value::Enum(ROLE.value(1)));
        assert_eq!(coerce(Value::from("2"), &target), Value::Enum(ROLE.value(2)));
        assert_eq!(coerce(Value::from("Boss"), &target), Value::from("Boss"));
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(coerce(Value::from(" 42 "), &TypeDesc::Int), Value::Int(42));
        assert_eq!(coerce(Value::Float(2.5), &TypeDesc::Int), Value::Int(2));
        assert_eq!(coerce(Value::Float(3.5), &TypeDesc::Int), Value::Int(4));
        assert_eq!(coerce(Value::Int(-1), &TypeDesc::UInt), Value::Int(-1));
        assert_eq!(coerce(Value::Int(7), &TypeDesc::Float), Value::Float(7.0));
        assert_eq!(coerce(Value::from("1.5"), &TypeDesc::Float), Value::Float(1.5));
        assert_eq!(coerce(Value::from("TRUE"), &TypeDesc::Bool), Value::Bool(true));
        assert_eq!(coerce(Value::Int(65), &TypeDesc::Char), Value::Char('A'));
        assert_eq!(coerce(Value::Int(5), &TypeDesc::Text), Value::from("5"));
    }

    #[test]
    fn test_special_text_forms() {
        let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        assert_eq!(
            coerce(Value::from(id), &TypeDesc::Uuid),
            Value::Uuid(Uuid::parse_str(id).unwrap())
        );

        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(
            coerce(Value::from("2024-03-01 08:30:00"), &TypeDesc::DateTime),
            Value::DateTime(expected)
        );
        assert_eq!(
            coerce(Value::from("2024-03-01T08:30:00+02:00"), &TypeDesc::DateTime),
            Value::DateTime(expected)
        );
        assert_eq!(
            coerce(Value::from("-00:00:30"), &TypeDesc::Duration),
            Value::Duration(TimeDelta::seconds(-30))
        );
        assert_eq!(
            coerce(Value::from("not a date"), &TypeDesc::DateTime),
            Value::from("not a date")
        );
    }

    #[test]
    fn test_duration_format() {
        assert_eq!(format_duration(TimeDelta::zero()), "00:00:00");
        assert_eq!(format_duration(TimeDelta::seconds(-90)), "-00:01:30");
        assert_eq!(
            format_duration(TimeDelta::days(1) + TimeDelta::milliseconds(1500)),
            "1.00:00:01.5000000"
        );

        let parsed = parse_duration("1.00:00:01.5").unwrap();
        assert_eq!(format_duration(parsed), "1.00:00:01.5000000");
    }

    #[test]
    fn test_duration_rejects_malformed() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("-"), None);
        assert_eq!(parse_duration("1:2:3:4"), None);
        assert_eq!(parse_duration("00:60:00"), None);
        assert_eq!(parse_duration("aa:bb"), None);
    }

    #[test]
    fn test_sentinels_are_not_stringified() {
        let unreadable = Value::Sentinel(Sentinel::Unreadable);
        assert_eq!(coerce(unreadable.clone(), &TypeDesc::Text), unreadable);
        assert_eq!(
            coerce(Value::Sentinel(Sentinel::MissingKey), &TypeDesc::Text),
            Value::Sentinel(Sentinel::MissingKey)
        );
    }
}
