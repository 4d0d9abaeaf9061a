//! Value coercions shared by the typed accessors.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

/// Canonical storage form of datetimes.
pub(crate) const DB_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub(crate) const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

const TRUTHY: [&str; 3] = ["true", "1", "yes"];

/// `null`, `false`, whitespace-only strings and empty containers.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(string) => string.trim().is_empty(),
        Value::Array(array) => array.is_empty(),
        Value::Object(object) => object.is_empty(),
        Value::Number(_) => false,
    }
}

pub fn is_present(value: &Value) -> bool {
    !is_blank(value)
}

/// True when any leaf below `value` is present.
pub fn any_present_recursive(value: &Value) -> bool {
    match value {
        Value::Object(object) => object.values().any(any_present_recursive),
        other => is_present(other),
    }
}

/// Drops `null` members of objects, recursively.
pub fn compact_nulls(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let value = match value {
                Value::Object(nested) => Value::Object(compact_nulls(nested)),
                other => other.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// The textual form of a scalar, `None` for `null`.
pub(crate) fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(string) => Some(string.clone()),
        other => Some(other.to_string()),
    }
}

/// Leading-integer parse: `" 42px"` is 42, `"abc"` is 0.
fn parse_leading_integer(string: &str) -> i64 {
    let trimmed = string.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };

    let digits = digits
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || *c == '_')
        .map(|(_, c)| c)
        .filter(|c| *c != '_')
        .collect::<String>();

    digits.parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

/// Integer reading of a present value, `None` when blank.
pub fn to_integer(value: &Value) -> Option<i64> {
    if is_blank(value) {
        return None;
    }

    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64)),
        Value::String(string) => Some(parse_leading_integer(string)),
        Value::Bool(true) => Some(1),
        _ => None,
    }
}

/// Boolean reading of a present value, `None` when blank.
pub fn to_boolean(value: &Value) -> Option<bool> {
    match value {
        // a stored `false` is an answer, not a blank
        Value::Bool(flag) => Some(*flag),
        other if is_blank(other) => None,
        other => {
            let text = to_text(other).unwrap_or_default();
            Some(TRUTHY.contains(&text.trim().to_lowercase().as_str()))
        }
    }
}

/// Matches `YYYY-MM-DD` exactly.
pub(crate) fn is_iso_date(string: &str) -> bool {
    let bytes = string.as_bytes();

    bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = match value {
        Value::String(string) => string.trim(),
        _ => return None,
    };

    NaiveDate::parse_from_str(text.get(..10)?, ISO_DATE_FORMAT)
        .ok()
        .or_else(|| parse_datetime(value).map(|datetime| datetime.date_naive()))
}

fn parse_naive_datetime(text: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        DB_DATETIME_FORMAT,
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, ISO_DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Reads a stored datetime; values without an offset are UTC.
pub fn parse_datetime(value: &Value) -> Option<DateTime<FixedOffset>> {
    let text = match value {
        Value::String(string) => string.trim(),
        _ => return None,
    };

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime);
    }

    parse_naive_datetime(text).map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
}

/// Interprets user input as wall-clock time in `zone`, unless it carries an offset.
pub(crate) fn parse_local_datetime(text: &str, zone: &FixedOffset) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.with_timezone(&Utc));
    }

    parse_naive_datetime(text).and_then(|naive| local_to_utc(&naive, zone))
}

pub(crate) fn local_to_utc(naive: &NaiveDateTime, zone: &FixedOffset) -> Option<DateTime<Utc>> {
    zone.from_local_datetime(naive)
        .single()
        .map(|datetime| datetime.with_timezone(&Utc))
}

pub(crate) fn db_format<Tz: TimeZone>(datetime: &DateTime<Tz>) -> String {
    datetime
        .with_timezone(&Utc)
        .format(DB_DATETIME_FORMAT)
        .to_string()
}

/// English pluralization, enough for attribute names.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let consonant_y = word.ends_with('y')
        && !word
            .chars()
            .rev()
            .nth(1)
            .is_some_and(|c| "aeiou".contains(c));

    if consonant_y {
        format!("{}ies", &word[..word.len() - 1])
    } else if ["ss", "sh", "ch", "x", "z"]
        .iter()
        .any(|suffix| word.ends_with(*suffix))
    {
        format!("{word}es")
    } else if word.ends_with('s') {
        word.to_owned()
    } else {
        format!("{word}s")
    }
}

pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        format!("{stem}y")
    } else if let Some(stem) = ["sses", "shes", "ches", "xes", "zes"]
        .iter()
        .find_map(|suffix| word.strip_suffix(*suffix).map(|stem| (stem, *suffix)))
        .map(|(stem, suffix)| format!("{stem}{}", &suffix[..suffix.len() - 2]))
    {
        stem
    } else if word.ends_with("ss") {
        word.to_owned()
    } else if let Some(stem) = word.strip_suffix('s') {
        stem.to_owned()
    } else {
        word.to_owned()
    }
}
