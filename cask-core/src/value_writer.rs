use crate::Value;
use std::fmt::Write;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($out:ident, $value:expr) => {{
        if $value.is_infinite() {
            $out.push_str(if $value.is_sign_negative() {
                "-inf"
            } else {
                "inf"
            });
        } else if $value.is_nan() {
            $out.push_str("NaN");
        } else {
            let mut buffer = ryu::Buffer::new();
            $out.push_str(buffer.format($value));
        }
    }};
}

/// Render a value as a literal. The output is deterministic: the same value
/// always produces the same text, which is what fingerprints are built from.
pub fn write_value(out: &mut String, value: &Value) {
    match value {
        v if v.is_null() => out.push_str("NULL"),
        Value::Boolean(Some(v)) => out.push_str(["false", "true"][*v as usize]),
        Value::Int8(Some(v)) => write_integer!(out, *v),
        Value::Int16(Some(v)) => write_integer!(out, *v),
        Value::Int32(Some(v)) => write_integer!(out, *v),
        Value::Int64(Some(v)) => write_integer!(out, *v),
        Value::Int128(Some(v)) => write_integer!(out, *v),
        Value::UInt8(Some(v)) => write_integer!(out, *v),
        Value::UInt16(Some(v)) => write_integer!(out, *v),
        Value::UInt32(Some(v)) => write_integer!(out, *v),
        Value::UInt64(Some(v)) => write_integer!(out, *v),
        Value::UInt128(Some(v)) => write_integer!(out, *v),
        Value::Float32(Some(v)) => write_float!(out, *v),
        Value::Float64(Some(v)) => write_float!(out, *v),
        Value::Decimal(Some(v)) => drop(write!(out, "{}", v)),
        Value::Char(Some(v)) => {
            let mut buf = [0u8; 4];
            write_value_string(out, v.encode_utf8(&mut buf));
        }
        Value::Varchar(Some(v)) => write_value_string(out, v),
        Value::Blob(Some(v)) => {
            out.push_str("X'");
            out.push_str(&hex::encode_upper(v));
            out.push('\'');
        }
        Value::Date(Some(v)) => write_value_date(out, v, false),
        Value::Time(Some(v)) => write_value_time(out, v, false),
        Value::Timestamp(Some(v)) => write_value_timestamp(out, v),
        Value::TimestampWithTimezone(Some(v)) => write_value_timestamptz(out, v),
        Value::Uuid(Some(v)) => drop(write!(out, "'{}'", v)),
        _ => {
            log::error!("Cannot write {:?}", value);
        }
    }
}

/// Render and escape a string literal using single quotes.
fn write_value_string(out: &mut String, value: &str) {
    out.push('\'');
    let mut pos = 0;
    for (i, c) in value.char_indices() {
        if c == '\'' {
            out.push_str(&value[pos..i]);
            out.push_str("''");
            pos = i + 1;
        }
    }
    out.push_str(&value[pos..]);
    out.push('\'');
}

fn write_value_date(out: &mut String, value: &Date, timestamp: bool) {
    let b = if timestamp { "" } else { "'" };
    let _ = write!(
        out,
        "{b}{:04}-{:02}-{:02}{b}",
        value.year(),
        value.month() as u8,
        value.day()
    );
}

fn write_value_time(out: &mut String, value: &Time, timestamp: bool) {
    let mut subsecond = value.nanosecond();
    let mut width = 9;
    while width > 1 && subsecond % 10 == 0 {
        subsecond /= 10;
        width -= 1;
    }
    let b = if timestamp { "" } else { "'" };
    let _ = write!(
        out,
        "{b}{:02}:{:02}:{:02}.{:0width$}{b}",
        value.hour(),
        value.minute(),
        value.second(),
        subsecond
    );
}

fn write_value_timestamp(out: &mut String, value: &PrimitiveDateTime) {
    out.push('\'');
    write_value_date(out, &value.date(), true);
    out.push('T');
    write_value_time(out, &value.time(), true);
    out.push('\'');
}

fn write_value_timestamptz(out: &mut String, value: &OffsetDateTime) {
    let date_time = value.to_utc();
    write_value_timestamp(out, &PrimitiveDateTime::new(date_time.date(), date_time.time()));
}
