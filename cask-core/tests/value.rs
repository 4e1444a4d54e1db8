#[cfg(test)]
mod tests {
    use cask_core::{AsValue, Value, write_value};
    use rust_decimal::Decimal;
    use std::{borrow::Cow, str::FromStr, sync::Arc};
    use time::{Date, Month, PrimitiveDateTime, Time};
    use uuid::Uuid;

    fn render(value: &Value) -> String {
        let mut out = String::new();
        write_value(&mut out, value);
        out
    }

    #[test]
    fn value_none() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Int32(Some(1)), Value::Null);
        assert!(Value::Int32(None).is_null());
        assert!(Value::Int32(None).same_type(&Value::Int32(Some(3))));
        assert!(!Value::Int32(None).same_type(&Value::Int64(None)));
        assert_eq!(Option::<i32>::None.as_value(), Value::Int32(None));
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<i32>::try_from_value(Value::Int8(Some(4))).unwrap(),
            Some(4)
        );
    }

    #[test]
    fn value_integers() {
        assert_eq!(i64::try_from_value(Value::Int8(Some(-8))).unwrap(), -8);
        assert_eq!(u8::try_from_value(Value::Int64(Some(255))).unwrap(), 255);
        assert!(u8::try_from_value(Value::Int64(Some(256))).is_err());
        assert!(u32::try_from_value(Value::Int32(Some(-1))).is_err());
        assert_eq!(i32::try_from_value(Value::Boolean(Some(true))).unwrap(), 1);
        assert_eq!(
            i16::try_from_value(Value::Varchar(Some(" 42 ".into()))).unwrap(),
            42
        );
        assert_eq!(
            i128::try_from_value(Value::Decimal(Some(Decimal::from(7)))).unwrap(),
            7
        );
        assert!(i128::try_from_value(Value::Decimal(Some(Decimal::from_str("7.5").unwrap()))).is_err());
        let error = i8::try_from_value(Value::Float64(Some(1.0))).unwrap_err();
        assert!(error.to_string().contains("i8"), "{}", error);
    }

    #[test]
    fn value_other_types() {
        assert!(bool::try_from_value(Value::Varchar(Some("TRUE".into()))).unwrap());
        assert!(!bool::try_from_value(Value::UInt8(Some(0))).unwrap());
        assert_eq!(
            f64::try_from_value(Value::Int32(Some(3))).unwrap(),
            3.0
        );
        assert_eq!(
            Decimal::try_from_value(Value::Varchar(Some("1.50".into()))).unwrap(),
            Decimal::from_str("1.5").unwrap()
        );
        assert_eq!(char::try_from_value(Value::Varchar(Some("x".into()))).unwrap(), 'x');
        assert!(char::try_from_value(Value::Varchar(Some("xy".into()))).is_err());
        assert_eq!(
            String::try_from_value(Value::Char(Some('z'))).unwrap(),
            "z"
        );
        assert_eq!(
            Cow::<'static, str>::try_from_value("abc".into()).unwrap(),
            "abc"
        );
        assert_eq!(&*Arc::<str>::try_from_value("abc".into()).unwrap(), "abc");
        assert_eq!(
            Vec::<u8>::try_from_value(vec![1u8, 2].as_value()).unwrap(),
            [1, 2]
        );
        let id = Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
        assert_eq!(Uuid::try_from_value(Value::Varchar(Some(id.to_string()))).unwrap(), id);
        assert_eq!(
            Uuid::try_from_value(Value::Blob(Some(id.as_bytes().to_vec().into()))).unwrap(),
            id
        );
        let date = Date::from_calendar_date(2024, Month::February, 29).unwrap();
        assert_eq!(Date::try_from_value(date.as_value()).unwrap(), date);
        assert!(Date::try_from_value(Value::Int32(Some(1))).is_err());
        let timestamp = PrimitiveDateTime::new(date, Time::from_hms(23, 59, 1).unwrap());
        assert_eq!(
            PrimitiveDateTime::try_from_value(timestamp.assume_utc().as_value()).unwrap(),
            timestamp
        );
    }

    #[test]
    fn value_rendering() {
        assert_eq!(render(&Value::Null), "NULL");
        assert_eq!(render(&Value::Varchar(None)), "NULL");
        assert_eq!(render(&Value::Boolean(Some(true))), "true");
        assert_eq!(render(&Value::Int64(Some(-12))), "-12");
        assert_eq!(render(&Value::UInt128(Some(u128::MAX))), u128::MAX.to_string());
        assert_eq!(render(&Value::Float64(Some(1.5))), "1.5");
        assert_eq!(render(&Value::Float32(Some(f32::NEG_INFINITY))), "-inf");
        assert_eq!(render(&Value::Float64(Some(f64::NAN))), "NaN");
        assert_eq!(render(&Value::Varchar(Some("it's".into()))), "'it''s'");
        assert_eq!(render(&Value::Char(Some('\''))), "''''");
        assert_eq!(render(&Value::Blob(Some([0xCA, 0xFE].into()))), "X'CAFE'");
        assert_eq!(
            render(&Value::Decimal(Some(Decimal::from_str("-0.25").unwrap()))),
            "-0.25"
        );
        assert_eq!(Value::Int8(Some(5)).to_string(), "5");
        assert_eq!(Value::Int8(Some(5)).type_name(), "INT8");
    }
}
