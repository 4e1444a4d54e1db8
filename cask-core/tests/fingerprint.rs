#[cfg(test)]
mod tests {
    use cask_core::{Command, Fingerprint, Parameter, StructuralHasher, Value};

    fn parameters(values: &[(&'static str, Value)]) -> Vec<Parameter> {
        values
            .iter()
            .map(|(name, value)| Parameter {
                name: (*name).into(),
                value: value.clone(),
            })
            .collect()
    }

    #[test]
    fn deterministic() {
        let a = parameters(&[("id", Value::Int32(Some(5))), ("name", "Ada".into())]);
        let b = parameters(&[("id", Value::Int32(Some(5))), ("name", "Ada".into())]);
        assert_eq!(Fingerprint::of_parameters(&a), Fingerprint::of_parameters(&b));
        assert_eq!(
            Fingerprint::of_parameters(&a).to_string(),
            format!("{:032x}", Fingerprint::of_parameters(&b).as_u128())
        );
        assert_eq!(Fingerprint::of_parameters(&[]), Fingerprint::of_parameters(&[]));
    }

    #[test]
    fn sensitive_to_order_values_and_types() {
        let base = Fingerprint::of_parameters(&parameters(&[
            ("id", Value::Int32(Some(5))),
            ("name", "Ada".into()),
        ]));
        let cases = [
            parameters(&[("name", "Ada".into()), ("id", Value::Int32(Some(5)))]),
            parameters(&[("id", Value::Int32(Some(6))), ("name", "Ada".into())]),
            parameters(&[("id", Value::Int64(Some(5))), ("name", "Ada".into())]),
            parameters(&[("id", "5".into()), ("name", "Ada".into())]),
            parameters(&[("id", Value::Int32(Some(5))), ("name", Value::Varchar(None))]),
            parameters(&[("id", Value::Int32(Some(5)))]),
            parameters(&[("i", "d5".into()), ("name", "Ada".into())]),
        ];
        for case in cases {
            assert_ne!(Fingerprint::of_parameters(&case), base, "{:?}", case);
        }
    }

    #[test]
    fn command_fingerprint_includes_the_text() {
        let select = Command::text("SELECT 1").with_parameter("a", 1);
        let other = Command::text("SELECT 2").with_parameter("a", 1);
        let procedure = Command::procedure("SELECT 1").with_parameter("a", 1);
        assert_ne!(Fingerprint::of_command(&select), Fingerprint::of_command(&other));
        assert_ne!(
            Fingerprint::of_command(&select),
            Fingerprint::of_command(&procedure)
        );
        assert_eq!(
            Fingerprint::of_command(&select),
            Fingerprint::of_command(&select.clone())
        );
    }

    #[test]
    fn structural_hasher() {
        let hash = |parts: &[&str]| {
            let mut hasher = StructuralHasher::new();
            for part in parts {
                hasher.add(part);
            }
            hasher.finish()
        };
        assert_eq!(hash(&["a", "b"]), hash(&["a", "b"]));
        assert_ne!(hash(&["a", "b"]), hash(&["b", "a"]));
        assert_ne!(hash(&["ab", "c"]), hash(&["a", "bc"]));
    }
}
