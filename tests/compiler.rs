#[cfg(test)]
mod tests {
    use cask::{
        AsValue, ColumnBindingError, ColumnIndex, Cursor, Engine, Mapping, MappingCompiler,
        PropertyMapping, Value,
    };
    use cask_memory::{MemoryCursor, ResultSet};
    use std::sync::Arc;

    #[derive(Default, Debug, Clone, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
        label: Option<String>,
    }

    fn point_mapping() -> Mapping<Point> {
        Mapping::new()
            .property("x", |p: &mut Point, v: i32| p.x = v)
            .property("y", |p: &mut Point, v: i32| p.y = v)
            .property("label", |p: &mut Point, v: String| p.label = Some(v))
    }

    fn points() -> MemoryCursor {
        MemoryCursor::new(vec![
            ResultSet::new(["x", "y", "label"])
                .row([
                    Value::Int32(Some(1)),
                    Value::Int32(Some(2)),
                    Value::Varchar(Some("a".into())),
                ])
                .row([Value::Int64(Some(3)), Value::Int32(None), Value::Null])
                .row([
                    Value::Int16(Some(-5)),
                    Value::UInt8(Some(7)),
                    Value::Varchar(Some("c".into())),
                ]),
        ])
    }

    #[test]
    fn compiled_once() {
        let compiler = MappingCompiler::new();
        let first = compiler.compile(&point_mapping());
        let second = compiler.compile(&point_mapping());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(compiler.len(), 1);
        assert_eq!(first.structural_hash(), point_mapping().structural_hash());

        let mut renamed = point_mapping();
        renamed
            .set_alias("label", "name")
            .expect("Could not set the alias");
        let third = compiler.compile(&renamed);
        assert!(!Arc::ptr_eq(&first, &third));
        assert_ne!(first.structural_hash(), third.structural_hash());
        assert_eq!(third.aliases().collect::<Vec<_>>(), ["x", "y", "name"]);
        assert_eq!(compiler.len(), 2);

        let mut again = point_mapping();
        again.set_alias("label", "name").unwrap();
        assert!(Arc::ptr_eq(&third, &compiler.compile(&again)));

        compiler.clear();
        assert!(compiler.is_empty());
        let fourth = compiler.compile(&point_mapping());
        assert!(!Arc::ptr_eq(&first, &fourth));
    }

    #[test]
    fn distinct_setters_distinct_extractors() {
        let compiler = MappingCompiler::new();
        let doubled = Mapping::new()
            .property("x", |p: &mut Point, v: i32| p.x = v * 2)
            .property("y", |p: &mut Point, v: i32| p.y = v)
            .property("label", |p: &mut Point, v: String| p.label = Some(v));
        let plain = compiler.compile(&point_mapping());
        let doubled = compiler.compile(&doubled);
        assert!(!Arc::ptr_eq(&plain, &doubled));
        let rows = doubled
            .collect(&mut points(), &ColumnIndex::new())
            .expect("Could not map the points");
        assert_eq!(rows[0].x, 2);
    }

    fn scaled(factor: i32) -> Mapping<Point> {
        Mapping::new().with(PropertyMapping::converted(
            "x",
            move |v: Value| i32::try_from_value(v).map(|x| x * factor),
            |p: &mut Point, v: i32| p.x = v,
        ))
    }

    #[test]
    fn captured_state_distinct_extractors() {
        let compiler = MappingCompiler::new();
        let once = scaled(1);
        let hundred = scaled(100);
        assert_ne!(once.signature(), hundred.signature());
        let first = compiler.compile(&once);
        let second = compiler.compile(&hundred);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(compiler.len(), 2);
        let mut cursor =
            MemoryCursor::new(vec![ResultSet::new(["x"]).row([Value::Int32(Some(3))])]);
        let rows = second
            .collect(&mut cursor, &ColumnIndex::new())
            .expect("Could not map the scaled point");
        assert_eq!(rows[0].x, 300);

        // Clones hold the same closure and share the extractor
        assert!(Arc::ptr_eq(&second, &compiler.compile(&hundred.clone())));
        assert_eq!(compiler.len(), 2);
    }

    #[test]
    fn property_order_matters() {
        let forward = point_mapping();
        let backward: Mapping<Point> = forward.properties().iter().rev().cloned().collect();
        assert_eq!(backward.len(), 3);
        assert_ne!(forward.structural_hash(), backward.structural_hash());
    }

    #[test]
    fn every_row_mapped() {
        let extractor = MappingCompiler::new().compile(&point_mapping());
        let rows = extractor
            .collect(&mut points(), &ColumnIndex::new())
            .expect("Could not map the points");
        assert_eq!(
            *rows,
            [
                Point {
                    x: 1,
                    y: 2,
                    label: Some("a".into())
                },
                Point {
                    x: 3,
                    y: 0,
                    label: None
                },
                Point {
                    x: -5,
                    y: 7,
                    label: Some("c".into())
                },
            ]
        );
    }

    #[test]
    fn missing_columns_keep_defaults() {
        let extractor = MappingCompiler::new().compile(&point_mapping());
        let mut cursor = MemoryCursor::new(vec![
            ResultSet::new(["y", "unrelated"])
                .row([Value::Int32(Some(4)), Value::Varchar(Some("?".into()))]),
        ]);
        let rows = extractor
            .collect(&mut cursor, &ColumnIndex::new())
            .expect("Missing columns are not an error");
        assert_eq!(
            *rows,
            [Point {
                x: 0,
                y: 4,
                label: None
            }]
        );
    }

    #[test]
    fn conversion_failure_names_the_property() {
        let extractor = MappingCompiler::new().compile(&point_mapping());
        let mut cursor = MemoryCursor::new(vec![
            ResultSet::new(["x", "y"])
                .row([Value::Int32(Some(1)), Value::Int32(Some(1))])
                .row([Value::Int32(Some(2)), Value::Varchar(Some("north".into()))]),
        ]);
        let error = extractor
            .collect(&mut cursor, &ColumnIndex::new())
            .expect_err("A bad cell must fail the whole extraction");
        let binding = error
            .downcast_ref::<ColumnBindingError>()
            .expect("Not a ColumnBindingError");
        assert_eq!(binding.property, "y");
        assert_eq!(binding.alias, "y");
        assert_eq!(binding.target_type, "i32");
        assert!(format!("{:#}", error).contains("north"));

        let mut cursor = MemoryCursor::new(vec![
            ResultSet::new(["x"]).row([Value::Int64(Some(i64::MAX))]),
        ]);
        let error = extractor
            .collect(&mut cursor, &ColumnIndex::new())
            .expect_err("Out of range");
        assert!(error.is::<ColumnBindingError>());
    }

    #[test]
    fn extraction_is_lazy() {
        let extractor = MappingCompiler::new().compile(&point_mapping());
        let mut cursor = points();
        let columns = ColumnIndex::new();
        {
            let mut rows = extractor
                .extract(&mut cursor, &columns)
                .expect("Could not start the extraction");
            let first = rows.next().expect("No first row").expect("First row failed");
            assert_eq!(first.x, 1);
        }
        assert_eq!(cursor.value(0).unwrap(), Value::Int32(Some(1)));
        let rest = extractor
            .extract(&mut cursor, &columns)
            .expect("Could not resume the extraction")
            .collect::<Result<Vec<_>, _>>()
            .expect("Could not map the remaining rows");
        assert_eq!(rest.len(), 2);
        assert!(
            extractor
                .extract(&mut cursor, &columns)
                .unwrap()
                .next()
                .is_none()
        );
    }

    #[test]
    fn conditional_and_converted_properties() {
        let mapping = Mapping::new()
            .property("x", |p: &mut Point, v: i32| p.x = v)
            .with(
                PropertyMapping::new("y", |p: &mut Point, v: i32| p.y = v)
                    .when(|cursor: &dyn Cursor, _: &str| {
                        cursor.value(0).ok() != Some(Value::Int32(Some(1)))
                    }),
            )
            .with(PropertyMapping::converted(
                "label",
                |v: Value| String::try_from_value(v).map(|s| s.to_uppercase()),
                |p: &mut Point, v: String| p.label = Some(v),
            ));
        assert!(mapping.get("y").unwrap().signature().predicate.is_some());
        let extractor = MappingCompiler::new().compile(&mapping);
        let rows = extractor
            .collect(&mut points(), &ColumnIndex::new())
            .expect("Could not map the points");
        assert_eq!(rows[0].y, 0, "Skipped by the predicate");
        assert_eq!(rows[0].label.as_deref(), Some("A"));
        assert_eq!(rows[2].y, 7);
        assert_eq!(rows[2].label.as_deref(), Some("C"));
    }

    #[test]
    fn empty_alias_rejected() {
        let mut mapping = point_mapping();
        assert!(mapping.set_alias("label", "").is_err());
        assert!(mapping.set_alias("missing", "x").is_err());
        assert_eq!(mapping.get("label").unwrap().active_alias(), "label");
    }

    #[test]
    fn engine_shares_the_compiler() {
        let engine = Engine::default();
        let other = engine.clone();
        let first = engine.compiler().compile(&point_mapping());
        let second = other.compiler().compile(&point_mapping());
        assert!(Arc::ptr_eq(&first, &second));
        other.clear_compiled();
        assert!(engine.compiler().is_empty());
    }
}
