#[cfg(test)]
mod tests {
    use cask::{ColumnIndex, Value};
    use cask_memory::{MemoryCursor, ResultSet};
    use cask_tests::silent_logs;
    use std::{collections::HashMap, sync::Arc};

    fn cursor(columns: &[&str]) -> MemoryCursor {
        MemoryCursor::new(vec![
            ResultSet::new(columns.iter().copied()).row(columns.iter().map(|_| Value::Null)),
        ])
    }

    #[test]
    fn resolves_names() {
        let index = ColumnIndex::new();
        assert!(!index.is_initialized());
        let cursor = cursor(&["Id", "name", "id", "NAME", "Total"]);
        assert_eq!(index.ordinal(&cursor, "Id").unwrap(), Some(0));
        assert_eq!(index.ordinal(&cursor, "id").unwrap(), Some(2));
        assert_eq!(index.ordinal(&cursor, "ID").unwrap(), Some(0));
        assert_eq!(index.ordinal(&cursor, "name").unwrap(), Some(1));
        assert_eq!(index.ordinal(&cursor, "NAME").unwrap(), Some(3));
        assert_eq!(index.ordinal(&cursor, "total").unwrap(), Some(4));
        assert_eq!(index.ordinal(&cursor, "missing").unwrap(), None);
        assert_eq!(index.name(&cursor, 4).unwrap().as_deref(), Some("Total"));
        assert_eq!(index.name(&cursor, 5).unwrap(), None);
        assert!(index.is_initialized());
        assert_eq!(index.len(), 5);
        assert_eq!(
            index.ordinals(&cursor, ["total", "nope", "Id"]).unwrap(),
            [Some(4), None, Some(0)]
        );
    }

    #[test]
    fn export_and_seed() {
        let index = ColumnIndex::new();
        let cursor = cursor(&["a", "b", "c"]);
        assert!(index.export().is_empty());
        index.ordinal(&cursor, "a").unwrap();
        let export = index.export();
        assert_eq!(
            export,
            HashMap::from([("a".into(), 0), ("b".into(), 1), ("c".into(), 2)])
        );
        let seeded = ColumnIndex::from_export(&export);
        assert!(seeded.is_initialized());
        assert_eq!(seeded.export(), export);
        assert_eq!(seeded.ordinal(&cursor, "C").unwrap(), Some(2));
    }

    #[test]
    fn copy_update_clear() {
        let index = ColumnIndex::new();
        let cursor = cursor(&["a", "b"]);
        index.ordinal(&cursor, "b").unwrap();

        let copy = index.copy();
        index.clear();
        assert!(!index.is_initialized());
        assert!(copy.is_initialized());
        assert_eq!(copy.len(), 2);

        let other = ColumnIndex::new();
        other.update(&copy);
        assert_eq!(other.export(), copy.export());
        copy.clear();
        assert!(other.is_initialized());
    }

    #[test]
    fn rebuilt_on_shape_change() {
        let index = ColumnIndex::new();
        let narrow = cursor(&["a", "b"]);
        let wide = cursor(&["c", "b", "a"]);
        assert_eq!(index.ordinal(&narrow, "a").unwrap(), Some(0));
        silent_logs! {
            assert_eq!(index.ordinal(&wide, "a").unwrap(), Some(2));
        }
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn rebuilt_on_reordered_columns() {
        let index = ColumnIndex::new();
        let first = cursor(&["x", "y"]);
        let swapped = cursor(&["y", "x"]);
        let renamed = cursor(&["x", "z"]);
        assert_eq!(index.ordinal(&first, "x").unwrap(), Some(0));
        assert_eq!(index.ordinal(&first, "x").unwrap(), Some(0));
        silent_logs! {
            assert_eq!(index.ordinal(&swapped, "x").unwrap(), Some(1));
            assert_eq!(index.ordinal(&swapped, "y").unwrap(), Some(0));
            assert_eq!(index.ordinal(&renamed, "y").unwrap(), None);
            assert_eq!(index.ordinal(&renamed, "z").unwrap(), Some(1));
        }
        assert_eq!(
            index.export(),
            HashMap::from([("x".into(), 0), ("z".into(), 1)])
        );

        // A transplanted index is checked against the cursor too
        let transplanted = ColumnIndex::new();
        transplanted.update(&ColumnIndex::from_export(&HashMap::from([
            ("y".into(), 0),
            ("x".into(), 1),
        ])));
        silent_logs! {
            assert_eq!(transplanted.ordinal(&first, "x").unwrap(), Some(0));
        }
    }

    #[test]
    fn concurrent_first_scan() {
        let index = Arc::new(ColumnIndex::new());
        let handles = (0..8)
            .map(|i| {
                let index = index.clone();
                std::thread::spawn(move || {
                    let cursor = cursor(&["x", "y", "z"]);
                    let name = ["x", "y", "z"][i % 3];
                    index.ordinal(&cursor, name).unwrap()
                })
            })
            .collect::<Vec<_>>();
        let ordinals = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(
            ordinals,
            [Some(0), Some(1), Some(2), Some(0), Some(1), Some(2), Some(0), Some(1)]
        );
        assert_eq!(index.len(), 3);
    }
}
