use crate::{Customer, customer_mapping, customer_rows};
use cask::{CancellationToken, Command, CommandProcessor, Engine, Value};
use cask_memory::{MemoryExecutor, ResultSet};
use indoc::indoc;
use rust_decimal::Decimal;
use std::{str::FromStr, sync::Arc};

const SELECT_CUSTOMERS: &str = indoc! {"
    SELECT id, name, email AS email_address, balance, active
    FROM customers
    ORDER BY id
"};

const SELECT_NAMES: &str = "SELECT id, name FROM customers";

pub async fn customers(executor: &mut MemoryExecutor) {
    let engine = Engine::default();
    let cancel = CancellationToken::new();
    executor.respond(SELECT_CUSTOMERS, customer_rows());
    executor.respond(
        SELECT_NAMES,
        ResultSet::new(["ID", "NAME"]).row([Value::from(9_i64), Value::from("Ken")]),
    );

    let processor = engine
        .single(Command::text(SELECT_CUSTOMERS), &customer_mapping())
        .expect("Could not create the customers processor");

    // Cold
    let reads = executor.field_reads();
    let rows = processor
        .execute_async(executor, &(), &cancel)
        .await
        .expect("Could not query the customers");
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        Customer {
            id: 1,
            name: "Ada".into(),
            email: Some("ada@example.com".into()),
            balance: Decimal::from_str("120.50").unwrap(),
            active: true,
        }
    );
    assert_eq!(rows[1].email, None);
    assert_eq!(rows[1].balance, Decimal::from_str("-3.25").unwrap());
    assert!(!rows[1].active);
    assert_eq!(rows[2].email, None);
    assert_eq!(rows[2].balance, Decimal::ZERO);
    assert!(rows[2].active);
    assert_eq!(executor.field_reads() - reads, 5, "One scan of the five columns");

    // Warm, the column index is retained
    let reads = executor.field_reads();
    let again = processor
        .execute(executor, &())
        .expect("Could not query the customers again");
    assert_eq!(again, rows);
    assert_eq!(executor.field_reads() - reads, 5, "The five names are only compared");
    assert_eq!(processor.retrieve_column_index_info()[0].len(), 5);

    // Missing columns keep their defaults
    let names = engine
        .single(Command::text(SELECT_NAMES), &customer_mapping())
        .expect("Could not create the names processor");
    let rows = names
        .execute_async(executor, &(), &cancel)
        .await
        .expect("Could not query the names");
    assert_eq!(
        *rows,
        [Customer {
            id: 9,
            name: "Ken".into(),
            ..Default::default()
        }]
    );

    // Same mapping, same compiled extractor
    assert!(Arc::ptr_eq(processor.extractor(), names.extractor()));
}
