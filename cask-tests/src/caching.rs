use crate::customer_mapping;
use cask::{AsValue, CacheMode, CancellationToken, Command, CommandProcessor, Engine, Parameter, Value};
use cask_memory::{MemoryExecutor, ResultSet};

const SELECT_BY_ID: &str = "SELECT id, name FROM customers WHERE id = :id";

pub async fn caching(executor: &mut MemoryExecutor) {
    let engine = Engine::default();
    let cancel = CancellationToken::new();
    executor.respond_with(SELECT_BY_ID, |command| {
        let id = match command.parameter("id") {
            Some(parameter) => i64::try_from_value(parameter.value.clone())?,
            None => 0,
        };
        Ok(ResultSet::new(["id", "name"])
            .row([Value::from(id), Value::from(format!("customer {}", id))])
            .into())
    });
    let processor = engine
        .single(
            Command::text(SELECT_BY_ID).with_parameter("id", 0_i64),
            &customer_mapping(),
        )
        .expect("Could not create the processor");
    let five = [Parameter::new("id", 5_i64)];
    let six = [Parameter::new("id", 6_i64)];

    // Disabled
    let opened = executor.cursors_opened();
    for _ in 0..2 {
        processor
            .execute_async(executor, &five, &cancel)
            .await
            .expect("Could not execute without caching");
    }
    assert_eq!(executor.cursors_opened() - opened, 2);
    assert!(processor.result_cache().is_empty());

    // Permanent
    processor
        .enable_result_caching(CacheMode::Permanent, None)
        .expect("Could not enable permanent caching");
    let opened = executor.cursors_opened();
    let first = processor
        .execute_async(executor, &five, &cancel)
        .await
        .expect("Could not execute the first time");
    let second = processor
        .execute(executor, &five)
        .expect("Could not execute the second time");
    assert_eq!(first[0].id, 5);
    assert_eq!(first[0].name, "customer 5");
    assert_eq!(second, first);
    assert_eq!(executor.cursors_opened() - opened, 1);
    let other = processor
        .execute_async(executor, &six, &cancel)
        .await
        .expect("Could not execute with different parameters");
    assert_eq!(other[0].id, 6);
    assert_eq!(executor.cursors_opened() - opened, 2);
    assert_eq!(processor.result_cache().len(), 2);

    // The template default is a parameter set of its own
    let default = processor
        .execute(executor, &())
        .expect("Could not execute with the default parameters");
    assert_eq!(default[0].id, 0);
    assert_eq!(executor.cursors_opened() - opened, 3);

    processor.flush_cache();
    assert!(processor.result_cache().is_empty());
    processor
        .execute(executor, &five)
        .expect("Could not execute after the flush");
    assert_eq!(executor.cursors_opened() - opened, 4);

    // Repeated request limit
    processor.flush_cache();
    processor
        .enable_result_caching(CacheMode::RepeatedRequestLimit, Some(2))
        .expect("Could not enable repeated request limit caching");
    let opened = executor.cursors_opened();
    for _ in 0..4 {
        processor
            .execute_async(executor, &five, &cancel)
            .await
            .expect("Could not execute under the request limit");
    }
    // Miss, hit, hit, expired
    assert_eq!(executor.cursors_opened() - opened, 2);

    assert!(
        processor
            .enable_result_caching(CacheMode::TimeSpan, None)
            .is_err()
    );
    assert!(
        processor
            .enable_result_caching(CacheMode::None, Some(1))
            .is_err()
    );
    processor.disable_result_caching();
    assert!(!processor.result_cache().is_enabled());
    assert!(processor.result_cache().is_empty());
}
