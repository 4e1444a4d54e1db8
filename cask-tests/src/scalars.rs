use cask::{CancellationToken, Command, CommandProcessor, Engine, Parameter, Value};
use cask_memory::{MemoryExecutor, Response};

const COUNT_CUSTOMERS: &str = "SELECT COUNT(*) FROM customers";
const LAST_LOGIN: &str = "SELECT last_login FROM customers WHERE id = :id";
const DEACTIVATE: &str = "UPDATE customers SET active = false WHERE balance < :threshold";

pub async fn scalars(executor: &mut MemoryExecutor) {
    let engine = Engine::default();
    let cancel = CancellationToken::new();
    executor.respond(COUNT_CUSTOMERS, Response::Scalar(Value::Int64(Some(42))));
    executor.respond(LAST_LOGIN, Response::Scalar(Value::Null));
    executor.respond(DEACTIVATE, Response::affected(3));

    let count = engine
        .scalar::<u32>(Command::text(COUNT_CUSTOMERS))
        .expect("Could not create the count processor");
    let scalars = executor.scalars_executed();
    assert_eq!(
        count
            .execute_async(executor, &(), &cancel)
            .await
            .expect("Could not count the customers"),
        42
    );
    assert_eq!(count.execute(executor, &()).expect("Could not count the customers"), 42);
    assert_eq!(executor.scalars_executed() - scalars, 2);

    let last_login = engine
        .scalar::<Option<String>>(Command::text(LAST_LOGIN))
        .expect("Could not create the last login processor");
    assert_eq!(
        last_login
            .execute(executor, &[Parameter::new("id", 1)])
            .expect("Could not read the last login"),
        None
    );

    let deactivate = engine
        .non_query(Command::text(DEACTIVATE).with_parameter("threshold", 0))
        .expect("Could not create the update processor");
    let non_queries = executor.non_queries_executed();
    let affected = deactivate
        .execute_async(executor, &(), &cancel)
        .await
        .expect("Could not deactivate the customers");
    assert_eq!(affected.rows_affected, 3);
    assert_eq!(executor.non_queries_executed() - non_queries, 1);
    let sent = executor
        .history()
        .last()
        .expect("The update was not recorded");
    assert_eq!(sent.command_text(), DEACTIVATE);
    assert_eq!(sent.parameter("threshold").map(|p| &p.value), Some(&Value::Int32(Some(0))));
}
