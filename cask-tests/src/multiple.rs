use crate::{
    Customer, FIRST_ORDER, Order, SECOND_ORDER, Tally, customer_mapping, customer_rows,
    order_mapping, order_rows, tally_mapping, tally_rows,
};
use cask::{CancellationToken, Command, CommandProcessor, Engine};
use cask_memory::{MemoryExecutor, Response};
use time::{Date, Month};

const DASHBOARD: &str = "dashboard";
const DASHBOARD_CUSTOMERS_ONLY: &str = "dashboard_customers";

pub async fn multiple(executor: &mut MemoryExecutor) {
    let engine = Engine::default();
    let cancel = CancellationToken::new();
    executor.respond(
        DASHBOARD,
        Response::ResultSets(vec![customer_rows(), order_rows(), tally_rows()]),
    );
    executor.respond(DASHBOARD_CUSTOMERS_ONLY, customer_rows());
    let mappings = (customer_mapping(), order_mapping(), tally_mapping());

    let dashboard = engine
        .multiple::<(Customer, Order, Tally)>(Command::procedure(DASHBOARD), &mappings)
        .expect("Could not create the dashboard processor");
    let (customers, orders, tallies) = dashboard
        .execute_async(executor, &(), &cancel)
        .await
        .expect("Could not execute the dashboard");
    let customers = customers.expect("The customers result set is missing");
    let orders = orders.expect("The orders result set is missing");
    let tallies = tallies.expect("The tallies result set is missing");
    assert_eq!(customers.len(), 3);
    assert_eq!(customers[0].name, "Ada");
    assert_eq!(
        *orders,
        [
            Order {
                id: FIRST_ORDER,
                customer: 1,
                placed: Some(Date::from_calendar_date(2025, Month::March, 14).unwrap()),
                quantity: 3,
            },
            Order {
                id: SECOND_ORDER,
                customer: 2,
                placed: None,
                quantity: 12,
            },
        ]
    );
    assert_eq!(tallies.len(), 2);
    assert_eq!(tallies[1].label, "orders");
    assert_eq!(tallies[1].total, 2);
    let columns = dashboard.retrieve_column_index_info();
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[1].export().get("ID"), Some(&0));

    // Fewer result sets than configured
    let partial = engine
        .multiple::<(Customer, Order, Tally)>(
            Command::procedure(DASHBOARD_CUSTOMERS_ONLY),
            &mappings,
        )
        .expect("Could not create the partial dashboard processor");
    let (customers, orders, tallies) = partial
        .execute(executor, &())
        .expect("A missing result set must not be an error");
    assert_eq!(customers.map(|c| c.len()), Some(3));
    assert!(orders.is_none());
    assert!(tallies.is_none());
    assert!(!partial.column_indexes()[1].is_initialized());

    // Two result sets only
    let pair = engine
        .multiple::<(Customer, Order)>(Command::procedure(DASHBOARD), &(customer_mapping(), order_mapping()))
        .expect("Could not create the pair processor");
    let (customers, orders) = pair
        .execute_async(executor, &(), &cancel)
        .await
        .expect("Could not execute the pair");
    assert_eq!(customers.map(|c| c.len()), Some(3));
    assert_eq!(orders.map(|o| o.len()), Some(2));
}
