use cask::{Mapping, PropertyMapping, Value};
use cask_memory::ResultSet;
use rust_decimal::Decimal;
use std::str::FromStr;
use time::{Date, Month};
use uuid::Uuid;

#[derive(Default, Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub balance: Decimal,
    pub active: bool,
}

pub fn customer_mapping() -> Mapping<Customer> {
    Mapping::new()
        .property("id", |c: &mut Customer, v: i64| c.id = v)
        .property("name", |c: &mut Customer, v: String| c.name = v)
        .with(
            PropertyMapping::new("email", |c: &mut Customer, v: Option<String>| c.email = v)
                .alias("email_address"),
        )
        .property("balance", |c: &mut Customer, v: Decimal| c.balance = v)
        .property("active", |c: &mut Customer, v: bool| c.active = v)
}

pub fn customer_rows() -> ResultSet {
    ResultSet::new(["id", "name", "email_address", "balance", "active"])
        .row([
            Value::Int64(Some(1)),
            Value::Varchar(Some("Ada".into())),
            Value::Varchar(Some("ada@example.com".into())),
            Value::Decimal(Some(Decimal::from_str("120.50").unwrap())),
            Value::Boolean(Some(true)),
        ])
        .row([
            Value::Int64(Some(2)),
            Value::Varchar(Some("Grace".into())),
            Value::Varchar(None),
            Value::Decimal(Some(Decimal::from_str("-3.25").unwrap())),
            Value::Boolean(Some(false)),
        ])
        .row([
            Value::Int64(Some(3)),
            Value::Varchar(Some("Linus".into())),
            Value::Null,
            Value::Int32(Some(0)),
            Value::Int8(Some(1)),
        ])
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub customer: i64,
    pub placed: Option<Date>,
    pub quantity: u32,
}

pub fn order_mapping() -> Mapping<Order> {
    Mapping::new()
        .property("id", |o: &mut Order, v: Uuid| o.id = v)
        .property("customer", |o: &mut Order, v: i64| o.customer = v)
        .property("placed", |o: &mut Order, v: Option<Date>| o.placed = v)
        .property("quantity", |o: &mut Order, v: u32| o.quantity = v)
}

pub const FIRST_ORDER: Uuid = Uuid::from_u128(0x5e915574_bb30_4430_98cf_c5854f61fbbd);
pub const SECOND_ORDER: Uuid = Uuid::from_u128(0x0b6d7c6a_0f27_4b5c_9d2e_6c1f2a4d8e10);

pub fn order_rows() -> ResultSet {
    ResultSet::new(["ID", "Customer", "Placed", "Quantity"])
        .row([
            Value::Uuid(Some(FIRST_ORDER)),
            Value::Int32(Some(1)),
            Value::Date(Some(
                Date::from_calendar_date(2025, Month::March, 14).unwrap(),
            )),
            Value::UInt16(Some(3)),
        ])
        .row([
            Value::Varchar(Some(SECOND_ORDER.to_string())),
            Value::Int64(Some(2)),
            Value::Date(None),
            Value::Int64(Some(12)),
        ])
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct Tally {
    pub label: String,
    pub total: i64,
}

pub fn tally_mapping() -> Mapping<Tally> {
    Mapping::new()
        .property("label", |t: &mut Tally, v: String| t.label = v)
        .property("total", |t: &mut Tally, v: i64| t.total = v)
}

pub fn tally_rows() -> ResultSet {
    ResultSet::new(["label", "total"])
        .row([
            Value::Varchar(Some("customers".into())),
            Value::Int64(Some(3)),
        ])
        .row([Value::Varchar(Some("orders".into())), Value::Int64(Some(2))])
}
