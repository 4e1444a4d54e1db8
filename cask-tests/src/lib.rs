mod caching;
mod cancellation;
mod customers;
mod fixtures;
mod interception;
mod multiple;
mod scalars;

pub use fixtures::*;
#[doc(hidden)]
pub use log;

use crate::{
    caching::caching, cancellation::cancellation, customers::customers,
    interception::interception, multiple::multiple, scalars::scalars,
};
use cask_memory::MemoryExecutor;
use log::LevelFilter;
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

pub async fn execute_tests(executor: &mut MemoryExecutor) {
    customers(executor).await;
    caching(executor).await;
    multiple(executor).await;
    scalars(executor).await;
    interception(executor).await;
    cancellation(executor).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = $crate::log::max_level();
        $crate::log::set_max_level($crate::log::LevelFilter::Off);
        $($code)+
        $crate::log::set_max_level(level);
    }};
}
