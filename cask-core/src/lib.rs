mod as_value;
mod cache;
mod column_index;
mod command;
mod compiler;
mod cursor;
mod engine;
mod error;
mod executor;
mod fingerprint;
mod mapping;
mod processor;
mod proxy;
mod util;
mod value;
mod value_writer;

pub use ::anyhow::Context;
pub use as_value::*;
pub use cache::*;
pub use column_index::*;
pub use command::*;
pub use compiler::*;
pub use cursor::*;
pub use engine::*;
pub use error::*;
pub use executor::*;
pub use fingerprint::*;
pub use mapping::*;
pub use processor::*;
pub use proxy::*;
pub use util::*;
pub use value::*;
pub use value_writer::*;
pub use ::futures::future;
pub use ::tokio_util::sync::CancellationToken;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
