mod cursor;
mod executor;
mod script;

pub use cursor::*;
pub use executor::*;
pub use script::*;
