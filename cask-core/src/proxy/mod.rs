mod intercept;
mod transform;

pub use intercept::*;
pub use transform::*;
