pub use cask_core::*;
