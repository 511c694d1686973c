pub mod constants;
pub mod error;
#[cfg(test)]
pub mod test_support;

pub use error::{Error, Result};
