mod error;

pub use error::{ChorusError, ChorusResult};
