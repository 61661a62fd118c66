//! Series and dataset engine: identity-tagged numeric sequences, keyed collections of them,
//! and the derived-metric operators (threshold trim, lag change, growth rate, rounding).

pub mod dataset;
pub mod error;
pub mod operand;
pub mod series;

pub use dataset::Dataset;
pub use error::{SeriesError, SeriesResult};
pub use operand::Operand;
pub use series::Series;
