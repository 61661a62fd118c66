use crate::engine::dataset::Dataset;
use crate::engine::series::Series;

/// Right-hand side of a series or dataset arithmetic operation.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Scalar(f64),
    Series(&'a Series),
    /// Combined with the series of the same id.
    Dataset(&'a Dataset),
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

impl<'a> From<&'a Series> for Operand<'a> {
    fn from(series: &'a Series) -> Self {
        Operand::Series(series)
    }
}

impl<'a> From<&'a Dataset> for Operand<'a> {
    fn from(dataset: &'a Dataset) -> Self {
        Operand::Dataset(dataset)
    }
}
