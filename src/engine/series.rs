//! One named numeric time series, indexed by day offset from the first day its source reports.
//!
//! Every operation returns a new [Series]; `values` are never changed in place.

use serde::Serialize;

use crate::engine::error::{SeriesError, SeriesResult};
use crate::engine::operand::Operand;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    id: String,
    values: Vec<f64>,
}

impl Series {
    pub fn new(id: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            values,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Most recent observation.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Same values under a different id.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: self.values,
        }
    }

    /// Elementwise combinator behind the arithmetic wrappers.
    ///
    /// A scalar is broadcast. A series operand must share this series' length and id (length
    /// is checked first). A dataset operand contributes its series with the same id.
    pub fn operation<'a, F>(&self, other: impl Into<Operand<'a>>, f: F) -> SeriesResult<Series>
    where
        F: Fn(f64, f64) -> f64,
    {
        match other.into() {
            Operand::Scalar(k) => Ok(self.map_values(|v| f(v, k))),
            Operand::Series(rhs) => self.zip_with(rhs, f),
            Operand::Dataset(dataset) => {
                let rhs = dataset
                    .get(&self.id)
                    .ok_or_else(|| SeriesError::MissingSeries {
                        id: self.id.clone(),
                    })?;
                self.zip_with(rhs, f)
            }
        }
    }

    fn zip_with<F>(&self, rhs: &Series, f: F) -> SeriesResult<Series>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.len() != rhs.len() {
            return Err(SeriesError::LengthMismatch {
                id: self.id.clone(),
                left: self.len(),
                right: rhs.len(),
            });
        }
        if self.id != rhs.id {
            return Err(SeriesError::IdentityMismatch {
                left: self.id.clone(),
                right: rhs.id.clone(),
            });
        }
        let values = self
            .values
            .iter()
            .zip(&rhs.values)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Series::new(self.id.clone(), values))
    }

    fn map_values(&self, f: impl Fn(f64) -> f64) -> Series {
        Series::new(self.id.clone(), self.values.iter().map(|&v| f(v)).collect())
    }

    pub fn add<'a>(&self, other: impl Into<Operand<'a>>) -> SeriesResult<Series> {
        self.operation(other, |a, b| a + b)
    }

    pub fn subtract<'a>(&self, other: impl Into<Operand<'a>>) -> SeriesResult<Series> {
        self.operation(other, |a, b| a - b)
    }

    pub fn mul<'a>(&self, other: impl Into<Operand<'a>>) -> SeriesResult<Series> {
        self.operation(other, |a, b| a * b)
    }

    /// Division by zero yields infinities or NaN, which are passed through untouched.
    pub fn divide<'a>(&self, other: impl Into<Operand<'a>>) -> SeriesResult<Series> {
        self.operation(other, |a, b| a / b)
    }

    /// Suffix starting at the first value `>= threshold`. Later values below the threshold
    /// are kept. `None` when no value ever reaches it.
    pub fn get_past_threshold(&self, threshold: f64) -> Option<Series> {
        let start = self.values.iter().position(|&v| v >= threshold)?;
        Some(self.slice(start))
    }

    /// Lag-`periods` first difference, `v[i] - v[i - periods]` for `i >= periods`. The result
    /// is `periods` shorter than the input; `None` when there are fewer than `periods + 1`
    /// observations.
    pub fn change(&self, periods: usize) -> Option<Series> {
        if self.len() <= periods {
            return None;
        }
        let values = self
            .values
            .iter()
            .skip(periods)
            .zip(&self.values)
            .map(|(&current, &past)| current - past)
            .collect();
        Some(Series::new(self.id.clone(), values))
    }

    /// Compound per-period growth rate over the threshold-trimmed suffix:
    /// `(u[i] / u[i - periods])^(1 / periods) - 1` for `i >= periods`.
    ///
    /// `None` exactly when the threshold is never reached. A zero period count is read as 1.
    pub fn growth_rate(&self, periods: usize, threshold: f64) -> Option<Series> {
        let periods = periods.max(1);
        let trimmed = self.get_past_threshold(threshold)?;
        let exponent = 1.0 / periods as f64;
        let values = trimmed
            .values
            .iter()
            .skip(periods)
            .zip(&trimmed.values)
            .map(|(&current, &past)| (current / past).powf(exponent) - 1.0)
            .collect();
        Some(Series::new(self.id.clone(), values))
    }

    /// Round half away from zero to `precision` decimal digits.
    pub fn round(&self, precision: i32) -> Series {
        let multiplier = 10f64.powi(precision);
        self.map_values(|v| (v * multiplier).round() / multiplier)
    }

    /// Suffix from `index` onward; empty when `index` is past the end.
    pub fn slice(&self, index: usize) -> Series {
        let start = index.min(self.len());
        Series::new(self.id.clone(), self.values[start..].to_vec())
    }

    /// Prefix zeros until the series is `len` long. Series already that long are returned
    /// unchanged.
    pub fn pad_left(&self, len: usize) -> Series {
        let missing = len.saturating_sub(self.len());
        let mut values = Vec::with_capacity(self.len() + missing);
        values.resize(missing, 0.0);
        values.extend_from_slice(&self.values);
        Series::new(self.id.clone(), values)
    }

    /// Addition that first left-zero-pads the shorter operand so both end on the same day.
    /// Ids must still match.
    pub fn add_aligned(&self, other: &Series) -> SeriesResult<Series> {
        let len = self.len().max(other.len());
        self.pad_left(len).add(&other.pad_left(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doubling() -> Series {
        Series::new("US", vec![1.0, 2.0, 4.0, 8.0])
    }

    #[test]
    fn scalar_add_keeps_identity_and_length() {
        let result = doubling().add(1.5).unwrap();
        assert_eq!(result.id(), "US");
        assert_eq!(result.values(), &[2.5, 3.5, 5.5, 9.5]);
    }

    #[test]
    fn series_arithmetic_is_elementwise() {
        let a = Series::new("x", vec![1.0, 2.0, 3.0]);
        let b = Series::new("x", vec![10.0, 20.0, 30.0]);
        assert_eq!(a.add(&b).unwrap().values(), &[11.0, 22.0, 33.0]);
        assert_eq!(b.subtract(&a).unwrap().values(), &[9.0, 18.0, 27.0]);
        assert_eq!(a.mul(&b).unwrap().values(), &[10.0, 40.0, 90.0]);
        assert_eq!(b.divide(&a).unwrap().values(), &[10.0, 10.0, 10.0]);
    }

    #[test]
    fn mismatched_length_is_reported_before_identity() {
        let a = Series::new("x", vec![1.0, 2.0]);
        let b = Series::new("y", vec![1.0]);
        assert_eq!(
            a.add(&b),
            Err(SeriesError::LengthMismatch {
                id: "x".to_string(),
                left: 2,
                right: 1,
            })
        );
    }

    #[test]
    fn mismatched_identity_is_reported() {
        let a = Series::new("x", vec![1.0]);
        let b = Series::new("y", vec![1.0]);
        assert!(matches!(
            a.add(&b),
            Err(SeriesError::IdentityMismatch { .. })
        ));
    }

    #[test]
    fn division_by_zero_propagates_non_finite_values() {
        let result = Series::new("x", vec![1.0, 0.0]).divide(0.0).unwrap();
        assert!(result.values()[0].is_infinite());
        assert!(result.values()[1].is_nan());
    }

    #[test]
    fn past_threshold_trims_from_first_crossing() {
        let result = doubling().get_past_threshold(3.0).unwrap();
        assert_eq!(result, Series::new("US", vec![4.0, 8.0]));
        assert!(doubling().get_past_threshold(9.0).is_none());
    }

    #[test]
    fn past_threshold_is_a_left_trim_not_a_filter() {
        let s = Series::new("x", vec![0.0, 5.0, 1.0, 6.0]);
        assert_eq!(s.get_past_threshold(5.0).unwrap().values(), &[5.0, 1.0, 6.0]);
    }

    #[test]
    fn change_drops_leading_periods() {
        assert_eq!(doubling().change(1).unwrap().values(), &[1.0, 2.0, 4.0]);
        assert_eq!(doubling().change(3).unwrap().values(), &[7.0]);
        assert!(doubling().change(4).is_none());
    }

    #[test]
    fn change_with_huge_lag_is_absent() {
        assert!(Series::new("x", vec![1.0, 2.0]).change(usize::MAX).is_none());
        assert!(doubling().growth_rate(usize::MAX, 1.0).unwrap().is_empty());
    }

    #[test]
    fn growth_rate_on_doubling_series_is_one() {
        let result = doubling().growth_rate(1, 1.0).unwrap();
        assert_eq!(result.values(), &[1.0, 1.0, 1.0]);

        let two_period = doubling().growth_rate(2, 1.0).unwrap();
        assert_eq!(two_period.len(), 2);
        assert!(two_period.values().iter().all(|v| (v - 1.0).abs() < 1e-12));
    }

    #[test]
    fn growth_rate_absent_without_threshold_crossing() {
        assert!(doubling().growth_rate(1, 100.0).is_none());
        let short = doubling().growth_rate(5, 4.0).unwrap();
        assert!(short.is_empty());
    }

    #[test]
    fn round_uses_half_away_from_zero() {
        let s = Series::new("x", vec![1.25, -1.25, 2.675_000_1, 0.5]);
        assert_eq!(s.round(1).values(), &[1.3, -1.3, 2.7, 0.5]);
        assert_eq!(s.round(0).values(), &[1.0, -1.0, 3.0, 1.0]);
    }

    #[test]
    fn slice_past_end_is_empty() {
        assert_eq!(doubling().slice(2).values(), &[4.0, 8.0]);
        assert!(doubling().slice(10).is_empty());
    }

    #[test]
    fn add_aligned_pads_shorter_series_on_the_left() {
        let long = Series::new("metro", vec![1.0, 1.0, 1.0, 1.0, 1.0]);
        let short = Series::new("metro", vec![2.0, 3.0, 4.0]);
        let merged = long.add_aligned(&short).unwrap();
        assert_eq!(merged.values(), &[1.0, 1.0, 3.0, 4.0, 5.0]);
        assert_eq!(short.add_aligned(&long).unwrap(), merged);
    }
}
