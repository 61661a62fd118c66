//! Keyed collection of series for one metric across many places.
//!
//! Series in one dataset may have different lengths: places start reporting on different
//! days. Inserting a series whose id is already present accumulates it by elementwise
//! addition. Derived datasets are always new values; the operators below never touch the
//! receiver.

use std::collections::{BTreeMap, HashMap};

use crate::engine::error::SeriesResult;
use crate::engine::operand::Operand;
use crate::engine::series::Series;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Series in insertion order.
    series: Vec<Series>,
    /// id -> position in `series`.
    by_id: HashMap<String, usize>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `series` into a dataset. `key` picks the destination id for each series (`None`
    /// drops it); the series is re-keyed and, when the id is taken, `combine(existing,
    /// incoming)` replaces the stored entry.
    pub fn merge_by<I, K, C>(series: I, mut key: K, mut combine: C) -> SeriesResult<Dataset>
    where
        I: IntoIterator<Item = Series>,
        K: FnMut(&Series) -> Option<String>,
        C: FnMut(&Series, &Series) -> SeriesResult<Series>,
    {
        let mut dataset = Dataset::new();
        for item in series {
            let Some(id) = key(&item) else {
                continue;
            };
            let item = if item.id() == id { item } else { item.with_id(id) };
            dataset.insert_with(item, &mut combine)?;
        }
        Ok(dataset)
    }

    /// Accumulating build: series sharing an id are summed.
    pub fn from_series<I>(series: I) -> SeriesResult<Dataset>
    where
        I: IntoIterator<Item = Series>,
    {
        Self::merge_by(series, |s| Some(s.id().to_string()), |a, b| a.add(b))
    }

    /// Build from already-computed results, skipping the absent ones. Ids are expected to be
    /// unique; a repeated id replaces the earlier entry.
    pub fn collect_defined<I>(results: I) -> Dataset
    where
        I: IntoIterator<Item = Option<Series>>,
    {
        let mut dataset = Dataset::new();
        for series in results.into_iter().flatten() {
            dataset.insert(series);
        }
        dataset
    }

    /// Insert, or add elementwise into the stored series with the same id.
    pub fn add_series(&mut self, series: Series) -> SeriesResult<()> {
        self.insert_with(series, &mut |a: &Series, b: &Series| a.add(b))
    }

    fn insert_with<C>(&mut self, series: Series, combine: &mut C) -> SeriesResult<()>
    where
        C: FnMut(&Series, &Series) -> SeriesResult<Series>,
    {
        match self.by_id.get(series.id()) {
            Some(&index) => {
                let merged = combine(&self.series[index], &series)?;
                self.series[index] = merged;
            }
            None => self.push(series),
        }
        Ok(())
    }

    fn insert(&mut self, series: Series) {
        match self.by_id.get(series.id()) {
            Some(&index) => self.series[index] = series,
            None => self.push(series),
        }
    }

    fn push(&mut self, series: Series) {
        self.by_id.insert(series.id().to_string(), self.series.len());
        self.series.push(series);
    }

    pub fn get(&self, id: &str) -> Option<&Series> {
        self.by_id.get(id).map(|&index| &self.series[index])
    }

    pub fn has(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Traversal in insertion order. Restartable: each call starts from the beginning.
    pub fn iter(&self) -> std::slice::Iter<'_, Series> {
        self.series.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.series.iter().map(Series::id)
    }

    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        keys
    }

    /// Apply `f` to every series, dropping those for which it yields `None`.
    pub fn map<F>(&self, f: F) -> Dataset
    where
        F: FnMut(&Series) -> Option<Series>,
    {
        Self::collect_defined(self.series.iter().map(f))
    }

    /// [Dataset::map] for fallible transforms; the first error aborts the whole dataset.
    pub fn try_map<F>(&self, mut f: F) -> SeriesResult<Dataset>
    where
        F: FnMut(&Series) -> SeriesResult<Option<Series>>,
    {
        let results = self
            .series
            .iter()
            .map(|series| f(series))
            .collect::<SeriesResult<Vec<_>>>()?;
        Ok(Self::collect_defined(results))
    }

    pub fn filter<P>(&self, mut predicate: P) -> Dataset
    where
        P: FnMut(&Series) -> bool,
    {
        self.map(|series| predicate(series).then(|| series.clone()))
    }

    pub fn get_past_threshold(&self, threshold: f64) -> Dataset {
        self.map(|s| s.get_past_threshold(threshold))
    }

    pub fn change(&self, periods: usize) -> Dataset {
        self.map(|s| s.change(periods))
    }

    pub fn growth_rate(&self, periods: usize, threshold: f64) -> Dataset {
        self.map(|s| s.growth_rate(periods, threshold))
    }

    pub fn round(&self, precision: i32) -> Dataset {
        self.map(|s| Some(s.round(precision)))
    }

    pub fn slice(&self, index: usize) -> Dataset {
        self.map(|s| Some(s.slice(index)))
    }

    /// Combine every series with `other`. A dataset operand must hold every id of `self`.
    pub fn operation<'a, F>(&self, other: impl Into<Operand<'a>>, f: F) -> SeriesResult<Dataset>
    where
        F: Fn(f64, f64) -> f64 + Copy,
    {
        let other = other.into();
        self.try_map(|series| series.operation(other, f).map(Some))
    }

    pub fn add<'a>(&self, other: impl Into<Operand<'a>>) -> SeriesResult<Dataset> {
        self.operation(other, |a, b| a + b)
    }

    pub fn subtract<'a>(&self, other: impl Into<Operand<'a>>) -> SeriesResult<Dataset> {
        self.operation(other, |a, b| a - b)
    }

    pub fn mul<'a>(&self, other: impl Into<Operand<'a>>) -> SeriesResult<Dataset> {
        self.operation(other, |a, b| a * b)
    }

    pub fn divide<'a>(&self, other: impl Into<Operand<'a>>) -> SeriesResult<Dataset> {
        self.operation(other, |a, b| a / b)
    }

    /// Label -> values, sorted by label for display.
    pub fn to_sorted_map(&self) -> BTreeMap<String, Vec<f64>> {
        self.series
            .iter()
            .map(|s| (s.id().to_string(), s.values().to_vec()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Series;
    type IntoIter = std::slice::Iter<'a, Series>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Series> for Dataset {
    /// Replacing collect; use [Dataset::from_series] to accumulate duplicates.
    fn from_iter<T: IntoIterator<Item = Series>>(iter: T) -> Self {
        Self::collect_defined(iter.into_iter().map(Some))
    }
}
