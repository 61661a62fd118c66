use vitrack::engine::{Dataset, Series, SeriesError};

fn us() -> Series {
    Series::new("US", vec![1.0, 2.0, 4.0, 8.0])
}

#[test]
fn arithmetic_preserves_identity_and_length() {
    let series = us();
    for result in [
        series.add(2.0),
        series.subtract(&series),
        series.mul(0.5),
        series.divide(&series),
    ] {
        let result = result.expect("aligned arithmetic should succeed");
        assert_eq!(result.id(), "US");
        assert_eq!(result.len(), series.len());
    }
    assert_eq!(series.values(), &[1.0, 2.0, 4.0, 8.0], "operands are never mutated");
}

#[test]
fn past_threshold_scenarios() {
    let trimmed = us().get_past_threshold(3.0).expect("threshold is reached");
    assert_eq!(trimmed, Series::new("US", vec![4.0, 8.0]));
    assert!(trimmed.values()[0] >= 3.0);
    assert!(us().get_past_threshold(8.5).is_none());
    assert_eq!(us().get_past_threshold(0.0).unwrap(), us());
}

#[test]
fn change_scenarios() {
    assert_eq!(us().change(1).unwrap().values(), &[1.0, 2.0, 4.0]);
    for periods in 0..4 {
        assert_eq!(us().change(periods).unwrap().len(), 4 - periods);
    }
    assert!(us().change(4).is_none());
}

#[test]
fn growth_rate_length_follows_trimmed_series() {
    let growth = us().growth_rate(1, 1.0).unwrap();
    assert_eq!(growth.values(), &[1.0, 1.0, 1.0]);

    let trimmed = us().get_past_threshold(2.0).unwrap();
    let growth = us().growth_rate(2, 2.0).unwrap();
    assert_eq!(growth.len(), trimmed.len() - 2);
    assert!(us().growth_rate(1, 100.0).is_none());
}

#[test]
fn misaligned_operands_are_rejected() {
    let short = Series::new("US", vec![1.0]);
    assert!(matches!(us().add(&short), Err(SeriesError::LengthMismatch { .. })));

    let other = Series::new("Italy", vec![1.0, 2.0, 4.0, 8.0]);
    assert!(matches!(us().add(&other), Err(SeriesError::IdentityMismatch { .. })));
}

#[test]
fn aligned_addition_sums_trailing_days() {
    let five = Series::new("Seattle, WA", vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    let three = Series::new("Seattle, WA", vec![10.0, 20.0, 30.0]);
    let merged = five.add_aligned(&three).unwrap();
    assert_eq!(merged.len(), 5);
    assert_eq!(&merged.values()[2..], &[13.0, 24.0, 35.0]);
    assert_eq!(&merged.values()[..2], &[1.0, 2.0]);
}

#[test]
fn dataset_operations_drop_absent_results() {
    let dataset = Dataset::from_series([
        us(),
        Series::new("Italy", vec![0.0, 0.0, 1.0]),
        Series::new("US", vec![1.0, 1.0, 1.0, 1.0]),
    ])
    .unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.get("US").unwrap().values(), &[2.0, 3.0, 5.0, 9.0]);

    let past = dataset.get_past_threshold(2.0);
    assert_eq!(past.sorted_keys(), vec!["US"]);

    let per_capita = dataset.divide(&dataset).unwrap();
    assert_eq!(per_capita.get("Italy").unwrap().values()[2], 1.0);
    assert!(per_capita.get("Italy").unwrap().values()[0].is_nan());
}
