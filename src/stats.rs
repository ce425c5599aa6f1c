//! Column-level statistics over whole frames.
//!
//! - [`missing_report`]: null counts and percentages per column
//! - [`describe`]: count / mean / std / quartiles for numeric columns
//! - [`histogram_counts`]: fixed-edge binning for the BMI histogram

use polars::prelude::*;

/// Null count of one column, as a share of all rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingEntry {
    pub column: String,
    pub missing: usize,
    /// Percentage of rows, rounded to one decimal.
    pub percent: f64,
}

/// Descriptive statistics of the non-null values in a numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

// Rounds half away from zero, unlike pandas' half-to-even `round`.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Columns with at least one null, most missing first. Columns with equal
/// counts stay in table order.
pub fn missing_report(df: &DataFrame) -> Vec<MissingEntry> {
    let rows = df.height() as f64;
    let mut entries: Vec<MissingEntry> = df
        .get_columns()
        .iter()
        .filter(|s| s.null_count() > 0)
        .map(|s| MissingEntry {
            column: s.name().to_string(),
            missing: s.null_count(),
            percent: round_to_tenth(s.null_count() as f64 / rows * 100.0),
        })
        .collect();

    entries.sort_by(|a, b| b.missing.cmp(&a.missing));
    entries
}

impl ColumnSummary {
    /// Summary of the non-null values of `series`, which must be numeric.
    /// The std uses one delta degree of freedom and is null below two values.
    pub fn from_series(series: &Series) -> PolarsResult<Self> {
        let values = series.cast(&DataType::Float64)?;
        let ca = values.f64()?;
        let count = ca.len() - ca.null_count();

        Ok(Self {
            column: series.name().to_string(),
            count,
            mean: ca.mean(),
            std: if count > 1 { ca.std(1) } else { None },
            min: ca.min(),
            q25: ca.quantile(0.25, QuantileInterpolOptions::Linear)?,
            median: ca.quantile(0.5, QuantileInterpolOptions::Linear)?,
            q75: ca.quantile(0.75, QuantileInterpolOptions::Linear)?,
            max: ca.max(),
        })
    }
}

/// Non-null values of `column` as `f64`.
pub fn column_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<f64>> {
    let series = df.column(column)?.cast(&DataType::Float64)?;
    let values = series.f64()?.into_iter().flatten().collect();
    Ok(values)
}

/// `(x, y)` pairs for the rows where both columns are non-null.
pub fn paired_values(df: &DataFrame, x: &str, y: &str) -> PolarsResult<Vec<(f64, f64)>> {
    let xs = df.column(x)?.cast(&DataType::Float64)?;
    let ys = df.column(y)?.cast(&DataType::Float64)?;

    let pairs = xs
        .f64()?
        .into_iter()
        .zip(ys.f64()?.into_iter())
        .filter_map(|(x, y)| Some((x?, y?)))
        .collect();
    Ok(pairs)
}

/// Summarises every numeric column of `df`.
pub fn describe(df: &DataFrame) -> PolarsResult<Vec<ColumnSummary>> {
    df.get_columns()
        .iter()
        .filter(|s| s.dtype().is_numeric())
        .map(ColumnSummary::from_series)
        .collect()
}

/// Counts `values` into the bins delimited by `edges`.
///
/// Every bin is half-open except the last, which includes its upper edge.
/// Values outside the edges are not counted.
pub fn histogram_counts(values: &[f64], edges: &[f64]) -> Vec<usize> {
    if edges.len() < 2 {
        return Vec::new();
    }

    let last_bin = edges.len() - 2;
    let range = edges[0]..=edges[edges.len() - 1];
    let mut counts = vec![0; edges.len() - 1];
    for value in values.iter().filter(|v| range.contains(*v)) {
        let bin = edges[1..]
            .iter()
            .position(|upper| value < upper)
            .unwrap_or(last_bin);
        counts[bin] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.unwrap();
        assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
    }

    #[test]
    fn missing_report_sorts_and_rounds() {
        let df = df![
            "a" => [Some(1.0), None, None],
            "b" => [Some(1.0), Some(2.0), Some(3.0)],
            "c" => [None, Some(2.0), Some(3.0)],
        ]
        .unwrap();

        let report = missing_report(&df);
        assert_eq!(
            report,
            vec![
                MissingEntry { column: "a".into(), missing: 2, percent: 66.7 },
                MissingEntry { column: "c".into(), missing: 1, percent: 33.3 },
            ]
        );
    }

    #[test]
    fn missing_report_keeps_column_order_on_ties() {
        let df = df![
            "x" => [None, Some(1i64)],
            "y" => [Some(1i64), Some(2)],
            "z" => [Some(1i64), None],
        ]
        .unwrap();

        let columns: Vec<String> = missing_report(&df).into_iter().map(|e| e.column).collect();
        assert_eq!(columns, vec!["x", "z"]);
    }

    #[test]
    fn percent_matches_count_over_rows() {
        let df = df!["v" => [None, Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]].unwrap();
        let entry = &missing_report(&df)[0];
        assert_eq!(entry.percent, round_to_tenth(entry.missing as f64 / 6.0 * 100.0));
        assert_eq!(entry.percent, 16.7);
    }

    #[test]
    fn summary_statistics() {
        let series = Series::new("v", &[4.0, 1.0, 3.0, 2.0]);
        let summary = ColumnSummary::from_series(&series).unwrap();
        assert_eq!(summary.count, 4);
        assert_close(summary.mean, 2.5);
        assert_close(summary.std, (5.0f64 / 3.0).sqrt());
        assert_eq!(summary.min, Some(1.0));
        assert_close(summary.q25, 1.75);
        assert_close(summary.median, 2.5);
        assert_close(summary.q75, 3.25);
        assert_eq!(summary.max, Some(4.0));
    }

    #[test]
    fn summary_of_nothing() {
        let empty: Vec<Option<f64>> = vec![None, None];
        let summary = ColumnSummary::from_series(&Series::new("v", empty)).unwrap();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean, None);
        assert_eq!(summary.std, None);
        assert_eq!(summary.median, None);
        assert_eq!(summary.max, None);
    }

    #[test]
    fn single_value_has_no_std() {
        let summary = ColumnSummary::from_series(&Series::new("v", &[7i64])).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.mean, Some(7.0));
        assert_eq!(summary.std, None);
        assert_eq!(summary.q25, Some(7.0));
    }

    #[test]
    fn describe_skips_text_and_nulls() {
        let df = df![
            "n" => [Some(1.0), None, Some(3.0)],
            "s" => ["a", "b", "c"],
        ]
        .unwrap();

        let summaries = describe(&df).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].column, "n");
        assert_eq!(summaries[0].count, 2);
        assert_close(summaries[0].mean, 2.0);
    }

    #[test]
    fn pairs_skip_rows_with_a_null() {
        let df = df![
            "x" => [Some(1.0), None, Some(3.0)],
            "y" => [Some(10i64), Some(20), None],
        ]
        .unwrap();
        assert_eq!(paired_values(&df, "x", "y").unwrap(), vec![(1.0, 10.0)]);
    }

    #[test]
    fn histogram_edges() {
        let edges = [10.0, 15.0, 20.0, 25.0];
        let values = [9.9, 10.0, 14.9, 15.0, 24.0, 25.0, 25.1, f64::NAN];
        assert_eq!(histogram_counts(&values, &edges), vec![2, 1, 2]);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_to_tenth(0.25), 0.3);
        assert_eq!(round_to_tenth(1.25), 1.3);
    }
}
