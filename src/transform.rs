use log::{debug, info};
use polars::prelude::*;

use crate::loader::Sources;
use crate::records::{
    ADULT_AGE, AGE, AGE_BIN_EDGES, AGE_GROUP, AGE_GROUP_LABELS, BMI, DIASTOLIC, GENDER, HEIGHT,
    SEQN, SYSTOLIC, WEIGHT,
};

/// Left-joins body measures and blood pressure onto demographics by `SEQN`.
///
/// Only a narrow column subset is taken from each right-hand table. The
/// result has exactly one row per demographics row; participants without a
/// match get nulls in the joined columns.
pub fn merge_sources(sources: &Sources) -> PolarsResult<DataFrame> {
    let body_measures = sources
        .body_measures
        .clone()
        .lazy()
        .select([col(SEQN), col(BMI), col(HEIGHT), col(WEIGHT)]);
    let blood_pressure = sources
        .blood_pressure
        .clone()
        .lazy()
        .select([col(SEQN), col(SYSTOLIC), col(DIASTOLIC)]);

    let merged = sources
        .demographics
        .clone()
        .lazy()
        .left_join(body_measures, col(SEQN), col(SEQN))
        .left_join(blood_pressure, col(SEQN), col(SEQN))
        .collect()?;

    info!("Merged table: {} rows, {} columns", merged.height(), merged.width());
    Ok(merged)
}

/// Keeps participants aged 18 or over. Rows without an age are dropped.
pub fn filter_adults(df: &DataFrame) -> PolarsResult<DataFrame> {
    let adults = df
        .clone()
        .lazy()
        .filter(col(AGE).gt_eq(lit(ADULT_AGE)))
        .collect()?;

    info!("{} of {} participants are adults", adults.height(), df.height());
    Ok(adults)
}

pub fn core_columns(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.select([AGE, GENDER, BMI])
}

/// Rows with both a BMI and a systolic reading.
pub fn complete_cases(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .drop_nulls(Some(vec![col(BMI), col(SYSTOLIC)]))
        .collect()
}

/// Adds `target`: `column` with its nulls replaced by the median of
/// `column` over `df`.
pub fn impute_median(df: &DataFrame, column: &str, target: &str) -> PolarsResult<DataFrame> {
    let median = df.column(column)?.median();
    debug!("Filling nulls in {} with median {:?}", column, median);

    let filled = match median {
        Some(median) => col(column).fill_null(lit(median)),
        None => col(column),
    };
    df.clone().lazy().with_column(filled.alias(target)).collect()
}

/// Age group label for `age`.
///
/// Bins are left-closed, so 30 falls in `30-44`; the upper edge of the last
/// bin is included. Ages outside 18..=100 have no group.
pub fn age_group(age: f64) -> Option<&'static str> {
    let lowest = AGE_BIN_EDGES[0];
    let highest = AGE_BIN_EDGES[AGE_BIN_EDGES.len() - 1];
    if !(lowest..=highest).contains(&age) {
        return None;
    }

    let index = AGE_BIN_EDGES[1..]
        .iter()
        .position(|upper| age < *upper)
        .unwrap_or(AGE_GROUP_LABELS.len() - 1);
    Some(AGE_GROUP_LABELS[index])
}

fn age_group_lazy(column: Series) -> Result<Option<Series>, PolarsError> {
    let ages = column.cast(&DataType::Float64)?;
    let groups: Vec<Option<&str>> = ages
        .f64()?
        .into_iter()
        .map(|age| age.and_then(age_group))
        .collect();
    Ok(Option::from(Series::new(AGE_GROUP, groups)))
}

pub fn with_age_group(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .with_column(
            col(AGE)
                .map(age_group_lazy, GetOutput::from_type(DataType::Utf8))
                .alias(AGE_GROUP),
        )
        .collect()
}
