use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use polars::prelude::*;

use crate::records::{
    gender_label, AGE_GROUP, AGE_GROUP_LABELS, BMI, ETHNICITY, GENDER, SEQN, SYSTOLIC,
};

pub const MEAN: &str = "mean";
pub const MEDIAN: &str = "median";
pub const STD: &str = "std";
pub const COUNT: &str = "count";

/// Mean, median, sample std and non-null count of BMI per gender code.
pub fn bmi_by_gender(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .filter(col(GENDER).is_not_null())
        .groupby_stable([col(GENDER)])
        .agg([
            col(BMI).mean().alias(MEAN),
            col(BMI).median().alias(MEDIAN),
            col(BMI).std(1).alias(STD),
            col(BMI)
                .is_not_null()
                .sum()
                .cast(DataType::UInt64)
                .alias(COUNT),
        ])
        .sort(GENDER, Default::default())
        .collect()
}

/// Participants per ethnicity code, most common first.
pub fn ethnicity_counts(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .filter(col(ETHNICITY).is_not_null())
        .groupby_stable([col(ETHNICITY)])
        .agg([col(SEQN).count().cast(DataType::UInt64).alias(COUNT)])
        .sort(
            COUNT,
            SortOptions {
                descending: true,
                ..Default::default()
            },
        )
        .collect()
}

/// Mean systolic pressure per age group, lowest first.
///
/// All five age groups are listed. Groups without any reading get a null
/// mean and sort last, in bin order.
pub fn sbp_by_age_group(df: &DataFrame) -> PolarsResult<DataFrame> {
    let grouped = df
        .clone()
        .lazy()
        .filter(col(AGE_GROUP).is_not_null())
        .groupby_stable([col(AGE_GROUP)])
        .agg([col(SYSTOLIC).mean().alias(MEAN)])
        .collect()?;

    let groups = grouped.column(AGE_GROUP)?.utf8()?;
    let means = grouped.column(MEAN)?.cast(&DataType::Float64)?;
    let lookup: HashMap<&str, Option<f64>> = groups
        .into_iter()
        .zip(means.f64()?.into_iter())
        .filter_map(|(group, mean)| Some((group?, mean)))
        .collect();

    let mut rows: Vec<(&str, Option<f64>)> = AGE_GROUP_LABELS
        .iter()
        .map(|label| (*label, lookup.get(label).copied().flatten()))
        .collect();
    // stable, so null means keep bin order
    rows.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let (labels, means): (Vec<&str>, Vec<Option<f64>>) = rows.into_iter().unzip();
    DataFrame::new(vec![
        Series::new(AGE_GROUP, labels),
        Series::new(MEAN, means),
    ])
}

/// Mean BMI per age group and gender, one row per age group in bin order
/// and one column per gender.
///
/// All five age groups are present; cells without data are null.
pub fn bmi_by_age_and_gender(df: &DataFrame) -> PolarsResult<DataFrame> {
    let cells = df
        .clone()
        .lazy()
        .filter(col(AGE_GROUP).is_not_null().and(col(GENDER).is_not_null()))
        .groupby_stable([col(AGE_GROUP), col(GENDER)])
        .agg([col(BMI).mean().alias(MEAN)])
        .collect()?;

    let groups = cells.column(AGE_GROUP)?.utf8()?;
    let genders = cells.column(GENDER)?.cast(&DataType::Int64)?;
    let means = cells.column(MEAN)?.cast(&DataType::Float64)?;

    let mut codes = BTreeSet::new();
    let mut lookup: HashMap<(&str, i64), Option<f64>> = HashMap::new();
    for ((group, gender), mean) in groups
        .into_iter()
        .zip(genders.i64()?.into_iter())
        .zip(means.f64()?.into_iter())
    {
        if let (Some(group), Some(gender)) = (group, gender) {
            codes.insert(gender);
            lookup.insert((group, gender), mean);
        }
    }

    let mut columns = vec![Series::new(AGE_GROUP, AGE_GROUP_LABELS.to_vec())];
    for code in codes {
        let values: Vec<Option<f64>> = AGE_GROUP_LABELS
            .iter()
            .map(|label| lookup.get(&(*label, code)).copied().flatten())
            .collect();
        columns.push(Series::new(&gender_label(code), values));
    }
    DataFrame::new(columns)
}

/// `(label, mean)` pairs from [`bmi_by_gender`], skipping genders without a mean.
pub fn gender_means(summary: &DataFrame) -> PolarsResult<Vec<(String, f64)>> {
    let genders = summary.column(GENDER)?.cast(&DataType::Int64)?;
    let means = summary.column(MEAN)?.cast(&DataType::Float64)?;

    let pairs = genders
        .i64()?
        .into_iter()
        .zip(means.f64()?.into_iter())
        .filter_map(|(gender, mean)| Some((gender_label(gender?), mean?)))
        .collect();
    Ok(pairs)
}
