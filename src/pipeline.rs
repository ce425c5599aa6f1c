use log::{debug, info};
use polars::prelude::DataFrame;

use crate::aggregate::{bmi_by_age_and_gender, bmi_by_gender, ethnicity_counts, sbp_by_age_group};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::loader::load_sources;
use crate::plots::render_all;
use crate::records::{SYSTOLIC, SYSTOLIC_FILLED};
use crate::report::print_report;
use crate::stats::{describe, missing_report, ColumnSummary, MissingEntry};
use crate::transform::{
    complete_cases, core_columns, filter_adults, impute_median, merge_sources, with_age_group,
};

/// Everything the run computes, kept so the report and the charts can be
/// produced from a single pass over the data.
pub struct Analysis {
    /// All participants after the joins.
    pub merged: DataFrame,
    /// Null counts of the merged table.
    pub missing: Vec<MissingEntry>,
    /// Adults with `BPXSY1_filled` and `age_group` added.
    pub adults: DataFrame,
    pub complete_rows: usize,
    pub summary: Vec<ColumnSummary>,
    pub bmi_by_gender: DataFrame,
    pub ethnicity_counts: DataFrame,
    pub sbp_by_age_group: DataFrame,
    pub bmi_by_age_and_gender: DataFrame,
}

pub fn analyze(config: &PipelineConfig) -> Result<Analysis> {
    let sources = load_sources(config)?;
    let merged = merge_sources(&sources)?;
    let missing = missing_report(&merged);

    let adults = filter_adults(&merged)?;
    debug!("{}", core_columns(&adults)?.head(Some(5)));

    let complete_rows = complete_cases(&adults)?.height();
    info!("{} adults have both BMI and systolic pressure", complete_rows);

    let adults = impute_median(&adults, SYSTOLIC, SYSTOLIC_FILLED)?;
    let adults = with_age_group(&adults)?;

    Ok(Analysis {
        summary: describe(&adults)?,
        bmi_by_gender: bmi_by_gender(&adults)?,
        ethnicity_counts: ethnicity_counts(&adults)?,
        sbp_by_age_group: sbp_by_age_group(&adults)?,
        bmi_by_age_and_gender: bmi_by_age_and_gender(&adults)?,
        merged,
        missing,
        adults,
        complete_rows,
    })
}

pub fn run(config: &PipelineConfig) -> Result<()> {
    let analysis = analyze(config)?;
    print_report(&analysis);
    render_all(&analysis, &config.plot_dir)?;
    Ok(())
}
