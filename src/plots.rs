//! Exploratory charts rendered with [`plotters`] to 1200x800 PNG files.
//!
//! 1. BMI histogram over every participant
//! 2. Mean BMI per gender (adults)
//! 3. Age against systolic pressure (adults)

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use plotters::prelude::*;

use crate::aggregate::gender_means;
use crate::error::{PipelineError, Result};
use crate::pipeline::Analysis;
use crate::records::{AGE, BMI, SYSTOLIC};
use crate::stats::{column_values, histogram_counts, paired_values};

pub static HISTOGRAM_FILE_NAME: &str = "bmi_histogram.png";
pub static GENDER_BAR_FILE_NAME: &str = "bmi_by_gender.png";
pub static SCATTER_FILE_NAME: &str = "age_vs_systolic.png";

const SIZE: (u32, u32) = (1200, 800);

fn plot_error<E: Display>(name: &str, error: E) -> PipelineError {
    PipelineError::Plot {
        name: name.to_string(),
        message: error.to_string(),
    }
}

/// BMI bin edges 10, 15, ..., 95.
pub fn bmi_bin_edges() -> Vec<f64> {
    (10..100).step_by(5).map(f64::from).collect()
}

/// Age ticks 18, 23, ..., 83.
pub fn age_ticks() -> Vec<f64> {
    (18..85).step_by(5).map(f64::from).collect()
}

/// Pads `min..max` so that a flat or empty series still gets a drawable axis.
fn padded_range(min: f64, max: f64, pad: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    (min - pad, max + pad)
}

pub fn bmi_histogram(values: &[f64], output_path: &Path) -> Result<()> {
    let name = HISTOGRAM_FILE_NAME;
    let edges = bmi_bin_edges();
    let counts = histogram_counts(values, &edges);
    let max_count = counts.iter().copied().max().unwrap_or(0).max(1) as f64;

    let root = BitMapBackend::new(output_path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_error(name, e))?;

    let x_range = (edges[0]..edges[edges.len() - 1]).with_key_points(edges.clone());
    let mut chart = ChartBuilder::on(&root)
        .caption("Distribution of BMI in NHANES 2017-2018", ("sans-serif", 40))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(85)
        .build_cartesian_2d(x_range, 0.0..max_count * 1.1)
        .map_err(|e| plot_error(name, e))?;

    chart
        .configure_mesh()
        .x_desc("BMI")
        .y_desc("Count")
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .label_style(("sans-serif", 25))
        .draw()
        .map_err(|e| plot_error(name, e))?;

    let bars: Vec<(f64, f64, f64)> = edges
        .windows(2)
        .zip(counts.iter())
        .map(|(bin, &count)| (bin[0], bin[1], count as f64))
        .collect();

    chart
        .draw_series(bars.iter().map(|&(left, right, count)| {
            Rectangle::new([(left, 0.0), (right, count)], BLUE.mix(0.6).filled())
        }))
        .map_err(|e| plot_error(name, e))?;
    chart
        .draw_series(bars.iter().map(|&(left, right, count)| {
            Rectangle::new([(left, 0.0), (right, count)], BLACK.stroke_width(1))
        }))
        .map_err(|e| plot_error(name, e))?;

    root.present().map_err(|e| plot_error(name, e))?;
    Ok(())
}

pub fn gender_bar_chart(means: &[(String, f64)], output_path: &Path) -> Result<()> {
    let name = GENDER_BAR_FILE_NAME;
    let top = means.iter().map(|(_, m)| *m).fold(0.0, f64::max).max(1.0);

    let root = BitMapBackend::new(output_path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_error(name, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Average BMI by Gender", ("sans-serif", 40))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(85)
        .build_cartesian_2d((0..means.len() as i32).into_segmented(), 0.0..top * 1.1)
        .map_err(|e| plot_error(name, e))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Gender")
        .y_desc("Mean BMI")
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(i) => means
                .get(*i as usize)
                .map(|(label, _)| label.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .label_style(("sans-serif", 25))
        .draw()
        .map_err(|e| plot_error(name, e))?;

    chart
        .draw_series(means.iter().enumerate().map(|(i, (_, mean))| {
            let i = i as i32;
            Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *mean)],
                BLUE.filled(),
            )
        }))
        .map_err(|e| plot_error(name, e))?;

    root.present().map_err(|e| plot_error(name, e))?;
    Ok(())
}

pub fn age_systolic_scatter(points: &[(f64, f64)], output_path: &Path) -> Result<()> {
    let name = SCATTER_FILE_NAME;
    let ticks = age_ticks();
    let (y_min, y_max) = padded_range(
        points.iter().map(|(_, y)| *y).fold(f64::INFINITY, f64::min),
        points.iter().map(|(_, y)| *y).fold(f64::NEG_INFINITY, f64::max),
        10.0,
    );

    let root = BitMapBackend::new(output_path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_error(name, e))?;

    let x_range = (15.0..85.0).with_key_points(ticks);
    let mut chart = ChartBuilder::on(&root)
        .caption("Age vs Systolic Blood Pressure", ("sans-serif", 40))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(85)
        .build_cartesian_2d(x_range, y_min..y_max)
        .map_err(|e| plot_error(name, e))?;

    chart
        .configure_mesh()
        .x_desc("Age (years)")
        .y_desc("Systolic Blood Pressure")
        .x_label_formatter(&|x| format!("{:.0}", x))
        .label_style(("sans-serif", 25))
        .draw()
        .map_err(|e| plot_error(name, e))?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(age, pressure)| Circle::new((age, pressure), 3, BLUE.mix(0.1).filled())),
        )
        .map_err(|e| plot_error(name, e))?;

    root.present().map_err(|e| plot_error(name, e))?;
    Ok(())
}

/// Renders the three charts into `plot_dir` and returns their paths.
pub fn render_all(analysis: &Analysis, plot_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(plot_dir)?;

    let histogram_path = plot_dir.join(HISTOGRAM_FILE_NAME);
    bmi_histogram(&column_values(&analysis.merged, BMI)?, &histogram_path)?;

    let bar_path = plot_dir.join(GENDER_BAR_FILE_NAME);
    gender_bar_chart(&gender_means(&analysis.bmi_by_gender)?, &bar_path)?;

    let scatter_path = plot_dir.join(SCATTER_FILE_NAME);
    age_systolic_scatter(&paired_values(&analysis.adults, AGE, SYSTOLIC)?, &scatter_path)?;

    let paths = vec![histogram_path, bar_path, scatter_path];
    for path in &paths {
        info!("Wrote {}", path.display());
    }
    Ok(paths)
}
