//! Small NHANES-shaped survey written to disk for tests.
//!
//! Ten participants; SEQN 3 and 7 are children, 7 and 10 have no body
//! measures, 3 and 7 have no blood pressure reading. A few codes are
//! written as `4.0`, the way pandas exports integer columns that had nulls.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use csv::Writer;
use polars::prelude::DataFrame;

use crate::config::PipelineConfig;
use crate::records::SEQN;

const RECORD_LEN: usize = 80;
const NAMESTR_LEN: usize = 140;

pub const DEMOGRAPHICS: [[&str; 4]; 10] = [
    ["1", "25", "1", "3"],
    ["2", "35", "2", "4"],
    ["3", "10", "1", "3"],
    ["4.0", "50", "2.0", "1.0"],
    ["5", "70", "1", "3"],
    ["6", "80", "2", "4"],
    ["7", "17", "2", "6"],
    ["8", "29", "2", "3"],
    ["9", "30", "1", "1"],
    ["10", "45", "1", "6"],
];

pub const BODY_MEASURES: [[&str; 4]; 8] = [
    ["1", "22.5", "175.0", "69.0"],
    ["2", "31.0", "160.0", "79.0"],
    ["3", "17.0", "140.0", "33.0"],
    ["4.0", "27.5", "165.0", "75.0"],
    ["5", "", "170.0", ""],
    ["6", "24.0", "158.0", "60.0"],
    ["8", "35.5", "162.0", "93.0"],
    ["9", "26.0", "180.0", "84.0"],
];

pub const BLOOD_PRESSURE: [[&str; 3]; 8] = [
    ["1", "118", "72"],
    ["2", "124", "80"],
    ["4", "138", "85"],
    ["5", "150", "78"],
    ["6", "", ""],
    ["8", "112", "70"],
    ["9", "130", ""],
    ["10", "128", "82"],
];

fn write_csv<const N: usize>(path: &Path, header: [&str; N], rows: &[[&str; N]]) {
    let mut writer = Writer::from_path(path).unwrap();
    writer.write_record(header).unwrap();
    for row in rows {
        writer.write_record(row).unwrap();
    }
    writer.flush().unwrap();
}

/// Writes the three tables into `dir` and returns a config pointing at them.
pub fn write_survey(dir: &Path) -> PipelineConfig {
    let config = PipelineConfig {
        demographics: dir.join("DEMO_J.csv"),
        body_measures: dir.join("BMX_J.csv"),
        blood_pressure: dir.join("BPX_J.csv"),
        plot_dir: dir.join("plots"),
    };

    write_csv(
        &config.demographics,
        ["SEQN", "RIDAGEYR", "RIAGENDR", "RIDRETH3"],
        &DEMOGRAPHICS,
    );
    write_csv(
        &config.body_measures,
        ["SEQN", "BMXBMI", "BMXHT", "BMXWT"],
        &BODY_MEASURES,
    );
    write_csv(
        &config.blood_pressure,
        ["SEQN", "BPXSY1", "BPXDI1"],
        &BLOOD_PRESSURE,
    );

    config
}

fn column_values<const N: usize>(rows: &[[&str; N]], index: usize) -> Vec<Option<f64>> {
    rows.iter()
        .map(|row| row[index].parse::<f64>().ok())
        .collect()
}

fn write_xpt<const N: usize>(path: &Path, header: [&str; N], rows: &[[&str; N]]) {
    let columns: Vec<(&str, Vec<Option<f64>>)> = header
        .iter()
        .enumerate()
        .map(|(index, name)| (*name, column_values(rows, index)))
        .collect();
    fs::write(path, encode_xpt(&columns)).unwrap();
}

/// Same survey as [`write_survey`], as SAS transport files.
pub fn write_survey_xpt(dir: &Path) -> PipelineConfig {
    let config = PipelineConfig {
        demographics: dir.join("DEMO_J.XPT"),
        body_measures: dir.join("BMX_J.XPT"),
        blood_pressure: dir.join("BPX_J.XPT"),
        plot_dir: dir.join("plots"),
    };

    write_xpt(
        &config.demographics,
        ["SEQN", "RIDAGEYR", "RIAGENDR", "RIDRETH3"],
        &DEMOGRAPHICS,
    );
    write_xpt(
        &config.body_measures,
        ["SEQN", "BMXBMI", "BMXHT", "BMXWT"],
        &BODY_MEASURES,
    );
    write_xpt(
        &config.blood_pressure,
        ["SEQN", "BPXSY1", "BPXDI1"],
        &BLOOD_PRESSURE,
    );

    config
}

/// Encodes `value` as an 8-byte IBM hexadecimal float; `None` is SAS `.`.
pub fn f64_to_ibm(value: Option<f64>) -> [u8; 8] {
    let value = match value {
        None => return [b'.', 0, 0, 0, 0, 0, 0, 0],
        Some(v) if v == 0.0 => return [0; 8],
        Some(v) => v,
    };

    let sign = if value < 0.0 { 0x80u8 } else { 0 };
    let mut fraction = value.abs();
    let mut exponent = 0i32;
    while fraction >= 1.0 {
        fraction /= 16.0;
        exponent += 1;
    }
    while fraction < 1.0 / 16.0 {
        fraction *= 16.0;
        exponent -= 1;
    }

    let mantissa = (fraction * 2f64.powi(56)) as u64;
    let mut bytes = mantissa.to_be_bytes();
    bytes[0] = sign | (exponent + 64) as u8;
    bytes
}

fn header_record(kind: &str, numbers: &str) -> Vec<u8> {
    let mut record = format!("HEADER RECORD*******{:<8}HEADER RECORD!!!!!!!{}", kind, numbers)
        .into_bytes();
    record.resize(RECORD_LEN, b' ');
    record
}

fn pad_to_record(bytes: &mut Vec<u8>) {
    let padded = bytes.len().div_ceil(RECORD_LEN) * RECORD_LEN;
    bytes.resize(padded, b' ');
}

/// Builds a single-member transport library of 8-byte numeric columns.
pub fn encode_xpt(columns: &[(&str, Vec<Option<f64>>)]) -> Vec<u8> {
    let mut bytes = header_record("LIBRARY", &"0".repeat(30));
    bytes.extend([b' '; 2 * RECORD_LEN]);

    bytes.extend(header_record(
        "MEMBER",
        &format!("{}{:04}", "0".repeat(26), NAMESTR_LEN),
    ));
    bytes.extend(header_record("DSCRPTR", &"0".repeat(30)));
    bytes.extend([b' '; 2 * RECORD_LEN]);

    bytes.extend(header_record(
        "NAMESTR",
        &format!("000000{:04}{}", columns.len(), "0".repeat(20)),
    ));
    let mut namestrs = Vec::new();
    for (index, (name, _)) in columns.iter().enumerate() {
        let mut entry = vec![0u8; NAMESTR_LEN];
        entry[0..2].copy_from_slice(&1i16.to_be_bytes());
        entry[4..6].copy_from_slice(&8i16.to_be_bytes());
        entry[6..8].copy_from_slice(&(index as i16 + 1).to_be_bytes());
        entry[8..16].copy_from_slice(format!("{:<8}", name).as_bytes());
        entry[84..88].copy_from_slice(&(index as i32 * 8).to_be_bytes());
        namestrs.extend(entry);
    }
    pad_to_record(&mut namestrs);
    bytes.extend(namestrs);

    bytes.extend(header_record("OBS", &"0".repeat(30)));
    let rows = columns.first().map(|(_, values)| values.len()).unwrap_or(0);
    let mut observations = Vec::new();
    for row in 0..rows {
        for (_, values) in columns {
            observations.extend(f64_to_ibm(values[row]));
        }
    }
    pad_to_record(&mut observations);
    bytes.extend(observations);

    bytes
}

/// Maps each participant to its value in `column`.
pub fn f64_by_seqn(df: &DataFrame, column: &str) -> HashMap<i64, Option<f64>> {
    let ids = df.column(SEQN).unwrap().i64().unwrap();
    let values = df.column(column).unwrap().f64().unwrap();
    ids.into_iter()
        .zip(values.into_iter())
        .map(|(id, value)| (id.unwrap(), value))
        .collect()
}
