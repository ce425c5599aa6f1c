use polars::prelude::{DataType, Field, Schema};

pub const SEQN: &str = "SEQN";
pub const AGE: &str = "RIDAGEYR";
pub const GENDER: &str = "RIAGENDR";
pub const ETHNICITY: &str = "RIDRETH3";
pub const BMI: &str = "BMXBMI";
pub const HEIGHT: &str = "BMXHT";
pub const WEIGHT: &str = "BMXWT";
pub const SYSTOLIC: &str = "BPXSY1";
pub const DIASTOLIC: &str = "BPXDI1";

pub const SYSTOLIC_FILLED: &str = "BPXSY1_filled";
pub const AGE_GROUP: &str = "age_group";

/// Integer codes. Exports write them as `93703.0` when the column had
/// nulls, so they are read as floats and cast once loaded.
pub const CODE_COLUMNS: [&str; 3] = [SEQN, GENDER, ETHNICITY];

pub const ADULT_AGE: f64 = 18.0;

/// Bin edges for the age groups. The last edge is inclusive.
pub const AGE_BIN_EDGES: [f64; 6] = [18.0, 30.0, 45.0, 60.0, 75.0, 100.0];
pub const AGE_GROUP_LABELS: [&str; 5] = ["18-29", "30-44", "45-59", "60-74", "75+"];

pub fn gender_label(code: i64) -> String {
    match code {
        1 => "Male".to_string(),
        2 => "Female".to_string(),
        other => other.to_string(),
    }
}

pub struct NhanesRecord {}

impl NhanesRecord {
    /// DEMO_J carries many more columns; only the ones we read are typed here.
    /// Every column is read as a float; see [`CODE_COLUMNS`].
    pub fn demographics_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new(SEQN, DataType::Float64),
            Field::new(AGE, DataType::Float64),
            Field::new(GENDER, DataType::Float64),
            Field::new(ETHNICITY, DataType::Float64),
        ])
    }

    pub fn body_measures_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new(SEQN, DataType::Float64),
            Field::new(BMI, DataType::Float64),
            Field::new(HEIGHT, DataType::Float64),
            Field::new(WEIGHT, DataType::Float64),
        ])
    }

    pub fn blood_pressure_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new(SEQN, DataType::Float64),
            Field::new(SYSTOLIC, DataType::Float64),
            Field::new(DIASTOLIC, DataType::Float64),
        ])
    }
}
