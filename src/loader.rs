use std::fs::{self, File};
use std::path::Path;

use log::{debug, info};
use polars::prelude::*;
use polars_io::parquet::ParquetReader;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::records::{NhanesRecord, CODE_COLUMNS};
use crate::xpt;

/// The three survey tables, as read from disk.
pub struct Sources {
    pub demographics: DataFrame,
    pub body_measures: DataFrame,
    pub blood_pressure: DataFrame,
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| PipelineError::Open {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_csv<P: AsRef<Path>>(path: P, schema: Schema) -> Result<DataFrame> {
    let file = open(path.as_ref())?;

    let df = CsvReader::new(file)
        .has_header(true)
        .with_dtypes(Option::from(Arc::new(schema)))
        .finish()?;
    Ok(df)
}

/// Casts the `schema` columns of a self-describing file (parquet, XPT) to
/// the dtypes the CSV reader would produce.
fn conform(mut df: DataFrame, schema: &Schema) -> Result<DataFrame> {
    for (name, dtype) in schema.iter() {
        let casted = df.column(name.as_str())?.cast(dtype)?;
        df.with_column(casted)?;
    }
    Ok(df)
}

/// Code columns arrive as floats; turn them back into integers.
fn cast_codes(mut df: DataFrame) -> Result<DataFrame> {
    for name in CODE_COLUMNS {
        let casted = match df.column(name) {
            Ok(column) => column.cast(&DataType::Int64)?,
            Err(_) => continue,
        };
        df.with_column(casted)?;
    }
    Ok(df)
}

pub fn read_parquet<P: AsRef<Path>>(path: P, schema: Schema) -> Result<DataFrame> {
    let file = open(path.as_ref())?;
    let df = ParquetReader::new(file).finish()?;
    conform(df, &schema)
}

pub fn read_xpt<P: AsRef<Path>>(path: P, schema: Schema) -> Result<DataFrame> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| PipelineError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Decoding {} bytes of SAS transport from {}", bytes.len(), path.display());

    let df = xpt::parse(&bytes).map_err(|source| PipelineError::Transport {
        path: path.to_path_buf(),
        source,
    })?;
    conform(df, &schema)
}

/// Reads a `.XPT`, `.csv` or `.parquet` table fully into memory.
pub fn read_table<P: AsRef<Path>>(path: P, schema: Schema) -> Result<DataFrame> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let df = match extension.as_deref() {
        Some("csv") => read_csv(path, schema)?,
        Some("parquet") => read_parquet(path, schema)?,
        Some("xpt") => read_xpt(path, schema)?,
        _ => {
            return Err(PipelineError::InputFormat {
                path: path.to_path_buf(),
            })
        }
    };
    let df = cast_codes(df)?;

    info!("Loaded {} ({} rows, {} columns)", path.display(), df.height(), df.width());
    Ok(df)
}

pub fn load_sources(config: &PipelineConfig) -> Result<Sources> {
    Ok(Sources {
        demographics: read_table(&config.demographics, NhanesRecord::demographics_schema())?,
        body_measures: read_table(&config.body_measures, NhanesRecord::body_measures_schema())?,
        blood_pressure: read_table(&config.blood_pressure, NhanesRecord::blood_pressure_schema())?,
    })
}
