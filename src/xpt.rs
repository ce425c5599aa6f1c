//! SAS transport (XPORT v5) decoding.
//!
//! The NHANES tables are published as `.XPT` files: 80-byte header records,
//! one 140-byte namestr per variable, then fixed-width observations with
//! numerics stored as big-endian IBM hexadecimal floats.
//!
//! Only the first member of a library is read.

use polars::prelude::*;
use thiserror::Error;

const RECORD_LEN: usize = 80;
const DEFAULT_NAMESTR_LEN: usize = 140;

const LIBRARY_HEADER: &[u8] = b"HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!";
const MEMBER_HEADER: &[u8] = b"HEADER RECORD*******MEMBER  HEADER RECORD!!!!!!!";
const DESCRIPTOR_HEADER: &[u8] = b"HEADER RECORD*******DSCRPTR HEADER RECORD!!!!!!!";
const NAMESTR_HEADER: &[u8] = b"HEADER RECORD*******NAMESTR HEADER RECORD!!!!!!!";
const OBS_HEADER: &[u8] = b"HEADER RECORD*******OBS     HEADER RECORD!!!!!!!";

#[derive(Error, Debug)]
pub enum XptError {
    #[error("file ends inside the {0}")]
    Truncated(&'static str),
    #[error("expected the {0} header record")]
    MissingHeader(&'static str),
    #[error("bad number {text:?} in the {field} field")]
    BadNumber { field: &'static str, text: String },
    #[error("variable {name} has unsupported layout (type {kind}, length {length})")]
    BadVariable { name: String, kind: i16, length: usize },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

type Result<T> = std::result::Result<T, XptError>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum VariableKind {
    Numeric,
    Character,
}

#[derive(Debug, Clone)]
struct Variable {
    name: String,
    kind: VariableKind,
    length: usize,
    position: usize,
}

struct Records<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Records<'a> {
    fn take(&mut self, len: usize, what: &'static str) -> Result<&'a [u8]> {
        let end = self.offset + len;
        let slice = self.bytes.get(self.offset..end).ok_or(XptError::Truncated(what))?;
        self.offset = end;
        Ok(slice)
    }

    fn header(&mut self, prefix: &[u8], what: &'static str) -> Result<&'a [u8]> {
        let record = self.take(RECORD_LEN, what)?;
        if !record.starts_with(prefix) {
            return Err(XptError::MissingHeader(what));
        }
        Ok(record)
    }

    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.offset..]
    }
}

fn ascii_number(bytes: &[u8], field: &'static str) -> Result<usize> {
    let text = String::from_utf8_lossy(bytes);
    text.trim().parse().map_err(|_| XptError::BadNumber {
        field,
        text: text.to_string(),
    })
}

fn padded_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches([' ', '\0'])
        .to_string()
}

fn be_i16(bytes: &[u8]) -> i16 {
    i16::from_be_bytes([bytes[0], bytes[1]])
}

fn parse_namestr(entry: &[u8]) -> Result<Variable> {
    let kind = be_i16(&entry[0..2]);
    let length = be_i16(&entry[4..6]).max(0) as usize;
    let name = padded_text(&entry[8..16]);
    let position = i32::from_be_bytes([entry[84], entry[85], entry[86], entry[87]]);
    let position = position.max(0) as usize;

    let kind = match (kind, length) {
        (1, 2..=8) => VariableKind::Numeric,
        (2, len) if len > 0 => VariableKind::Character,
        _ => return Err(XptError::BadVariable { name, kind, length }),
    };
    Ok(Variable {
        name,
        kind,
        length,
        position,
    })
}

/// Converts an IBM System/360 hexadecimal float (2 to 8 bytes, big-endian)
/// to `f64`. SAS missing values (`.`, `._`, `.A`-`.Z`) come back as `None`.
pub fn ibm_to_f64(bytes: &[u8]) -> Option<f64> {
    let mut raw = [0u8; 8];
    raw[..bytes.len()].copy_from_slice(bytes);

    let first = raw[0];
    let missing_tag = first == b'.' || first == b'_' || first.is_ascii_uppercase();
    if missing_tag && raw[1..].iter().all(|b| *b == 0) {
        return None;
    }

    let mantissa = u64::from_be_bytes([0, raw[1], raw[2], raw[3], raw[4], raw[5], raw[6], raw[7]]);
    if mantissa == 0 {
        return Some(0.0);
    }

    let exponent = (first & 0x7f) as i32 - 64;
    let magnitude = mantissa as f64 * 2f64.powi(4 * exponent - 56);
    Some(if first & 0x80 != 0 { -magnitude } else { magnitude })
}

/// Number of complete observations in `data`.
///
/// The observation block is padded with spaces to a record boundary. When an
/// observation is shorter than a record the padding can look like extra
/// rows, so trailing blanks of the last record are discounted first.
fn observation_count(data: &[u8], row_len: usize) -> usize {
    if row_len >= RECORD_LEN || data.len() < RECORD_LEN {
        return data.len() / row_len;
    }
    let last_record = &data[data.len() - RECORD_LEN..];
    let padding = last_record.iter().rev().take_while(|b| **b == b' ').count();
    (data.len() - padding) / row_len
}

/// Stops the observation block at the next member header, if any.
fn first_member(data: &[u8]) -> &[u8] {
    let end = data
        .chunks(RECORD_LEN)
        .position(|record| record.starts_with(MEMBER_HEADER))
        .map(|index| index * RECORD_LEN)
        .unwrap_or(data.len());
    &data[..end]
}

fn column(variable: &Variable, rows: &[&[u8]]) -> Series {
    let range = variable.position..variable.position + variable.length;
    match variable.kind {
        VariableKind::Numeric => {
            let values: Vec<Option<f64>> = rows
                .iter()
                .map(|row| ibm_to_f64(&row[range.clone()]))
                .collect();
            Series::new(&variable.name, values)
        }
        VariableKind::Character => {
            let values: Vec<Option<String>> = rows
                .iter()
                .map(|row| Some(padded_text(&row[range.clone()])).filter(|s| !s.is_empty()))
                .collect();
            Series::new(&variable.name, values)
        }
    }
}

/// Decodes the first member of a transport library into a `DataFrame`.
pub fn parse(bytes: &[u8]) -> Result<DataFrame> {
    let mut records = Records { bytes, offset: 0 };

    records.header(LIBRARY_HEADER, "library header")?;
    records.take(2 * RECORD_LEN, "library header")?;

    let member = records.header(MEMBER_HEADER, "member header")?;
    let namestr_len = match ascii_number(&member[74..78], "namestr length")? {
        0 => DEFAULT_NAMESTR_LEN,
        len => len,
    };
    records.header(DESCRIPTOR_HEADER, "descriptor header")?;
    records.take(2 * RECORD_LEN, "member descriptor")?;

    let namestr = records.header(NAMESTR_HEADER, "namestr header")?;
    let variable_count = ascii_number(&namestr[54..58], "variable count")?;

    let namestr_bytes = variable_count * namestr_len;
    let padded = namestr_bytes.div_ceil(RECORD_LEN) * RECORD_LEN;
    let block = records.take(padded, "namestr records")?;
    let variables = block[..namestr_bytes]
        .chunks(namestr_len)
        .map(parse_namestr)
        .collect::<Result<Vec<_>>>()?;

    records.header(OBS_HEADER, "observation header")?;

    let row_len = variables
        .iter()
        .map(|v| v.position + v.length)
        .max()
        .unwrap_or(0);
    let data = first_member(records.rest());
    let rows: Vec<&[u8]> = if row_len == 0 {
        Vec::new()
    } else {
        data.chunks_exact(row_len)
            .take(observation_count(data, row_len))
            .collect()
    };

    let columns = variables.iter().map(|v| column(v, &rows)).collect();
    Ok(DataFrame::new(columns)?)
}
