// src/dataset.rs - JSON record tables in, single-key result mappings out
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use crate::error::{DatasetKind, MatchError, Result};
use crate::models::core::{MasterRecord, MatchResult, QueryRecord};

pub const MASTER_CODE_COLUMN: &str = "Master_Code";
pub const MASTER_NAME_COLUMN: &str = "Master_Name";
pub const BUYER_NAME_COLUMN: &str = "Buyer_Name";

/// Rows of a record-oriented table (`[{"col": value, ...}, ...]`), after
/// checking it is non-empty and that every required column appears.
fn records<'a>(value: &'a Value, dataset: DatasetKind, required: &[&str]) -> Result<&'a [Value]> {
    let rows = value
        .as_array()
        .ok_or_else(|| MatchError::contract(dataset, "expected a JSON array of row objects"))?;

    if rows.is_empty() {
        return Err(MatchError::contract(dataset, "dataset has no rows"));
    }

    for column in required {
        let present = rows
            .iter()
            .any(|row| row.as_object().is_some_and(|obj| obj.contains_key(*column)));
        if !present {
            return Err(MatchError::contract(dataset, format!("missing required column '{}'", column)));
        }
    }

    Ok(rows)
}

fn text_cell(row: &Value, column: &str) -> Option<String> {
    match row.get(column) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Codes are identifiers, so numeric codes are kept in their textual form.
fn code_cell(row: &Value, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

pub fn parse_master(value: &Value) -> Result<Vec<MasterRecord>> {
    let rows = records(value, DatasetKind::Master, &[MASTER_CODE_COLUMN, MASTER_NAME_COLUMN])?;
    Ok(rows
        .iter()
        .map(|row| MasterRecord {
            code: code_cell(row, MASTER_CODE_COLUMN),
            name: text_cell(row, MASTER_NAME_COLUMN),
        })
        .collect())
}

pub fn parse_queries(value: &Value) -> Result<Vec<QueryRecord>> {
    let rows = records(value, DatasetKind::Query, &[BUYER_NAME_COLUMN])?;
    Ok(rows
        .iter()
        .map(|row| QueryRecord {
            raw_name: text_cell(row, BUYER_NAME_COLUMN),
        })
        .collect())
}

fn read_json(path: &Path) -> Result<Value> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

pub fn load_master(path: &Path) -> Result<Vec<MasterRecord>> {
    parse_master(&read_json(path)?)
}

pub fn load_queries(path: &Path) -> Result<Vec<QueryRecord>> {
    parse_queries(&read_json(path)?)
}

/// `[{"<query name>": ["candidate", ...]}, ...]`, in result order.
pub fn results_to_json(results: &[MatchResult]) -> Value {
    Value::Array(
        results
            .iter()
            .map(|r| {
                let mut entry = Map::with_capacity(1);
                entry.insert(
                    r.query_name.clone(),
                    Value::Array(r.candidates.iter().cloned().map(Value::String).collect()),
                );
                Value::Object(entry)
            })
            .collect(),
    )
}

pub fn write_results<W: Write>(mut writer: W, results: &[MatchResult]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, &results_to_json(results))?;
    writer.flush()?;
    Ok(())
}
