//! Business record loading
//!
//! Reads the input table with every cell as a string, replaces missing cells
//! with empty strings, and refuses to continue unless all required columns are
//! present. Spreadsheet workbooks (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`)
//! are read from their first worksheet; anything else is delimited text.

use crate::app::models::Record;
use crate::config::ColumnNames;
use crate::{Error, Result};
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Extensions read as spreadsheet workbooks, lowercase
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// How an input file is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Workbook,
    Delimited,
}

impl InputFormat {
    /// Choose by file extension, case-insensitively
    pub fn from_path(path: &Path) -> Self {
        let is_workbook = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                WORKBOOK_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false);

        if is_workbook {
            InputFormat::Workbook
        } else {
            InputFormat::Delimited
        }
    }
}

/// Header plus string cells stored column by column
struct StringTable {
    column_names: Vec<String>,
    columns: Vec<Vec<String>>,
    height: usize,
}

/// Load all records from a column-headered workbook or delimited table
///
/// # Arguments
/// * `path` - Input table
/// * `columns` - Names of the province, canton, parish and business name columns
/// * `delimiter` - Field separator, used for delimited text only
///
/// # Errors
/// * Returns `Error::Io` if the file does not exist
/// * Returns `Error::InputParsing` or `Error::WorkbookParsing` if the table cannot be parsed
/// * Returns `Error::Configuration` if a required column is missing
pub fn load_records(path: &Path, columns: &ColumnNames, delimiter: u8) -> Result<Vec<Record>> {
    info!("Loading business records from {}", path.display());

    if !path.exists() {
        return Err(Error::io(
            format!("Input file not found: {}", path.display()),
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        ));
    }

    let format = InputFormat::from_path(path);
    debug!("Reading {} as {:?}", path.display(), format);
    let table = match format {
        InputFormat::Workbook => read_workbook(path, columns)?,
        InputFormat::Delimited => read_delimited(path, columns, delimiter)?,
    };

    let records = build_records(table, columns);
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Fail with a configuration error naming the first missing required column
pub fn check_required_columns(available: &[String], columns: &ColumnNames) -> Result<()> {
    for required in columns.required() {
        if !available.iter().any(|name| name == required) {
            return Err(Error::configuration(format!(
                "Missing expected column in input: {}",
                required
            )));
        }
    }
    Ok(())
}

/// Read delimited text through polars with schema inference off
fn read_delimited(path: &Path, columns: &ColumnNames, delimiter: u8) -> Result<StringTable> {
    let file = path.to_string_lossy().to_string();

    // Schema inference off: every column is read as a string column
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|options| options.with_separator(delimiter))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| Error::input_parsing(&file, "Failed to read input table", e))?;

    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.as_str().to_string())
        .collect();
    debug!("Input columns: {:?}", column_names);

    check_required_columns(&column_names, columns)?;

    let values = column_names
        .iter()
        .map(|name| column_values(&df, name, &file))
        .collect::<Result<Vec<_>>>()?;

    Ok(StringTable {
        column_names,
        columns: values,
        height: df.height(),
    })
}

/// Read one column as strings, with nulls as empty strings
fn column_values(df: &DataFrame, name: &str, file: &str) -> Result<Vec<String>> {
    let series = df
        .column(name)
        .and_then(|column| column.as_materialized_series().cast(&DataType::String))
        .map_err(|e| Error::input_parsing(file, format!("Failed to read column '{}'", name), e))?;

    let chunked = series
        .str()
        .map_err(|e| Error::input_parsing(file, format!("Column '{}' is not text", name), e))?;

    Ok(chunked
        .into_iter()
        .map(|value| value.unwrap_or_default().to_string())
        .collect())
}

/// Read the first worksheet; its first row is the header
fn read_workbook(path: &Path, columns: &ColumnNames) -> Result<StringTable> {
    let file = path.to_string_lossy().to_string();

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| Error::workbook_parsing(&file, "Failed to open workbook", e))?;
    let sheet_names = workbook.sheet_names();
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::configuration(format!("Workbook {} has no worksheets", file)))?
        .map_err(|e| Error::workbook_parsing(&file, "Failed to read first worksheet", e))?;
    if sheet_names.len() > 1 {
        warn!(
            "Workbook {} has {} worksheets; only '{}' is read",
            file,
            sheet_names.len(),
            sheet_names[0]
        );
    }

    let mut rows = range.rows();
    let column_names: Vec<String> = rows
        .next()
        .map(|header| {
            header
                .iter()
                .enumerate()
                .map(|(i, cell)| match cell_text(cell) {
                    name if name.is_empty() => format!("Unnamed: {}", i),
                    name => name,
                })
                .collect()
        })
        .unwrap_or_default();
    debug!("Input columns: {:?}", column_names);

    check_required_columns(&column_names, columns)?;

    let mut values: Vec<Vec<String>> = vec![Vec::new(); column_names.len()];
    let mut height = 0;
    for row in rows {
        for (i, column) in values.iter_mut().enumerate() {
            column.push(row.get(i).map(cell_text).unwrap_or_default());
        }
        height += 1;
    }

    Ok(StringTable {
        column_names,
        columns: values,
        height,
    })
}

/// Cell as text; empty cells are `""` and numbers use their shortest form
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Split the table into required fields and passthrough columns
fn build_records(table: StringTable, columns: &ColumnNames) -> Vec<Record> {
    let mut values: BTreeMap<String, Vec<String>> = table
        .column_names
        .into_iter()
        .zip(table.columns)
        .collect();

    // Required columns leave the map; whatever remains is passthrough
    let provinces = values.remove(&columns.province).unwrap_or_default();
    let cantons = values.remove(&columns.canton).unwrap_or_default();
    let parishes = values.remove(&columns.parish).unwrap_or_default();
    let names = values.remove(&columns.business_name).unwrap_or_default();

    (0..table.height)
        .map(|row| {
            let passthrough = values
                .iter()
                .map(|(name, column)| (name.clone(), column[row].clone()))
                .collect();

            Record::new(
                provinces[row].clone(),
                cantons[row].clone(),
                parishes[row].clone(),
                names[row].clone(),
            )
            .with_passthrough(passthrough)
        })
        .collect()
}
