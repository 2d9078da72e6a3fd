use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::LoadError;
use super::model::CellValue;
use super::schema::ColumnSpec;

// ---------------------------------------------------------------------------
// RawSheet – header row plus loosely typed cells
// ---------------------------------------------------------------------------

static NULL_CELL: CellValue = CellValue::Null;

/// The first worksheet of a file, before any validation.
#[derive(Debug, Clone)]
pub struct RawSheet {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    /// Index of the column matching `spec`.
    pub fn column_index(&self, spec: &ColumnSpec) -> Option<usize> {
        self.headers.iter().position(|h| spec.matches(h))
    }

    /// Resolve every spec to a column index, failing on the first absent one.
    pub fn require_columns(&self, specs: &[ColumnSpec]) -> Result<Vec<usize>, LoadError> {
        specs
            .iter()
            .map(|spec| {
                self.column_index(spec).ok_or_else(|| LoadError::MissingColumn {
                    path: self.path.clone(),
                    column: spec.to_string(),
                })
            })
            .collect()
    }

    /// Cell at `(row, col)`; short rows read as null.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&NULL_CELL)
    }

    /// Number of data rows (header excluded).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read the first sheet of a tabular file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet
/// * `.csv`     – header row, every field read as text
/// * `.parquet` – flat columns of strings, integers, floats or booleans
pub fn read_sheet(path: &Path) -> Result<RawSheet, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path),
        "csv" => read_csv(path),
        "parquet" | "pq" => read_parquet(path),
        other => Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Workbook reader
// ---------------------------------------------------------------------------

fn read_workbook(path: &Path) -> Result<RawSheet, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LoadError::EmptySheet {
            path: path.to_path_buf(),
        })?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| LoadError::EmptySheet {
            path: path.to_path_buf(),
        })?
        .iter()
        .map(|cell| workbook_cell(cell).as_text().unwrap_or_default())
        .collect();

    let rows = rows
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();

    Ok(RawSheet {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

fn workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::from_text(s),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Empty | Data::Error(_) => CellValue::Null,
        other => CellValue::from_text(&other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Fields stay text; typing happens when rows are validated.
fn read_csv(path: &Path) -> Result<RawSheet, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::EmptySheet {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(CellValue::from_text).collect());
    }

    Ok(RawSheet {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Flat columns only (as written by `df.to_parquet()` in pandas or polars).
///
/// Every column is cast to `Int64`, `Float64`, `Utf8` or `Boolean` first;
/// anything that cannot be is rejected.
fn read_parquet(path: &Path) -> Result<RawSheet, LoadError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let headers: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    let targets = schema
        .fields()
        .iter()
        .map(|field| {
            cell_type(field.data_type()).ok_or_else(|| LoadError::UnsupportedColumnType {
                path: path.to_path_buf(),
                column: field.name().clone(),
                data_type: field.data_type().to_string(),
            })
        })
        .collect::<Result<Vec<DataType>, LoadError>>()?;
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch
            .columns()
            .iter()
            .zip(&targets)
            .map(|(col, target)| normalize_column(col, target))
            .collect::<Result<Vec<ArrayRef>, LoadError>>()?;
        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| arrow_cell(col, row)).collect());
        }
    }

    Ok(RawSheet {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

/// The Arrow type a column is read as, `None` when unsupported.
fn cell_type(data_type: &DataType) -> Option<DataType> {
    match data_type {
        DataType::Null => Some(DataType::Null),
        DataType::Boolean => Some(DataType::Boolean),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Some(DataType::Utf8),
        DataType::Decimal128(..) | DataType::Decimal256(..) => Some(DataType::Float64),
        DataType::Dictionary(_, values) => cell_type(values),
        t if t.is_integer() => Some(DataType::Int64),
        t if t.is_floating() => Some(DataType::Float64),
        _ => None,
    }
}

fn normalize_column(col: &ArrayRef, target: &DataType) -> Result<ArrayRef, LoadError> {
    if col.data_type() == target {
        return Ok(Arc::clone(col));
    }
    Ok(cast(col, target)?)
}

/// Extract a single cell from a normalized Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::from_text(col.as_string::<i32>().value(row)),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => CellValue::Null,
    }
}
