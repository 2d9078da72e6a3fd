use std::collections::BTreeMap;
use std::sync::Arc;

use super::error::LoadError;
use super::model::{CellValue, DimensionValues, Record, UnifiedTable};
use super::resolver::IndustryResolver;
use super::schema::{
    pad_stock_code, ColumnSpec, TechDimension, COMPANY_NAME, INDUSTRY_NAME, STOCK_CODE,
    STOCK_CODE_FULL, TOTAL_WORD_FREQ, YEAR, YEAR_NUMBER,
};
use super::sheet::{read_sheet, RawSheet};
use crate::config::DashboardConfig;

// ---------------------------------------------------------------------------
// Outcome of a load
// ---------------------------------------------------------------------------

/// Result of [`load`]: the table (when the load succeeded) plus the status
/// line and any non-fatal warnings for the UI.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: Option<Arc<UnifiedTable>>,
    pub status: String,
    pub warnings: Vec<String>,
    /// Category of the failure, `None` on success.
    pub error_category: Option<&'static str>,
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }
}

/// A successful load before it is turned into a [`LoadOutcome`].
#[derive(Debug)]
pub struct LoadedTable {
    pub table: UnifiedTable,
    /// Whether the classification file was read and joined.
    pub used_secondary: bool,
    pub warnings: Vec<String>,
}

impl LoadedTable {
    pub fn status(&self) -> String {
        let mut status = format!("Data loaded: {} records", self.table.len());
        if self.used_secondary {
            if let Some(ratio) = self.table.classified_ratio() {
                status.push_str(&format!(" | industry match rate: {:.2}%", ratio * 100.0));
            }
        }
        status
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load, join, classify and score both datasets.
///
/// Never fails: every error is turned into an absent table plus a status
/// message naming the error category.
pub fn load(config: &DashboardConfig, resolver: &IndustryResolver) -> LoadOutcome {
    match try_load(config, resolver) {
        Ok(loaded) => {
            let status = loaded.status();
            log::info!("{status}");
            LoadOutcome {
                status,
                warnings: loaded.warnings,
                table: Some(Arc::new(loaded.table)),
                error_category: None,
            }
        }
        Err(e) if e.is_configuration_absence() => {
            log::warn!("{e}");
            LoadOutcome {
                table: None,
                status: e.to_string(),
                warnings: Vec::new(),
                error_category: Some(e.category()),
            }
        }
        Err(e) => {
            log::error!("Data load failed: {e}");
            LoadOutcome {
                table: None,
                status: format!("Data load failed: {e}\nError category: {}", e.category()),
                warnings: Vec::new(),
                error_category: Some(e.category()),
            }
        }
    }
}

/// The load pipeline with errors propagated.
pub fn try_load(
    config: &DashboardConfig,
    resolver: &IndustryResolver,
) -> Result<LoadedTable, LoadError> {
    if !config.data_dir.is_dir() {
        std::fs::create_dir_all(&config.data_dir)?;
        return Err(LoadError::DataDirMissing {
            dir: config.data_dir.clone(),
        });
    }

    let primary_path = config.primary_path();
    if !primary_path.is_file() {
        return Err(LoadError::PrimaryMissing { path: primary_path });
    }

    let primary: Vec<PrimaryRow> = read_primary(&read_sheet(&primary_path)?)?
        .into_iter()
        .filter(|row| row.year >= config.year_cutoff)
        .collect();

    let secondary_path = config.secondary_path();
    let mut warnings = Vec::new();
    let labels = if secondary_path.is_file() {
        let labels = read_secondary(&read_sheet(&secondary_path)?, config.year_cutoff)?;
        Some(labels)
    } else {
        let warning = format!(
            "Industry file not found: {}; industries come from the built-in tables only",
            secondary_path.display()
        );
        log::warn!("{warning}");
        warnings.push(warning);
        None
    };

    let table = merge(
        primary,
        labels.as_ref(),
        resolver,
        &config.unknown_company_label,
    );
    log::debug!(
        "merged {} records from {}",
        table.len(),
        primary_path.display()
    );

    Ok(LoadedTable {
        table,
        used_secondary: labels.is_some(),
        warnings,
    })
}

// ---------------------------------------------------------------------------
// Primary (word-frequency) file
// ---------------------------------------------------------------------------

/// One validated row of the word-frequency file.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryRow {
    pub stock_code: String,
    pub year: i32,
    pub company_name: Option<String>,
    pub total_word_freq: u64,
    pub dimensions: DimensionValues,
}

pub fn read_primary(sheet: &RawSheet) -> Result<Vec<PrimaryRow>, LoadError> {
    let [code_idx, year_idx, name_idx, total_idx] =
        required_indices(sheet, [STOCK_CODE, YEAR, COMPANY_NAME, TOTAL_WORD_FREQ])?;
    let dim_specs: Vec<ColumnSpec> = TechDimension::ALL.iter().map(|d| d.column()).collect();
    let dim_indices = sheet.require_columns(&dim_specs)?;

    let mut rows = Vec::with_capacity(sheet.len());
    for row in 0..sheet.len() {
        let cells = CellReader { sheet, row };

        let stock_code = cells.stock_code(code_idx, &STOCK_CODE)?;
        let year = cells.year(year_idx, &YEAR)?;
        let company_name = sheet.cell(row, name_idx).as_text();
        let total_word_freq = cells.count(total_idx, &TOTAL_WORD_FREQ)?;

        let mut dimensions = DimensionValues::default();
        for (dim, &col) in TechDimension::ALL.iter().zip(&dim_indices) {
            dimensions.set(*dim, sheet.cell(row, col).as_number_or_zero());
        }

        rows.push(PrimaryRow {
            stock_code,
            year,
            company_name,
            total_word_freq,
            dimensions,
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Secondary (industry classification) file
// ---------------------------------------------------------------------------

/// Prior industry labels keyed by (identifier, year).  A key may carry
/// several labels when the classification file repeats a company-year.
pub type IndustryLabels = BTreeMap<(String, i32), Vec<Option<String>>>;

pub fn read_secondary(sheet: &RawSheet, year_cutoff: i32) -> Result<IndustryLabels, LoadError> {
    let [code_idx, year_idx, label_idx] =
        required_indices(sheet, [STOCK_CODE_FULL, YEAR_NUMBER, INDUSTRY_NAME])?;

    let mut labels = IndustryLabels::new();
    for row in 0..sheet.len() {
        let cells = CellReader { sheet, row };
        let stock_code = cells.stock_code(code_idx, &STOCK_CODE_FULL)?;
        let year = cells.year(year_idx, &YEAR_NUMBER)?;
        if year < year_cutoff {
            continue;
        }
        let label = sheet.cell(row, label_idx).as_text();
        labels.entry((stock_code, year)).or_default().push(label);
    }
    Ok(labels)
}

// ---------------------------------------------------------------------------
// Join + classify + score
// ---------------------------------------------------------------------------

/// Left-join the primary rows to the prior labels and build the table.
pub fn merge(
    primary: Vec<PrimaryRow>,
    labels: Option<&IndustryLabels>,
    resolver: &IndustryResolver,
    unknown_company_label: &str,
) -> UnifiedTable {
    let no_match: [Option<String>; 1] = [None];
    let mut records = Vec::with_capacity(primary.len());

    for row in primary {
        let priors: &[Option<String>] = labels
            .and_then(|l| l.get(&(row.stock_code.clone(), row.year)))
            .map(Vec::as_slice)
            .unwrap_or(&no_match);

        for prior in priors {
            let industry = resolver
                .resolve(&row.stock_code, row.company_name.as_deref(), prior.as_deref())
                .to_string();
            let company_name = row
                .company_name
                .clone()
                .unwrap_or_else(|| unknown_company_label.to_string());
            records.push(Record::new(
                row.stock_code.clone(),
                company_name,
                row.year,
                row.total_word_freq,
                row.dimensions,
                industry,
            ));
        }
    }

    UnifiedTable::new(records, resolver.unclassified_label())
}

// ---------------------------------------------------------------------------
// Cell validation helpers
// ---------------------------------------------------------------------------

fn required_indices<const N: usize>(
    sheet: &RawSheet,
    specs: [ColumnSpec; N],
) -> Result<[usize; N], LoadError> {
    let indices = sheet.require_columns(&specs)?;
    let mut out = [0usize; N];
    out.copy_from_slice(&indices);
    Ok(out)
}

struct CellReader<'a> {
    sheet: &'a RawSheet,
    row: usize,
}

impl CellReader<'_> {
    fn invalid(&self, spec: &ColumnSpec, expected: &'static str, value: &CellValue) -> LoadError {
        LoadError::InvalidCell {
            path: self.sheet.path.clone(),
            // header is spreadsheet row 1
            row: self.row + 2,
            column: spec.name.to_string(),
            expected,
            value: value.to_string(),
        }
    }

    /// Required identifier, zero-padded.
    fn stock_code(&self, col: usize, spec: &ColumnSpec) -> Result<String, LoadError> {
        let cell = self.sheet.cell(self.row, col);
        cell.as_text()
            .map(|code| pad_stock_code(&code))
            .ok_or_else(|| self.invalid(spec, "an identifier", cell))
    }

    /// Year; a blank cell reads as 0 so the cutoff drops it.
    fn year(&self, col: usize, spec: &ColumnSpec) -> Result<i32, LoadError> {
        let cell = self.sheet.cell(self.row, col);
        if cell.is_null() {
            return Ok(0);
        }
        cell.as_integer()
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(|| self.invalid(spec, "an integer year", cell))
    }

    /// Required non-negative integer count.
    fn count(&self, col: usize, spec: &ColumnSpec) -> Result<u64, LoadError> {
        let cell = self.sheet.cell(self.row, col);
        cell.as_integer()
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| self.invalid(spec, "a non-negative integer", cell))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn primary_headers() -> Vec<String> {
        let mut headers: Vec<String> = ["stock_code", "year", "company_name", "total_word_freq"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        headers.extend(TechDimension::ALL.iter().map(|d| d.column().name.to_string()));
        headers
    }

    fn primary_row(code: &str, year: &str, name: &str, total: &str, dim: &str) -> Vec<CellValue> {
        let mut row = vec![
            CellValue::from_text(code),
            CellValue::from_text(year),
            CellValue::from_text(name),
            CellValue::from_text(total),
        ];
        row.extend(std::iter::repeat(CellValue::from_text(dim)).take(12));
        row
    }

    fn sheet(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> RawSheet {
        RawSheet {
            path: PathBuf::from("words.csv"),
            headers,
            rows,
        }
    }

    #[test]
    fn primary_rows_are_typed_at_the_boundary() {
        let raw = sheet(
            primary_headers(),
            vec![
                primary_row("1", "2020", "平安银行", "12", "0.5"),
                primary_row("600519", "", "", "3", "x"),
            ],
        );
        let rows = read_primary(&raw).unwrap();
        assert_eq!(rows[0].stock_code, "000001");
        assert_eq!(rows[0].year, 2020);
        assert_eq!(rows[0].company_name.as_deref(), Some("平安银行"));
        assert_eq!(rows[0].dimensions.get(TechDimension::BigData), 0.5);
        assert_eq!(rows[1].year, 0);
        assert_eq!(rows[1].company_name, None);
        assert_eq!(rows[1].dimensions.get(TechDimension::Blockchain), 0.0);
    }

    #[test]
    fn unparseable_count_fails_the_whole_read() {
        let raw = sheet(
            primary_headers(),
            vec![
                primary_row("1", "2020", "a", "12", "0"),
                primary_row("2", "2020", "b", "many", "0"),
            ],
        );
        let err = read_primary(&raw).unwrap_err();
        match err {
            LoadError::InvalidCell { row, column, .. } => {
                assert_eq!(row, 3);
                assert_eq!(column, "total_word_freq");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn negative_count_is_invalid() {
        let raw = sheet(primary_headers(), vec![primary_row("1", "2020", "a", "-4", "0")]);
        assert_eq!(read_primary(&raw).unwrap_err().category(), "InvalidCell");
    }

    #[test]
    fn left_join_repeats_rows_for_duplicate_labels() {
        let primary = vec![PrimaryRow {
            stock_code: "300750".into(),
            year: 2021,
            company_name: None,
            total_word_freq: 5,
            dimensions: DimensionValues::default(),
        }];
        let mut labels = IndustryLabels::new();
        labels.insert(
            ("300750".into(), 2021),
            vec![Some("电池".into()), None],
        );
        let resolver = IndustryResolver::new("unclassified");

        let table = merge(primary, Some(&labels), &resolver, "unknown company");
        let industries: Vec<&str> = table.iter().map(|r| r.industry_label.as_str()).collect();
        assert_eq!(industries, vec!["电池", "unclassified"]);
        assert!(table.iter().all(|r| r.company_name == "unknown company"));
        assert_eq!(table.records()[0].entity_key, "300750 | unknown company");
    }

    #[test]
    fn secondary_rows_below_cutoff_are_skipped() {
        let raw = sheet(
            vec!["股票代码全称".into(), "年度".into(), "行业名称".into()],
            vec![
                vec![CellValue::Integer(2), CellValue::Integer(2009), CellValue::from_text("房地产业")],
                vec![CellValue::Integer(2), CellValue::Integer(2012), CellValue::from_text("房地产业")],
            ],
        );
        let labels = read_secondary(&raw, 2010).unwrap();
        assert_eq!(labels.len(), 1);
        assert!(labels.contains_key(&("000002".to_string(), 2012)));
    }
}
