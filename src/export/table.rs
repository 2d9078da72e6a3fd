use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};

use crate::data::model::Record;
use crate::data::schema::TechDimension;

/// Worksheet name used for the XLSX export.
pub const SHEET_NAME: &str = "transformation_data";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column headers of both exports, in order.
pub fn export_headers() -> Vec<&'static str> {
    let mut headers = vec![
        "year",
        "stock_code",
        "company_name",
        "industry_label",
        "total_word_freq",
        "transformation_index",
    ];
    headers.extend(TechDimension::ALL.iter().map(|d| d.column().name));
    headers
}

/// One record as display strings, aligned with [`export_headers`].
pub fn export_row(record: &Record) -> Vec<String> {
    let mut row = vec![
        record.year.to_string(),
        record.stock_code.clone(),
        record.company_name.clone(),
        record.industry_label.clone(),
        record.total_word_freq.to_string(),
        format!("{:.4}", record.transformation_index),
    ];
    row.extend(record.dimensions.iter().map(|(_, v)| v.to_string()));
    row
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// CSV bytes (UTF-8 with BOM so spreadsheet apps pick the encoding).
pub fn to_csv(records: &[Record]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer
        .write_record(export_headers())
        .context("writing CSV header")?;
    for record in records {
        writer
            .write_record(export_row(record))
            .with_context(|| format!("writing CSV row for {}", record.year))?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV: {}", e.error()))
}

pub fn write_csv(path: &Path, records: &[Record]) -> Result<()> {
    let bytes = to_csv(records)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} rows to {}", records.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

fn build_workbook(records: &[Record]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let header_fmt = Format::new().set_bold();
    let index_fmt = Format::new().set_num_format("0.0000");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    worksheet.set_freeze_panes(1, 0)?;

    for (col, header) in export_headers().into_iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_fmt)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_number(row, 0, f64::from(record.year))?;
        worksheet.write_string(row, 1, record.stock_code.as_str())?;
        worksheet.write_string(row, 2, record.company_name.as_str())?;
        worksheet.write_string(row, 3, record.industry_label.as_str())?;
        worksheet.write_number(row, 4, record.total_word_freq as f64)?;
        worksheet.write_number_with_format(row, 5, record.transformation_index, &index_fmt)?;
        for (offset, (_, value)) in record.dimensions.iter().enumerate() {
            worksheet.write_number(row, (6 + offset) as u16, value)?;
        }
    }

    Ok(workbook)
}

/// XLSX bytes with one sheet named [`SHEET_NAME`].
pub fn to_xlsx(records: &[Record]) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(records)?;
    workbook.save_to_buffer().context("serializing XLSX")
}

pub fn write_xlsx(path: &Path, records: &[Record]) -> Result<()> {
    let bytes = to_xlsx(records)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} rows to {}", records.len(), path.display());
    Ok(())
}
