use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use handlebars::Handlebars;
use serde::Serialize;

use super::chart::render_svg;
use crate::data::filter::CompanyView;
use crate::data::model::UnifiedTable;
use crate::data::series::{index_comparison_chart, total_frequency_chart};
use crate::data::summary::CompanySummary;

const TEMPLATE: &str = include_str!("../../templates/report.hbs");

#[derive(Debug, Serialize)]
struct ReportContext {
    title: String,
    metadata: Vec<MetadataRow>,
    rows: Vec<YearRow>,
    charts: Vec<ChartImage>,
    footer: String,
}

#[derive(Debug, Serialize)]
struct MetadataRow {
    label: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct YearRow {
    year: i32,
    total_word_freq: u64,
    transformation_index: String,
    industry_average_index: String,
}

#[derive(Debug, Serialize)]
struct ChartImage {
    title: String,
    svg: String,
}

fn metadata(summary: &CompanySummary) -> Vec<MetadataRow> {
    vec![
        MetadataRow {
            label: "Company",
            value: summary.company_name.clone(),
        },
        MetadataRow {
            label: "Stock code",
            value: summary.stock_code.clone(),
        },
        MetadataRow {
            label: "Industry",
            value: summary.industry_label.clone(),
        },
        MetadataRow {
            label: "Years",
            value: summary.year_range(),
        },
        MetadataRow {
            label: "Records",
            value: summary.record_count.to_string(),
        },
        MetadataRow {
            label: "Mean total word frequency",
            value: format!("{:.2}", summary.mean_total_word_freq),
        },
        MetadataRow {
            label: "Mean transformation index",
            value: format!("{:.4}", summary.mean_transformation_index),
        },
        MetadataRow {
            label: "Max transformation index",
            value: format!("{:.4}", summary.max_transformation_index),
        },
        MetadataRow {
            label: "Min transformation index",
            value: format!("{:.4}", summary.min_transformation_index),
        },
    ]
}

fn year_rows(view: &CompanyView) -> Vec<YearRow> {
    let peer: BTreeMap<i32, f64> = view
        .peer_average
        .iter()
        .map(|p| (p.year, p.mean_transformation_index))
        .collect();
    view.records
        .iter()
        .map(|r| YearRow {
            year: r.year,
            total_word_freq: r.total_word_freq,
            transformation_index: format!("{:.4}", r.transformation_index),
            industry_average_index: peer
                .get(&r.year)
                .map(|v| format!("{v:.4}"))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

/// Render the HTML report for a company view.
///
/// Fails when the view has no rows; there is nothing to report on.
pub fn render_report(table: &UnifiedTable, view: &CompanyView) -> Result<String> {
    let Some(summary) = CompanySummary::from_view(view) else {
        bail!(
            "no records for {} in {}-{}",
            view.company_name(),
            view.selection.year_start,
            view.selection.year_end
        );
    };

    let charts = [
        total_frequency_chart(view),
        index_comparison_chart(table, view, &[]),
    ]
    .iter()
    .map(|chart| -> Result<ChartImage> {
        Ok(ChartImage {
            title: chart.title.clone(),
            svg: render_svg(chart)?,
        })
    })
    .collect::<Result<Vec<_>>>()?;

    let context = ReportContext {
        title: format!("{} digital transformation report", summary.company_name),
        metadata: metadata(&summary),
        rows: year_rows(view),
        charts,
        footer: format!(
            "{} | {} | {}",
            summary.stock_code,
            summary.industry_label,
            summary.year_range()
        ),
    };

    let mut handlebars = Handlebars::new();
    handlebars
        .register_template_string("report", TEMPLATE)
        .context("parsing report template")?;
    handlebars
        .render("report", &context)
        .context("rendering report")
}

pub fn write_report(path: &Path, table: &UnifiedTable, view: &CompanyView) -> Result<()> {
    let html = render_report(table, view)?;
    std::fs::write(path, html).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Wrote report for {} to {}", view.company_name(), path.display());
    Ok(())
}
