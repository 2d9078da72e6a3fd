use serde::Serialize;

use super::filter::CompanyView;
use super::model::round_to;

/// Headline metrics for one company view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySummary {
    pub company_name: String,
    pub stock_code: String,
    pub industry_label: String,
    pub year_start: i32,
    pub year_end: i32,
    pub record_count: usize,
    /// Rounded to 2 decimals.
    pub mean_total_word_freq: f64,
    /// Rounded to 4 decimals, like the index itself.
    pub mean_transformation_index: f64,
    pub max_transformation_index: f64,
    pub min_transformation_index: f64,
}

impl CompanySummary {
    /// `None` when the view has no rows.
    pub fn from_view(view: &CompanyView) -> Option<Self> {
        if view.records.is_empty() {
            return None;
        }
        let n = view.records.len() as f64;
        let indices = view.records.iter().map(|r| r.transformation_index);

        let mean_total = view
            .records
            .iter()
            .map(|r| r.total_word_freq as f64)
            .sum::<f64>()
            / n;
        let mean_index = indices.clone().sum::<f64>() / n;
        let max_index = indices.clone().fold(f64::NEG_INFINITY, f64::max);
        let min_index = indices.fold(f64::INFINITY, f64::min);

        Some(Self {
            company_name: view.company_name().to_string(),
            stock_code: view.stock_code().to_string(),
            industry_label: view.industry_label.clone(),
            year_start: view.selection.year_start,
            year_end: view.selection.year_end,
            record_count: view.records.len(),
            mean_total_word_freq: round_to(mean_total, 2),
            mean_transformation_index: round_to(mean_index, 4),
            max_transformation_index: round_to(max_index, 4),
            min_transformation_index: round_to(min_index, 4),
        })
    }

    pub fn year_range(&self) -> String {
        format!("{}-{}", self.year_start, self.year_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{EntityKey, Selection};
    use crate::data::model::{DimensionValues, Record, UnifiedTable};
    use crate::data::schema::TECH_DIMENSION_COUNT;

    fn view(records: Vec<Record>) -> CompanyView {
        let table = UnifiedTable::new(records, "其他行业");
        CompanyView::build(
            &table,
            Selection {
                entity: EntityKey::parse(Some("000001 | 平安银行"), "未知企业"),
                year_start: 2020,
                year_end: 2022,
            },
        )
    }

    fn record(year: i32, total: u64, dim: f64) -> Record {
        Record::new(
            "000001".into(),
            "平安银行".into(),
            year,
            total,
            DimensionValues::new([dim; TECH_DIMENSION_COUNT]),
            "货币金融服务".into(),
        )
    }

    #[test]
    fn metrics_cover_the_selected_rows() {
        let summary = CompanySummary::from_view(&view(vec![
            record(2020, 10, 0.1),
            record(2021, 11, 0.3),
            record(2022, 11, 0.2),
        ]))
        .unwrap();

        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.mean_total_word_freq, 10.67);
        assert_eq!(summary.mean_transformation_index, 0.2);
        assert_eq!(summary.max_transformation_index, 0.3);
        assert_eq!(summary.min_transformation_index, 0.1);
        assert_eq!(summary.industry_label, "货币金融服务");
        assert_eq!(summary.year_range(), "2020-2022");
    }

    #[test]
    fn empty_view_has_no_summary() {
        assert!(CompanySummary::from_view(&view(Vec::new())).is_none());
    }
}
