use std::collections::{BTreeMap, BTreeSet};

use super::model::{Record, UnifiedTable, ENTITY_KEY_SEPARATOR};

// ---------------------------------------------------------------------------
// Company subset and industry peer averages
// ---------------------------------------------------------------------------

/// Rows of one company within an inclusive year range, ascending by year.
///
/// `year_start > year_end` selects nothing.
pub fn select<'a>(
    table: &'a UnifiedTable,
    stock_code: &str,
    year_start: i32,
    year_end: i32,
) -> Vec<&'a Record> {
    let mut rows: Vec<&Record> = table
        .iter()
        .filter(|r| r.stock_code == stock_code && (year_start..=year_end).contains(&r.year))
        .collect();
    rows.sort_by_key(|r| r.year);
    rows
}

/// Yearly mean of one industry's records.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerYear {
    pub year: i32,
    pub mean_total_word_freq: f64,
    pub mean_transformation_index: f64,
    /// Number of records averaged.
    pub members: usize,
}

/// Per-year averages over every record labelled `industry_label` within
/// the inclusive year range.  Years without records are absent.
pub fn industry_peer_average(
    table: &UnifiedTable,
    industry_label: &str,
    year_start: i32,
    year_end: i32,
) -> Vec<PeerYear> {
    // year → (sum total, sum index, count)
    let mut groups: BTreeMap<i32, (f64, f64, usize)> = BTreeMap::new();
    for r in table.iter().filter(|r| {
        r.industry_label == industry_label && (year_start..=year_end).contains(&r.year)
    }) {
        let slot = groups.entry(r.year).or_insert((0.0, 0.0, 0));
        slot.0 += r.total_word_freq as f64;
        slot.1 += r.transformation_index;
        slot.2 += 1;
    }

    groups
        .into_iter()
        .map(|(year, (total, index, n))| PeerYear {
            year,
            mean_total_word_freq: total / n as f64,
            mean_transformation_index: index / n as f64,
            members: n,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Selector options
// ---------------------------------------------------------------------------

/// Sorted distinct entity keys, at most `limit`.
pub fn company_options(table: &UnifiedTable, limit: usize) -> Vec<String> {
    table
        .iter()
        .map(|r| r.entity_key.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(limit)
        .map(str::to_string)
        .collect()
}

/// Sorted distinct years.
pub fn available_years(table: &UnifiedTable) -> Vec<i32> {
    table.years().into_iter().collect()
}

/// Sorted distinct classified industry labels, at most `limit`.
pub fn industry_options(table: &UnifiedTable, limit: usize) -> Vec<String> {
    table
        .iter()
        .map(|r| r.industry_label.as_str())
        .filter(|label| !label.trim().is_empty() && *label != table.unclassified_label())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(limit)
        .map(str::to_string)
        .collect()
}

/// Industry of a company subset: the label of its first row.
pub fn industry_of(rows: &[&Record], unclassified_label: &str) -> String {
    rows.first()
        .map(|r| r.industry_label.clone())
        .unwrap_or_else(|| unclassified_label.to_string())
}

// ---------------------------------------------------------------------------
// EntityKey – "<code> | <name>" selector values
// ---------------------------------------------------------------------------

/// Placeholder code for an empty selection.
pub const NO_STOCK_CODE: &str = "000000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityKey {
    pub stock_code: String,
    pub company_name: String,
}

impl EntityKey {
    /// Split an entity key.  Missing parts fall back to [`NO_STOCK_CODE`] and
    /// `unknown_company`.
    pub fn parse(key: Option<&str>, unknown_company: &str) -> Self {
        let mut parts = key.unwrap_or("").splitn(2, ENTITY_KEY_SEPARATOR);
        let stock_code = parts
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(NO_STOCK_CODE)
            .to_string();
        let company_name = parts
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(unknown_company)
            .to_string();
        Self {
            stock_code,
            company_name,
        }
    }
}

// ---------------------------------------------------------------------------
// CompanyView – everything derived from one selection
// ---------------------------------------------------------------------------

/// The user's current choice of company and year range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub entity: EntityKey,
    pub year_start: i32,
    pub year_end: i32,
}

/// The company subset and its industry peer averages for one selection.
#[derive(Debug, Clone)]
pub struct CompanyView {
    pub selection: Selection,
    /// Company rows, ascending by year.
    pub records: Vec<Record>,
    pub industry_label: String,
    pub peer_average: Vec<PeerYear>,
}

impl CompanyView {
    pub fn build(table: &UnifiedTable, selection: Selection) -> Self {
        let rows = select(
            table,
            &selection.entity.stock_code,
            selection.year_start,
            selection.year_end,
        );
        let industry_label = industry_of(&rows, table.unclassified_label());
        let peer_average = industry_peer_average(
            table,
            &industry_label,
            selection.year_start,
            selection.year_end,
        );
        Self {
            records: rows.into_iter().cloned().collect(),
            selection,
            industry_label,
            peer_average,
        }
    }

    /// No rows: callers show "insufficient data".
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn company_name(&self) -> &str {
        &self.selection.entity.company_name
    }

    pub fn stock_code(&self) -> &str {
        &self.selection.entity.stock_code
    }
}
