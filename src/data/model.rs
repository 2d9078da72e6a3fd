use std::collections::BTreeSet;
use std::fmt;
use std::ops::Index;

use super::schema::{TechDimension, TECH_DIMENSION_COUNT};

// ---------------------------------------------------------------------------
// CellValue – a single raw cell as read from a spreadsheet
// ---------------------------------------------------------------------------

/// A loosely typed cell value, before validation into a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Build a cell from a text field, treating blank text as null.
    pub fn from_text(s: &str) -> Self {
        if s.trim().is_empty() {
            CellValue::Null
        } else {
            CellValue::Text(s.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Interpret the cell as text.  Whole floats render without a fraction
    /// so a numeric identifier cell `1.0` reads back as `"1"`.
    pub fn as_text(&self) -> Option<String> {
        if self.is_null() {
            return None;
        }
        match self {
            CellValue::Text(s) => Some(s.trim().to_string()),
            CellValue::Integer(i) => Some(i.to_string()),
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                Some(format!("{}", *v as i64))
            }
            CellValue::Float(v) => Some(v.to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Null => None,
        }
    }

    /// Strict integer interpretation.  `None` for anything that is not a
    /// whole number (including null).
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            CellValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite() && v.fract() == 0.0)
                        .map(|v| v as i64)
                })
            }
            _ => None,
        }
    }

    /// Lenient numeric interpretation: anything non-numeric becomes `0.0`.
    pub fn as_number_or_zero(&self) -> f64 {
        match self {
            CellValue::Integer(i) => *i as f64,
            CellValue::Float(v) if v.is_finite() => *v,
            CellValue::Bool(b) => f64::from(u8::from(*b)),
            CellValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// DimensionValues – the twelve technology counters of one record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DimensionValues([f64; TECH_DIMENSION_COUNT]);

impl DimensionValues {
    pub fn new(values: [f64; TECH_DIMENSION_COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, dim: TechDimension) -> f64 {
        self.0[dim.index()]
    }

    pub fn set(&mut self, dim: TechDimension, value: f64) {
        self.0[dim.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (TechDimension, f64)> + '_ {
        TechDimension::ALL.iter().map(move |&d| (d, self.get(d)))
    }

    /// Mean across all twelve dimensions, rounded to 4 decimal places.
    pub fn transformation_index(&self) -> f64 {
        let mean = self.0.iter().sum::<f64>() / TECH_DIMENSION_COUNT as f64;
        round_to(mean, 4)
    }
}

impl Index<TechDimension> for DimensionValues {
    type Output = f64;

    fn index(&self, dim: TechDimension) -> &f64 {
        &self.0[dim.index()]
    }
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// Record – one row of the unified table
// ---------------------------------------------------------------------------

/// One company-year after loading, joining and scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub stock_code: String,
    pub company_name: String,
    pub year: i32,
    pub total_word_freq: u64,
    pub dimensions: DimensionValues,
    pub industry_label: String,
    pub transformation_index: f64,
    pub entity_key: String,
}

impl Record {
    /// Assemble a record, deriving the index and the entity key.
    pub fn new(
        stock_code: String,
        company_name: String,
        year: i32,
        total_word_freq: u64,
        dimensions: DimensionValues,
        industry_label: String,
    ) -> Self {
        let transformation_index = dimensions.transformation_index();
        let entity_key = entity_key(&stock_code, &company_name);
        Self {
            stock_code,
            company_name,
            year,
            total_word_freq,
            dimensions,
            industry_label,
            transformation_index,
            entity_key,
        }
    }
}

/// Separator between code and name in an entity key.
pub const ENTITY_KEY_SEPARATOR: &str = " | ";

pub fn entity_key(stock_code: &str, company_name: &str) -> String {
    format!("{stock_code}{ENTITY_KEY_SEPARATOR}{company_name}")
}

// ---------------------------------------------------------------------------
// UnifiedTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The joined, cleaned and scored table.  Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct UnifiedTable {
    records: Vec<Record>,
    /// Label used for rows with no classification.
    unclassified_label: String,
}

impl UnifiedTable {
    pub fn new(records: Vec<Record>, unclassified_label: impl Into<String>) -> Self {
        Self {
            records,
            unclassified_label: unclassified_label.into(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn unclassified_label(&self) -> &str {
        &self.unclassified_label
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Share of records with a resolved (non-sentinel) industry label.
    pub fn classified_ratio(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let classified = self
            .records
            .iter()
            .filter(|r| r.industry_label != self.unclassified_label)
            .count();
        Some(classified as f64 / self.records.len() as f64)
    }

    /// Sorted distinct years.
    pub fn years(&self) -> BTreeSet<i32> {
        self.records.iter().map(|r| r.year).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_rounded_mean_of_dimensions() {
        let mut dims = DimensionValues::default();
        dims.set(TechDimension::ArtificialIntelligence, 1.0);
        dims.set(TechDimension::BigData, 0.0);
        dims.set(TechDimension::DigitalTalent, 1.0);
        // 2 / 12 = 0.1666…
        assert_eq!(dims.transformation_index(), 0.1667);
    }

    #[test]
    fn record_derives_entity_key() {
        let rec = Record::new(
            "000001".into(),
            "平安银行".into(),
            2020,
            10,
            DimensionValues::new([1.2; TECH_DIMENSION_COUNT]),
            "货币金融服务".into(),
        );
        assert_eq!(rec.entity_key, "000001 | 平安银行");
        assert_eq!(rec.transformation_index, 1.2);
    }

    #[test]
    fn cell_text_renders_whole_floats_as_integers() {
        assert_eq!(CellValue::Float(1.0).as_text().as_deref(), Some("1"));
        assert_eq!(CellValue::Integer(600519).as_text().as_deref(), Some("600519"));
        assert_eq!(CellValue::Text("  ".into()).as_text(), None);
        assert_eq!(CellValue::Null.as_text(), None);
    }

    #[test]
    fn numeric_coercion_defaults_to_zero() {
        assert_eq!(CellValue::Text("abc".into()).as_number_or_zero(), 0.0);
        assert_eq!(CellValue::Text(" 2.5 ".into()).as_number_or_zero(), 2.5);
        assert_eq!(CellValue::Float(f64::NAN).as_number_or_zero(), 0.0);
        assert_eq!(CellValue::Null.as_number_or_zero(), 0.0);
        assert_eq!(CellValue::Bool(true).as_number_or_zero(), 1.0);
    }

    #[test]
    fn strict_integer_rejects_fractions() {
        assert_eq!(CellValue::Text("2021".into()).as_integer(), Some(2021));
        assert_eq!(CellValue::Text("2021.0".into()).as_integer(), Some(2021));
        assert_eq!(CellValue::Float(2021.5).as_integer(), None);
        assert_eq!(CellValue::Text("n/a".into()).as_integer(), None);
    }
}
