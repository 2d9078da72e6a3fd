use std::fmt;

// ---------------------------------------------------------------------------
// Column specs – canonical header plus the header used by the source files
// ---------------------------------------------------------------------------

/// A named input column.  Lookups accept either header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub alias: &'static str,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, alias: &'static str) -> Self {
        Self { name, alias }
    }

    /// Whether a raw header cell refers to this column.
    ///
    /// Surrounding whitespace and a leading UTF-8 BOM are ignored, as is
    /// ASCII case.
    pub fn matches(&self, header: &str) -> bool {
        let header = header.trim_start_matches('\u{feff}').trim();
        header.eq_ignore_ascii_case(self.name) || header == self.alias
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.alias)
    }
}

// -- Primary (word-frequency) file --

pub const STOCK_CODE: ColumnSpec = ColumnSpec::new("stock_code", "股票代码");
pub const YEAR: ColumnSpec = ColumnSpec::new("year", "年份");
pub const COMPANY_NAME: ColumnSpec = ColumnSpec::new("company_name", "企业名称");
pub const TOTAL_WORD_FREQ: ColumnSpec = ColumnSpec::new("total_word_freq", "总词频");

// -- Secondary (industry classification) file --

pub const STOCK_CODE_FULL: ColumnSpec = ColumnSpec::new("stock_code_full", "股票代码全称");
pub const YEAR_NUMBER: ColumnSpec = ColumnSpec::new("year_number", "年度");
pub const INDUSTRY_NAME: ColumnSpec = ColumnSpec::new("industry_name", "行业名称");

/// Width identifiers are zero-padded to.
pub const STOCK_CODE_WIDTH: usize = 6;

// ---------------------------------------------------------------------------
// TechDimension – the twelve technology keyword categories
// ---------------------------------------------------------------------------

pub const TECH_DIMENSION_COUNT: usize = 12;

/// One technology keyword category counted per company-year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TechDimension {
    ArtificialIntelligence,
    Blockchain,
    BigData,
    CloudComputing,
    InternetOfThings,
    DigitalTechApplication,
    EnterpriseDigitalization,
    DigitalOperations,
    DigitalSecurity,
    Communication5G,
    DigitalPlatform,
    DigitalTalent,
}

impl TechDimension {
    /// All dimensions in column order.
    pub const ALL: [TechDimension; TECH_DIMENSION_COUNT] = [
        TechDimension::ArtificialIntelligence,
        TechDimension::Blockchain,
        TechDimension::BigData,
        TechDimension::CloudComputing,
        TechDimension::InternetOfThings,
        TechDimension::DigitalTechApplication,
        TechDimension::EnterpriseDigitalization,
        TechDimension::DigitalOperations,
        TechDimension::DigitalSecurity,
        TechDimension::Communication5G,
        TechDimension::DigitalPlatform,
        TechDimension::DigitalTalent,
    ];

    /// Position of the dimension in [`TechDimension::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn column(self) -> ColumnSpec {
        use TechDimension::*;
        match self {
            ArtificialIntelligence => ColumnSpec::new("artificial_intelligence", "人工智能"),
            Blockchain => ColumnSpec::new("blockchain", "区块链"),
            BigData => ColumnSpec::new("big_data", "大数据"),
            CloudComputing => ColumnSpec::new("cloud_computing", "云计算"),
            InternetOfThings => ColumnSpec::new("internet_of_things", "物联网"),
            DigitalTechApplication => ColumnSpec::new("digital_tech_application", "数字技术应用"),
            EnterpriseDigitalization => {
                ColumnSpec::new("enterprise_digitalization", "企业数字化")
            }
            DigitalOperations => ColumnSpec::new("digital_operations", "数字运营"),
            DigitalSecurity => ColumnSpec::new("digital_security", "数字安全"),
            Communication5G => ColumnSpec::new("communication_5g", "5G通信"),
            DigitalPlatform => ColumnSpec::new("digital_platform", "数字平台"),
            DigitalTalent => ColumnSpec::new("digital_talent", "数字人才"),
        }
    }

    /// Human-readable label for legends and tables.
    pub fn label(self) -> &'static str {
        use TechDimension::*;
        match self {
            ArtificialIntelligence => "Artificial intelligence",
            Blockchain => "Blockchain",
            BigData => "Big data",
            CloudComputing => "Cloud computing",
            InternetOfThings => "Internet of things",
            DigitalTechApplication => "Digital tech application",
            EnterpriseDigitalization => "Enterprise digitalization",
            DigitalOperations => "Digital operations",
            DigitalSecurity => "Digital security",
            Communication5G => "5G communication",
            DigitalPlatform => "Digital platform",
            DigitalTalent => "Digital talent",
        }
    }
}

impl fmt::Display for TechDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Left-pad an identifier with zeros to [`STOCK_CODE_WIDTH`] characters.
/// Identifiers that are already long enough are returned unchanged.
pub fn pad_stock_code(raw: &str) -> String {
    format!("{:0>width$}", raw.trim(), width = STOCK_CODE_WIDTH)
}
