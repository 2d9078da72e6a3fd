use std::collections::BTreeMap;

/// Label used when no table and no prior classification applies.
pub const DEFAULT_UNCLASSIFIED_LABEL: &str = "其他行业";

/// Built-in code → industry entries (Shenwan classification).
const CODE_INDUSTRY: &[(&str, &str)] = &[
    ("000001", "货币金融服务"),
    ("601318", "保险"),
    ("600036", "货币金融服务"),
    ("000002", "房地产业"),
    ("002594", "计算机应用"),
    ("600519", "酒类"),
    ("000858", "酒类"),
    // later entry for the same code wins
    ("002594", "汽车制造业"),
    ("601633", "汽车制造业"),
    ("600011", "电力"),
    ("600027", "电力"),
];

/// Built-in company name → industry entries, consulted after the code table.
const NAME_INDUSTRY: &[(&str, &str)] = &[
    ("深发展A", "货币金融服务"),
    ("平安银行", "货币金融服务"),
    ("中国平安", "保险"),
    ("贵州茅台", "酒类"),
    ("五粮液", "酒类"),
    ("伊利股份", "乳制品"),
    ("比亚迪", "汽车制造业"),
    ("长城汽车", "汽车制造业"),
    ("零七股份", "住宿业"),
    ("全新好", "住宿业"),
    ("*ST全新", "住宿业"),
];

/// Maps a company-year to its peer-grouping industry.
///
/// Priority, first match wins, exact keys only:
/// 1. identifier in the code table
/// 2. company name in the name table
/// 3. non-blank prior label (from the classification file)
/// 4. the unclassified label
#[derive(Debug, Clone)]
pub struct IndustryResolver {
    by_code: BTreeMap<String, String>,
    by_name: BTreeMap<String, String>,
    unclassified: String,
}

impl Default for IndustryResolver {
    fn default() -> Self {
        Self::builtin(DEFAULT_UNCLASSIFIED_LABEL)
    }
}

impl IndustryResolver {
    /// Resolver with empty tables.  A blank label falls back to
    /// [`DEFAULT_UNCLASSIFIED_LABEL`].
    pub fn new(unclassified: &str) -> Self {
        let unclassified = if unclassified.trim().is_empty() {
            DEFAULT_UNCLASSIFIED_LABEL.to_string()
        } else {
            unclassified.to_string()
        };
        Self {
            by_code: BTreeMap::new(),
            by_name: BTreeMap::new(),
            unclassified,
        }
    }

    /// Resolver pre-filled with the built-in tables.
    pub fn builtin(unclassified: &str) -> Self {
        let mut resolver = Self::new(unclassified);
        resolver.extend_codes(CODE_INDUSTRY.iter().map(|&(k, v)| (k, v)));
        resolver.extend_names(NAME_INDUSTRY.iter().map(|&(k, v)| (k, v)));
        resolver
    }

    pub fn with_code(mut self, stock_code: &str, industry: &str) -> Self {
        self.insert_code(stock_code, industry);
        self
    }

    pub fn with_name(mut self, company_name: &str, industry: &str) -> Self {
        self.insert_name(company_name, industry);
        self
    }

    /// Add or replace a code entry.  Blank labels are ignored.
    pub fn insert_code(&mut self, stock_code: &str, industry: &str) {
        if !industry.trim().is_empty() {
            self.by_code
                .insert(stock_code.to_string(), industry.to_string());
        }
    }

    /// Add or replace a name entry.  Blank labels are ignored.
    pub fn insert_name(&mut self, company_name: &str, industry: &str) {
        if !industry.trim().is_empty() {
            self.by_name
                .insert(company_name.to_string(), industry.to_string());
        }
    }

    pub fn extend_codes<'a>(&mut self, entries: impl IntoIterator<Item = (&'a str, &'a str)>) {
        for (code, industry) in entries {
            self.insert_code(code, industry);
        }
    }

    pub fn extend_names<'a>(&mut self, entries: impl IntoIterator<Item = (&'a str, &'a str)>) {
        for (name, industry) in entries {
            self.insert_name(name, industry);
        }
    }

    pub fn unclassified_label(&self) -> &str {
        &self.unclassified
    }

    /// Resolve the industry label.  Total: never returns an empty string.
    pub fn resolve<'a>(
        &'a self,
        stock_code: &str,
        company_name: Option<&str>,
        prior_label: Option<&'a str>,
    ) -> &'a str {
        if let Some(industry) = self.by_code.get(stock_code) {
            industry.as_str()
        } else if let Some(industry) = company_name.and_then(|name| self.by_name.get(name)) {
            industry.as_str()
        } else if let Some(prior) = prior_label.filter(|p| !p.trim().is_empty()) {
            prior
        } else {
            self.unclassified.as_str()
        }
    }
}
