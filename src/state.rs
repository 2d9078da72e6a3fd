use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};

use digiscope::data::filter::{
    available_years, company_options, industry_options, CompanyView, EntityKey, Selection,
};
use digiscope::data::schema::TechDimension;
use digiscope::export::{report, table};
use digiscope::{DashboardConfig, DatasetCache, IndustryResolver, UnifiedTable};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which company trend chart is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendTab {
    TotalFrequency,
    Dimensions,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,
    resolver: IndustryResolver,
    cache: DatasetCache,

    /// Loaded table (None until a load succeeds).
    pub table: Option<Arc<UnifiedTable>>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
    pub status_is_error: bool,
    /// Non-fatal load warnings.
    pub warnings: Vec<String>,

    /// Selector contents derived from the table.
    pub company_options: Vec<String>,
    pub years: Vec<i32>,
    pub industry_options: Vec<String>,

    /// Current selection.
    pub selected_company: Option<String>,
    pub year_start: i32,
    pub year_end: i32,

    /// Company subset + peer averages for the selection (cached).
    pub view: Option<CompanyView>,

    /// Technology dimensions shown in the dimension chart.
    pub dimensions: Vec<TechDimension>,
    /// Industries added to the comparison chart.
    pub extra_industries: Vec<String>,
    pub trend_tab: TrendTab,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let resolver = config.resolver();
        let cache = DatasetCache::new(config.cache_ttl());
        let mut state = Self {
            config,
            resolver,
            cache,
            table: None,
            status_message: None,
            status_is_error: false,
            warnings: Vec::new(),
            company_options: Vec::new(),
            years: Vec::new(),
            industry_options: Vec::new(),
            selected_company: None,
            year_start: 0,
            year_end: 0,
            view: None,
            dimensions: TechDimension::ALL[..4].to_vec(),
            extra_industries: Vec::new(),
            trend_tab: TrendTab::TotalFrequency,
        };
        state.reload(false);
        state
    }

    /// Load through the cache.  `force` drops the cached table first.
    pub fn reload(&mut self, force: bool) {
        if force {
            self.cache.invalidate();
        }
        let outcome = self.cache.get_or_load(&self.config, &self.resolver);
        self.warnings = outcome.warnings;
        self.status_is_error = outcome.table.is_none();
        self.status_message = Some(outcome.status);
        match outcome.table {
            Some(table) => self.set_table(table),
            None => self.clear_table(),
        }
    }

    /// Reload when the cached table is older than the configured TTL.
    pub fn refresh_if_stale(&mut self) {
        if self.table.is_some() && !self.cache.is_fresh() {
            log::info!("Cached dataset expired, reloading");
            self.reload(false);
        }
    }

    /// Ingest a newly loaded table, keeping the selection when it still exists.
    pub fn set_table(&mut self, table: Arc<UnifiedTable>) {
        if self
            .table
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &table))
        {
            return;
        }

        self.company_options = company_options(&table, self.config.company_option_limit);
        self.years = available_years(&table);
        self.industry_options = industry_options(&table, self.config.industry_option_limit);
        self.extra_industries
            .retain(|i| self.industry_options.contains(i));

        if !self
            .selected_company
            .as_ref()
            .is_some_and(|c| self.company_options.contains(c))
        {
            self.selected_company = self.company_options.first().cloned();
        }
        if !self.years.contains(&self.year_start) {
            self.year_start = self.years.first().copied().unwrap_or(0);
        }
        if !self.years.contains(&self.year_end) {
            self.year_end = self.years.last().copied().unwrap_or(0);
        }

        self.table = Some(table);
        self.refilter();
    }

    fn clear_table(&mut self) {
        self.table = None;
        self.company_options.clear();
        self.years.clear();
        self.industry_options.clear();
        self.view = None;
    }

    /// Recompute `view` after a selection change.
    pub fn refilter(&mut self) {
        self.view = self.table.as_ref().map(|table| {
            CompanyView::build(
                table,
                Selection {
                    entity: EntityKey::parse(
                        self.selected_company.as_deref(),
                        &self.config.unknown_company_label,
                    ),
                    year_start: self.year_start,
                    year_end: self.year_end,
                },
            )
        });
    }

    pub fn select_company(&mut self, key: String) {
        self.selected_company = Some(key);
        self.refilter();
    }

    pub fn set_year_start(&mut self, year: i32) {
        self.year_start = year;
        self.refilter();
    }

    pub fn set_year_end(&mut self, year: i32) {
        self.year_end = year;
        self.refilter();
    }

    /// Toggle a dimension, keeping [`TechDimension::ALL`] order.
    pub fn toggle_dimension(&mut self, dim: TechDimension) {
        if let Some(pos) = self.dimensions.iter().position(|d| *d == dim) {
            self.dimensions.remove(pos);
        } else {
            self.dimensions.push(dim);
            self.dimensions.sort();
        }
    }

    pub fn toggle_industry(&mut self, industry: &str) {
        if let Some(pos) = self.extra_industries.iter().position(|i| i == industry) {
            self.extra_industries.remove(pos);
        } else {
            self.extra_industries.push(industry.to_string());
        }
    }

    /// Current view, only when it has rows.
    pub fn populated_view(&self) -> Option<&CompanyView> {
        self.view.as_ref().filter(|v| !v.is_empty())
    }

    /// Default export file name stem for the current selection.
    pub fn export_stem(&self) -> String {
        let name = self
            .view
            .as_ref()
            .map(|v| v.company_name().to_string())
            .unwrap_or_else(|| self.config.unknown_company_label.clone());
        digiscope::export::file_stem(&name, self.year_start, self.year_end)
    }

    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let view = self.populated_view().ok_or_else(no_data)?;
        table::write_csv(path, &view.records)
    }

    pub fn export_xlsx(&self, path: &Path) -> Result<()> {
        let view = self.populated_view().ok_or_else(no_data)?;
        table::write_xlsx(path, &view.records)
    }

    pub fn export_report(&self, path: &Path) -> Result<()> {
        let view = self.populated_view().ok_or_else(no_data)?;
        let table = self.table.as_ref().ok_or_else(no_data)?;
        report::write_report(path, table, view)
    }

    /// Show the result of a user action in the status line.
    pub fn report_result(&mut self, action: &str, result: Result<()>) {
        match result {
            Ok(()) => {
                self.status_message = Some(format!("{action} done"));
                self.status_is_error = false;
            }
            Err(e) => {
                log::error!("{action} failed: {e:#}");
                self.status_message = Some(format!("{action} failed: {e:#}"));
                self.status_is_error = true;
            }
        }
    }
}

fn no_data() -> anyhow::Error {
    anyhow!("insufficient data for the current selection")
}
