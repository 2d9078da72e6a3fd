//! Enterprise digital-transformation index: load keyword-frequency and
//! industry data, join and score it, and slice it per company.

pub mod color;
pub mod config;
pub mod data;
pub mod export;

pub use config::DashboardConfig;
pub use data::cache::DatasetCache;
pub use data::error::LoadError;
pub use data::filter::{industry_peer_average, select, CompanyView, EntityKey, Selection};
pub use data::loader::{load, LoadOutcome};
pub use data::model::{Record, UnifiedTable};
pub use data::resolver::IndustryResolver;
