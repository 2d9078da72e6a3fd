/// Data layer: input schema, loading, classification, filtering.
///
/// Architecture:
/// ```text
///  word_frequency.xlsx      industry_codes.xlsx (optional)
///        │                          │
///        ▼                          ▼
///   ┌──────────┐              ┌──────────┐
///   │  sheet    │  first sheet → RawSheet (CellValue grid)
///   └──────────┘              └──────────┘
///        │                          │
///        ▼                          ▼
///   ┌───────────────────────────────────┐
///   │  loader   validate → left join →   │
///   │           resolver → score         │
///   └───────────────────────────────────┘
///        │
///        ▼
///   ┌──────────────┐   Arc, held by the cache
///   │ UnifiedTable  │
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  company subset, industry peer averages
///   └──────────┘
///        │
///        ▼
///   summary / series  → UI and exporters
/// ```

pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod resolver;
pub mod schema;
pub mod series;
pub mod sheet;
pub mod summary;
