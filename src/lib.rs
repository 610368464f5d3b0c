mod colocalize;
mod colocalizer;
mod compile;
mod csv_store;
mod error;
mod query;
mod retrieve;
mod types;
mod utils;

pub use colocalizer::*;
pub use error::CyanoError;

pub use query::backend::QueryBackend;
pub use query::cmap_client::CmapClient;
pub use query::error::QueryError;
pub use query::query_spec::{Aggregate, Literal, Predicate, QuerySpec, Selection};
pub use query::sql::render_sql;

pub use types::catalog::{
    Catalog, CyanoSource, EnvironmentalDataset, Tolerances, MAX_TIME_TOLERANCE_DAYS,
};
pub use types::coverage::{ResolvedDataset, TemporalCoverage};
pub use types::observation::Observation;
pub use types::settings::*;

pub use colocalize::coverage_resolver::{coverage_query, resolve_coverage};
pub use colocalize::error::ColocalizeError;
pub use colocalize::matcher::{add_env_columns, match_frame, match_observation};
pub use colocalize::window::{build_window, in_time_range, uses_month_fallback};

pub use compile::compiler::compile_dir;
pub use compile::error::UnifyError;
pub use compile::unifier::{canonical_columns, scale_factor, unify};

pub use retrieve::{retrieval_query, retrieve_source};
