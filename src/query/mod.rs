pub mod backend;
pub mod cmap_client;
pub mod error;
#[cfg(test)]
pub(crate) mod mock_backend;
pub mod query_spec;
pub mod sql;
