pub mod coverage_resolver;
pub mod error;
pub mod matcher;
pub mod window;
