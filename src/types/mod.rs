pub mod catalog;
pub mod coverage;
pub mod observation;
pub mod settings;
