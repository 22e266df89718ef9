pub mod data_models;
pub mod spec_table;

pub use data_models::*;
pub use spec_table::*;
