pub mod crawl_ledger;
pub mod file_store;
pub mod storage_manager;

pub use crawl_ledger::*;
pub use file_store::*;
pub use storage_manager::*;
