pub mod pipeline_config;
pub mod telegram_config;

pub use pipeline_config::*;
pub use telegram_config::*;
