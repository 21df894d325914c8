pub mod config;
pub mod error;

pub use config::{Config, ReportFormat, SchedulerConfig, load_dotenv};
pub use error::*;
