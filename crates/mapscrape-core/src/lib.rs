pub mod app_config;
pub mod config;
pub mod records;
pub mod report;
pub mod selectors;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use records::{BusinessRecord, FieldCoverage, SessionSummary, Termination};
pub use report::report_filename;
pub use selectors::{load_selector_table, FieldRole, SelectorTable};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read selectors file {path}: {source}")]
    SelectorsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse selectors file: {0}")]
    SelectorsFileParse(#[source] serde_yaml::Error),

    #[error("invalid selector table: {0}")]
    InvalidSelectorTable(String),
}
