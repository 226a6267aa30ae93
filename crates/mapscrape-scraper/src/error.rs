use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("browser error: {0}")]
    Browser(String),

    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("root container did not appear within {waited_secs}s")]
    RootContainerMissing { waited_secs: u64 },
}

impl From<chromiumoxide::error::CdpError> for ScraperError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        ScraperError::Browser(err.to_string())
    }
}
