pub mod chrome;
pub mod classify;
pub mod error;
pub mod extract;
pub mod lookup;
pub mod pagination;
pub mod progress;
pub mod resolver;
mod retry;
pub mod scripts;
pub mod session;
pub mod surface;

pub use chrome::{search_url, ChromeSurface, LaunchOptions};
pub use error::ScraperError;
pub use extract::{EnrichedFields, RecordExtractor};
pub use lookup::Lookup;
pub use pagination::{
    CycleOutcome, EscalationTier, ExhaustionReason, PaginationConfig, PaginationController,
    PaginationState, Phase,
};
pub use progress::{ProgressEvent, ProgressSink, SessionEvent, StopSignal};
pub use resolver::Resolver;
pub use session::{
    CollectionSession, SessionFailure, SessionLimits, SessionReport, SessionRequest, SessionState,
};
pub use surface::{BrowserSurface, Scope};
