//! The collection session: batches of card extraction interleaved with
//! pagination cycles until the target is met or the list runs dry.

use std::time::Duration;

use chrono::{DateTime, Utc};
use mapscrape_core::{
    AppConfig, BusinessRecord, FieldCoverage, FieldRole, SelectorTable, SessionSummary, Termination,
};
use thiserror::Error;
use uuid::Uuid;

use crate::error::ScraperError;
use crate::extract::RecordExtractor;
use crate::lookup::Lookup;
use crate::pagination::{PaginationConfig, PaginationController};
use crate::progress::{ProgressEvent, ProgressSink, SessionEvent, StopSignal};
use crate::resolver::Resolver;
use crate::surface::{BrowserSurface, Scope};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub query: String,
    pub location: String,
    pub target_count: usize,
    pub enrich_details: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub max_iterations: u32,
    /// The one-time nudge runs after this many records; `0` disables it.
    pub nudge_after: usize,
    pub root_wait: Duration,
    pub settle: Duration,
    pub detail_pause: Duration,
}

impl SessionLimits {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            nudge_after: config.nudge_after,
            root_wait: config.root_wait(),
            settle: config.settle(),
            detail_pause: config.detail_pause(),
        }
    }
}

/// Mutable state of one session. Records are only added through
/// [`SessionState::append`], which keeps sequences contiguous and never
/// exceeds the target.
#[derive(Debug, Clone)]
pub struct SessionState {
    run_id: Uuid,
    target_count: usize,
    query: String,
    location: String,
    records: Vec<BusinessRecord>,
    processed_cards: usize,
    iterations: u32,
    started_at: DateTime<Utc>,
}

impl SessionState {
    #[must_use]
    pub fn new(request: &SessionRequest) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            target_count: request.target_count,
            query: request.query.clone(),
            location: request.location.clone(),
            records: Vec::new(),
            processed_cards: 0,
            iterations: 0,
            started_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    #[must_use]
    pub fn records(&self) -> &[BusinessRecord] {
        &self.records
    }

    #[must_use]
    pub fn collected_count(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn processed_cards(&self) -> usize {
        self.processed_cards
    }

    #[must_use]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.collected_count() >= self.target_count
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.target_count == 0 {
            return 100.0;
        }
        self.collected_count() as f64 / self.target_count as f64 * 100.0
    }

    /// Appends `record` with the next sequence number.
    ///
    /// Returns `false` and drops the record once the target is reached.
    pub fn append(&mut self, mut record: BusinessRecord) -> bool {
        if self.is_complete() {
            return false;
        }
        record.sequence = u32::try_from(self.records.len() + 1).unwrap_or(u32::MAX);
        self.records.push(record);
        true
    }

    fn finish(self, termination: Termination) -> SessionReport {
        let summary = SessionSummary {
            run_id: self.run_id,
            query: self.query,
            location: self.location,
            target: self.target_count,
            collected: self.records.len(),
            termination,
            coverage: FieldCoverage::from_records(&self.records),
            started_at: self.started_at,
            finished_at: Utc::now(),
        };
        SessionReport {
            records: self.records,
            termination,
            summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub records: Vec<BusinessRecord>,
    pub termination: Termination,
    pub summary: SessionSummary,
}

/// A session-fatal error together with whatever was collected before it.
#[derive(Debug, Error)]
#[error("collection failed after {} records: {error}", .records.len())]
pub struct SessionFailure {
    #[source]
    pub error: ScraperError,
    pub records: Vec<BusinessRecord>,
}

pub struct CollectionSession<'t> {
    table: &'t SelectorTable,
    pagination: PaginationConfig,
    limits: SessionLimits,
}

impl<'t> CollectionSession<'t> {
    #[must_use]
    pub fn new(table: &'t SelectorTable, pagination: PaginationConfig, limits: SessionLimits) -> Self {
        Self {
            table,
            pagination,
            limits,
        }
    }

    #[must_use]
    pub fn from_config(table: &'t SelectorTable, config: &AppConfig) -> Self {
        Self::new(
            table,
            PaginationConfig::from_config(config),
            SessionLimits::from_config(config),
        )
    }

    /// Collects up to `request.target_count` records from `surface`.
    ///
    /// Every normal termination (target reached, list exhausted, iteration
    /// ceiling, cancellation) returns `Ok` and emits
    /// [`SessionEvent::Finished`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionFailure`] when the results page never appears or the
    /// browser stops responding. The records collected so far are kept.
    pub async fn run<S, P>(
        &self,
        surface: &S,
        request: &SessionRequest,
        sink: &mut P,
        stop: &StopSignal,
    ) -> Result<SessionReport, SessionFailure>
    where
        S: BrowserSurface,
        P: ProgressSink,
    {
        let mut state = SessionState::new(request);
        tracing::info!(
            run_id = %state.run_id,
            query = %request.query,
            location = %request.location,
            target = request.target_count,
            "collection session started"
        );

        match self.drive(surface, request, &mut state, sink, stop).await {
            Ok(termination) => {
                let report = state.finish(termination);
                tracing::info!(
                    run_id = %report.summary.run_id,
                    collected = report.summary.collected,
                    target = report.summary.target,
                    termination = %termination,
                    "collection session finished"
                );
                sink.emit(SessionEvent::Finished(report.summary.clone()));
                Ok(report)
            }
            Err(error) => {
                tracing::error!(
                    run_id = %state.run_id,
                    collected = state.collected_count(),
                    error = %error,
                    "collection session failed"
                );
                Err(SessionFailure {
                    error,
                    records: state.records,
                })
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    async fn drive<S, P>(
        &self,
        surface: &S,
        request: &SessionRequest,
        state: &mut SessionState,
        sink: &mut P,
        stop: &StopSignal,
    ) -> Result<Termination, ScraperError>
    where
        S: BrowserSurface,
        P: ProgressSink,
    {
        let root_patterns = self.table.patterns(FieldRole::RootContainer);
        if !surface.wait_until(root_patterns, self.limits.root_wait).await? {
            return Err(ScraperError::RootContainerMissing {
                waited_secs: self.limits.root_wait.as_secs(),
            });
        }
        surface.pause(self.limits.settle).await;

        let resolver = Resolver::new(self.table);
        let extractor = RecordExtractor::new(self.table);
        let mut pager = PaginationController::new(self.table, self.pagination);

        loop {
            if state.is_complete() {
                return Ok(Termination::TargetReached);
            }
            if pager.is_exhausted() {
                return Ok(Termination::Exhausted);
            }
            if state.iterations >= self.limits.max_iterations {
                return Ok(Termination::IterationCeiling);
            }
            if stop.is_stopped() {
                return Ok(Termination::Cancelled);
            }
            state.iterations += 1;

            let mut cards = resolver
                .resolve(surface, FieldRole::ResultCard, Scope::Document)
                .await;
            if cards.is_empty() {
                cards = resolver
                    .resolve(surface, FieldRole::BroadCard, Scope::Document)
                    .await;
            }
            if cards.is_empty() {
                tracing::debug!(iteration = state.iterations, "no result cards visible, scrolling");
                pager.scroll_for_cards(surface).await?;
                continue;
            }
            tracing::debug!(
                visible = cards.len(),
                processed = state.processed_cards,
                "result cards resolved"
            );

            for card in cards.iter().skip(state.processed_cards) {
                if state.is_complete() {
                    break;
                }
                state.processed_cards += 1;

                let index = state.collected_count();
                let mut record = match extractor.extract(surface, card, index).await {
                    Lookup::Found(record) => record,
                    Lookup::NotFound => {
                        tracing::debug!(card = state.processed_cards, "card has no name, skipping");
                        continue;
                    }
                    Lookup::Error(reason) => {
                        tracing::debug!(card = state.processed_cards, reason = %reason, "card unreadable, skipping");
                        continue;
                    }
                };

                if request.enrich_details {
                    let enriched = extractor
                        .enrich(surface, card, &mut record, self.limits.detail_pause)
                        .await;
                    if let Lookup::Error(reason) = enriched {
                        tracing::warn!(name = %record.name, reason = %reason, "detail enrichment failed");
                    }
                }

                let name = record.name.clone();
                if !state.append(record) {
                    break;
                }
                tracing::info!(collected = state.collected_count(), name = %name, "record collected");
                sink.emit(SessionEvent::Progress(ProgressEvent {
                    percent: state.percent(),
                    collected: state.collected_count(),
                    name,
                }));

                if self.limits.nudge_after > 0 && state.collected_count() == self.limits.nudge_after {
                    pager.nudge(surface).await?;
                }
            }

            if stop.is_stopped() {
                return Ok(Termination::Cancelled);
            }
            if !state.is_complete() {
                pager.cycle(surface).await?;
            }
        }
    }
}
