//! Scroll-driven pagination for an infinitely loading results list.
//!
//! The results surface never says whether more results exist. The controller
//! scrolls, waits, and compares a height proxy against the last value seen.
//! An unchanged height escalates through [`EscalationTier`]s before the list
//! is declared exhausted.
//!
//! ```text
//! Scrolling -> MeasureHeight -> Progressed
//!                            -> Stalled(Normal) -> Stalled(Aggressive) -> Stalled(Extreme) -> Exhausted
//! ```
//!
//! A height change at any point of the ladder returns to `Progressed` and
//! the next stall starts again from `Normal`.

use std::time::Duration;

use mapscrape_core::{AppConfig, FieldRole, SelectorTable};
use serde_json::Value;

use crate::error::ScraperError;
use crate::scripts;
use crate::surface::BrowserSurface;

/// Extra pixels scrolled past the document end during a standard scroll.
const STANDARD_OVERSCROLL_PX: [u32; 2] = [500, 1_000];
const AGGRESSIVE_OVERSCROLL_PX: u32 = 1_000;
const EXTREME_OVERSCROLL_PX: u32 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EscalationTier {
    Normal,
    Aggressive,
    Extreme,
}

impl EscalationTier {
    #[must_use]
    pub fn rounds(self) -> u32 {
        match self {
            Self::Normal | Self::Extreme => 3,
            Self::Aggressive => 5,
        }
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Normal => Some(Self::Aggressive),
            Self::Aggressive => Some(Self::Extreme),
            Self::Extreme => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustionReason {
    /// Every tier ran without a height change.
    LadderExhausted,
    /// `max_scroll_attempts` was used up.
    AttemptCeiling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scrolling,
    MeasureHeight,
    Progressed,
    Stalled(EscalationTier),
    Exhausted(ExhaustionReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    pub last_known_height: i64,
    pub scroll_attempts: u32,
    pub tier: EscalationTier,
    pub phase: Phase,
    pub nudged: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            last_known_height: 0,
            scroll_attempts: 0,
            tier: EscalationTier::Normal,
            phase: Phase::Scrolling,
            nudged: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Progressed { height: i64 },
    Exhausted(ExhaustionReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub max_scroll_attempts: u32,
    pub settle: Duration,
    pub short_pause: Duration,
    pub long_pause: Duration,
}

impl PaginationConfig {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_scroll_attempts: config.max_scroll_attempts,
            settle: config.settle(),
            short_pause: config.short_pause(),
            long_pause: config.long_pause(),
        }
    }
}

pub struct PaginationController<'t> {
    table: &'t SelectorTable,
    config: PaginationConfig,
    state: PaginationState,
}

impl<'t> PaginationController<'t> {
    #[must_use]
    pub fn new(table: &'t SelectorTable, config: PaginationConfig) -> Self {
        Self {
            table,
            config,
            state: PaginationState::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self.state.phase, Phase::Exhausted(_))
    }

    /// Runs one scroll/measure cycle, escalating on a stall.
    ///
    /// Once exhausted, further calls return the same outcome without
    /// touching the page.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] when the page stops responding to scripts.
    pub async fn cycle<S: BrowserSurface>(
        &mut self,
        surface: &S,
    ) -> Result<CycleOutcome, ScraperError> {
        if let Phase::Exhausted(reason) = self.state.phase {
            return Ok(CycleOutcome::Exhausted(reason));
        }
        if !self.count_attempt() {
            return Ok(self.exhaust(ExhaustionReason::AttemptCeiling));
        }

        self.state.phase = Phase::Scrolling;
        self.standard_scroll(surface).await?;
        surface.pause(self.config.settle).await;

        self.state.phase = Phase::MeasureHeight;
        if let Some(height) = self.changed_height(surface).await? {
            return Ok(self.progressed(height));
        }

        let mut tier = Some(EscalationTier::Normal);
        while let Some(current) = tier {
            self.state.tier = current;
            self.state.phase = Phase::Stalled(current);
            tracing::debug!(
                tier = ?current,
                height = self.state.last_known_height,
                "results height unchanged, escalating"
            );
            for _ in 0..current.rounds() {
                self.escalation_round(surface, current).await?;
                if let Some(height) = self.changed_height(surface).await? {
                    return Ok(self.progressed(height));
                }
            }
            tier = current.next();
        }

        Ok(self.exhaust(ExhaustionReason::LadderExhausted))
    }

    /// Scrolls once when no cards are visible yet. Counts against the
    /// scroll-attempt ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] when the page stops responding to scripts.
    pub async fn scroll_for_cards<S: BrowserSurface>(
        &mut self,
        surface: &S,
    ) -> Result<(), ScraperError> {
        if self.is_exhausted() {
            return Ok(());
        }
        if !self.count_attempt() {
            self.exhaust(ExhaustionReason::AttemptCeiling);
            return Ok(());
        }
        self.standard_scroll(surface).await?;
        surface.pause(self.config.settle).await;
        Ok(())
    }

    /// One deeper pause and scroll, at most once per controller.
    ///
    /// Returns `true` if the nudge ran.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] when the page stops responding to scripts.
    pub async fn nudge<S: BrowserSurface>(&mut self, surface: &S) -> Result<bool, ScraperError> {
        if self.state.nudged {
            return Ok(false);
        }
        self.state.nudged = true;
        tracing::info!("nudging results list");
        surface.pause(self.config.short_pause).await;
        self.standard_scroll(surface).await?;
        surface.pause(self.config.short_pause).await;
        Ok(true)
    }

    fn count_attempt(&mut self) -> bool {
        self.state.scroll_attempts += 1;
        self.state.scroll_attempts <= self.config.max_scroll_attempts
    }

    fn progressed(&mut self, height: i64) -> CycleOutcome {
        self.state.last_known_height = height;
        self.state.tier = EscalationTier::Normal;
        self.state.phase = Phase::Progressed;
        CycleOutcome::Progressed { height }
    }

    fn exhaust(&mut self, reason: ExhaustionReason) -> CycleOutcome {
        tracing::info!(
            ?reason,
            scroll_attempts = self.state.scroll_attempts,
            height = self.state.last_known_height,
            "results list exhausted"
        );
        self.state.phase = Phase::Exhausted(reason);
        CycleOutcome::Exhausted(reason)
    }

    async fn changed_height<S: BrowserSurface>(
        &self,
        surface: &S,
    ) -> Result<Option<i64>, ScraperError> {
        let probe = scripts::height_probe(self.table.patterns(FieldRole::Feed));
        let value = surface.run_script(&probe).await?;
        let Some(height) = as_height(&value) else {
            tracing::warn!(%value, "height probe returned a non-numeric value");
            return Ok(None);
        };
        Ok((height != self.state.last_known_height).then_some(height))
    }

    async fn escalation_round<S: BrowserSurface>(
        &self,
        surface: &S,
        tier: EscalationTier,
    ) -> Result<(), ScraperError> {
        let PaginationConfig {
            short_pause,
            long_pause,
            ..
        } = self.config;
        match tier {
            EscalationTier::Normal => {
                self.standard_scroll(surface).await?;
                surface.pause(short_pause).await;
            }
            EscalationTier::Aggressive => {
                self.standard_scroll(surface).await?;
                surface.pause(long_pause).await;
                surface
                    .run_script(&scripts::scroll_window_past_end(AGGRESSIVE_OVERSCROLL_PX))
                    .await?;
                surface.pause(short_pause).await;
            }
            EscalationTier::Extreme => {
                surface
                    .run_script(&scripts::scroll_window_past_end(EXTREME_OVERSCROLL_PX))
                    .await?;
                surface.pause(long_pause).await;
                self.standard_scroll(surface).await?;
                surface.pause(long_pause).await;
            }
        }
        Ok(())
    }

    /// Scrolls the root container, the feed, then the window past its end.
    /// Falls back to a plain window scroll when the root container is missing
    /// or any step fails.
    async fn standard_scroll<S: BrowserSurface>(&self, surface: &S) -> Result<(), ScraperError> {
        match self.try_standard_scroll(surface).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::debug!("root container missing, falling back to window scroll");
                self.fallback_scroll(surface).await
            }
            Err(err) => {
                tracing::warn!(error = %err, "scroll failed, falling back to window scroll");
                self.fallback_scroll(surface).await
            }
        }
    }

    async fn try_standard_scroll<S: BrowserSurface>(
        &self,
        surface: &S,
    ) -> Result<bool, ScraperError> {
        let root = scripts::scroll_first_match_to_end(self.table.patterns(FieldRole::RootContainer));
        if surface.run_script(&root).await? != Value::Bool(true) {
            return Ok(false);
        }
        surface.pause(self.config.short_pause).await;

        let feed = scripts::scroll_first_match_to_end(self.table.patterns(FieldRole::Feed));
        match surface.run_script(&feed).await {
            Ok(_) => surface.pause(self.config.short_pause).await,
            Err(err) => tracing::debug!(error = %err, "feed scroll failed"),
        }

        let [first, second] = STANDARD_OVERSCROLL_PX;
        surface.run_script(&scripts::scroll_window_past_end(first)).await?;
        surface.pause(self.config.long_pause).await;
        surface.run_script(&scripts::scroll_window_past_end(second)).await?;
        surface.pause(self.config.short_pause).await;
        Ok(true)
    }

    async fn fallback_scroll<S: BrowserSurface>(&self, surface: &S) -> Result<(), ScraperError> {
        surface.run_script(&scripts::scroll_window_past_end(0)).await?;
        surface.pause(self.config.long_pause).await;
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn as_height(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|h| h.is_finite()).map(|h| h as i64))
}
