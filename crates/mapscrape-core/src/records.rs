//! Typed business records and the end-of-run summary built from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One business listing collected from the results surface.
///
/// `rating` is kept as display text (e.g. `"4,8(142)"` or an accessible label
/// such as `"4,8 yıldızlı 142 Yorum"`); it is never decomposed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    /// 1-based position in the run, assigned once on append.
    pub sequence: u32,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub rating: Option<String>,
    pub category: Option<String>,
    pub hours: Option<String>,
    pub status: Option<String>,
    pub price: Option<String>,
    pub website: Option<String>,
}

impl BusinessRecord {
    /// Creates a record with only the required fields set.
    ///
    /// `index` is zero-based; the stored sequence is `index + 1`.
    #[must_use]
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            sequence: u32::try_from(index.saturating_add(1)).unwrap_or(u32::MAX),
            name: name.into(),
            address: None,
            phone: None,
            rating: None,
            category: None,
            hours: None,
            status: None,
            price: None,
            website: None,
        }
    }

    #[must_use]
    pub fn has_phone(&self) -> bool {
        non_empty(self.phone.as_deref())
    }

    #[must_use]
    pub fn has_address(&self) -> bool {
        non_empty(self.address.as_deref())
    }

    #[must_use]
    pub fn has_rating(&self) -> bool {
        non_empty(self.rating.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> bool {
    value.is_some_and(|s| !s.trim().is_empty())
}

/// Why a collection session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    TargetReached,
    /// The pagination controller gave up: no more content could be loaded.
    Exhausted,
    IterationCeiling,
    Cancelled,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::TargetReached => write!(f, "target reached"),
            Termination::Exhausted => write!(f, "no more results"),
            Termination::IterationCeiling => write!(f, "iteration ceiling reached"),
            Termination::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// How many records carry each of the classifier-backed fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCoverage {
    pub total: usize,
    pub with_phone: usize,
    pub with_address: usize,
    pub with_rating: usize,
}

impl FieldCoverage {
    #[must_use]
    pub fn from_records(records: &[BusinessRecord]) -> Self {
        Self {
            total: records.len(),
            with_phone: records.iter().filter(|r| r.has_phone()).count(),
            with_address: records.iter().filter(|r| r.has_address()).count(),
            with_rating: records.iter().filter(|r| r.has_rating()).count(),
        }
    }

    #[must_use]
    pub fn phone_ratio(&self) -> f64 {
        ratio(self.with_phone, self.total)
    }

    #[must_use]
    pub fn address_ratio(&self) -> f64 {
        ratio(self.with_address, self.total)
    }

    #[must_use]
    pub fn rating_ratio(&self) -> f64 {
        ratio(self.with_rating, self.total)
    }
}

// Record counts are far below f64's 52-bit mantissa.
#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Terminal summary emitted once per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub run_id: Uuid,
    pub query: String,
    pub location: String,
    pub target: usize,
    pub collected: usize,
    pub termination: Termination,
    pub coverage: FieldCoverage,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SessionSummary {
    #[must_use]
    pub fn target_reached(&self) -> bool {
        self.collected >= self.target
    }
}
