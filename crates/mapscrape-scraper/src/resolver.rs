//! Selector cascade resolution.
//!
//! Each [`FieldRole`] owns an ordered list of query patterns. The first
//! pattern producing a non-empty match set wins; later patterns are never
//! consulted and results are never merged.

use mapscrape_core::{FieldRole, SelectorTable};

use crate::lookup::Lookup;
use crate::surface::{BrowserSurface, Scope};

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'t> {
    table: &'t SelectorTable,
}

impl<'t> Resolver<'t> {
    #[must_use]
    pub fn new(table: &'t SelectorTable) -> Self {
        Self { table }
    }

    #[must_use]
    pub fn patterns(&self, role: FieldRole) -> &'t [String] {
        self.table.patterns(role)
    }

    /// Elements for `role` under `scope`, from the first pattern that matches.
    ///
    /// Empty when no pattern matches. A pattern whose query fails is skipped.
    pub async fn resolve<S: BrowserSurface>(
        &self,
        surface: &S,
        role: FieldRole,
        scope: Scope<'_, S::Element>,
    ) -> Vec<S::Element> {
        for pattern in self.patterns(role) {
            match self.query_pattern(surface, pattern, scope).await {
                Lookup::Found(elements) => return elements,
                Lookup::NotFound => {}
                Lookup::Error(reason) => {
                    tracing::debug!(
                        role = %role,
                        pattern = %pattern,
                        reason = %reason,
                        "selector query failed, skipping"
                    );
                }
            }
        }
        Vec::new()
    }

    /// Single-pattern lookup; an empty match set is `NotFound`.
    pub async fn query_pattern<S: BrowserSurface>(
        &self,
        surface: &S,
        pattern: &str,
        scope: Scope<'_, S::Element>,
    ) -> Lookup<Vec<S::Element>> {
        match surface.query_all(scope, pattern).await {
            Ok(elements) if elements.is_empty() => Lookup::NotFound,
            Ok(elements) => Lookup::Found(elements),
            Err(err) => Lookup::Error(err.to_string()),
        }
    }
}
