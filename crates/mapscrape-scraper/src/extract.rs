//! Per-card record extraction and detail-view enrichment.

use std::time::Duration;

use mapscrape_core::{BusinessRecord, FieldRole, SelectorTable};

use crate::classify::{
    address_from_label, classify_address, classify_phone, classify_rating, looks_like_price,
    phone_from_href, phone_from_label, scan_lines, AddressVariant,
};
use crate::error::ScraperError;
use crate::lookup::Lookup;
use crate::resolver::Resolver;
use crate::surface::{BrowserSurface, Scope};

/// Which empty fields a detail view filled in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichedFields {
    pub phone: bool,
    pub address: bool,
}

impl EnrichedFields {
    #[must_use]
    pub fn any(self) -> bool {
        self.phone || self.address
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RecordExtractor<'t> {
    resolver: Resolver<'t>,
}

impl<'t> RecordExtractor<'t> {
    #[must_use]
    pub fn new(table: &'t SelectorTable) -> Self {
        Self {
            resolver: Resolver::new(table),
        }
    }

    /// Builds a record from one result card.
    ///
    /// `NotFound` when the card has no non-empty name; `Error` when the name
    /// could not be read because the browser failed. Every other field is
    /// optional and a failed lookup only leaves that field unset.
    pub async fn extract<S: BrowserSurface>(
        &self,
        surface: &S,
        card: &S::Element,
        index: usize,
    ) -> Lookup<BusinessRecord> {
        let name = match self.card_field(surface, card, FieldRole::Name).await {
            Lookup::Found(name) => name,
            Lookup::NotFound => return Lookup::NotFound,
            Lookup::Error(reason) => return Lookup::Error(reason),
        };

        let mut record = BusinessRecord::new(index, name);
        record.phone = self.optional(surface, card, FieldRole::Phone, index).await;
        record.address = self.optional(surface, card, FieldRole::Address, index).await;
        record.rating = self.optional(surface, card, FieldRole::Rating, index).await;
        record.category = self.optional(surface, card, FieldRole::Category, index).await;
        record.hours = self.optional(surface, card, FieldRole::Hours, index).await;
        record.status = self.optional(surface, card, FieldRole::Status, index).await;
        record.website = self.optional(surface, card, FieldRole::Website, index).await;
        record.price = match self.optional(surface, card, FieldRole::Price, index).await {
            Some(price) => Some(price),
            None => self.optional(surface, card, FieldRole::PriceText, index).await,
        };

        if !(record.has_phone() && record.has_address() && record.has_rating()) {
            self.scan_card_text(surface, card, &mut record).await;
        }

        Lookup::Found(record)
    }

    /// Opens the card's detail view and fills phone and address if empty.
    ///
    /// Values already on the record are never replaced. `NotFound` means the
    /// detail view added nothing (or was not needed); `Error` means the card
    /// could not be opened.
    pub async fn enrich<S: BrowserSurface>(
        &self,
        surface: &S,
        card: &S::Element,
        record: &mut BusinessRecord,
        pause: Duration,
    ) -> Lookup<EnrichedFields> {
        if record.has_phone() && record.has_address() {
            return Lookup::NotFound;
        }

        if let Err(err) = surface.click(card).await {
            return Lookup::Error(err.to_string());
        }
        surface.pause(pause).await;

        let mut filled = EnrichedFields::default();
        if !record.has_phone() {
            if let Some(phone) = self.detail_field(surface, FieldRole::DetailPhone).await.found() {
                record.phone = Some(phone);
                filled.phone = true;
            }
        }
        if !record.has_address() {
            if let Some(address) = self
                .detail_field(surface, FieldRole::DetailAddress)
                .await
                .found()
            {
                record.address = Some(address);
                filled.address = true;
            }
        }

        if filled.any() {
            tracing::debug!(
                name = %record.name,
                phone = filled.phone,
                address = filled.address,
                "detail view enriched record"
            );
            Lookup::Found(filled)
        } else {
            Lookup::NotFound
        }
    }

    async fn optional<S: BrowserSurface>(
        &self,
        surface: &S,
        card: &S::Element,
        role: FieldRole,
        index: usize,
    ) -> Option<String> {
        match self.card_field(surface, card, role).await {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
            Lookup::Error(reason) => {
                tracing::debug!(field = %role, index, reason = %reason, "field lookup failed");
                None
            }
        }
    }

    /// Walks the cascade for `role` inside `card`; the first accepted
    /// candidate wins.
    async fn card_field<S: BrowserSurface>(
        &self,
        surface: &S,
        card: &S::Element,
        role: FieldRole,
    ) -> Lookup<String> {
        self.first_accepted(surface, Scope::Within(card), role).await
    }

    async fn detail_field<S: BrowserSurface>(&self, surface: &S, role: FieldRole) -> Lookup<String> {
        self.first_accepted(surface, Scope::Document, role).await
    }

    async fn first_accepted<S: BrowserSurface>(
        &self,
        surface: &S,
        scope: Scope<'_, S::Element>,
        role: FieldRole,
    ) -> Lookup<String> {
        let mut last_error = None;
        for pattern in self.resolver.patterns(role) {
            let elements = match self.resolver.query_pattern(surface, pattern, scope).await {
                Lookup::Found(elements) => elements,
                Lookup::NotFound => continue,
                Lookup::Error(reason) => {
                    last_error = Some(reason);
                    continue;
                }
            };
            for element in &elements {
                let outcome: Lookup<String> = candidate(surface, element, role).await.into();
                match outcome {
                    Lookup::Found(value) => return Lookup::Found(value),
                    Lookup::NotFound => {}
                    Lookup::Error(reason) => last_error = Some(reason),
                }
            }
        }
        Lookup::missing(last_error)
    }

    async fn scan_card_text<S: BrowserSurface>(
        &self,
        surface: &S,
        card: &S::Element,
        record: &mut BusinessRecord,
    ) {
        let text = match surface.text(card).await {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(name = %record.name, error = %err, "card text unavailable");
                return;
            }
        };
        let scan = scan_lines(&text, &record.name);
        if !record.has_phone() {
            record.phone = scan.phone;
        }
        if !record.has_address() {
            record.address = scan.address;
        }
        if !record.has_rating() {
            record.rating = scan.rating;
        }
    }
}

/// Accepted value for `role` from a single element, if any.
///
/// Card-level phone and address go through the classifiers; detail-view
/// values are taken as the page labels them.
async fn candidate<S: BrowserSurface>(
    surface: &S,
    element: &S::Element,
    role: FieldRole,
) -> Result<Option<String>, ScraperError> {
    match role {
        FieldRole::DetailPhone => {
            let label = surface.attribute(element, "aria-label").await?;
            if let Some(phone) = label.as_deref().and_then(phone_from_label) {
                return Ok(Some(phone));
            }
            let href = surface.attribute(element, "href").await?;
            if let Some(phone) = href.as_deref().and_then(phone_from_href) {
                return Ok(Some(phone));
            }
            Ok(non_empty(&surface.text(element).await?))
        }
        FieldRole::DetailAddress => {
            let label = surface.attribute(element, "aria-label").await?;
            if let Some(address) = label.as_deref().and_then(address_from_label) {
                return Ok(Some(address));
            }
            Ok(non_empty(&surface.text(element).await?))
        }
        FieldRole::Phone => {
            let label = surface.attribute(element, "aria-label").await?;
            if let Some(phone) = label.as_deref().and_then(phone_from_label) {
                if let Some(phone) = classify_phone(&phone) {
                    return Ok(Some(phone));
                }
            }
            let href = surface.attribute(element, "href").await?;
            if let Some(phone) = href.as_deref().and_then(phone_from_href) {
                if let Some(phone) = classify_phone(&phone) {
                    return Ok(Some(phone));
                }
            }
            Ok(classify_phone(&surface.text(element).await?))
        }
        FieldRole::Address => {
            let label = surface.attribute(element, "aria-label").await?;
            if let Some(address) = label.as_deref().and_then(address_from_label) {
                if let Some(address) = classify_address(&address, AddressVariant::Strict) {
                    return Ok(Some(address));
                }
            }
            Ok(classify_address(
                &surface.text(element).await?,
                AddressVariant::Strict,
            ))
        }
        FieldRole::Rating => {
            let label = surface.attribute(element, "aria-label").await?;
            let text = surface.text(element).await?;
            Ok(classify_rating(&text, label.as_deref()))
        }
        FieldRole::PriceText => {
            let text = surface.text(element).await?;
            let text = text.trim();
            Ok(looks_like_price(text).then(|| text.to_owned()))
        }
        _ => Ok(non_empty(&surface.text(element).await?)),
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}
