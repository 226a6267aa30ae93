//! Record extraction and detail enrichment against the in-memory surface.

mod support;

use std::time::Duration;

use mapscrape_core::{BusinessRecord, FieldRole, SelectorTable};
use mapscrape_scraper::{EnrichedFields, Lookup, RecordExtractor, Resolver, Scope};

use support::{pattern, FakeSurface};

fn nth_pattern(role: FieldRole, n: usize) -> String {
    SelectorTable::default().patterns(role)[n].clone()
}

async fn extract(surface: &FakeSurface, card: usize) -> Lookup<BusinessRecord> {
    let table = SelectorTable::default();
    RecordExtractor::new(&table).extract(surface, &card, 0).await
}

// ---------------------------------------------------------------------------
// Selector cascade
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolver_returns_first_matching_pattern_only() {
    let surface = FakeSurface::new();
    let card = surface.node("");
    let first = surface.node("Heading A");
    let second = surface.node("Heading B");
    surface.add_child(card, &nth_pattern(FieldRole::Name, 0), first);
    surface.add_child(card, &nth_pattern(FieldRole::Name, 1), second);

    let table = SelectorTable::default();
    let found = Resolver::new(&table)
        .resolve(&surface, FieldRole::Name, Scope::Within(&card))
        .await;

    assert_eq!(found, vec![first]);
}

#[tokio::test]
async fn resolver_skips_failing_patterns() {
    let surface = FakeSurface::new();
    let card = surface.node("");
    let fallback = surface.node("Heading B");
    surface.add_child(card, &nth_pattern(FieldRole::Name, 1), fallback);
    surface.fail_pattern(&nth_pattern(FieldRole::Name, 0));

    let table = SelectorTable::default();
    let found = Resolver::new(&table)
        .resolve(&surface, FieldRole::Name, Scope::Within(&card))
        .await;

    assert_eq!(found, vec![fallback]);
}

#[tokio::test]
async fn resolver_returns_empty_when_nothing_matches() {
    let surface = FakeSurface::new();
    let table = SelectorTable::default();
    let found = Resolver::new(&table)
        .resolve(&surface, FieldRole::ResultCard, Scope::Document)
        .await;
    assert!(found.is_empty());
}

// ---------------------------------------------------------------------------
// Card extraction
// ---------------------------------------------------------------------------

#[tokio::test]
async fn nameless_card_is_not_found() {
    let surface = FakeSurface::new();
    let card = surface.nameless_card();
    surface.child(card, FieldRole::Category, "Taksi durağı");

    assert_eq!(extract(&surface, card).await, Lookup::NotFound);
}

#[tokio::test]
async fn blank_name_elements_are_skipped() {
    let surface = FakeSurface::new();
    let card = surface.node("");
    surface.child(card, FieldRole::Name, "   ");
    let heading = surface.node("Moda Taksi");
    surface.add_child(card, &nth_pattern(FieldRole::Name, 1), heading);

    let record = extract(&surface, card).await.found().unwrap();
    assert_eq!(record.name, "Moda Taksi");
}

#[tokio::test]
async fn unreadable_name_is_an_error() {
    let surface = FakeSurface::new();
    let card = surface.node("");
    let name = surface.child(card, FieldRole::Name, "Moda Taksi");
    surface.fail_text_of(name);

    assert!(matches!(extract(&surface, card).await, Lookup::Error(_)));
}

#[tokio::test]
async fn verbatim_fields_are_copied_trimmed() {
    let surface = FakeSurface::new();
    let card = surface.business_card("Moda Taksi");
    surface.child(card, FieldRole::Category, " Taksi durağı ");
    surface.child(card, FieldRole::Hours, "24 saat açık");
    surface.child(card, FieldRole::Status, "Açık");
    surface.child(card, FieldRole::Website, "modataksi.com.tr");
    surface.child(card, FieldRole::Price, "₺₺");

    let table = SelectorTable::default();
    let record = RecordExtractor::new(&table)
        .extract(&surface, &card, 4)
        .await
        .found()
        .unwrap();

    assert_eq!(record.sequence, 5);
    assert_eq!(record.category.as_deref(), Some("Taksi durağı"));
    assert_eq!(record.hours.as_deref(), Some("24 saat açık"));
    assert_eq!(record.status.as_deref(), Some("Açık"));
    assert_eq!(record.website.as_deref(), Some("modataksi.com.tr"));
    assert_eq!(record.price.as_deref(), Some("₺₺"));
}

#[tokio::test]
async fn phone_prefers_accessible_label() {
    let surface = FakeSurface::new();
    let card = surface.business_card("Moda Taksi");
    let button = surface.child(card, FieldRole::Phone, "Ara");
    surface.set_attr(button, "aria-label", "Telefon: 0216 345 67 89 ");

    let record = extract(&surface, card).await.found().unwrap();
    assert_eq!(record.phone.as_deref(), Some("0216 345 67 89"));
}

#[tokio::test]
async fn phone_from_tel_link() {
    let surface = FakeSurface::new();
    let card = surface.business_card("Moda Taksi");
    let link = surface.node("Call");
    surface.set_attr(link, "href", "tel:02163456789");
    surface.add_child(card, "a[href^='tel:']", link);

    let record = extract(&surface, card).await.found().unwrap();
    assert_eq!(record.phone.as_deref(), Some("02163456789"));
}

#[tokio::test]
async fn invalid_phone_candidates_are_passed_over() {
    let surface = FakeSurface::new();
    let card = surface.business_card("Moda Taksi");
    let pattern = nth_pattern(FieldRole::Phone, 0);
    let noise = surface.node("Yol tarifi");
    let phone = surface.node("0532 111 22 33");
    surface.add_child(card, &pattern, noise);
    surface.add_child(card, &pattern, phone);

    let record = extract(&surface, card).await.found().unwrap();
    assert_eq!(record.phone.as_deref(), Some("0532 111 22 33"));
}

#[tokio::test]
async fn address_uses_strict_checks() {
    let surface = FakeSurface::new();
    let card = surface.business_card("Moda Taksi");
    let pattern = nth_pattern(FieldRole::Address, 0);
    let noise = surface.node("Web sitesi ve yol tarifi bilgisi");
    let address = surface.node("Caferağa Mah. Moda Cd. No:3, Kadıköy");
    surface.add_child(card, &pattern, noise);
    surface.add_child(card, &pattern, address);

    let record = extract(&surface, card).await.found().unwrap();
    assert_eq!(
        record.address.as_deref(),
        Some("Caferağa Mah. Moda Cd. No:3, Kadıköy")
    );
}

#[tokio::test]
async fn address_from_label() {
    let surface = FakeSurface::new();
    let card = surface.business_card("Moda Taksi");
    let button = surface.child(card, FieldRole::Address, "");
    surface.set_attr(button, "aria-label", "Adres: Moda Cd. No:3, Kadıköy/İstanbul");

    let record = extract(&surface, card).await.found().unwrap();
    assert_eq!(
        record.address.as_deref(),
        Some("Moda Cd. No:3, Kadıköy/İstanbul")
    );
}

#[tokio::test]
async fn rating_label_wins_over_text() {
    let surface = FakeSurface::new();
    let card = surface.business_card("Moda Taksi");
    let stars = surface.child(card, FieldRole::Rating, "4,6(120)");
    surface.set_attr(stars, "aria-label", "4,6 yıldız 120 yorum");

    let record = extract(&surface, card).await.found().unwrap();
    assert_eq!(record.rating.as_deref(), Some("4,6 yıldız 120 yorum"));
}

#[tokio::test]
async fn card_text_fills_missing_fields() {
    let surface = FakeSurface::new();
    let card = surface.node("Moda Taksi\n4,5(99)\nBahariye Cd. No:12 Kadıköy\n0532 123 45 67");
    surface.child(card, FieldRole::Name, "Moda Taksi");

    let record = extract(&surface, card).await.found().unwrap();
    assert_eq!(record.phone.as_deref(), Some("0532 123 45 67"));
    assert_eq!(record.address.as_deref(), Some("Bahariye Cd. No:12 Kadıköy"));
    assert_eq!(record.rating.as_deref(), Some("4,5(99)"));
}

#[tokio::test]
async fn card_text_never_overrides_found_rating() {
    let surface = FakeSurface::new();
    let card = surface.node("Moda Taksi\n3,1(7)");
    surface.child(card, FieldRole::Name, "Moda Taksi");
    surface.child(card, FieldRole::Rating, "4,9(300)");

    let record = extract(&surface, card).await.found().unwrap();
    assert_eq!(record.rating.as_deref(), Some("4,9(300)"));
}

#[tokio::test]
async fn failed_field_lookup_leaves_only_that_field_unset() {
    let surface = FakeSurface::new();
    let card = surface.business_card("Moda Taksi");
    surface.child(card, FieldRole::Hours, "24 saat açık");
    surface.fail_pattern(&pattern(FieldRole::Category));

    let record = extract(&surface, card).await.found().unwrap();
    assert_eq!(record.category, None);
    assert_eq!(record.hours.as_deref(), Some("24 saat açık"));
}

#[tokio::test]
async fn price_falls_back_to_currency_text() {
    let surface = FakeSurface::new();
    let card = surface.business_card("Kebapçı");
    surface.child(card, FieldRole::PriceText, "Restoran");
    surface.child(card, FieldRole::PriceText, "200-400 TL");

    let record = extract(&surface, card).await.found().unwrap();
    assert_eq!(record.price.as_deref(), Some("200-400 TL"));
}

// ---------------------------------------------------------------------------
// Detail enrichment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn enrichment_fills_only_empty_fields() {
    let surface = FakeSurface::new();
    let card = surface.business_card("Moda Taksi");

    let detail_phone = surface.node("");
    surface.set_attr(detail_phone, "aria-label", "Telefon: 0216 999 88 77");
    surface.add_detail(card, &pattern(FieldRole::DetailPhone), detail_phone);
    let detail_address = surface.node("");
    surface.set_attr(detail_address, "aria-label", "Adres: Caferağa Mah. Moda Cd. No:3");
    surface.add_detail(card, &pattern(FieldRole::DetailAddress), detail_address);

    let mut record = BusinessRecord::new(0, "Moda Taksi");
    record.phone = Some("0216 345 67 89".to_owned());

    let table = SelectorTable::default();
    let outcome = RecordExtractor::new(&table)
        .enrich(&surface, &card, &mut record, Duration::from_millis(7))
        .await;

    assert_eq!(
        outcome,
        Lookup::Found(EnrichedFields {
            phone: false,
            address: true
        })
    );
    assert_eq!(record.phone.as_deref(), Some("0216 345 67 89"));
    assert_eq!(record.address.as_deref(), Some("Caferağa Mah. Moda Cd. No:3"));
    assert_eq!(surface.clicks(), vec![card]);
    assert!(surface.pauses().contains(&Duration::from_millis(7)));
}

#[tokio::test]
async fn detail_values_are_taken_as_labelled() {
    let surface = FakeSurface::new();
    let card = surface.business_card("Moda Taksi");

    let detail_phone = surface.node("");
    surface.set_attr(detail_phone, "aria-label", "Telefon: +90 216 345 67 89");
    surface.add_detail(card, &pattern(FieldRole::DetailPhone), detail_phone);
    let detail_address = surface.node("");
    surface.set_attr(
        detail_address,
        "aria-label",
        "Adres: Taksi durağı, Caferağa Mah. Moda Cd. No:3, Kadıköy",
    );
    surface.add_detail(card, &pattern(FieldRole::DetailAddress), detail_address);

    let mut record = BusinessRecord::new(0, "Moda Taksi");
    let table = SelectorTable::default();
    let outcome = RecordExtractor::new(&table)
        .enrich(&surface, &card, &mut record, Duration::ZERO)
        .await;

    assert_eq!(
        outcome,
        Lookup::Found(EnrichedFields {
            phone: true,
            address: true
        })
    );
    assert_eq!(record.phone.as_deref(), Some("+90 216 345 67 89"));
    assert_eq!(
        record.address.as_deref(),
        Some("Taksi durağı, Caferağa Mah. Moda Cd. No:3, Kadıköy")
    );
}

#[tokio::test]
async fn detail_element_text_is_used_without_a_label() {
    let surface = FakeSurface::new();
    let card = surface.business_card("Moda Taksi");
    let detail_address = surface.node("  Yol tarifi: Moda Cd. No:3  ");
    surface.add_detail(card, &pattern(FieldRole::DetailAddress), detail_address);

    let mut record = BusinessRecord::new(0, "Moda Taksi");
    record.phone = Some("0216 345 67 89".to_owned());
    let table = SelectorTable::default();
    RecordExtractor::new(&table)
        .enrich(&surface, &card, &mut record, Duration::ZERO)
        .await;

    assert_eq!(record.address.as_deref(), Some("Yol tarifi: Moda Cd. No:3"));
}

#[tokio::test]
async fn enrichment_is_skipped_when_nothing_is_missing() {
    let surface = FakeSurface::new();
    let card = surface.business_card("Moda Taksi");
    let mut record = BusinessRecord::new(0, "Moda Taksi");
    record.phone = Some("0216 345 67 89".to_owned());
    record.address = Some("Moda Cd. No:3".to_owned());

    let table = SelectorTable::default();
    let outcome = RecordExtractor::new(&table)
        .enrich(&surface, &card, &mut record, Duration::ZERO)
        .await;

    assert_eq!(outcome, Lookup::NotFound);
    assert!(surface.clicks().is_empty());
}

#[tokio::test]
async fn enrichment_click_failure_keeps_record() {
    let surface = FakeSurface::new();
    let card = surface.business_card("Moda Taksi");
    surface.go_unreachable();
    let mut record = BusinessRecord::new(0, "Moda Taksi");

    let table = SelectorTable::default();
    let outcome = RecordExtractor::new(&table)
        .enrich(&surface, &card, &mut record, Duration::ZERO)
        .await;

    assert!(matches!(outcome, Lookup::Error(_)));
    assert_eq!(record.name, "Moda Taksi");
    assert_eq!(record.phone, None);
}
