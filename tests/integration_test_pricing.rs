mod common;

use chrono::Weekday;
use common::{date, time, TestApp};
use venue_booking_backend::config::TieBreak;
use venue_booking_backend::domain::models::code::GiftCard;
use venue_booking_backend::domain::models::discount::{
    AdjustKind, DiscountRecurrence, DiscountRule, EntityScope, FeeMode, FeeRule, ScopeKind,
};
use venue_booking_backend::domain::models::item::{BookableItem, ItemKind, NewItemParams, PricingMode};
use venue_booking_backend::domain::services::booking_service::QuoteRequest;
use venue_booking_backend::error::AppError;

// 2026-09-04 is a Friday.
const FRIDAY: &str = "2026-09-04";

fn quote_request(item_id: &str, participants: i32, code: Option<&str>) -> QuoteRequest {
    QuoteRequest {
        item_id: item_id.to_string(),
        date: date(FRIDAY),
        time: time("12:00"),
        participants,
        code: code.map(str::to_string),
    }
}

fn friday_discount(location_id: &str, name: &str, amount: i64, kind: AdjustKind) -> DiscountRule {
    DiscountRule::new(
        location_id.to_string(),
        name.to_string(),
        amount,
        kind,
        DiscountRecurrence::Weekly(Weekday::Fri),
    )
}

#[tokio::test]
async fn test_flat_price_ignores_party_size() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let item = app.create_package(&loc.id).await;

    let quote = app.service.quote(quote_request(&item.id, 8, None)).await.unwrap();
    assert_eq!(quote.base_cents, 10_000);
    assert_eq!(quote.total_cents, 10_000);
}

#[tokio::test]
async fn test_flat_price_with_per_extra_overage() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;

    let mut item = BookableItem::new(NewItemParams {
        location_id: loc.id.clone(),
        name: "Birthday Package".to_string(),
        kind: ItemKind::Package,
        pricing_mode: PricingMode::Flat,
        base_price_cents: 10_000,
        duration_min: 90,
    });
    item.included_participants = 10;
    item.per_extra_cents = 750;
    let item = app.catalog.create_item(&item).await.unwrap();

    // 12 participants, 2 over the included 10: 10000 + 2 * 750.
    let quote = app.service.quote(quote_request(&item.id, 12, None)).await.unwrap();
    assert_eq!(quote.base_cents, 11_500);

    // At or under the included count the base stands alone.
    let quote = app.service.quote(quote_request(&item.id, 10, None)).await.unwrap();
    assert_eq!(quote.base_cents, 10_000);
}

#[tokio::test]
async fn test_per_person_price_scales_with_party_size() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;

    let item = BookableItem::new(NewItemParams {
        location_id: loc.id.clone(),
        name: "Laser Tag".to_string(),
        kind: ItemKind::Attraction,
        pricing_mode: PricingMode::PerPerson,
        base_price_cents: 2_500,
        duration_min: 30,
    });
    let item = app.catalog.create_item(&item).await.unwrap();

    let quote = app.service.quote(quote_request(&item.id, 4, None)).await.unwrap();
    assert_eq!(quote.base_cents, 10_000);
    assert_eq!(quote.total_cents, 10_000);
}

#[tokio::test]
async fn test_participant_bounds_enforced() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;

    let mut item = BookableItem::new(NewItemParams {
        location_id: loc.id.clone(),
        name: "Escape Room".to_string(),
        kind: ItemKind::Attraction,
        pricing_mode: PricingMode::Flat,
        base_price_cents: 8_000,
        duration_min: 60,
    });
    item.min_participants = 2;
    item.max_participants = 6;
    let item = app.catalog.create_item(&item).await.unwrap();

    let err = app.service.quote(quote_request(&item.id, 1, None)).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));

    let err = app.service.quote(quote_request(&item.id, 7, None)).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));

    assert!(app.service.quote(quote_request(&item.id, 6, None)).await.is_ok());
}

#[tokio::test]
async fn test_percentage_discount_applies_on_matching_day() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let item = app.create_package(&loc.id).await;

    let rule = friday_discount(&loc.id, "Friday Special", 10, AdjustKind::Percentage);
    app.catalog.create_discount(&rule).await.unwrap();

    let quote = app.service.quote(quote_request(&item.id, 4, None)).await.unwrap();
    assert_eq!(quote.discount_cents(), 1_000);
    assert_eq!(quote.total_cents, 9_000);

    // The following Monday the rule does not match.
    let quote = app
        .service
        .quote(QuoteRequest { date: date("2026-09-07"), ..quote_request(&item.id, 4, None) })
        .await
        .unwrap();
    assert_eq!(quote.discount_cents(), 0);
    assert_eq!(quote.total_cents, 10_000);
}

#[tokio::test]
async fn test_fixed_discount_clamped_to_running_price() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let item = app.create_package(&loc.id).await;

    let rule = friday_discount(&loc.id, "Grand Opening", 25_000, AdjustKind::Fixed);
    app.catalog.create_discount(&rule).await.unwrap();

    let quote = app.service.quote(quote_request(&item.id, 2, None)).await.unwrap();
    assert_eq!(quote.discount_cents(), 10_000);
    assert_eq!(quote.total_cents, 0);
}

#[tokio::test]
async fn test_non_stackable_winner_blocks_lower_rules() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let item = app.create_package(&loc.id).await;

    let mut top = friday_discount(&loc.id, "Friday 10%", 10, AdjustKind::Percentage);
    top.priority = 5;
    app.catalog.create_discount(&top).await.unwrap();

    let mut lower = friday_discount(&loc.id, "Five Off", 500, AdjustKind::Fixed);
    lower.priority = 1;
    lower.stackable = true;
    app.catalog.create_discount(&lower).await.unwrap();

    let quote = app.service.quote(quote_request(&item.id, 4, None)).await.unwrap();
    assert_eq!(quote.discounts.len(), 1);
    assert_eq!(quote.discounts[0].name, "Friday 10%");
    assert_eq!(quote.total_cents, 9_000);
}

#[tokio::test]
async fn test_stackable_rules_compound_in_priority_order() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let item = app.create_package(&loc.id).await;

    let mut top = friday_discount(&loc.id, "Friday 10%", 10, AdjustKind::Percentage);
    top.priority = 5;
    top.stackable = true;
    app.catalog.create_discount(&top).await.unwrap();

    let mut lower = friday_discount(&loc.id, "Loyalty 10%", 10, AdjustKind::Percentage);
    lower.priority = 1;
    lower.stackable = true;
    app.catalog.create_discount(&lower).await.unwrap();

    // 10000 -> 9000 -> 8100; the second percentage works off the running price.
    let quote = app.service.quote(quote_request(&item.id, 4, None)).await.unwrap();
    assert_eq!(quote.discounts.len(), 2);
    assert_eq!(quote.discount_cents(), 1_900);
    assert_eq!(quote.total_cents, 8_100);
}

#[tokio::test]
async fn test_priority_tie_defaults_to_newest_rule() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let item = app.create_package(&loc.id).await;

    let mut scoped = friday_discount(&loc.id, "Scoped Twenty", 2_000, AdjustKind::Fixed);
    scoped.scope = EntityScope { kind: ScopeKind::Package, ids: vec![item.id.clone()] };
    app.catalog.create_discount(&scoped).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let broad = friday_discount(&loc.id, "Broad Ten", 1_000, AdjustKind::Fixed);
    app.catalog.create_discount(&broad).await.unwrap();

    let quote = app.service.quote(quote_request(&item.id, 4, None)).await.unwrap();
    assert_eq!(quote.discounts[0].name, "Broad Ten");
    assert_eq!(quote.total_cents, 9_000);
}

#[tokio::test]
async fn test_priority_tie_can_prefer_most_specific_scope() {
    let app = TestApp::with_tie_break(TieBreak::MostSpecific).await;
    let loc = app.create_location("UTC").await;
    let item = app.create_package(&loc.id).await;

    let mut scoped = friday_discount(&loc.id, "Scoped Twenty", 2_000, AdjustKind::Fixed);
    scoped.scope = EntityScope { kind: ScopeKind::Package, ids: vec![item.id.clone()] };
    app.catalog.create_discount(&scoped).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let broad = friday_discount(&loc.id, "Broad Ten", 1_000, AdjustKind::Fixed);
    app.catalog.create_discount(&broad).await.unwrap();

    let quote = app.service.quote(quote_request(&item.id, 4, None)).await.unwrap();
    assert_eq!(quote.discounts[0].name, "Scoped Twenty");
    assert_eq!(quote.total_cents, 8_000);
}

#[tokio::test]
async fn test_additive_fee_computed_on_base_after_discount() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let item = app.create_package(&loc.id).await;

    let rule = friday_discount(&loc.id, "Friday 10%", 10, AdjustKind::Percentage);
    app.catalog.create_discount(&rule).await.unwrap();

    let fee = FeeRule::new(
        loc.id.clone(),
        "Service Fee".to_string(),
        5,
        AdjustKind::Percentage,
        FeeMode::Additive,
    );
    app.catalog.create_fee(&fee).await.unwrap();

    // Fee is 5% of the 10000 base, not of the discounted running price.
    let quote = app.service.quote(quote_request(&item.id, 4, None)).await.unwrap();
    assert_eq!(quote.additive_fee_cents(), 500);
    assert_eq!(quote.total_cents, 9_500);
}

#[tokio::test]
async fn test_inclusive_fee_reported_but_not_added() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let item = app.create_package(&loc.id).await;

    let fee = FeeRule::new(
        loc.id.clone(),
        "Sales Tax".to_string(),
        8,
        AdjustKind::Percentage,
        FeeMode::Inclusive,
    );
    app.catalog.create_fee(&fee).await.unwrap();

    let quote = app.service.quote(quote_request(&item.id, 4, None)).await.unwrap();
    assert_eq!(quote.fees.len(), 1);
    assert_eq!(quote.fees[0].amount_cents, 800);
    assert!(quote.fees[0].inclusive);
    assert_eq!(quote.additive_fee_cents(), 0);
    assert_eq!(quote.total_cents, 10_000);
}

#[tokio::test]
async fn test_gift_card_applies_after_rule_discounts() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let item = app.create_package(&loc.id).await;

    let rule = friday_discount(&loc.id, "Friday 10%", 10, AdjustKind::Percentage);
    app.catalog.create_discount(&rule).await.unwrap();

    let card = GiftCard::new("GIFT20".to_string(), 2_000);
    app.codes.create_gift_card(&card).await.unwrap();

    // 10000 base, 10% discount -> 9000, $20 card -> 7000.
    let quote = app.service.quote(quote_request(&item.id, 4, Some("GIFT20"))).await.unwrap();
    assert_eq!(quote.discount_cents(), 1_000);
    assert_eq!(quote.code_cents(), 2_000);
    assert_eq!(quote.total_cents, 7_000);

    // Quoting is a preview; the balance is untouched.
    let found = app.codes.find_by_code("GIFT20").await.unwrap().unwrap();
    match found {
        venue_booking_backend::domain::models::code::RedeemableCode::GiftCard(card) => {
            assert_eq!(card.balance_cents, 2_000)
        }
        other => panic!("expected gift card, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gift_card_never_drives_total_negative() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let item = app.create_package(&loc.id).await;

    let card = GiftCard::new("BIGCARD".to_string(), 50_000);
    app.codes.create_gift_card(&card).await.unwrap();

    let quote = app.service.quote(quote_request(&item.id, 4, Some("BIGCARD"))).await.unwrap();
    assert_eq!(quote.code_cents(), 10_000);
    assert_eq!(quote.total_cents, 0);
}
