//! Coverage for order construction and participant lookup.

use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn draft() -> OrderListingDraft {
    OrderListingDraft {
        asset_type: AssetType::Number,
        payment_method: PaymentMethod::Stars,
        amount: Decimal::new(15_000, 3),
        currency: Currency::Stars,
        description: "  +888 0123 4567  ".into(),
        seller_requisites: "@seller".into(),
    }
}

#[rstest]
fn listing_normalises_amount_and_trims_text(draft: OrderListingDraft) {
    let listing = OrderListing::try_from(draft).expect("valid listing");
    assert_eq!(listing.amount().to_string(), "15");
    assert_eq!(listing.description(), "+888 0123 4567");
}

#[rstest]
#[case(Decimal::ZERO)]
#[case(Decimal::new(-1, 0))]
fn listing_rejects_non_positive_amounts(mut draft: OrderListingDraft, #[case] amount: Decimal) {
    draft.amount = amount;
    assert_eq!(
        OrderListing::try_from(draft),
        Err(OrderValidationError::NonPositiveAmount)
    );
}

#[rstest]
#[case(Decimal::from_i128_with_scale(10_i128.pow(21), 0))]
#[case(Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0))]
fn listing_rejects_amounts_beyond_storage_range(
    mut draft: OrderListingDraft,
    #[case] amount: Decimal,
) {
    draft.amount = amount;
    assert_eq!(
        OrderListing::try_from(draft),
        Err(OrderValidationError::AmountTooLarge {
            max_integer_digits: AMOUNT_MAX_INTEGER_DIGITS
        })
    );
}

#[rstest]
#[case(Decimal::new(1, 10))]
#[case(Decimal::new(10_000_000_001, 10))]
fn listing_rejects_amounts_finer_than_storage_scale(
    mut draft: OrderListingDraft,
    #[case] amount: Decimal,
) {
    draft.amount = amount;
    assert_eq!(
        OrderListing::try_from(draft),
        Err(OrderValidationError::AmountTooPrecise {
            max_scale: AMOUNT_MAX_SCALE
        })
    );
}

#[rstest]
#[case(Decimal::new(1, 9))]
#[case(Decimal::from_i128_with_scale(9_999_999_999_999_999_999_999_999_999, 8))]
#[case(Decimal::new(1_500_000_000_000, 12))]
fn listing_accepts_amounts_at_the_storage_limits(
    mut draft: OrderListingDraft,
    #[case] amount: Decimal,
) {
    draft.amount = amount;
    let listing = OrderListing::try_from(draft).expect("amount fits");
    assert!(listing.amount().scale() <= AMOUNT_MAX_SCALE);
}

#[rstest]
fn listing_rejects_blank_description(mut draft: OrderListingDraft) {
    draft.description = "   ".into();
    assert_eq!(
        OrderListing::try_from(draft),
        Err(OrderValidationError::EmptyDescription)
    );
}

#[rstest]
fn listing_rejects_blank_requisites(mut draft: OrderListingDraft) {
    draft.seller_requisites = String::new();
    assert_eq!(
        OrderListing::try_from(draft),
        Err(OrderValidationError::EmptyRequisites)
    );
}

#[rstest]
fn open_orders_are_active_without_buyer(draft: OrderListingDraft) {
    let seller = UserId::random();
    let listing = OrderListing::try_from(draft).expect("valid listing");
    let order = Order::open(OrderCode::parse("QWERTY12").expect("code"), seller, listing);

    assert_eq!(order.status(), OrderStatus::Active);
    assert_eq!(order.buyer_id(), None);
    assert_eq!(order.role_of(seller), Some(ParticipantRole::Seller));
    assert_eq!(order.role_of(UserId::random()), None);
    assert_eq!(order.participants().collect::<Vec<_>>(), vec![seller]);
}

#[rstest]
fn rehydration_rejects_seller_as_buyer(draft: OrderListingDraft) {
    let seller = UserId::random();
    let result = Order::new(OrderDraft {
        id: OrderId::random(),
        code: OrderCode::parse("QWERTY12").expect("code"),
        seller_id: seller,
        buyer_id: Some(seller),
        listing: OrderListing::try_from(draft).expect("valid listing"),
        status: OrderStatus::Paid,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    });
    assert_eq!(result, Err(OrderValidationError::BuyerIsSeller));
}

#[rstest]
fn identifier_prefers_uuid_then_code() {
    let id = OrderId::random();
    assert_eq!(
        OrderIdentifier::parse(&id.to_string()),
        Some(OrderIdentifier::Id(id))
    );
    assert_eq!(
        OrderIdentifier::parse("qwerty12"),
        Some(OrderIdentifier::Code(
            OrderCode::parse("QWERTY12").expect("code")
        ))
    );
    assert_eq!(OrderIdentifier::parse("%%%"), None);
}

#[rstest]
#[case("nft_gift", AssetType::Gift)]
#[case("username", AssetType::Username)]
#[case("NFT_NUMBER", AssetType::Number)]
fn asset_type_accepts_legacy_spellings(#[case] raw: &str, #[case] expected: AssetType) {
    assert_eq!(raw.parse::<AssetType>(), Ok(expected));
}

#[rstest]
fn currency_serialises_upper_case() {
    let json = serde_json::to_string(&Currency::Kzt).expect("serialise");
    assert_eq!(json, "\"KZT\"");
    assert_eq!("uah".parse::<Currency>(), Ok(Currency::Uah));
}
