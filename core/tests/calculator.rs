use pricer_core::calculator::{
    channel_preview_prices, compute_pricing, price_from_margin, CostInputs, EngineConfig,
    PricingMode, SellPriceMode,
};
use pricer_core::money::RoundingMode;
use pricer_core::shipping::ProductDims;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// 2 lb item, $10 cost, $1 dropship, $0.50 handling against the default
/// test config (one 3 lb / $5 band, $2.50 amazon default fee).
fn two_pound_item() -> CostInputs {
    let mut payload = CostInputs::default();
    payload.item_cost = 10.0;
    payload.dims = ProductDims {
        weight_lb: 2.0,
        ..ProductDims::default()
    };
    payload.supplier_fees.dropship_fee = 1.0;
    payload.supplier_fees.handling_fee = 0.5;
    payload
}

#[test]
fn markup_mode_end_to_end() {
    let result = compute_pricing(&two_pound_item(), &EngineConfig::default_test());

    assert!(approx(result.inputs.dims.billable_weight_lb, 2.0));
    assert!(approx(result.components.calculated_shipping, 5.0));
    assert!(approx(result.components.marketplace_fee, 2.5));
    assert!(approx(result.costs.roi_cost, 16.5));
    assert!(approx(result.costs.total_cost, 19.0));
    assert!(approx(result.prices.min_price, 21.85));
    assert!(approx(result.prices.max_price, 25.65));
    assert!(approx(result.prices.sell_price, 21.85));
    // ROI base excludes the marketplace fee.
    assert!(approx(result.roi.roi_percent, 32.42));
    assert!(result.warnings.is_empty());
}

#[test]
fn margin_mode_diverges_from_markup_at_equal_nominal_margin() {
    let payload = two_pound_item();

    let markup = compute_pricing(&payload, &EngineConfig::default_test());

    let mut config = EngineConfig::default_test();
    config.pricing_mode = PricingMode::MarginOnPrice;
    let margin = compute_pricing(&payload, &config);

    // roi_cost / (1 - m) + fee: 16.5/0.85 + 2.5 and 16.5/0.65 + 2.5.
    assert!(approx(margin.prices.min_price, 21.91));
    assert!(approx(margin.prices.max_price, 27.88));
    assert!(!approx(markup.prices.min_price, margin.prices.min_price));
}

#[test]
fn extreme_margin_solves_to_zero_and_trips_invariant_repair() {
    let mut config = EngineConfig::default_test();
    config.pricing_mode = PricingMode::MarginOnPrice;
    config.max_margin = 0.9995;

    let result = compute_pricing(&two_pound_item(), &config);

    // max solved to 0 + fee, below min; repaired upward with a warning.
    assert!(approx(result.prices.max_price, result.prices.min_price));
    assert!(result
        .warnings
        .iter()
        .any(|w| w == "max_price < min_price (adjusted)"));
}

#[test]
fn sell_price_mode_selects_the_bound() {
    let payload = two_pound_item();

    let mut config = EngineConfig::default_test();
    config.sell_price_mode = SellPriceMode::Max;
    assert!(approx(
        compute_pricing(&payload, &config).prices.sell_price,
        25.65
    ));

    config.sell_price_mode = SellPriceMode::Mid;
    assert!(approx(
        compute_pricing(&payload, &config).prices.sell_price,
        23.75
    ));
}

#[test]
fn map_ceiling_clamps_both_bounds_with_warnings() {
    let mut payload = two_pound_item();
    payload.map_price = Some(20.0);

    let result = compute_pricing(&payload, &EngineConfig::default_test());

    assert!(approx(result.prices.min_price, 20.0));
    assert!(approx(result.prices.max_price, 20.0));
    assert!(approx(result.prices.sell_price, 20.0));
    assert!(result
        .warnings
        .iter()
        .any(|w| w == "MAP clamp applied to min_price"));
    assert!(result
        .warnings
        .iter()
        .any(|w| w == "MAP clamp applied to max_price"));
}

#[test]
fn msrp_clamps_only_the_bound_above_it() {
    let mut payload = two_pound_item();
    payload.msrp = Some(24.0);

    let result = compute_pricing(&payload, &EngineConfig::default_test());

    assert!(approx(result.prices.min_price, 21.85));
    assert!(approx(result.prices.max_price, 24.0));
    assert!(result
        .warnings
        .iter()
        .any(|w| w == "MSRP clamp applied to max_price"));
    assert!(!result
        .warnings
        .iter()
        .any(|w| w == "MSRP clamp applied to min_price"));
}

#[test]
fn nonpositive_caps_are_ignored() {
    let mut payload = two_pound_item();
    payload.map_price = Some(0.0);
    payload.msrp = Some(-5.0);

    let result = compute_pricing(&payload, &EngineConfig::default_test());
    assert!(approx(result.prices.min_price, 21.85));
    assert!(result.warnings.is_empty());
}

#[test]
fn charm_rounding_applies_to_all_three_prices() {
    let mut config = EngineConfig::default_test();
    config.rounding_mode = RoundingMode::EndsIn99;

    let result = compute_pricing(&two_pound_item(), &config);
    assert!(approx(result.prices.min_price, 21.99));
    assert!(approx(result.prices.max_price, 25.99));
    assert!(approx(result.prices.sell_price, 21.99));
}

#[test]
fn zero_cost_item_reports_zero_roi() {
    let result = compute_pricing(&CostInputs::default(), &EngineConfig::default());
    assert!(approx(result.costs.roi_cost, 0.0));
    assert!(approx(result.roi.roi_percent, 0.0));
}

#[test]
fn unknown_marketplace_prices_with_zero_fee() {
    let mut payload = two_pound_item();
    payload.marketplace = "etsy".to_string();

    let result = compute_pricing(&payload, &EngineConfig::default_test());
    assert!(approx(result.components.marketplace_fee, 0.0));
    assert!(approx(result.costs.total_cost, 16.5));
}

#[test]
fn channel_preview_applies_fixed_offsets() {
    let previews = channel_preview_prices(10.0, 0.40);
    assert_eq!(previews.len(), 3);

    let amazon = &previews[0];
    assert_eq!(amazon.marketplace, "amazon");
    assert!(approx(amazon.margin_used, 0.40));
    assert!(approx(amazon.price, 16.67));

    let shopify = &previews[1];
    assert!(approx(shopify.margin_used, 0.43));
    assert!(approx(shopify.price, 17.54));

    let walmart = &previews[2];
    assert!(approx(walmart.margin_used, 0.41));
    assert!(approx(walmart.price, 16.95));
}

#[test]
fn preview_margin_is_clamped() {
    // Above 0.95 clamps; at or below 0 degrades to cost.
    assert!(approx(price_from_margin(10.0, 1.5), 200.0));
    assert!(approx(price_from_margin(10.0, 0.0), 10.0));
    assert!(approx(price_from_margin(10.0, -0.2), 10.0));
}
