use pricer_core::shipping::{
    linear_shipping, shipping_from_rate_table, ProductDims, RateBand,
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn table() -> Vec<RateBand> {
    vec![
        RateBand {
            max_wt: 1.0,
            cost: 4.0,
        },
        RateBand {
            max_wt: 5.0,
            cost: 8.0,
        },
        RateBand {
            max_wt: 20.0,
            cost: 15.0,
        },
    ]
}

#[test]
fn dim_weight_uses_divisor_and_clamps_negatives() {
    let dims = ProductDims {
        length_in: 10.0,
        width_in: 10.0,
        height_in: 13.9,
        weight_lb: 0.0,
    };
    assert!(approx(dims.dim_weight_lb(139.0), 10.0));

    let bad = ProductDims {
        length_in: -3.0,
        width_in: 10.0,
        height_in: 10.0,
        weight_lb: 0.0,
    };
    assert!(approx(bad.dim_weight_lb(139.0), 0.0));
}

#[test]
fn zero_divisor_falls_back_to_standard() {
    let dims = ProductDims {
        length_in: 10.0,
        width_in: 10.0,
        height_in: 13.9,
        weight_lb: 0.0,
    };
    assert!(approx(dims.dim_weight_lb(0.0), 10.0));
    assert!(approx(dims.dim_weight_lb(-5.0), 10.0));
}

#[test]
fn billable_weight_is_greater_of_actual_and_dimensional() {
    let heavy_small = ProductDims {
        length_in: 2.0,
        width_in: 2.0,
        height_in: 2.0,
        weight_lb: 12.0,
    };
    assert!(approx(heavy_small.billable_weight_lb(139.0), 12.0));

    let light_bulky = ProductDims {
        length_in: 20.0,
        width_in: 20.0,
        height_in: 13.9,
        weight_lb: 1.0,
    };
    assert!(approx(light_bulky.billable_weight_lb(139.0), 40.0));
}

#[test]
fn rate_lookup_picks_first_band_at_or_above_weight() {
    let t = table();
    assert!(approx(shipping_from_rate_table(0.5, &t), 4.0));
    // Boundary is inclusive: exactly 1.0 lb ships at the 1 lb band.
    assert!(approx(shipping_from_rate_table(1.0, &t), 4.0));
    assert!(approx(shipping_from_rate_table(1.01, &t), 8.0));
    assert!(approx(shipping_from_rate_table(5.0, &t), 8.0));
}

#[test]
fn rate_lookup_sorts_unordered_tables() {
    let mut t = table();
    t.reverse();
    assert!(approx(shipping_from_rate_table(1.0, &t), 4.0));
    assert!(approx(shipping_from_rate_table(10.0, &t), 15.0));
}

#[test]
fn overflow_weight_gets_heaviest_band_cost() {
    assert!(approx(shipping_from_rate_table(250.0, &table()), 15.0));
}

#[test]
fn empty_table_ships_free() {
    assert!(approx(shipping_from_rate_table(3.0, &[]), 0.0));
}

#[test]
fn linear_model_floors_at_zero() {
    assert!(approx(linear_shipping(2.0, 4.5, 0.75), 6.0));
    assert!(approx(linear_shipping(2.0, -10.0, 0.75), 0.0));
    assert!(approx(linear_shipping(0.0, 0.0, 0.0), 0.0));
}
