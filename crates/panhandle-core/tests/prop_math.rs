// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROPERTY-BASED TESTS - panhandle-core
//
// Invariants of the transfer-tax split and the rate ceilings, checked over
// randomly generated amounts and rates.
// Run: cargo test -p panhandle-core --test prop_math
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use panhandle_core::config::{
    MAXIMUM_BURN_RATE, MAXIMUM_MAX_TRANSFER_AMOUNT_RATE, MAXIMUM_TRANSFER_TAX_RATE,
};
use panhandle_core::math::{bps_of, split_transfer};
use panhandle_core::{Address, TokenConfig};
use proptest::prelude::*;

// Large enough for any realistic 18-decimal supply, small enough that
// amount * rate never overflows.
const MAX_AMOUNT: u128 = u128::MAX / 20_000;

/// A rate and an amount with `amount * rate < 10_000`.
fn small_taxed_transfer() -> impl Strategy<Value = (u16, u128)> {
    (1u16..=MAXIMUM_TRANSFER_TAX_RATE)
        .prop_flat_map(|rate| (Just(rate), 0u128..=(9_999 / rate as u128)))
}

proptest! {
    /// PROPERTY: the four parts of a split account for the whole amount
    #[test]
    fn prop_split_conserves_amount(
        amount in 0u128..=MAX_AMOUNT,
        tax_rate in 0u16..=MAXIMUM_TRANSFER_TAX_RATE,
        burn_rate in 0u16..=MAXIMUM_BURN_RATE,
    ) {
        let s = split_transfer(amount, tax_rate, burn_rate).unwrap();
        prop_assert_eq!(s.burn + s.liquidity, s.tax);
        prop_assert_eq!(s.tax + s.send, amount);
    }

    /// PROPERTY: split matches the floor formulas exactly
    #[test]
    fn prop_split_matches_floor_formulas(
        amount in 0u128..=1_000_000_000_000u128,
        tax_rate in 0u16..=MAXIMUM_TRANSFER_TAX_RATE,
        burn_rate in 0u16..=MAXIMUM_BURN_RATE,
    ) {
        let s = split_transfer(amount, tax_rate, burn_rate).unwrap();
        let tax = amount * tax_rate as u128 / 10_000;
        prop_assert_eq!(s.tax, tax);
        prop_assert_eq!(s.burn, tax * burn_rate as u128 / 100);
        prop_assert_eq!(s.send, amount - tax);
    }

    /// PROPERTY: no tax materializes while amount * rate < 10_000
    #[test]
    fn prop_small_amounts_untaxed(
        (tax_rate, amount) in small_taxed_transfer(),
    ) {
        prop_assert!(amount * (tax_rate as u128) < 10_000);
        let s = split_transfer(amount, tax_rate, 20).unwrap();
        prop_assert!(!s.is_taxed());
        prop_assert_eq!(s.send, amount);
    }

    /// PROPERTY: bps_of never exceeds the input for rates up to 100%
    #[test]
    fn prop_bps_bounded(amount in 0u128..=MAX_AMOUNT, bps in 0u128..=10_000u128) {
        prop_assert!(bps_of(amount, bps).unwrap() <= amount);
    }

    /// PROPERTY: config validation accepts exactly the in-ceiling rates
    #[test]
    fn prop_config_ceilings(tax in any::<u16>(), burn in any::<u16>(), max in any::<u16>()) {
        let config = TokenConfig {
            transfer_tax_rate: tax,
            burn_rate: burn,
            max_transfer_amount_rate: max,
            ..TokenConfig::default()
        };
        let within = tax <= MAXIMUM_TRANSFER_TAX_RATE
            && burn <= MAXIMUM_BURN_RATE
            && max <= MAXIMUM_MAX_TRANSFER_AMOUNT_RATE;
        prop_assert_eq!(config.validate().is_ok(), within);
    }

    /// PROPERTY: address display/parse round-trips for any seed
    #[test]
    fn prop_address_display_parse(label in ".{0,32}") {
        let a = Address::from_seed(&label);
        prop_assert_eq!(Address::parse(&a.to_string()).unwrap(), a);
        prop_assert_eq!(Address::parse(&a.to_string().to_uppercase().replacen("0X", "0x", 1)).unwrap(), a);
    }
}
