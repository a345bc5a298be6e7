// SPDX-License-Identifier: AGPL-3.0-only
//! Integer rate math. Every division truncates toward zero.

use crate::error::{ContractError, ContractResult};
use crate::{BPS_DENOMINATOR, PERCENT_DENOMINATOR};
use serde::{Deserialize, Serialize};

/// `floor(amount * rate / denominator)`.
///
/// Computed as `q * rate + floor(r * rate / denominator)` with
/// `amount = q * denominator + r`, so it only fails with `Overflow` when the
/// result itself does not fit in a u128.
pub fn mul_div(amount: u128, rate: u128, denominator: u128) -> ContractResult<u128> {
    if denominator == 0 {
        return Err(ContractError::InvalidArgument(
            "rate denominator is zero".to_string(),
        ));
    }
    let overflow = || ContractError::Overflow(format!("{} * {} overflows u128", amount, rate));
    let whole = (amount / denominator)
        .checked_mul(rate)
        .ok_or_else(overflow)?;
    let part = (amount % denominator)
        .checked_mul(rate)
        .ok_or_else(overflow)?
        / denominator;
    whole.checked_add(part).ok_or_else(overflow)
}

/// `floor(amount * bps / 10_000)`
pub fn bps_of(amount: u128, bps: u128) -> ContractResult<u128> {
    mul_div(amount, bps, BPS_DENOMINATOR)
}

/// How a taxed transfer of `amount` is divided.
///
/// `burn + liquidity == tax` and `tax + send == amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxSplit {
    pub tax: u128,
    pub burn: u128,
    pub liquidity: u128,
    pub send: u128,
}

impl TaxSplit {
    /// No tax: the whole amount reaches the recipient.
    pub fn untaxed(amount: u128) -> Self {
        TaxSplit {
            tax: 0,
            burn: 0,
            liquidity: 0,
            send: amount,
        }
    }

    pub fn is_taxed(&self) -> bool {
        self.tax > 0
    }
}

/// Split `amount` by `tax_rate` (bps of the amount) and `burn_rate` (percent of the tax).
pub fn split_transfer(amount: u128, tax_rate: u16, burn_rate: u16) -> ContractResult<TaxSplit> {
    let tax = bps_of(amount, tax_rate as u128)?;
    let burn = mul_div(tax, burn_rate as u128, PERCENT_DENOMINATOR)?;
    // tax <= amount and burn <= tax whenever the rates are within their ceilings
    let liquidity = tax.checked_sub(burn).ok_or_else(|| {
        ContractError::ExceedsLimit(format!("burn share {} exceeds tax {}", burn, tax))
    })?;
    let send = amount.checked_sub(tax).ok_or_else(|| {
        ContractError::ExceedsLimit(format!("tax {} exceeds amount {}", tax, amount))
    })?;
    Ok(TaxSplit {
        tax,
        burn,
        liquidity,
        send,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_split_default_rates() {
        // 5% tax, 20% of the tax burned
        let s = split_transfer(12_345, 500, 20).unwrap();
        assert_eq!(s.tax, 617);
        assert_eq!(s.burn, 123);
        assert_eq!(s.liquidity, 494);
        assert_eq!(s.send, 11_728);
    }

    #[test]
    fn test_split_small_amount_rounds_to_zero() {
        let s = split_transfer(19, 500, 20).unwrap();
        assert_eq!(s, TaxSplit::untaxed(19));
        assert!(!s.is_taxed());
    }

    #[test]
    fn test_split_no_burn_and_all_burn() {
        let s = split_transfer(1_234, 500, 0).unwrap();
        assert_eq!((s.burn, s.liquidity, s.send), (0, 61, 1_173));
        let s = split_transfer(1_234, 500, 100).unwrap();
        assert_eq!((s.burn, s.liquidity, s.send), (61, 0, 1_173));
    }

    #[test]
    fn test_mul_div_overflow() {
        let err = mul_div(u128::MAX, 3, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
    }

    #[test]
    fn test_bps_of_full_range() {
        // No intermediate overflow for rates below the denominator
        assert_eq!(bps_of(u128::MAX, 10_000).unwrap(), u128::MAX);
        assert_eq!(bps_of(u128::MAX, 50).unwrap(), u128::MAX / 200);
        assert_eq!(bps_of(10_010, 50).unwrap(), 50);
    }

    #[test]
    fn test_split_rejects_rates_above_whole() {
        assert!(split_transfer(100, 20_000, 0).is_err());
        assert!(split_transfer(10_000, 1_000, 101).is_err());
    }
}
