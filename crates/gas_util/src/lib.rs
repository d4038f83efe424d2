//! Gas arithmetic shared by every transaction flow.
//!
//! All math is done on integers in the smallest currency unit so that large
//! values never go through floating point.

/// Gas price multiplier, expressed in percent of the network base price.
pub const MULTIPLIER_LOW: u32 = 80;
pub const MULTIPLIER_AVERAGE: u32 = 100;
pub const MULTIPLIER_FAST: u32 = 150;

/// Adds the 20% safety buffer applied to every gas estimate before a
/// transaction is submitted: `limit = ceil(estimate * 1.2)`.
pub fn compute_gas_limit(estimate: u64) -> u64 {
    ((estimate as u128) * 120).div_ceil(100) as u64
}

/// Scales a base gas price (in wei) by a percent multiplier.
///
/// The multiplier is carried as an integer percent (80, 100, 150) so the
/// scaling stays exact: multiply by the percent, divide by 100.
pub fn adjust_gas_price(base_gas_price: u128, multiplier_percent: u32) -> u128 {
    base_gas_price * (multiplier_percent as u128) / 100
}
