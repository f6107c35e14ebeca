//! Rounding rules shared by the calculators.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to a whole unit, with ties going away from zero.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_half_away;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_half_away(Decimal::new(25, 1)), Decimal::new(3, 0));
/// assert_eq!(round_half_away(Decimal::new(-25, 1)), Decimal::new(-3, 0));
/// assert_eq!(round_half_away(Decimal::new(24, 1)), Decimal::new(2, 0));
/// ```
pub fn round_half_away(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to whole seconds and converts, saturating at the `i64` bounds.
pub(crate) fn to_whole_seconds(value: Decimal) -> i64 {
    let rounded = round_half_away(value);
    rounded.to_i64().unwrap_or(if rounded.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}
