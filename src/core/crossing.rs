//! Threshold crossing detection for a rate watch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Which way the rate has to move from the start rate to reach the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Falling,
    Rising,
}

impl Direction {
    /// A start rate equal to the target counts as a falling watch.
    pub fn of(start_rate: Decimal, target_rate: Decimal) -> Self {
        if start_rate >= target_rate {
            Direction::Falling
        } else {
            Direction::Rising
        }
    }

    pub fn is_crossed(&self, target_rate: Decimal, observed_rate: Decimal) -> bool {
        match self {
            Direction::Falling => observed_rate <= target_rate,
            Direction::Rising => observed_rate >= target_rate,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Direction::Falling => "falling",
                Direction::Rising => "rising",
            }
        )
    }
}

/// Returns true once `observed_rate` has reached or passed `target_rate`
/// coming from `start_rate`. Comparison is exact; equality counts as crossed.
pub fn crossed(start_rate: Decimal, target_rate: Decimal, observed_rate: Decimal) -> bool {
    Direction::of(start_rate, target_rate).is_crossed(target_rate, observed_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_direction_from_rates() {
        assert_eq!(Direction::of(dec("70.00"), dec("65.00")), Direction::Falling);
        assert_eq!(Direction::of(dec("70.00"), dec("75.00")), Direction::Rising);
        assert_eq!(Direction::of(dec("70"), dec("70.00")), Direction::Falling);
    }

    #[test]
    fn test_falling_watch() {
        let (start, target) = (dec("70.00"), dec("65.00"));
        assert!(!crossed(start, target, dec("69")));
        assert!(!crossed(start, target, dec("65.0001")));
        assert!(crossed(start, target, dec("65")));
        assert!(crossed(start, target, dec("64")));
    }

    #[test]
    fn test_rising_watch() {
        let (start, target) = (dec("70.00"), dec("75.00"));
        assert!(!crossed(start, target, dec("72.50")));
        assert!(!crossed(start, target, dec("74.9999")));
        assert!(crossed(start, target, dec("75.000")));
        assert!(crossed(start, target, dec("80")));
    }

    #[test]
    fn test_no_epsilon_tolerance() {
        // 0.1 + 0.2 is exactly 0.3 in decimal arithmetic
        let observed = dec("0.1") + dec("0.2");
        assert!(crossed(dec("1"), dec("0.3"), observed));
        assert!(crossed(dec("0"), dec("0.3"), observed));
        assert!(!crossed(dec("1"), dec("0.3"), dec("0.3000000000000000000000000001")));
    }

    fn rate() -> impl Strategy<Value = Decimal> {
        (0i64..100_000_000i64).prop_map(|units| Decimal::new(units, 4))
    }

    proptest! {
        #[test]
        fn prop_falling_crossed_iff_at_or_below_target(
            start in rate(), target in rate(), observed in rate()
        ) {
            prop_assume!(start >= target);
            prop_assert_eq!(crossed(start, target, observed), observed <= target);
        }

        #[test]
        fn prop_rising_crossed_iff_at_or_above_target(
            start in rate(), target in rate(), observed in rate()
        ) {
            prop_assume!(start < target);
            prop_assert_eq!(crossed(start, target, observed), observed >= target);
        }

        #[test]
        fn prop_target_itself_is_always_crossed(start in rate(), target in rate()) {
            prop_assert!(crossed(start, target, target));
        }
    }
}
