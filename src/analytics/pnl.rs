use serde::{Deserialize, Serialize};

/// Trade side as stored in the `trades.direction` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Anything other than "Long" is treated as a short position.
    pub fn parse(value: &str) -> Self {
        if value == "Long" {
            Direction::Long
        } else {
            Direction::Short
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "Long",
            Direction::Short => "Short",
        }
    }

    fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

/// Signed profit of one closed trade in quote currency
pub fn trade_pnl(entry_price: f64, exit_price: f64, quantity: f64, direction: Direction) -> f64 {
    (exit_price - entry_price) * quantity * direction.sign()
}

/// Returns the outcome if it is usable for aggregation, logging and
/// dropping NaN or infinite values.
pub fn valid_outcome(value: f64, context: &str) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        tracing::warn!("Skipping {} with non-finite outcome: {}", context, value);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_profits_when_price_rises() {
        assert_eq!(trade_pnl(100.0, 110.0, 2.0, Direction::Long), 20.0);
    }

    #[test]
    fn short_profits_when_price_falls() {
        assert_eq!(trade_pnl(100.0, 90.0, 3.0, Direction::Short), 30.0);
        assert_eq!(trade_pnl(100.0, 110.0, 1.0, Direction::Short), -10.0);
    }

    #[test]
    fn unknown_direction_is_short() {
        assert_eq!(Direction::parse("Long"), Direction::Long);
        assert_eq!(Direction::parse("Short"), Direction::Short);
        assert_eq!(Direction::parse("long"), Direction::Short);
    }

    #[test]
    fn non_finite_outcomes_are_rejected() {
        assert_eq!(valid_outcome(1.5, "trade"), Some(1.5));
        assert_eq!(valid_outcome(f64::NAN, "trade"), None);
        assert_eq!(valid_outcome(f64::INFINITY, "trade"), None);
    }
}
