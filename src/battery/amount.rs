//! Tagged consumption amounts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A consumption amount: either an instantaneous current or a discrete
/// quantity of energy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DrainAmount {
    /// Current draw in amperes, valid until the next current drain.
    Current(f64),
    /// Energy in joules, consumed at once.
    Energy(f64),
}

impl DrainAmount {
    /// The numeric value regardless of the tag.
    pub fn value(self) -> f64 {
        match self {
            DrainAmount::Current(v) | DrainAmount::Energy(v) => v,
        }
    }
}

impl fmt::Display for DrainAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrainAmount::Current(a) => write!(f, "{a:.6} A"),
            DrainAmount::Energy(j) => write!(f, "{j:.6} J"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DrainAmount;

    #[test]
    fn value_ignores_tag() {
        assert_eq!(DrainAmount::Current(0.5).value(), 0.5);
        assert_eq!(DrainAmount::Energy(2.0).value(), 2.0);
    }

    #[test]
    fn display_has_unit() {
        assert_eq!(DrainAmount::Current(0.25).to_string(), "0.250000 A");
        assert_eq!(DrainAmount::Energy(1.0).to_string(), "1.000000 J");
    }
}
