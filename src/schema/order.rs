use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Markov chain order: how many preceding words form the context window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum Order {
    #[default]
    Second,
    Third,
}

/// Rejected order value (only 2 and 3 are supported).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidOrder {
    #[error("unsupported order {0} (expected 2 or 3)")]
    OutOfRange(usize),
    #[error("order must be 2 or 3, got {0:?}")]
    NotANumber(String),
}

impl Order {
    /// Window width in tokens.
    pub fn width(self) -> usize {
        match self {
            Self::Second => 2,
            Self::Third => 3,
        }
    }
}

impl TryFrom<u8> for Order {
    type Error = InvalidOrder;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            other => Err(InvalidOrder::OutOfRange(other.into())),
        }
    }
}

impl TryFrom<usize> for Order {
    type Error = InvalidOrder;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            other => Err(InvalidOrder::OutOfRange(other)),
        }
    }
}

impl From<Order> for u8 {
    fn from(order: Order) -> u8 {
        order.width() as u8
    }
}

impl FromStr for Order {
    type Err = InvalidOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: usize = trimmed
            .parse()
            .map_err(|_| InvalidOrder::NotANumber(trimmed.to_string()))?;
        Order::try_from(value)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.width())
    }
}
