//! Tagged result of a single predictor
//!
//! Predictors distinguish "not enough history" from "something broke" so the
//! report can log them differently, even though both render as null.

use tracing::{debug, warn};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Predicted(T),
    /// Too little history, or no trained model for this input
    InsufficientData,
    /// Store or model failure
    Fault(String),
}

impl<T> Outcome<T> {
    pub fn is_predicted(&self) -> bool {
        matches!(self, Self::Predicted(_))
    }

    pub fn predicted(self) -> Option<T> {
        match self {
            Self::Predicted(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Predicted(value) => Outcome::Predicted(f(value)),
            Self::InsufficientData => Outcome::InsufficientData,
            Self::Fault(reason) => Outcome::Fault(reason),
        }
    }

    /// Collapse to an optional value, logging why nothing was produced
    pub fn into_option(self, what: &str) -> Option<T> {
        match self {
            Self::Predicted(value) => Some(value),
            Self::InsufficientData => {
                debug!(predictor = what, "Insufficient data");
                None
            }
            Self::Fault(reason) => {
                warn!(predictor = what, reason = %reason, "Predictor fault");
                None
            }
        }
    }
}

impl<T: Default> Outcome<T> {
    /// Like `into_option`, but empty collections stand in for null
    pub fn into_value_or_default(self, what: &str) -> T {
        self.into_option(what).unwrap_or_default()
    }
}

impl<T> From<Result<Option<T>>> for Outcome<T> {
    fn from(result: Result<Option<T>>) -> Self {
        match result {
            Ok(Some(value)) => Self::Predicted(value),
            Ok(None) => Self::InsufficientData,
            Err(e) => Self::Fault(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_from_result() {
        let ok: Outcome<i32> = Ok(Some(3)).into();
        assert_eq!(ok, Outcome::Predicted(3));

        let none: Outcome<i32> = Ok(None).into();
        assert_eq!(none, Outcome::InsufficientData);

        let err: Outcome<i32> = Err(Error::Model("boom".to_string())).into();
        assert_eq!(err, Outcome::Fault("Model error: boom".to_string()));
    }

    #[test]
    fn test_collapse() {
        assert_eq!(Outcome::Predicted(2).map(|v| v * 10).predicted(), Some(20));
        assert_eq!(Outcome::<f64>::InsufficientData.into_option("next_month"), None);
        assert_eq!(
            Outcome::<Vec<u8>>::Fault("x".to_string()).into_value_or_default("anomalies"),
            Vec::<u8>::new()
        );
        assert!(!Outcome::<u8>::InsufficientData.is_predicted());
    }
}
