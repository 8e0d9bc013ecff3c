//! Investment plan generation
//!
//! Pairs the savings forecast (how much can be invested) with the spending
//! trend (how much risk the user's habits suggest) and returns a fixed
//! allocation over three risk buckets plus the full options catalog.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::InvestConfig;
use crate::forecast::Forecaster;
use crate::outcome::Outcome;

/// Slope beyond which the risk profile moves away from Moderate
pub const RISK_SLOPE_THRESHOLD: f64 = 5.0;

/// Why no plan could be produced (shown to the user)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("No investable surplus predicted.")]
    NoSurplus,

    #[error("Your predicted savings are not positive.")]
    NonPositiveSurplus,

    #[error("Could not generate an investment plan at this time.")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskProfile {
    /// Rising spending reads as risk appetite, falling spending as caution
    pub fn from_slope(slope: Option<f64>) -> Self {
        match slope {
            Some(s) if s > RISK_SLOPE_THRESHOLD => Self::Aggressive,
            Some(s) if s < -RISK_SLOPE_THRESHOLD => Self::Conservative,
            _ => Self::Moderate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "Conservative",
            Self::Moderate => "Moderate",
            Self::Aggressive => "Aggressive",
        }
    }

    pub fn allocation(&self) -> Allocation {
        match self {
            Self::Conservative => Allocation::new(0.7, 0.2, 0.1),
            Self::Moderate => Allocation::new(0.4, 0.4, 0.2),
            Self::Aggressive => Allocation::new(0.2, 0.4, 0.4),
        }
    }
}

impl std::fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Share of the surplus per risk bucket (sums to 1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Allocation {
    #[serde(rename = "Low Risk")]
    pub low: f64,
    #[serde(rename = "Medium Risk")]
    pub medium: f64,
    #[serde(rename = "High Risk")]
    pub high: f64,
}

impl Allocation {
    fn new(low: f64, medium: f64, high: f64) -> Self {
        Self { low, medium, high }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentOption {
    pub name: &'static str,
    /// Expected annual return range in percent
    pub return_pa: (f64, f64),
    pub description: &'static str,
}

/// Every instrument, grouped by risk bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentOptions {
    #[serde(rename = "Low Risk")]
    pub low: Vec<InvestmentOption>,
    #[serde(rename = "Medium Risk")]
    pub medium: Vec<InvestmentOption>,
    #[serde(rename = "High Risk")]
    pub high: Vec<InvestmentOption>,
}

impl InvestmentOptions {
    pub fn catalog() -> Self {
        Self {
            low: vec![
                InvestmentOption {
                    name: "Fixed Deposit (FD)",
                    return_pa: (6.5, 7.5),
                    description: "A safe option offered by banks with guaranteed returns. Good for capital preservation.",
                },
                InvestmentOption {
                    name: "Public Provident Fund (PPF)",
                    return_pa: (7.0, 7.5),
                    description: "A long-term, government-backed savings scheme with tax benefits. Ideal for retirement planning.",
                },
            ],
            medium: vec![
                InvestmentOption {
                    name: "Mutual Funds (SIP)",
                    return_pa: (12.0, 18.0),
                    description: "Invest in a diversified portfolio of stocks or bonds managed by experts. SIPs allow for regular, disciplined investing.",
                },
                InvestmentOption {
                    name: "Real Estate",
                    return_pa: (8.0, 14.0),
                    description: "Investing in property can provide rental income and long-term appreciation, but requires significant capital.",
                },
            ],
            high: vec![
                InvestmentOption {
                    name: "Direct Equity (Stocks)",
                    return_pa: (15.0, 25.0),
                    description: "Buying shares of individual companies. Offers high growth potential but comes with higher volatility and risk.",
                },
                InvestmentOption {
                    name: "Gold",
                    return_pa: (8.0, 12.0),
                    description: "A traditional safe-haven asset. Can be held physically or through Gold ETFs and Bonds to hedge against inflation.",
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentPlan {
    pub predicted_surplus: f64,
    pub risk_profile: RiskProfile,
    pub justification: String,
    pub allocation_percentages: Allocation,
    pub investment_options: InvestmentOptions,
}

impl InvestmentPlan {
    pub fn new(predicted_surplus: f64, risk_profile: RiskProfile) -> Self {
        Self {
            predicted_surplus,
            risk_profile,
            justification: format!(
                "Based on your habits, we've identified your risk profile as '{}'.",
                risk_profile
            ),
            allocation_percentages: risk_profile.allocation(),
            investment_options: InvestmentOptions::catalog(),
        }
    }
}

/// Build a plan from the user's savings forecast and spending trend
pub fn investment_plan(
    forecaster: &Forecaster<'_>,
    user_id: i64,
    config: &InvestConfig,
) -> std::result::Result<InvestmentPlan, PlanError> {
    let surplus = match forecaster.savings(user_id) {
        Outcome::Predicted(value) if value > 0.0 => value,
        Outcome::Predicted(value) => {
            debug!(user_id, value, "Predicted savings not positive");
            fallback(config, PlanError::NonPositiveSurplus)?
        }
        Outcome::InsufficientData => fallback(config, PlanError::NoSurplus)?,
        Outcome::Fault(reason) => {
            warn!(user_id, reason = %reason, "Savings prediction failed");
            return Err(PlanError::Unavailable(reason));
        }
    };

    let risk_profile = RiskProfile::from_slope(forecaster.trend_slope(user_id));
    Ok(InvestmentPlan::new(surplus, risk_profile))
}

fn fallback(config: &InvestConfig, err: PlanError) -> std::result::Result<f64, PlanError> {
    match config.fallback_surplus {
        Some(surplus) => {
            debug!(surplus, reason = %err, "Using configured fallback surplus");
            Ok(surplus)
        }
        None => Err(err),
    }
}
