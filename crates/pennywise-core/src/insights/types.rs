//! Core types for the insight synthesizer

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of notice, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Needs attention (unusual spending, low savings)
    Warning,
    /// Encouragement, only shown when there are no warnings
    Positive,
    /// Informational (trends, forecasts, tips)
    Info,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Warning => "warning",
            InsightKind::Positive => "positive",
            InsightKind::Info => "info",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
impl std::str::FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warning" => Ok(InsightKind::Warning),
            "positive" => Ok(InsightKind::Positive),
            "info" => Ok(InsightKind::Info),
            _ => Err(format!("Unknown insight kind: {}", s)),
        }
    }
}

/// A human-readable notice for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
}

impl Insight {
    pub fn new(kind: InsightKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn warning(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(InsightKind::Warning, title, description)
    }

    pub fn positive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(InsightKind::Positive, title, description)
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(InsightKind::Info, title, description)
    }
}

/// Format a rupee amount with thousands separators and no decimals ("₹12,346")
///
/// Negative amounts put the sign before the symbol ("-₹4,500"). Amounts that
/// round to zero never carry a sign.
pub fn format_rupees(amount: f64) -> String {
    let rounded = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, c) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0.0 && rounded.chars().any(|c| c != '0') {
        format!("-₹{}", grouped)
    } else {
        format!("₹{}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insight_kind_round_trip() {
        for kind in [InsightKind::Warning, InsightKind::Positive, InsightKind::Info] {
            assert_eq!(kind.as_str().parse::<InsightKind>().unwrap(), kind);
        }
        assert!("alert".parse::<InsightKind>().is_err());
    }

    #[test]
    fn test_insight_serializes_type_key() {
        let json = serde_json::to_value(Insight::warning("Low Savings Rate", "x")).unwrap();
        assert_eq!(json["type"], "warning");
        assert_eq!(json["title"], "Low Savings Rate");
        assert_eq!(json["description"], "x");
    }

    #[test]
    fn test_format_rupees() {
        assert_eq!(format_rupees(0.0), "₹0");
        assert_eq!(format_rupees(999.0), "₹999");
        assert_eq!(format_rupees(1000.0), "₹1,000");
        assert_eq!(format_rupees(12345.6), "₹12,346");
        assert_eq!(format_rupees(1234567.0), "₹1,234,567");
        assert_eq!(format_rupees(-4500.0), "-₹4,500");
        assert_eq!(format_rupees(-0.4), "₹0");
    }
}
