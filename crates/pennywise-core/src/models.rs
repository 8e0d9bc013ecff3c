//! Domain models for Pennywise

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum category length (matches the ledger column width)
pub const MAX_CATEGORY_LEN: usize = 50;

/// Maximum description length
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// Amounts are stored with two decimal places and at most 10 digits
const MAX_AMOUNT_CENTS: i64 = 9_999_999_999;

/// Whether money came in or went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ledger entry owned by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    /// Fixed-point amount in minor units (always >= 0)
    pub amount_cents: i64,
    pub description: String,
}

impl Transaction {
    /// Amount as a floating point value for aggregation
    pub fn amount(&self) -> f64 {
        cents_to_f64(self.amount_cents)
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }
}

/// A transaction before insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user_id: i64,
    pub date: NaiveDate,
    pub kind: TransactionType,
    pub category: String,
    pub amount_cents: i64,
    pub description: String,
}

impl NewTransaction {
    pub fn new(
        user_id: i64,
        date: NaiveDate,
        kind: TransactionType,
        category: impl Into<String>,
        amount_cents: i64,
    ) -> Self {
        Self {
            user_id,
            date,
            kind,
            category: category.into(),
            amount_cents,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check the ledger invariants before a write
    pub fn validate(&self) -> Result<()> {
        if self.amount_cents < 0 {
            return Err(Error::InvalidData(format!(
                "Amount must not be negative (got {})",
                format_cents(self.amount_cents)
            )));
        }
        if self.amount_cents > MAX_AMOUNT_CENTS {
            return Err(Error::InvalidData(format!(
                "Amount {} exceeds 10 digits",
                format_cents(self.amount_cents)
            )));
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(Error::InvalidData("Category is required".to_string()));
        }
        if category.chars().count() > MAX_CATEGORY_LEN {
            return Err(Error::InvalidData(format!(
                "Category longer than {} characters",
                MAX_CATEGORY_LEN
            )));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(Error::InvalidData(format!(
                "Description longer than {} characters",
                MAX_DESCRIPTION_LEN
            )));
        }
        Ok(())
    }
}

/// Expense total for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total_cents: i64,
}

/// Income and expense totals with the resulting balance, in cents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_income_cents: i64,
    pub total_expense_cents: i64,
    pub balance_cents: i64,
}

/// One day of income and expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    /// Display label ("05 Mar")
    pub day: String,
    pub income_cents: i64,
    pub expense_cents: i64,
}

/// Parse a decimal amount string ("1234.5", "1234.50", "1234") into cents
pub fn parse_amount(s: &str) -> Result<i64> {
    let s = s.trim();
    let invalid = || Error::InvalidData(format!("Invalid amount: {:?}", s));

    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if frac.len() > 2 {
        return Err(Error::InvalidData(format!(
            "Amount {:?} has more than two decimal places",
            s
        )));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac_cents: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => frac.parse().map_err(|_| invalid())?,
    };

    let cents = whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac_cents))
        .ok_or_else(invalid)?;

    Ok(if negative { -cents } else { cents })
}

/// Render cents as a plain two-decimal string
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

pub fn cents_to_f64(cents: i64) -> f64 {
    cents as f64 / 100.0
}
