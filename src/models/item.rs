//! Catalog items and their association records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};

/// Availability of an item. Stored as its integer code.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum ItemStatus {
    #[default]
    Available = 1,
    Absent = 2,
    Blocked = 3,
}

impl ItemStatus {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Absent => "ABSENT",
            Self::Blocked => "BLOCKED",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts either the status name (any case) or its integer code.
impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" | "1" => Ok(Self::Available),
            "ABSENT" | "2" => Ok(Self::Absent),
            "BLOCKED" | "3" => Ok(Self::Blocked),
            other => Err(format!("unknown item status `{other}`")),
        }
    }
}

/// A catalog item. The price is kept as integer cents.
#[derive(Clone, FromRow, Debug, PartialEq)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub body: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Price as a two-place decimal.
    pub fn price(&self) -> Decimal {
        Decimal::new(self.price_cents, 2)
    }
}

/// One row of `item_options`: an option attached to an item with its value.
#[derive(Clone, FromRow, Debug, PartialEq, Eq)]
pub struct ItemOption {
    pub item_id: i64,
    pub option_id: i64,
    pub value: String,
}
