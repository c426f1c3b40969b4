//! Options: named attributes (e.g. `color`) that items carry with a value.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Clone, FromRow, Debug, PartialEq)]
pub struct CatalogOption {
    pub id: i64,
    /// Short code used in filters, e.g. `color`.
    pub abbr: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An option as seen through one item: the option row joined with the
/// value stored on the `item_options` association.
#[derive(Clone, FromRow, Debug, PartialEq)]
pub struct AttachedOption {
    pub item_id: i64,
    pub id: i64,
    pub abbr: String,
    pub title: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
