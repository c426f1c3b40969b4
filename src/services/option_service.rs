//! OptionService: CRUD for option definitions.

use super::{
    CatalogError, CatalogResult,
    listing::{self, Listing, ListingRequest, Source},
};
use crate::models::option::CatalogOption;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::sync::Arc;
use tracing::info;

const OPTION_COLUMNS: &str =
    "SELECT options.id, options.abbr, options.title, options.created_at, options.updated_at FROM options";

pub const OPTION_SOURCE: Source = Source {
    select: OPTION_COLUMNS,
    count: "SELECT COUNT(*) FROM options",
    id_column: "options.id",
    sortable: &[
        ("id", "options.id"),
        ("abbr", "options.abbr"),
        ("title", "options.title"),
        ("created_at", "options.created_at"),
        ("updated_at", "options.updated_at"),
    ],
};

#[derive(Debug, Clone, Default)]
pub struct OptionChanges {
    pub abbr: Option<String>,
    pub title: Option<String>,
}

#[derive(Clone)]
pub struct OptionService {
    db: Arc<SqlitePool>,
}

impl OptionService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    pub async fn index(&self, request: &ListingRequest) -> CatalogResult<Listing<CatalogOption>> {
        listing::fetch(&self.db, &OPTION_SOURCE, request).await
    }

    pub async fn show(&self, id: i64) -> CatalogResult<CatalogOption> {
        sqlx::query_as::<_, CatalogOption>(&format!("{OPTION_COLUMNS} WHERE options.id = ?"))
            .bind(id)
            .fetch_optional(&*self.db)
            .await?
            .ok_or(CatalogError::OptionNotFound)
    }

    pub async fn store(&self, abbr: &str, title: &str) -> CatalogResult<CatalogOption> {
        let mut tx = self.db.begin().await?;
        let now = Utc::now();

        let option = sqlx::query_as::<_, CatalogOption>(
            "INSERT INTO options (abbr, title, created_at, updated_at)
             VALUES (?, ?, ?, ?)
             RETURNING id, abbr, title, created_at, updated_at",
        )
        .bind(abbr)
        .bind(title)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(option_id = option.id, abbr = %option.abbr, "option created");
        Ok(option)
    }

    pub async fn update(&self, id: i64, changes: OptionChanges) -> CatalogResult<CatalogOption> {
        let mut tx = self.db.begin().await?;

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE options SET ");
        let mut set = query.separated(", ");
        if let Some(abbr) = &changes.abbr {
            set.push("abbr = ").push_bind_unseparated(abbr.clone());
        }
        if let Some(title) = &changes.title {
            set.push("title = ").push_bind_unseparated(title.clone());
        }
        set.push("updated_at = ").push_bind_unseparated(Utc::now());
        query.push(" WHERE id = ").push_bind(id);
        query.push(" RETURNING id, abbr, title, created_at, updated_at");

        let option = query
            .build_query_as::<CatalogOption>()
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CatalogError::OptionNotFound)?;

        tx.commit().await?;
        info!(option_id = id, "option updated");
        Ok(option)
    }

    /// Delete an option; its values on items go with it.
    pub async fn destroy(&self, id: i64) -> CatalogResult<()> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query("DELETE FROM options WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::OptionNotFound);
        }

        tx.commit().await?;
        info!(option_id = id, "option deleted");
        Ok(())
    }
}
