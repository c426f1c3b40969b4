//! Filtered, ordered and optionally paginated listings.
//!
//! Shared by every entity that has an index endpoint. The caller supplies a
//! [`Source`] (which table, which columns) and a [`ListingRequest`] built from
//! the query string; ordering is applied after filtering and before the page
//! window.

use super::{CatalogError, CatalogResult};
use crate::filters::Filter;
use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool, sqlite::SqliteRow};
use std::str::FromStr;

pub const DEFAULT_ORDER: &str = "title";
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for Direction {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(CatalogError::Validation(format!(
                "The selected reverse is invalid: `{other}` (expected asc or desc)"
            ))),
        }
    }
}

/// Where a listing reads from.
#[derive(Debug, Clone, Copy)]
pub struct Source {
    /// `SELECT <columns> FROM <table>`, ending where `WHERE` may follow.
    pub select: &'static str,
    /// `SELECT COUNT(*) FROM <table>`.
    pub count: &'static str,
    /// Primary key column, used as the tiebreaker ordering.
    pub id_column: &'static str,
    /// Public sort name → column expression.
    pub sortable: &'static [(&'static str, &'static str)],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub column: &'static str,
    pub direction: Direction,
}

impl Sort {
    /// Resolve a public sort name against the sortable columns of `source`.
    pub fn resolve(
        source: &Source,
        order: Option<&str>,
        direction: Direction,
    ) -> CatalogResult<Self> {
        let requested = order
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .unwrap_or(DEFAULT_ORDER);
        source
            .sortable
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(requested))
            .map(|&(_, column)| Self { column, direction })
            .ok_or_else(|| {
                let names = source.sortable.iter().map(|(n, _)| *n).collect::<Vec<_>>();
                CatalogError::Validation(format!(
                    "The selected order is invalid: `{requested}` (expected one of {})",
                    names.join(", ")
                ))
            })
    }
}

/// One page window. `number` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub size: i64,
}

impl Page {
    pub fn new(number: Option<i64>, size: i64) -> CatalogResult<Self> {
        let number = number.unwrap_or(1);
        if number < 1 {
            return Err(CatalogError::Validation("The page must be at least 1".into()));
        }
        if !(1..=MAX_LIMIT).contains(&size) {
            return Err(CatalogError::Validation(format!(
                "The limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        Ok(Self { number, size })
    }

    fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.size)
    }
}

#[derive(Debug, Clone)]
pub struct ListingRequest {
    pub filter: Filter,
    pub sort: Sort,
    /// `None` returns the whole filtered set.
    pub page: Option<Page>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub current_page: i64,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl PageMeta {
    fn new(page: Page, total: i64, returned: usize) -> Self {
        let last_page = ((total + page.size - 1) / page.size).max(1);
        let (from, to) = if returned == 0 {
            (None, None)
        } else {
            let from = page.offset() + 1;
            (Some(from), Some(from + returned as i64 - 1))
        };
        Self {
            current_page: page.number,
            last_page,
            per_page: page.size,
            total,
            from,
            to,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    All(Vec<T>),
    Page { rows: Vec<T>, meta: PageMeta },
}

impl<T> Listing<T> {
    pub fn rows(&self) -> &[T] {
        match self {
            Self::All(rows) | Self::Page { rows, .. } => rows,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        match self {
            Self::All(rows) => Listing::All(rows.into_iter().map(f).collect()),
            Self::Page { rows, meta } => Listing::Page {
                rows: rows.into_iter().map(f).collect(),
                meta,
            },
        }
    }
}

/// Run `request` against `source`.
pub async fn fetch<T>(
    db: &SqlitePool,
    source: &Source,
    request: &ListingRequest,
) -> CatalogResult<Listing<T>>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    tracing::debug!(
        filters = ?request.filter.active(),
        order = request.sort.column,
        page = ?request.page,
        "listing"
    );
    let mut query = QueryBuilder::<Sqlite>::new(source.select);
    request.filter.apply(&mut query);
    push_order(&mut query, source, &request.sort);

    let Some(page) = request.page else {
        let rows: Vec<T> = query.build_query_as().fetch_all(db).await?;
        return Ok(Listing::All(rows));
    };

    let mut count = QueryBuilder::<Sqlite>::new(source.count);
    request.filter.apply(&mut count);
    let total: i64 = count.build_query_scalar().fetch_one(db).await?;

    query.push(" LIMIT ");
    query.push_bind(page.size);
    query.push(" OFFSET ");
    query.push_bind(page.offset());
    let rows: Vec<T> = query.build_query_as().fetch_all(db).await?;

    let meta = PageMeta::new(page, total, rows.len());
    Ok(Listing::Page { rows, meta })
}

fn push_order(query: &mut QueryBuilder<'_, Sqlite>, source: &Source, sort: &Sort) {
    // columns come from the static sortable table, never from the request
    query.push(format!(
        " ORDER BY {} {}, {} ASC",
        sort.column,
        sort.direction.sql(),
        source.id_column
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: Source = Source {
        select: "SELECT * FROM things",
        count: "SELECT COUNT(*) FROM things",
        id_column: "things.id",
        sortable: &[("id", "things.id"), ("title", "things.title")],
    };

    #[test]
    fn default_sort_is_title_ascending() {
        let sort = Sort::resolve(&SOURCE, None, Direction::default()).unwrap();
        assert_eq!(sort.column, "things.title");
        assert_eq!(sort.direction, Direction::Asc);
    }

    #[test]
    fn unknown_sort_column_is_rejected() {
        let err = Sort::resolve(&SOURCE, Some("price; DROP TABLE things"), Direction::Asc);
        assert!(matches!(err, Err(CatalogError::Validation(_))));
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("DESC".parse::<Direction>().unwrap(), Direction::Desc);
        assert!("down".parse::<Direction>().is_err());
    }

    #[test]
    fn page_bounds_are_enforced() {
        assert!(Page::new(Some(0), 10).is_err());
        assert!(Page::new(None, 0).is_err());
        assert!(Page::new(None, 101).is_err());
        assert_eq!(Page::new(None, 100).unwrap(), Page { number: 1, size: 100 });
    }

    #[test]
    fn page_meta_counts_window() {
        let meta = PageMeta::new(Page { number: 2, size: 10 }, 25, 10);
        assert_eq!(meta.last_page, 3);
        assert_eq!(meta.from, Some(11));
        assert_eq!(meta.to, Some(20));

        let empty = PageMeta::new(Page { number: 5, size: 10 }, 25, 0);
        assert_eq!(empty.from, None);
        assert_eq!(PageMeta::new(Page { number: 1, size: 10 }, 0, 0).last_page, 1);
    }

    #[test]
    fn order_follows_filter() {
        let mut query = QueryBuilder::<Sqlite>::new(SOURCE.select);
        let sort = Sort::resolve(&SOURCE, Some("title"), Direction::Desc).unwrap();
        push_order(&mut query, &SOURCE, &sort);
        assert_eq!(
            query.sql(),
            "SELECT * FROM things ORDER BY things.title DESC, things.id ASC"
        );
    }
}
