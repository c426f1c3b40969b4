//! Presentation layer: the fixed JSON shapes the API answers with.
//!
//! Successful payloads are wrapped under `data`; paginated listings add a
//! `meta` block next to it.

pub mod image;
pub mod item;
pub mod option;
pub mod user;

pub use image::ImageResource;
pub use item::ItemResource;
pub use option::OptionResource;
pub use user::UserResource;

use crate::services::listing::{Listing, PageMeta};
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// `{"data": T}`
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for Data<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// `{"data": [T], "meta": {...}}`, `meta` only when paginated.
#[derive(Debug, Serialize)]
pub struct Collection<T> {
    pub data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T> From<Listing<T>> for Collection<T> {
    fn from(listing: Listing<T>) -> Self {
        match listing {
            Listing::All(data) => Self { data, meta: None },
            Listing::Page { rows, meta } => Self {
                data: rows,
                meta: Some(meta),
            },
        }
    }
}

impl<T: Serialize> IntoResponse for Collection<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Confirmation body: `{"status": true, "msg": "..."}`.
#[derive(Debug, Serialize)]
pub struct Message {
    pub status: bool,
    pub msg: String,
}

impl Message {
    pub fn ok(msg: impl Into<String>) -> Data<Self> {
        Data::new(Self {
            status: true,
            msg: msg.into(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResource {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::listing::PageMeta;

    #[test]
    fn collection_omits_meta_when_unpaginated() {
        let body = serde_json::to_value(Collection::from(Listing::All(vec![1, 2]))).unwrap();
        assert_eq!(body, serde_json::json!({"data": [1, 2]}));
    }

    #[test]
    fn collection_carries_page_meta() {
        let meta = PageMeta {
            current_page: 1,
            last_page: 2,
            per_page: 1,
            total: 2,
            from: Some(1),
            to: Some(1),
        };
        let body = serde_json::to_value(Collection::from(Listing::Page { rows: vec![7], meta }))
            .unwrap();
        assert_eq!(body["meta"]["total"], 2);
        assert_eq!(body["data"], serde_json::json!([7]));
    }
}
