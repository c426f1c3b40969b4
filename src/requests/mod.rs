//! Request validation: JSON bodies, query strings and uploads are turned
//! into service inputs here, or rejected with a 422.

pub mod auth;
pub mod image;
pub mod item;
pub mod option;

use crate::{
    errors::AppError,
    filters::Filter,
    services::listing::{Direction, ListingRequest, Page, Sort, Source},
};
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use std::collections::HashMap;
use validator::Validate;

/// `Json<T>` that also runs `T`'s validation rules.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                AppError::new(rejection.status(), rejection.body_text())
            })?;
        value.validate()?;
        Ok(Self(value))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdInput {
    Csv(String),
    List(Vec<IdEntry>),
    One(i64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdEntry {
    Int(i64),
    Text(String),
}

/// Accepts `"1,2"`, `[1, 2]`, `["1", "2"]` or a bare `1`. `null` reads as
/// absent; an empty string or empty list is an explicit empty set.
pub fn id_list<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(input) = Option::<IdInput>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let ids = match input {
        IdInput::One(id) => vec![id],
        IdInput::Csv(csv) => parse_ids(csv.split(',')).map_err(serde::de::Error::custom)?,
        IdInput::List(entries) => entries
            .into_iter()
            .map(|entry| match entry {
                IdEntry::Int(id) => Ok(id),
                IdEntry::Text(text) => parse_id(&text),
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(serde::de::Error::custom)?,
    };
    Ok(Some(ids))
}

fn parse_ids<'a>(parts: impl Iterator<Item = &'a str>) -> Result<Vec<i64>, String> {
    parts
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_id)
        .collect()
}

fn parse_id(text: &str) -> Result<i64, String> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| format!("`{text}` is not a valid id"))
}

/// Shared part of every index query: `order`, `reverse`, `page`, `limit`.
pub(crate) fn listing_request(
    source: &Source,
    filter: Filter,
    params: &HashMap<String, String>,
) -> Result<ListingRequest, AppError> {
    let direction = match non_empty(params, "reverse") {
        Some(reverse) => reverse.parse::<Direction>()?,
        None => Direction::default(),
    };
    let sort = Sort::resolve(source, non_empty(params, "order"), direction)?;

    let page_number = integer_param(params, "page")?;
    if page_number.is_some_and(|n| n < 1) {
        return Err(AppError::validation("The page must be at least 1"));
    }
    let page = match integer_param(params, "limit")? {
        Some(limit) => Some(Page::new(page_number, limit)?),
        None => None,
    };

    Ok(ListingRequest { filter, sort, page })
}

pub(crate) fn non_empty<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn integer_param(params: &HashMap<String, String>, key: &str) -> Result<Option<i64>, AppError> {
    non_empty(params, key)
        .map(|value| {
            value
                .parse::<i64>()
                .map_err(|_| AppError::validation(format!("The {key} must be an integer")))
        })
        .transpose()
}
