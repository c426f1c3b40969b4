use super::{id_list, listing_request, non_empty};
use crate::{
    errors::AppError,
    filters::{FilterValue, item_filter},
    models::item::ItemStatus,
    services::{
        item_service::{ITEM_SOURCE, ItemChanges, NewItem},
        listing::ListingRequest,
    },
};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use validator::{Validate, ValidationError};

/// Query parameters of the form `option_<abbr>=v1,v2`.
const OPTION_PREFIX: &str = "option_";

/// Body of `POST /v1/item`.
#[derive(Debug, Deserialize, Validate)]
pub struct ItemStoreRequest {
    #[validate(length(min = 3, max = 128))]
    pub title: String,
    #[validate(length(max = 1000))]
    pub body: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
    #[serde(default, deserialize_with = "status")]
    pub status: Option<ItemStatus>,
    #[serde(default, deserialize_with = "id_list")]
    pub images: Option<Vec<i64>>,
    /// Accepted for compatibility; options are attached through update.
    #[serde(default)]
    pub options: Option<serde_json::Value>,
}

impl ItemStoreRequest {
    pub fn into_new_item(self) -> Result<NewItem, AppError> {
        Ok(NewItem {
            price_cents: to_cents(self.price)?,
            title: self.title,
            body: self.body,
            stock: self.stock.unwrap_or(0),
            status: self.status.unwrap_or_default(),
            images: self.images.unwrap_or_default(),
        })
    }
}

/// One `{id, value}` entry of an update's `options` list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionValue {
    pub id: i64,
    pub value: String,
}

/// Body of `PUT /v1/item/{id}`. Every field is optional.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ItemUpdateRequest {
    #[validate(length(min = 3, max = 128))]
    pub title: Option<String>,
    #[validate(length(max = 1000))]
    pub body: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
    #[serde(default, deserialize_with = "status")]
    pub status: Option<ItemStatus>,
    #[serde(default, deserialize_with = "id_list")]
    pub images: Option<Vec<i64>>,
    #[validate(custom(function = "validate_option_values"))]
    pub options: Option<Vec<OptionValue>>,
}

impl ItemUpdateRequest {
    pub fn into_changes(self) -> Result<ItemChanges, AppError> {
        Ok(ItemChanges {
            price_cents: self.price.map(to_cents).transpose()?,
            title: self.title,
            body: self.body,
            stock: self.stock,
            status: self.status,
            images: self.images,
            options: self.options.map(|values| {
                values
                    .into_iter()
                    .map(|option| (option.id, option.value))
                    .collect::<BTreeMap<_, _>>()
            }),
        })
    }
}

/// Query string of `GET /v1/item`.
pub fn listing(params: &HashMap<String, String>) -> Result<ListingRequest, AppError> {
    let mut filter_params = Vec::new();

    if let Some(q) = non_empty(params, item_filter::Q) {
        filter_params.push((item_filter::Q.to_string(), FilterValue::Text(q.to_string())));
    }

    if let Some(status) = non_empty(params, item_filter::STATUS) {
        let status = status
            .parse::<ItemStatus>()
            .map_err(|_| AppError::validation(format!("The selected status is invalid: `{status}`")))?;
        filter_params.push((item_filter::STATUS.to_string(), FilterValue::Int(status.code())));
    }

    let choices = params
        .iter()
        .filter_map(|(key, value)| {
            let abbr = key.strip_prefix(OPTION_PREFIX)?;
            let values = value
                .split(',')
                .map(|v| v.trim().to_string())
                .collect::<Vec<_>>();
            Some((abbr.to_string(), values))
        })
        .collect::<BTreeMap<_, _>>();
    if !choices.is_empty() {
        filter_params.push((item_filter::OPTIONS.to_string(), FilterValue::Choices(choices)));
    }

    listing_request(&ITEM_SOURCE, item_filter::filter(filter_params), params)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatusInput {
    Code(i64),
    Name(String),
}

/// Item status by name (`"ABSENT"`) or code (`2`).
fn status<'de, D>(deserializer: D) -> Result<Option<ItemStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<StatusInput>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(StatusInput::Code(code)) => code.to_string(),
        Some(StatusInput::Name(name)) => name,
    };
    raw.parse::<ItemStatus>()
        .map(Some)
        .map_err(serde::de::Error::custom)
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("price_negative"));
    }
    if price.normalize().scale() > 2 {
        return Err(ValidationError::new("price_precision"));
    }
    Ok(())
}

fn validate_option_values(values: &[OptionValue]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for option in values {
        if !seen.insert(option.id) {
            return Err(ValidationError::new("options_duplicate_id"));
        }
        let len = option.value.trim().chars().count();
        if len == 0 || len > 255 {
            return Err(ValidationError::new("options_value_length"));
        }
    }
    Ok(())
}

fn to_cents(price: Decimal) -> Result<i64, AppError> {
    price
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.trunc().to_i64())
        .ok_or_else(|| AppError::validation("The price is out of range"))
}
