use super::{listing_request, non_empty};
use crate::{
    errors::AppError,
    filters::{FilterValue, option_filter},
    services::{listing::ListingRequest, option_service::{OPTION_SOURCE, OptionChanges}},
};
use serde::Deserialize;
use std::collections::HashMap;
use validator::Validate;

/// Body of `POST /v1/option`.
#[derive(Debug, Deserialize, Validate)]
pub struct OptionStoreRequest {
    #[validate(length(min = 1, max = 64))]
    pub abbr: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
}

/// Body of `PUT /v1/option/{id}`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct OptionUpdateRequest {
    #[validate(length(min = 1, max = 64))]
    pub abbr: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
}

impl From<OptionUpdateRequest> for OptionChanges {
    fn from(request: OptionUpdateRequest) -> Self {
        Self {
            abbr: request.abbr,
            title: request.title,
        }
    }
}

/// Query string of `GET /v1/option`.
pub fn listing(params: &HashMap<String, String>) -> Result<ListingRequest, AppError> {
    let filter_params = non_empty(params, option_filter::Q)
        .map(|q| (option_filter::Q.to_string(), FilterValue::Text(q.to_string())));
    listing_request(&OPTION_SOURCE, option_filter::filter(filter_params), params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn store_requires_both_fields() {
        assert!(serde_json::from_value::<OptionStoreRequest>(json!({"abbr": "color"})).is_err());
        let request: OptionStoreRequest =
            serde_json::from_value(json!({"abbr": "", "title": "Color"})).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn update_is_partial() {
        let request: OptionUpdateRequest = serde_json::from_value(json!({"title": "Size"})).unwrap();
        request.validate().unwrap();
        let changes = OptionChanges::from(request);
        assert_eq!(changes.title.as_deref(), Some("Size"));
        assert!(changes.abbr.is_none());
    }

    #[test]
    fn listing_only_knows_q() {
        let params = HashMap::from([
            ("q".to_string(), "col".to_string()),
            ("status".to_string(), "1".to_string()),
        ]);
        assert_eq!(listing(&params).unwrap().filter.active(), vec!["q"]);
    }
}
