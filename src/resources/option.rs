use crate::models::option::{AttachedOption, CatalogOption};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// `value` is only rendered when the option is seen through an item.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OptionResource {
    pub id: i64,
    pub abbr: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl From<CatalogOption> for OptionResource {
    fn from(option: CatalogOption) -> Self {
        Self {
            id: option.id,
            abbr: option.abbr,
            title: option.title,
            value: None,
            created: option.created_at,
            updated: option.updated_at,
        }
    }
}

impl From<AttachedOption> for OptionResource {
    fn from(option: AttachedOption) -> Self {
        Self {
            id: option.id,
            abbr: option.abbr,
            title: option.title,
            value: Some(option.value),
            created: option.created_at,
            updated: option.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standalone_option_has_no_value_key() {
        let now = Utc::now();
        let body = serde_json::to_value(OptionResource::from(CatalogOption {
            id: 1,
            abbr: "color".into(),
            title: "Color".into(),
            created_at: now,
            updated_at: now,
        }))
        .unwrap();
        assert!(body.get("value").is_none());
        assert_eq!(body["abbr"], "color");
    }

    #[test]
    fn attached_option_renders_pivot_value() {
        let now = Utc::now();
        let body = serde_json::to_value(OptionResource::from(AttachedOption {
            item_id: 9,
            id: 1,
            abbr: "color".into(),
            title: "Color".into(),
            value: "red".into(),
            created_at: now,
            updated_at: now,
        }))
        .unwrap();
        assert_eq!(body["value"], "red");
        assert!(body.get("item_id").is_none());
    }
}
