use super::{ImageResource, OptionResource};
use crate::{models::item::ItemStatus, services::item_service::ItemRecord, storage::Disk};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemResource {
    pub id: i64,
    pub title: String,
    pub body: Option<String>,
    /// Serialized as a string, e.g. `"12.50"`.
    pub price: Decimal,
    pub stock: i64,
    pub status: ItemStatus,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub options: Vec<OptionResource>,
    pub images: Vec<ImageResource>,
}

impl ItemResource {
    pub fn new(record: ItemRecord, disk: &dyn Disk) -> Self {
        let ItemRecord {
            item,
            options,
            images,
        } = record;

        Self {
            price: item.price(),
            id: item.id,
            title: item.title,
            body: item.body,
            stock: item.stock,
            status: item.status,
            created: item.created_at,
            updated: item.updated_at,
            options: options.into_iter().map(OptionResource::from).collect(),
            images: images
                .iter()
                .map(|image| ImageResource::new(image, disk))
                .collect(),
        }
    }
}
