//! Shared application state handed to every handler.

use crate::{
    config::AppConfig,
    services::{
        auth_service::AuthService, image_service::ImageService, item_service::ItemService,
        option_service::OptionService,
    },
    storage::Disk,
};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub disk: Arc<dyn Disk>,
    pub config: Arc<AppConfig>,
    pub items: ItemService,
    pub options: OptionService,
    pub images: ImageService,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(db: SqlitePool, disk: Arc<dyn Disk>, config: AppConfig) -> Self {
        let db = Arc::new(db);
        Self {
            items: ItemService::new(db.clone(), disk.clone()),
            options: OptionService::new(db.clone()),
            images: ImageService::new(db.clone(), disk.clone()),
            auth: AuthService::new(db.clone(), config.token_lifetime),
            config: Arc::new(config),
            disk,
            db,
        }
    }
}
