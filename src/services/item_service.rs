//! ItemService: item lifecycle and its two associations.
//!
//! Items own a set of images (`item_images`, pure association) and a set of
//! option values (`item_options`, one row per option carrying `value`).
//! Deleting an item also removes the images only it referenced, including
//! their files on the configured disk.

use super::{
    CatalogError, CatalogResult,
    listing::{self, Listing, ListingRequest, Source},
};
use crate::{
    models::{
        image::{AttachedImage, Image},
        item::{Item, ItemOption, ItemStatus},
        option::AttachedOption,
    },
    storage::Disk,
};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
};
use tracing::{debug, info, warn};

const ITEM_COLUMNS: &str = "SELECT items.id, items.title, items.body, items.price_cents, \
     items.stock, items.status, items.created_at, items.updated_at FROM items";

pub const ITEM_SOURCE: Source = Source {
    select: ITEM_COLUMNS,
    count: "SELECT COUNT(*) FROM items",
    id_column: "items.id",
    sortable: &[
        ("id", "items.id"),
        ("title", "items.title"),
        ("body", "items.body"),
        ("price", "items.price_cents"),
        ("stock", "items.stock"),
        ("status", "items.status"),
        ("created_at", "items.created_at"),
        ("updated_at", "items.updated_at"),
    ],
};

/// An item together with everything its representation nests.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub item: Item,
    pub options: Vec<AttachedOption>,
    pub images: Vec<Image>,
}

/// Fields for a new item.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub title: String,
    pub body: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
    pub status: ItemStatus,
    /// Attached as given; duplicates collapse on the association key.
    pub images: Vec<i64>,
}

/// Partial update. `None` leaves a field or association untouched.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i64>,
    pub status: Option<ItemStatus>,
    /// Replacement image set.
    pub images: Option<Vec<i64>>,
    /// Replacement option set: option id → value.
    pub options: Option<BTreeMap<i64, String>>,
}

impl ItemChanges {
    /// Whether anything, fields or associations, is being changed.
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.price_cents.is_none()
            && self.stock.is_none()
            && self.status.is_none()
            && self.images.is_none()
            && self.options.is_none()
    }
}

/// What a sync added and removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncChanges {
    pub attached: Vec<i64>,
    pub detached: Vec<i64>,
    pub updated: Vec<i64>,
}

#[derive(Clone)]
pub struct ItemService {
    db: Arc<SqlitePool>,
    disk: Arc<dyn Disk>,
}

impl ItemService {
    pub fn new(db: Arc<SqlitePool>, disk: Arc<dyn Disk>) -> Self {
        Self { db, disk }
    }

    /// Filtered listing with options and images loaded for every row.
    pub async fn index(&self, request: &ListingRequest) -> CatalogResult<Listing<ItemRecord>> {
        let listing: Listing<Item> = listing::fetch(&self.db, &ITEM_SOURCE, request).await?;

        let ids = listing.rows().iter().map(|item| item.id).collect::<Vec<_>>();
        let mut conn = self.db.acquire().await?;
        let (mut options, mut images) = load_relations(&mut conn, &ids).await?;

        Ok(listing.map(|item| ItemRecord {
            options: options.remove(&item.id).unwrap_or_default(),
            images: images.remove(&item.id).unwrap_or_default(),
            item,
        }))
    }

    pub async fn show(&self, id: i64) -> CatalogResult<ItemRecord> {
        let mut conn = self.db.acquire().await?;
        let item = fetch_item(&mut conn, id)
            .await?
            .ok_or(CatalogError::ItemNotFound)?;
        let (mut options, mut images) = load_relations(&mut conn, &[id]).await?;

        Ok(ItemRecord {
            item,
            options: options.remove(&id).unwrap_or_default(),
            images: images.remove(&id).unwrap_or_default(),
        })
    }

    /// Insert an item and attach its images.
    ///
    /// Option values are not taken here; they are set through [`update`].
    ///
    /// [`update`]: Self::update
    pub async fn store(&self, new: NewItem) -> CatalogResult<ItemRecord> {
        let mut tx = self.db.begin().await?;
        let now = Utc::now();

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO items (title, body, price_cents, stock, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&new.title)
        .bind(&new.body)
        .bind(new.price_cents)
        .bind(new.stock)
        .bind(new.status)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        if !new.images.is_empty() {
            ensure_exist(&mut tx, "images", "images", &new.images).await?;
            for image_id in &new.images {
                sqlx::query("INSERT OR IGNORE INTO item_images (item_id, image_id) VALUES (?, ?)")
                    .bind(id)
                    .bind(image_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        info!(item_id = id, images = new.images.len(), "item created");

        self.show(id).await
    }

    /// Apply a partial update; supplied associations are synced.
    pub async fn update(&self, id: i64, changes: ItemChanges) -> CatalogResult<ItemRecord> {
        let mut tx = self.db.begin().await?;

        if fetch_item(&mut tx, id).await?.is_none() {
            return Err(CatalogError::ItemNotFound);
        }

        // association changes count as an update of the item too
        if !changes.is_empty() {
            let mut query = QueryBuilder::<Sqlite>::new("UPDATE items SET ");
            let mut set = query.separated(", ");
            if let Some(title) = &changes.title {
                set.push("title = ").push_bind_unseparated(title.clone());
            }
            if let Some(body) = &changes.body {
                set.push("body = ").push_bind_unseparated(body.clone());
            }
            if let Some(price_cents) = changes.price_cents {
                set.push("price_cents = ").push_bind_unseparated(price_cents);
            }
            if let Some(stock) = changes.stock {
                set.push("stock = ").push_bind_unseparated(stock);
            }
            if let Some(status) = changes.status {
                set.push("status = ").push_bind_unseparated(status);
            }
            set.push("updated_at = ").push_bind_unseparated(Utc::now());
            query.push(" WHERE id = ").push_bind(id);
            query.build().execute(&mut *tx).await?;
        }

        if let Some(images) = &changes.images {
            let synced = sync_images(&mut tx, id, images).await?;
            debug!(item_id = id, ?synced, "item images synced");
        }

        if let Some(options) = &changes.options {
            let synced = sync_options(&mut tx, id, options).await?;
            debug!(item_id = id, ?synced, "item options synced");
        }

        tx.commit().await?;
        info!(item_id = id, "item updated");

        self.show(id).await
    }

    /// Delete an item and clean up the images that only it referenced.
    ///
    /// Rows go in one transaction. Files are removed after commit and
    /// failures there are logged, not returned.
    pub async fn destroy(&self, id: i64) -> CatalogResult<()> {
        let mut tx = self.db.begin().await?;

        if fetch_item(&mut tx, id).await?.is_none() {
            return Err(CatalogError::ItemNotFound);
        }

        let orphans: Vec<Image> = sqlx::query_as(
            "SELECT images.id, images.path, images.filename, images.ext, images.size,
                    images.created_at, images.updated_at
             FROM images
             JOIN item_images ii ON ii.image_id = images.id
             WHERE ii.item_id = ?
               AND NOT EXISTS (
                   SELECT 1 FROM item_images other
                   WHERE other.image_id = images.id AND other.item_id <> ?
               )",
        )
        .bind(id)
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for image in &orphans {
            sqlx::query("DELETE FROM images WHERE id = ?")
                .bind(image.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!(item_id = id, images = orphans.len(), "item deleted");

        for image in &orphans {
            remove_image_file(self.disk.as_ref(), image).await;
        }

        Ok(())
    }
}

/// Best-effort delete of an image's backing file.
pub(crate) async fn remove_image_file(disk: &dyn Disk, image: &Image) {
    let path = image.full_path();
    match disk.exists(&path).await {
        Ok(true) => {
            if let Err(err) = disk.delete(&path).await {
                warn!(image_id = image.id, path = %path, error = %err, "failed to delete image file");
            }
        }
        Ok(false) => debug!(image_id = image.id, path = %path, "image file already missing"),
        Err(err) => {
            warn!(image_id = image.id, path = %path, error = %err, "failed to check image file");
        }
    }
}

async fn fetch_item(conn: &mut SqliteConnection, id: i64) -> CatalogResult<Option<Item>> {
    let item = sqlx::query_as::<_, Item>(&format!("{ITEM_COLUMNS} WHERE items.id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(item)
}

type Relations = (
    HashMap<i64, Vec<AttachedOption>>,
    HashMap<i64, Vec<Image>>,
);

/// Options and images for a batch of items, keyed by item id.
async fn load_relations(conn: &mut SqliteConnection, ids: &[i64]) -> CatalogResult<Relations> {
    let mut options: HashMap<i64, Vec<AttachedOption>> = HashMap::new();
    let mut images: HashMap<i64, Vec<Image>> = HashMap::new();
    if ids.is_empty() {
        return Ok((options, images));
    }

    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT io.item_id, o.id, o.abbr, o.title, io.value, o.created_at, o.updated_at
         FROM item_options io
         JOIN options o ON o.id = io.option_id
         WHERE io.item_id IN (",
    );
    push_id_list(&mut query, ids);
    query.push(" ORDER BY o.id");
    let rows: Vec<AttachedOption> = query.build_query_as().fetch_all(&mut *conn).await?;
    for row in rows {
        options.entry(row.item_id).or_default().push(row);
    }

    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT ii.item_id, i.id, i.path, i.filename, i.ext, i.size, i.created_at, i.updated_at
         FROM item_images ii
         JOIN images i ON i.id = ii.image_id
         WHERE ii.item_id IN (",
    );
    push_id_list(&mut query, ids);
    query.push(" ORDER BY i.id");
    let rows: Vec<AttachedImage> = query.build_query_as().fetch_all(&mut *conn).await?;
    for row in rows {
        images.entry(row.item_id).or_default().push(row.into());
    }

    Ok((options, images))
}

/// Pushes `?, ?, …)` for a non-empty id list.
fn push_id_list(query: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

/// Fail with a validation error naming any id missing from `table`.
async fn ensure_exist(
    conn: &mut SqliteConnection,
    table: &'static str,
    field: &str,
    ids: &[i64],
) -> CatalogResult<()> {
    let wanted: BTreeSet<i64> = ids.iter().copied().collect();
    if wanted.is_empty() {
        return Ok(());
    }

    let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT id FROM {table} WHERE id IN ("));
    let list = wanted.iter().copied().collect::<Vec<_>>();
    push_id_list(&mut query, &list);
    let found: BTreeSet<i64> = query
        .build_query_scalar::<i64>()
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .collect();

    let missing = wanted.difference(&found).map(i64::to_string).collect::<Vec<_>>();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::Validation(format!(
            "The selected {field} are invalid: {}",
            missing.join(", ")
        )))
    }
}

/// Make the item's image set exactly `ids`.
async fn sync_images(
    conn: &mut SqliteConnection,
    item_id: i64,
    ids: &[i64],
) -> CatalogResult<SyncChanges> {
    ensure_exist(conn, "images", "images", ids).await?;

    let current: BTreeSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT image_id FROM item_images WHERE item_id = ?")
            .bind(item_id)
            .fetch_all(&mut *conn)
            .await?
            .into_iter()
            .collect();
    let wanted: BTreeSet<i64> = ids.iter().copied().collect();

    let mut changes = SyncChanges::default();
    for image_id in current.difference(&wanted) {
        sqlx::query("DELETE FROM item_images WHERE item_id = ? AND image_id = ?")
            .bind(item_id)
            .bind(image_id)
            .execute(&mut *conn)
            .await?;
        changes.detached.push(*image_id);
    }
    for image_id in wanted.difference(&current) {
        sqlx::query("INSERT INTO item_images (item_id, image_id) VALUES (?, ?)")
            .bind(item_id)
            .bind(image_id)
            .execute(&mut *conn)
            .await?;
        changes.attached.push(*image_id);
    }

    Ok(changes)
}

/// Make the item's option rows exactly `values`, overwriting changed values.
async fn sync_options(
    conn: &mut SqliteConnection,
    item_id: i64,
    values: &BTreeMap<i64, String>,
) -> CatalogResult<SyncChanges> {
    let ids = values.keys().copied().collect::<Vec<_>>();
    ensure_exist(conn, "options", "options", &ids).await?;

    let current: HashMap<i64, String> = sqlx::query_as::<_, ItemOption>(
        "SELECT item_id, option_id, value FROM item_options WHERE item_id = ?",
    )
    .bind(item_id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(|row| (row.option_id, row.value))
    .collect();

    let mut changes = SyncChanges::default();
    for option_id in current.keys().filter(|id| !values.contains_key(*id)) {
        sqlx::query("DELETE FROM item_options WHERE item_id = ? AND option_id = ?")
            .bind(item_id)
            .bind(option_id)
            .execute(&mut *conn)
            .await?;
        changes.detached.push(*option_id);
    }

    for (option_id, value) in values {
        match current.get(option_id) {
            Some(existing) if existing == value => continue,
            Some(_) => changes.updated.push(*option_id),
            None => changes.attached.push(*option_id),
        }
        sqlx::query(
            "INSERT INTO item_options (item_id, option_id, value) VALUES (?, ?, ?)
             ON CONFLICT(item_id, option_id) DO UPDATE SET value = excluded.value",
        )
        .bind(item_id)
        .bind(option_id)
        .bind(value)
        .execute(&mut *conn)
        .await?;
    }

    changes.detached.sort_unstable();
    Ok(changes)
}
