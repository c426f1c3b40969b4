//! Periodic removal of expired auth tokens.
//!
//! The sweep only touches the `auth_tokens` table; it shares nothing with
//! request handlers beyond the pool.

use chrono::Utc;
use sqlx::SqlitePool;
use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info, warn};

/// Delete every token whose expiry has passed. Returns the number removed.
pub async fn sweep_expired_tokens(db: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM auth_tokens WHERE expires_at < ?")
        .bind(Utc::now())
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

/// Run [`sweep_expired_tokens`] every `every` until the runtime shuts down.
pub fn spawn(db: Arc<SqlitePool>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match sweep_expired_tokens(&db).await {
                Ok(0) => debug!("token sweep: nothing expired"),
                Ok(removed) => info!(removed, "token sweep removed expired tokens"),
                Err(err) => warn!(error = %err, "token sweep failed"),
            }
        }
    })
}
