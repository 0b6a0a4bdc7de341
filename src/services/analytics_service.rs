use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::database::manager::{DatabaseError, DatabaseManager};

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
}

#[derive(Debug, Clone, Serialize)]
pub struct StageRollup {
    pub stage: String,
    pub count: i64,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthRollup {
    pub month: String,
    pub count: i64,
    pub amount: f64,
}

/// Per-user rollup of deals by stage and by calendar month. Derived data;
/// recomputable at any time from the deals table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub updated_at: DateTime<Utc>,
    pub deals_by_stage: Vec<StageRollup>,
    pub deals_by_month: Vec<MonthRollup>,
}

#[derive(Debug, FromRow)]
struct DealFacts {
    stage: String,
    amount: f64,
    created_at: DateTime<Utc>,
}

/// Keyed snapshot store, one entry per owner. The cache lives for the
/// process lifetime, entries are never evicted, and it is reachable only
/// through `get` and `recalculate`.
pub struct AnalyticsService {
    cache: RwLock<HashMap<i64, AnalyticsSnapshot>>,
}

impl AnalyticsService {
    fn instance() -> &'static AnalyticsService {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<AnalyticsService> = OnceLock::new();
        INSTANCE.get_or_init(|| AnalyticsService {
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Cached snapshot for the owner, computed on first request. A cached
    /// entry is returned as-is, however stale; only `recalculate` replaces
    /// it.
    pub async fn get(owner_id: i64) -> Result<AnalyticsSnapshot, AnalyticsError> {
        let service = Self::instance();

        {
            let cache = service.cache.read().await;
            if let Some(snapshot) = cache.get(&owner_id) {
                return Ok(snapshot.clone());
            }
        }

        let snapshot = Self::compute(owner_id).await?;

        // Two concurrent first requests may both compute; keep whichever
        // entry landed first so repeated gets return identical snapshots.
        let mut cache = service.cache.write().await;
        Ok(cache.entry(owner_id).or_insert(snapshot).clone())
    }

    /// Kick off a recompute in the background and return immediately; the
    /// caller polls `get` to observe the replacement. Overlapping
    /// recalculations for one owner are not serialized: the last write to
    /// land wins, which is not necessarily the one started last.
    pub fn recalculate(owner_id: i64) {
        tokio::spawn(async move {
            match Self::compute(owner_id).await {
                Ok(snapshot) => {
                    let mut cache = Self::instance().cache.write().await;
                    cache.insert(owner_id, snapshot);
                    tracing::info!("Analytics recomputed for user {}", owner_id);
                }
                Err(e) => {
                    // Failure leaves the previous snapshot in place.
                    tracing::error!("Analytics recompute failed for user {}: {}", owner_id, e);
                }
            }
        });
    }

    async fn compute(owner_id: i64) -> Result<AnalyticsSnapshot, AnalyticsError> {
        let pool = DatabaseManager::pool().await?;

        let deals: Vec<DealFacts> = sqlx::query_as(
            "SELECT d.stage, d.amount, d.created_at \
             FROM deals d JOIN contacts c ON c.id = d.contact_id \
             WHERE c.owner_id = $1 \
             ORDER BY d.id",
        )
        .bind(owner_id)
        .fetch_all(&pool)
        .await?;

        Ok(Self::rollup(&deals, Utc::now()))
    }

    /// Group by stage and by YYYY-MM month, summing count and amount. Group
    /// keys appear in first-occurrence order, not sorted; consumers that
    /// need a fixed order sort for themselves.
    fn rollup(deals: &[DealFacts], updated_at: DateTime<Utc>) -> AnalyticsSnapshot {
        let mut by_stage: Vec<StageRollup> = Vec::new();
        let mut by_month: Vec<MonthRollup> = Vec::new();

        for deal in deals {
            let stage = if deal.stage.is_empty() {
                "Unspecified"
            } else {
                deal.stage.as_str()
            };
            let month = deal.created_at.format("%Y-%m").to_string();

            match by_stage.iter_mut().find(|r| r.stage == stage) {
                Some(rollup) => {
                    rollup.count += 1;
                    rollup.amount += deal.amount;
                }
                None => by_stage.push(StageRollup {
                    stage: stage.to_string(),
                    count: 1,
                    amount: deal.amount,
                }),
            }

            match by_month.iter_mut().find(|r| r.month == month) {
                Some(rollup) => {
                    rollup.count += 1;
                    rollup.amount += deal.amount;
                }
                None => by_month.push(MonthRollup {
                    month,
                    count: 1,
                    amount: deal.amount,
                }),
            }
        }

        AnalyticsSnapshot {
            updated_at,
            deals_by_stage: by_stage,
            deals_by_month: by_month,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn deal(stage: &str, amount: f64, ts: &str) -> DealFacts {
        DealFacts {
            stage: stage.to_string(),
            amount,
            created_at: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S")
                .expect("test timestamp")
                .and_utc(),
        }
    }

    #[test]
    fn groups_by_stage_with_sums() {
        let deals = vec![
            deal("Won", 100.0, "2024-01-10 12:00:00"),
            deal("Won", 50.0, "2024-01-11 12:00:00"),
            deal("Lost", 0.0, "2024-01-12 12:00:00"),
        ];

        let snapshot = AnalyticsService::rollup(&deals, Utc::now());

        assert_eq!(snapshot.deals_by_stage.len(), 2);
        let won = &snapshot.deals_by_stage[0];
        assert_eq!(won.stage, "Won");
        assert_eq!(won.count, 2);
        assert_eq!(won.amount, 150.0);
        let lost = &snapshot.deals_by_stage[1];
        assert_eq!(lost.stage, "Lost");
        assert_eq!(lost.count, 1);
        assert_eq!(lost.amount, 0.0);
    }

    #[test]
    fn groups_by_calendar_month() {
        let deals = vec![
            deal("Won", 10.0, "2024-01-31 23:59:59"),
            deal("Won", 20.0, "2024-02-01 00:00:00"),
            deal("Lost", 5.0, "2024-02-15 09:30:00"),
        ];

        let snapshot = AnalyticsService::rollup(&deals, Utc::now());

        assert_eq!(snapshot.deals_by_month.len(), 2);
        assert_eq!(snapshot.deals_by_month[0].month, "2024-01");
        assert_eq!(snapshot.deals_by_month[0].count, 1);
        assert_eq!(snapshot.deals_by_month[1].month, "2024-02");
        assert_eq!(snapshot.deals_by_month[1].count, 2);
        assert_eq!(snapshot.deals_by_month[1].amount, 25.0);
    }

    #[test]
    fn empty_stage_becomes_unspecified() {
        let deals = vec![deal("", 10.0, "2024-03-01 00:00:00")];

        let snapshot = AnalyticsService::rollup(&deals, Utc::now());

        assert_eq!(snapshot.deals_by_stage[0].stage, "Unspecified");
    }

    #[test]
    fn group_keys_keep_first_occurrence_order() {
        let deals = vec![
            deal("Prospect", 1.0, "2024-01-01 00:00:00"),
            deal("Won", 1.0, "2024-01-02 00:00:00"),
            deal("Prospect", 1.0, "2024-01-03 00:00:00"),
            deal("Lost", 1.0, "2024-01-04 00:00:00"),
        ];

        let snapshot = AnalyticsService::rollup(&deals, Utc::now());

        let stages: Vec<&str> = snapshot
            .deals_by_stage
            .iter()
            .map(|r| r.stage.as_str())
            .collect();
        assert_eq!(stages, vec!["Prospect", "Won", "Lost"]);
    }

    #[test]
    fn no_deals_yields_empty_rollups() {
        let snapshot = AnalyticsService::rollup(&[], Utc::now());
        assert!(snapshot.deals_by_stage.is_empty());
        assert!(snapshot.deals_by_month.is_empty());
    }
}
