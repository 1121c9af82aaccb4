use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    repo_types::{DailyRevenue, EventTotals, TimeWindow, TypeCount},
    scope::KpiScope,
};

/// Aggregate reads over the event log. Every scoped method applies the
/// scope filter before aggregating.
#[async_trait]
pub trait KpiStore: Send + Sync {
    async fn totals(&self, scope: KpiScope) -> anyhow::Result<EventTotals>;
    /// Distinct users across the whole event log.
    async fn active_users(&self) -> anyhow::Result<i64>;
    /// Distinct UTC days on which `user_id` has events.
    async fn active_days(&self, user_id: Uuid) -> anyhow::Result<i64>;
    async fn daily_revenue(
        &self,
        scope: KpiScope,
        window: TimeWindow,
    ) -> anyhow::Result<Vec<DailyRevenue>>;
    async fn top_types(&self, scope: KpiScope, limit: i64) -> anyhow::Result<Vec<TypeCount>>;
}

#[derive(Clone)]
pub struct PgKpiStore {
    db: PgPool,
}

impl PgKpiStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn push_filters(
    qb: &mut QueryBuilder<'static, Postgres>,
    scope: KpiScope,
    window: Option<TimeWindow>,
) {
    let mut sep = " WHERE ";
    match scope {
        KpiScope::All => {}
        KpiScope::Owner(user_id) => {
            qb.push(sep).push("e.user_id = ").push_bind(user_id);
            sep = " AND ";
        }
    }
    if let Some(w) = window {
        qb.push(sep)
            .push("e.created_at >= ")
            .push_bind(w.since)
            .push(" AND e.created_at <= ")
            .push_bind(w.until);
    }
}

pub(crate) fn totals_query(scope: KpiScope) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT COUNT(*)::bigint AS event_count, \
         COALESCE(SUM(CASE WHEN e.type = 'sale' THEN e.amount_cents ELSE 0 END), 0)::bigint AS sales_cents, \
         COALESCE(SUM(CASE WHEN e.type = 'refund' THEN e.amount_cents ELSE 0 END), 0)::bigint AS refunds_cents \
         FROM events e",
    );
    push_filters(&mut qb, scope, None);
    qb
}

pub(crate) fn daily_query(scope: KpiScope, window: TimeWindow) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT (e.created_at AT TIME ZONE 'UTC')::date AS date, \
         COALESCE(SUM(CASE \
             WHEN e.type = 'sale' THEN e.amount_cents \
             WHEN e.type = 'refund' THEN -e.amount_cents \
             ELSE 0 END), 0)::bigint AS revenue_cents \
         FROM events e",
    );
    push_filters(&mut qb, scope, Some(window));
    qb.push(" GROUP BY 1 ORDER BY 1");
    qb
}

pub(crate) fn top_query(scope: KpiScope, limit: i64) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT e.type AS type, COUNT(*)::bigint AS count FROM events e");
    push_filters(&mut qb, scope, None);
    qb.push(" GROUP BY e.type ORDER BY count DESC, e.type ASC LIMIT ")
        .push_bind(limit);
    qb
}

#[async_trait]
impl KpiStore for PgKpiStore {
    async fn totals(&self, scope: KpiScope) -> anyhow::Result<EventTotals> {
        let mut qb = totals_query(scope);
        let totals = qb
            .build_query_as::<EventTotals>()
            .fetch_one(&self.db)
            .await
            .context("query event totals")?;
        Ok(totals)
    }

    async fn active_users(&self) -> anyhow::Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT user_id)::bigint FROM events")
            .fetch_one(&self.db)
            .await
            .context("query active users")
    }

    async fn active_days(&self, user_id: Uuid) -> anyhow::Result<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT (created_at AT TIME ZONE 'UTC')::date)::bigint
            FROM events
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .context("query active days")
    }

    async fn daily_revenue(
        &self,
        scope: KpiScope,
        window: TimeWindow,
    ) -> anyhow::Result<Vec<DailyRevenue>> {
        let mut qb = daily_query(scope, window);
        let rows = qb
            .build_query_as::<DailyRevenue>()
            .fetch_all(&self.db)
            .await
            .context("query daily revenue")?;
        Ok(rows)
    }

    async fn top_types(&self, scope: KpiScope, limit: i64) -> anyhow::Result<Vec<TypeCount>> {
        let mut qb = top_query(scope, limit);
        let rows = qb
            .build_query_as::<TypeCount>()
            .fetch_all(&self.db)
            .await
            .context("query top event types")?;
        Ok(rows)
    }
}
