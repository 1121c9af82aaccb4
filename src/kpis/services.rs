use time::OffsetDateTime;

use super::{
    dto::{Activity, Summary},
    repo::KpiStore,
    repo_types::{DailyRevenue, TimeWindow, TypeCount},
    scope::KpiScope,
};

pub const DAILY_WINDOW_DAYS: i64 = 14;
pub const TOP_TYPES_LIMIT: i64 = 5;

pub async fn summary(store: &dyn KpiStore, scope: KpiScope) -> anyhow::Result<Summary> {
    let totals = store.totals(scope).await?;
    let activity = match scope {
        KpiScope::All => Activity::ActiveUsers(store.active_users().await?),
        KpiScope::Owner(user_id) => Activity::ActiveDays(store.active_days(user_id).await?),
    };
    Ok(Summary {
        event_count: totals.event_count,
        revenue_cents: totals.revenue_cents(),
        activity,
    })
}

pub async fn daily(
    store: &dyn KpiStore,
    scope: KpiScope,
    now: OffsetDateTime,
) -> anyhow::Result<Vec<DailyRevenue>> {
    let window = TimeWindow::trailing_days(now, DAILY_WINDOW_DAYS);
    store.daily_revenue(scope, window).await
}

pub async fn top(store: &dyn KpiStore, scope: KpiScope) -> anyhow::Result<Vec<TypeCount>> {
    store.top_types(scope, TOP_TYPES_LIMIT).await
}
