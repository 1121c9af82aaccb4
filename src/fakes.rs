//! In-memory stores used by unit and router tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

use crate::{
    auth::{
        repo::{UserStore, UserStoreError},
        repo_types::{NewUser, User},
    },
    kpis::{
        repo::KpiStore,
        repo_types::{DailyRevenue, EventTotals, TimeWindow, TypeCount},
        scope::KpiScope,
    },
};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, UserStoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(UserStoreError::DuplicateEmail);
        }
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(created.clone());
        Ok(created)
    }
}

#[derive(Debug, Clone)]
pub struct Event {
    pub user_id: Uuid,
    pub event_type: String,
    pub amount_cents: i64,
    pub created_at: OffsetDateTime,
}

impl Event {
    pub fn new(
        user_id: Uuid,
        event_type: &str,
        amount_cents: i64,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            user_id,
            event_type: event_type.into(),
            amount_cents,
            created_at,
        }
    }

    fn utc_date(&self) -> time::Date {
        self.created_at.to_offset(UtcOffset::UTC).date()
    }

    fn signed_revenue(&self) -> i64 {
        match self.event_type.as_str() {
            "sale" => self.amount_cents,
            "refund" => -self.amount_cents,
            _ => 0,
        }
    }
}

#[derive(Default)]
pub struct MemoryKpiStore {
    events: Vec<Event>,
}

impl MemoryKpiStore {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    fn visible(&self, scope: KpiScope) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter().filter(move |e| match scope {
            KpiScope::All => true,
            KpiScope::Owner(id) => e.user_id == id,
        })
    }
}

#[async_trait]
impl KpiStore for MemoryKpiStore {
    async fn totals(&self, scope: KpiScope) -> anyhow::Result<EventTotals> {
        let mut totals = EventTotals::default();
        for e in self.visible(scope) {
            totals.event_count += 1;
            match e.event_type.as_str() {
                "sale" => totals.sales_cents += e.amount_cents,
                "refund" => totals.refunds_cents += e.amount_cents,
                _ => {}
            }
        }
        Ok(totals)
    }

    async fn active_users(&self) -> anyhow::Result<i64> {
        let users: BTreeSet<Uuid> = self.events.iter().map(|e| e.user_id).collect();
        Ok(users.len() as i64)
    }

    async fn active_days(&self, user_id: Uuid) -> anyhow::Result<i64> {
        let days: BTreeSet<time::Date> = self
            .visible(KpiScope::Owner(user_id))
            .map(Event::utc_date)
            .collect();
        Ok(days.len() as i64)
    }

    async fn daily_revenue(
        &self,
        scope: KpiScope,
        window: TimeWindow,
    ) -> anyhow::Result<Vec<DailyRevenue>> {
        let mut by_day: BTreeMap<time::Date, i64> = BTreeMap::new();
        let in_window = |e: &&Event| window.since <= e.created_at && e.created_at <= window.until;
        for e in self.visible(scope).filter(in_window) {
            *by_day.entry(e.utc_date()).or_default() += e.signed_revenue();
        }
        Ok(by_day
            .into_iter()
            .map(|(date, revenue_cents)| DailyRevenue { date, revenue_cents })
            .collect())
    }

    async fn top_types(&self, scope: KpiScope, limit: i64) -> anyhow::Result<Vec<TypeCount>> {
        let mut counts: HashMap<&str, i64> = HashMap::new();
        for e in self.visible(scope) {
            *counts.entry(e.event_type.as_str()).or_default() += 1;
        }
        let mut rows: Vec<TypeCount> = counts
            .into_iter()
            .map(|(t, count)| TypeCount {
                event_type: t.to_string(),
                count,
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.event_type.cmp(&b.event_type)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}

/// Store whose every query fails, as an unreachable database would.
pub struct FailingKpiStore;

#[async_trait]
impl KpiStore for FailingKpiStore {
    async fn totals(&self, _scope: KpiScope) -> anyhow::Result<EventTotals> {
        anyhow::bail!("pool timed out")
    }
    async fn active_users(&self) -> anyhow::Result<i64> {
        anyhow::bail!("pool timed out")
    }
    async fn active_days(&self, _user_id: Uuid) -> anyhow::Result<i64> {
        anyhow::bail!("pool timed out")
    }
    async fn daily_revenue(
        &self,
        _scope: KpiScope,
        _window: TimeWindow,
    ) -> anyhow::Result<Vec<DailyRevenue>> {
        anyhow::bail!("pool timed out")
    }
    async fn top_types(&self, _scope: KpiScope, _limit: i64) -> anyhow::Result<Vec<TypeCount>> {
        anyhow::bail!("pool timed out")
    }
}
