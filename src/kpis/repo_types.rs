use serde::Serialize;
use sqlx::FromRow;
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Scoped count and sale/refund sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct EventTotals {
    pub event_count: i64,
    pub sales_cents: i64,
    pub refunds_cents: i64,
}

impl EventTotals {
    pub fn revenue_cents(&self) -> i64 {
        self.sales_cents - self.refunds_cents
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct DailyRevenue {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct TypeCount {
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub event_type: String,
    pub count: i64,
}

/// Closed time range `[since, until]` for windowed queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub since: time::OffsetDateTime,
    pub until: time::OffsetDateTime,
}

impl TimeWindow {
    pub fn trailing_days(now: time::OffsetDateTime, days: i64) -> Self {
        Self {
            since: now - time::Duration::days(days),
            until: now,
        }
    }
}
