use serde::Serialize;

/// Role-specific activity metric; exactly one is present in a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    ActiveUsers(i64),
    ActiveDays(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub event_count: i64,
    pub revenue_cents: i64,
    #[serde(flatten)]
    pub activity: Activity,
}
