use uuid::Uuid;

use crate::auth::{claims::Identity, role::Role};

/// Row visibility for KPI queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KpiScope {
    /// Every event (admin callers).
    All,
    /// Only events owned by this user.
    Owner(Uuid),
}

impl KpiScope {
    pub fn for_caller(caller: &Identity) -> Self {
        match caller.role {
            Role::Admin => KpiScope::All,
            Role::User => KpiScope::Owner(caller.id),
        }
    }
}
