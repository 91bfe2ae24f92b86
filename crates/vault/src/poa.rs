//! Smart Power-of-Attorney: granular, time-limited permissions.
//!
//! Grounded in `original_source/backend/proxy_models.py::SmartPOA`: a POA is
//! valid exactly while it is active, unrevoked, and unexpired; scope and
//! spend limit are checked independently of validity so callers can produce
//! a precise violation reason.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poa {
    pub id: Uuid,
    pub principal_id: String,
    pub agent_id: String,
    pub scope: String,
    pub allowed_services: Option<HashSet<String>>,
    pub spend_limit: Decimal,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub active: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revocation_reason: Option<String>,
    pub creator_id: Option<String>,
}

impl Poa {
    /// `active ∧ revoked_at = ⊥ ∧ now < expires_at`.
    pub fn is_valid(&self) -> bool {
        self.active && self.revoked_at.is_none() && Utc::now() < self.expires_at
    }

    /// Absent `allowed_services` means every service within scope is allowed.
    pub fn is_within_scope(&self, service_name: &str) -> bool {
        match &self.allowed_services {
            None => true,
            Some(services) => services.contains(service_name),
        }
    }

    pub fn is_within_limit(&self, amount: Decimal) -> bool {
        amount <= self.spend_limit
    }
}
