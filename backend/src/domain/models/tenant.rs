//! Domain model for a tenant.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::KycDocument;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub address: String,
    pub contact_number: String,
    pub aadhaar: KycDocument,
    pub pan: KycDocument,
    pub accommodation_from_date: NaiveDate,
    pub deposit: f64,
    pub agreement_done: bool,
    /// Only kept while `agreement_done` is set
    pub agreement_date: Option<NaiveDate>,
    pub photo: Option<String>,
    pub monthly_rent: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Flip the active flag. Tenants are never physically removed.
    pub fn toggle_active(&mut self, at: DateTime<Utc>) {
        self.is_active = !self.is_active;
        self.updated_at = at;
    }

    pub fn deactivate(&mut self, at: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = at;
    }
}

/// Tenant list filter on the active flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl ActiveFilter {
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(str::trim) {
            None | Some("") | Some("all") => Some(ActiveFilter::All),
            Some("active") => Some(ActiveFilter::Active),
            Some("inactive") => Some(ActiveFilter::Inactive),
            Some(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ActiveFilter::All => None,
            ActiveFilter::Active => Some(true),
            ActiveFilter::Inactive => Some(false),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TenantFilter {
    pub search: Option<String>,
    pub active: ActiveFilter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_filter_parse() {
        assert_eq!(ActiveFilter::parse(None), Some(ActiveFilter::All));
        assert_eq!(ActiveFilter::parse(Some("all")), Some(ActiveFilter::All));
        assert_eq!(ActiveFilter::parse(Some("active")), Some(ActiveFilter::Active));
        assert_eq!(ActiveFilter::parse(Some("inactive")), Some(ActiveFilter::Inactive));
        assert_eq!(ActiveFilter::parse(Some("archived")), None);
        assert_eq!(ActiveFilter::Inactive.as_flag(), Some(false));
    }
}
