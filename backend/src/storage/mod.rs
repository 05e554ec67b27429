//! # Storage Module
//!
//! SQLite persistence for tenants and rent records. Repositories speak in
//! domain models and return `anyhow::Result`; the services decide what a
//! storage failure means to the caller.

pub mod connection;
pub mod repositories;

use chrono::{DateTime, SecondsFormat, Utc};

pub use connection::DbConnection;
pub use repositories::{RentRepository, TenantRepository};

/// True when the error came from a UNIQUE constraint in SQLite
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

/// Timestamps are stored as fixed-width RFC 3339 text so that string order
/// is chronological order.
pub(crate) fn encode_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(value: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_round_trip_keeps_microseconds() {
        let at = DateTime::parse_from_rfc3339("2024-03-05T10:15:30.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        let encoded = encode_timestamp(&at);
        assert_eq!(encoded, "2024-03-05T10:15:30.123456Z");
        assert_eq!(decode_timestamp(&encoded).unwrap(), at);
    }

    #[test]
    fn test_plain_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&anyhow::anyhow!("boom")));
    }
}
