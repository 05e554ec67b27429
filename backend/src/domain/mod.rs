//! # Domain Module
//!
//! Business rules for tenants, monthly rent and the messages sent about it.
//! Services own validation and translate storage results into the
//! `DomainError` taxonomy; they know nothing about HTTP.
//!
//! ## Module Organization
//!
//! - **tenant_service**: tenant profiles, KYC uniqueness, soft delete
//! - **rent_service**: rent records, amounts, payment state
//! - **generation_service**: one record per active tenant for a month
//! - **notification_service**: reminder and confirmation messages
//! - **report_service**: monthly, yearly and dashboard rollups
//! - **upload_service**: KYC scans and photos on disk
//!
//! ## Business Rules
//!
//! - At most one rent record per tenant and month
//! - A record's total is always rent plus light bill
//! - Overdue is derived from the current month, never stored
//! - Deactivated tenants keep their rent history

pub mod commands;
pub mod error;
pub mod generation_service;
pub mod models;
pub mod notification_service;
pub mod rent_service;
pub mod report_service;
pub mod tenant_service;
pub mod upload_service;

pub use error::{DomainError, DomainResult, FieldError};
pub use generation_service::GenerationService;
pub use notification_service::NotificationService;
pub use rent_service::RentService;
pub use report_service::{Dashboard, ReportService};
pub use tenant_service::TenantService;
pub use upload_service::UploadStore;
