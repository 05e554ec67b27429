//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain services. Handlers
//! translate shared DTOs into domain commands and domain errors into HTTP
//! status codes; no business rules live here.

pub mod rest;
