//! # Messaging Module
//!
//! WhatsApp delivery: a session object tracking pairing/readiness and a
//! gateway trait for the bridge that actually talks to WhatsApp.

pub mod gateway;
pub mod session;

pub use gateway::{HttpGateway, MessageGateway};
pub use session::{SessionState, SessionStatus, WhatsAppSession};
