//! WhatsApp session state.
//!
//! One session is built at startup and shared. Its state only moves in
//! response to bridge events (`qr`, `ready`, `disconnected`, `auth_failure`)
//! or an explicit logout.

use shared::TransportEvent;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::gateway::MessageGateway;
use crate::domain::error::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    /// A pairing code is waiting to be scanned
    AwaitingScan { qr_code: String },
    Ready,
    Disconnected { reason: Option<String> },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::AwaitingScan { .. } => "awaiting_scan",
            SessionState::Ready => "ready",
            SessionState::Disconnected { .. } => "disconnected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub is_ready: bool,
    pub has_qr: bool,
    pub state: &'static str,
}

pub struct WhatsAppSession {
    gateway: Arc<dyn MessageGateway>,
    country_code: String,
    state: RwLock<SessionState>,
}

impl WhatsAppSession {
    pub fn new(gateway: Arc<dyn MessageGateway>, country_code: &str) -> Self {
        Self {
            gateway,
            country_code: country_code.to_string(),
            state: RwLock::new(SessionState::Unauthenticated),
        }
    }

    pub async fn on_qr(&self, qr_code: String) {
        info!("QR code received for WhatsApp pairing");
        *self.state.write().await = SessionState::AwaitingScan { qr_code };
    }

    pub async fn on_ready(&self) {
        info!("WhatsApp client is ready");
        *self.state.write().await = SessionState::Ready;
    }

    pub async fn on_disconnected(&self, reason: Option<String>) {
        warn!("WhatsApp client disconnected: {}", reason.as_deref().unwrap_or("no reason given"));
        *self.state.write().await = SessionState::Disconnected { reason };
    }

    /// A failed pairing leaves nothing usable; a new code must be issued
    pub async fn on_auth_failure(&self, message: Option<String>) {
        error!("WhatsApp authentication failed: {}", message.as_deref().unwrap_or("unknown"));
        *self.state.write().await = SessionState::Unauthenticated;
    }

    pub async fn apply_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::Qr { code } => self.on_qr(code).await,
            TransportEvent::Ready => self.on_ready().await,
            TransportEvent::Disconnected { reason } => self.on_disconnected(reason).await,
            TransportEvent::AuthFailure { message } => self.on_auth_failure(message).await,
        }
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn status(&self) -> SessionStatus {
        let state = self.state.read().await;
        SessionStatus {
            is_ready: *state == SessionState::Ready,
            has_qr: matches!(*state, SessionState::AwaitingScan { .. }),
            state: state.name(),
        }
    }

    pub async fn is_ready(&self) -> bool {
        *self.state.read().await == SessionState::Ready
    }

    pub async fn qr_code(&self) -> Option<String> {
        match &*self.state.read().await {
            SessionState::AwaitingScan { qr_code } => Some(qr_code.clone()),
            _ => None,
        }
    }

    /// Chat address for a 10-digit contact number
    pub fn chat_id(&self, contact_number: &str) -> String {
        format!("{}{}@c.us", self.country_code, contact_number)
    }

    pub async fn ensure_ready(&self) -> DomainResult<()> {
        if self.is_ready().await {
            Ok(())
        } else {
            Err(DomainError::PreconditionFailed(
                "WhatsApp client is not ready".to_string(),
            ))
        }
    }

    pub async fn send_message(&self, contact_number: &str, text: &str) -> DomainResult<()> {
        self.ensure_ready().await?;

        let chat_id = self.chat_id(contact_number);
        self.gateway.send_text(&chat_id, text).await.map_err(|e| {
            error!("Error sending WhatsApp message to {}: {:#}", chat_id, e);
            DomainError::ExternalService(format!("{:#}", e))
        })
    }

    /// Ends the session. Local state is reset even when the bridge call fails,
    /// and that failure is still reported.
    pub async fn logout(&self) -> DomainResult<()> {
        let result = self.gateway.logout().await;
        *self.state.write().await = SessionState::Unauthenticated;

        match result {
            Ok(()) => {
                info!("WhatsApp client logged out");
                Ok(())
            }
            Err(e) => {
                error!("WhatsApp logout failed at the bridge: {:#}", e);
                Err(DomainError::ExternalService(format!("{:#}", e)))
            }
        }
    }
}
