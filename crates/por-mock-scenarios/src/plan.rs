//! ---
//! por_section: "02-scenario-engine"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Response plans handed to the transport executor."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;

use crate::error::ScenarioError;

/// Declared `Content-Type` of a planned response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    PlainText,
}

impl ContentType {
    pub fn header_value(self) -> &'static str {
        match self {
            ContentType::Json => "application/json; charset=utf-8",
            ContentType::PlainText => "text/plain; charset=utf-8",
        }
    }
}

/// How the planned body reaches the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Send status, headers and the whole body.
    Complete,
    /// Hold the response back for the given duration, then send it whole.
    Stall(Duration),
    /// Send only the first half of the body bytes.
    TruncateHalf,
    /// Write the body as an unterminated fragment, wait `linger`, then drop
    /// the connection.
    Abort { linger: Duration },
}

/// Everything needed to emit one fixture response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePlan {
    pub status: u16,
    pub content_type: ContentType,
    pub body: Bytes,
    pub transport: Transport,
}

impl ResponsePlan {
    /// A complete `200` JSON response.
    pub fn json<T: Serialize>(payload: &T) -> Result<Self, ScenarioError> {
        Self::json_with_status(200, payload)
    }

    pub fn json_with_status<T: Serialize>(status: u16, payload: &T) -> Result<Self, ScenarioError> {
        Ok(Self {
            status,
            content_type: ContentType::Json,
            body: Bytes::from(serde_json::to_vec(payload)?),
            transport: Transport::Complete,
        })
    }

    /// A complete `200` response with a JSON content type and arbitrary bytes.
    pub fn raw(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            content_type: ContentType::Json,
            body: body.into(),
            transport: Transport::Complete,
        }
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Bytes that actually go on the wire under this plan's transport.
    pub fn wire_body(&self) -> Bytes {
        match self.transport {
            Transport::TruncateHalf => self.body.slice(..self.body.len() / 2),
            _ => self.body.clone(),
        }
    }
}
