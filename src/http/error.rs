//! Fetch error record
//!
//! Every rejected fetch produces a [`FetchError`]: where the call came from,
//! what it asked for, and how the response (or its absence) was classified.
//! The record serializes to JSON so it can travel through string channels
//! and be read back with [`FetchError::parse`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::Result;

/// Status reported when no response arrived at all
pub const NO_RESPONSE_STATUS: u16 = 429;

/// Status text paired with [`NO_RESPONSE_STATUS`]
pub const NO_RESPONSE_STATUS_TEXT: &str = "TypeError: Failed to fetch";

const ERROR_PREFIX: &str = "Error: ";

/// Why a fetch was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FetchFailure {
    /// Connection refused, DNS failure, reset and similar
    Transport,
    /// The deadline fired before a response settled
    Timeout,
    /// The caller's abort signal fired
    Aborted,
    /// A response arrived with a non-2xx status
    Status,
    /// A 2xx response whose body was not JSON
    Decode,
    /// The call's own options were unusable; nothing was sent
    InvalidRequest,
}

impl FetchFailure {
    /// Whether this failure means no response reached the caller
    pub fn is_no_response(self) -> bool {
        matches!(self, FetchFailure::Transport | FetchFailure::Timeout | FetchFailure::Aborted)
    }
}

/// Coarse classification of an HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusClass {
    #[serde(rename = "1xx Informational")]
    Informational,
    #[serde(rename = "2xx Successful")]
    Successful,
    #[serde(rename = "3xx Redirection")]
    Redirection,
    #[serde(rename = "4xx Client error")]
    ClientError,
    #[serde(rename = "5xx Server error")]
    ServerError,
    #[serde(rename = "No Response")]
    NoResponse,
    /// Outside the 100..=599 range
    #[serde(rename = "Unknown")]
    Unknown,
}

impl StatusClass {
    pub fn label(self) -> &'static str {
        match self {
            StatusClass::Informational => "1xx Informational",
            StatusClass::Successful => "2xx Successful",
            StatusClass::Redirection => "3xx Redirection",
            StatusClass::ClientError => "4xx Client error",
            StatusClass::ServerError => "5xx Server error",
            StatusClass::NoResponse => "No Response",
            StatusClass::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify an HTTP status code
pub fn status_class(status: u16) -> StatusClass {
    match status {
        100..=199 => StatusClass::Informational,
        200..=299 => StatusClass::Successful,
        300..=399 => StatusClass::Redirection,
        400..=499 => StatusClass::ClientError,
        500..=599 => StatusClass::ServerError,
        _ => StatusClass::Unknown,
    }
}

/// Human-readable message for a response with `status`
pub fn status_message(status: u16) -> &'static str {
    match status {
        502 => "There was an error: Network response 502.",
        429 => "There was an error: 429 Too Many Requests.",
        404 => "There was an error: 404 Source Not Found.",
        _ => "There was an error: Network response was not OK.",
    }
}

/// Structured record of a failed fetch
///
/// Displays as its `message`. Serializes with camelCase field names and the
/// calling site under `source`.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct FetchError {
    /// Name of the calling site, for error tracking
    #[serde(rename = "source")]
    pub origin: String,
    /// The URL that was requested
    pub call: String,
    /// Context values supplied by the caller
    pub vars: Vec<Value>,
    pub time: DateTime<Utc>,
    pub message: String,
    pub status_class: StatusClass,
    pub status: u16,
    pub status_text: String,
    pub ok: bool,
    pub kind: FetchFailure,
    /// Transport or decode cause, when one is known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl FetchError {
    /// No response arrived: transport failure
    ///
    /// Reported with the 429 sentinel and `"TypeError: Failed to fetch"`.
    pub fn no_response(
        origin: impl Into<String>,
        call: impl Into<String>,
        vars: Vec<Value>,
        detail: Option<String>,
    ) -> Self {
        FetchError {
            origin: origin.into(),
            call: call.into(),
            vars,
            time: Utc::now(),
            message: "There was an error: Failed to fetch.".to_string(),
            status_class: StatusClass::NoResponse,
            status: NO_RESPONSE_STATUS,
            status_text: NO_RESPONSE_STATUS_TEXT.to_string(),
            ok: false,
            kind: FetchFailure::Transport,
            detail,
        }
    }

    /// A response arrived with a non-2xx `status`
    pub fn from_status(
        origin: impl Into<String>,
        call: impl Into<String>,
        vars: Vec<Value>,
        status: u16,
        status_text: impl Into<String>,
    ) -> Self {
        FetchError {
            origin: origin.into(),
            call: call.into(),
            vars,
            time: Utc::now(),
            message: status_message(status).to_string(),
            status_class: status_class(status),
            status,
            status_text: status_text.into(),
            ok: false,
            kind: FetchFailure::Status,
            detail: None,
        }
    }

    /// A 2xx response whose body could not be decoded as JSON
    pub fn malformed_body(
        origin: impl Into<String>,
        call: impl Into<String>,
        vars: Vec<Value>,
        status: u16,
        detail: impl Into<String>,
    ) -> Self {
        FetchError {
            origin: origin.into(),
            call: call.into(),
            vars,
            time: Utc::now(),
            message: "There was an error: Response body was not valid JSON.".to_string(),
            status_class: status_class(status),
            status,
            status_text: String::new(),
            ok: true,
            kind: FetchFailure::Decode,
            detail: Some(detail.into()),
        }
    }

    /// The call was rejected before any request was sent
    ///
    /// Carries status `0` so it cannot be mistaken for a server or transport
    /// failure.
    pub fn invalid_request(
        origin: impl Into<String>,
        call: impl Into<String>,
        vars: Vec<Value>,
        detail: impl Into<String>,
    ) -> Self {
        FetchError {
            origin: origin.into(),
            call: call.into(),
            vars,
            time: Utc::now(),
            message: "There was an error: Invalid request options.".to_string(),
            status_class: StatusClass::NoResponse,
            status: 0,
            status_text: String::new(),
            ok: false,
            kind: FetchFailure::InvalidRequest,
            detail: Some(detail.into()),
        }
    }

    /// Replace the failure kind, keeping everything else
    pub fn with_kind(mut self, kind: FetchFailure) -> Self {
        self.kind = kind;
        self
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == FetchFailure::Timeout
    }

    pub fn is_aborted(&self) -> bool {
        self.kind == FetchFailure::Aborted
    }

    /// Serialize the record to a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Read a record back from its JSON text
    ///
    /// Accepts the text with or without a leading `"Error: "`.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let body = trimmed.strip_prefix(ERROR_PREFIX).unwrap_or(trimmed);
        Ok(serde_json::from_str(body)?)
    }
}
