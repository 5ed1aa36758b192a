//! Raw lifecycle events reported by the sharing routine.

use serde::Deserialize;

use crate::error::ClassifyError;

/// Lifecycle phase named by a routine event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleName {
    /// Routine is coming up.
    Starting,
    /// Routine is relaying.
    Running,
    /// Routine went down, possibly with an error.
    NotRunning,
    /// Periodic traffic report.
    Traffic,
}

impl LifecycleName {
    /// Parses the wire name (`starting`, `running`, `not_running`, `traffic`).
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "starting" => Some(Self::Starting),
            "running" => Some(Self::Running),
            "not_running" => Some(Self::NotRunning),
            "traffic" => Some(Self::Traffic),
            _ => None,
        }
    }

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::NotRunning => "not_running",
            Self::Traffic => "traffic",
        }
    }

    /// True for names that confirm the routine is relaying.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running | Self::Traffic)
    }
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    parameters: Option<RawParameters>,
}

#[derive(Deserialize, Default)]
struct RawParameters {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    bytes_written: Option<String>,
}

/// A decoded routine event.
///
/// Unknown fields are ignored and every field is optional. A name outside the
/// known vocabulary decodes to `name = None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleEvent {
    /// Recognized lifecycle name.
    pub name: Option<LifecycleName>,
    /// Raw error code, if any.
    pub error_code: Option<String>,
    /// Raw `bytes_written` value, if any.
    pub traffic_value: Option<String>,
    /// Free-form message, if any.
    pub message: Option<String>,
}

impl LifecycleEvent {
    /// Decodes a raw JSON payload.
    ///
    /// # Errors
    /// [`ClassifyError::Malformed`] when the payload is not a JSON object of the
    /// expected shape.
    ///
    /// # Example
    /// ```
    /// use sharevisor::{LifecycleEvent, LifecycleName};
    ///
    /// let ev = LifecycleEvent::parse(r#"{"name":"traffic","parameters":{"bytes_written":"1024"}}"#).unwrap();
    /// assert_eq!(ev.name, Some(LifecycleName::Traffic));
    /// assert_eq!(ev.traffic_bytes(), Some(1024));
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ClassifyError> {
        let raw: RawEvent = serde_json::from_str(raw)?;
        let params = raw.parameters.unwrap_or_default();
        Ok(Self {
            name: raw.name.as_deref().and_then(LifecycleName::from_wire),
            error_code: params.error,
            traffic_value: params.bytes_written,
            message: params.message,
        })
    }

    /// Traffic counter parsed as `u64`; `None` when absent or unparsable.
    pub fn traffic_bytes(&self) -> Option<u64> {
        self.traffic_value.as_deref()?.trim().parse().ok()
    }

    /// Error code with blank values treated as absent.
    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref().filter(|c| !c.trim().is_empty())
    }
}
