use std::time::{Duration, Instant};

use thiserror::Error;

use crate::client::AnalysisError;
use crate::export::ExportError;
use crate::intake::IntakeError;
use crate::session::SessionError;

/// Notices dismiss themselves after this long.
pub const NOTICE_TTL: Duration = Duration::from_secs(6);

/// Application-level error type.
/// Every variant terminates at the UI boundary as a transient `Notice`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn to_notice(&self) -> Notice {
        let (code, message) = match self {
            AppError::Intake(e) => ("INPUT_ERROR", e.to_string()),
            AppError::Analysis(e) => {
                let code = match e {
                    AnalysisError::Transport { .. } => "TRANSPORT_ERROR",
                    AnalysisError::Rejected(_) => "ANALYSIS_REJECTED",
                    AnalysisError::EmptyResult => "EMPTY_RESULT",
                    AnalysisError::Malformed { .. } => "MALFORMED_RESULT",
                };
                (code, e.to_string())
            }
            AppError::Export(e @ ExportError::Render(_)) => (
                "EXPORT_ERROR",
                format!("Document export failed: {e}. Try the JSON export instead."),
            ),
            AppError::Export(e) => ("EXPORT_ERROR", e.to_string()),
            AppError::Session(e) => ("BUSY", e.to_string()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                ("INTERNAL_ERROR", "An unexpected error occurred".to_string())
            }
        };
        Notice::error(code, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Info,
}

/// A user-visible, auto-dismissing message.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    raised_at: Instant,
}

impl Notice {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self::raised_at(Severity::Error, code, message, Instant::now())
    }

    pub fn info(code: &'static str, message: impl Into<String>) -> Self {
        Self::raised_at(Severity::Info, code, message, Instant::now())
    }

    pub fn raised_at(
        severity: Severity,
        code: &'static str,
        message: impl Into<String>,
        at: Instant,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            raised_at: at,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= NOTICE_TTL
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "error: {}", self.message),
            Severity::Info => write!(f, "{}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_notice_keeps_server_text() {
        let notice = AppError::from(AnalysisError::Rejected("X".to_string())).to_notice();
        assert_eq!(notice.code, "ANALYSIS_REJECTED");
        assert_eq!(notice.message, "X");
        assert_eq!(notice.severity, Severity::Error);
    }

    #[test]
    fn test_empty_and_malformed_are_distinguished() {
        let empty = AppError::from(AnalysisError::EmptyResult).to_notice();
        let malformed = AppError::from(AnalysisError::Malformed {
            detail: "missing tags".to_string(),
        })
        .to_notice();
        assert_eq!(empty.code, "EMPTY_RESULT");
        assert_eq!(malformed.code, "MALFORMED_RESULT");
        assert_ne!(empty.message, malformed.message);
    }

    #[test]
    fn test_render_failure_suggests_json_export() {
        let notice = AppError::from(ExportError::Render("font missing".to_string())).to_notice();
        assert!(notice.message.contains("font missing"));
        assert!(notice.message.contains("JSON export"));
    }

    #[test]
    fn test_notice_expires_after_ttl() {
        let start = Instant::now();
        let notice = Notice::raised_at(Severity::Error, "X", "boom", start);
        assert!(!notice.is_expired(start + Duration::from_secs(5)));
        assert!(notice.is_expired(start + NOTICE_TTL));
    }
}
