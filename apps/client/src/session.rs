//! Session — the single control loop that owns the current result, the busy
//! flag and the active notice.
//!
//! State only changes on discrete events: `begin` (submit), `complete`
//! (response received), `reset`, `dismiss` and `tick`. At most one analysis
//! is in flight; a second `begin` while busy is refused.

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};

use crate::client::{AnalysisApi, AnalysisError};
use crate::errors::{AppError, Notice};
use crate::intake::{PdfFile, Submission};
use crate::models::AnalysisResult;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("An analysis is already in progress")]
    Busy,
}

/// Identifies one in-flight submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Intake,
    Busy(Ticket),
    Showing(AnalysisResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    /// Empty input; no request was made.
    Skipped,
    Sent,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Attach the submitted text as `raw_content` when the server omits it.
    pub keep_raw: bool,
}

#[derive(Debug)]
pub struct Session {
    phase: Phase,
    notice: Option<Notice>,
    next_ticket: u64,
    options: SessionOptions,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            phase: Phase::Intake,
            notice: None,
            next_ticket: 0,
            options,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Busy(_))
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.phase {
            Phase::Showing(result) => Some(result),
            _ => None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    // ── events ──────────────────────────────────────────────────────────────

    /// Marks a submission as in flight and clears any stale notice.
    pub fn begin(&mut self) -> Result<Ticket, SessionError> {
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.notice = None;
        self.phase = Phase::Busy(ticket);
        Ok(ticket)
    }

    /// Applies a response. Returns false for a ticket that is no longer current.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> bool {
        if self.phase != Phase::Busy(ticket) {
            debug!("Ignoring response for stale ticket {ticket:?}");
            return false;
        }
        match outcome {
            Ok(result) => {
                info!("Analysis received with {} tags", result.tags().len());
                self.phase = Phase::Showing(result);
            }
            Err(e) => {
                self.phase = Phase::Intake;
                self.raise(AppError::from(e));
            }
        }
        true
    }

    /// Drops the current result and notice and returns to intake.
    pub fn reset(&mut self) {
        if !self.is_busy() {
            self.phase = Phase::Intake;
        }
        self.notice = None;
    }

    pub fn dismiss(&mut self) {
        self.notice = None;
    }

    /// Auto-dismisses an expired notice.
    pub fn tick(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notice = None;
        }
    }

    pub fn raise(&mut self, error: AppError) {
        self.notice = Some(error.to_notice());
    }

    // ── intake ──────────────────────────────────────────────────────────────

    /// Builds a submission from the intake fields and sends it, at most once.
    /// Empty input is silently skipped; invalid input raises a notice.
    /// `on_send` runs only when a request is actually about to go out.
    pub async fn submit(
        &mut self,
        api: &dyn AnalysisApi,
        file: Option<PdfFile>,
        text: Option<String>,
        on_send: impl FnOnce(&Submission),
    ) -> Result<Submitted, SessionError> {
        match Submission::from_parts(file, text) {
            Ok(Some(submission)) => {
                on_send(&submission);
                self.dispatch(api, &submission).await
            }
            Ok(None) => {
                debug!("Nothing to submit");
                Ok(Submitted::Skipped)
            }
            Err(e) => {
                self.raise(AppError::from(e));
                Ok(Submitted::Skipped)
            }
        }
    }

    pub async fn dispatch(
        &mut self,
        api: &dyn AnalysisApi,
        submission: &Submission,
    ) -> Result<Submitted, SessionError> {
        let ticket = self.begin()?;
        let mut outcome = api.analyze(submission).await;
        if self.options.keep_raw {
            if let Some(text) = submission.text() {
                outcome = outcome.map(|result| result.with_raw_content_if_absent(text));
            }
        }
        self.complete(ticket, outcome);
        Ok(Submitted::Sent)
    }
}
