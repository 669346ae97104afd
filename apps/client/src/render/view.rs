//! Terminal profile view.
//!
//! A view is either the full profile or the incomplete-result panel. Nothing
//! in between is ever rendered: if either half of the analysis is missing the
//! user sees the panel and its single reset action.

use std::fmt::Write as _;

use owo_colors::OwoColorize;

use crate::models::{AnalysisResult, PersonalInfo, RawAnalysis, Tag};
use crate::render::{group_tags, presentation, Bucket};

pub const INCOMPLETE_MESSAGE: &str = "Analysis result is incomplete, please try again";
pub const RESET_LABEL: &str = "Analyze a new resume";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    Reset,
}

impl RecoveryAction {
    pub fn label(self) -> &'static str {
        match self {
            RecoveryAction::Reset => RESET_LABEL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Email,
    Phone,
    Location,
}

impl ContactKind {
    fn label(self) -> &'static str {
        match self {
            ContactKind::Email => "Email",
            ContactKind::Phone => "Phone",
            ContactKind::Location => "Location",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile<'a> {
    pub initial: char,
    pub name: &'a str,
    pub contacts: Vec<(ContactKind, &'a str)>,
    pub buckets: Vec<Bucket<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileView<'a> {
    Profile(Profile<'a>),
    Incomplete { action: RecoveryAction },
}

impl<'a> ProfileView<'a> {
    /// Builds the view straight from the wire form.
    pub fn build(raw: &'a RawAnalysis) -> Self {
        match (&raw.personal_info, &raw.tags) {
            (Some(info), Some(tags)) => ProfileView::Profile(Profile::new(info, tags)),
            _ => ProfileView::Incomplete {
                action: RecoveryAction::Reset,
            },
        }
    }

    pub fn from_result(result: &'a AnalysisResult) -> Self {
        ProfileView::Profile(Profile::new(result.personal_info(), result.tags()))
    }

    pub fn action(&self) -> RecoveryAction {
        match self {
            ProfileView::Profile(_) => RecoveryAction::Reset,
            ProfileView::Incomplete { action } => *action,
        }
    }
}

impl<'a> Profile<'a> {
    fn new(info: &'a PersonalInfo, tags: &'a [Tag]) -> Self {
        let contacts = [
            (ContactKind::Email, info.email.as_deref()),
            (ContactKind::Phone, info.phone.as_deref()),
            (ContactKind::Location, info.location.as_deref()),
        ]
        .into_iter()
        .filter_map(|(kind, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (kind, v))
        })
        .collect();

        Profile {
            initial: info
                .name()
                .and_then(|n| n.chars().next())
                .map(|c| c.to_uppercase().next().unwrap_or(c))
                .unwrap_or('?'),
            name: info.display_name(),
            contacts,
            buckets: group_tags(tags),
        }
    }
}

/// Renders the view as terminal text. `color` enables ANSI accents.
pub fn render_text(view: &ProfileView<'_>, color: bool) -> String {
    let mut out = String::new();
    match view {
        ProfileView::Incomplete { action } => {
            let message = if color {
                INCOMPLETE_MESSAGE.red().bold().to_string()
            } else {
                INCOMPLETE_MESSAGE.to_string()
            };
            let _ = writeln!(out, "{message}");
            let _ = writeln!(out, "↻ {}", action.label());
        }
        ProfileView::Profile(profile) => {
            let name = if color {
                profile.name.bold().to_string()
            } else {
                profile.name.to_string()
            };
            let _ = writeln!(out, "[{}] {}", profile.initial, name);
            if !profile.contacts.is_empty() {
                let contacts: Vec<String> = profile
                    .contacts
                    .iter()
                    .map(|(kind, value)| format!("{}: {}", kind.label(), value))
                    .collect();
                let _ = writeln!(out, "    {}", contacts.join("  ·  "));
            }

            for bucket in &profile.buckets {
                let p = presentation(&bucket.category);
                let heading = format!("{} {}", p.icon.glyph(), p.label);
                let heading = if color {
                    heading.color(p.accent.ansi()).bold().to_string()
                } else {
                    heading
                };
                let chips: Vec<String> = bucket
                    .tags
                    .iter()
                    .map(|t| {
                        let chip = format!("[{}]", t.name);
                        if color {
                            chip.color(p.accent.ansi()).to_string()
                        } else {
                            chip
                        }
                    })
                    .collect();
                let _ = writeln!(out);
                let _ = writeln!(out, "{heading}");
                let _ = writeln!(out, "  {}", chips.join(" "));
            }

            let _ = writeln!(out);
            let _ = writeln!(out, "↻ {}", view.action().label());
        }
    }
    out
}
