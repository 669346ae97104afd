use owo_colors::AnsiColors;

use crate::models::TagCategory;

/// Colour role of a category, independent of any particular output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accent {
    Primary,
    Secondary,
    Success,
    Info,
    Warning,
}

impl Accent {
    pub fn ansi(self) -> AnsiColors {
        match self {
            Accent::Primary => AnsiColors::Blue,
            Accent::Secondary => AnsiColors::Magenta,
            Accent::Success => AnsiColors::Green,
            Accent::Info => AnsiColors::Cyan,
            Accent::Warning => AnsiColors::Yellow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Lightbulb,
    Work,
    School,
    Library,
    Quote,
}

impl Icon {
    pub fn glyph(self) -> &'static str {
        match self {
            Icon::Lightbulb => "💡",
            Icon::Work => "💼",
            Icon::School => "🎓",
            Icon::Library => "📚",
            Icon::Quote => "❝",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation<'a> {
    pub label: &'a str,
    pub accent: Accent,
    pub icon: Icon,
}

/// Total over every category. Unrecognised values get the primary/work look
/// and are labelled with their raw wire name.
pub fn presentation(category: &TagCategory) -> Presentation<'_> {
    let (label, accent, icon) = match category {
        TagCategory::Skill => ("skills", Accent::Primary, Icon::Lightbulb),
        TagCategory::Position => ("suited roles", Accent::Secondary, Icon::Work),
        TagCategory::Field => ("domain", Accent::Success, Icon::School),
        TagCategory::Interest => ("interests", Accent::Info, Icon::Library),
        TagCategory::Motto => ("persona tag", Accent::Warning, Icon::Quote),
        TagCategory::Other(raw) => (raw.as_str(), Accent::Primary, Icon::Work),
    };
    Presentation {
        label,
        accent,
        icon,
    }
}
