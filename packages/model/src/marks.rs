use serde::{Deserialize, Serialize};
use std::fmt;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Formatting carried by a text leaf.
///
/// Flattened into the leaf object on the wire: `{"text": "a", "bold": true}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
}

/// A single mark, as toggled from the toolbar
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mark", content = "value", rename_all = "camelCase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Code,
    Color(String),
    BackgroundColor(String),
    FontSize(String),
}

impl Marks {
    pub fn is_empty(&self) -> bool {
        *self == Marks::default()
    }

    /// Whether the leaf carries `mark`; valued marks must match exactly
    pub fn has(&self, mark: &Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Code => self.code,
            Mark::Color(value) => self.color.as_deref() == Some(value.as_str()),
            Mark::BackgroundColor(value) => {
                self.background_color.as_deref() == Some(value.as_str())
            }
            Mark::FontSize(value) => self.font_size.as_deref() == Some(value.as_str()),
        }
    }

    pub fn add(&mut self, mark: &Mark) {
        match mark {
            Mark::Bold => self.bold = true,
            Mark::Italic => self.italic = true,
            Mark::Underline => self.underline = true,
            Mark::Code => self.code = true,
            Mark::Color(value) => self.color = Some(value.clone()),
            Mark::BackgroundColor(value) => self.background_color = Some(value.clone()),
            Mark::FontSize(value) => self.font_size = Some(value.clone()),
        }
    }

    pub fn remove(&mut self, mark: &Mark) {
        match mark {
            Mark::Bold => self.bold = false,
            Mark::Italic => self.italic = false,
            Mark::Underline => self.underline = false,
            Mark::Code => self.code = false,
            Mark::Color(_) => self.color = None,
            Mark::BackgroundColor(_) => self.background_color = None,
            Mark::FontSize(_) => self.font_size = None,
        }
    }

    pub fn with(mut self, mark: &Mark) -> Self {
        self.add(mark);
        self
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::Bold => f.write_str("bold"),
            Mark::Italic => f.write_str("italic"),
            Mark::Underline => f.write_str("underline"),
            Mark::Code => f.write_str("code"),
            Mark::Color(value) => write!(f, "color={}", value),
            Mark::BackgroundColor(value) => write!(f, "backgroundColor={}", value),
            Mark::FontSize(value) => write!(f, "fontSize={}", value),
        }
    }
}
