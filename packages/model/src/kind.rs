use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text alignment for paragraphs and headings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
    Justify,
}

/// Uploaded file metadata carried by a `file-attachment` element.
///
/// The upload itself happens in the host; only the resolved result is
/// inserted into the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Database record embedded by a `database-record` element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub title: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Element kind plus its kind-specific fields.
///
/// Serialized as the `type` tag of an element object, with the fields
/// alongside `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ElementKind {
    Paragraph {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
    },
    Heading {
        level: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
    },
    BulletedList,
    NumberedList,
    ListItem,
    Table {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cols: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rows: Option<u32>,
    },
    TableRow,
    #[serde(rename_all = "camelCase")]
    TableCell {
        #[serde(default, skip_serializing_if = "is_false")]
        header: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        col_span: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        row_span: Option<u32>,
    },
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
    },
    FileAttachment {
        file: FileInfo,
    },
    Link {
        url: String,
    },
    DatabaseRecord {
        record: RecordInfo,
    },
}

impl ElementKind {
    pub fn paragraph() -> Self {
        ElementKind::Paragraph { align: None }
    }

    pub fn heading(level: u8) -> Self {
        ElementKind::Heading {
            level: level.clamp(1, 6),
            align: None,
        }
    }

    pub fn table_cell(header: bool) -> Self {
        ElementKind::TableCell {
            header,
            col_span: None,
            row_span: None,
        }
    }

    /// Wire name of the kind (the `type` tag)
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Paragraph { .. } => "paragraph",
            ElementKind::Heading { .. } => "heading",
            ElementKind::BulletedList => "bulleted-list",
            ElementKind::NumberedList => "numbered-list",
            ElementKind::ListItem => "list-item",
            ElementKind::Table { .. } => "table",
            ElementKind::TableRow => "table-row",
            ElementKind::TableCell { .. } => "table-cell",
            ElementKind::Image { .. } => "image",
            ElementKind::FileAttachment { .. } => "file-attachment",
            ElementKind::Link { .. } => "link",
            ElementKind::DatabaseRecord { .. } => "database-record",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ElementKind::BulletedList | ElementKind::NumberedList)
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self, ElementKind::ListItem)
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self, ElementKind::Paragraph { .. })
    }

    pub fn is_table(&self) -> bool {
        matches!(self, ElementKind::Table { .. })
    }

    pub fn is_table_row(&self) -> bool {
        matches!(self, ElementKind::TableRow)
    }

    pub fn is_table_cell(&self) -> bool {
        matches!(self, ElementKind::TableCell { .. })
    }

    /// `table`, `table-row` or `table-cell`
    pub fn is_table_part(&self) -> bool {
        self.is_table() || self.is_table_row() || self.is_table_cell()
    }

    pub fn is_link(&self) -> bool {
        matches!(self, ElementKind::Link { .. })
    }

    /// Kinds that may never sit directly inside a paragraph
    pub fn is_embedded_block(&self) -> bool {
        matches!(
            self,
            ElementKind::Table { .. }
                | ElementKind::Image { .. }
                | ElementKind::FileAttachment { .. }
                | ElementKind::DatabaseRecord { .. }
        )
    }

    /// Kinds that hold no editable content, only a single empty text leaf
    pub fn is_void_block(&self) -> bool {
        matches!(
            self,
            ElementKind::Image { .. } | ElementKind::FileAttachment { .. } | ElementKind::DatabaseRecord { .. }
        )
    }

    /// Kinds whose text can be aligned
    pub fn align_mut(&mut self) -> Option<&mut Option<Align>> {
        match self {
            ElementKind::Paragraph { align } | ElementKind::Heading { align, .. } => Some(align),
            _ => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Heading { level, .. } => write!(f, "heading-{}", level),
            other => f.write_str(other.name()),
        }
    }
}

/// Block format requested by a toolbar toggle (`"heading-2"`,
/// `"bulleted-list"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BlockFormat {
    Paragraph,
    Heading(u8),
    BulletedList,
    NumberedList,
    ListItem,
    Table,
    TableRow,
    TableCell,
    Image,
    FileAttachment,
    Link,
    DatabaseRecord,
}

impl BlockFormat {
    /// Parse a toolbar format name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        let format = match name {
            "paragraph" => BlockFormat::Paragraph,
            "bulleted-list" => BlockFormat::BulletedList,
            "numbered-list" => BlockFormat::NumberedList,
            "list-item" => BlockFormat::ListItem,
            "table" => BlockFormat::Table,
            "table-row" => BlockFormat::TableRow,
            "table-cell" => BlockFormat::TableCell,
            "image" => BlockFormat::Image,
            "file-attachment" => BlockFormat::FileAttachment,
            "link" => BlockFormat::Link,
            "database-record" => BlockFormat::DatabaseRecord,
            other => {
                let level = other.strip_prefix("heading-")?.parse::<u8>().ok()?;
                if !(1..=6).contains(&level) {
                    return None;
                }
                BlockFormat::Heading(level)
            }
        };
        Some(format)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, BlockFormat::BulletedList | BlockFormat::NumberedList)
    }

    /// Whether `kind` is an instance of this format
    pub fn matches(&self, kind: &ElementKind) -> bool {
        match (self, kind) {
            (BlockFormat::Paragraph, ElementKind::Paragraph { .. }) => true,
            (BlockFormat::Heading(n), ElementKind::Heading { level, .. }) => n == level,
            (BlockFormat::BulletedList, ElementKind::BulletedList) => true,
            (BlockFormat::NumberedList, ElementKind::NumberedList) => true,
            (BlockFormat::ListItem, ElementKind::ListItem) => true,
            (BlockFormat::Table, ElementKind::Table { .. }) => true,
            (BlockFormat::TableRow, ElementKind::TableRow) => true,
            (BlockFormat::TableCell, ElementKind::TableCell { .. }) => true,
            (BlockFormat::Image, ElementKind::Image { .. }) => true,
            (BlockFormat::FileAttachment, ElementKind::FileAttachment { .. }) => true,
            (BlockFormat::Link, ElementKind::Link { .. }) => true,
            (BlockFormat::DatabaseRecord, ElementKind::DatabaseRecord { .. }) => true,
            _ => false,
        }
    }

    /// Element kind a block is retyped to, for the formats that are plain
    /// retype targets. Structural, void and inline formats return `None`.
    pub fn retype_kind(&self) -> Option<ElementKind> {
        match self {
            BlockFormat::Paragraph => Some(ElementKind::paragraph()),
            BlockFormat::Heading(level) => Some(ElementKind::heading(*level)),
            BlockFormat::BulletedList => Some(ElementKind::BulletedList),
            BlockFormat::NumberedList => Some(ElementKind::NumberedList),
            _ => None,
        }
    }
}

impl fmt::Display for BlockFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockFormat::Paragraph => "paragraph",
            BlockFormat::Heading(level) => return write!(f, "heading-{}", level),
            BlockFormat::BulletedList => "bulleted-list",
            BlockFormat::NumberedList => "numbered-list",
            BlockFormat::ListItem => "list-item",
            BlockFormat::Table => "table",
            BlockFormat::TableRow => "table-row",
            BlockFormat::TableCell => "table-cell",
            BlockFormat::Image => "image",
            BlockFormat::FileAttachment => "file-attachment",
            BlockFormat::Link => "link",
            BlockFormat::DatabaseRecord => "database-record",
        };
        f.write_str(name)
    }
}

impl TryFrom<String> for BlockFormat {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BlockFormat::parse(&value).ok_or_else(|| format!("Unknown block format: {}", value))
    }
}

impl From<BlockFormat> for String {
    fn from(format: BlockFormat) -> Self {
        format.to_string()
    }
}
