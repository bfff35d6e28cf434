//! List definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a list within one assembly session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(pub u32);

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "list#{}", self.0)
    }
}

/// Kind of label drawn in front of a list element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum ListLevelKind {
    /// No label
    #[default]
    None,
    /// Bullet with the given marker
    Bullet(String),
    /// 1, 2, 3, ...
    Decimal,
    /// a, b, c, ...
    LowerAlpha,
    /// A, B, C, ...
    UpperAlpha,
    /// i, ii, iii, ...
    LowerRoman,
    /// I, II, III, ...
    UpperRoman,
    /// Fixed label text
    Label(String),
}

impl ListLevelKind {
    /// Whether the level numbers its elements.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ListLevelKind::Decimal
                | ListLevelKind::LowerAlpha
                | ListLevelKind::UpperAlpha
                | ListLevelKind::LowerRoman
                | ListLevelKind::UpperRoman
        )
    }

    /// Format an element value with this kind (without prefix/suffix).
    pub fn format_value(&self, value: u32) -> String {
        match self {
            ListLevelKind::None => String::new(),
            ListLevelKind::Bullet(marker) => marker.clone(),
            ListLevelKind::Label(text) => text.clone(),
            ListLevelKind::Decimal => value.to_string(),
            ListLevelKind::LowerAlpha => to_alpha(value).to_lowercase(),
            ListLevelKind::UpperAlpha => to_alpha(value),
            ListLevelKind::LowerRoman => to_roman(value).to_lowercase(),
            ListLevelKind::UpperRoman => to_roman(value),
        }
    }
}

/// Definition of one depth of a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListLevel {
    /// Label kind
    pub kind: ListLevelKind,

    /// Text before the number
    pub prefix: String,

    /// Text after the number
    pub suffix: String,

    /// First value of a numbered level
    pub start_value: u32,

    /// Label position relative to the paragraph's left margin, in points
    pub label_indent: f32,

    /// Minimum width reserved for the label, in points
    pub label_width: f32,

    /// Minimum space between label and text, in points
    pub label_after_space: f32,
}

impl Default for ListLevel {
    fn default() -> Self {
        Self {
            kind: ListLevelKind::None,
            prefix: String::new(),
            suffix: String::new(),
            start_value: 1,
            label_indent: 0.0,
            label_width: 18.0,
            label_after_space: 0.0,
        }
    }
}

impl ListLevel {
    /// A bullet level.
    pub fn bullet(marker: impl Into<String>) -> Self {
        Self {
            kind: ListLevelKind::Bullet(marker.into()),
            ..Default::default()
        }
    }

    /// A numbered level with the given kind, suffixed with ".".
    pub fn numbered(kind: ListLevelKind) -> Self {
        Self {
            kind,
            suffix: ".".to_string(),
            ..Default::default()
        }
    }

    /// Set the start value and return self.
    pub fn starting_at(mut self, value: u32) -> Self {
        self.start_value = value;
        self
    }

    /// Whether elements at this level are numbered.
    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }

    /// Full label text for an element value.
    pub fn label(&self, value: u32) -> String {
        format!("{}{}{}", self.prefix, self.kind.format_value(value), self.suffix)
    }
}

/// A list: identity plus level definitions by depth.
///
/// The numbering cursor is not stored here; it lives in the arena's side
/// table so that a `List` stays a plain value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    /// Identity
    pub id: ListId,

    /// List whose numbering this one continues
    pub previous: Option<ListId>,

    /// Levels, index 0 = depth 1
    pub levels: Vec<ListLevel>,
}

impl List {
    /// Level definition for a 1-indexed depth.
    pub fn level(&self, depth: u8) -> Option<&ListLevel> {
        if depth == 0 {
            return None;
        }
        self.levels.get(depth as usize - 1)
    }

    /// Whether the given depth is numbered. Undefined depths are bullets.
    pub fn is_numeric(&self, depth: u8) -> bool {
        self.level(depth).map(|l| l.is_numeric()).unwrap_or(false)
    }

    /// Number of defined levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }
}

/// Payload sent to the sink when a list level is defined or opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListLevelProperties {
    /// List identity
    pub list_id: ListId,

    /// 1-indexed depth
    pub depth: u8,

    /// Level definition
    pub level: ListLevel,

    /// Resolved first value (continuation applied)
    pub start_value: u32,
}

fn to_alpha(mut value: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        value -= 1;
        out.push(b'A' + (value % 26) as u8);
        value /= 26;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Convert number to Roman numerals.
fn to_roman(mut num: u32) -> String {
    if num == 0 || num >= 4000 {
        return num.to_string();
    }
    let numerals = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut result = String::new();
    for (value, symbol) in numerals {
        while num >= value {
            result.push_str(symbol);
            num -= value;
        }
    }
    result
}
