//! Document tree produced by the read phase

use crate::domain::ObjectKind;

/// A node of a processed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A line of structured text passed through unchanged
    Text(String),
    /// Output of an entity directive
    Description(Description),
    /// Output of an option-table directive
    Table(Table),
}

/// Rendered description of a documentation object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub kind: ObjectKind,
    /// Fragment id; `None` when the object was not registered
    pub anchor: Option<String>,
    pub signature: String,
    /// Owning scope for scoped kinds
    pub scope: Option<String>,
    pub body: Vec<Node>,
}

/// Two-column table with an optional caption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub caption: Option<String>,
    pub headers: [String; 2],
    pub rows: Vec<[String; 2]>,
}
