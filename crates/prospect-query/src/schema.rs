//! Declared field shape of a record type.
//!
//! Rules are checked against a [`Schema`] once, when a query is validated, so
//! the per-record evaluation never has to deal with unknown fields.

/// The kind of a queryable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Integer or floating point number.
    Number,
    /// Point in time.
    Timestamp,
    /// Enum with string labels.
    Enum,
    /// Boolean flag.
    Bool,
    /// Array of strings.
    List,
}

impl FieldKind {
    /// Returns the display name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Enum => "enum",
            FieldKind::Bool => "bool",
            FieldKind::List => "list",
        }
    }

    /// Text-like kinds accept `contains` and take part in free-text search.
    pub fn is_textual(self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Enum | FieldKind::List)
    }

    /// Numeric kinds accept `range` and can be summed.
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Number | FieldKind::Timestamp)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

/// Ordered list of the fields a record type exposes to queries.
///
/// ```
/// use prospect_query::{FieldKind, Schema};
///
/// let account = Schema::new().field("name", FieldKind::Text);
/// let schema = Schema::new()
///     .field("id", FieldKind::Number)
///     .field("title", FieldKind::Text)
///     .nest("account", account);
///
/// assert_eq!(schema.kind_of("account.name"), Some(FieldKind::Text));
/// assert_eq!(schema.kind_of("account"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    /// Adds a field.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            kind,
        });
        self
    }

    /// Adds every field of a nested record under `prefix.`.
    pub fn nest(mut self, prefix: &str, nested: Schema) -> Self {
        self.fields
            .extend(nested.fields.into_iter().map(|def| FieldDef {
                name: format!("{}.{}", prefix, def.name),
                kind: def.kind,
            }));
        self
    }

    /// Looks up the kind of a field by exact name.
    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.fields
            .iter()
            .find(|def| def.name == name)
            .map(|def| def.kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
