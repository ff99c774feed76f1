//! User-supplied column declarations.

use super::value_enum::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::rc::Rc;

/// What the grid is being used as. Affects search/form field filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableType {
    /// Data table with a search form.
    #[default]
    Table,
    /// Stand-alone form built from the columns.
    Form,
    /// List rendering.
    List,
}

/// Pinned side of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fixed {
    /// Pinned to the left edge.
    Left,
    /// Pinned to the right edge.
    Right,
}

/// Where a computed title is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleContext {
    /// Table header.
    Table,
    /// Search or form field label.
    Form,
    /// Column settings panel.
    Setting,
}

// ===== ValueType =====

/// Value-type tag that selects how a cell or field is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub enum ValueType {
    #[default]
    Text,
    Index,
    IndexBorder,
    Money,
    Percent,
    Progress,
    Digit,
    Select,
    Checkbox,
    Radio,
    RadioButton,
    Switch,
    Date,
    DateTime,
    DateRange,
    DateTimeRange,
    Time,
    Textarea,
    Avatar,
    Image,
    Code,
    UploadFile,
    Option,
    Hidden,
    /// Tag this crate does not know about, kept verbatim for renderers.
    Other(String),
}

impl ValueType {
    /// Parse a tag such as `"dateTime"`.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "text" => ValueType::Text,
            "index" => ValueType::Index,
            "indexBorder" => ValueType::IndexBorder,
            "money" => ValueType::Money,
            "percent" => ValueType::Percent,
            "progress" => ValueType::Progress,
            "digit" => ValueType::Digit,
            "select" => ValueType::Select,
            "checkbox" => ValueType::Checkbox,
            "radio" => ValueType::Radio,
            "radioButton" => ValueType::RadioButton,
            "switch" => ValueType::Switch,
            "date" => ValueType::Date,
            "dateTime" => ValueType::DateTime,
            "dateRange" => ValueType::DateRange,
            "dateTimeRange" => ValueType::DateTimeRange,
            "time" => ValueType::Time,
            "textarea" => ValueType::Textarea,
            "avatar" => ValueType::Avatar,
            "image" => ValueType::Image,
            "code" => ValueType::Code,
            "uploadFile" => ValueType::UploadFile,
            "option" => ValueType::Option,
            "hidden" => ValueType::Hidden,
            other => ValueType::Other(other.to_owned()),
        }
    }

    /// Tag string.
    pub fn as_str(&self) -> &str {
        match self {
            ValueType::Text => "text",
            ValueType::Index => "index",
            ValueType::IndexBorder => "indexBorder",
            ValueType::Money => "money",
            ValueType::Percent => "percent",
            ValueType::Progress => "progress",
            ValueType::Digit => "digit",
            ValueType::Select => "select",
            ValueType::Checkbox => "checkbox",
            ValueType::Radio => "radio",
            ValueType::RadioButton => "radioButton",
            ValueType::Switch => "switch",
            ValueType::Date => "date",
            ValueType::DateTime => "dateTime",
            ValueType::DateRange => "dateRange",
            ValueType::DateTimeRange => "dateTimeRange",
            ValueType::Time => "time",
            ValueType::Textarea => "textarea",
            ValueType::Avatar => "avatar",
            ValueType::Image => "image",
            ValueType::Code => "code",
            ValueType::UploadFile => "uploadFile",
            ValueType::Option => "option",
            ValueType::Hidden => "hidden",
            ValueType::Other(tag) => tag,
        }
    }

    /// Row-number columns, never shown as search fields.
    pub fn is_index(&self) -> bool {
        matches!(self, ValueType::Index | ValueType::IndexBorder)
    }
}

impl From<&str> for ValueType {
    fn from(tag: &str) -> Self {
        ValueType::parse(tag)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row-dependent value-type function.
pub type ValueTypeFn = Rc<dyn Fn(&Value) -> ValueType>;

/// A value type, fixed or computed from the row.
///
/// Computed variants compare by pointer.
#[derive(Clone)]
pub enum ValueTypeSpec {
    /// Same type for every row.
    Tag(ValueType),
    /// Type chosen per row.
    Computed(ValueTypeFn),
}

impl ValueTypeSpec {
    /// Value type for `row`.
    pub fn resolve(&self, row: &Value) -> ValueType {
        match self {
            ValueTypeSpec::Tag(tag) => tag.clone(),
            ValueTypeSpec::Computed(compute) => compute(row),
        }
    }

    /// Value type outside of any row (search form fields).
    pub fn resolve_static(&self) -> ValueType {
        self.resolve(&Value::Object(Map::new()))
    }
}

impl Default for ValueTypeSpec {
    fn default() -> Self {
        ValueTypeSpec::Tag(ValueType::Text)
    }
}

impl PartialEq for ValueTypeSpec {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueTypeSpec::Tag(a), ValueTypeSpec::Tag(b)) => a == b,
            (ValueTypeSpec::Computed(a), ValueTypeSpec::Computed(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for ValueTypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueTypeSpec::Tag(tag) => f.debug_tuple("Tag").field(tag).finish(),
            ValueTypeSpec::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<ValueType> for ValueTypeSpec {
    fn from(tag: ValueType) -> Self {
        ValueTypeSpec::Tag(tag)
    }
}

// ===== ColumnTitle =====

/// Title computed from the declaration and the rendering context.
pub type TitleFn = Rc<dyn Fn(&ColumnDeclaration, TitleContext) -> String>;

/// A column title, literal or computed at render time.
#[derive(Clone)]
pub enum ColumnTitle {
    /// Fixed text.
    Literal(String),
    /// Computed when rendered.
    Computed(TitleFn),
}

impl ColumnTitle {
    /// Title text for `column` in `context`.
    pub fn resolve(&self, column: &ColumnDeclaration, context: TitleContext) -> String {
        match self {
            ColumnTitle::Literal(text) => text.clone(),
            ColumnTitle::Computed(compute) => compute(column, context),
        }
    }
}

impl PartialEq for ColumnTitle {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ColumnTitle::Literal(a), ColumnTitle::Literal(b)) => a == b,
            (ColumnTitle::Computed(a), ColumnTitle::Computed(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for ColumnTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnTitle::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            ColumnTitle::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for ColumnTitle {
    fn from(text: &str) -> Self {
        ColumnTitle::Literal(text.to_owned())
    }
}

// ===== Filters =====

/// One header filter choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    /// Label shown to the user.
    pub text: String,
    /// Value sent to the request function.
    pub value: String,
}

/// Header filter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterSpec {
    /// No header filter.
    #[default]
    None,
    /// Derive choices from the value enum.
    Auto,
    /// Explicit choices.
    Options(Vec<FilterOption>),
}

// ===== ColumnDeclaration =====

/// Declaration of one grid column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnDeclaration {
    /// Explicit identity key.
    pub key: Option<String>,
    /// Path of the cell value inside a row.
    pub data_index: Option<String>,
    /// Header / label text.
    pub title: Option<ColumnTitle>,
    /// Higher orders come first in the search form.
    pub order: Option<i64>,
    /// Render type; text when unset.
    pub value_type: Option<ValueTypeSpec>,
    /// Enumerated display values.
    pub value_enum: Option<ValueEnum>,
    /// Header filter choices.
    pub filters: FilterSpec,
    /// Pinned side.
    pub fixed: Option<Fixed>,
    /// Width in pixels.
    pub width: Option<u32>,
    /// Truncate long cell text.
    pub ellipsis: bool,
    /// Show a copy affordance.
    pub copyable: bool,
    /// Left out of the table body.
    pub hide_in_table: bool,
    /// Left out of the search form.
    pub hide_in_search: bool,
    /// Left out of form mode.
    pub hide_in_form: bool,
    /// Free-form props for the field renderer.
    pub field_props: Map<String, Value>,
    /// Nested columns (grouped headers).
    pub children: Vec<ColumnDeclaration>,
}

impl ColumnDeclaration {
    /// Column reading `data_index` from each row.
    pub fn new(data_index: impl Into<String>) -> Self {
        Self {
            data_index: Some(data_index.into()),
            ..Self::default()
        }
    }

    /// Column with no data index (action or group columns).
    pub fn keyed(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Set the explicit key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set a literal or computed title.
    pub fn with_title(mut self, title: impl Into<ColumnTitle>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the search-form ordering weight.
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    /// Set a fixed value type.
    pub fn with_value_type(mut self, value_type: impl Into<ValueType>) -> Self {
        self.value_type = Some(ValueTypeSpec::Tag(value_type.into()));
        self
    }

    /// Set a row-dependent value type.
    pub fn with_value_type_fn(mut self, compute: impl Fn(&Value) -> ValueType + 'static) -> Self {
        self.value_type = Some(ValueTypeSpec::Computed(Rc::new(compute)));
        self
    }

    /// Set the value enum.
    pub fn with_value_enum(mut self, value_enum: ValueEnum) -> Self {
        self.value_enum = Some(value_enum);
        self
    }

    /// Set header filters.
    pub fn with_filters(mut self, filters: FilterSpec) -> Self {
        self.filters = filters;
        self
    }

    /// Pin the column.
    pub fn with_fixed(mut self, fixed: Fixed) -> Self {
        self.fixed = Some(fixed);
        self
    }

    /// Set the width in pixels.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Hide from the table body.
    pub fn hidden_in_table(mut self) -> Self {
        self.hide_in_table = true;
        self
    }

    /// Hide from the search form.
    pub fn hidden_in_search(mut self) -> Self {
        self.hide_in_search = true;
        self
    }

    /// Hide from form mode.
    pub fn hidden_in_form(mut self) -> Self {
        self.hide_in_form = true;
        self
    }

    /// Add a field renderer prop.
    pub fn with_field_prop(mut self, name: impl Into<String>, value: Value) -> Self {
        self.field_props.insert(name.into(), value);
        self
    }

    /// Set nested columns.
    pub fn with_children(mut self, children: Vec<ColumnDeclaration>) -> Self {
        self.children = children;
        self
    }

    /// `key`, else `data_index`, when either is non-empty.
    pub fn identity(&self) -> Option<&str> {
        self.key
            .as_deref()
            .filter(|k| !k.is_empty())
            .or_else(|| self.data_index.as_deref().filter(|d| !d.is_empty()))
    }

    /// Value type without a row, defaulting to text.
    pub fn static_value_type(&self) -> ValueType {
        self.value_type
            .as_ref()
            .map(ValueTypeSpec::resolve_static)
            .unwrap_or_default()
    }

    /// Title text for `context`, empty when untitled.
    pub fn title_text(&self, context: TitleContext) -> String {
        self.title
            .as_ref()
            .map(|title| title.resolve(self, context))
            .unwrap_or_default()
    }
}
