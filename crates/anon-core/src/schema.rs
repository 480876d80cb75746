//! Form schema definitions.
//!
//! A callout carries a form schema describing the shape of the `answers`
//! payload of its responses. The schema is split into slides; each slide
//! holds components, and layout components (panels, columns, content blocks)
//! nest further components.
//!
//! ## Example
//!
//! ```json
//! {
//!   "slides": [
//!     {
//!       "id": "slide1",
//!       "components": [
//!         { "key": "name", "type": "textfield", "input": true },
//!         { "key": "colour", "type": "radio", "input": true,
//!           "values": [{ "label": "Red", "value": "red" }] }
//!       ]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Error type for schema operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Component type tag outside the supported set
    #[error("unknown field type '{0}'")]
    UnknownFieldType(String),

    /// Schema document could not be parsed
    #[error("failed to parse form schema: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Closed set of input component types that can appear in a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    TextField,
    TextArea,
    Email,
    Number,
    Currency,
    PhoneNumber,
    Select,
    Radio,
    SelectBoxes,
    Checkbox,
    Address,
    File,
    Signature,
    Url,
    DateTime,
    Day,
    Time,
}

impl FieldType {
    /// Every supported field type.
    pub const ALL: [FieldType; 17] = [
        FieldType::TextField,
        FieldType::TextArea,
        FieldType::Email,
        FieldType::Number,
        FieldType::Currency,
        FieldType::PhoneNumber,
        FieldType::Select,
        FieldType::Radio,
        FieldType::SelectBoxes,
        FieldType::Checkbox,
        FieldType::Address,
        FieldType::File,
        FieldType::Signature,
        FieldType::Url,
        FieldType::DateTime,
        FieldType::Day,
        FieldType::Time,
    ];

    /// The type tag as it appears in form schemas.
    pub fn tag(&self) -> &'static str {
        match self {
            FieldType::TextField => "textfield",
            FieldType::TextArea => "textarea",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Currency => "currency",
            FieldType::PhoneNumber => "phoneNumber",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::SelectBoxes => "selectboxes",
            FieldType::Checkbox => "checkbox",
            FieldType::Address => "address",
            FieldType::File => "file",
            FieldType::Signature => "signature",
            FieldType::Url => "url",
            FieldType::DateTime => "datetime",
            FieldType::Day => "day",
            FieldType::Time => "time",
        }
    }

    /// Whether answers must be drawn from declared option values.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::Radio | FieldType::SelectBoxes
        )
    }
}

impl FromStr for FieldType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .iter()
            .copied()
            .find(|t| t.tag() == s)
            .ok_or_else(|| SchemaError::UnknownFieldType(s.to_string()))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One declared option of a choice component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Stored answer value
    pub value: Value,

    /// Display label
    #[serde(default)]
    pub label: String,
}

/// Option source of `select` components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectData {
    #[serde(default)]
    pub values: Vec<ChoiceOption>,
}

/// One component of a form slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormComponent {
    /// Answer key
    #[serde(default)]
    pub key: String,

    /// Component type tag
    #[serde(rename = "type")]
    pub component_type: String,

    /// Whether the component collects an answer
    #[serde(default = "default_input")]
    pub input: bool,

    /// Options of `radio` / `selectboxes` components
    #[serde(default)]
    pub values: Vec<ChoiceOption>,

    /// Options of `select` components
    #[serde(default)]
    pub data: Option<SelectData>,

    /// Child components of layout components
    #[serde(default)]
    pub components: Vec<FormComponent>,
}

fn default_input() -> bool {
    true
}

impl FormComponent {
    /// Declared option values, from whichever place the component keeps them.
    pub fn option_values(&self) -> Vec<Value> {
        let data_values = self.data.iter().flat_map(|data| data.values.iter());
        self.values
            .iter()
            .chain(data_values)
            .map(|option| option.value.clone())
            .collect()
    }

    fn collect_fields(&self, out: &mut Vec<SchemaField>) {
        if self.input {
            out.push(SchemaField {
                key: self.key.clone(),
                field_type: self.component_type.clone(),
                options: self.option_values(),
            });
        }

        for child in &self.components {
            child.collect_fields(out);
        }
    }
}

/// One slide of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSlide {
    /// Slide identifier; answers are grouped under it
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub components: Vec<FormComponent>,
}

impl FormSlide {
    /// Input fields of this slide, depth-first in declaration order.
    pub fn fields(&self) -> Vec<SchemaField> {
        let mut out = Vec::new();
        for component in &self.components {
            component.collect_fields(&mut out);
        }
        out
    }
}

/// Form definition carried by a schema-bearing record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    #[serde(default)]
    pub slides: Vec<FormSlide>,
}

impl FormSchema {
    /// Parse a schema from a record field value.
    ///
    /// A missing or null value is an empty schema.
    pub fn from_value(value: Option<&Value>) -> Result<Self, SchemaError> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => Ok(serde_json::from_value(value.clone())?),
        }
    }
}

/// One typed field of a free-form payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    /// Answer key
    pub key: String,

    /// Raw type tag
    pub field_type: String,

    /// Declared option values (choice fields only)
    pub options: Vec<Value>,
}

impl SchemaField {
    /// Create a field without options.
    pub fn new(key: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            field_type: field_type.into(),
            options: Vec::new(),
        }
    }

    /// Builder: declared option values.
    pub fn with_options(mut self, options: Vec<Value>) -> Self {
        self.options = options;
        self
    }

    /// Parse the type tag.
    pub fn parsed_type(&self) -> Result<FieldType, SchemaError> {
        self.field_type.parse()
    }
}
