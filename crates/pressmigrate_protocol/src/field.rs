//! Custom field records.

use crate::lenient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of media an attachment field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// An image; sideloading also records alt text.
    Image,
    /// Any other file.
    File,
}

impl MediaKind {
    /// Returns the field type tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::File => "file",
        }
    }
}

/// How a custom field's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Stored as-is.
    Plain,
    /// A single attachment reference.
    Attachment(MediaKind),
    /// An ordered list of image attachment references.
    AttachmentList,
}

/// The shape in which an attachment field stores its resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    /// The destination attachment id.
    Id,
    /// The destination attachment URL.
    Url,
    /// A structured map describing the attachment.
    Structured,
}

impl ReturnShape {
    /// Parses a declared return format. Unknown formats behave like `id`.
    pub fn from_format(format: &str) -> Self {
        match format {
            "url" => ReturnShape::Url,
            "array" => ReturnShape::Structured,
            _ => ReturnShape::Id,
        }
    }
}

/// One exported custom field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldRecord {
    /// Stable field key; the destination records it as the field reference.
    #[serde(default, deserialize_with = "lenient::text")]
    pub key: String,
    /// Display name.
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Type tag as exported (`image`, `file`, `gallery`, ...).
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub type_tag: String,
    /// Declared return format as exported (`id`, `url`, `array`).
    #[serde(default, deserialize_with = "lenient::text")]
    pub return_format: String,
    /// Raw value; its shape depends on the type tag.
    #[serde(default)]
    pub value: Value,
}

impl FieldRecord {
    /// Creates a field.
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        type_tag: impl Into<String>,
        return_format: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            type_tag: type_tag.into(),
            return_format: return_format.into(),
            value,
        }
    }

    /// Classifies the field by its type tag.
    pub fn kind(&self) -> FieldKind {
        match self.type_tag.as_str() {
            "image" => FieldKind::Attachment(MediaKind::Image),
            "file" => FieldKind::Attachment(MediaKind::File),
            "gallery" => FieldKind::AttachmentList,
            _ => FieldKind::Plain,
        }
    }

    /// Returns the declared return shape.
    pub fn return_shape(&self) -> ReturnShape {
        ReturnShape::from_format(&self.return_format)
    }
}

/// (De)serializes the `{"fields": {...}}` envelope around custom fields.
///
/// Accepts `null`, `[]`, `{}`, `{"fields": []}` and `{"fields": {...}}`.
pub(crate) mod envelope {
    use super::FieldRecord;
    use crate::lenient;
    use serde::de::Error;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        fields: &BTreeMap<String, FieldRecord>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("fields", fields)?;
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, FieldRecord>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let inner = match value {
            Value::Object(mut outer) => outer.remove("fields").unwrap_or(Value::Null),
            Value::Null => Value::Null,
            Value::Array(items) if items.is_empty() => Value::Null,
            other => return Err(D::Error::custom(format!("expected a field envelope, found {other}"))),
        };
        let mut fields: BTreeMap<String, FieldRecord> =
            lenient::map_from_value(inner).map_err(D::Error::custom)?;
        for (name, field) in fields.iter_mut() {
            if field.name.is_empty() {
                field.name = name.clone();
            }
        }
        Ok(fields)
    }
}
