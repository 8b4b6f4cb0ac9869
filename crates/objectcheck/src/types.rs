//! Object records and request payloads

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute map of an object's `data` field.
pub type Attributes = Map<String, Value>;

/// An object record as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Identifier assigned by the service
    pub id: String,

    /// Display name
    pub name: String,

    /// Open-ended attributes; `None` when the service returns `null`
    pub data: Option<Attributes>,

    /// Creation timestamp, returned by create calls
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Update timestamp, returned by update calls
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ObjectRecord {
    /// Look up a data attribute.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| data.get(key))
    }
}

/// Body of a create (POST) or full replace (PUT) request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectPayload {
    /// Display name
    pub name: String,

    /// Attributes; serialized as `null` when `None`
    pub data: Option<Attributes>,
}

impl ObjectPayload {
    /// A payload with `name` and no attributes yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: None,
        }
    }

    /// Set one attribute, creating the attribute map if needed.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Rename.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Body of a partial update (PATCH) request. Absent fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchPayload {
    /// New display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Attributes to set; keys not listed keep their current values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Attributes>,
}

impl PatchPayload {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the new name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set one attribute.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// The record expected after applying this patch to `prior`.
    ///
    /// `name` replaces the prior name; `data` keys are merged into the prior
    /// attributes one by one, and every other field is carried over.
    pub fn apply_to(&self, prior: &ObjectRecord) -> ObjectRecord {
        let mut next = prior.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(patch) = &self.data {
            let data = next.data.get_or_insert_with(Map::new);
            for (key, value) in patch {
                data.insert(key.clone(), value.clone());
            }
        }
        next
    }
}

/// Acknowledgement returned by a successful DELETE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteAck {
    /// Human-readable confirmation
    pub message: String,
}
