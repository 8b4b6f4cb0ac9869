//! Objects API endpoint

use crate::{
    client::ApiClient,
    error::{Error, Result},
    http::{Response, StatusCode},
    schema,
    types::{DeleteAck, ObjectPayload, ObjectRecord, PatchPayload},
};
use serde::Deserialize;
use serde_json::Value;

/// Collection path of the objects endpoint.
pub const OBJECTS_PATH: &str = "/objects";

/// Path of a single object.
pub fn object_path(id: &str) -> String {
    format!("{}/{}", OBJECTS_PATH, id)
}

/// Objects API resource.
///
/// Every method checks the status the contract requires, validates the body
/// against [`schema::product_schema`] and only then decodes it. Callers that
/// need the raw exchange (to assert a 404, say) use [`ApiClient`] directly or
/// the `*_raw` helpers.
#[derive(Debug, Clone)]
pub struct Objects {
    client: ApiClient,
}

impl Objects {
    /// Create a new Objects resource.
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List every object.
    pub async fn list(&self) -> Result<Vec<ObjectRecord>> {
        let response = self.client.get(OBJECTS_PATH).await?;
        decode_collection(&response)
    }

    /// List the objects whose ids are in `ids`, sent as a repeated `id`
    /// query parameter.
    pub async fn list_by_ids<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<ObjectRecord>> {
        let response = self.list_by_ids_raw(ids).await?;
        decode_collection(&response)
    }

    /// Send the `id`-filtered collection query and return the raw response.
    pub async fn list_by_ids_raw<S: AsRef<str>>(&self, ids: &[S]) -> Result<Response> {
        let query: Vec<(&str, &str)> = ids.iter().map(|id| ("id", id.as_ref())).collect();
        self.client.get_with_query(OBJECTS_PATH, &query).await
    }

    /// Fetch a single object.
    pub async fn get(&self, id: &str) -> Result<ObjectRecord> {
        let response = self.client.get(&object_path(id)).await?;
        decode_record(&response)
    }

    /// Create an object.
    ///
    /// Fails unless the service answers 200 with a schema-valid record
    /// carrying a non-empty id. When the body carries an id but fails
    /// validation, the error is [`Error::CreatedButRejected`] so the caller
    /// can still delete the object.
    pub async fn create(&self, payload: &ObjectPayload) -> Result<ObjectRecord> {
        let response = self.client.post(OBJECTS_PATH, Some(payload)).await?;
        response.ensure_status(StatusCode::OK)?;
        let value = response.json_value()?;

        let record = record_from_value(&value).map_err(|err| match assigned_id(&value) {
            Some(id) => Error::CreatedButRejected {
                id,
                source: Box::new(err),
            },
            None => err,
        })?;
        if record.id.trim().is_empty() {
            return Err(Error::field_mismatch(
                "/id",
                "a non-empty id",
                format!("{:?}", record.id),
            ));
        }
        Ok(record)
    }

    /// Replace an object (PUT).
    pub async fn replace(&self, id: &str, payload: &ObjectPayload) -> Result<ObjectRecord> {
        let response = self.client.put(&object_path(id), Some(payload)).await?;
        decode_record(&response)
    }

    /// Partially update an object (PATCH).
    pub async fn patch(&self, id: &str, patch: &PatchPayload) -> Result<ObjectRecord> {
        let response = self.client.patch(&object_path(id), Some(patch)).await?;
        decode_record(&response)
    }

    /// Delete an object, requiring a 200 with a confirmation message.
    pub async fn delete(&self, id: &str) -> Result<DeleteAck> {
        let response = self.client.delete(&object_path(id)).await?;
        response.ensure_status(StatusCode::OK)?;
        response.json()
    }

    /// Require that `id` does not resolve: GET must answer 404.
    pub async fn expect_absent(&self, id: &str) -> Result<()> {
        let response = self.client.get(&object_path(id)).await?;
        response.ensure_status(StatusCode::NOT_FOUND)?;
        Ok(())
    }
}

fn assigned_id(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Require 200, validate against the product schema and decode one record.
pub fn decode_record(response: &Response) -> Result<ObjectRecord> {
    response.ensure_status(StatusCode::OK)?;
    let value = response.json_value()?;
    record_from_value(&value)
}

/// Require 200, validate every element and decode a list of records.
pub fn decode_collection(response: &Response) -> Result<Vec<ObjectRecord>> {
    response.ensure_status(StatusCode::OK)?;
    let value = response.json_value()?;
    schema::validate_collection(&value, schema::product_schema())?;
    serde_json::from_value(value).map_err(|e| Error::Decode(e.to_string()))
}

/// Validate an already decoded value and convert it into a record.
pub fn record_from_value(value: &Value) -> Result<ObjectRecord> {
    schema::validate(value, schema::product_schema())?;
    ObjectRecord::deserialize(value).map_err(|e| Error::Decode(e.to_string()))
}
