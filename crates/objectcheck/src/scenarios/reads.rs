//! Single-object and collection reads against seeded data

use serde_json::{Value, json};

use crate::{
    assertions::{expect_attribute, expect_data, expect_identity, expect_status},
    error::{Error, Result},
    fixture::TestContext,
    http::StatusCode,
};

/// The collection is non-empty and every element matches the product schema.
pub async fn list_all_objects(ctx: TestContext) -> Result<()> {
    let objects = ctx.objects().list().await?;
    if objects.is_empty() {
        return Err(Error::field_mismatch("(root)", "a non-empty list", "[]"));
    }
    Ok(())
}

/// Object 1 carries its seeded name and attributes.
pub async fn get_single_object(ctx: TestContext) -> Result<()> {
    let record = ctx.objects().get("1").await?;
    expect_identity(&record, "1", "Google Pixel 6 Pro")?;
    expect_attribute(&record, "color", &json!("Cloudy White"))?;
    expect_attribute(&record, "capacity", &json!("128 GB"))
}

/// Object 2 is returned with `data: null`.
pub async fn get_object_with_null_data(ctx: TestContext) -> Result<()> {
    let record = ctx.objects().get("2").await?;
    expect_identity(&record, "2", "Apple iPhone 12 Mini, 256GB, Blue")?;
    expect_data(&record, None)
}

/// A seeded object is returned under its id with its seeded name.
pub async fn get_known_object(ctx: TestContext, id: &str, name: &str) -> Result<()> {
    let record = ctx.objects().get(id).await?;
    expect_identity(&record, id, name)
}

/// Looking up an id that was never issued answers 404.
pub async fn get_nonexistent_object(ctx: TestContext, id: &str) -> Result<()> {
    let response = ctx.client().get(&ctx.object_path(id)).await?;
    expect_status(&response, StatusCode::NOT_FOUND)
}

/// The body of a list response, required to be a JSON array.
pub(crate) fn expect_array(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(Error::field_mismatch(
            "(root)",
            "an array",
            crate::schema::JsonType::of(&other),
        )),
    }
}
