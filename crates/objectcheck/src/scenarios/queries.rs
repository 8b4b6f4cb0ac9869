//! Collection queries filtered by repeated `id` parameters

use serde_json::json;

use super::reads::expect_array;
use crate::{
    assertions::{expect_attribute, expect_eq, expect_same_set, expect_status},
    error::{Error, Result},
    fixture::TestContext,
    http::StatusCode,
    types::ObjectRecord,
};

/// Ids 3, 5 and 10 come back as exactly those objects, in any order, with
/// their seeded attributes.
pub async fn query_reference_ids(ctx: TestContext) -> Result<()> {
    let ids = ["3", "5", "10"];
    let records = ctx.objects().list_by_ids(&ids).await?;
    expect_eq("/length", &ids.len(), &records.len())?;
    expect_same_set("/*/id", ids, records.iter().map(|r| r.id.as_str()))?;

    for record in &records {
        expect_reference_fields(record)?;
    }
    Ok(())
}

fn expect_reference_fields(record: &ObjectRecord) -> Result<()> {
    let (name, attributes) = match record.id.as_str() {
        "3" => (
            "Apple iPhone 12 Pro Max",
            [("color", json!("Cloudy White")), ("capacity GB", json!(512))],
        ),
        "5" => (
            "Samsung Galaxy Z Fold2",
            [("price", json!(689.99)), ("color", json!("Brown"))],
        ),
        "10" => (
            "Apple iPad Mini 5th Gen",
            [("Capacity", json!("64 GB")), ("Screen size", json!(7.9))],
        ),
        other => {
            return Err(Error::field_mismatch("/id", "one of 3, 5, 10", other));
        }
    };

    expect_eq("/name", name, record.name.as_str())?;
    for (key, value) in &attributes {
        expect_attribute(record, key, value)?;
    }
    Ok(())
}

/// A combination of seeded ids returns one record per id, with the expected
/// names in any order.
pub async fn query_combination(ctx: TestContext, ids: &[&str], names: &[&str]) -> Result<()> {
    let records = ctx.objects().list_by_ids(ids).await?;
    expect_eq("/length", &ids.len(), &records.len())?;
    expect_same_set(
        "/*/name",
        names.iter().copied(),
        records.iter().map(|r| r.name.as_str()),
    )
}

/// Unknown ids mixed into the filter are dropped without an error.
pub async fn query_partial_invalid(ctx: TestContext) -> Result<()> {
    let records = ctx
        .objects()
        .list_by_ids(&["3", "999", "10", "invalid_id"])
        .await?;
    expect_same_set("/*/id", ["3", "10"], records.iter().map(|r| r.id.as_str()))
}

/// An empty id filter is answered with 200 and a list. Whether the list is
/// empty or full is up to the service.
pub async fn query_empty_filter(ctx: TestContext) -> Result<()> {
    let response = ctx.objects().list_by_ids_raw(&[""]).await?;
    expect_status(&response, StatusCode::OK)?;
    expect_array(response.json_value()?)?;
    Ok(())
}
