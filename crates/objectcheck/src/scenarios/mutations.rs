//! Create, replace, patch and delete against fixture-owned objects

use crate::{
    assertions::{expect_data, expect_eq, expect_key, expect_status},
    data,
    error::Result,
    fixture::{TestContext, with_created_object},
    http::StatusCode,
};

/// The created record echoes the payload and can be read back.
pub async fn create_object(ctx: TestContext) -> Result<()> {
    let ctx = &ctx;
    let payload = &data::macbook_2019();
    with_created_object(ctx, payload, |created| async move {
        expect_eq("/name", payload.name.as_str(), created.name.as_str())?;
        expect_data(&created, payload.data.as_ref())?;

        let fetched = ctx.objects().get(&created.id).await?;
        expect_eq("/id", created.id.as_str(), fetched.id.as_str())?;
        expect_eq("/name", created.name.as_str(), fetched.name.as_str())?;
        expect_data(&fetched, created.data.as_ref())
    })
    .await
}

/// PUT replaces name and data wholesale and keeps the id.
pub async fn full_update(ctx: TestContext) -> Result<()> {
    let ctx = &ctx;
    let replacement = &data::macbook_2019_repriced();
    with_created_object(ctx, &data::macbook_2019(), |created| async move {
        let objects = ctx.objects();

        let updated = objects.replace(&created.id, replacement).await?;
        expect_eq("/id", created.id.as_str(), updated.id.as_str())?;
        expect_eq("/name", replacement.name.as_str(), updated.name.as_str())?;
        expect_data(&updated, replacement.data.as_ref())?;

        let fetched = objects.get(&created.id).await?;
        expect_eq("/id", created.id.as_str(), fetched.id.as_str())?;
        expect_eq("/name", replacement.name.as_str(), fetched.name.as_str())?;
        expect_data(&fetched, replacement.data.as_ref())
    })
    .await
}

/// PATCH of the name alone leaves data untouched.
pub async fn partial_update(ctx: TestContext) -> Result<()> {
    let ctx = &ctx;
    let patch = &data::macbook_rename();
    with_created_object(ctx, &data::macbook_2019(), |created| async move {
        let objects = ctx.objects();
        let expected = patch.apply_to(&created);

        let patched = objects.patch(&created.id, patch).await?;
        expect_eq("/id", created.id.as_str(), patched.id.as_str())?;
        expect_eq("/name", expected.name.as_str(), patched.name.as_str())?;
        expect_data(&patched, created.data.as_ref())?;

        let fetched = objects.get(&created.id).await?;
        expect_eq("/id", created.id.as_str(), fetched.id.as_str())?;
        expect_eq("/name", expected.name.as_str(), fetched.name.as_str())?;
        expect_data(&fetched, created.data.as_ref())
    })
    .await
}

/// DELETE is acknowledged, the object is gone, and deleting it again is a 404.
pub async fn delete_object(ctx: TestContext) -> Result<()> {
    let ctx = &ctx;
    with_created_object(ctx, &data::macbook_2019(), |created| async move {
        let path = ctx.object_path(&created.id);

        let response = ctx.client().delete(&path).await?;
        expect_status(&response, StatusCode::OK)?;
        expect_key(&response.json_value()?, "message")?;

        ctx.objects().expect_absent(&created.id).await?;

        let again = ctx.client().delete(&path).await?;
        expect_status(&again, StatusCode::NOT_FOUND)
    })
    .await
}

/// Deleting an id that never existed answers 404.
pub async fn delete_nonexistent(ctx: TestContext) -> Result<()> {
    let response = ctx
        .client()
        .delete(&ctx.object_path(data::NONEXISTENT_ID))
        .await?;
    expect_status(&response, StatusCode::NOT_FOUND)
}
