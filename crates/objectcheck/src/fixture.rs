//! Per-test context and object lifecycle fixtures

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use tracing::{debug, warn};

use crate::{
    client::ApiClient,
    config::ClientConfig,
    error::Result,
    http::StatusCode,
    resources::{OBJECTS_PATH, Objects, object_path},
    types::{ObjectPayload, ObjectRecord},
};

/// State every test case starts from: its own client and the endpoint under
/// test.
#[derive(Debug, Clone)]
pub struct TestContext {
    client: ApiClient,
    base_endpoint: &'static str,
}

impl TestContext {
    /// Build a fresh context, with a new connection pool, from `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_client(ApiClient::new(config)?))
    }

    /// Wrap an existing client.
    pub fn with_client(client: ApiClient) -> Self {
        Self {
            client,
            base_endpoint: OBJECTS_PATH,
        }
    }

    /// The client owned by this context.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The typed objects resource.
    pub fn objects(&self) -> Objects {
        self.client.objects()
    }

    /// Collection path of the endpoint under test.
    pub fn base_endpoint(&self) -> &str {
        self.base_endpoint
    }

    /// Path of one object under the endpoint.
    pub fn object_path(&self, id: &str) -> String {
        object_path(id)
    }

    /// Create an object and return the service's record of it.
    ///
    /// Requires a 200, a schema-valid body and an assigned id. The caller owns
    /// the object from here on; prefer [`with_created_object`] when the test
    /// does not delete it itself.
    pub async fn create_object(&self, payload: &ObjectPayload) -> Result<ObjectRecord> {
        let created = self.objects().create(payload).await?;
        debug!(object_id = %created.id, name = %created.name, "Fixture object created");
        Ok(created)
    }

    /// Delete `id` if it still exists.
    ///
    /// Both 200 and 404 count as success; any other status or a transport
    /// failure is returned.
    pub async fn remove_object(&self, id: &str) -> Result<()> {
        let response = self.client.delete(&self.object_path(id)).await?;
        match response.status() {
            StatusCode::OK => {
                debug!(object_id = %id, "Fixture object deleted");
                Ok(())
            }
            StatusCode::NOT_FOUND => {
                debug!(object_id = %id, "Fixture object already gone");
                Ok(())
            }
            _ => response.ensure_status(StatusCode::OK).map(|_| ()),
        }
    }
}

/// Create an object, run `body` with it, then delete it.
///
/// Cleanup runs whether `body` succeeds, fails or panics; a panic is resumed
/// once the delete has been attempted. An error from `body` is returned in
/// preference to a cleanup error; a cleanup error on an otherwise passing
/// test fails the test. If the service created the object but its response
/// was rejected, the object is deleted before the error is returned.
///
/// # Example
///
/// ```rust,no_run
/// use objectcheck::{ClientConfig, data, fixture::{TestContext, with_created_object}};
///
/// # async fn example() -> objectcheck::Result<()> {
/// let ctx = TestContext::new(&ClientConfig::default())?;
/// with_created_object(&ctx, &data::macbook_2019(), |created| async move {
///     assert!(!created.id.is_empty());
///     Ok(())
/// })
/// .await
/// # }
/// ```
pub async fn with_created_object<F, Fut, T>(
    ctx: &TestContext,
    payload: &ObjectPayload,
    body: F,
) -> Result<T>
where
    F: FnOnce(ObjectRecord) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let created = match ctx.create_object(payload).await {
        Ok(created) => created,
        Err(err) => {
            if let Some(id) = err.created_id()
                && let Err(cleanup_err) = ctx.remove_object(id).await
            {
                warn!(object_id = %id, error = %cleanup_err, "Could not delete rejected object");
            }
            return Err(err);
        }
    };
    let id = created.id.clone();

    let outcome = AssertUnwindSafe(async move { body(created).await })
        .catch_unwind()
        .await;
    let cleanup = ctx.remove_object(&id).await;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(panic) => {
            if let Err(cleanup_err) = &cleanup {
                warn!(object_id = %id, error = %cleanup_err, "Fixture cleanup failed after panic");
            }
            panic::resume_unwind(panic);
        }
    };

    match (outcome, cleanup) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(cleanup_err)) => {
            warn!(object_id = %id, error = %cleanup_err, "Fixture cleanup failed");
            Err(cleanup_err)
        }
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(cleanup_err)) => {
            warn!(
                object_id = %id,
                error = %cleanup_err,
                "Fixture cleanup failed after test failure"
            );
            Err(err)
        }
    }
}
