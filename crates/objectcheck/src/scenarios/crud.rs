//! CRUD sequence scenario
//!
//! Seven dependent calls against one object, each a transition of
//! [`CrudState`]. The id assigned at step 2 is threaded through every later
//! step and the record returned by each mutation becomes the expectation for
//! the next one.

use std::fmt;

use tracing::{info, warn};

use crate::{
    assertions::{expect_attribute, expect_data, expect_eq},
    data,
    error::{Error, Result},
    fixture::TestContext,
    observability::log_step,
    types::ObjectRecord,
};
use serde_json::json;

const SCENARIO: &str = "crud_sequence";

/// Lifecycle state of the object driven through the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudState {
    /// Not created yet
    Absent,
    /// POST succeeded
    Created,
    /// PUT succeeded
    FullyUpdated,
    /// PATCH succeeded
    PartiallyUpdated,
    /// GET returned the last-known state
    Verified,
    /// DELETE acknowledged
    Deleted,
    /// GET returned 404
    VerifiedAbsent,
}

impl CrudState {
    /// Step number, call label and target state of the transition out of
    /// `self`, or `None` once the sequence is complete.
    pub fn next(self) -> Option<(u8, &'static str, CrudState)> {
        match self {
            CrudState::Absent => Some((2, "POST /objects", CrudState::Created)),
            CrudState::Created => Some((3, "PUT /objects/{id}", CrudState::FullyUpdated)),
            CrudState::FullyUpdated => {
                Some((4, "PATCH /objects/{id}", CrudState::PartiallyUpdated))
            }
            CrudState::PartiallyUpdated => Some((5, "GET /objects/{id}", CrudState::Verified)),
            CrudState::Verified => Some((6, "DELETE /objects/{id}", CrudState::Deleted)),
            CrudState::Deleted => Some((7, "GET /objects/{id}", CrudState::VerifiedAbsent)),
            CrudState::VerifiedAbsent => None,
        }
    }

    /// Whether the object exists on the service in this state.
    pub fn object_exists(self) -> bool {
        !matches!(
            self,
            CrudState::Absent | CrudState::Deleted | CrudState::VerifiedAbsent
        )
    }
}

impl fmt::Display for CrudState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CrudState::Absent => "absent",
            CrudState::Created => "created",
            CrudState::FullyUpdated => "fully-updated",
            CrudState::PartiallyUpdated => "partially-updated",
            CrudState::Verified => "verified",
            CrudState::Deleted => "deleted",
            CrudState::VerifiedAbsent => "verified-absent",
        };
        f.write_str(label)
    }
}

/// What a completed sequence observed.
#[derive(Debug, Clone, PartialEq)]
pub struct CrudReport {
    /// Collection size before the object was created
    pub initial_count: usize,
    /// Id the service assigned at step 2
    pub object_id: String,
    /// States visited, in order, starting at [`CrudState::Absent`]
    pub states: Vec<CrudState>,
}

/// Run the sequence and fail unless every step passes.
pub async fn crud_sequence(ctx: TestContext) -> Result<()> {
    run_crud_sequence(&ctx).await.map(|_| ())
}

/// Run the sequence, returning what it observed.
///
/// The first failing step ends the run with [`Error::Step`]. If that happens
/// while the object exists, a best-effort DELETE is issued before the error
/// is returned.
pub async fn run_crud_sequence(ctx: &TestContext) -> Result<CrudReport> {
    let objects = ctx.objects();

    let initial = objects
        .list()
        .await
        .map_err(|e| e.at_step(1, "GET /objects"))?;
    log_step(SCENARIO, 1, "GET /objects", &CrudState::Absent.to_string());
    info!(initial_count = initial.len(), "Initial object count observed");

    let mut run = Run {
        ctx,
        state: CrudState::Absent,
        states: vec![CrudState::Absent],
        object_id: None,
    };

    match run.drive().await {
        Ok(()) => Ok(CrudReport {
            initial_count: initial.len(),
            object_id: run.object_id.unwrap_or_default(),
            states: run.states,
        }),
        Err(err) => {
            run.abandon().await;
            Err(err)
        }
    }
}

struct Run<'a> {
    ctx: &'a TestContext,
    state: CrudState,
    states: Vec<CrudState>,
    object_id: Option<String>,
}

impl Run<'_> {
    async fn drive(&mut self) -> Result<()> {
        let objects = self.ctx.objects();

        let (step, call, next) = self.transition()?;
        let created = match objects.create(&data::crud_create()).await {
            Ok(created) => created,
            Err(err) => {
                self.object_id = err.created_id().map(str::to_string);
                return Err(err.at_step(step, call));
            }
        };
        self.object_id = Some(created.id.clone());
        self.advance(next);
        let id = created.id.clone();

        let (step, call, next) = self.transition()?;
        let replace = data::crud_replace();
        let updated = objects
            .replace(&id, &replace)
            .await
            .and_then(|record| {
                expect_eq("/id", id.as_str(), record.id.as_str())?;
                expect_data(&record, replace.data.as_ref())?;
                expect_attribute(&record, "Hard disk size", &json!("2 TB"))?;
                Ok(record)
            })
            .map_err(|e| e.at_step(step, call))?;
        self.advance(next);

        let (step, call, next) = self.transition()?;
        let patch = data::crud_patch();
        let expected = patch.apply_to(&updated);
        let patched = objects
            .patch(&id, &patch)
            .await
            .and_then(|record| {
                expect_matches(&expected, &record)?;
                expect_attribute(&record, "color", &json!("Silver"))?;
                Ok(record)
            })
            .map_err(|e| e.at_step(step, call))?;
        self.advance(next);

        let (step, call, next) = self.transition()?;
        objects
            .get(&id)
            .await
            .and_then(|record| {
                expect_matches(&patched, &record)?;
                expect_attribute(&record, "price", &json!(2099.99))
            })
            .map_err(|e| e.at_step(step, call))?;
        self.advance(next);

        let (step, call, next) = self.transition()?;
        objects
            .delete(&id)
            .await
            .map_err(|e| e.at_step(step, call))?;
        self.advance(next);

        let (step, call, next) = self.transition()?;
        objects
            .expect_absent(&id)
            .await
            .map_err(|e| e.at_step(step, call))?;
        self.advance(next);

        Ok(())
    }

    fn transition(&self) -> Result<(u8, &'static str, CrudState)> {
        self.state.next().ok_or_else(|| {
            Error::field_mismatch("/state", "a pending transition", self.state)
        })
    }

    fn advance(&mut self, next: CrudState) {
        if let Some((step, call, _)) = self.state.next() {
            log_step(SCENARIO, step, call, &next.to_string());
        }
        self.state = next;
        self.states.push(next);
    }

    async fn abandon(&self) {
        let Some(id) = &self.object_id else {
            return;
        };
        // An id recorded while still absent came from a rejected create.
        if !self.state.object_exists() && self.state != CrudState::Absent {
            return;
        }
        if let Err(err) = self.ctx.remove_object(id).await {
            warn!(
                object_id = %id,
                state = %self.state,
                error = %err,
                "Could not delete object left behind by failed sequence"
            );
        }
    }
}

/// Require `actual` to carry the id, name and data of `expected`.
fn expect_matches(expected: &ObjectRecord, actual: &ObjectRecord) -> Result<()> {
    expect_eq("/id", expected.id.as_str(), actual.id.as_str())?;
    expect_eq("/name", expected.name.as_str(), actual.name.as_str())?;
    expect_data(actual, expected.data.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_are_linear() {
        let mut state = CrudState::Absent;
        let mut steps = Vec::new();
        while let Some((step, _, next)) = state.next() {
            steps.push(step);
            state = next;
        }
        assert_eq!(steps, vec![2, 3, 4, 5, 6, 7]);
        assert_eq!(state, CrudState::VerifiedAbsent);
    }

    #[test]
    fn test_object_exists() {
        assert!(!CrudState::Absent.object_exists());
        assert!(CrudState::Created.object_exists());
        assert!(CrudState::Verified.object_exists());
        assert!(!CrudState::Deleted.object_exists());
        assert!(!CrudState::VerifiedAbsent.object_exists());
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(CrudState::PartiallyUpdated.to_string(), "partially-updated");
        assert_eq!(CrudState::VerifiedAbsent.to_string(), "verified-absent");
    }
}
