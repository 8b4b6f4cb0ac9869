//! Scenario catalog
//!
//! Every contract check the harness knows, as named entries a runner can
//! select and execute. Parametrised checks appear once per parameter set.

pub mod crud;
pub mod mutations;
pub mod queries;
pub mod reads;

use std::fmt;
use std::str::FromStr;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::Result;
use crate::fixture::TestContext;

pub use crud::{CrudReport, CrudState, run_crud_sequence};

/// Area of the contract a scenario covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    /// The seven-step lifecycle sequence
    Crud,
    /// Single-object and collection reads
    Read,
    /// `id`-filtered collection queries
    Query,
    /// Create, update and delete checks
    Mutation,
}

impl Group {
    /// All groups, in catalog order.
    pub const ALL: [Group; 4] = [Group::Crud, Group::Read, Group::Query, Group::Mutation];

    /// Lowercase name used on the command line and in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Group::Crud => "crud",
            Group::Read => "read",
            Group::Query => "query",
            Group::Mutation => "mutation",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Group::ALL
            .into_iter()
            .find(|group| group.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!("unknown group '{}', expected one of: crud, read, query, mutation", s)
            })
    }
}

type Entry = Box<dyn Fn(TestContext) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// One named contract check.
pub struct Scenario {
    name: String,
    description: &'static str,
    group: Group,
    entry: Entry,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("group", &self.group)
            .finish()
    }
}

impl Scenario {
    /// Create a scenario from an async entry point.
    pub fn new<F>(
        name: impl Into<String>,
        description: &'static str,
        group: Group,
        entry: F,
    ) -> Self
    where
        F: Fn(TestContext) -> BoxFuture<'static, Result<()>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description,
            group,
            entry: Box::new(entry),
        }
    }

    /// Stable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line description.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Group.
    pub fn group(&self) -> Group {
        self.group
    }

    /// Run against `ctx`, consuming it.
    pub fn run(&self, ctx: TestContext) -> BoxFuture<'static, Result<()>> {
        (self.entry)(ctx)
    }

    /// Whether this scenario passes a name-substring and group selection.
    pub fn matches(&self, filter: Option<&str>, group: Option<Group>) -> bool {
        filter.is_none_or(|f| self.name.contains(f)) && group.is_none_or(|g| g == self.group)
    }
}

/// Every scenario, in a stable order.
pub fn catalog() -> Vec<Scenario> {
    let mut scenarios = vec![
        Scenario::new(
            "crud_sequence",
            "GET, POST, PUT, PATCH, GET, DELETE, GET on one object",
            Group::Crud,
            |ctx| crud::crud_sequence(ctx).boxed(),
        ),
        Scenario::new(
            "get_all_objects",
            "collection is non-empty and schema-valid",
            Group::Read,
            |ctx| reads::list_all_objects(ctx).boxed(),
        ),
        Scenario::new(
            "get_single_object",
            "object 1 carries its seeded fields",
            Group::Read,
            |ctx| reads::get_single_object(ctx).boxed(),
        ),
        Scenario::new(
            "get_object_with_null_data",
            "object 2 has null data",
            Group::Read,
            |ctx| reads::get_object_with_null_data(ctx).boxed(),
        ),
    ];

    for (id, name) in [
        ("7", "Apple MacBook Pro 16"),
        ("8", "Apple Watch Series 8"),
        ("13", "Apple iPad Air"),
    ] {
        scenarios.push(Scenario::new(
            format!("get_known_object[{}]", id),
            "seeded object has its seeded name",
            Group::Read,
            move |ctx| reads::get_known_object(ctx, id, name).boxed(),
        ));
    }

    for id in ["999999", "invalid_id"] {
        scenarios.push(Scenario::new(
            format!("get_nonexistent_object[{}]", id),
            "unknown id answers 404",
            Group::Read,
            move |ctx| reads::get_nonexistent_object(ctx, id).boxed(),
        ));
    }

    scenarios.push(Scenario::new(
        "get_objects_by_ids",
        "ids 3, 5, 10 return exactly those objects",
        Group::Query,
        |ctx| queries::query_reference_ids(ctx).boxed(),
    ));

    const COMBINATIONS: [(&[&str], &[&str]); 3] = [
        (
            &["3", "5"],
            &["Apple iPhone 12 Pro Max", "Samsung Galaxy Z Fold2"],
        ),
        (&["10"], &["Apple iPad Mini 5th Gen"]),
        (
            &["3", "10"],
            &["Apple iPhone 12 Pro Max", "Apple iPad Mini 5th Gen"],
        ),
    ];
    for (ids, names) in COMBINATIONS {
        scenarios.push(Scenario::new(
            format!("get_objects_combination[{}]", ids.join(",")),
            "id combination returns the expected names",
            Group::Query,
            move |ctx| queries::query_combination(ctx, ids, names).boxed(),
        ));
    }

    scenarios.extend([
        Scenario::new(
            "get_objects_partial_invalid",
            "unknown ids in the filter are dropped",
            Group::Query,
            |ctx| queries::query_partial_invalid(ctx).boxed(),
        ),
        Scenario::new(
            "get_objects_empty_ids",
            "empty id filter answers 200 with a list",
            Group::Query,
            |ctx| queries::query_empty_filter(ctx).boxed(),
        ),
        Scenario::new(
            "create_object",
            "POST echoes the payload and the object reads back",
            Group::Mutation,
            |ctx| mutations::create_object(ctx).boxed(),
        ),
        Scenario::new(
            "full_update",
            "PUT replaces name and data",
            Group::Mutation,
            |ctx| mutations::full_update(ctx).boxed(),
        ),
        Scenario::new(
            "partial_update",
            "PATCH of the name leaves data untouched",
            Group::Mutation,
            |ctx| mutations::partial_update(ctx).boxed(),
        ),
        Scenario::new(
            "delete_object",
            "DELETE is acknowledged, then GET and DELETE answer 404",
            Group::Mutation,
            |ctx| mutations::delete_object(ctx).boxed(),
        ),
        Scenario::new(
            "delete_nonexistent_object",
            "DELETE of an unknown id answers 404",
            Group::Mutation,
            |ctx| mutations::delete_nonexistent(ctx).boxed(),
        ),
    ]);

    scenarios
}
