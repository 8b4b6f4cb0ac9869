/// Live lifecycle checks: each test creates its own object
///
/// Run with: cargo test --test real_world -- --ignored real_world_crud
use crate::real_world::common::live_context;
use objectcheck::scenarios::{CrudState, mutations, run_crud_sequence};

#[tokio::test]
#[ignore]
async fn real_world_crud_sequence() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = live_context()?;
    let report = run_crud_sequence(&ctx).await?;

    println!(
        "Initial count {}, object {} went through {} states",
        report.initial_count,
        report.object_id,
        report.states.len()
    );
    assert_eq!(report.states.last(), Some(&CrudState::VerifiedAbsent));
    Ok(())
}

#[tokio::test]
#[ignore]
async fn real_world_crud_create_update_delete() -> Result<(), Box<dyn std::error::Error>> {
    mutations::create_object(live_context()?).await?;
    mutations::full_update(live_context()?).await?;
    mutations::partial_update(live_context()?).await?;
    mutations::delete_object(live_context()?).await?;
    mutations::delete_nonexistent(live_context()?).await?;
    Ok(())
}
