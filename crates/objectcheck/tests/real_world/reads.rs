/// Live read and query checks against the seeded objects
///
/// Run with: cargo test --test real_world -- --ignored real_world_reads
use crate::real_world::common::live_context;
use objectcheck::scenarios::{queries, reads};

#[tokio::test]
#[ignore]
async fn real_world_reads_list_all() -> Result<(), Box<dyn std::error::Error>> {
    reads::list_all_objects(live_context()?).await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn real_world_reads_single_and_null_data() -> Result<(), Box<dyn std::error::Error>> {
    reads::get_single_object(live_context()?).await?;
    reads::get_object_with_null_data(live_context()?).await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn real_world_reads_known_objects() -> Result<(), Box<dyn std::error::Error>> {
    for (id, name) in [
        ("7", "Apple MacBook Pro 16"),
        ("8", "Apple Watch Series 8"),
        ("13", "Apple iPad Air"),
    ] {
        reads::get_known_object(live_context()?, id, name).await?;
    }
    for id in ["999999", "invalid_id"] {
        reads::get_nonexistent_object(live_context()?, id).await?;
    }
    Ok(())
}

#[tokio::test]
#[ignore]
async fn real_world_reads_query_by_ids() -> Result<(), Box<dyn std::error::Error>> {
    queries::query_reference_ids(live_context()?).await?;
    queries::query_partial_invalid(live_context()?).await?;
    queries::query_empty_filter(live_context()?).await?;
    Ok(())
}
