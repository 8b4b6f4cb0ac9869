//! Reference data
//!
//! The objects the public service ships pre-seeded, and the payloads the
//! mutation scenarios submit.

use serde_json::{Value, json};

use crate::types::{ObjectPayload, ObjectRecord, PatchPayload};

/// Id of an object that never exists on the service.
pub const NONEXISTENT_ID: &str = "nonexistent123";

/// Seeded records in id order.
///
/// Only the fields below are relied upon; the live service may carry more.
pub fn reference_objects() -> Vec<ObjectRecord> {
    [
        ("1", "Google Pixel 6 Pro", json!({"color": "Cloudy White", "capacity": "128 GB"})),
        ("2", "Apple iPhone 12 Mini, 256GB, Blue", Value::Null),
        ("3", "Apple iPhone 12 Pro Max", json!({"color": "Cloudy White", "capacity GB": 512})),
        ("4", "Apple iPhone 11, 64GB", json!({"price": 389.99, "color": "Purple"})),
        ("5", "Samsung Galaxy Z Fold2", json!({"price": 689.99, "color": "Brown"})),
        ("6", "Apple AirPods", json!({"generation": "3rd", "price": 120})),
        (
            "7",
            "Apple MacBook Pro 16",
            json!({
                "year": 2019,
                "price": 1849.99,
                "CPU model": "Intel Core i9",
                "Hard disk size": "1 TB"
            }),
        ),
        ("8", "Apple Watch Series 8", json!({"Strap Colour": "Elderberry", "Case Size": "41mm"})),
        (
            "9",
            "Beats Studio3 Wireless",
            json!({
                "Color": "Red",
                "Description": "High-performance wireless noise cancelling headphones"
            }),
        ),
        ("10", "Apple iPad Mini 5th Gen", json!({"Capacity": "64 GB", "Screen size": 7.9})),
        ("11", "Apple iPad Mini 5th Gen", json!({"Capacity": "254 GB", "Screen size": 7.9})),
        (
            "12",
            "Apple iPad Air",
            json!({"Generation": "4th", "Price": "419.99", "Capacity": "64 GB"}),
        ),
        (
            "13",
            "Apple iPad Air",
            json!({"Generation": "4th", "Price": "519.99", "Capacity": "256 GB"}),
        ),
    ]
    .into_iter()
    .map(|(id, name, data)| ObjectRecord {
        id: id.to_string(),
        name: name.to_string(),
        data: match data {
            Value::Object(map) => Some(map),
            _ => None,
        },
        created_at: None,
        updated_at: None,
    })
    .collect()
}

/// The 2019 MacBook the create/update/delete scenarios start from.
pub fn macbook_2019() -> ObjectPayload {
    ObjectPayload::new("Apple MacBook Pro 16")
        .attribute("year", 2019)
        .attribute("price", 1849.99)
        .attribute("CPU model", "Intel Core i9")
        .attribute("Hard disk size", "1 TB")
}

/// Full replacement of [`macbook_2019`]: new price and an added color.
pub fn macbook_2019_repriced() -> ObjectPayload {
    macbook_2019()
        .attribute("price", 2049.99)
        .attribute("color", "silver")
}

/// Rename-only patch applied by the partial update scenario.
pub fn macbook_rename() -> PatchPayload {
    PatchPayload::new().name("Apple MacBook Pro 16 (Updated Name)")
}

/// Step 2 payload of the CRUD sequence.
pub fn crud_create() -> ObjectPayload {
    ObjectPayload::new("Apple MacBook Pro 16")
        .attribute("year", 2023)
        .attribute("price", 1999.99)
        .attribute("CPU model", "M2 Max")
        .attribute("Hard disk size", "1 TB")
}

/// Step 3 payload of the CRUD sequence.
pub fn crud_replace() -> ObjectPayload {
    ObjectPayload::new("Apple MacBook Pro 16 (Updated)")
        .attribute("year", 2023)
        .attribute("price", 2199.99)
        .attribute("CPU model", "M2 Max")
        .attribute("Hard disk size", "2 TB")
        .attribute("color", "Space Gray")
}

/// Step 4 patch of the CRUD sequence.
pub fn crud_patch() -> PatchPayload {
    PatchPayload::new()
        .attribute("price", 2099.99)
        .attribute("color", "Silver")
}
