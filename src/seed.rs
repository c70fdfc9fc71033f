use std::sync::Arc;

use log::{debug, info, Logger};
use schema::{Schema, LOGIN, RECIPE};

use crate::db::RecordStore;
use crate::errors::BackendError;
use crate::record::Fields;

/// Demo records per schema, embedded at build time.
static DEMO_DATA: [(&Schema, &str); 2] = [
    (&RECIPE, include_str!("../demo/recipes.json")),
    (&LOGIN, include_str!("../demo/user.json")),
];

/// Fills every empty collection with its demo records. Collections that
/// already hold anything are left alone, so this is safe to run on
/// every start.
pub async fn seed_demo_data(logger: &Logger, store: &Arc<dyn RecordStore>) -> Result<(), BackendError> {
    for (schema, raw) in DEMO_DATA.iter() {
        let count = store.count(schema.collection).await?;

        if count != 0 {
            debug!(logger, "Collection already populated"; "collection" => schema.collection, "count" => count);
            continue;
        }

        let records = demo_records(schema, raw);
        info!(logger, "Seeding demo data"; "collection" => schema.collection, "count" => records.len());

        for fields in records {
            store.insert(schema.collection, fields).await?;
        }
    }

    Ok(())
}

fn demo_records(schema: &Schema, raw: &str) -> Vec<Fields> {
    // the files are part of the build, so a parse failure is a build defect
    serde_json::from_str::<Vec<Fields>>(raw)
        .unwrap_or_else(|e| panic!("parse demo data for {}: {}", schema.collection, e))
}
