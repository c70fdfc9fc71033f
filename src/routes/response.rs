use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    /// How many records a deletion removed.
    Deleted(u64),
    Healthz {
        name: &'a str,
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
        /// Records per collection; absent when the store did not answer.
        #[serde(skip_serializing_if = "Option::is_none")]
        collections: Option<BTreeMap<&'a str, i64>>,
    },
}
