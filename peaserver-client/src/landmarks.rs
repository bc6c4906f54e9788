//! Bundled landmarks snapshot exposed through `PeaServer::landmarks_map`.
//! Ships with the client; there is no live source or refresh.

use std::collections::HashMap;

use serde_json::{json, Value};

/// Build the snapshot handed to each client instance. Literal data, so the
/// accessor has no failure path.
pub(crate) fn bundled_map() -> HashMap<String, Value> {
    let entries = [
        ("eiffel-tower", 1, "europe"),
        ("big-ben", 2, "europe"),
        ("colosseum", 3, "europe"),
        ("statue-of-liberty", 4, "americas"),
        ("golden-gate", 5, "americas"),
        ("great-wall", 6, "asia"),
        ("taj-mahal", 7, "asia"),
        ("sydney-opera-house", 8, "oceania"),
    ];
    entries
        .into_iter()
        .map(|(name, id, region)| {
            (
                name.to_string(),
                json!({
                    "id": id,
                    "region": region,
                    "route": format!("landmark/{name}"),
                }),
            )
        })
        .collect()
}
