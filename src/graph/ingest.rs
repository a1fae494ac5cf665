use std::collections::HashMap;

use tracing::warn;

use super::model::GraphData;

/// Collapses duplicate node and relationship ids. The last record seen for an id replaces
/// the earlier one at the earlier slot so ordering stays stable.
pub fn normalize_graph(data: GraphData) -> GraphData {
    let GraphData {
        nodes,
        relationships,
    } = data;

    let (nodes, duplicate_nodes) = last_seen_wins(nodes, |node| node.id.clone());
    if duplicate_nodes > 0 {
        warn!(duplicate_nodes, "graph payload repeated node ids; keeping the last record for each");
    }

    let (relationships, duplicate_relationships) =
        last_seen_wins(relationships, |relationship| relationship.id.clone());
    if duplicate_relationships > 0 {
        warn!(
            duplicate_relationships,
            "graph payload repeated relationship ids; keeping the last record for each"
        );
    }

    GraphData {
        nodes,
        relationships,
    }
}

fn last_seen_wins<T>(items: Vec<T>, key: impl Fn(&T) -> String) -> (Vec<T>, usize) {
    let mut slot_by_key: HashMap<String, usize> = HashMap::with_capacity(items.len());
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    let mut duplicates = 0usize;

    for item in items {
        let item_key = key(&item);
        if let Some(&slot) = slot_by_key.get(&item_key) {
            kept[slot] = item;
            duplicates += 1;
        } else {
            slot_by_key.insert(item_key, kept.len());
            kept.push(item);
        }
    }

    (kept, duplicates)
}
