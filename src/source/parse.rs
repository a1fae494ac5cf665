use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::graph::GraphData;

/// Accepts either a bare graph object or the `{success, data, error}` envelope the query
/// route answers with.
pub(super) fn parse_graph_payload(raw: &str) -> Result<GraphData> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in graph payload")?;
    graph_from_value(parsed)
}

pub(super) fn graph_from_value(value: Value) -> Result<GraphData> {
    let object = value
        .as_object()
        .ok_or_else(|| anyhow!("unexpected JSON type for graph payload"))?;

    if let Some(success) = object.get("success") {
        if !success.as_bool().unwrap_or(false) {
            let message = object
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Failed to fetch graph data");
            return Err(anyhow!("{message}"));
        }

        let data = object
            .get("data")
            .cloned()
            .ok_or_else(|| anyhow!("graph response is missing its data"))?;
        return serde_json::from_value(data).context("invalid graph data in response");
    }

    serde_json::from_value(value).context("invalid graph data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_graph() {
        let graph = parse_graph_payload(
            r#"{"nodes":[{"id":"a","type":"gene","name":"BRCA1"}],"relationships":[]}"#,
        )
        .expect("bare graph parses");
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn unwraps_successful_envelope() {
        let graph = parse_graph_payload(
            r#"{"success":true,"data":{"nodes":[],"relationships":[
                {"id":"r1","source":"a","target":"b","relation":"causes","weightage":1}]}}"#,
        )
        .expect("envelope parses");
        assert_eq!(graph.relationship_count(), 1);
    }

    #[test]
    fn failed_envelope_surfaces_message() {
        let error = parse_graph_payload(r#"{"success":false,"error":"Query is required"}"#)
            .expect_err("failure envelope is an error");
        assert_eq!(error.to_string(), "Query is required");

        let error = parse_graph_payload(r#"{"success":false}"#).expect_err("failure envelope");
        assert_eq!(error.to_string(), "Failed to fetch graph data");
    }

    #[test]
    fn rejects_non_object_payloads() {
        assert!(parse_graph_payload("[1, 2, 3]").is_err());
        assert!(parse_graph_payload("not json").is_err());
    }
}
