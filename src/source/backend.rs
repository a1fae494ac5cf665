use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::{Client, Response};
use serde_json::{Value, json};
use tracing::debug;

use crate::graph::GraphData;

use super::parse::graph_from_value;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub(super) fn fetch_from_backend(base_url: &str, query: &str) -> Result<GraphData> {
    let query = query.trim();
    if query.is_empty() {
        return Err(anyhow!("Query is required"));
    }

    let base_url = base_url.trim_end_matches('/');
    let client = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;

    debug!(%base_url, "submitting graph query");
    let query_response = client
        .post(format!("{base_url}/api/v1/query/read"))
        .json(&json!({ "query": query }))
        .send()
        .with_context(|| format!("failed to reach query service at {base_url}"))?;
    let query_result = success_json(query_response, "Backend query failed")?;

    let results = query_result.get("results").cloned().unwrap_or(Value::Null);
    let transform_response = client
        .post(format!("{base_url}/api/v1/transform/pxlsviz"))
        .json(&json!({
            "input_json": results,
            "parameters": {
                "source_node_tag": "start",
                "target_node_tag": "end",
                "relationship_type_tag": "type",
            },
        }))
        .send()
        .with_context(|| format!("failed to reach transform service at {base_url}"))?;
    let transformed = success_json(transform_response, "Transformation failed")?;

    graph_from_value(transformed)
}

fn success_json(response: Response, failure: &str) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or(status.as_str());
        return Err(anyhow!("{failure}: {reason}"));
    }

    response
        .json::<Value>()
        .with_context(|| format!("{failure}: response was not valid JSON"))
}
