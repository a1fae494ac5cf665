mod backend;
mod parse;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::graph::{GraphData, normalize_graph};

#[derive(Clone, Debug)]
pub enum GraphSource {
    /// A JSON file holding a graph or a response envelope. The query is ignored.
    File(PathBuf),
    Backend(String),
}

impl GraphSource {
    pub fn needs_query(&self) -> bool {
        matches!(self, Self::Backend(_))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => format!("file: {}", path.display()),
            Self::Backend(url) => format!("backend: {url}"),
        }
    }
}

pub fn fetch_graph(source: &GraphSource, query: &str) -> Result<GraphData> {
    let raw = match source {
        GraphSource::File(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read graph file {}", path.display()))?;
            parse::parse_graph_payload(&contents)
                .with_context(|| format!("failed to parse graph file {}", path.display()))?
        }
        GraphSource::Backend(base_url) => backend::fetch_from_backend(base_url, query)?,
    };

    Ok(normalize_graph(raw))
}
