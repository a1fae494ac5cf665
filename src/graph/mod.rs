mod ingest;
mod model;

pub use ingest::normalize_graph;
pub use model::{GraphData, Node, Properties, Relationship, YearRange};
