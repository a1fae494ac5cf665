use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::{debug, error, info};

use crate::graph::GraphData;
use crate::source::{GraphSource, fetch_graph};

pub type LoadResult = Result<GraphData, String>;

struct LoadMessage {
    token: u64,
    result: LoadResult,
}

/// Background graph loads. Every request gets a fresh token and only the newest token's
/// answer is ever handed back, so a slow earlier request cannot overwrite a later one.
pub struct GraphLoader {
    tx: Sender<LoadMessage>,
    rx: Receiver<LoadMessage>,
    latest: u64,
    pending: bool,
    dropped: usize,
}

impl Default for GraphLoader {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            latest: 0,
            pending: false,
            dropped: 0,
        }
    }
}

impl GraphLoader {
    pub fn request(&mut self, source: GraphSource, query: String) -> u64 {
        info!(source = %source.describe(), %query, "loading graph");
        self.spawn(move || fetch_graph(&source, &query).map_err(|error| format!("{error:#}")))
    }

    pub(crate) fn spawn<F>(&mut self, job: F) -> u64
    where
        F: FnOnce() -> LoadResult + Send + 'static,
    {
        self.latest += 1;
        self.pending = true;
        let token = self.latest;
        let tx = self.tx.clone();

        thread::spawn(move || {
            let result = job();
            let _ = tx.send(LoadMessage { token, result });
        });

        token
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    #[cfg(test)]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn poll(&mut self) -> Option<LoadResult> {
        while let Ok(message) = self.rx.try_recv() {
            if message.token != self.latest {
                self.dropped += 1;
                debug!(
                    token = message.token,
                    latest = self.latest,
                    dropped = self.dropped,
                    "dropping superseded graph response"
                );
                continue;
            }

            self.pending = false;
            match &message.result {
                Ok(graph) => info!(
                    nodes = graph.node_count(),
                    relationships = graph.relationship_count(),
                    "graph loaded"
                ),
                Err(reason) => error!(%reason, "graph load failed"),
            }
            return Some(message.result);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::graph::Node;

    fn graph_named(id: &str) -> GraphData {
        GraphData {
            nodes: vec![Node {
                id: id.to_owned(),
                ..Default::default()
            }],
            relationships: Vec::new(),
        }
    }

    fn wait_for<T>(mut check: impl FnMut() -> Option<T>) -> T {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(value) = check() {
                return value;
            }
            assert!(Instant::now() < deadline, "timed out waiting for loader");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn latest_request_wins_over_slow_earlier_one() {
        let mut loader = GraphLoader::default();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let first = loader.spawn(move || {
            let _ = release_rx.recv();
            Ok(graph_named("stale"))
        });
        let second = loader.spawn(|| Ok(graph_named("fresh")));
        assert!(second > first);

        let result = wait_for(|| loader.poll()).expect("fresh load succeeds");
        assert_eq!(result.nodes[0].id, "fresh");
        assert!(!loader.is_pending());

        release_tx.send(()).expect("release stale job");
        wait_for(|| {
            assert!(loader.poll().is_none());
            (loader.dropped() == 1).then_some(())
        });
    }

    #[test]
    fn errors_are_delivered_as_messages() {
        let mut loader = GraphLoader::default();
        loader.spawn(|| Err("Backend query failed: Bad Gateway".to_owned()));
        assert!(loader.is_pending());

        let result = wait_for(|| loader.poll());
        assert_eq!(result, Err("Backend query failed: Bad Gateway".to_owned()));
    }
}
