use std::collections::HashSet;
use std::sync::Arc;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::debug;

use crate::graph::{Node, Relationship};

use super::super::filter::filter_graph;
use super::super::layout::SyncOutcome;
use super::super::{SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

impl ViewModel {
    /// Layout and selection are brought in line before the next tick reads them.
    pub(in crate::app) fn refresh_filter(&mut self) {
        self.filter.evolution_year = self.evolution_enabled.then_some(self.evolution_year);
        self.filtered = filter_graph(&self.graph, &self.filter);

        if self.layout.sync(&self.graph, &self.filtered) == SyncOutcome::Rebuilt {
            self.search_match_cache = None;
            debug!(
                nodes = self.filtered.nodes.len(),
                links = self.filtered.links.len(),
                "visible set changed, layout arena rebuilt"
            );
        }

        if self.selection.retain_visible(&self.layout) {
            debug!("selected element was filtered out");
        }
        self.filter_dirty = false;
    }

    pub(in crate::app) fn apply_pending_filter(&mut self) {
        if self.filter_dirty {
            self.refresh_filter();
        }
    }

    pub(in crate::app) fn layout_node_data(&self, index: usize) -> Option<&Node> {
        self.filtered
            .nodes
            .get(index)
            .and_then(|&data_index| self.graph.nodes.get(data_index))
    }

    pub(in crate::app) fn relationship_data(&self, relationship: usize) -> Option<&Relationship> {
        self.graph.relationships.get(relationship)
    }

    /// Off while something is selected.
    pub(in crate::app) fn search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        if !self.selection.current().is_none() {
            return None;
        }

        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = (0..self.layout.nodes().len())
            .filter(|&index| {
                self.layout_node_data(index).is_some_and(|node| {
                    fuzzy_match_score(&matcher, node.display_name(), query).is_some()
                })
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;
    use crate::app::interaction::PointerTarget;
    use crate::graph::GraphData;

    fn sample_graph() -> GraphData {
        serde_json::from_value(serde_json::json!({
            "nodes": [
                {"id": "a", "type": "gene", "name": "BRCA1"},
                {"id": "b", "type": "disease", "name": "Cancer"},
                {"id": "c", "type": "drug", "name": "Olaparib"}
            ],
            "relationships": [
                {"id": "r1", "source": "a", "target": "b", "relation": "causes",
                 "weightage": 1, "evolution": {"2022": 1}},
                {"id": "r2", "source": "c", "target": "a", "relation": "targets", "weightage": 1}
            ]
        }))
        .expect("sample graph deserializes")
    }

    fn settled_model() -> ViewModel {
        let mut model = ViewModel::new(sample_graph(), Some(3));
        model.refresh_filter();
        model.layout.run_until_settled(10_000);
        model
    }

    #[test]
    fn new_model_shows_everything() {
        let model = ViewModel::new(sample_graph(), Some(3));
        assert_eq!(model.filtered.nodes, vec![0, 1, 2]);
        assert_eq!(model.filtered.active_link_count(), 2);
        assert_eq!(model.layout.nodes().len(), 3);
        assert_eq!(model.evolution_year, 2022);
        assert!(!model.filter_dirty);
    }

    #[test]
    fn year_change_restarts_layout_and_keeps_positions() {
        let mut model = settled_model();
        assert!(!model.layout.is_running());
        let before = model.layout.position("a");

        model.evolution_enabled = true;
        model.evolution_year = 2021;
        model.refresh_filter();
        assert!(model.layout.is_running());
        assert_eq!(model.layout.alpha(), 1.0);
        assert_eq!(model.layout.position("a"), before);
        assert_eq!(model.filtered.active_link_count(), 1);
        assert_eq!(model.layout.links().len(), 2);

        model.layout.run_until_settled(10_000);
        model.evolution_year = 2023;
        model.refresh_filter();
        assert!(model.layout.is_running());
        assert_eq!(model.filtered.active_link_count(), 2);
    }

    #[test]
    fn hiding_a_type_restarts_layout_and_drops_selection() {
        let mut model = settled_model();
        model
            .selection
            .click(PointerTarget::Node("b".to_owned()), pos2(5.0, 5.0));

        model.filter.set_type_visible("disease", false);
        model.refresh_filter();

        assert!(model.layout.is_running());
        assert!(model.selection.current().is_none());
        assert!(!model.layout.contains_link("r1"));
        assert!(model.layout.contains_link("r2"));
    }

    #[test]
    fn pending_filter_is_applied_before_counts_are_read() {
        let mut model = settled_model();
        model.filter.set_type_visible("drug", false);
        model.filter_dirty = true;
        assert_eq!(model.filtered.nodes.len(), 3);

        model.apply_pending_filter();
        assert!(!model.filter_dirty);
        assert_eq!(model.filtered.nodes, vec![0, 1]);
        assert_eq!(model.filtered.active_link_count(), 1);

        let alpha = model.layout.alpha();
        model.layout.tick();
        model.apply_pending_filter();
        assert!(model.layout.alpha() < alpha);
    }

    #[test]
    fn selection_survives_unrelated_filter_change() {
        let mut model = settled_model();
        model
            .selection
            .click(PointerTarget::Edge("r2".to_owned()), pos2(5.0, 5.0));

        model.filter.set_type_visible("disease", false);
        model.refresh_filter();
        assert_eq!(model.selection.current().edge_id(), Some("r2"));
    }

    #[test]
    fn search_matches_names_and_pauses_while_selected() {
        let mut model = settled_model();
        model.search = "olap".to_owned();
        let matches = model.search_matches().expect("search is active");
        assert_eq!(*matches, HashSet::from([2]));

        model
            .selection
            .click(PointerTarget::Node("a".to_owned()), pos2(0.0, 0.0));
        assert!(model.search_matches().is_none());
    }
}
