use std::collections::{BTreeSet, HashSet};

use crate::graph::GraphData;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    pub node_types: BTreeSet<String>,
    pub evolution_year: Option<i32>,
}

impl FilterState {
    pub fn showing_all(data: &GraphData) -> Self {
        Self {
            node_types: data.node_types().into_iter().collect(),
            evolution_year: None,
        }
    }

    pub fn set_type_visible(&mut self, node_type: &str, visible: bool) -> bool {
        if visible {
            self.node_types.insert(node_type.to_owned())
        } else {
            self.node_types.remove(node_type)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilteredLink {
    pub relationship: usize,
    pub is_active: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilteredGraph {
    pub nodes: Vec<usize>,
    pub links: Vec<FilteredLink>,
}

impl FilteredGraph {
    pub fn active_link_count(&self) -> usize {
        self.links.iter().filter(|link| link.is_active).count()
    }
}

pub fn filter_graph(data: &GraphData, filter: &FilterState) -> FilteredGraph {
    let all_types_selected = data
        .nodes
        .iter()
        .all(|node| filter.node_types.contains(&node.node_type));

    let nodes = if all_types_selected {
        (0..data.nodes.len()).collect::<Vec<_>>()
    } else {
        data.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| filter.node_types.contains(&node.node_type))
            .map(|(index, _)| index)
            .collect::<Vec<_>>()
    };

    let visible_ids = nodes
        .iter()
        .map(|&index| data.nodes[index].id.as_str())
        .collect::<HashSet<_>>();

    let links = data
        .relationships
        .iter()
        .enumerate()
        .filter(|(_, relationship)| {
            visible_ids.contains(relationship.source.as_str())
                && visible_ids.contains(relationship.target.as_str())
        })
        .map(|(index, relationship)| FilteredLink {
            relationship: index,
            is_active: relationship.is_active_at(filter.evolution_year),
        })
        .collect();

    FilteredGraph { nodes, links }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::*;
    use crate::graph::{Node, Relationship};

    fn node(id: &str, node_type: &str, name: &str) -> Node {
        Node {
            id: id.to_owned(),
            node_type: node_type.to_owned(),
            name: name.to_owned(),
            ..Default::default()
        }
    }

    fn relationship(id: &str, source: &str, target: &str, evolution: &[(&str, f64)]) -> Relationship {
        Relationship {
            id: id.to_owned(),
            source: source.to_owned(),
            target: target.to_owned(),
            relation: "causes".to_owned(),
            weightage: 1.0,
            evolution: (!evolution.is_empty()).then(|| {
                evolution
                    .iter()
                    .map(|(year, weight)| ((*year).to_owned(), *weight))
                    .collect::<BTreeMap<_, _>>()
            }),
            ..Default::default()
        }
    }

    fn gene_disease_graph() -> GraphData {
        GraphData {
            nodes: vec![node("a", "gene", "BRCA1"), node("b", "disease", "Cancer")],
            relationships: vec![relationship("r1", "a", "b", &[("2022", 1.0)])],
        }
    }

    #[test]
    fn evolution_cutoff_dims_but_keeps_links() {
        let data = gene_disease_graph();
        let mut filter = FilterState::showing_all(&data);

        filter.evolution_year = Some(2021);
        let filtered = filter_graph(&data, &filter);
        assert_eq!(filtered.nodes, vec![0, 1]);
        assert_eq!(
            filtered.links,
            vec![FilteredLink {
                relationship: 0,
                is_active: false,
            }]
        );

        filter.evolution_year = Some(2023);
        let filtered = filter_graph(&data, &filter);
        assert!(filtered.links[0].is_active);
        assert_eq!(filtered.active_link_count(), 1);
    }

    #[test]
    fn hidden_type_drops_its_links() {
        let data = gene_disease_graph();
        let mut filter = FilterState::showing_all(&data);
        assert!(filter.set_type_visible("disease", false));

        let filtered = filter_graph(&data, &filter);
        assert_eq!(filtered.nodes, vec![0]);
        assert!(filtered.links.is_empty());
    }

    #[test]
    fn dangling_endpoints_are_dropped_silently() {
        let mut data = gene_disease_graph();
        data.relationships.push(relationship("r2", "a", "ghost", &[]));
        data.relationships.push(relationship("r3", "ghost", "b", &[]));

        let filtered = filter_graph(&data, &FilterState::showing_all(&data));
        assert_eq!(filtered.links.len(), 1);
        assert_eq!(filtered.links[0].relationship, 0);
    }

    #[test]
    fn empty_type_selection_shows_nothing() {
        let data = gene_disease_graph();
        let filter = FilterState::default();
        assert_eq!(filter_graph(&data, &filter), FilteredGraph::default());
    }

    const TYPES: [&str; 3] = ["gene", "disease", "drug"];

    fn arb_graph() -> impl Strategy<Value = GraphData> {
        let nodes = prop::collection::vec(0..TYPES.len(), 0..12);
        let relationships = prop::collection::vec(
            (
                0..14usize,
                0..14usize,
                prop::collection::btree_map(2015..2026i32, 0..3u8, 0..3),
            ),
            0..24,
        );

        (nodes, relationships).prop_map(|(types, relationships)| GraphData {
            nodes: types
                .iter()
                .enumerate()
                .map(|(index, type_index)| node(&format!("n{index}"), TYPES[*type_index], "x"))
                .collect(),
            relationships: relationships
                .into_iter()
                .enumerate()
                .map(|(index, (source, target, evolution))| Relationship {
                    id: format!("r{index}"),
                    source: format!("n{source}"),
                    target: format!("n{target}"),
                    evolution: Some(
                        evolution
                            .into_iter()
                            .map(|(year, weight)| (year.to_string(), f64::from(weight)))
                            .collect(),
                    ),
                    ..Default::default()
                })
                .collect(),
        })
    }

    fn arb_types() -> impl Strategy<Value = BTreeSet<String>> {
        prop::collection::btree_set(prop::sample::select(TYPES.to_vec()), 0..=TYPES.len())
            .prop_map(|types| types.into_iter().map(str::to_owned).collect())
    }

    proptest! {
        #[test]
        fn showing_all_is_identity(data in arb_graph()) {
            let filtered = filter_graph(&data, &FilterState::showing_all(&data));
            let node_ids = data.nodes.iter().map(|node| node.id.as_str()).collect::<HashSet<_>>();
            let expected = data
                .relationships
                .iter()
                .enumerate()
                .filter(|(_, rel)| node_ids.contains(rel.source.as_str()) && node_ids.contains(rel.target.as_str()))
                .map(|(index, _)| index)
                .collect::<Vec<_>>();

            prop_assert_eq!(filtered.nodes, (0..data.nodes.len()).collect::<Vec<_>>());
            prop_assert_eq!(filtered.links.iter().map(|link| link.relationship).collect::<Vec<_>>(), expected);
            prop_assert!(filtered.links.iter().all(|link| link.is_active));
        }

        #[test]
        fn filtering_is_idempotent(data in arb_graph(), types in arb_types(), year in proptest::option::of(2014..2027i32)) {
            let filter = FilterState { node_types: types, evolution_year: year };
            let once = filter_graph(&data, &filter);

            let narrowed = GraphData {
                nodes: once.nodes.iter().map(|&index| data.nodes[index].clone()).collect(),
                relationships: once.links.iter().map(|link| data.relationships[link.relationship].clone()).collect(),
            };
            let twice = filter_graph(&narrowed, &filter);

            prop_assert_eq!(twice.nodes.len(), once.nodes.len());
            prop_assert_eq!(
                twice.links.iter().map(|link| link.is_active).collect::<Vec<_>>(),
                once.links.iter().map(|link| link.is_active).collect::<Vec<_>>()
            );
            prop_assert_eq!(filter_graph(&data, &filter), once);
        }

        #[test]
        fn toggling_a_type_restores_visible_set(data in arb_graph(), type_index in 0..TYPES.len()) {
            let mut filter = FilterState::showing_all(&data);
            let before = filter_graph(&data, &filter);

            filter.set_type_visible(TYPES[type_index], false);
            filter.set_type_visible(TYPES[type_index], true);
            let after = filter_graph(&data, &filter);

            let before_nodes = before.nodes.iter().collect::<BTreeSet<_>>();
            let after_nodes = after.nodes.iter().collect::<BTreeSet<_>>();
            prop_assert_eq!(before_nodes, after_nodes);
        }

        #[test]
        fn links_without_evolution_are_always_active(year in proptest::option::of(1900..2100i32)) {
            let mut data = gene_disease_graph();
            data.relationships = vec![relationship("r1", "a", "b", &[])];
            let filter = FilterState { evolution_year: year, ..FilterState::showing_all(&data) };
            prop_assert!(filter_graph(&data, &filter).links.iter().all(|link| link.is_active));
        }
    }
}
