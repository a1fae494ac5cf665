use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type Properties = BTreeMap<String, Value>;

pub const DEFAULT_YEAR_RANGE: YearRange = YearRange {
    min: 2020,
    max: 2025,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "nullable_map")]
    pub properties: Properties,
}

impl Node {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub relation: String,
    #[serde(default, deserialize_with = "nullable_weight")]
    pub weightage: f64,
    #[serde(default, deserialize_with = "numeric_evolution")]
    pub evolution: Option<BTreeMap<String, f64>>,
    #[serde(default, deserialize_with = "nullable_map")]
    pub properties: Properties,
}

impl Relationship {
    /// Malformed year keys are skipped.
    pub fn evolution_entries(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.evolution
            .iter()
            .flatten()
            .filter_map(|(year, weight)| year.trim().parse::<i32>().ok().map(|year| (year, *weight)))
    }

    pub fn has_evolution(&self) -> bool {
        self.evolution.as_ref().is_some_and(|entries| !entries.is_empty())
    }

    /// A link without temporal metadata is always current. Otherwise it is active once some
    /// year at or before the cutoff carries a positive weight.
    pub fn is_active_at(&self, year: Option<i32>) -> bool {
        let Some(cutoff) = year else {
            return true;
        };

        if !self.has_evolution() {
            return true;
        }

        self.evolution_entries()
            .any(|(entry_year, weight)| entry_year <= cutoff && weight > 0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl GraphData {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn node_types(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .filter(|node| seen.insert(node.node_type.as_str()))
            .map(|node| node.node_type.clone())
            .collect()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|relationship| relationship.id == id)
    }

    pub fn year_range(&self) -> YearRange {
        let mut years = self
            .relationships
            .iter()
            .flat_map(Relationship::evolution_entries)
            .filter(|(_, weight)| *weight > 0.0)
            .map(|(year, _)| year);

        let Some(first) = years.next() else {
            return DEFAULT_YEAR_RANGE;
        };

        let (min, max) = years.fold((first, first), |(min, max), year| {
            (min.min(year), max.max(year))
        });
        YearRange { min, max }
    }
}

fn nullable_map<'de, D>(deserializer: D) -> Result<Properties, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Properties>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_weight<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

// A null or non-numeric weight keeps its year but never activates the link.
fn numeric_evolution<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, f64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(raw) = Option::<BTreeMap<String, Value>>::deserialize(deserializer)? else {
        return Ok(None);
    };

    Ok(Some(
        raw.into_iter()
            .map(|(year, weight)| (year, weight.as_f64().unwrap_or_default()))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relationship_with(evolution: &[(&str, f64)]) -> Relationship {
        Relationship {
            id: "r".to_owned(),
            source: "a".to_owned(),
            target: "b".to_owned(),
            evolution: Some(
                evolution
                    .iter()
                    .map(|(year, weight)| ((*year).to_owned(), *weight))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn activation_requires_positive_weight_at_or_before_cutoff() {
        let relationship = relationship_with(&[("2020", 1.0), ("2023", 0.0)]);
        assert!(relationship.is_active_at(Some(2021)));
        assert!(relationship.is_active_at(Some(2020)));
        assert!(!relationship.is_active_at(Some(2019)));
        assert!(relationship.is_active_at(None));
    }

    #[test]
    fn zero_weight_years_never_activate() {
        let relationship = relationship_with(&[("2018", 0.0), ("2022", 2.5)]);
        assert!(!relationship.is_active_at(Some(2021)));
        assert!(relationship.is_active_at(Some(2022)));
    }

    #[test]
    fn missing_or_empty_evolution_is_always_active() {
        let mut relationship = relationship_with(&[]);
        assert!(relationship.is_active_at(Some(1900)));
        relationship.evolution = None;
        assert!(relationship.is_active_at(Some(1900)));
        assert!(relationship.is_active_at(None));
    }

    #[test]
    fn malformed_year_keys_are_ignored() {
        let relationship = relationship_with(&[("soon", 1.0), ("2024", 1.0)]);
        assert!(!relationship.is_active_at(Some(2023)));
        assert!(relationship.is_active_at(Some(2024)));
    }

    #[test]
    fn year_range_spans_positive_weights_only() {
        let data = GraphData {
            nodes: Vec::new(),
            relationships: vec![
                relationship_with(&[("2015", 0.0), ("2018", 1.0)]),
                relationship_with(&[("2022", 3.0), ("2030", 0.0)]),
            ],
        };
        assert_eq!(data.year_range(), YearRange { min: 2018, max: 2022 });
    }

    #[test]
    fn year_range_falls_back_without_evolution_data() {
        let data = GraphData {
            nodes: Vec::new(),
            relationships: vec![relationship_with(&[]), relationship_with(&[("2021", 0.0)])],
        };
        assert_eq!(data.year_range(), DEFAULT_YEAR_RANGE);
    }

    #[test]
    fn node_types_keep_first_appearance_order() {
        let data: GraphData = serde_json::from_str(
            r#"{"nodes":[
                {"id":"1","type":"gene","name":"A"},
                {"id":"2","type":"disease","name":"B"},
                {"id":"3","type":"gene","name":"C"}
            ]}"#,
        )
        .expect("valid graph json");
        assert_eq!(data.node_types(), vec!["gene".to_owned(), "disease".to_owned()]);
        assert!(data.relationships.is_empty());
    }

    #[test]
    fn deserializes_null_properties_and_missing_names() {
        let data: GraphData = serde_json::from_str(
            r#"{"nodes":[{"id":"n1","type":"drug","properties":null}],
                "relationships":[{"id":"r1","source":"n1","target":"n2","relation":"treats",
                                  "weightage":0.5,"evolution":{"2021":1}}]}"#,
        )
        .expect("valid graph json");
        assert_eq!(data.nodes[0].display_name(), "n1");
        assert!(data.nodes[0].properties.is_empty());
        assert!(data.relationships[0].has_evolution());
        assert_eq!(data.relationships[0].weightage, 0.5);
    }

    #[test]
    fn null_weights_are_tolerated() {
        let data: GraphData = serde_json::from_str(
            r#"{"nodes":[{"id":"a","type":"gene"},{"id":"b","type":"gene"}],
                "relationships":[
                    {"id":"r1","source":"a","target":"b","weightage":null,
                     "evolution":{"2019":null,"2021":"high","2022":2}},
                    {"id":"r2","source":"b","target":"a","evolution":{"2020":null}},
                    {"id":"r3","source":"a","target":"b","evolution":null}]}"#,
        )
        .expect("null weights do not reject the payload");

        let first = &data.relationships[0];
        assert_eq!(first.weightage, 0.0);
        assert_eq!(
            first.evolution_entries().collect::<Vec<_>>(),
            vec![(2019, 0.0), (2021, 0.0), (2022, 2.0)]
        );
        assert!(!first.is_active_at(Some(2021)));
        assert!(first.is_active_at(Some(2022)));

        assert!(data.relationships[1].has_evolution());
        assert!(!data.relationships[1].is_active_at(Some(2020)));
        assert_eq!(data.relationships[2].evolution, None);
        assert_eq!(data.year_range(), YearRange { min: 2022, max: 2022 });
    }
}
