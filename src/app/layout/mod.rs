mod forces;
mod quadtree;

use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::graph::GraphData;

use super::filter::FilteredGraph;
use forces::{
    ChargeParams, CollisionParams, accumulate_charge_for_node, accumulate_collision_pairs,
    apply_center_force, apply_link_force,
};
use quadtree::QuadNode;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    pub link_distance: f32,
    pub charge_strength: f32,
    pub collision_radius: f32,
    pub collision_strength: f32,
    pub center_strength: f32,
    pub theta: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub velocity_decay: f32,
    pub drag_alpha_target: f32,
    pub seed_jitter: f32,
    pub settle_speed: f32,
    pub max_settle_ticks: usize,
}

impl Default for LayoutParams {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            link_distance: 200.0,
            charge_strength: -1000.0,
            collision_radius: 50.0,
            collision_strength: 1.0,
            center_strength: 1.0,
            theta: 0.9,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
            seed_jitter: 100.0,
            settle_speed: 1e-3,
            max_settle_ticks: 3_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub pinned: Option<Vec2>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutLink {
    pub relationship: usize,
    pub relationship_id: String,
    pub source: usize,
    pub target: usize,
    pub is_active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Same arena slots as before. Only activation flags changed.
    Refreshed,
    Rebuilt,
}

#[derive(Default)]
struct LayoutScratch {
    positions: Vec<Vec2>,
    predicted: Vec<Vec2>,
    deltas: Vec<Vec2>,
}

/// Owns every visible node's position. Everything else refers to nodes by id or arena slot
/// and reads through here, so removed nodes can never be reached.
pub struct LayoutEngine {
    params: LayoutParams,
    nodes: Vec<LayoutNode>,
    links: Vec<LayoutLink>,
    degrees: Vec<usize>,
    index_by_id: HashMap<String, usize>,
    center: Vec2,
    alpha: f32,
    alpha_target: f32,
    running: bool,
    settle_ticks: usize,
    dragging: Option<String>,
    rng: StdRng,
    scratch: LayoutScratch,
}

impl LayoutEngine {
    pub fn new(params: LayoutParams, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            params,
            nodes: Vec::new(),
            links: Vec::new(),
            degrees: Vec::new(),
            index_by_id: HashMap::new(),
            center: Vec2::ZERO,
            alpha: 1.0,
            alpha_target: 0.0,
            running: false,
            settle_ticks: 0,
            dragging: None,
            rng,
            scratch: LayoutScratch::default(),
        }
    }

    pub fn set_params(&mut self, params: LayoutParams) {
        if self.params != params {
            self.params = params;
            self.alpha = self.alpha.max(params.drag_alpha_target);
            self.wake();
        }
    }

    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[LayoutLink] {
        &self.links
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    #[cfg(test)]
    pub fn position(&self, id: &str) -> Option<Vec2> {
        self.node_index(id).map(|index| self.nodes[index].position)
    }

    pub fn contains_link(&self, relationship_id: &str) -> bool {
        self.links
            .iter()
            .any(|link| link.relationship_id == relationship_id)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    /// Brings the arena in line with a fresh filter result and reheats the simulation.
    /// Nodes that stay visible keep their position, velocity and pin. New nodes are seeded
    /// near the center.
    pub fn sync(&mut self, data: &GraphData, filtered: &FilteredGraph) -> SyncOutcome {
        let same_nodes = self.nodes.len() == filtered.nodes.len()
            && self
                .nodes
                .iter()
                .zip(&filtered.nodes)
                .all(|(node, &index)| node.id == data.nodes[index].id);
        let same_links = self.links.len() == filtered.links.len()
            && self
                .links
                .iter()
                .zip(&filtered.links)
                .all(|(link, filtered_link)| link.relationship == filtered_link.relationship);

        if same_nodes && same_links && !self.nodes.is_empty() {
            for (link, filtered_link) in self.links.iter_mut().zip(&filtered.links) {
                link.is_active = filtered_link.is_active;
            }
            self.restart();
            return SyncOutcome::Refreshed;
        }

        let mut prior = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect::<HashMap<_, _>>();

        let mut reused = 0usize;
        let mut nodes = Vec::with_capacity(filtered.nodes.len());
        for &data_index in &filtered.nodes {
            let id = &data.nodes[data_index].id;
            if let Some(node) = prior.remove(id) {
                reused += 1;
                nodes.push(node);
            } else {
                let position = self.seed_position();
                nodes.push(LayoutNode {
                    id: id.clone(),
                    position,
                    velocity: Vec2::ZERO,
                    pinned: None,
                });
            }
        }

        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect::<HashMap<_, _>>();

        let mut degrees = vec![0usize; nodes.len()];
        let mut links = Vec::with_capacity(filtered.links.len());
        for filtered_link in &filtered.links {
            let relationship = &data.relationships[filtered_link.relationship];
            let (Some(&source), Some(&target)) = (
                index_by_id.get(&relationship.source),
                index_by_id.get(&relationship.target),
            ) else {
                continue;
            };

            degrees[source] += 1;
            degrees[target] += 1;
            links.push(LayoutLink {
                relationship: filtered_link.relationship,
                relationship_id: relationship.id.clone(),
                source,
                target,
                is_active: filtered_link.is_active,
            });
        }

        if let Some(dragged) = &self.dragging
            && !index_by_id.contains_key(dragged)
        {
            debug!(node = %dragged, "dragged node was filtered out; releasing drag");
            self.dragging = None;
            self.alpha_target = 0.0;
        }

        debug!(
            nodes = nodes.len(),
            links = links.len(),
            reused,
            "rebuilt layout arena"
        );

        self.nodes = nodes;
        self.links = links;
        self.degrees = degrees;
        self.index_by_id = index_by_id;
        self.restart();
        SyncOutcome::Rebuilt
    }

    fn seed_position(&mut self) -> Vec2 {
        let jitter = self.params.seed_jitter.abs();
        self.center
            + vec2(
                self.rng.gen_range(-jitter..=jitter),
                self.rng.gen_range(-jitter..=jitter),
            )
    }

    pub fn restart(&mut self) {
        self.alpha = 1.0;
        self.wake();
    }

    fn wake(&mut self) {
        self.running = true;
        self.settle_ticks = 0;
    }

    pub fn begin_drag(&mut self, id: &str) -> bool {
        let Some(index) = self.node_index(id) else {
            return false;
        };

        let node = &mut self.nodes[index];
        node.pinned = Some(node.position);
        self.dragging = Some(id.to_owned());
        self.alpha_target = self.params.drag_alpha_target;
        self.wake();
        true
    }

    pub fn drag_to(&mut self, world: Vec2) {
        let Some(index) = self.dragging.as_deref().and_then(|id| self.node_index(id)) else {
            return;
        };

        self.nodes[index].pinned = Some(world);
        self.wake();
    }

    pub fn end_drag(&mut self) {
        if let Some(index) = self.dragging.take().and_then(|id| self.node_index(&id)) {
            self.nodes[index].pinned = None;
        }
        self.alpha_target = 0.0;
        self.wake();
    }

    /// Returns whether the simulation is still running after this step.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }

        if self.nodes.is_empty() {
            self.running = false;
            return false;
        }

        let params = self.params;
        self.alpha += (self.alpha_target - self.alpha) * params.alpha_decay;
        let alpha = self.alpha;

        apply_link_force(
            &mut self.nodes,
            &self.links,
            &self.degrees,
            params.link_distance,
            alpha,
        );
        self.apply_charge(alpha);
        self.apply_collision();
        apply_center_force(&mut self.nodes, self.center, params.center_strength);

        let mut max_speed_sq = 0.0_f32;
        for node in &mut self.nodes {
            if let Some(pinned) = node.pinned {
                node.position = pinned;
                node.velocity = Vec2::ZERO;
                continue;
            }

            node.velocity *= 1.0 - params.velocity_decay;
            if !node.velocity.x.is_finite() || !node.velocity.y.is_finite() {
                node.velocity = Vec2::ZERO;
            }
            node.position += node.velocity;
            max_speed_sq = max_speed_sq.max(node.velocity.length_sq());
        }

        let held = self.dragging.is_some() || self.alpha_target > params.alpha_min;
        if held {
            return true;
        }

        self.settle_ticks += 1;
        let settle_speed_sq = params.settle_speed * params.settle_speed;
        if self.alpha < params.alpha_min || max_speed_sq < settle_speed_sq {
            debug!(ticks = self.settle_ticks, "layout converged");
            self.running = false;
        } else if self.settle_ticks >= params.max_settle_ticks {
            warn!(
                ticks = self.settle_ticks,
                alpha = self.alpha,
                "layout hit its tick ceiling before converging"
            );
            self.running = false;
        }

        self.running
    }

    fn apply_charge(&mut self, alpha: f32) {
        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch
            .positions
            .extend(self.nodes.iter().map(|node| node.position));

        let Some(tree) = QuadNode::build(&scratch.positions) else {
            return;
        };

        let params = ChargeParams {
            strength: self.params.charge_strength * alpha,
            theta: self.params.theta,
            min_distance_sq: 1.0,
        };
        for (index, node) in self.nodes.iter_mut().enumerate() {
            accumulate_charge_for_node(&tree, index, &scratch.positions, params, &mut node.velocity);
        }
    }

    fn apply_collision(&mut self) {
        if self.params.collision_radius <= 0.0 {
            return;
        }

        let scratch = &mut self.scratch;
        scratch.predicted.clear();
        scratch.predicted.extend(
            self.nodes
                .iter()
                .map(|node| node.position + node.velocity),
        );
        scratch.deltas.clear();
        scratch.deltas.resize(self.nodes.len(), Vec2::ZERO);

        let Some(tree) = QuadNode::build(&scratch.predicted) else {
            return;
        };

        accumulate_collision_pairs(
            &tree,
            &tree,
            true,
            &scratch.predicted,
            CollisionParams {
                radius: self.params.collision_radius,
                strength: self.params.collision_strength,
            },
            &mut scratch.deltas,
        );

        for (node, delta) in self.nodes.iter_mut().zip(&scratch.deltas) {
            node.velocity += *delta;
        }
    }

    #[cfg(test)]
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0usize;
        while ticks < max_ticks && self.tick() {
            ticks += 1;
        }
        ticks
    }
}
