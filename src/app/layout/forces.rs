use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;
use super::{LayoutLink, LayoutNode};

/// Direction used when two points coincide, so overlapping nodes still separate.
fn separation_hint(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

/// Springs pull each link toward `distance`, weighted so the lower-degree endpoint moves more.
pub(super) fn apply_link_force(
    nodes: &mut [LayoutNode],
    links: &[LayoutLink],
    degrees: &[usize],
    distance: f32,
    alpha: f32,
) {
    for link in links {
        let (source, target) = (link.source, link.target);
        if source == target || source >= nodes.len() || target >= nodes.len() {
            continue;
        }

        let source_degree = degrees[source].max(1) as f32;
        let target_degree = degrees[target].max(1) as f32;
        let strength = 1.0 / source_degree.min(target_degree);
        let bias = source_degree / (source_degree + target_degree);

        let mut delta = (nodes[target].position + nodes[target].velocity)
            - (nodes[source].position + nodes[source].velocity);
        if delta.length_sq() <= 1e-12 {
            delta = separation_hint(source, target) * 1e-3;
        }
        let length = delta.length();
        let correction = delta * ((length - distance) / length * alpha * strength);

        nodes[target].velocity -= correction * bias;
        nodes[source].velocity += correction * (1.0 - bias);
    }
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) strength: f32,
    pub(super) theta: f32,
    pub(super) min_distance_sq: f32,
}

fn charge_from(point: Vec2, other: Vec2, weight: f32, min_distance_sq: f32, hint: Vec2) -> Vec2 {
    let mut delta = other - point;
    let mut distance_sq = delta.length_sq();
    if distance_sq <= 1e-12 {
        delta = hint * 1e-3;
        distance_sq = delta.length_sq();
    }
    if distance_sq < min_distance_sq {
        distance_sq = (min_distance_sq * distance_sq).sqrt();
    }
    delta * (weight / distance_sq)
}

pub(super) fn accumulate_charge_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    velocity: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            *velocity += charge_from(
                point,
                positions[other_index],
                params.strength,
                params.min_distance_sq,
                separation_hint(index, other_index),
            );
        }
        return;
    }

    let distance = (node.center_of_mass - point).length().max(1e-4);
    let can_approximate = !node.bounds.contains(point)
        && (node.bounds.side_length() / distance) < params.theta
        && node.mass > 1.0;

    if can_approximate {
        *velocity += charge_from(
            point,
            node.center_of_mass,
            params.strength * node.mass,
            params.min_distance_sq,
            separation_hint(index, 0),
        );
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_charge_for_node(child, index, positions, params, velocity);
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) radius: f32,
    pub(super) strength: f32,
}

fn resolve_overlap(
    from: usize,
    to: usize,
    predicted: &[Vec2],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    let min_distance = params.radius * 2.0;
    let mut offset = predicted[from] - predicted[to];
    let mut distance_sq = offset.length_sq();
    if distance_sq >= min_distance * min_distance {
        return;
    }
    if distance_sq <= 1e-12 {
        offset = separation_hint(from, to) * 1e-3;
        distance_sq = offset.length_sq();
    }

    let distance = distance_sq.sqrt();
    let push = offset * ((min_distance - distance) / distance * params.strength * 0.5);
    deltas[from] += push;
    deltas[to] -= push;
}

/// Visits every pair of cells closer than one collision diameter and separates overlapping
/// points. Positions are the predicted `position + velocity`.
pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    predicted: &[Vec2],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    let reach = params.radius * 2.0;
    if node_a.bounds.distance_sq_to(node_b.bounds) > reach * reach {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    resolve_overlap(from, to, predicted, params, deltas);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    resolve_overlap(from, to, predicted, params, deltas);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_deref() else {
                continue;
            };

            accumulate_collision_pairs(child_a, child_a, true, predicted, params, deltas);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_deref() else {
                    continue;
                };
                accumulate_collision_pairs(child_a, child_b, false, predicted, params, deltas);
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            accumulate_collision_pairs(child, node_b, false, predicted, params, deltas);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            accumulate_collision_pairs(node_a, child, false, predicted, params, deltas);
        }
    }
}

/// Translates free nodes so the centroid of all nodes moves toward `center`.
pub(super) fn apply_center_force(nodes: &mut [LayoutNode], center: Vec2, strength: f32) {
    if nodes.is_empty() {
        return;
    }

    let centroid = nodes
        .iter()
        .fold(Vec2::ZERO, |sum, node| sum + node.position)
        / nodes.len() as f32;
    let shift = (centroid - center) * strength;
    if shift.length_sq() <= 1e-12 {
        return;
    }

    for node in nodes.iter_mut().filter(|node| node.pinned.is_none()) {
        node.position -= shift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free_node(id: &str, position: Vec2) -> LayoutNode {
        LayoutNode {
            id: id.to_owned(),
            position,
            velocity: Vec2::ZERO,
            pinned: None,
        }
    }

    #[test]
    fn stretched_link_pulls_endpoints_together() {
        let mut nodes = vec![free_node("a", Vec2::ZERO), free_node("b", vec2(400.0, 0.0))];
        let links = vec![LayoutLink {
            relationship: 0,
            relationship_id: "r".to_owned(),
            source: 0,
            target: 1,
            is_active: true,
        }];

        apply_link_force(&mut nodes, &links, &[1, 1], 200.0, 1.0);
        assert!(nodes[0].velocity.x > 0.0);
        assert!(nodes[1].velocity.x < 0.0);
        assert!((nodes[0].velocity.x + nodes[1].velocity.x).abs() < 1e-3);
    }

    #[test]
    fn negative_charge_repels() {
        let positions = vec![Vec2::ZERO, vec2(10.0, 0.0)];
        let tree = QuadNode::build(&positions).expect("tree");
        let params = ChargeParams {
            strength: -1000.0,
            theta: 0.9,
            min_distance_sq: 1.0,
        };

        let mut velocity = Vec2::ZERO;
        accumulate_charge_for_node(&tree, 0, &positions, params, &mut velocity);
        assert!(velocity.x < 0.0);
        assert!(velocity.y.abs() < 1e-4);
    }

    #[test]
    fn barnes_hut_matches_exact_sum_far_away() {
        let mut positions = (0..40)
            .map(|index| vec2((index % 8) as f32 * 3.0, (index / 8) as f32 * 3.0))
            .collect::<Vec<_>>();
        positions.push(vec2(5_000.0, 0.0));
        let probe = positions.len() - 1;
        let tree = QuadNode::build(&positions).expect("tree");
        let params = ChargeParams {
            strength: -1000.0,
            theta: 0.9,
            min_distance_sq: 1.0,
        };

        let mut approximate = Vec2::ZERO;
        accumulate_charge_for_node(&tree, probe, &positions, params, &mut approximate);

        let exact = (0..probe).fold(Vec2::ZERO, |sum, other| {
            sum + charge_from(
                positions[probe],
                positions[other],
                params.strength,
                params.min_distance_sq,
                Vec2::X,
            )
        });
        assert!((approximate - exact).length() / exact.length() < 0.05);
    }

    #[test]
    fn overlapping_nodes_are_pushed_apart() {
        let predicted = vec![Vec2::ZERO, vec2(20.0, 0.0), vec2(1_000.0, 0.0)];
        let tree = QuadNode::build(&predicted).expect("tree");
        let mut deltas = vec![Vec2::ZERO; predicted.len()];
        accumulate_collision_pairs(
            &tree,
            &tree,
            true,
            &predicted,
            CollisionParams {
                radius: 50.0,
                strength: 1.0,
            },
            &mut deltas,
        );

        assert!(deltas[0].x < 0.0);
        assert!(deltas[1].x > 0.0);
        assert_eq!(deltas[2], Vec2::ZERO);
        assert!(((deltas[1].x - deltas[0].x) - 80.0).abs() < 1e-3);
    }

    #[test]
    fn centering_skips_pinned_nodes() {
        let mut nodes = vec![
            free_node("a", vec2(100.0, 100.0)),
            LayoutNode {
                pinned: Some(vec2(300.0, 100.0)),
                ..free_node("b", vec2(300.0, 100.0))
            },
        ];

        apply_center_force(&mut nodes, Vec2::ZERO, 1.0);
        assert_eq!(nodes[0].position, vec2(-100.0, 0.0));
        assert_eq!(nodes[1].position, vec2(300.0, 100.0));
    }
}
