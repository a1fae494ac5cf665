use eframe::egui::{Pos2, Rect, Vec2};

use super::layout::LayoutEngine;
use super::render_utils::{distance_to_segment, screen_to_world};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 4.0;

/// What the inspector is showing. The anchor is the click point in canvas coordinates,
/// captured once so the panel does not follow later pans or zooms.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Selection {
    #[default]
    None,
    Node {
        id: String,
        anchor: Pos2,
    },
    Edge {
        id: String,
        anchor: Pos2,
    },
}

impl Selection {
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::Node { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn edge_id(&self) -> Option<&str> {
        match self {
            Self::Edge { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PointerTarget {
    Node(String),
    Edge(String),
    Background,
}

/// Click-driven selection. Each accepted click replaces the state in a single step and
/// bumps `revision`, so observers never see a transient `None` between two selections.
#[derive(Debug, Default)]
pub struct SelectionController {
    current: Selection,
    revision: u64,
}

impl SelectionController {
    pub fn current(&self) -> &Selection {
        &self.current
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn click(&mut self, target: PointerTarget, anchor: Pos2) -> bool {
        let next = match target {
            PointerTarget::Background => Selection::None,
            PointerTarget::Node(id) => {
                if self.current.node_id() == Some(id.as_str()) {
                    Selection::None
                } else {
                    Selection::Node { id, anchor }
                }
            }
            PointerTarget::Edge(id) => {
                if self.current.edge_id() == Some(id.as_str()) {
                    Selection::None
                } else {
                    Selection::Edge { id, anchor }
                }
            }
        };

        self.replace(next)
    }

    pub fn retain_visible(&mut self, layout: &LayoutEngine) -> bool {
        let visible = match &self.current {
            Selection::None => true,
            Selection::Node { id, .. } => layout.node_index(id).is_some(),
            Selection::Edge { id, .. } => layout.contains_link(id),
        };

        if visible {
            false
        } else {
            self.replace(Selection::None)
        }
    }

    fn replace(&mut self, next: Selection) -> bool {
        if self.current == next {
            return false;
        }

        self.current = next;
        self.revision = self.revision.wrapping_add(1);
        true
    }
}

/// Scales the view by `factor` while keeping the world point under `pointer` fixed.
/// Returns the new `(pan, zoom)`.
pub fn zoom_at(rect: Rect, pan: Vec2, zoom: f32, pointer: Pos2, factor: f32) -> (Vec2, f32) {
    let world = screen_to_world(rect, pan, zoom, pointer);
    let zoom = (zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    (pointer - rect.center() - world * zoom, zoom)
}

/// Topmost element under the pointer. Nodes are drawn over edges, so they win ties.
pub fn target_at(
    layout: &LayoutEngine,
    screen_positions: &[Pos2],
    pointer: Pos2,
    node_radius: f32,
    edge_tolerance: f32,
) -> PointerTarget {
    let node_hit = screen_positions
        .iter()
        .enumerate()
        .map(|(index, position)| (index, position.distance(pointer)))
        .filter(|(_, distance)| *distance <= node_radius)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    if let Some((index, _)) = node_hit
        && let Some(node) = layout.nodes().get(index)
    {
        return PointerTarget::Node(node.id.clone());
    }

    let edge_hit = layout
        .links()
        .iter()
        .filter_map(|link| {
            let start = *screen_positions.get(link.source)?;
            let end = *screen_positions.get(link.target)?;
            let distance = distance_to_segment(pointer, start, end);
            (distance <= edge_tolerance).then_some((link, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1));

    match edge_hit {
        Some((link, _)) => PointerTarget::Edge(link.relationship_id.clone()),
        None => PointerTarget::Background,
    }
}
