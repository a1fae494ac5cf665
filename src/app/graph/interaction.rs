use eframe::egui::{self, PointerButton, Pos2, Rect, Ui};
use tracing::debug;

use super::super::interaction::{PointerTarget, target_at, zoom_at};
use super::super::render_utils::{screen_to_world, world_to_screen};
use super::super::{CanvasDrag, ViewModel};
use super::view::NODE_RADIUS;

const EDGE_HIT_TOLERANCE: f32 = 6.0;

impl ViewModel {
    pub(in crate::app) fn update_screen_positions(&mut self, rect: Rect) {
        let (pan, zoom) = (self.pan, self.zoom);
        self.screen_positions.clear();
        self.screen_positions.extend(
            self.layout
                .nodes()
                .iter()
                .map(|node| world_to_screen(rect, pan, zoom, node.position)),
        );
    }

    pub(in crate::app) fn pointer_target(&self, pointer: Pos2) -> PointerTarget {
        target_at(
            &self.layout,
            &self.screen_positions,
            pointer,
            (NODE_RADIUS * self.zoom).max(4.0),
            EDGE_HIT_TOLERANCE,
        )
    }

    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        (self.pan, self.zoom) = zoom_at(rect, self.pan, self.zoom, pointer, factor);
    }

    /// Primary drag grabs the node under the press point, or pans when there is none.
    /// Secondary and middle drags always pan.
    pub(in crate::app) fn handle_graph_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if response.drag_started_by(PointerButton::Primary) {
            let origin = ui
                .input(|input| input.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos());
            let grabbed = match origin.map(|origin| self.pointer_target(origin)) {
                Some(PointerTarget::Node(id)) => self.layout.begin_drag(&id),
                _ => false,
            };
            self.canvas_drag = Some(if grabbed {
                CanvasDrag::Node
            } else {
                CanvasDrag::Pan
            });
        }

        if response.dragged_by(PointerButton::Primary) {
            match self.canvas_drag {
                Some(CanvasDrag::Node) => {
                    if let Some(pointer) = response.interact_pointer_pos() {
                        let world = screen_to_world(rect, self.pan, self.zoom, pointer);
                        self.layout.drag_to(world);
                    }
                }
                _ => self.pan += response.drag_delta(),
            }
        }

        if response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }

        if response.drag_stopped() && self.canvas_drag.take() == Some(CanvasDrag::Node) {
            self.layout.end_drag();
        }
    }

    pub(in crate::app) fn handle_graph_click(&mut self, response: &egui::Response) {
        if !response.clicked_by(PointerButton::Primary) {
            return;
        }

        let Some(pointer) = response.interact_pointer_pos() else {
            return;
        };

        let target = self.pointer_target(pointer);
        if self.selection.click(target, pointer) {
            debug!(
                selection = ?self.selection.current(),
                revision = self.selection.revision(),
                "selection changed"
            );
        }
    }
}
