use eframe::egui::{
    self, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Shape, Stroke, Ui, vec2,
};

use crate::config::NodePalette;
use crate::util::truncate_label;

use super::super::ViewModel;
use super::super::interaction::PointerTarget;
use super::super::render_utils::{
    arrowhead, blend_color, circle_visible, dim_color, draw_background, edge_visible, with_opacity,
};

pub(in crate::app) const NODE_RADIUS: f32 = 20.0;
const LABEL_OFFSET: f32 = 30.0;
const ARROW_LENGTH: f32 = 10.0;
const EDGE_WIDTH: f32 = 2.0;
const NODE_LABEL_CHARS: usize = 32;

pub(in crate::app) const ACTIVE_EDGE_COLOR: Color32 =
    Color32::from_rgba_premultiplied(153, 153, 153, 153);
pub(in crate::app) const INACTIVE_EDGE_COLOR: Color32 =
    Color32::from_rgba_premultiplied(20, 20, 20, 77);
const ACTIVE_ARROW_COLOR: Color32 = Color32::from_rgb(0x99, 0x99, 0x99);
const INACTIVE_ARROW_COLOR: Color32 = Color32::from_rgb(0x44, 0x44, 0x44);
const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const SEARCH_MATCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);
const LABEL_COLOR: Color32 = Color32::from_gray(236);

fn draw_edge_label(painter: &Painter, center: Pos2, text: &str, font: FontId, opacity: f32) {
    let galley = painter.layout_no_wrap(text.to_owned(), font, with_opacity(LABEL_COLOR, opacity));
    let padding = vec2(4.0, 2.0);
    let background = Rect::from_center_size(center, galley.size()).expand2(padding);

    painter.rect_filled(
        background,
        3.0,
        with_opacity(Color32::from_rgb(24, 28, 36), 0.85 * opacity),
    );
    painter.galley(background.min + padding, galley, LABEL_COLOR);
}

impl ViewModel {
    /// Input first, then one layout tick, then paint.
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui, palette: &NodePalette) -> Rect {
        self.apply_pending_filter();

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.update_screen_positions(rect);
        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_drag(ui, rect, &response);
        self.handle_graph_click(&response);
        self.update_hover_cursor(ui, &response);

        let mut animating = response.dragged();
        if self.live_physics || self.layout.dragging().is_some() {
            animating |= self.layout.tick();
        }
        if animating {
            ui.ctx().request_repaint();
        }

        self.update_screen_positions(rect);

        if self.layout.nodes().is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No nodes match the current filters.",
                FontId::proportional(15.0),
                Color32::from_gray(200),
            );
            return rect;
        }

        let search_matches = self.search_matches();
        let zoom = self.zoom;
        let node_radius = NODE_RADIUS * zoom;
        let edge_width = (EDGE_WIDTH * zoom).clamp(0.75, 4.0);
        let arrow_length = (ARROW_LENGTH * zoom).clamp(4.0, 20.0);
        let font = FontId::proportional((12.0 * zoom).clamp(7.0, 24.0));
        let show_labels = zoom >= 0.35;

        for link in self.layout.links() {
            let (Some(&start), Some(&end)) = (
                self.screen_positions.get(link.source),
                self.screen_positions.get(link.target),
            ) else {
                continue;
            };
            if !edge_visible(rect, start, end, node_radius) {
                continue;
            }

            let is_selected =
                self.selection.current().edge_id() == Some(link.relationship_id.as_str());
            let (line_color, arrow_color) = if is_selected {
                (SELECTED_COLOR, SELECTED_COLOR)
            } else if link.is_active {
                (ACTIVE_EDGE_COLOR, ACTIVE_ARROW_COLOR)
            } else {
                (INACTIVE_EDGE_COLOR, INACTIVE_ARROW_COLOR)
            };

            let direction = end - start;
            let length = direction.length();
            let tip = if length > node_radius {
                end - direction * (node_radius / length)
            } else {
                end
            };

            let width = if is_selected { edge_width * 1.6 } else { edge_width };
            painter.line_segment([start, tip], Stroke::new(width, line_color));
            if length > node_radius * 2.0 + arrow_length {
                painter.add(Shape::convex_polygon(
                    arrowhead(tip, direction, arrow_length),
                    arrow_color,
                    Stroke::NONE,
                ));
            }

            if show_labels
                && let Some(relationship) = self.relationship_data(link.relationship)
                && !relationship.relation.is_empty()
            {
                let opacity = if link.is_active || is_selected { 1.0 } else { 0.5 };
                draw_edge_label(
                    &painter,
                    start + direction * 0.5,
                    &relationship.relation,
                    font.clone(),
                    opacity,
                );
            }
        }

        let outline = Stroke::new((1.5 * zoom).clamp(0.75, 3.0), Color32::WHITE);
        for (index, node) in self.layout.nodes().iter().enumerate() {
            let Some(&position) = self.screen_positions.get(index) else {
                continue;
            };
            if !circle_visible(rect, position, node_radius + LABEL_OFFSET * zoom) {
                continue;
            }
            let Some(data) = self.layout_node_data(index) else {
                continue;
            };

            let is_selected = self.selection.current().node_id() == Some(node.id.as_str());
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));
            let dimmed = search_matches.is_some() && !is_match;

            let base_color = palette.color_for(&data.node_type);
            let fill = if dimmed {
                dim_color(base_color, 0.35)
            } else {
                base_color
            };

            if is_selected {
                painter.circle_stroke(
                    position,
                    node_radius + (5.0 * zoom).max(3.0),
                    Stroke::new(3.0, SELECTED_COLOR),
                );
            }
            painter.circle_filled(position, node_radius, fill);
            painter.circle_stroke(position, node_radius, outline);
            if is_match {
                painter.circle_stroke(
                    position,
                    node_radius + (4.0 * zoom).max(2.5),
                    Stroke::new(2.0, blend_color(SEARCH_MATCH_COLOR, base_color, 0.2)),
                );
            }

            if show_labels {
                let label_color = if dimmed {
                    dim_color(LABEL_COLOR, 0.5)
                } else {
                    LABEL_COLOR
                };
                painter.text(
                    position + vec2(0.0, LABEL_OFFSET * zoom),
                    Align2::CENTER_CENTER,
                    truncate_label(data.display_name(), NODE_LABEL_CHARS),
                    font.clone(),
                    label_color,
                );
            }
        }

        rect
    }

    fn update_hover_cursor(&self, ui: &Ui, response: &egui::Response) {
        let cursor = if self.layout.dragging().is_some() {
            Some(egui::CursorIcon::Grabbing)
        } else {
            response
                .hover_pos()
                .and_then(|pointer| match self.pointer_target(pointer) {
                    PointerTarget::Node(_) => Some(egui::CursorIcon::Grab),
                    PointerTarget::Edge(_) => Some(egui::CursorIcon::PointingHand),
                    PointerTarget::Background => None,
                })
        };

        if let Some(cursor) = cursor {
            ui.output_mut(|output| {
                output.cursor_icon = cursor;
            });
        }
    }
}
