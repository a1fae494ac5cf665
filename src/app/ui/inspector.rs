use eframe::egui::{self, Context, Order, RichText, Ui, Vec2, vec2};

use crate::graph::Properties;
use crate::util::{format_value, format_weight};

use super::super::ViewModel;
use super::super::interaction::Selection;

const INSPECTOR_OFFSET: Vec2 = vec2(20.0, 0.0);

fn properties_grid(ui: &mut Ui, salt: &str, properties: &Properties) {
    if properties.is_empty() {
        return;
    }

    ui.separator();
    egui::Grid::new(("inspector_properties", salt))
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            for (key, value) in properties {
                ui.label(RichText::new(key).strong());
                ui.label(format_value(value));
                ui.end_row();
            }
        });
}

impl ViewModel {
    /// Floating panel next to the point where the current selection was clicked.
    pub(in crate::app) fn draw_inspector(&self, ctx: &Context) {
        let anchor = match self.selection.current() {
            Selection::None => return,
            Selection::Node { anchor, .. } | Selection::Edge { anchor, .. } => *anchor,
        };

        egui::Area::new(egui::Id::new("selection_inspector"))
            .order(Order::Foreground)
            .fixed_pos(anchor + INSPECTOR_OFFSET)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(320.0);
                    match self.selection.current() {
                        Selection::Node { id, .. } => self.node_details(ui, id),
                        Selection::Edge { id, .. } => self.edge_details(ui, id),
                        Selection::None => {}
                    }
                });
            });
    }

    fn node_details(&self, ui: &mut Ui, id: &str) {
        let Some(node) = self.graph.node(id) else {
            ui.label("Selected node is no longer in the graph.");
            return;
        };

        ui.label(RichText::new(node.display_name()).heading());
        ui.label(format!("Type: {}", node.node_type));
        ui.small(format!("ID: {}", node.id));
        properties_grid(ui, id, &node.properties);
    }

    fn edge_details(&self, ui: &mut Ui, id: &str) {
        let Some(relationship) = self.graph.relationship(id) else {
            ui.label("Selected relationship is no longer in the graph.");
            return;
        };

        let endpoint_name = |endpoint: &str| {
            self.graph
                .node(endpoint)
                .map_or_else(|| endpoint.to_owned(), |node| node.display_name().to_owned())
        };

        let title = if relationship.relation.is_empty() {
            "Relationship"
        } else {
            relationship.relation.as_str()
        };
        ui.label(RichText::new(title).heading());
        ui.label(format!("From: {}", endpoint_name(&relationship.source)));
        ui.label(format!("To: {}", endpoint_name(&relationship.target)));
        ui.label(format!("Weightage: {}", format_weight(relationship.weightage)));

        if relationship.has_evolution() {
            ui.separator();
            ui.label(RichText::new("Evolution").strong());
            for (year, weight) in relationship.evolution.iter().flatten() {
                ui.label(format!("{year}: {}", format_weight(*weight)));
            }
            if let Some(year) = self.filter.evolution_year {
                let state = if relationship.is_active_at(Some(year)) {
                    "active"
                } else {
                    "inactive"
                };
                ui.small(format!("{state} as of {year}"));
            }
        }

        properties_grid(ui, id, &relationship.properties);
    }
}
