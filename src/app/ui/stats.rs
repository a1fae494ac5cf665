use eframe::egui::{self, RichText, Sense, Stroke, Ui, vec2};

use super::super::ViewModel;
use super::super::graph::{ACTIVE_EDGE_COLOR, INACTIVE_EDGE_COLOR};

fn legend_line(ui: &mut Ui, color: egui::Color32, label: &str) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(vec2(28.0, 12.0), Sense::hover());
        ui.painter()
            .line_segment([rect.left_center(), rect.right_center()], Stroke::new(2.0, color));
        ui.label(label);
    });
}

impl ViewModel {
    pub(in crate::app) fn draw_stats(&self, ui: &mut Ui) {
        ui.heading("Statistics");
        ui.add_space(6.0);

        egui::Grid::new("graph_stats")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                let rows = [
                    ("Total Nodes", self.graph.node_count()),
                    ("Total Relationships", self.graph.relationship_count()),
                    ("Filtered Nodes", self.filtered.nodes.len()),
                    ("Active Relationships", self.filtered.active_link_count()),
                ];
                for (label, value) in rows {
                    ui.label(label);
                    ui.label(RichText::new(value.to_string()).strong());
                    ui.end_row();
                }

                if self.evolution_enabled {
                    ui.label("Evolution Year");
                    ui.label(RichText::new(self.evolution_year.to_string()).strong());
                    ui.end_row();
                }
            });

        if self.evolution_enabled {
            ui.add_space(8.0);
            legend_line(ui, ACTIVE_EDGE_COLOR, "Active relationship");
            legend_line(ui, INACTIVE_EDGE_COLOR, "Inactive relationship");
        }

        ui.separator();
        let status = if self.layout.dragging().is_some() {
            "Layout: dragging".to_owned()
        } else if self.layout.is_running() {
            format!("Layout: settling (alpha {:.3})", self.layout.alpha())
        } else {
            "Layout: settled".to_owned()
        };
        ui.small(status);
    }
}
