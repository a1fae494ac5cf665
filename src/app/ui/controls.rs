use eframe::egui::{self, RichText, Sense, Ui, vec2};

use crate::config::NodePalette;

use super::super::ViewModel;
use super::super::layout::LayoutParams;

fn color_swatch(ui: &mut Ui, color: egui::Color32) {
    let (rect, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
    ui.painter().circle_filled(rect.center(), 6.0, color);
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui, palette: &NodePalette) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search nodes")
            .on_hover_text("Fuzzy-highlight nodes by name without changing what is shown.");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Highlighting pauses while a node or edge is selected.");

        ui.separator();
        ui.label(RichText::new("Node types").strong());
        if self.node_types.is_empty() {
            ui.label("No nodes in this graph.");
        }
        for node_type in &self.node_types {
            let mut visible = self.filter.node_types.contains(node_type);
            let changed = ui
                .horizontal(|ui| {
                    color_swatch(ui, palette.color_for(node_type));
                    ui.checkbox(&mut visible, node_type.as_str()).changed()
                })
                .inner;
            if changed {
                self.filter.set_type_visible(node_type, visible);
                self.filter_dirty = true;
            }
        }

        ui.separator();
        ui.label(RichText::new("Evolution").strong());
        self.filter_dirty |= ui
            .checkbox(&mut self.evolution_enabled, "Filter by evolution year")
            .on_hover_text("Dim relationships that are not yet established by the chosen year.")
            .changed();

        ui.add_enabled_ui(self.evolution_enabled, |ui| {
            let range = self.year_range;
            ui.horizontal(|ui| {
                self.filter_dirty |= ui
                    .add(egui::Slider::new(&mut self.evolution_year, range.min..=range.max).text("Year"))
                    .changed();
                if ui
                    .button("Reset")
                    .on_hover_text("Move the slider back to the latest year.")
                    .clicked()
                    && self.evolution_year != range.max
                {
                    self.evolution_year = range.max;
                    self.filter_dirty = true;
                }
            });
        });

        ui.separator();
        ui.checkbox(&mut self.live_physics, "Live physics simulation")
            .on_hover_text("Keep advancing the layout every frame until it settles.");

        ui.collapsing("Layout tuning", |ui| self.draw_layout_tuning(ui));
    }

    fn draw_layout_tuning(&mut self, ui: &mut Ui) {
        let params = &mut self.layout_params;

        ui.add(egui::Slider::new(&mut params.link_distance, 40.0..=600.0).text("Link distance"))
            .on_hover_text("Rest length of every relationship spring.");
        ui.add(egui::Slider::new(&mut params.charge_strength, -4000.0..=-50.0).text("Repulsion"))
            .on_hover_text("Many-body charge. More negative pushes nodes further apart.");
        ui.add(egui::Slider::new(&mut params.collision_radius, 0.0..=120.0).text("Collision radius"));
        ui.add(egui::Slider::new(&mut params.center_strength, 0.0..=1.0).text("Centering"));
        ui.add(egui::Slider::new(&mut params.velocity_decay, 0.05..=0.9).text("Velocity decay"))
            .on_hover_text("Friction applied to every node each tick.");
        ui.add(egui::Slider::new(&mut params.theta, 0.3..=1.5).text("Barnes-Hut theta"))
            .on_hover_text("Higher values approximate distant clusters more aggressively.");

        if ui.button("Restore defaults").clicked() {
            *params = LayoutParams::default();
        }

        self.layout.set_params(self.layout_params);
    }
}
