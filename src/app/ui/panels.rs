use eframe::egui::{self, Context, Key, Rect, Ui, Vec2, vec2};

use crate::config::NodePalette;
use crate::graph::GraphData;

use super::super::filter::{FilterState, FilteredGraph};
use super::super::interaction::SelectionController;
use super::super::layout::{LayoutEngine, LayoutParams};
use super::super::ViewModel;

pub(in crate::app) fn query_bar(ui: &mut Ui, query: &mut String, is_loading: bool) -> bool {
    let mut submitted = false;

    ui.horizontal(|ui| {
        ui.heading("kg-explorer");
        ui.separator();

        let field = ui.add(
            egui::TextEdit::singleline(query)
                .hint_text("Enter a graph query")
                .desired_width(440.0),
        );
        if field.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter)) {
            submitted = true;
        }

        if ui
            .add_enabled(!is_loading, egui::Button::new("Run query"))
            .on_hover_text("Fetch a new graph for this query.")
            .clicked()
        {
            submitted = true;
        }
    });

    submitted
}

impl ViewModel {
    pub(in crate::app) fn new(graph: GraphData, seed: Option<u64>) -> Self {
        let node_types = graph.node_types();
        let year_range = graph.year_range();
        let filter = FilterState::showing_all(&graph);
        let layout_params = LayoutParams::default();

        let mut model = Self {
            graph,
            node_types,
            year_range,
            filter,
            evolution_enabled: false,
            evolution_year: year_range.max,
            filtered: FilteredGraph::default(),
            layout: LayoutEngine::new(layout_params, seed),
            layout_params,
            live_physics: true,
            selection: SelectionController::default(),
            search: String::new(),
            search_match_cache: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            filter_dirty: true,
            canvas_drag: None,
            screen_positions: Vec::new(),
        };
        model.refresh_filter();
        model
    }

    /// Returns whether a new query was submitted from the top bar.
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        query: &mut String,
        palette: &NodePalette,
        is_loading: bool,
    ) -> bool {
        let mut submitted = false;
        self.apply_pending_filter();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    submitted = query_bar(ui, query, is_loading);
                    ui.separator();
                    if ui
                        .button("Reset view")
                        .on_hover_text("Restore the default pan and zoom.")
                        .clicked()
                    {
                        self.reset_view();
                    }
                    if ui
                        .button("Reheat layout")
                        .on_hover_text("Restart the force simulation from the current positions.")
                        .clicked()
                    {
                        self.layout.restart();
                    }
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.draw_controls(ui, palette));
            });

        self.apply_pending_filter();

        egui::SidePanel::right("stats")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| self.draw_stats(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let canvas = self.draw_graph(ui, palette);
                if is_loading {
                    let corner = canvas.right_top() + vec2(-28.0, 28.0);
                    ui.put(
                        Rect::from_center_size(corner, Vec2::splat(24.0)),
                        egui::Spinner::new().size(22.0),
                    );
                }
            });

        self.draw_inspector(ctx);
        submitted
    }

    pub(in crate::app) fn reset_view(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }
}
