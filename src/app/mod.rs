use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{self, Context, Pos2, Vec2};

use crate::config::NodePalette;
use crate::graph::{GraphData, YearRange};
use crate::source::GraphSource;

mod filter;
mod graph;
mod interaction;
mod layout;
mod loader;
mod render_utils;
mod ui;

use filter::{FilterState, FilteredGraph};
use interaction::SelectionController;
use layout::{LayoutEngine, LayoutParams};
use loader::GraphLoader;

pub struct ExplorerApp {
    source: GraphSource,
    query: String,
    last_query: String,
    palette: NodePalette,
    seed: Option<u64>,
    loader: GraphLoader,
    state: AppState,
}

enum AppState {
    Prompt,
    Loading,
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: GraphData,
    node_types: Vec<String>,
    year_range: YearRange,
    filter: FilterState,
    evolution_enabled: bool,
    evolution_year: i32,
    /// `filtered.nodes[i]` is the data index of `layout.nodes()[i]`.
    filtered: FilteredGraph,
    layout: LayoutEngine,
    layout_params: LayoutParams,
    live_physics: bool,
    selection: SelectionController,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    pan: Vec2,
    zoom: f32,
    filter_dirty: bool,
    canvas_drag: Option<CanvasDrag>,
    screen_positions: Vec<Pos2>,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<HashSet<usize>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CanvasDrag {
    Pan,
    Node,
}

impl ExplorerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: GraphSource,
        initial_query: Option<String>,
        palette: NodePalette,
        seed: Option<u64>,
    ) -> Self {
        let mut app = Self {
            query: initial_query.clone().unwrap_or_default(),
            last_query: String::new(),
            source,
            palette,
            seed,
            loader: GraphLoader::default(),
            state: AppState::Prompt,
        };

        if initial_query.is_some() || !app.source.needs_query() {
            app.submit_query();
        }
        app
    }

    fn submit_query(&mut self) {
        self.last_query = self.query.trim().to_owned();
        self.loader
            .request(self.source.clone(), self.last_query.clone());

        if !matches!(self.state, AppState::Ready(_)) {
            self.state = AppState::Loading;
        }
    }

    fn retry(&mut self) {
        self.query = self.last_query.clone();
        self.submit_query();
    }

    fn apply_load_result(&mut self) {
        let Some(result) = self.loader.poll() else {
            return;
        };

        self.state = match result {
            Ok(graph) => AppState::Ready(Box::new(ViewModel::new(graph, self.seed))),
            Err(error) => AppState::Error(error),
        };
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.apply_load_result();

        let is_loading = self.loader.is_pending();
        if is_loading {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        let mut submitted = false;
        let mut retry = false;

        match &mut self.state {
            AppState::Ready(model) => {
                submitted = model.show(ctx, &mut self.query, &self.palette, is_loading);
            }
            AppState::Prompt => {
                egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
                    submitted = ui::query_bar(ui, &mut self.query, is_loading);
                });
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Enter a query to explore the knowledge graph.");
                        ui.label(self.source.describe());
                    });
                });
            }
            AppState::Loading => {
                egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
                    submitted = ui::query_bar(ui, &mut self.query, is_loading);
                });
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading knowledge graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
                    submitted = ui::query_bar(ui, &mut self.query, is_loading);
                });
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load knowledge graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui
                        .add_enabled(!is_loading, egui::Button::new("Retry"))
                        .clicked()
                    {
                        retry = true;
                    }
                });
            }
        }

        if retry {
            self.retry();
        } else if submitted {
            self.submit_query();
        }
    }
}
