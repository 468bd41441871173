use std::path::PathBuf;

use anyhow::Result;
use eframe::egui::{self, Align, Context, Layout};

use crate::chart::{ChartConfig, ChartSession, KeySelection};
use crate::physics::LayoutState;
use crate::poll::Dataset;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(
        dataset: Dataset,
        config: ChartConfig,
        data_path: PathBuf,
        initial_key: Option<&str>,
    ) -> Result<Self> {
        let mut session = ChartSession::new(dataset, config)?;
        if let Some(key) = initial_key
            && session.select_key(key) == KeySelection::Ignored
        {
            tracing::warn!(key, "initial key is not in the data, keeping the default");
        }

        Ok(Self {
            session,
            data_path,
            search: String::new(),
            search_matches: None,
            pinned: None,
            tooltip: None,
            live_layout: true,
            show_legend: true,
        })
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, reload_requested: &mut bool, is_loading: bool) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("poll-bubbles");
                    ui.separator();
                    ui.label(format!("data: {}", self.data_path.display()));
                    ui.label(format!("points: {}", self.session.dataset().len()));
                    ui.label(format!(
                        "showing: {}",
                        self.session.config().display_name(self.session.active_key())
                    ));
                    let reload_button = ui.add_enabled(!is_loading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.layout_status_text());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(egui::Color32::WHITE))
            .show(ctx, |ui| self.draw_chart(ui));
    }

    fn layout_status_text(&self) -> String {
        let layout = self.session.layout();
        match self.session.layout_state() {
            LayoutState::Settling => format!("settling (alpha {:.3})", layout.alpha()),
            LayoutState::AtRest => format!(
                "at rest after {} ticks, {} restarts",
                layout.ticks(),
                layout.restarts()
            ),
        }
    }

    pub(in crate::app) fn set_pinned(&mut self, pinned: Option<usize>) {
        if self.pinned == pinned {
            return;
        }

        if let Some(index) = pinned
            && let Some(point) = self.session.dataset().points.get(index)
        {
            tracing::debug!(source = %point.source, "pinned point");
        }
        self.pinned = pinned;
    }

    pub(in crate::app) fn apply_key(&mut self, key: &str) {
        if self.session.select_key(key) == KeySelection::Applied
            && let Some(index) = self.session.hovered()
        {
            self.tooltip = self.session.tooltip(index);
        }
    }
}
