use eframe::egui::{self, RichText, Ui};

use super::super::ViewModel;

const SETTLE_TICK_LIMIT: usize = 1_000;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Chart Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Show values for")
            .on_hover_text("Move every bubble to its value for the chosen group.");

        let keys = {
            let config = self.session.config();
            config
                .ordered_keys(&self.session.dataset().schema)
                .into_iter()
                .map(|key| (key.to_owned(), config.display_name(key).to_owned()))
                .collect::<Vec<_>>()
        };

        let mut requested_key = None;
        ui.horizontal_wrapped(|ui| {
            for (key, label) in &keys {
                let active = self.session.active_key() == key;
                if ui.selectable_label(active, label.as_str()).clicked() && !active {
                    requested_key = Some(key.clone());
                }
            }
        });
        if let Some(key) = requested_key {
            self.apply_key(&key);
        }

        ui.separator();

        ui.label("Search (source name)")
            .on_hover_text("Fuzzy-highlight matching bubbles without changing the layout.");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Type to highlight matching sources, then click one to pin it.");

        ui.separator();

        ui.checkbox(&mut self.live_layout, "Live layout")
            .on_hover_text("Advance the layout one tick per frame while it settles.");
        ui.checkbox(&mut self.show_legend, "Size legend")
            .on_hover_text("Draw the bubble size legend in the chart corner.");

        let settling = self.session.layout().is_settling();
        if ui
            .add_enabled(settling, egui::Button::new("Settle now"))
            .on_hover_text("Run the remaining layout ticks immediately.")
            .clicked()
        {
            let ticks = self.session.run_to_rest(SETTLE_TICK_LIMIT);
            tracing::debug!(ticks, "settled layout on request");
        }

        ui.separator();
        self.draw_label_list(ui);
    }

    fn draw_label_list(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Labelled sources").strong());

        let labels = self.session.labels();
        if labels.is_empty() {
            ui.label("No labelled sources.");
            return;
        }

        let entries = self
            .session
            .dataset()
            .points
            .iter()
            .enumerate()
            .filter(|(_, point)| labels.contains(&point.source))
            .map(|(index, point)| {
                let mut tags = Vec::new();
                if labels.static_ids.contains(&point.source) {
                    tags.push("overall");
                }
                if labels.top_ids.contains(&point.source) {
                    tags.push("top");
                }
                if labels.bottom_ids.contains(&point.source) {
                    tags.push("bottom");
                }
                (index, format!("{}  [{}]", point.source, tags.join(", ")))
            })
            .collect::<Vec<_>>();

        let mut pin = None;
        egui::ScrollArea::vertical()
            .id_salt("label_list_scroll")
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for (index, text) in &entries {
                    let selected = self.pinned == Some(*index);
                    if ui.selectable_label(selected, text.as_str()).clicked() {
                        pin = Some(if selected { None } else { Some(*index) });
                    }
                }
            });

        if let Some(pin) = pin {
            self.set_pinned(pin);
        }
    }
}
