use eframe::egui::{RichText, Ui};

use crate::util::format_percent;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Source Details");
        ui.add_space(6.0);

        let Some(index) = self.pinned else {
            ui.label("Click a bubble or a labelled source to pin it here.");
            return;
        };

        let Some(point) = self.session.dataset().points.get(index) else {
            ui.label("Pinned source is no longer in the data.");
            return;
        };

        let config = self.session.config();
        let signed = config.variant.is_signed();
        let active_key = self.session.active_key();

        ui.label(RichText::new(point.source.as_str()).strong());
        if let Some(radius) = self.session.radius(index) {
            ui.small(format!("bubble radius {radius:.1}px"));
        }
        ui.add_space(6.0);

        for key in config.ordered_keys(&self.session.dataset().schema) {
            let value = match point.value(key) {
                Some(value) => format_percent(value, signed),
                None => "n/a".to_owned(),
            };
            let line = format!("{}: {value}", config.display_name(key));
            if key == active_key {
                ui.label(RichText::new(line).strong());
            } else {
                ui.label(line);
            }
        }

        ui.separator();
        let labels = self.session.labels();
        let reason = if labels.static_ids.contains(&point.source) {
            "Labelled: among the largest overall values."
        } else if labels.top_ids.contains(&point.source) {
            "Labelled: among the highest values for this group."
        } else if labels.bottom_ids.contains(&point.source) {
            "Labelled: among the lowest values for this group."
        } else {
            "Not labelled for this group."
        };
        ui.label(reason);

        if ui.button("Unpin").clicked() {
            self.set_pinned(None);
        }
    }
}
