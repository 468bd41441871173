use eframe::egui::{self, Align2, Color32, FontId, RichText, Sense, Stroke, Ui, vec2};

use crate::util::tick_label;

use super::super::render_utils::{
    ChartFrame, circle_visible, dashed_circle, dashed_segment, with_alpha,
};
use super::super::ViewModel;

const LEGEND_OFFSET_FROM_RIGHT: f32 = 200.0;
const LEGEND_BASELINE_Y: f32 = 150.0;
const LEGEND_CAPTION_X: f32 = 70.0;
const LEGEND_CAPTION_Y: f32 = -60.0;

impl ViewModel {
    pub(in crate::app) fn draw_chart(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click());
        let painter = ui.painter_at(rect);

        let delta_secs = ui.input(|input| input.stable_dt).clamp(0.0, 0.1);
        if self.live_layout {
            self.session.tick();
        }
        let layout_moving = self.live_layout && self.session.layout().is_settling();
        let styles_moving = self.session.advance_styles(delta_secs);
        if layout_moving || styles_moving {
            ui.ctx().request_repaint();
        }

        let config = self.session.config();
        let frame = ChartFrame::fit(rect, config.width, config.height);

        let hovered = self.hovered_index(ui, rect, frame);
        self.update_hover(hovered);
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }
        self.handle_chart_click(&response, hovered);
        self.refresh_search_matches();

        self.draw_axis(&painter, frame);
        if self.show_legend {
            self.draw_size_legend(&painter, frame);
        }
        self.draw_bubbles(&painter, rect, frame);

        if let Some(tooltip) = self.tooltip.clone() {
            response.on_hover_ui_at_pointer(|ui| {
                ui.label(RichText::new(tooltip.source.as_str()).strong());
                ui.label(tooltip.detail_line());
                ui.label(
                    RichText::new(tooltip.overall_line())
                        .small()
                        .color(Color32::from_gray(102)),
                );
            });
        }
    }

    fn draw_axis(&self, painter: &egui::Painter, frame: ChartFrame) {
        let config = self.session.config();
        let scale = self.session.position_scale();
        let top = config.margin.top;
        let bottom = config.height - config.margin.bottom;

        let grid_stroke = Stroke::new(1.0, with_alpha(Color32::BLACK, 0.15));
        let label_color = with_alpha(Color32::BLACK, 0.7);
        let font = FontId::proportional(frame.length(14.0).max(8.0));

        for &tick in &config.grid_ticks {
            let x = scale.map(tick);
            dashed_segment(
                painter,
                frame.point(x, bottom),
                frame.point(x, top),
                grid_stroke,
                frame.length(2.0).max(1.0),
            );
            painter.line_segment(
                [frame.point(x, bottom), frame.point(x, bottom + 6.0)],
                Stroke::new(1.0, label_color),
            );
            painter.text(
                frame.point(x, bottom + 9.0),
                Align2::CENTER_TOP,
                tick_label(tick),
                font.clone(),
                label_color,
            );
        }

        let range = [scale.map(config.position_domain[0]), scale.map(config.position_domain[1])];
        painter.line_segment(
            [frame.point(range[0], bottom), frame.point(range[1], bottom)],
            Stroke::new(1.0, label_color),
        );

        if config.zero_line {
            let x = scale.map(0.0);
            painter.line_segment(
                [frame.point(x, bottom), frame.point(x, top)],
                Stroke::new(1.0, Color32::from_gray(0x33)),
            );
        }
    }

    /// Nested dotted reference circles sharing a bottom point, each labelled
    /// with its value, plus a caption to the right.
    fn draw_size_legend(&self, painter: &egui::Painter, frame: ChartFrame) {
        let config = self.session.config();
        let anchor_x = config.width - LEGEND_OFFSET_FROM_RIGHT;
        let anchor_y = LEGEND_BASELINE_Y;

        let ring = Stroke::new(1.0, Color32::from_gray(0xbb));
        let value_font = FontId::proportional(frame.length(10.0).max(7.0));
        for &value in &config.legend_values {
            let radius = self.session.legend_radius(value);
            dashed_circle(
                painter,
                frame.point(anchor_x, anchor_y - radius),
                frame.length(radius),
                ring,
                frame.length(2.0).max(1.0),
            );
            painter.text(
                frame.point(anchor_x, anchor_y - radius * 2.0 - 2.0),
                Align2::CENTER_BOTTOM,
                format!("{value}%"),
                value_font.clone(),
                Color32::from_gray(0x99),
            );
        }

        let caption_font = FontId::proportional(frame.length(11.0).max(7.0));
        let line_height = 11.0 * 1.2;
        for (line, text) in config.legend_caption.iter().enumerate() {
            painter.text(
                frame.point(
                    anchor_x + LEGEND_CAPTION_X,
                    anchor_y + LEGEND_CAPTION_Y + line as f32 * line_height,
                ),
                Align2::LEFT_BOTTOM,
                text,
                caption_font.clone(),
                Color32::from_gray(0x66),
            );
        }
    }

    fn draw_bubbles(&self, painter: &egui::Painter, rect: egui::Rect, frame: ChartFrame) {
        let search = self.search_matches.as_ref();
        let pinned_color = Color32::from_rgb(245, 170, 40);
        let match_color = Color32::from_rgb(40, 120, 220);

        for bubble in self.session.bubbles() {
            let position = frame.to_screen(bubble.position);
            let radius = frame.length(bubble.radius);
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let matched = search.map(|cache| cache.matches.get(bubble.index).copied().unwrap_or(false));
            let mut color = bubble.style.color();
            if matched == Some(false) {
                color = color.gamma_multiply(0.35);
            }

            painter.circle_filled(position, radius, color);
            if let Some(stroke) = bubble.stroke {
                painter.circle_stroke(
                    position,
                    radius,
                    Stroke::new(frame.length(stroke.width).max(1.0), stroke.color),
                );
            }
            if matched == Some(true) {
                painter.circle_stroke(position, radius + 2.0, Stroke::new(1.5, match_color));
            }
            if self.pinned == Some(bubble.index) {
                painter.circle_stroke(position, radius + 4.0, Stroke::new(2.0, pinned_color));
            }
        }

        let label_font = FontId::proportional(frame.length(11.0).max(7.0));
        let label_color = self.session.label_color();
        for bubble in self.session.bubbles().filter(|bubble| !bubble.label.is_empty()) {
            painter.text(
                frame.to_screen(bubble.position),
                Align2::CENTER_CENTER,
                bubble.label,
                label_font.clone(),
                label_color,
            );
        }

        if self.session.dataset().is_empty() {
            painter.text(
                rect.center() + vec2(0.0, -20.0),
                Align2::CENTER_CENTER,
                "No data points to show.",
                FontId::proportional(14.0),
                Color32::from_gray(90),
            );
        }
    }
}
