use anyhow::Result;
use eframe::egui::{Color32, Stroke, Vec2, vec2};
use serde::Serialize;

use crate::physics::{ForceLayout, LayoutState};
use crate::poll::{Dataset, Point};
use crate::util::format_percent;

use super::config::{ChartConfig, Variant};
use super::labels::{LabelSelector, LabelSet};
use super::scale::LinearScale;
use super::style::{PointStyle, StyleTransition, ValueStyling, hex_color};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySelection {
    Applied,
    Ignored,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tooltip {
    pub source: String,
    pub key_label: String,
    pub value_text: String,
    pub overall_caption: String,
    pub overall_text: String,
}

impl Tooltip {
    pub fn detail_line(&self) -> String {
        format!("{}: {}", self.key_label, self.value_text)
    }

    pub fn overall_line(&self) -> String {
        format!("({}: {})", self.overall_caption, self.overall_text)
    }
}

/// Hover callbacks the rendering surface invokes. The session answers with
/// data; drawing the tooltip and emphasis is left to the caller.
pub trait PointHover {
    fn on_point_enter(&mut self, source: &str) -> Option<Tooltip>;
    fn on_point_leave(&mut self, source: &str);
}

/// Everything the renderer needs to draw one bubble, in chart coordinates.
#[derive(Clone, Copy, Debug)]
pub struct BubbleView<'a> {
    pub index: usize,
    pub source: &'a str,
    pub position: Vec2,
    pub radius: f32,
    pub label: &'a str,
    pub style: PointStyle,
    pub stroke: Option<Stroke>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PointSnapshot {
    pub source: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub target_x: f32,
    pub label: String,
    pub fill: String,
    pub opacity: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct LayoutSnapshot {
    pub variant: Variant,
    pub active_key: String,
    pub ticks: u64,
    pub at_rest: bool,
    pub max_overlap: f32,
    pub labels: Vec<String>,
    pub points: Vec<PointSnapshot>,
}

/// One chart instance: the loaded points, the active key, and the label,
/// style and layout state derived from them.
pub struct ChartSession {
    dataset: Dataset,
    config: ChartConfig,
    position_scale: LinearScale,
    styling: ValueStyling,
    radii: Vec<f32>,
    selector: LabelSelector,
    labels: LabelSet,
    active_key: String,
    layout: ForceLayout,
    styles: StyleTransition,
    hovered: Option<usize>,
}

impl ChartSession {
    pub fn new(dataset: Dataset, config: ChartConfig) -> Result<Self> {
        let signed = config.variant.is_signed();
        let styling = ValueStyling {
            palette: config.palette.resolve()?,
            signed,
            opacity: config.opacity,
        };

        let magnitude_key = config.magnitude_key.clone();
        let magnitude = move |point: &Point| {
            let value = point.value_or_zero(&magnitude_key);
            if signed { value.abs() } else { value }
        };

        let radii = dataset
            .points
            .iter()
            .map(|point| config.magnitude.radius(magnitude(point) as f32))
            .collect::<Vec<_>>();
        let selector = LabelSelector::new(&dataset.points, config.labels, &magnitude);

        let active_key = initial_active_key(&dataset, &config);
        let labels = selector.compute(&dataset.points, &active_key);
        let initial_styles = dataset
            .points
            .iter()
            .map(|point| styling.style_for(point.value_or_zero(&active_key)))
            .collect();

        let center = vec2(config.width / 2.0, config.vertical_center());
        let layout = ForceLayout::new(dataset.len(), center, config.forces);

        let mut session = Self {
            position_scale: config.position_scale(),
            styling,
            radii,
            selector,
            labels,
            active_key,
            layout,
            styles: StyleTransition::settled(initial_styles),
            hovered: None,
            dataset,
            config,
        };
        session.restart_layout();

        tracing::info!(
            variant = ?session.config.variant,
            key = %session.active_key,
            points = session.dataset.len(),
            labels = session.labels.len(),
            "chart session ready"
        );

        Ok(session)
    }

    /// Makes `key` the active key: recomputes labels, restyles points and
    /// restarts the layout toward the new x targets. Keys absent from the data
    /// schema leave the session untouched.
    pub fn select_key(&mut self, key: &str) -> KeySelection {
        if !self.dataset.has_key(key) {
            tracing::warn!(
                key,
                known = ?self.dataset.schema,
                "ignoring selection of unknown attribute key"
            );
            return KeySelection::Ignored;
        }

        self.active_key = key.to_owned();
        self.labels = self.selector.compute(&self.dataset.points, &self.active_key);

        if self.styling.signed {
            let styles = self.target_styles();
            self.styles.retarget(styles);
        }

        self.layout.interrupt();
        self.restart_layout();

        tracing::info!(key, labels = self.labels.len(), "selected attribute key");
        KeySelection::Applied
    }

    fn target_styles(&self) -> Vec<PointStyle> {
        self.dataset
            .points
            .iter()
            .map(|point| self.styling.style_for(point.value_or_zero(&self.active_key)))
            .collect()
    }

    fn restart_layout(&mut self) {
        let targets = (0..self.dataset.len())
            .map(|index| self.target_x(index))
            .collect::<Vec<_>>();
        let radii = &self.radii;
        self.layout
            .restart(|index| targets[index], |index| radii[index]);
    }

    /// Advances the layout by one tick. `false` once it is at rest.
    pub fn tick(&mut self) -> bool {
        self.layout.tick()
    }

    pub fn run_to_rest(&mut self, max_ticks: usize) -> usize {
        self.layout.run_to_rest(max_ticks)
    }

    /// Advances the fill/opacity transition. `true` while it is still running.
    pub fn advance_styles(&mut self, delta_secs: f32) -> bool {
        self.styles.advance(delta_secs)
    }

    pub fn target_x(&self, index: usize) -> f32 {
        let value = self
            .dataset
            .points
            .get(index)
            .map(|point| point.value_or_zero(&self.active_key))
            .unwrap_or(0.0);
        self.position_scale.map(value as f32)
    }

    pub fn active_key(&self) -> &str {
        &self.active_key
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn layout(&self) -> &ForceLayout {
        &self.layout
    }

    pub fn layout_state(&self) -> LayoutState {
        self.layout.state()
    }

    pub fn position_scale(&self) -> LinearScale {
        self.position_scale
    }

    pub fn radius(&self, index: usize) -> Option<f32> {
        self.radii.get(index).copied()
    }

    /// Radius of a legend bubble for a magnitude value.
    pub fn legend_radius(&self, magnitude: f32) -> f32 {
        self.config.magnitude.radius(magnitude)
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn bubble(&self, index: usize) -> Option<BubbleView<'_>> {
        let point = self.dataset.points.get(index)?;
        let position = self.layout.position(index)?;
        let radius = self.radius(index)?;
        let hovered = self.hovered == Some(index);

        let mut style = self.styles.current(index)?;
        let stroke = if hovered {
            let palette = &self.styling.palette;
            if !self.styling.signed {
                style.fill = palette.hover_fill;
            }
            Some(Stroke::new(palette.hover_stroke_width, palette.hover_stroke))
        } else {
            None
        };

        Some(BubbleView {
            index,
            source: &point.source,
            position,
            radius,
            label: self.labels.text_for(point),
            style,
            stroke,
        })
    }

    pub fn bubbles(&self) -> impl Iterator<Item = BubbleView<'_>> {
        (0..self.dataset.len()).filter_map(|index| self.bubble(index))
    }

    pub fn label_color(&self) -> Color32 {
        self.styling.palette.label
    }

    /// Index of the bubble under `position` (chart coordinates), preferring
    /// the one whose centre is closest.
    pub fn hit_test(&self, position: Vec2) -> Option<usize> {
        self.layout
            .bodies()
            .iter()
            .enumerate()
            .filter_map(|(index, body)| {
                let distance = (body.position - position).length();
                let radius = self.radii.get(index).copied()?;
                (distance <= radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub fn tooltip(&self, index: usize) -> Option<Tooltip> {
        let point = self.dataset.points.get(index)?;
        let signed = self.styling.signed;
        let overall_key = &self.config.magnitude_key;

        let value_text = match point.value(&self.active_key) {
            Some(value) => format_percent(value, signed),
            None if signed => format_percent(0.0, signed),
            None => "n/a".to_owned(),
        };
        let overall_text = match point.value(overall_key) {
            Some(value) => format!("{value}%"),
            None => "?%".to_owned(),
        };

        Some(Tooltip {
            source: point.source.clone(),
            key_label: self.config.tooltip_key_label(&self.active_key).to_owned(),
            value_text,
            overall_caption: self.config.overall_caption.clone(),
            overall_text,
        })
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        let points = self
            .bubbles()
            .map(|bubble| {
                let style = self.styles.target(bubble.index).unwrap_or(bubble.style);
                PointSnapshot {
                    source: bubble.source.to_owned(),
                    x: bubble.position.x,
                    y: bubble.position.y,
                    radius: bubble.radius,
                    target_x: self
                        .layout
                        .targets_x()
                        .get(bubble.index)
                        .copied()
                        .unwrap_or_default(),
                    label: bubble.label.to_owned(),
                    fill: hex_color(style.fill),
                    opacity: style.opacity,
                }
            })
            .collect();

        let labels = self
            .dataset
            .sources()
            .filter(|source| self.labels.contains(source))
            .map(str::to_owned)
            .collect();

        LayoutSnapshot {
            variant: self.config.variant,
            active_key: self.active_key.clone(),
            ticks: self.layout.ticks(),
            at_rest: self.layout.state() == LayoutState::AtRest,
            max_overlap: self.layout.max_overlap(),
            labels,
            points,
        }
    }
}

impl PointHover for ChartSession {
    fn on_point_enter(&mut self, source: &str) -> Option<Tooltip> {
        let index = self.dataset.index_of(source)?;
        self.hovered = Some(index);
        self.tooltip(index)
    }

    fn on_point_leave(&mut self, source: &str) {
        if self.hovered.is_some() && self.hovered == self.dataset.index_of(source) {
            self.hovered = None;
        }
    }
}

fn initial_active_key(dataset: &Dataset, config: &ChartConfig) -> String {
    let requested = &config.initial_key;
    if dataset.schema.is_empty() || dataset.has_key(requested) {
        return requested.clone();
    }

    let fallback = if dataset.has_key(&config.magnitude_key) {
        config.magnitude_key.clone()
    } else {
        dataset.schema[0].clone()
    };
    tracing::warn!(
        key = %requested,
        fallback = %fallback,
        known = ?dataset.schema,
        "configured initial key is not in the data"
    );
    fallback
}
