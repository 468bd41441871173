use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::physics::ForceTuning;

use super::scale::{LinearScale, MagnitudeScale, OpacityScale};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Share of respondents per source, positioned on 0..60%.
    Share,
    /// Signed difference against the reference sample, positioned on -15..15%.
    Difference,
}

impl Variant {
    pub fn is_signed(self) -> bool {
        matches!(self, Self::Difference)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    pub static_count: usize,
    pub dynamic_count: usize,
    pub include_bottom: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub fill: String,
    pub hover_fill: String,
    pub hover_stroke: String,
    pub hover_stroke_width: f32,
    pub positive_fill: String,
    pub negative_fill: String,
    pub label: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedPalette {
    pub fill: Color32,
    pub hover_fill: Color32,
    pub hover_stroke: Color32,
    pub hover_stroke_width: f32,
    pub positive_fill: Color32,
    pub negative_fill: Color32,
    pub label: Color32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyLabel {
    pub key: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub variant: Variant,
    pub width: f32,
    pub height: f32,
    pub margin: Margins,
    pub position_domain: [f32; 2],
    pub magnitude_key: String,
    pub magnitude: MagnitudeScale,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<OpacityScale>,
    pub initial_key: String,
    pub labels: LabelConfig,
    pub forces: ForceTuning,
    pub palette: Palette,
    pub grid_ticks: Vec<f32>,
    pub legend_values: Vec<f32>,
    pub legend_caption: Vec<String>,
    pub zero_line: bool,
    pub overall_caption: String,
    pub display_names: Vec<KeyLabel>,
    /// Tooltip caption for keys without a display name. The raw key is used
    /// when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unnamed_key_caption: Option<String>,
}

impl ChartConfig {
    pub fn preset(variant: Variant) -> Self {
        match variant {
            Variant::Share => Self::share(),
            Variant::Difference => Self::difference(),
        }
    }

    /// Builds the preset for `variant` and applies the TOML overrides in
    /// `path`, if any. Only the keys present in the file replace preset values.
    pub fn load(variant: Variant, path: Option<&Path>) -> Result<Self> {
        let preset = Self::preset(variant);
        let Some(path) = path else {
            return Ok(preset);
        };

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read chart config from {}", path.display()))?;
        let config = Self::with_overrides(preset, &raw)
            .with_context(|| format!("invalid chart config in {}", path.display()))?;

        tracing::info!(path = %path.display(), variant = ?config.variant, "applied chart config overrides");
        Ok(config)
    }

    pub fn with_overrides(preset: Self, raw: &str) -> Result<Self> {
        let overrides: toml::Table = toml::from_str(raw).context("config is not valid TOML")?;
        let mut base = match toml::Value::try_from(&preset).context("failed to encode preset")? {
            toml::Value::Table(table) => table,
            _ => return Err(anyhow!("chart preset did not encode as a table")),
        };

        merge_tables(&mut base, overrides);

        toml::Value::Table(base)
            .try_into::<Self>()
            .context("config overrides do not fit the chart settings")
    }

    pub fn position_scale(&self) -> LinearScale {
        LinearScale::new(
            self.position_domain,
            [self.margin.left, self.width - self.margin.right],
        )
    }

    pub fn vertical_center(&self) -> f32 {
        self.height / 2.0
    }

    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.configured_name(key).unwrap_or(key)
    }

    pub fn tooltip_key_label<'a>(&'a self, key: &'a str) -> &'a str {
        self.configured_name(key)
            .or(self.unnamed_key_caption.as_deref())
            .unwrap_or(key)
    }

    fn configured_name(&self, key: &str) -> Option<&str> {
        self.display_names
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.label.as_str())
    }

    /// Orders `schema` keys for display: configured names first, in their
    /// configured order, then any remaining keys as they appear in the data.
    pub fn ordered_keys<'a>(&self, schema: &'a [String]) -> Vec<&'a str> {
        let mut ordered = self
            .display_names
            .iter()
            .filter_map(|entry| schema.iter().find(|key| **key == entry.key))
            .map(String::as_str)
            .collect::<Vec<_>>();

        for key in schema {
            if !ordered.contains(&key.as_str()) {
                ordered.push(key.as_str());
            }
        }

        ordered
    }

    fn share() -> Self {
        Self {
            variant: Variant::Share,
            width: 900.0,
            height: 600.0,
            margin: Margins {
                top: 50.0,
                right: 50.0,
                bottom: 50.0,
                left: 50.0,
            },
            position_domain: [0.0, 60.0],
            magnitude_key: "overall".to_owned(),
            magnitude: MagnitudeScale::Linear {
                domain: [0.0, 35.0],
                range: [2.0, 50.0],
            },
            opacity: None,
            initial_key: "overall".to_owned(),
            labels: LabelConfig {
                static_count: 10,
                dynamic_count: 2,
                include_bottom: false,
            },
            forces: ForceTuning {
                x_strength: 0.5,
                y_strength: 0.08,
                collide_padding: 2.0,
            },
            palette: Palette {
                fill: "#69b3a2".to_owned(),
                hover_fill: "#4e8a7c".to_owned(),
                hover_stroke: "#333333".to_owned(),
                hover_stroke_width: 1.0,
                positive_fill: "#69b3a2".to_owned(),
                negative_fill: "#69b3a2".to_owned(),
                label: "#000000".to_owned(),
            },
            grid_ticks: vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0],
            legend_values: vec![5.0, 10.0, 20.0],
            legend_caption: vec![
                "Bubble size represents the".to_owned(),
                "magnitude of percent".to_owned(),
                "in the overall sample".to_owned(),
            ],
            zero_line: false,
            overall_caption: "Overall".to_owned(),
            unnamed_key_caption: None,
            display_names: display_names(&[
                ("overall", "Overall"),
                ("dem", "Democrats"),
                ("rep", "Republicans"),
                ("male", "Men"),
                ("female", "Women"),
                ("age18", "Ages 18-29"),
                ("age30", "Ages 30-49"),
                ("age50", "Ages 50-64"),
                ("age65", "Ages 65+"),
            ]),
        }
    }

    fn difference() -> Self {
        Self {
            variant: Variant::Difference,
            position_domain: [-15.0, 15.0],
            magnitude: MagnitudeScale::Sqrt {
                domain: [0.0, 20.0],
                range: [8.0, 50.0],
            },
            opacity: Some(OpacityScale {
                domain: [0.0, 20.0],
                range: [0.3, 1.0],
                threshold: 20.0,
            }),
            labels: LabelConfig {
                static_count: 10,
                dynamic_count: 2,
                include_bottom: true,
            },
            forces: ForceTuning {
                x_strength: 0.8,
                y_strength: 0.1,
                collide_padding: 2.0,
            },
            palette: Palette {
                fill: "#4CAF50".to_owned(),
                hover_fill: "#4CAF50".to_owned(),
                hover_stroke: "#000000".to_owned(),
                hover_stroke_width: 2.0,
                positive_fill: "#4CAF50".to_owned(),
                negative_fill: "#F44336".to_owned(),
                label: "#000000".to_owned(),
            },
            grid_ticks: vec![-15.0, -10.0, -5.0, 0.0, 5.0, 10.0, 15.0],
            legend_caption: vec![
                "Bubble size represents the".to_owned(),
                "magnitude of percent difference".to_owned(),
                "in the overall samples".to_owned(),
            ],
            zero_line: true,
            overall_caption: "Overall diff".to_owned(),
            unnamed_key_caption: Some("Value".to_owned()),
            display_names: display_names(&[
                ("overall", "All Adults"),
                ("dem", "Democrats"),
                ("rep", "Republicans"),
                ("age18", "Ages 18-29"),
                ("age30", "Ages 30-49"),
                ("age50", "Ages 50-64"),
                ("age65", "Ages 65+"),
            ]),
            ..Self::share()
        }
    }
}

impl Palette {
    pub fn resolve(&self) -> Result<ResolvedPalette> {
        Ok(ResolvedPalette {
            fill: parse_color(&self.fill)?,
            hover_fill: parse_color(&self.hover_fill)?,
            hover_stroke: parse_color(&self.hover_stroke)?,
            hover_stroke_width: self.hover_stroke_width,
            positive_fill: parse_color(&self.positive_fill)?,
            negative_fill: parse_color(&self.negative_fill)?,
            label: parse_color(&self.label)?,
        })
    }
}

fn parse_color(hex: &str) -> Result<Color32> {
    Color32::from_hex(hex).map_err(|error| anyhow!("invalid colour `{hex}`: {error:?}"))
}

fn display_names(pairs: &[(&str, &str)]) -> Vec<KeyLabel> {
    pairs
        .iter()
        .map(|(key, label)| KeyLabel {
            key: (*key).to_owned(),
            label: (*label).to_owned(),
        })
        .collect()
}

fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_chart_variants() {
        let share = ChartConfig::preset(Variant::Share);
        assert_eq!(share.position_domain, [0.0, 60.0]);
        assert!(share.opacity.is_none());
        assert!(!share.labels.include_bottom);
        assert_eq!(share.forces.x_strength, 0.5);

        let difference = ChartConfig::preset(Variant::Difference);
        assert_eq!(difference.position_domain, [-15.0, 15.0]);
        assert!(difference.opacity.is_some());
        assert!(difference.labels.include_bottom);
        assert!(difference.zero_line);
        assert_eq!(difference.width, share.width);
    }

    #[test]
    fn position_scale_spans_drawing_area() {
        let config = ChartConfig::preset(Variant::Share);
        let scale = config.position_scale();
        assert_eq!(scale.map(0.0), 50.0);
        assert_eq!(scale.map(60.0), 850.0);
        assert_eq!(config.vertical_center(), 300.0);
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let raw = r#"
            position_domain = [0.0, 80.0]

            [labels]
            static_count = 4

            [forces]
            x_strength = 0.7
        "#;

        let config =
            ChartConfig::with_overrides(ChartConfig::preset(Variant::Share), raw).expect("valid");
        assert_eq!(config.position_domain, [0.0, 80.0]);
        assert_eq!(config.labels.static_count, 4);
        assert_eq!(config.labels.dynamic_count, 2);
        assert_eq!(config.forces.x_strength, 0.7);
        assert_eq!(config.forces.y_strength, 0.08);
        assert_eq!(config.display_name("dem"), "Democrats");
    }

    #[test]
    fn overrides_with_wrong_types_are_rejected() {
        let result =
            ChartConfig::with_overrides(ChartConfig::preset(Variant::Share), "width = \"wide\"");
        assert!(result.is_err());
    }

    #[test]
    fn display_name_falls_back_to_key() {
        let config = ChartConfig::preset(Variant::Difference);
        assert_eq!(config.display_name("overall"), "All Adults");
        assert_eq!(config.display_name("male"), "male");
    }

    #[test]
    fn tooltip_label_for_unnamed_keys_depends_on_variant() {
        let share = ChartConfig::preset(Variant::Share);
        assert_eq!(share.tooltip_key_label("dem"), "Democrats");
        assert_eq!(share.tooltip_key_label("male"), "male");

        let difference = ChartConfig::preset(Variant::Difference);
        assert_eq!(difference.tooltip_key_label("overall"), "All Adults");
        assert_eq!(difference.tooltip_key_label("male"), "Value");

        let renamed = ChartConfig::with_overrides(
            ChartConfig::preset(Variant::Share),
            "unnamed_key_caption = \"Share\"",
        )
        .expect("override");
        assert_eq!(renamed.tooltip_key_label("male"), "Share");
    }

    #[test]
    fn ordered_keys_follow_display_names_then_schema() {
        let config = ChartConfig::preset(Variant::Share);
        let schema = vec![
            "rep".to_owned(),
            "zeta".to_owned(),
            "overall".to_owned(),
            "dem".to_owned(),
        ];
        assert_eq!(config.ordered_keys(&schema), vec!["overall", "dem", "rep", "zeta"]);
    }

    #[test]
    fn palettes_resolve() {
        for variant in [Variant::Share, Variant::Difference] {
            let palette = ChartConfig::preset(variant).palette.resolve().expect("valid colours");
            assert_eq!(palette.label, Color32::from_rgb(0, 0, 0));
        }

        let mut palette = ChartConfig::preset(Variant::Share).palette;
        palette.fill = "green".to_owned();
        assert!(palette.resolve().is_err());
    }
}
