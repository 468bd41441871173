use eframe::egui::Color32;
use eframe::egui::emath::easing::cubic_in_out;

use super::config::ResolvedPalette;
use super::scale::OpacityScale;

pub const STYLE_TRANSITION_SECS: f32 = 0.75;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointStyle {
    pub fill: Color32,
    pub opacity: f32,
}

impl PointStyle {
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        if t >= 1.0 {
            return other;
        }

        Self {
            fill: blend_color(self.fill, other.fill, t),
            opacity: self.opacity + (other.opacity - self.opacity) * t,
        }
    }

    pub fn color(self) -> Color32 {
        self.fill.gamma_multiply(self.opacity.clamp(0.0, 1.0))
    }
}

/// How fill and opacity follow the active value.
#[derive(Clone, Copy, Debug)]
pub struct ValueStyling {
    pub palette: ResolvedPalette,
    pub signed: bool,
    pub opacity: Option<OpacityScale>,
}

impl ValueStyling {
    pub fn style_for(&self, value: f64) -> PointStyle {
        let fill = if !self.signed {
            self.palette.fill
        } else if value >= 0.0 {
            self.palette.positive_fill
        } else {
            self.palette.negative_fill
        };

        let opacity = self
            .opacity
            .map(|scale| scale.opacity(value as f32))
            .unwrap_or(1.0);

        PointStyle { fill, opacity }
    }
}

/// Eased blend from the styles of the previous key to those of the current
/// one. Runs on its own clock, separate from the layout.
#[derive(Clone, Debug)]
pub struct StyleTransition {
    from: Vec<PointStyle>,
    to: Vec<PointStyle>,
    elapsed: f32,
    duration: f32,
}

impl StyleTransition {
    pub fn settled(styles: Vec<PointStyle>) -> Self {
        Self {
            from: styles.clone(),
            to: styles,
            elapsed: STYLE_TRANSITION_SECS,
            duration: STYLE_TRANSITION_SECS,
        }
    }

    /// Starts a new transition from whatever is currently shown, so an
    /// interrupted transition continues from its midpoint.
    pub fn retarget(&mut self, to: Vec<PointStyle>) {
        let from = (0..to.len())
            .map(|index| self.current(index).unwrap_or(to[index]))
            .collect();
        self.from = from;
        self.to = to;
        self.elapsed = 0.0;
    }

    pub fn advance(&mut self, delta_secs: f32) -> bool {
        self.elapsed = (self.elapsed + delta_secs.max(0.0)).min(self.duration);
        self.is_running()
    }

    pub fn is_running(&self) -> bool {
        self.elapsed < self.duration
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= f32::EPSILON {
            1.0
        } else {
            cubic_in_out((self.elapsed / self.duration).clamp(0.0, 1.0))
        }
    }

    pub fn current(&self, index: usize) -> Option<PointStyle> {
        let to = *self.to.get(index)?;
        let from = self.from.get(index).copied().unwrap_or(to);
        Some(from.lerp(to, self.progress()))
    }

    pub fn target(&self, index: usize) -> Option<PointStyle> {
        self.to.get(index).copied()
    }
}

pub fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)).round() as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)).round() as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)).round() as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)).round() as u8,
    )
}

pub fn hex_color(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::config::{ChartConfig, Variant};

    fn styling(variant: Variant) -> ValueStyling {
        let config = ChartConfig::preset(variant);
        ValueStyling {
            palette: config.palette.resolve().expect("valid palette"),
            signed: variant.is_signed(),
            opacity: config.opacity,
        }
    }

    #[test]
    fn share_styling_is_constant() {
        let styling = styling(Variant::Share);
        let a = styling.style_for(-5.0);
        let b = styling.style_for(45.0);
        assert_eq!(a, b);
        assert_eq!(hex_color(a.fill), "#69b3a2");
        assert_eq!(a.opacity, 1.0);
    }

    #[test]
    fn difference_styling_follows_sign_and_magnitude() {
        let styling = styling(Variant::Difference);
        let positive = styling.style_for(10.0);
        let negative = styling.style_for(-10.0);
        let zero = styling.style_for(0.0);
        let large = styling.style_for(-25.0);

        assert_eq!(hex_color(positive.fill), "#4caf50");
        assert_eq!(hex_color(negative.fill), "#f44336");
        assert_eq!(zero.fill, positive.fill);
        assert!((positive.opacity - 0.65).abs() < 1e-4);
        assert!((zero.opacity - 0.3).abs() < 1e-4);
        assert_eq!(large.opacity, 1.0);
    }

    #[test]
    fn transition_blends_then_lands_on_target() {
        let red = PointStyle {
            fill: Color32::from_rgb(255, 0, 0),
            opacity: 0.2,
        };
        let green = PointStyle {
            fill: Color32::from_rgb(0, 255, 0),
            opacity: 1.0,
        };

        let mut transition = StyleTransition::settled(vec![red]);
        assert!(!transition.is_running());
        assert_eq!(transition.current(0), Some(red));

        transition.retarget(vec![green]);
        assert!(transition.is_running());
        assert_eq!(transition.current(0), Some(red));

        assert!(transition.advance(STYLE_TRANSITION_SECS / 2.0));
        let mid = transition.current(0).expect("style");
        assert!((mid.opacity - 0.6).abs() < 1e-3);

        assert!(!transition.advance(STYLE_TRANSITION_SECS));
        assert_eq!(transition.current(0), Some(green));
        assert_eq!(transition.target(0), Some(green));
    }

    #[test]
    fn progress_eases_in_and_out() {
        let mut transition = StyleTransition::settled(Vec::new());
        assert_eq!(transition.progress(), 1.0);

        transition.retarget(Vec::new());
        assert_eq!(transition.progress(), 0.0);
        transition.advance(STYLE_TRANSITION_SECS / 4.0);
        let quarter = transition.progress();
        assert!(quarter > 0.0 && quarter < 0.25);
        transition.advance(STYLE_TRANSITION_SECS / 4.0);
        assert!((transition.progress() - 0.5).abs() < 1e-4);
    }
}
