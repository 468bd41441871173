use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// Uniform fit of the chart's fixed coordinate box into a screen rect,
/// centred, aspect ratio kept.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct ChartFrame {
    origin: Pos2,
    scale: f32,
}

impl ChartFrame {
    pub(super) fn fit(rect: Rect, width: f32, height: f32) -> Self {
        let width = width.max(1.0);
        let height = height.max(1.0);
        let scale = (rect.width() / width).min(rect.height() / height).max(0.01);
        let used = vec2(width, height) * scale;
        let origin = rect.center() - used / 2.0;
        Self { origin, scale }
    }

    pub(super) fn to_screen(self, chart: Vec2) -> Pos2 {
        self.origin + chart * self.scale
    }

    pub(super) fn to_chart(self, screen: Pos2) -> Vec2 {
        (screen - self.origin) / self.scale
    }

    pub(super) fn length(self, chart_length: f32) -> f32 {
        chart_length * self.scale
    }

    pub(super) fn point(self, x: f32, y: f32) -> Pos2 {
        self.to_screen(vec2(x, y))
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn dashed_segment(painter: &Painter, from: Pos2, to: Pos2, stroke: Stroke, dash: f32) {
    painter.extend(Shape::dashed_line(&[from, to], stroke, dash, dash));
}

/// Approximates a dotted circle outline with short dashes along the arc.
pub(super) fn dashed_circle(painter: &Painter, center: Pos2, radius: f32, stroke: Stroke, dash: f32) {
    if radius <= 0.0 || dash <= 0.0 {
        return;
    }

    let circumference = std::f32::consts::TAU * radius;
    let segments = ((circumference / (dash * 2.0)).floor() as usize).max(4);
    let step = std::f32::consts::TAU / segments as f32;
    let dash_angle = step / 2.0;

    for segment in 0..segments {
        let start = segment as f32 * step;
        let end = start + dash_angle;
        let a = center + vec2(start.cos(), start.sin()) * radius;
        let b = center + vec2(end.cos(), end.sin()) * radius;
        painter.line_segment([a, b], stroke);
    }
}

pub(super) fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    color.gamma_multiply(alpha.clamp(0.0, 1.0))
}

pub(super) fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}
