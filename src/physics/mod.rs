mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};

use forces::{pull_toward_x, pull_toward_y, resolve_collisions};

const ALPHA_MIN: f32 = 0.001;
const ALPHA_TARGET: f32 = 0.0;
const VELOCITY_DECAY: f32 = 0.4;
const DECAY_TICKS: f32 = 300.0;
const INITIAL_RADIUS: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForceTuning {
    pub x_strength: f32,
    pub y_strength: f32,
    pub collide_padding: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutState {
    Settling,
    AtRest,
}

/// Iterative position solver for the bubble chart.
///
/// Every body is pulled toward its own target x and toward a shared target y,
/// while overlapping bodies push each other apart. Energy (`alpha`) decays each
/// tick; once it drops below `ALPHA_MIN` the layout comes to rest and stops
/// ticking until it is restarted.
pub struct ForceLayout {
    bodies: Vec<Body>,
    targets_x: Vec<f32>,
    radii: Vec<f32>,
    target_y: f32,
    tuning: ForceTuning,
    alpha: f32,
    alpha_decay: f32,
    state: LayoutState,
    ticks: u64,
    restarts: u64,
    predicted_scratch: Vec<Vec2>,
    push_scratch: Vec<Vec2>,
}

impl ForceLayout {
    /// Places `count` bodies on a phyllotaxis spiral around `center`. The
    /// layout starts at rest; call [`ForceLayout::restart`] to begin settling.
    pub fn new(count: usize, center: Vec2, tuning: ForceTuning) -> Self {
        let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        let bodies = (0..count)
            .map(|index| {
                let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
                let angle = index as f32 * golden_angle;
                Body {
                    position: center + vec2(angle.cos(), angle.sin()) * radius,
                    velocity: Vec2::ZERO,
                }
            })
            .collect();

        Self {
            bodies,
            targets_x: vec![center.x; count],
            radii: vec![0.0; count],
            target_y: center.y,
            tuning,
            alpha: 1.0,
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / DECAY_TICKS),
            state: LayoutState::AtRest,
            ticks: 0,
            restarts: 0,
            predicted_scratch: Vec::with_capacity(count),
            push_scratch: Vec::with_capacity(count),
        }
    }

    /// Re-evaluates the x targets and collision radii for every body and
    /// re-energizes the layout from full alpha.
    pub fn restart(&mut self, target_x: impl Fn(usize) -> f32, radius: impl Fn(usize) -> f32) {
        let padding = self.tuning.collide_padding;
        for index in 0..self.bodies.len() {
            self.targets_x[index] = target_x(index);
            self.radii[index] = radius(index) + padding;
        }

        self.alpha = 1.0;
        self.restarts += 1;
        if self.state != LayoutState::Settling {
            tracing::debug!(bodies = self.bodies.len(), "layout settling");
        }
        self.state = LayoutState::Settling;
    }

    /// Stops the current settling sequence where it is. Positions are kept.
    pub fn interrupt(&mut self) {
        self.state = LayoutState::AtRest;
    }

    /// Advances one tick while settling. Returns `false` without touching any
    /// body when the layout is at rest.
    pub fn tick(&mut self) -> bool {
        if self.state == LayoutState::AtRest {
            return false;
        }

        self.alpha += (ALPHA_TARGET - self.alpha) * self.alpha_decay;

        pull_toward_x(&mut self.bodies, &self.targets_x, self.tuning.x_strength, self.alpha);
        pull_toward_y(&mut self.bodies, self.target_y, self.tuning.y_strength, self.alpha);
        resolve_collisions(
            &mut self.bodies,
            &self.radii,
            &mut self.predicted_scratch,
            &mut self.push_scratch,
        );

        let retain = 1.0 - VELOCITY_DECAY;
        for body in &mut self.bodies {
            body.velocity *= retain;
            body.position += body.velocity;
        }

        self.ticks += 1;
        if self.alpha < ALPHA_MIN {
            self.state = LayoutState::AtRest;
            tracing::debug!(ticks = self.ticks, "layout at rest");
        }

        true
    }

    /// Ticks until the layout rests or `max_ticks` have run. Returns the
    /// number of ticks performed.
    pub fn run_to_rest(&mut self, max_ticks: usize) -> usize {
        let mut performed = 0;
        while performed < max_ticks && self.tick() {
            performed += 1;
        }
        performed
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn is_settling(&self) -> bool {
        self.state == LayoutState::Settling
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn position(&self, index: usize) -> Option<Vec2> {
        self.bodies.get(index).map(|body| body.position)
    }

    pub fn targets_x(&self) -> &[f32] {
        &self.targets_x
    }

    /// Largest overlap between any two bodies, using radii without padding.
    pub fn max_overlap(&self) -> f32 {
        let padding = self.tuning.collide_padding;
        let mut worst = 0.0_f32;
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                let reach = (self.radii[i] - padding) + (self.radii[j] - padding);
                let distance = (self.bodies[i].position - self.bodies[j].position).length();
                worst = worst.max(reach - distance);
            }
        }
        worst
    }
}
