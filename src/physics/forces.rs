use eframe::egui::{Vec2, vec2};

use super::Body;
use super::quadtree::QuadNode;

pub(super) fn pull_toward_x(bodies: &mut [Body], targets: &[f32], strength: f32, alpha: f32) {
    for (body, &target) in bodies.iter_mut().zip(targets) {
        body.velocity.x += (target - body.position.x) * strength * alpha;
    }
}

pub(super) fn pull_toward_y(bodies: &mut [Body], target: f32, strength: f32, alpha: f32) {
    for body in bodies.iter_mut() {
        body.velocity.y += (target - body.position.y) * strength * alpha;
    }
}

/// One relaxation pass of pairwise collision. Bodies are compared at their
/// predicted positions (position + velocity) and overlapping pairs have their
/// velocities pushed apart, the smaller body taking the larger share.
pub(super) fn resolve_collisions(
    bodies: &mut [Body],
    radii: &[f32],
    predicted: &mut Vec<Vec2>,
    pushes: &mut Vec<Vec2>,
) {
    let count = bodies.len().min(radii.len());
    if count < 2 {
        return;
    }

    predicted.clear();
    predicted.extend(bodies[..count].iter().map(|body| body.position + body.velocity));
    pushes.clear();
    pushes.resize(count, Vec2::ZERO);

    let Some(tree) = QuadNode::build(predicted, &radii[..count]) else {
        return;
    };

    tree.for_each_candidate_pair(&mut |from, to| {
        let min_distance = radii[from] + radii[to];
        let mut delta = predicted[from] - predicted[to];
        let mut distance_sq = delta.length_sq();
        if distance_sq >= min_distance * min_distance {
            return;
        }

        if distance_sq <= 1e-12 {
            delta = jiggle(from, to);
            distance_sq = delta.length_sq();
        }

        let distance = distance_sq.sqrt();
        let overlap = (min_distance - distance) / distance;
        let push = delta * overlap;

        let from_sq = radii[from] * radii[from];
        let to_sq = radii[to] * radii[to];
        let share = if from_sq + to_sq > 0.0 {
            to_sq / (from_sq + to_sq)
        } else {
            0.5
        };

        pushes[from] += push * share;
        pushes[to] -= push * (1.0 - share);
    });

    for (body, push) in bodies.iter_mut().zip(pushes.iter()) {
        body.velocity += *push;
    }
}

fn jiggle(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin()) * 1e-3
}
