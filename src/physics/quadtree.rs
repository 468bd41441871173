use eframe::egui::{Vec2, vec2};

const QUADTREE_LEAF_CAPACITY: usize = 8;
const QUADTREE_MAX_DEPTH: usize = 10;

#[derive(Clone, Copy)]
pub(super) struct QuadBounds {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl QuadBounds {
    fn from_points(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);

        for point in points {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }

        if !min.x.is_finite() || !min.y.is_finite() || !max.x.is_finite() || !max.y.is_finite() {
            return None;
        }

        let center = (min + max) * 0.5;
        let span_x = (max.x - min.x).max(1.0);
        let span_y = (max.y - min.y).max(1.0);
        let half_extent = (span_x.max(span_y) * 0.5) + 1.0;

        Some(Self {
            center,
            half_extent,
        })
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let offset = match quadrant {
            0 => vec2(-quarter, -quarter),
            1 => vec2(quarter, -quarter),
            2 => vec2(-quarter, quarter),
            _ => vec2(quarter, quarter),
        };

        Self {
            center: self.center + offset,
            half_extent: quarter,
        }
    }

    fn quadrant_for(self, point: Vec2) -> usize {
        let right = point.x >= self.center.x;
        let lower = point.y >= self.center.y;
        match (right, lower) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        }
    }

    pub(super) fn distance_sq_to(self, other: Self) -> f32 {
        let reach = self.half_extent + other.half_extent;
        let dx = ((self.center.x - other.center.x).abs() - reach).max(0.0);
        let dy = ((self.center.y - other.center.y).abs() - reach).max(0.0);
        (dx * dx) + (dy * dy)
    }
}

/// Quadtree over predicted body positions. Each node tracks the largest
/// collision radius below it so pair traversal can skip distant cells.
pub(super) struct QuadNode {
    pub(super) bounds: QuadBounds,
    pub(super) max_radius: f32,
    pub(super) indices: Vec<usize>,
    pub(super) children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    pub(super) fn build(positions: &[Vec2], radii: &[f32]) -> Option<Self> {
        let bounds = QuadBounds::from_points(positions)?;
        let indices = (0..positions.len()).collect::<Vec<_>>();
        Some(Self::build_node(bounds, indices, positions, radii, 0))
    }

    fn build_node(
        bounds: QuadBounds,
        indices: Vec<usize>,
        positions: &[Vec2],
        radii: &[f32],
        depth: usize,
    ) -> Self {
        let max_radius = indices
            .iter()
            .map(|&index| radii.get(index).copied().unwrap_or(0.0))
            .fold(0.0_f32, f32::max);

        let mut node = Self {
            bounds,
            max_radius,
            indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= QUADTREE_MAX_DEPTH || node.indices.len() <= QUADTREE_LEAF_CAPACITY {
            return node;
        }

        let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
        for &index in &node.indices {
            buckets[bounds.quadrant_for(positions[index])].push(index);
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }

            node.children[quadrant] = Some(Box::new(Self::build_node(
                bounds.child(quadrant),
                bucket,
                positions,
                radii,
                depth + 1,
            )));
        }
        node.indices.clear();
        node
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(|child| child.is_none())
    }

    /// Calls `visit` once for every unordered pair of bodies whose cells are
    /// close enough for their radii to touch.
    pub(super) fn for_each_candidate_pair(&self, visit: &mut impl FnMut(usize, usize)) {
        visit_pairs(self, self, true, visit);
    }
}

fn cells_may_touch(node_a: &QuadNode, node_b: &QuadNode) -> bool {
    let reach = node_a.max_radius + node_b.max_radius;
    node_a.bounds.distance_sq_to(node_b.bounds) <= reach * reach
}

fn visit_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    visit: &mut impl FnMut(usize, usize),
) {
    if !same_node && !cells_may_touch(node_a, node_b) {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    visit(from, to);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    visit(from, to);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_ref() else {
                continue;
            };

            visit_pairs(child_a, child_a, true, visit);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_ref() else {
                    continue;
                };
                visit_pairs(child_a, child_b, false, visit);
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            visit_pairs(child, node_b, false, visit);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            visit_pairs(node_a, child, false, visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn grid(count: usize, spacing: f32) -> Vec<Vec2> {
        (0..count)
            .map(|index| vec2((index % 7) as f32 * spacing, (index / 7) as f32 * spacing))
            .collect()
    }

    fn brute_force_pairs(positions: &[Vec2], radii: &[f32]) -> HashSet<(usize, usize)> {
        let mut pairs = HashSet::new();
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                if (positions[i] - positions[j]).length() < radii[i] + radii[j] {
                    pairs.insert((i, j));
                }
            }
        }
        pairs
    }

    #[test]
    fn candidate_pairs_cover_every_touching_pair() {
        let positions = grid(60, 9.0);
        let radii = (0..positions.len())
            .map(|index| 3.0 + (index % 5) as f32)
            .collect::<Vec<_>>();
        let tree = QuadNode::build(&positions, &radii).expect("finite points");
        assert!(!tree.is_leaf());

        let mut candidates = HashSet::new();
        tree.for_each_candidate_pair(&mut |a, b| {
            candidates.insert((a.min(b), a.max(b)));
        });

        for pair in brute_force_pairs(&positions, &radii) {
            assert!(candidates.contains(&pair), "missing pair {pair:?}");
        }
    }

    #[test]
    fn distant_cells_are_pruned() {
        let mut positions = grid(20, 2.0);
        positions.extend(grid(20, 2.0).into_iter().map(|p| p + vec2(5_000.0, 5_000.0)));
        let radii = vec![1.0; positions.len()];
        let tree = QuadNode::build(&positions, &radii).expect("finite points");

        let mut crossing = 0usize;
        tree.for_each_candidate_pair(&mut |a, b| {
            if (a < 20) != (b < 20) {
                crossing += 1;
            }
        });
        assert_eq!(crossing, 0);
    }

    #[test]
    fn single_quadrant_cluster_narrows_to_tight_cells() {
        let mut positions = grid(14, 1.0);
        positions.push(vec2(1_000.0, 1_000.0));
        let radii = vec![0.5; positions.len()];
        let tree = QuadNode::build(&positions, &radii).expect("finite points");

        fn deepest_leaf_extent(node: &QuadNode) -> f32 {
            if node.is_leaf() {
                return node.bounds.half_extent;
            }
            node.children
                .iter()
                .flatten()
                .map(|child| deepest_leaf_extent(child))
                .fold(f32::INFINITY, f32::min)
        }

        assert!(deepest_leaf_extent(&tree) < 10.0);

        let mut far_pairs = 0usize;
        tree.for_each_candidate_pair(&mut |a, b| {
            if a == 14 || b == 14 {
                far_pairs += 1;
            }
        });
        assert_eq!(far_pairs, 0);
    }

    #[test]
    fn coincident_points_stop_at_depth_limit() {
        let positions = vec![vec2(3.0, 3.0); QUADTREE_LEAF_CAPACITY + 4];
        let radii = vec![1.0; positions.len()];
        let tree = QuadNode::build(&positions, &radii).expect("finite points");

        let mut pairs = 0usize;
        tree.for_each_candidate_pair(&mut |_, _| pairs += 1);
        let count = positions.len();
        assert_eq!(pairs, count * (count - 1) / 2);
    }

    #[test]
    fn non_finite_positions_build_nothing() {
        assert!(QuadNode::build(&[vec2(f32::NAN, 0.0)], &[1.0]).is_none());
        assert!(QuadNode::build(&[], &[]).is_none());
    }
}
