use std::collections::HashSet;

use crate::poll::Point;

use super::config::LabelConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankOrder {
    Descending,
    Ascending,
}

/// Identifiers of the first `count` points ranked by `score`. Ranking runs on
/// an index copy, so `points` keeps its order; ties keep their original order.
pub fn top_sources(
    points: &[Point],
    count: usize,
    order: RankOrder,
    score: impl Fn(&Point) -> f64,
) -> Vec<String> {
    let scores = points.iter().map(&score).collect::<Vec<_>>();
    let mut ranked = (0..points.len()).collect::<Vec<_>>();
    ranked.sort_by(|&a, &b| {
        let ordering = scores[a].total_cmp(&scores[b]);
        match order {
            RankOrder::Descending => ordering.reverse(),
            RankOrder::Ascending => ordering,
        }
    });

    ranked
        .into_iter()
        .take(count)
        .map(|index| points[index].source.clone())
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelSet {
    pub static_ids: Vec<String>,
    pub top_ids: Vec<String>,
    pub bottom_ids: Vec<String>,
    members: HashSet<String>,
}

impl LabelSet {
    pub fn contains(&self, source: &str) -> bool {
        self.members.contains(source)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[cfg(test)]
    pub fn members(&self) -> &HashSet<String> {
        &self.members
    }

    /// Label text for a point: its own name when labelled, empty otherwise.
    pub fn text_for<'a>(&self, point: &'a Point) -> &'a str {
        if self.contains(&point.source) {
            point.source.as_str()
        } else {
            ""
        }
    }
}

/// Chooses which points carry a text label.
///
/// The static part (top N by the reference magnitude) is fixed when the
/// selector is built; [`LabelSelector::compute`] unions it with the top K, and
/// optionally bottom K, points of whichever key is active.
#[derive(Clone, Debug)]
pub struct LabelSelector {
    static_ids: Vec<String>,
    dynamic_count: usize,
    include_bottom: bool,
}

impl LabelSelector {
    pub fn new(points: &[Point], config: LabelConfig, magnitude: impl Fn(&Point) -> f64) -> Self {
        let static_ids = top_sources(
            points,
            config.static_count,
            RankOrder::Descending,
            magnitude,
        );

        Self {
            static_ids,
            dynamic_count: config.dynamic_count,
            include_bottom: config.include_bottom,
        }
    }

    #[cfg(test)]
    pub fn static_ids(&self) -> &[String] {
        &self.static_ids
    }

    pub fn compute(&self, points: &[Point], key: &str) -> LabelSet {
        let score = |point: &Point| point.value_or_zero(key);
        let top_ids = top_sources(points, self.dynamic_count, RankOrder::Descending, score);
        let bottom_ids = if self.include_bottom {
            top_sources(points, self.dynamic_count, RankOrder::Ascending, score)
        } else {
            Vec::new()
        };

        let members = self
            .static_ids
            .iter()
            .chain(&top_ids)
            .chain(&bottom_ids)
            .cloned()
            .collect();

        LabelSet {
            static_ids: self.static_ids.clone(),
            top_ids,
            bottom_ids,
            members,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn scenario_points() -> Vec<Point> {
        vec![
            Point::new("P1").with_value("overall", 30.0).with_value("dem", 10.0),
            Point::new("P2").with_value("overall", 20.0).with_value("dem", 40.0),
            Point::new("P3").with_value("overall", 5.0).with_value("dem", 5.0),
        ]
    }

    fn config(static_count: usize, dynamic_count: usize, include_bottom: bool) -> LabelConfig {
        LabelConfig {
            static_count,
            dynamic_count,
            include_bottom,
        }
    }

    fn overall(point: &Point) -> f64 {
        point.value_or_zero("overall")
    }

    #[test]
    fn scenario_static_and_dynamic_union() {
        let points = scenario_points();
        let selector = LabelSelector::new(&points, config(2, 1, false), overall);
        let labels = selector.compute(&points, "dem");

        assert_eq!(labels.static_ids, vec!["P1", "P2"]);
        assert_eq!(labels.top_ids, vec!["P2"]);
        assert!(labels.bottom_ids.is_empty());
        assert_eq!(labels.len(), 2);
        assert!(labels.contains("P1") && labels.contains("P2") && !labels.contains("P3"));
    }

    #[test]
    fn text_is_name_or_empty() {
        let points = scenario_points();
        let selector = LabelSelector::new(&points, config(1, 1, false), overall);
        let labels = selector.compute(&points, "overall");
        assert_eq!(labels.text_for(&points[0]), "P1");
        assert_eq!(labels.text_for(&points[2]), "");
    }

    #[test]
    fn bottom_labels_pick_most_negative() {
        let points = vec![
            Point::new("A").with_value("dem", -12.0),
            Point::new("B").with_value("dem", 8.0),
            Point::new("C"),
            Point::new("D").with_value("dem", -3.0),
        ];
        let selector = LabelSelector::new(&points, config(0, 2, true), overall);
        let labels = selector.compute(&points, "dem");

        assert_eq!(labels.top_ids, vec!["B", "C"]);
        assert_eq!(labels.bottom_ids, vec!["A", "D"]);
        assert_eq!(labels.len(), 4);
    }

    #[test]
    fn missing_values_rank_as_zero() {
        let points = vec![
            Point::new("neg").with_value("rep", -1.0),
            Point::new("missing"),
        ];
        let top = top_sources(&points, 1, RankOrder::Descending, |p| p.value_or_zero("rep"));
        assert_eq!(top, vec!["missing"]);
    }

    #[test]
    fn ties_keep_original_order() {
        let points = vec![
            Point::new("z").with_value("overall", 5.0),
            Point::new("a").with_value("overall", 5.0),
            Point::new("m").with_value("overall", 5.0),
        ];
        let top = top_sources(&points, 2, RankOrder::Descending, overall);
        assert_eq!(top, vec!["z", "a"]);
        let bottom = top_sources(&points, 2, RankOrder::Ascending, overall);
        assert_eq!(bottom, vec!["z", "a"]);
    }

    #[test]
    fn fewer_points_than_requested_takes_all() {
        let points = scenario_points();
        let selector = LabelSelector::new(&points, config(10, 5, true), overall);
        let labels = selector.compute(&points, "dem");
        assert_eq!(labels.static_ids.len(), 3);
        assert_eq!(labels.top_ids.len(), 3);
        assert_eq!(labels.bottom_ids.len(), 3);
        assert_eq!(labels.len(), 3);

        let empty = LabelSelector::new(&[], config(10, 2, true), overall).compute(&[], "dem");
        assert!(empty.is_empty());
    }

    #[test]
    fn ranking_does_not_reorder_points() {
        let points = scenario_points();
        let before = points.clone();
        let _ = LabelSelector::new(&points, config(2, 2, true), overall).compute(&points, "dem");
        assert_eq!(points, before);
    }

    fn arb_points() -> impl Strategy<Value = Vec<Point>> {
        prop::collection::vec(
            (
                prop::option::of(-50.0f64..50.0),
                prop::option::of(-50.0f64..50.0),
            ),
            0..30,
        )
        .prop_map(|values| {
            values
                .into_iter()
                .enumerate()
                .map(|(index, (overall, dem))| {
                    let mut point = Point::new(format!("S{index}"));
                    if let Some(value) = overall {
                        point.values.insert("overall".to_owned(), value);
                    }
                    if let Some(value) = dem {
                        point.values.insert("dem".to_owned(), value);
                    }
                    point
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn labels_are_a_subset_of_points(
            points in arb_points(),
            static_count in 0usize..12,
            dynamic_count in 0usize..4,
            include_bottom in any::<bool>(),
        ) {
            let selector = LabelSelector::new(
                &points,
                config(static_count, dynamic_count, include_bottom),
                overall,
            );
            let labels = selector.compute(&points, "dem");
            let sources = points.iter().map(|p| p.source.clone()).collect::<HashSet<_>>();
            prop_assert!(labels.members().is_subset(&sources));
        }

        #[test]
        fn dynamic_component_has_min_k_members_in_value_order(
            points in arb_points(),
            dynamic_count in 0usize..5,
        ) {
            let selector = LabelSelector::new(&points, config(0, dynamic_count, true), overall);
            let labels = selector.compute(&points, "dem");
            let expected = dynamic_count.min(points.len());
            prop_assert_eq!(labels.top_ids.len(), expected);
            prop_assert_eq!(labels.bottom_ids.len(), expected);

            let value = |id: &String| {
                points.iter().find(|p| &p.source == id).map(|p| p.value_or_zero("dem")).unwrap_or(0.0)
            };
            for pair in labels.top_ids.windows(2) {
                prop_assert!(value(&pair[0]) >= value(&pair[1]));
            }
            for pair in labels.bottom_ids.windows(2) {
                prop_assert!(value(&pair[0]) <= value(&pair[1]));
            }
            if let Some(last) = labels.top_ids.last() {
                let threshold = value(last);
                let above = points
                    .iter()
                    .filter(|p| p.value_or_zero("dem") > threshold)
                    .count();
                prop_assert!(above < expected || expected == 0);
            }
        }

        #[test]
        fn static_component_ignores_active_key(points in arb_points()) {
            let selector = LabelSelector::new(&points, config(10, 2, true), overall);
            let by_dem = selector.compute(&points, "dem");
            let by_overall = selector.compute(&points, "overall");
            prop_assert_eq!(&by_dem.static_ids, &by_overall.static_ids);
            prop_assert_eq!(by_dem.static_ids.as_slice(), selector.static_ids());
        }
    }
}
