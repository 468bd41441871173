use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    pub source: String,
    pub values: HashMap<String, f64>,
}

impl Point {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            values: HashMap::new(),
        }
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Missing and null attributes read as zero, matching how the chart ranks
    /// and positions points.
    pub fn value_or_zero(&self, key: &str) -> f64 {
        self.value(key).unwrap_or(0.0)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub points: Vec<Point>,
    pub schema: Vec<String>,
    index_by_source: HashMap<String, usize>,
}

impl Dataset {
    pub fn new(points: Vec<Point>, schema: Vec<String>) -> Self {
        let index_by_source = points
            .iter()
            .enumerate()
            .map(|(index, point)| (point.source.clone(), index))
            .collect();

        Self {
            points,
            schema,
            index_by_source,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.schema.iter().any(|known| known == key)
    }

    pub fn index_of(&self, source: &str) -> Option<usize> {
        self.index_by_source.get(source).copied()
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(|point| point.source.as_str())
    }
}

#[cfg(test)]
impl Point {
    pub fn with_value(mut self, key: impl Into<String>, value: f64) -> Self {
        self.values.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
impl Dataset {
    /// Schema is every key used by the points, first-seen, each point's keys
    /// sorted.
    pub fn from_points(points: Vec<Point>) -> Self {
        let mut schema: Vec<String> = Vec::new();
        for point in &points {
            let mut keys = point.values.keys().cloned().collect::<Vec<_>>();
            keys.sort();
            for key in keys {
                if !schema.contains(&key) {
                    schema.push(key);
                }
            }
        }

        Self::new(points, schema)
    }

    pub fn get(&self, source: &str) -> Option<&Point> {
        self.index_of(source).and_then(|index| self.points.get(index))
    }
}
