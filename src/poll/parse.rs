use std::collections::HashSet;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;

use super::dataset::{Dataset, Point};

const SOURCE_FIELD: &str = "source";

pub fn parse_records(raw: &str) -> Result<Dataset> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in poll data")?;
    let records = parsed
        .as_array()
        .ok_or_else(|| anyhow!("poll data must be a JSON array of records"))?;

    let mut points = Vec::with_capacity(records.len());
    let mut schema: Vec<String> = Vec::new();
    let mut seen_sources = HashSet::with_capacity(records.len());

    for (position, record) in records.iter().enumerate() {
        let object = record
            .as_object()
            .ok_or_else(|| anyhow!("record {position} is not a JSON object"))?;

        let source = object
            .get(SOURCE_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("record {position} has no string `{SOURCE_FIELD}` field"))?
            .to_string();

        if !seen_sources.insert(source.clone()) {
            bail!("duplicate source `{source}` at record {position}");
        }

        let mut point = Point::new(source);
        for (key, value) in object {
            if key == SOURCE_FIELD {
                continue;
            }

            if !schema.contains(key) {
                schema.push(key.clone());
            }

            match value {
                Value::Null => {}
                Value::Number(number) => {
                    if let Some(number) = number.as_f64() {
                        point.values.insert(key.clone(), number);
                    }
                }
                other => {
                    tracing::debug!(
                        source = %point.source,
                        key = %key,
                        value = %other,
                        "skipping non-numeric attribute"
                    );
                }
            }
        }

        points.push(point);
    }

    Ok(Dataset::new(points, schema))
}
