use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::dataset::Dataset;
use super::parse::parse_records;

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read poll data from {}", path.display()))?;

    let dataset = parse_records(&raw)
        .with_context(|| format!("failed to parse poll data in {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        points = dataset.len(),
        keys = dataset.schema.len(),
        "loaded poll data"
    );

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_path() {
        let path = Path::new("/definitely/not/here/data.json");
        let error = load_dataset(path).unwrap_err();
        assert!(format!("{error:#}").contains("/definitely/not/here/data.json"));
    }

    #[test]
    fn loads_file_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "poll-bubbles-load-{}.json",
            std::process::id()
        ));
        fs::write(&path, r#"[{"source": "A", "overall": 4}]"#).expect("write temp file");

        let dataset = load_dataset(&path).expect("loads");
        let _ = fs::remove_file(&path);

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.get("A").map(|point| point.value_or_zero("overall")), Some(4.0));
    }
}
