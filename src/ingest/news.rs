use std::path::Path;

use anyhow::{Context, Result};

use crate::models::NewsRecord;

/// Load news records from a JSON array file.
///
/// An unreadable or malformed file is a hard error. Individual records with
/// missing optional fields (summary, source, link, timestamp) load fine.
pub fn load_news(path: &Path) -> Result<Vec<NewsRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read news file: {}", path.display()))?;
    let records: Vec<NewsRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid news JSON: {}", path.display()))?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_records() {
        let mut f = NamedTempFile::new().unwrap();
        write!(
            f,
            r#"[
                {{"id": "a1", "title": "ASML warns on exports"}},
                {{"id": "b2", "title": "Fab expansion", "summary": "New capacity", "source": "wire"}}
            ]"#
        )
        .unwrap();

        let records = load_news(f.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].summary, "");
        assert_eq!(records[1].source.as_deref(), Some("wire"));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{{not json").unwrap();
        assert!(load_news(f.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_news(Path::new("/nonexistent/news.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
