//! Corpus loading.
//!
//! Reads the fixed document corpus from a directory into memory. Only
//! files with a recognized text extension are loaded; everything else in
//! the directory is ignored.

use crate::types::Document;
use docqa_core::{AppError, AppResult};
use std::path::Path;
use walkdir::WalkDir;

/// File extensions recognized as corpus documents.
const TEXT_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Load all documents from the corpus directory.
///
/// Returns documents in deterministic (path-sorted) order. A missing
/// directory is an error; a directory with no matching files is not and
/// yields an empty Vec — downstream components tolerate zero documents.
pub fn load_documents(corpus_dir: &Path) -> AppResult<Vec<Document>> {
    if !corpus_dir.is_dir() {
        return Err(AppError::CorpusNotFound(corpus_dir.display().to_string()));
    }

    let mut documents = Vec::new();

    for entry in WalkDir::new(corpus_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_text_document(path) {
            continue;
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Io(std::io::Error::new(e.kind(), format!("{:?}: {}", path, e))))?;

        let name = path
            .strip_prefix(corpus_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        documents.push(Document { name, text });
    }

    tracing::info!(
        "Loaded {} documents from {:?}",
        documents.len(),
        corpus_dir
    );

    Ok(documents)
}

/// Check whether a path has a recognized text extension.
fn is_text_document(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| TEXT_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_documents_filters_extensions() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.md"), "alpha").unwrap();
        std::fs::write(temp.path().join("b.txt"), "beta").unwrap();
        std::fs::write(temp.path().join("c.bin"), "ignored").unwrap();
        std::fs::write(temp.path().join("noext"), "ignored").unwrap();

        let docs = load_documents(temp.path()).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].name, "a.md");
        assert_eq!(docs[0].text, "alpha");
        assert_eq!(docs[1].name, "b.txt");
    }

    #[test]
    fn test_load_documents_sorted_and_recursive() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("sub")).unwrap();
        std::fs::write(temp.path().join("z.md"), "z").unwrap();
        std::fs::write(temp.path().join("sub").join("a.md"), "nested").unwrap();

        let docs = load_documents(temp.path()).unwrap();

        assert_eq!(docs.len(), 2);
        assert!(docs.iter().any(|d| d.name.ends_with("a.md") && d.text == "nested"));
    }

    #[test]
    fn test_missing_corpus_is_error() {
        let result = load_documents(Path::new("/nonexistent/corpus"));
        assert!(matches!(result, Err(AppError::CorpusNotFound(_))));
    }

    #[test]
    fn test_empty_corpus_is_not_error() {
        let temp = TempDir::new().unwrap();
        let docs = load_documents(temp.path()).unwrap();
        assert!(docs.is_empty());
    }
}
