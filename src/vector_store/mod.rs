//! Lookup-or-create for the managed document index.
//!
//! The vector store is idempotent by name, not by content: on first run the
//! local documents folder is scanned (non-recursively), each regular file is
//! uploaded, and a store is created from the uploaded file ids; on later runs
//! the existing store is found by name and reused as-is.
//!
//! A missing or empty documents folder is not an error - document search is
//! simply omitted from the toolset.

use std::fs;
use std::path::{Path, PathBuf};

use crate::client::ProjectClient;
use crate::error::AgentError;
use crate::types::{ListResponse, VectorStoreRecord};
use crate::Result;

/// Find the named vector store, creating it from `docs_dir` when absent.
///
/// Returns `Ok(None)` when no store exists and the folder has nothing to
/// index, so callers can leave document search out without treating it as a
/// failure.
pub async fn ensure_vector_store(
    client: &ProjectClient,
    name: &str,
    docs_dir: &Path,
) -> Result<Option<VectorStoreRecord>> {
    if let Some(existing) = find_by_name(client, name).await? {
        tracing::info!(store = %name, id = %existing.id, "reusing existing vector store");
        return Ok(Some(existing));
    }

    let paths = collect_upload_paths(docs_dir)?;
    if paths.is_empty() {
        tracing::info!(
            store = %name,
            dir = %docs_dir.display(),
            "documents folder is missing or empty, skipping vector store creation"
        );
        return Ok(None);
    }

    tracing::info!(store = %name, files = paths.len(), "creating vector store from local documents");

    let mut file_ids = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = client.upload_file(path).await?;
        file_ids.push(file.id);
    }

    let store: VectorStoreRecord = client
        .post_json(
            "vector_stores",
            &serde_json::json!({
                "name": name,
                "file_ids": file_ids,
            }),
        )
        .await?;

    tracing::info!(store = %name, id = %store.id, "vector store created");
    Ok(Some(store))
}

/// Delete a vector store record (teardown path).
pub async fn delete_vector_store(client: &ProjectClient, store_id: &str) -> Result<()> {
    client.delete(&format!("vector_stores/{}", store_id)).await
}

/// Regular files directly inside `dir`, in name order. A missing directory
/// yields an empty list; an unreadable one is an error.
pub fn collect_upload_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir)
        .map_err(|e| AgentError::io(format!("failed to read {}: {}", dir.display(), e)))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| AgentError::io(format!("failed to read {}: {}", dir.display(), e)))?;
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

async fn find_by_name(
    client: &ProjectClient,
    name: &str,
) -> Result<Option<VectorStoreRecord>> {
    let mut after: Option<String> = None;
    loop {
        let query: Vec<(&str, &str)> = match &after {
            Some(cursor) => vec![("after", cursor.as_str())],
            None => vec![],
        };
        let page: ListResponse<VectorStoreRecord> = client
            .get_json_with_query("vector_stores", &query)
            .await?;

        if let Some(store) = page
            .data
            .into_iter()
            .find(|store| store.name.as_deref() == Some(name))
        {
            return Ok(Some(store));
        }
        if !page.has_more || page.last_id.is_none() {
            return Ok(None);
        }
        after = page.last_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn test_collect_missing_dir_is_empty() {
        let paths = collect_upload_paths(Path::new("/nonexistent/mars_docs")).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_collect_empty_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let paths = collect_upload_paths(dir.path()).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_collect_is_non_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let mut file_b = File::create(dir.path().join("b_rovers.md")).unwrap();
        writeln!(file_b, "rovers").unwrap();
        let mut file_a = File::create(dir.path().join("a_orbiters.md")).unwrap();
        writeln!(file_a, "orbiters").unwrap();

        // Files inside subdirectories must not be picked up.
        let sub = dir.path().join("nested");
        fs::create_dir(&sub).unwrap();
        File::create(sub.join("ignored.md")).unwrap();

        let paths = collect_upload_paths(dir.path()).unwrap();
        let names: Vec<&str> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a_orbiters.md", "b_rovers.md"]);
    }
}
