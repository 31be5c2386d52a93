//! Local build collection, deployment manifest, and the upload loop.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use super::client::CloudflareClient;
use super::CloudflareError;

/// One file of the static build.
#[derive(Debug, Clone)]
pub struct LocalFile {
    /// Path relative to the build root, `/`-separated.
    pub path: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub size: u64,
    pub hash: String,
}

/// Lowercase hex SHA-256 of `content`.
pub fn content_hash(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Read every file under `root`, recursively, in path order.
pub fn collect_files(root: &Path) -> Result<Vec<LocalFile>, CloudflareError> {
    if !root.is_dir() {
        return Err(CloudflareError::MissingBuildDir(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(path) = relative_key(root, entry.path()) else {
            continue;
        };
        files.push(LocalFile {
            path,
            content: fs::read(entry.path())?,
        });
    }
    Ok(files)
}

pub fn build_manifest(files: &[LocalFile]) -> BTreeMap<String, ManifestEntry> {
    files
        .iter()
        .map(|f| {
            (
                f.path.clone(),
                ManifestEntry {
                    size: f.content.len() as u64,
                    hash: content_hash(&f.content),
                },
            )
        })
        .collect()
}

/// Outcome of one file upload, reported as it happens.
#[derive(Debug)]
pub enum UploadEvent<'a> {
    Started(&'a str),
    Uploaded(&'a str),
    Failed(&'a str, &'a CloudflareError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: usize,
    pub failed: usize,
}

/// Where a deployment's files go.
pub struct UploadTarget<'a> {
    pub account_id: &'a str,
    pub project: &'a str,
    pub deployment_id: &'a str,
}

/// Upload files one at a time. A failed file is reported and skipped.
pub async fn upload_files(
    client: &CloudflareClient,
    target: &UploadTarget<'_>,
    files: Vec<LocalFile>,
    mut on_event: impl FnMut(UploadEvent<'_>),
) -> UploadReport {
    let mut report = UploadReport::default();

    for file in files {
        on_event(UploadEvent::Started(&file.path));
        let result = client
            .upload_file(
                target.account_id,
                target.project,
                target.deployment_id,
                &file.path,
                file.content,
            )
            .await;
        match result {
            Ok(()) => {
                report.uploaded += 1;
                on_event(UploadEvent::Uploaded(&file.path));
            }
            Err(e) => {
                report.failed += 1;
                log::warn!("Upload: {} failed: {}", file.path, e);
                on_event(UploadEvent::Failed(&file.path, &e));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_content_hash_is_sha256_hex() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_collect_files_recursive_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html", "<html></html>");
        write(dir.path(), "assets/app.js", "console.log(1)");
        write(dir.path(), "assets/css/site.css", "body{}");

        let files = collect_files(dir.path()).unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["assets/app.js", "assets/css/site.css", "index.html"]);
        assert_eq!(files[2].content, b"<html></html>");
    }

    #[test]
    fn test_collect_files_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_files(&dir.path().join("dist")).unwrap_err();
        assert!(matches!(err, CloudflareError::MissingBuildDir(_)));
    }

    #[test]
    fn test_collect_files_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_manifest_sizes_and_hashes() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html", "hello");
        write(dir.path(), "copy.html", "hello");

        let files = collect_files(dir.path()).unwrap();
        let manifest = build_manifest(&files);
        assert_eq!(manifest.len(), 2);
        let entry = &manifest["index.html"];
        assert_eq!(entry.size, 5);
        assert_eq!(entry.hash.len(), 64);
        assert_eq!(entry.hash, manifest["copy.html"].hash);
    }

    #[tokio::test]
    async fn test_upload_continues_after_failures() {
        // Nothing listens on the discard port, so every upload fails to connect.
        let client = CloudflareClient::new("token").with_base_url("http://127.0.0.1:9/client/v4");
        let target = UploadTarget {
            account_id: "acc",
            project: "proj",
            deployment_id: "dep",
        };
        let files = vec![
            LocalFile {
                path: "a.txt".to_string(),
                content: b"a".to_vec(),
            },
            LocalFile {
                path: "b.txt".to_string(),
                content: b"b".to_vec(),
            },
        ];

        let mut seen = Vec::new();
        let report = upload_files(&client, &target, files, |event| {
            if let UploadEvent::Failed(path, _) = event {
                seen.push(path.to_string());
            }
        })
        .await;

        assert_eq!(report, UploadReport { uploaded: 0, failed: 2 });
        assert_eq!(seen, vec!["a.txt", "b.txt"]);
    }
}
