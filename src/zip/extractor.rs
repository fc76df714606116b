use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::io::LocalArchive;
use anyhow::{Context, Result};

use super::config::ScanConfig;
use super::scanner::ZipReader;
use super::structures::ZipEntry;

/// ZIP file extractor for archives on the local filesystem.
///
/// Every operation runs on a blocking task with its own file handle and its
/// own [`ZipReader`], so clones of one extractor can extract entries in
/// parallel.
#[derive(Debug, Clone)]
pub struct ZipExtractor {
    path: PathBuf,
    config: ScanConfig,
}

impl ZipExtractor {
    pub fn new(path: impl Into<PathBuf>, config: ScanConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    fn reader(path: &Path, config: ScanConfig) -> Result<ZipReader<LocalArchive>> {
        let archive = LocalArchive::open(path)
            .with_context(|| format!("Cannot open archive {}", path.display()))?;
        log::debug!("Opened {} ({} bytes)", path.display(), archive.size());
        Ok(ZipReader::with_config(archive, config)?)
    }

    /// List all entries by scanning the local headers
    pub async fn list_files(&self) -> Result<Vec<ZipEntry>> {
        let path = self.path.clone();
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<ZipEntry>> {
            let mut reader = Self::reader(&path, config)?;
            let headers = reader
                .headers()
                .with_context(|| format!("Cannot scan {}", path.display()))?;
            Ok(headers)
        })
        .await?
    }

    /// Extract entry data to memory
    pub async fn extract_to_memory(&self, entry: &ZipEntry) -> Result<Vec<u8>> {
        let path = self.path.clone();
        let config = self.config.clone();
        let entry = entry.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
            let mut reader = Self::reader(&path, config)?;
            let mut data = Vec::new();
            reader
                .open(&entry)
                .and_then(|mut content| Ok(content.read_to_end(&mut data)?))
                .with_context(|| format!("Cannot extract {}", entry.name_lossy()))?;
            Ok(data)
        })
        .await?
    }

    /// Extract entry to disk; directory entries create the directory
    pub async fn extract_to_file(&self, entry: &ZipEntry, output_path: &Path) -> Result<()> {
        if entry.is_dir() {
            fs::create_dir_all(output_path).await?;
            return Ok(());
        }

        // Create parent directories if needed
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let data = self.extract_to_memory(entry).await?;

        let mut file = fs::File::create(output_path)
            .await
            .with_context(|| format!("Cannot create {}", output_path.display()))?;
        file.write_all(&data).await?;
        file.flush().await?;

        Ok(())
    }

    /// Extract entry to stdout
    pub async fn extract_to_stdout(&self, entry: &ZipEntry) -> Result<()> {
        let data = self.extract_to_memory(entry).await?;

        let mut stdout = tokio::io::stdout();
        stdout.write_all(&data).await?;
        stdout.flush().await?;

        Ok(())
    }
}

/// Turn an archive name into a relative path that stays inside the output
/// directory: root, prefix, `.` and `..` components are dropped.
///
/// With `junk_paths` only the final component is kept.
pub fn sanitized_path(name: &str, junk_paths: bool) -> PathBuf {
    let parts: Vec<_> = Path::new(name)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();

    if junk_paths {
        parts.last().map(PathBuf::from).unwrap_or_default()
    } else {
        parts.iter().collect()
    }
}
