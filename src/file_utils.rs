use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Extensions of the documents picked up by discovery
    pub fn document_extensions(include_txt: bool) -> Vec<&'static str> {
        if include_txt { vec!["md", "txt"] } else { vec!["md"] }
    }

    /// Find files with one of `extensions` under `dir`, skipping anything below an
    /// `excluded` directory. Results are sorted.
    pub fn find_files<P: AsRef<Path>>(dir: P, extensions: &[&str], excluded: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let excluded: Vec<PathBuf> = excluded.iter().filter_map(|p| p.canonicalize().ok()).collect();

        let mut result = Vec::new();
        let walker = WalkDir::new(dir).follow_links(true).into_iter().filter_entry(|entry| {
            !entry.file_type().is_dir()
                || excluded.is_empty()
                || entry
                    .path()
                    .canonicalize()
                    .map(|path| !excluded.iter().any(|ex| path.starts_with(ex)))
                    .unwrap_or(true)
        });

        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to read directory entry under {:?}", dir))?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }

            let matches = path
                .extension()
                .map(|ext| ext.to_string_lossy())
                .is_some_and(|ext| extensions.iter().any(|wanted| ext.eq_ignore_ascii_case(wanted.trim_start_matches('.'))));
            if matches {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// `path` relative to `root`, `/`-separated
    pub fn relative_key(root: &Path, path: &Path) -> String {
        let relative = path.strip_prefix(root).unwrap_or(path);
        relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Where the `language` translation of `key` lands: `<output_dir>/<language>/<key>`
    pub fn output_path(output_dir: &Path, language: &str, key: &str) -> PathBuf {
        key.split('/')
            .filter(|part| !part.is_empty() && *part != "." && *part != "..")
            .fold(output_dir.join(language), |path, part| path.join(part))
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Write through a temp file in the same directory and rename it into place
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&parent)?;

        let mut temp = NamedTempFile::new_in(&parent)
            .with_context(|| format!("Failed to create temp file in {:?}", parent))?;
        temp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write temp file for {:?}", path))?;
        temp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to move translation into place: {:?}", path))?;

        Ok(())
    }
}
