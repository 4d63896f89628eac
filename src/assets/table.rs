//! Route table builder for the static editor assets.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{ZoneError, ZoneResult};

/// File name that is also served under its directory path.
pub const INDEX_FILE: &str = "index.html";

/// A servable path and the file behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: String,
    pub file: PathBuf,
}

/// Immutable mapping from request path to asset file.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, PathBuf>,
}

impl RouteTable {
    /// Scan `asset_root` recursively and build the route table.
    ///
    /// Files named `excluded` are skipped at any depth. When two files
    /// normalize to the same path the one scanned last wins; directory
    /// order is platform dependent, so such collisions should be avoided.
    pub fn build(asset_root: &Path, excluded: &OsStr) -> ZoneResult<Self> {
        let metadata = fs::metadata(asset_root).map_err(|e| {
            ZoneError::Startup(format!(
                "asset root {} is not readable: {e}",
                asset_root.display()
            ))
        })?;
        if !metadata.is_dir() {
            return Err(ZoneError::Startup(format!(
                "asset root {} is not a directory",
                asset_root.display()
            )));
        }

        let mut table = Self::default();
        for file in scan_files(asset_root)? {
            if file.file_name() == Some(excluded) {
                continue;
            }
            let Ok(relative) = file.strip_prefix(asset_root) else {
                continue;
            };
            for path in route_paths(relative) {
                table.routes.insert(path, file.clone());
            }
        }

        tracing::info!(
            asset_root = %asset_root.display(),
            routes = table.len(),
            "Static routes built"
        );

        Ok(table)
    }

    /// Look up the file behind a request path.
    pub fn resolve(&self, path: &str) -> Option<&Path> {
        self.routes.get(path).map(PathBuf::as_path)
    }

    #[cfg(test)]
    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// All entries, sorted by path.
    pub fn entries(&self) -> Vec<RouteEntry> {
        let mut entries: Vec<RouteEntry> = self
            .routes
            .iter()
            .map(|(path, file)| RouteEntry {
                path: path.clone(),
                file: file.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }
}

/// Collect every regular file below `root`.
///
/// Directory symlinks are not followed; symlinks to files are kept.
fn scan_files(root: &Path) -> ZoneResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| {
            ZoneError::Startup(format!("cannot read directory {}: {e}", dir.display()))
        })?;

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                files.push(path);
            } else if file_type.is_symlink() && fs::metadata(&path).is_ok_and(|m| m.is_file()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Request paths for a file, given its path relative to the asset root.
///
/// An `index.html` is also exposed as its directory with a trailing slash.
fn route_paths(relative: &Path) -> Vec<String> {
    let joined = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    let path = normalize_route_path(&format!("/{joined}"));

    match path.strip_suffix(INDEX_FILE) {
        Some(dir) if dir.ends_with('/') => {
            let dir = dir.to_string();
            vec![path, dir]
        }
        _ => vec![path],
    }
}

/// Canonicalize separators to `/` and collapse repeated separators.
pub fn normalize_route_path(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars().map(|c| if c == '\\' { '/' } else { c }) {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}
