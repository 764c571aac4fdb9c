//! Default [`Ingester`]: turns a local directory or a cloned remote repository
//! into the summary, directory tree and concatenated file text of a pretraining record.
//!
//! Remote sources are shallow-cloned via [`crate::download`]; the walk itself is
//! delegated to `walkdir`, pattern matching to `glob`, `.gitignore` rules to `ignore`.
//! A built-in ignore list (VCS metadata, dependency and build directories, caches,
//! lock files, binaries and media) always applies on top of the caller's exclude patterns.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::IngestConfig;
use crate::contract::{Ingested, Ingester, IngestionError};
use crate::download::{clone_repository, is_remote};

const SEPARATOR: &str = "================================================";
const TOO_LARGE: &str = "[File too large]";
const NON_TEXT: &str = "[Non-text file]";
const ERROR_READING: &str = "[Error reading file]";

/// Remote repositories are always cloned into this subdirectory of a fresh temp dir.
const CLONE_DIR: &str = "repo";

/// Directory names that are never descended into.
const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    "bower_components",
    "__pycache__",
    ".venv",
    "venv",
    "env",
    ".tox",
    ".nox",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "*.egg-info",
    "site-packages",
    ".idea",
    ".vscode",
    ".gradle",
    ".next",
    "build",
    "dist",
    "target",
];

/// File patterns that never contribute content.
const DEFAULT_IGNORED_FILES: &[&str] = &[
    "*.pyc",
    "*.pyo",
    "*.pyd",
    "*.so",
    "*.dylib",
    "*.dll",
    "*.exe",
    "*.o",
    "*.a",
    "*.class",
    "*.jar",
    "*.war",
    "*.egg",
    "*.whl",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "poetry.lock",
    "Pipfile.lock",
    "Cargo.lock",
    "Gemfile.lock",
    "composer.lock",
    "*.png",
    "*.jpg",
    "*.jpeg",
    "*.gif",
    "*.bmp",
    "*.ico",
    "*.svg",
    "*.webp",
    "*.tiff",
    "*.mp3",
    "*.mp4",
    "*.wav",
    "*.avi",
    "*.mov",
    "*.pdf",
    "*.zip",
    "*.tar",
    "*.gz",
    "*.tgz",
    "*.rar",
    "*.7z",
    "*.min.js",
    "*.min.css",
    "*.map",
    "*.log",
    "*.swp",
    ".DS_Store",
    "Thumbs.db",
];

pub struct DefaultIngester {
    config: IngestConfig,
}

impl DefaultIngester {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Ingests an on-disk directory; `label` heads the summary (e.g. `Directory: foo`).
    fn ingest_dir(
        &self,
        root: &Path,
        root_name: &str,
        label: &str,
        includes: &[Pattern],
        excludes: &[Pattern],
    ) -> Result<Ingested, IngestionError> {
        info!(path = %root.display(), "Walking repository");
        let files = collect_files(root, includes, excludes, self.config.max_file_size)?;

        let summary = format!("{label}\nFiles analyzed: {}\n", files.len());
        let tree = render_tree(root_name, files.iter().map(|f| f.path.as_str()));
        let mut content = String::new();
        for file in &files {
            content.push_str(SEPARATOR);
            content.push_str("\nFILE: ");
            content.push_str(&file.path);
            content.push('\n');
            content.push_str(SEPARATOR);
            content.push('\n');
            content.push_str(&file.text);
            content.push_str("\n\n");
        }

        info!(
            path = %root.display(),
            files = files.len(),
            content_len = content.len(),
            "Ingestion complete"
        );
        Ok(Ingested {
            summary,
            tree,
            content,
        })
    }
}

impl Default for DefaultIngester {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

impl Ingester for DefaultIngester {
    fn ingest(
        &self,
        source: &str,
        include_patterns: &[String],
        exclude_patterns: &[String],
    ) -> Result<Ingested, IngestionError> {
        let source = source.trim();
        let includes = compile_patterns(include_patterns)?;
        let excludes = compile_patterns(exclude_patterns)?;

        if is_remote(source) {
            let slug = url_slug(source);
            // Removed when `tmp` drops, on success and on error alike.
            let tmp = tempfile::tempdir()?;
            let dest = clone_dest(tmp.path());
            clone_repository(source, &dest, self.config.clone_depth)?;
            self.ingest_dir(
                &dest,
                &tree_root_name(&slug),
                &format!("Repository: {slug}"),
                &includes,
                &excludes,
            )
        } else {
            let path = Path::new(source);
            if !path.is_dir() {
                return Err(IngestionError::NotADirectory(source.to_string()));
            }
            let name = dir_name(path);
            self.ingest_dir(
                path,
                &name,
                &format!("Directory: {name}"),
                &includes,
                &excludes,
            )
        }
    }
}

struct FileEntry {
    /// `/`-separated path relative to the repository root.
    path: String,
    text: String,
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>, IngestionError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| IngestionError::Pattern {
                pattern: p.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

fn builtin_patterns(globs: &[&str]) -> Vec<Pattern> {
    globs.iter().filter_map(|g| Pattern::new(g).ok()).collect()
}

/// A file counts when it matches an include pattern (or there are none) and no exclude pattern.
/// Patterns are tried against both the bare file name and the relative path.
fn is_included(name: &str, rel_path: &str, includes: &[Pattern], excludes: &[Pattern]) -> bool {
    let hit = |p: &Pattern| p.matches(name) || p.matches(rel_path);
    if excludes.iter().any(hit) {
        return false;
    }
    includes.is_empty() || includes.iter().any(hit)
}

/// Rules from the repository's top-level `.gitignore`, or none.
fn load_gitignore(root: &Path) -> Gitignore {
    let path = root.join(".gitignore");
    if !path.is_file() {
        return Gitignore::empty();
    }
    let mut builder = GitignoreBuilder::new(root);
    if let Some(e) = builder.add(&path) {
        warn!(path = %path.display(), error = %e, "Problem in .gitignore, some rules skipped");
    }
    match builder.build() {
        Ok(gitignore) => gitignore,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to build .gitignore matcher");
            Gitignore::empty()
        }
    }
}

fn collect_files(
    root: &Path,
    includes: &[Pattern],
    excludes: &[Pattern],
    max_file_size: u64,
) -> Result<Vec<FileEntry>, IngestionError> {
    let ignored_dirs = builtin_patterns(DEFAULT_IGNORED_DIRS);
    let mut all_excludes = builtin_patterns(DEFAULT_IGNORED_FILES);
    all_excludes.extend(excludes.iter().cloned());
    let gitignore = load_gitignore(root);

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 {
                return true;
            }
            let is_dir = e.file_type().is_dir();
            if is_dir {
                let name = e.file_name().to_string_lossy();
                if ignored_dirs.iter().any(|p| p.matches(&name)) {
                    debug!(path = %e.path().display(), "Skipping ignored directory");
                    return false;
                }
            }
            if gitignore.matched(e.path(), is_dir).is_ignore() {
                debug!(path = %e.path().display(), "Skipping path listed in .gitignore");
                return false;
            }
            true
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(IngestionError::Walk(e.to_string())),
            Err(e) => {
                warn!(path = ?e.path(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| IngestionError::Walk(e.to_string()))?;
        let rel_path = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let name = entry.file_name().to_string_lossy();
        if !is_included(&name, &rel_path, includes, &all_excludes) {
            debug!(path = %rel_path, "Skipping file not selected by patterns");
            continue;
        }

        let text = file_text(entry.path(), &rel_path, max_file_size);
        files.push(FileEntry {
            path: rel_path,
            text,
        });
    }
    files.sort_by(|a, b| tree_order(&a.path, &b.path));
    Ok(files)
}

/// The text recorded for one file. Problems with a single file never fail the repository.
fn file_text(path: &Path, rel_path: &str, max_file_size: u64) -> String {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            warn!(path = %rel_path, error = %e, "Failed to stat file, content skipped");
            return ERROR_READING.to_string();
        }
    };
    if size > max_file_size {
        debug!(path = %rel_path, size, "File exceeds size limit, content skipped");
        return TOO_LARGE.to_string();
    }
    match fs::read(path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                debug!(path = %rel_path, "File is not UTF-8 text, content skipped");
                NON_TEXT.to_string()
            }
        },
        Err(e) => {
            warn!(path = %rel_path, error = %e, "Failed to read file, content skipped");
            ERROR_READING.to_string()
        }
    }
}

/// Order in which the tree lists paths: within a directory, files before subdirectories,
/// each group by name.
fn tree_order(a: &str, b: &str) -> Ordering {
    let a_parts: Vec<&str> = a.split('/').collect();
    let b_parts: Vec<&str> = b.split('/').collect();
    for (i, (x, y)) in a_parts.iter().zip(b_parts.iter()).enumerate() {
        let x_is_file = i + 1 == a_parts.len();
        let y_is_file = i + 1 == b_parts.len();
        match (x_is_file, y_is_file) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => match x.cmp(y) {
                Ordering::Equal => continue,
                other => return other,
            },
        }
    }
    a_parts.len().cmp(&b_parts.len())
}

#[derive(Default)]
struct DirNode {
    files: Vec<String>,
    dirs: BTreeMap<String, DirNode>,
}

impl DirNode {
    fn insert(&mut self, rel_path: &str) {
        let mut node = self;
        let mut parts = rel_path.split('/').peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                node.files.push(part.to_string());
            } else {
                node = node.dirs.entry(part.to_string()).or_default();
            }
        }
    }

    fn render(&self, prefix: &str, out: &mut String) {
        let mut files = self.files.clone();
        files.sort();
        let total = files.len() + self.dirs.len();
        let mut index = 0;
        for file in &files {
            index += 1;
            let connector = if index == total { "└── " } else { "├── " };
            out.push_str(&format!("{prefix}{connector}{file}\n"));
        }
        for (name, child) in &self.dirs {
            index += 1;
            let last = index == total;
            let connector = if last { "└── " } else { "├── " };
            out.push_str(&format!("{prefix}{connector}{name}/\n"));
            let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
            child.render(&child_prefix, out);
        }
    }
}

/// Renders the included files as a box-drawing tree rooted at `root_name/`.
fn render_tree<'a>(root_name: &str, paths: impl Iterator<Item = &'a str>) -> String {
    let mut root = DirNode::default();
    for path in paths {
        root.insert(path);
    }
    let mut out = format!("Directory structure:\n└── {root_name}/\n");
    root.render("    ", &mut out);
    out
}

fn clone_dest(tmp: &Path) -> PathBuf {
    tmp.join(CLONE_DIR)
}

/// Last slug segment, used only as the tree label.
fn tree_root_name(slug: &str) -> String {
    match slug.rsplit('/').next() {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name.to_string(),
        _ => "repository".to_string(),
    }
}

/// `https://github.com/org/repo.git` -> `org/repo`.
fn url_slug(url: &str) -> String {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let segments: Vec<&str> = without_scheme
        .trim_end_matches('/')
        .split('/')
        .skip(1)
        .filter(|s| !s.is_empty())
        .collect();
    let slug = match segments.len() {
        0 => without_scheme.trim_end_matches('/').to_string(),
        1 => segments[0].to_string(),
        n => format!("{}/{}", segments[n - 2], segments[n - 1]),
    };
    slug.trim_end_matches(".git").to_string()
}

fn dir_name(path: &Path) -> String {
    fs::canonicalize(path)
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| path.display().to_string())
}
