//! File operations: bulk rename, metadata, directory tree, search

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use termtree::Tree;
use tracing::debug;
use walkdir::WalkDir;

use super::{human_size, HandlerError, HandlerResult};
use crate::cli::report::Report;

const METADATA_LIMIT: usize = 50;
const SEARCH_LIMIT: usize = 100;

/// Filename transformation for `rename`.
#[derive(Debug, Default, Clone)]
pub struct RenameOptions {
    /// Only files whose name contains this substring
    pub pattern: Option<String>,
    pub prefix: Option<String>,
    /// Inserted before the extension
    pub suffix: Option<String>,
    pub replace_from: Option<String>,
    pub replace_to: Option<String>,
}

impl RenameOptions {
    /// Apply prefix, suffix-before-extension, and find/replace to one name.
    fn new_name(&self, name: &str) -> String {
        let mut out = name.to_string();

        if let Some(prefix) = &self.prefix {
            out = format!("{prefix}{out}");
        }

        if let Some(suffix) = &self.suffix {
            let path = Path::new(&out);
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| out.clone());
            out = match path.extension() {
                Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
                None => format!("{stem}{suffix}"),
            };
        }

        if let Some(from) = &self.replace_from {
            if !from.is_empty() {
                let to = self.replace_to.as_deref().unwrap_or("");
                out = out.replace(from, to);
            }
        }

        out
    }

    fn matches(&self, name: &str) -> bool {
        match &self.pattern {
            Some(pattern) => name.contains(pattern.as_str()),
            None => true,
        }
    }
}

/// Bulk rename the files of `directory`. Preview unless `apply`.
pub fn rename(directory: &Path, options: &RenameOptions, apply: bool) -> HandlerResult {
    debug!(directory = %directory.display(), ?options, apply, "bulk rename");

    if !directory.exists() {
        return Err(HandlerError::NotFound(format!(
            "directory not found: {}",
            directory.display()
        )));
    }
    if !directory.is_dir() {
        return Err(HandlerError::InvalidInput(format!(
            "path is not a directory: {}",
            directory.display()
        )));
    }

    let mut operations: Vec<(PathBuf, PathBuf, String, String)> = Vec::new();
    let entries = fs::read_dir(directory)
        .map_err(|e| HandlerError::io(format!("read {}", directory.display()), e))?;

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let old_name = entry.file_name().to_string_lossy().into_owned();
        if !options.matches(&old_name) {
            continue;
        }
        let new_name = options.new_name(&old_name);
        if new_name != old_name {
            operations.push((path.clone(), directory.join(&new_name), old_name, new_name));
        }
    }

    if operations.is_empty() {
        return Ok(Report::text(
            "No files would be renamed with the given options",
        ));
    }

    operations.sort_by(|a, b| a.2.cmp(&b.2));

    let rows = operations
        .iter()
        .map(|(_, _, old, new)| vec![old.clone(), new.clone()])
        .collect();
    let table = Report::table(
        format!("Bulk rename ({} file(s))", operations.len()),
        vec!["Old name", "New name"],
        rows,
    );

    if !apply {
        return Ok(Report::Multi(vec![
            table,
            Report::text("Preview only. Pass --apply to perform the renames."),
        ]));
    }

    let total = operations.len();
    let mut renamed = 0usize;
    for (old_path, new_path, old_name, _) in &operations {
        match fs::rename(old_path, new_path) {
            Ok(()) => renamed += 1,
            Err(e) => crate::cli::output::warning(&format!("could not rename {old_name}: {e}")),
        }
    }

    Ok(Report::Multi(vec![
        table,
        Report::text(format!("Renamed {renamed}/{total} file(s)")),
    ]))
}

/// Metadata for one file, or the files directly inside a directory.
pub fn metadata(path: &Path) -> HandlerResult {
    if !path.exists() {
        return Err(HandlerError::NotFound(format!(
            "path not found: {}",
            path.display()
        )));
    }

    let mut files: Vec<PathBuf> = if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        fs::read_dir(path)
            .map_err(|e| HandlerError::io(format!("read {}", path.display()), e))?
            .flatten()
            .map(|entry| entry.path())
            .filter(|p| p.is_file())
            .collect()
    };

    if files.is_empty() {
        return Ok(Report::text("No files found"));
    }

    files.sort();
    let total = files.len();

    let mut rows = Vec::new();
    for file in files.iter().take(METADATA_LIMIT) {
        let md = match file.metadata() {
            Ok(md) => md,
            Err(e) => {
                crate::cli::output::warning(&format!(
                    "could not read metadata for {}: {e}",
                    file.display()
                ));
                continue;
            }
        };

        let name: String = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
            .chars()
            .take(40)
            .collect();

        let kind = file
            .extension()
            .map(|e| e.to_string_lossy().to_uppercase())
            .unwrap_or_else(|| "no ext".into());

        let modified = md
            .modified()
            .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|_| "-".into());

        rows.push(vec![
            name,
            human_size(md.len()),
            kind,
            modified,
            permissions(&md),
        ]);
    }

    let table = Report::table(
        "File metadata",
        vec!["Name", "Size", "Type", "Modified", "Permissions"],
        rows,
    );

    if total > METADATA_LIMIT {
        Ok(Report::Multi(vec![
            table,
            Report::text(format!("Showing first {METADATA_LIMIT} of {total} files")),
        ]))
    } else {
        Ok(table)
    }
}

/// Render a directory tree, directories first, capped at `max_depth`.
pub fn tree(directory: &Path, max_depth: usize, show_hidden: bool) -> HandlerResult {
    if !directory.exists() {
        return Err(HandlerError::NotFound(format!(
            "directory not found: {}",
            directory.display()
        )));
    }
    if !directory.is_dir() {
        return Err(HandlerError::InvalidInput(format!(
            "path is not a directory: {}",
            directory.display()
        )));
    }

    let root_label = directory
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| directory.display().to_string());

    Ok(Report::Tree(build_tree(
        directory, root_label, 0, max_depth, show_hidden,
    )))
}

fn build_tree(
    dir: &Path,
    label: String,
    depth: usize,
    max_depth: usize,
    show_hidden: bool,
) -> Tree<String> {
    let mut node = Tree::new(label);
    if depth >= max_depth {
        return node;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => {
            node.push(Tree::new("(permission denied)".to_string()));
            return node;
        }
    };

    let mut children: Vec<(bool, String, PathBuf)> = entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            (path.is_dir(), name, path)
        })
        .filter(|(_, name, _)| show_hidden || !name.starts_with('.'))
        .collect();

    // directories first, then case-insensitive by name
    children.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| a.1.to_lowercase().cmp(&b.1.to_lowercase()))
    });

    for (is_dir, name, path) in children {
        if is_dir {
            node.push(build_tree(&path, name, depth + 1, max_depth, show_hidden));
        } else {
            node.push(Tree::new(name));
        }
    }

    node
}

/// Size and name filters for `search`.
#[derive(Debug, Default, Clone)]
pub struct SearchFilters {
    pub name: Option<String>,
    pub extension: Option<String>,
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
}

impl SearchFilters {
    fn matches(&self, file_name: &str, extension: Option<&str>, size: u64) -> bool {
        if let Some(name) = &self.name {
            if !file_name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(wanted) = &self.extension {
            let wanted = wanted.trim_start_matches('.').to_lowercase();
            match extension {
                Some(ext) if ext.to_lowercase() == wanted => {}
                _ => return false,
            }
        }
        if let Some(min) = self.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.max_size {
            if size > max {
                return false;
            }
        }
        true
    }
}

/// Recursive file search, results sorted by size descending.
pub fn search(directory: &Path, filters: &SearchFilters) -> HandlerResult {
    debug!(directory = %directory.display(), ?filters, "searching files");

    if !directory.exists() {
        return Err(HandlerError::NotFound(format!(
            "directory not found: {}",
            directory.display()
        )));
    }

    let mut results: Vec<(PathBuf, u64)> = Vec::new();
    for entry in WalkDir::new(directory).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }

        let size = match entry.metadata() {
            Ok(md) => md.len(),
            Err(_) => continue,
        };

        let name = entry.file_name().to_string_lossy();
        let extension = entry
            .path()
            .extension()
            .map(|e| e.to_string_lossy().into_owned());

        if filters.matches(&name, extension.as_deref(), size) {
            let relative = entry
                .path()
                .strip_prefix(directory)
                .unwrap_or(entry.path())
                .to_path_buf();
            results.push((relative, size));
        }
    }

    if results.is_empty() {
        return Ok(Report::text("No files found matching criteria"));
    }

    results.sort_by(|a, b| b.1.cmp(&a.1));
    let total = results.len();

    let rows = results
        .iter()
        .take(SEARCH_LIMIT)
        .map(|(path, size)| vec![path.display().to_string(), human_size(*size)])
        .collect();

    let table = Report::table(
        format!("Search results ({total} file(s))"),
        vec!["Path", "Size"],
        rows,
    );

    if total > SEARCH_LIMIT {
        Ok(Report::Multi(vec![
            table,
            Report::text(format!("Showing first {SEARCH_LIMIT} of {total} results")),
        ]))
    } else {
        Ok(table)
    }
}

#[cfg(unix)]
fn permissions(md: &fs::Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format!("{:03o}", md.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permissions(md: &fs::Metadata) -> String {
    if md.permissions().readonly() {
        "ro".into()
    } else {
        "rw".into()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn opts(
        prefix: Option<&str>,
        suffix: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> RenameOptions {
        RenameOptions {
            pattern: None,
            prefix: prefix.map(Into::into),
            suffix: suffix.map(Into::into),
            replace_from: from.map(Into::into),
            replace_to: to.map(Into::into),
        }
    }

    #[test]
    fn given_prefix_when_renaming_then_prepended() {
        assert_eq!(opts(Some("new_"), None, None, None).new_name("a.txt"), "new_a.txt");
    }

    #[test]
    fn given_suffix_when_renaming_then_inserted_before_extension() {
        assert_eq!(opts(None, Some("_v2"), None, None).new_name("a.txt"), "a_v2.txt");
        assert_eq!(opts(None, Some("_v2"), None, None).new_name("README"), "README_v2");
    }

    #[test]
    fn given_replace_when_renaming_then_all_occurrences_replaced() {
        assert_eq!(
            opts(None, None, Some("draft"), Some("final")).new_name("draft_draft.md"),
            "final_final.md"
        );
    }

    #[test]
    fn given_replace_without_target_when_renaming_then_removes_match() {
        assert_eq!(opts(None, None, Some("_tmp"), None).new_name("a_tmp.txt"), "a.txt");
    }

    #[test]
    fn given_combined_options_when_renaming_then_applied_in_order() {
        let options = opts(Some("x_"), Some("_y"), Some("old"), Some("new"));
        assert_eq!(options.new_name("old.txt"), "x_new_y.txt");
    }

    #[test]
    fn given_pattern_when_filtering_then_substring_match() {
        let options = RenameOptions {
            pattern: Some("report".into()),
            ..Default::default()
        };
        assert!(options.matches("report_2024.csv"));
        assert!(!options.matches("summary.csv"));
    }

    #[rstest]
    #[case(None, None, None, None, true)]
    #[case(Some("log"), None, None, None, true)]
    #[case(Some("LOG"), None, None, None, true)]
    #[case(Some("zzz"), None, None, None, false)]
    #[case(None, Some(".txt"), None, None, true)]
    #[case(None, Some("txt"), None, None, true)]
    #[case(None, Some("md"), None, None, false)]
    #[case(None, None, Some(100), None, true)]
    #[case(None, None, Some(1000), None, false)]
    #[case(None, None, None, Some(1000), true)]
    #[case(None, None, None, Some(100), false)]
    fn given_filters_when_matching_then_all_constraints_hold(
        #[case] name: Option<&str>,
        #[case] extension: Option<&str>,
        #[case] min_size: Option<u64>,
        #[case] max_size: Option<u64>,
        #[case] expected: bool,
    ) {
        let filters = SearchFilters {
            name: name.map(Into::into),
            extension: extension.map(Into::into),
            min_size,
            max_size,
        };
        assert_eq!(filters.matches("syslog.txt", Some("txt"), 512), expected);
    }

    #[test]
    fn given_missing_directory_when_renaming_then_not_found() {
        let err = rename(Path::new("/nonexistent"), &RenameOptions::default(), false).unwrap_err();
        assert!(matches!(err, HandlerError::NotFound(_)));
    }

    #[test]
    fn given_tempdir_when_previewing_rename_then_files_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.txt"), "x").expect("write");

        let options = opts(Some("new_"), None, None, None);
        let report = rename(dir.path(), &options, false).expect("preview");

        assert!(dir.path().join("a.txt").exists());
        assert!(!dir.path().join("new_a.txt").exists());
        assert!(matches!(report, Report::Multi(_)));
    }

    #[test]
    fn given_tempdir_when_applying_rename_then_files_moved() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.txt"), "x").expect("write");

        let options = opts(Some("new_"), None, None, None);
        rename(dir.path(), &options, true).expect("apply");

        assert!(!dir.path().join("a.txt").exists());
        assert!(dir.path().join("new_a.txt").exists());
    }
}
