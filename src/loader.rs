//! Template path namespaces.
//!
//! Template sources are addressed with namespaced paths like
//! `@reports/quarterly.xlsx`, where the `reports` namespace maps to one or
//! more registered directories. Resolution picks the first registered
//! directory that actually contains the file; anything that does not resolve
//! passes through unchanged so plain filesystem paths keep working.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Registry of namespace-to-directory mappings for template paths.
///
/// Namespaces are case-sensitive and directories are searched in
/// registration order.
#[derive(Debug, Default)]
pub struct TemplateLoader {
    namespaces: HashMap<String, Vec<PathBuf>>,
    order: Vec<String>,
}

impl TemplateLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a directory under a namespace (without the `@` prefix).
    pub fn add_path(&mut self, namespace: impl Into<String>, dir: impl Into<PathBuf>) {
        let namespace = namespace.into();
        if !self.namespaces.contains_key(&namespace) {
            self.order.push(namespace.clone());
        }
        self.namespaces.entry(namespace).or_default().push(dir.into());
    }

    /// Registered namespaces, in registration order.
    pub fn namespaces(&self) -> &[String] {
        &self.order
    }

    /// Directories registered under a namespace.
    pub fn paths(&self, namespace: &str) -> &[PathBuf] {
        self.namespaces
            .get(namespace)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Expands a namespaced path to the first existing concrete path.
    ///
    /// Paths that do not start with `@`, reference an unregistered namespace,
    /// or match no existing file are returned unchanged.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let Some(rest) = path.strip_prefix('@') else {
            return PathBuf::from(path);
        };

        for namespace in &self.order {
            let Some(relative) = rest
                .strip_prefix(namespace.as_str())
                .and_then(|r| r.strip_prefix('/'))
            else {
                continue;
            };

            for dir in self.paths(namespace) {
                let candidate = dir.join(relative);
                if candidate.exists() {
                    log::debug!("resolved {path} to {}", candidate.display());
                    return candidate;
                }
            }
        }

        log::debug!("{path} did not resolve to an existing file, passing through");
        PathBuf::from(path)
    }
}

impl<S: Into<String>, P: AsRef<Path>> FromIterator<(S, P)> for TemplateLoader {
    fn from_iter<I: IntoIterator<Item = (S, P)>>(iter: I) -> Self {
        let mut loader = TemplateLoader::new();
        for (namespace, dir) in iter {
            loader.add_path(namespace, dir.as_ref());
        }
        loader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_non_namespaced_path_passes_through() {
        let loader = TemplateLoader::new();
        assert_eq!(
            loader.resolve("templates/report.xlsx"),
            PathBuf::from("templates/report.xlsx")
        );
    }

    #[test]
    fn test_namespaced_path_resolves_to_first_existing() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::write(second.path().join("report.xlsx"), b"fixture").unwrap();

        let mut loader = TemplateLoader::new();
        loader.add_path("reports", first.path());
        loader.add_path("reports", second.path());

        // Only the second directory has the file.
        assert_eq!(
            loader.resolve("@reports/report.xlsx"),
            second.path().join("report.xlsx")
        );

        // Once the first directory has it too, registration order wins.
        fs::write(first.path().join("report.xlsx"), b"fixture").unwrap();
        assert_eq!(
            loader.resolve("@reports/report.xlsx"),
            first.path().join("report.xlsx")
        );
    }

    #[test]
    fn test_unregistered_namespace_passes_through() {
        let mut loader = TemplateLoader::new();
        loader.add_path("reports", "/tmp");

        assert_eq!(
            loader.resolve("@invoices/a.xlsx"),
            PathBuf::from("@invoices/a.xlsx")
        );
    }

    #[test]
    fn test_missing_file_passes_through() {
        let dir = tempdir().unwrap();
        let mut loader = TemplateLoader::new();
        loader.add_path("reports", dir.path());

        assert_eq!(
            loader.resolve("@reports/missing.xlsx"),
            PathBuf::from("@reports/missing.xlsx")
        );
    }

    #[test]
    fn test_namespaces_are_case_sensitive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.xlsx"), b"fixture").unwrap();

        let mut loader = TemplateLoader::new();
        loader.add_path("Reports", dir.path());

        assert_eq!(
            loader.resolve("@reports/a.xlsx"),
            PathBuf::from("@reports/a.xlsx")
        );
        assert_eq!(loader.resolve("@Reports/a.xlsx"), dir.path().join("a.xlsx"));
    }

    #[test]
    fn test_nested_relative_paths_resolve() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/a.xlsx"), b"fixture").unwrap();

        let loader: TemplateLoader = [("t", dir.path())].into_iter().collect();
        assert_eq!(
            loader.resolve("@t/sub/a.xlsx"),
            dir.path().join("sub/a.xlsx")
        );
    }
}
