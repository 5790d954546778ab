//! Dependency manifest handling.
//!
//! The web runtime installs packages with micropip, so the desktop `flet` package
//! has to be swapped for `flet-pyodide` before the manifest ships in the archive.

use std::fs;
use std::io;
use std::path::Path;

use regex::Regex;

/// Manifest file name, both in the app directory and inside the archive.
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Core framework package, which cannot run in the browser.
pub const CORE_PACKAGE: &str = "flet";

/// Browser bridge package that replaces the core package.
pub const BRIDGE_PACKAGE: &str = "flet-pyodide";

/// An ordered list of requirement lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    lines: Vec<String>,
}

impl Requirements {
    /// Parse manifest text, one entry per line with trailing whitespace removed.
    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.lines().map(|l| l.trim_end().to_string()).collect(),
        }
    }

    /// Load a manifest, treating a missing file as empty.
    pub fn load(path: &Path) -> io::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    /// Rewrite the list for the browser runtime.
    ///
    /// Drops every line naming [`CORE_PACKAGE`] and appends [`BRIDGE_PACKAGE`]
    /// unless a line already names it. Other lines keep their order.
    pub fn merge_for_web(self) -> Self {
        let core = package_pattern(CORE_PACKAGE);

        let mut lines: Vec<String> = self
            .lines
            .into_iter()
            .filter(|line| !core.is_match(line))
            .collect();

        let bridge = package_pattern(BRIDGE_PACKAGE);
        if !lines.iter().any(|line| bridge.is_match(line)) {
            lines.push(BRIDGE_PACKAGE.to_string());
        }

        Self { lines }
    }

    /// Requirement lines in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Serialize as manifest text, each line terminated by `\n`.
    pub fn to_manifest(&self) -> String {
        self.lines.iter().map(|l| format!("{}\n", l)).collect()
    }
}

/// Matches `name` alone, or `name` followed by anything that cannot continue a
/// package name (`==`, `>=`, `[extra]`, whitespace...).
fn package_pattern(name: &str) -> Regex {
    Regex::new(&format!("^{}(?:$|[^a-z0-9-])", regex::escape(name)))
        .expect("escaped package name is a valid pattern")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn empty_manifest_gets_bridge_only() {
        let merged = Requirements::default().merge_for_web();
        assert_eq!(merged.lines(), &["flet-pyodide".to_string()]);
        assert_eq!(merged.to_manifest(), "flet-pyodide\n");
    }

    #[test]
    fn drops_core_and_keeps_pinned_bridge() {
        let merged = Requirements::parse("flet==1.0\nflet-pyodide==2.0\n").merge_for_web();
        assert_eq!(merged.lines(), &["flet-pyodide==2.0".to_string()]);
    }

    #[test]
    fn drops_every_core_variant() {
        let merged =
            Requirements::parse("flet\nflet>=0.4\nflet[all]\nflet ==1\nrequests\n").merge_for_web();
        assert_eq!(merged.to_manifest(), "requests\nflet-pyodide\n");
    }

    #[test]
    fn keeps_similarly_named_packages() {
        // `_` cannot continue a name here, so `flet_fastapi` reads as `flet`
        let merged = Requirements::parse("flet-core\nflet2\nflet_fastapi\n").merge_for_web();
        assert_eq!(
            merged.to_manifest(),
            "flet-core\nflet2\nflet-pyodide\n"
        );
    }

    #[test]
    fn bridge_prefix_is_not_a_bridge_match() {
        let merged = Requirements::parse("flet-pyodide-extras").merge_for_web();
        assert_eq!(merged.to_manifest(), "flet-pyodide-extras\nflet-pyodide\n");
    }

    #[test]
    fn trims_trailing_whitespace() {
        let reqs = Requirements::parse("numpy   \r\npandas\t\n");
        assert_eq!(
            reqs.lines(),
            &["numpy".to_string(), "pandas".to_string()]
        );
    }

    #[test]
    fn loads_missing_file_as_empty() {
        let temp = tempdir().unwrap();
        let reqs = Requirements::load(&temp.path().join(REQUIREMENTS_FILE)).unwrap();
        assert!(reqs.is_empty());
    }

    #[test]
    fn loads_existing_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(REQUIREMENTS_FILE);
        fs::write(&path, "flet\nhttpx==0.27\n").unwrap();

        let merged = Requirements::load(&path).unwrap().merge_for_web();

        assert_eq!(merged.to_manifest(), "httpx==0.27\nflet-pyodide\n");
    }
}
