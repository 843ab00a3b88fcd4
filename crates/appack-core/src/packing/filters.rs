//! Exclusion rules for packing.
//!
//! A path is left out of the archive when its logical name starts with a
//! configured prefix, ends with a configured suffix, or when its base name
//! matches one of the configured regular expressions. The three rule kinds
//! are independent: any single match excludes the path and nothing can
//! re-include it.

use crate::PackError;
use crate::Result;
use crate::packing::config::SymlinkPolicy;
use crate::packing::walker::OutputIdentity;
use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;

/// Compiled prefix, suffix and name rules.
///
/// Built once per packing operation. Regular expressions are compiled at
/// construction, so an invalid pattern is reported before any directory is
/// read.
///
/// # Examples
///
/// ```
/// use appack_core::packing::filters::ExclusionPolicy;
///
/// let policy = ExclusionPolicy::new(&["."], &[".go"], &[r"^.*\.log$"]).unwrap();
///
/// assert!(policy.is_excluded(".git/config"));
/// assert!(policy.is_excluded("main.go"));
/// assert!(policy.is_excluded_name("debug.log"));
/// assert!(!policy.is_excluded("README.md"));
///
/// // The root itself is never excluded.
/// assert!(!policy.is_excluded(""));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExclusionPolicy {
    prefixes: Vec<String>,
    suffixes: Vec<String>,
    patterns: Vec<Regex>,
}

impl ExclusionPolicy {
    /// Builds a policy from prefix strings, suffix strings and regex sources.
    ///
    /// Empty prefix and suffix strings are dropped since they would match
    /// every path. Empty regex sources are dropped as well.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidPattern`] for the first pattern that does
    /// not compile.
    pub fn new<P, S, R>(prefixes: &[P], suffixes: &[S], patterns: &[R]) -> Result<Self>
    where
        P: AsRef<str>,
        S: AsRef<str>,
        R: AsRef<str>,
    {
        let patterns = patterns
            .iter()
            .map(AsRef::as_ref)
            .filter(|p| !p.is_empty())
            .map(|p| {
                Regex::new(p).map_err(|source| PackError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            prefixes: non_empty(prefixes),
            suffixes: non_empty(suffixes),
            patterns,
        })
    }

    /// Checks the prefix and suffix rules against a logical name.
    ///
    /// The empty logical name denotes the root and is never excluded.
    #[must_use]
    pub fn is_excluded(&self, logical_name: &str) -> bool {
        if logical_name.is_empty() {
            return false;
        }

        self.prefixes
            .iter()
            .any(|prefix| logical_name.starts_with(prefix.as_str()))
            || self
                .suffixes
                .iter()
                .any(|suffix| logical_name.ends_with(suffix.as_str()))
    }

    /// Checks the regular expressions against a base name.
    #[must_use]
    pub fn is_excluded_name(&self, base_name: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(base_name))
    }

    /// Checks every rule against a logical name.
    ///
    /// The base name is the final `/`-separated component.
    ///
    /// # Examples
    ///
    /// ```
    /// use appack_core::packing::filters::ExclusionPolicy;
    ///
    /// let no_rules: [&str; 0] = [];
    /// let policy = ExclusionPolicy::new(&no_rules, &no_rules, &["^secret"]).unwrap();
    /// assert!(policy.rejects("conf/secret.yml"));
    /// assert!(!policy.rejects("secret/app.yml"));
    /// ```
    #[must_use]
    pub fn rejects(&self, logical_name: &str) -> bool {
        if logical_name.is_empty() {
            return false;
        }
        self.is_excluded_name(base_name(logical_name)) || self.is_excluded(logical_name)
    }

    /// Returns `true` if no rule of any kind is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.suffixes.is_empty() && self.patterns.is_empty()
    }

    /// Configured prefixes.
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Configured suffixes.
    #[must_use]
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Source strings of the configured regular expressions.
    pub fn pattern_sources(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }

    /// Determines whether a directory holds nothing that would be archived.
    ///
    /// The check recurses through subdirectories and discards excluded
    /// paths, excluded names, ignored symlinks and special files. Symlinks
    /// that would be recorded or followed count as content, except dangling
    /// links while following. Nothing is cached: the result reflects the
    /// filesystem at call time.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a directory cannot be listed or a symlink
    /// target cannot be inspected.
    pub fn is_empty_dir(
        &self,
        dir: &Path,
        logical_name: &str,
        symlinks: SymlinkPolicy,
    ) -> io::Result<bool> {
        self.is_empty_dir_ignoring(dir, logical_name, symlinks, None)
    }

    /// Same as [`is_empty_dir`](Self::is_empty_dir), but the archive being
    /// written does not count as content.
    pub(crate) fn is_empty_dir_ignoring(
        &self,
        dir: &Path,
        logical_name: &str,
        symlinks: SymlinkPolicy,
        output: Option<&OutputIdentity>,
    ) -> io::Result<bool> {
        let is_output = |path: &Path, metadata: &fs::Metadata| {
            output.is_some_and(|output| output.matches(path, metadata))
        };

        for child in fs::read_dir(dir)? {
            let child = child?;
            let name = child.file_name();
            let name = name.to_string_lossy();
            let child_logical = join_logical(logical_name, &name);

            if self.is_excluded_name(&name) || self.is_excluded(&child_logical) {
                continue;
            }

            let path = child.path();
            let file_type = child.file_type()?;
            if file_type.is_symlink() {
                match symlinks {
                    SymlinkPolicy::Skip => continue,
                    SymlinkPolicy::Record => return Ok(false),
                    SymlinkPolicy::Follow => match fs::metadata(&path) {
                        Ok(target) if is_output(&path, &target) => continue,
                        Ok(_) => return Ok(false),
                        Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                        Err(e) => return Err(e),
                    },
                }
            }

            if file_type.is_dir() {
                if self.is_empty_dir_ignoring(&path, &child_logical, symlinks, output)? {
                    continue;
                }
                return Ok(false);
            }

            if file_type.is_file() {
                if is_output(&path, &child.metadata()?) {
                    continue;
                }
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Joins a parent logical name and a child file name with `/`.
///
/// # Examples
///
/// ```
/// use appack_core::packing::filters::join_logical;
///
/// assert_eq!(join_logical("", "README.md"), "README.md");
/// assert_eq!(join_logical("static/css", "site.css"), "static/css/site.css");
/// ```
#[must_use]
pub fn join_logical(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Returns the final component of a logical name.
#[must_use]
pub fn base_name(logical_name: &str) -> &str {
    logical_name
        .rsplit_once('/')
        .map_or(logical_name, |(_, name)| name)
}

/// Computes the `/`-separated logical name of `path` relative to `root`.
///
/// Returns `None` when `path` is not under `root`. The root maps to "".
///
/// # Examples
///
/// ```
/// use appack_core::packing::filters::logical_name;
/// use std::path::Path;
///
/// let root = Path::new("/srv/app");
/// assert_eq!(
///     logical_name(root, Path::new("/srv/app/views/index.tpl")).as_deref(),
///     Some("views/index.tpl")
/// );
/// assert_eq!(logical_name(root, root).as_deref(), Some(""));
/// assert_eq!(logical_name(root, Path::new("/etc/passwd")), None);
/// ```
#[must_use]
pub fn logical_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}

fn non_empty<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
