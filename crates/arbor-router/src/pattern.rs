//! Route path patterns: `/products/:slug` style paths compiled to anchored regexes.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::RouteError;

/// Named path parameters in pattern order.
pub type Params = IndexMap<String, String>;

static PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(\w+)").expect("parameter pattern"));

static SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/{2,}").expect("slash pattern"));

/// Collapses repeated slashes and drops a trailing slash, keeping `/` itself.
pub fn normalize_path(path: &str) -> String {
    let collapsed = SLASHES.replace_all(path, "/");
    let trimmed = collapsed.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Joins a child route path onto its parent: `/admin` + `users` -> `/admin/users`.
pub fn join_paths(parent: &str, child: &str) -> String {
    normalize_path(&format!(
        "{}/{}",
        parent.trim_end_matches('/'),
        child.trim_start_matches('/')
    ))
}

#[derive(Debug, Clone)]
pub struct RoutePattern {
    path: String,
    keys: Vec<String>,
    exact: Regex,
    prefix: Regex,
}

impl RoutePattern {
    pub fn compile(path: &str) -> Result<Self, RouteError> {
        let path = normalize_path(path);
        let mut body = String::new();
        let mut keys = Vec::new();
        let mut last = 0;
        for captures in PARAM.captures_iter(&path) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            body.push_str(&regex::escape(&path[last..whole.start()]));
            body.push_str("([^/]+)");
            keys.push(name.as_str().to_string());
            last = whole.end();
        }
        body.push_str(&regex::escape(&path[last..]));

        let invalid = |err: regex::Error| RouteError::InvalidPattern {
            pattern: path.clone(),
            reason: err.to_string(),
        };
        let exact = Regex::new(&format!("^{body}$")).map_err(invalid)?;
        let prefix = if path == "/" {
            Regex::new("^/").map_err(invalid)?
        } else {
            Regex::new(&format!("^{body}(?:/|$)")).map_err(invalid)?
        };
        Ok(Self {
            path,
            keys,
            exact,
            prefix,
        })
    }

    /// Normalized source path.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_match(&self, pathname: &str) -> bool {
        self.exact.is_match(pathname)
    }

    /// Whether `pathname` is this path or lies below it.
    pub fn is_prefix_of(&self, pathname: &str) -> bool {
        self.prefix.is_match(pathname)
    }

    /// Parameters of an exact match.
    pub fn params(&self, pathname: &str) -> Option<Params> {
        let captures = self.exact.captures(pathname)?;
        Some(
            self.keys
                .iter()
                .enumerate()
                .filter_map(|(index, key)| {
                    captures
                        .get(index + 1)
                        .map(|value| (key.clone(), value.as_str().to_string()))
                })
                .collect(),
        )
    }
}
