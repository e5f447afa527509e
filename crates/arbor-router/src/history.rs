//! Session history: the location a router reads and the entries it pushes.

/// Browser-history shaped storage of locations.
///
/// A location is either a path (`/products?page=2`) or, with hash routing,
/// a fragment (`#/products?page=2`).
pub trait History {
    fn location(&self) -> String;
    /// Adds an entry after the current one, dropping any forward entries.
    fn push(&mut self, location: &str);
    /// Moves the cursor by `delta`. Returns `false` (and stays put) when the
    /// target entry does not exist.
    fn go(&mut self, delta: isize) -> bool;
}

/// In-memory history with an entry stack and a cursor.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<String>,
    cursor: usize,
    pushes: usize,
}

impl MemoryHistory {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: vec![initial.into()],
            cursor: 0,
            pushes: 0,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of `push` calls since creation.
    pub fn push_count(&self) -> usize {
        self.pushes
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("")
    }
}

impl History for MemoryHistory {
    fn location(&self) -> String {
        self.entries[self.cursor].clone()
    }

    fn push(&mut self, location: &str) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(location.to_string());
        self.cursor = self.entries.len() - 1;
        self.pushes += 1;
    }

    fn go(&mut self, delta: isize) -> bool {
        match self.cursor.checked_add_signed(delta) {
            Some(target) if target < self.entries.len() => {
                self.cursor = target;
                true
            }
            _ => false,
        }
    }
}

/// Path (with query) addressed by `location`.
pub fn location_path(location: &str, use_hash: bool) -> String {
    let path = if use_hash {
        location.split_once('#').map(|(_, hash)| hash).unwrap_or("")
    } else {
        location.split('#').next().unwrap_or("")
    };
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

/// History entry stored for `path`.
pub fn path_location(path: &str, use_hash: bool) -> String {
    if use_hash {
        format!("#{path}")
    } else {
        path.to_string()
    }
}
