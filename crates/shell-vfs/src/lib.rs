//! In-memory virtual filesystem consumed by path-aware commands and the
//! completion engine.
//!
//! Two-step contract, kept deliberately asymmetric:
//! * [`Vfs::resolve`] is pure string joining. It handles absolute vs relative
//!   targets and leaves `.` / `..` segments exactly where they are: no
//!   normalization, no existence check.
//! * [`Vfs::stat_at`] normalizes dot segments at lookup time and walks the
//!   tree, returning the entry or `None`.
//!
//! Keeping resolution lexical means `resolve("/docs", "../file.md")` yields
//! the literal `/docs/../file.md`; only a subsequent lookup collapses it.

/// One node in the tree. File content is owned; directories own their
/// children. Names are unique per directory by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File { name: String, content: String },
    Dir { name: String, children: Vec<Entry> },
}

impl Entry {
    pub fn file<N: Into<String>, C: Into<String>>(name: N, content: C) -> Self {
        Entry::File {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn dir<N: Into<String>>(name: N, children: Vec<Entry>) -> Self {
        Entry::Dir {
            name: name.into(),
            children,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entry::File { name, .. } | Entry::Dir { name, .. } => name,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Entry::Dir { .. })
    }

    pub fn children(&self) -> &[Entry] {
        match self {
            Entry::Dir { children, .. } => children,
            Entry::File { .. } => &[],
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Entry::File { content, .. } => Some(content),
            Entry::Dir { .. } => None,
        }
    }

    fn child(&self, name: &str) -> Option<&Entry> {
        self.children().iter().find(|c| c.name() == name)
    }
}

#[derive(Debug, Clone)]
pub struct Vfs {
    root: Entry,
}

impl Vfs {
    /// The root entry's own name is ignored; it is addressed as `/`.
    pub fn new(root: Entry) -> Self {
        Self { root }
    }

    /// Pure lexical join of `target` onto `cwd`. Absolute targets win; `.`
    /// and `..` are carried through untouched.
    pub fn resolve(cwd: &str, target: &str) -> String {
        if target.starts_with('/') {
            return target.to_string();
        }
        if target.is_empty() {
            return cwd.to_string();
        }
        if cwd == "/" {
            format!("/{target}")
        } else {
            format!("{}/{}", cwd.trim_end_matches('/'), target)
        }
    }

    /// Collapse `.` / `..` segments and return the canonical absolute form.
    /// `..` at the root stays at the root.
    pub fn normalize(path: &str) -> String {
        let mut stack: Vec<&str> = Vec::new();
        for seg in path.split('/') {
            match seg {
                "" | "." => {}
                ".." => {
                    stack.pop();
                }
                seg => stack.push(seg),
            }
        }
        if stack.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", stack.join("/"))
        }
    }

    /// Look up an absolute path, normalizing dot segments first.
    pub fn stat_at(&self, path: &str) -> Option<&Entry> {
        let normalized = Self::normalize(path);
        let mut node = &self.root;
        for seg in normalized.split('/').filter(|s| !s.is_empty()) {
            node = node.child(seg)?;
        }
        Some(node)
    }

    /// The demo tree served by the standalone binary and the test suites.
    pub fn portfolio() -> Self {
        Self::new(Entry::dir(
            "",
            vec![
                Entry::dir(
                    "projects",
                    vec![
                        Entry::file(
                            "kiosk.md",
                            "An embeddable terminal-shell engine.\n",
                        ),
                        Entry::file("renderer.md", "Character-cell rendering surface.\n"),
                    ],
                ),
                Entry::dir(
                    "docs",
                    vec![
                        Entry::file("about.md", "Personal portfolio, shell edition.\n"),
                        Entry::file("contact.md", "Reach out over the usual channels.\n"),
                    ],
                ),
                Entry::file(
                    "readme.txt",
                    "Type 'help' to list the available commands.\n",
                ),
            ],
        ))
    }
}
