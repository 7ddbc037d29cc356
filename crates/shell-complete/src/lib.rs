//! Tab-completion engine.
//!
//! Pure: `complete` takes the current line plus read-only sources and returns
//! candidates; `apply_single` rewrites the line for the one-match case. The
//! input machine decides what to do with zero or many candidates.
//!
//! Rules: a single in-progress token completes against command names; further
//! tokens complete against filesystem entries, but only when the leading
//! command is path-aware. Commands that change the working directory only see
//! directories. Candidates are lexicographic; names are unique per directory
//! so no secondary tie-break exists.

use shell_vfs::Vfs;

/// Commands whose arguments complete against the filesystem.
pub const PATH_AWARE_COMMANDS: &[&str] = &["cd", "ls", "cat"];

/// Path-aware commands that move the working directory: directory candidates
/// only.
pub const DIR_ONLY_COMMANDS: &[&str] = &["cd"];

/// Read-only inputs to one completion request.
pub struct CompletionSources<'a> {
    /// Registered command names.
    pub commands: &'a [&'a str],
    pub vfs: &'a Vfs,
    pub cwd: &'a str,
}

pub fn complete(text: &str, sources: &CompletionSources<'_>) -> Vec<String> {
    let trailing_ws = !text.trim().is_empty() && text.ends_with(char::is_whitespace);
    let tokens: Vec<&str> = text.split_whitespace().collect();

    if tokens.len() <= 1 && !trailing_ws {
        let prefix = tokens.first().copied().unwrap_or("");
        let mut out: Vec<String> = sources
            .commands
            .iter()
            .filter(|name| name.starts_with(prefix))
            .map(|name| name.to_string())
            .collect();
        out.sort();
        return out;
    }

    let leading = tokens[0];
    if !PATH_AWARE_COMMANDS.contains(&leading) {
        return Vec::new();
    }

    let last = if trailing_ws {
        ""
    } else {
        tokens.last().copied().unwrap_or("")
    };
    let (dir_part, prefix) = match last.rfind('/') {
        Some(i) => (&last[..=i], &last[i + 1..]),
        None => ("", last),
    };

    let dir_path = Vfs::resolve(sources.cwd, dir_part);
    let Some(dir) = sources.vfs.stat_at(&dir_path) else {
        return Vec::new();
    };
    let dirs_only = DIR_ONLY_COMMANDS.contains(&leading);
    let mut out: Vec<String> = dir
        .children()
        .iter()
        .filter(|e| e.name().starts_with(prefix))
        .filter(|e| !dirs_only || e.is_dir())
        .map(|e| e.name().to_string())
        .collect();
    out.sort();
    out
}

/// Rewrite the line for a single-candidate completion: the final segment of
/// the token under the cursor is replaced, everything before it is preserved.
pub fn apply_single(text: &str, candidate: &str) -> String {
    if !text.trim().is_empty() && text.ends_with(char::is_whitespace) {
        return format!("{text}{candidate}");
    }
    let (head, last) = match text.rfind(char::is_whitespace) {
        Some(i) => text.split_at(i + 1),
        None => ("", text),
    };
    let kept = match last.rfind('/') {
        Some(j) => &last[..=j],
        None => "",
    };
    format!("{head}{kept}{candidate}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMANDS: &[&str] = &[
        "cat", "cd", "clear", "echo", "github", "goto", "help", "ls", "pwd",
    ];

    fn sources<'a>(vfs: &'a Vfs) -> CompletionSources<'a> {
        CompletionSources {
            commands: COMMANDS,
            vfs,
            cwd: "/",
        }
    }

    #[test]
    fn single_token_completes_command_names_lexicographically() {
        let vfs = Vfs::portfolio();
        assert_eq!(complete("go", &sources(&vfs)), vec!["github", "goto"]);
    }

    #[test]
    fn empty_line_offers_every_command() {
        let vfs = Vfs::portfolio();
        assert_eq!(complete("", &sources(&vfs)).len(), COMMANDS.len());
    }

    #[test]
    fn no_match_yields_empty() {
        let vfs = Vfs::portfolio();
        assert!(complete("zz", &sources(&vfs)).is_empty());
    }

    #[test]
    fn path_aware_command_completes_entries() {
        let vfs = Vfs::portfolio();
        assert_eq!(complete("cat re", &sources(&vfs)), vec!["readme.txt"]);
    }

    #[test]
    fn trailing_space_lists_whole_directory() {
        let vfs = Vfs::portfolio();
        let got = complete("ls ", &sources(&vfs));
        assert_eq!(got, vec!["docs", "projects", "readme.txt"]);
    }

    #[test]
    fn cd_sees_directories_only() {
        let vfs = Vfs::portfolio();
        let got = complete("cd ", &sources(&vfs));
        assert_eq!(got, vec!["docs", "projects"]);
    }

    #[test]
    fn nested_path_completes_under_resolved_directory() {
        let vfs = Vfs::portfolio();
        assert_eq!(
            complete("cat docs/a", &sources(&vfs)),
            vec!["about.md"]
        );
    }

    #[test]
    fn non_path_aware_command_gets_no_argument_candidates() {
        let vfs = Vfs::portfolio();
        assert!(complete("echo re", &sources(&vfs)).is_empty());
    }

    #[test]
    fn apply_single_replaces_final_segment() {
        assert_eq!(apply_single("go", "goto"), "goto");
        assert_eq!(apply_single("cat re", "readme.txt"), "cat readme.txt");
        assert_eq!(apply_single("cat docs/a", "about.md"), "cat docs/about.md");
        assert_eq!(apply_single("cd ", "docs"), "cd docs");
    }
}
