//! Shell integration: the `cd` line printed on stdout and the `try init` wrappers.
//!
//! The binary cannot change its parent's working directory, so every command that
//! navigates prints exactly one line for the wrapper function to `eval`.

use std::path::Path;

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShellKind {
    Bash,
    Zsh,
    Fish,
}

impl ShellKind {
    /// Guess from `$SHELL`, defaulting to bash.
    pub fn detect() -> Self {
        let shell = dotenvy::var("SHELL").unwrap_or_default();
        Self::from_shell_path(&shell)
    }

    fn from_shell_path(shell: &str) -> Self {
        match Path::new(shell).file_name().and_then(|n| n.to_str()) {
            Some("zsh") => ShellKind::Zsh,
            Some("fish") => ShellKind::Fish,
            _ => ShellKind::Bash,
        }
    }
}

/// `cd '<path>'`, quoted so the line is safe to `eval` in POSIX shells and fish.
pub fn cd_command(path: &Path) -> String {
    let path = path.to_string_lossy();
    format!("cd {}", shell_words::quote(&path))
}

/// Wrapper function that runs the binary and evaluates what it prints.
pub fn init_script(kind: ShellKind, binary: &str) -> String {
    let binary = shell_words::quote(binary);
    match kind {
        ShellKind::Bash | ShellKind::Zsh => format!(
            r#"try() {{
  local out
  case "$1" in
    clone|worktree) out=$(command {binary} "$@") ;;
    init|list|completions|help|-h|--help|-V|--version) command {binary} "$@"; return $? ;;
    exec) shift; out=$(command {binary} exec "$@") ;;
    *) out=$(command {binary} exec "$@") ;;
  esac
  local rc=$?
  [ -n "$out" ] && eval "$out"
  return $rc
}}
"#
        ),
        ShellKind::Fish => format!(
            r#"function try
    set -l out
    switch "$argv[1]"
        case clone worktree
            set out (command {binary} $argv)
        case init list completions help -h --help -V --version
            command {binary} $argv
            return $status
        case exec
            set out (command {binary} $argv)
        case '*'
            set out (command {binary} exec $argv)
    end
    set -l code $status
    test -n "$out"; and eval $out
    return $code
end
"#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn cd_command_quotes_when_needed() {
        assert_eq!(cd_command(Path::new("/tmp/tries/a")), "cd /tmp/tries/a");
        assert_eq!(
            cd_command(Path::new("/tmp/my tries/it's")),
            r#"cd '/tmp/my tries/it'\''s'"#
        );
    }

    #[test]
    fn cd_command_round_trips_through_shell_words() {
        let path = PathBuf::from("/home/u/src/tries/2026-01-01-a b;c");
        let line = cd_command(&path);
        let words = shell_words::split(&line).unwrap();
        assert_eq!(words, vec!["cd".to_string(), path.to_string_lossy().into_owned()]);
    }

    #[test]
    fn detects_shell_from_path() {
        assert_eq!(ShellKind::from_shell_path("/bin/zsh"), ShellKind::Zsh);
        assert_eq!(ShellKind::from_shell_path("/usr/bin/fish"), ShellKind::Fish);
        assert_eq!(ShellKind::from_shell_path("/bin/bash"), ShellKind::Bash);
        assert_eq!(ShellKind::from_shell_path(""), ShellKind::Bash);
    }

    #[test]
    fn init_scripts_eval_output() {
        let bash = init_script(ShellKind::Bash, "try");
        assert!(bash.starts_with("try() {"));
        assert!(bash.contains("command try exec \"$@\""));
        assert!(bash.contains("eval \"$out\""));

        let fish = init_script(ShellKind::Fish, "/opt/bin/try");
        assert!(fish.starts_with("function try"));
        assert!(fish.contains("command /opt/bin/try exec $argv"));
    }
}
