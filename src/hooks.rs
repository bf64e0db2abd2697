use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Points in the workflow where user scripts may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    AfterAdd,
    AfterUpdate,
}

impl Hook {
    pub const ALL: [Hook; 2] = [Hook::AfterAdd, Hook::AfterUpdate];

    pub fn name(self) -> &'static str {
        match self {
            Hook::AfterAdd => "after_add",
            Hook::AfterUpdate => "after_update",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Hook::AfterAdd => "Executes after an issue is added to the project.",
            Hook::AfterUpdate => "Executes after an issue is edited or closed.",
        }
    }
}

/// Text printed for `--list-hooks`.
pub fn describe_hooks() -> String {
    let mut out = String::new();
    for hook in Hook::ALL {
        let _ = writeln!(out, "{}\n{}\n", hook.name(), hook.description());
    }
    out
}

/// Hook executables, looked up by hook name in each directory in order.
#[derive(Debug, Clone, Default)]
pub struct Hooks {
    dirs: Vec<PathBuf>,
    workdir: Option<PathBuf>,
}

impl Hooks {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(dirs: Vec<PathBuf>, workdir: Option<PathBuf>) -> Self {
        Self { dirs, workdir }
    }

    /// `<issue_dir>/hooks` then `~/.ditz/hooks`.
    pub fn discover(issue_dir: &Path) -> Self {
        let mut search = vec![issue_dir.join("hooks")];
        if let Some(home) = dirs::home_dir() {
            search.push(home.join(".ditz").join("hooks"));
        }
        Self::new(search, issue_dir.parent().map(Path::to_path_buf))
    }

    /// Run every executable registered for `hook` with the issue names as
    /// arguments. Returns how many ran successfully; failures are logged.
    pub fn run(&self, hook: Hook, issue_names: &[&str]) -> usize {
        let mut ran = 0;
        for dir in &self.dirs {
            let script = dir.join(hook.name());
            if !script.is_file() {
                continue;
            }
            let mut command = Command::new(&script);
            command.args(issue_names);
            if let Some(workdir) = &self.workdir {
                command.current_dir(workdir);
            }
            match command.output() {
                Ok(output) if output.status.success() => {
                    tracing::debug!("hook {} ran: {}", hook.name(), script.display());
                    ran += 1;
                }
                Ok(output) => {
                    tracing::warn!(
                        "hook {} failed: {}",
                        script.display(),
                        String::from_utf8_lossy(&output.stderr).trim()
                    );
                }
                Err(e) => {
                    tracing::warn!("failed to execute hook {}: {}", script.display(), e);
                }
            }
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_names_every_hook() {
        let text = describe_hooks();
        assert!(text.contains("after_add"));
        assert!(text.contains("after_update"));
    }

    #[test]
    fn no_hook_dirs_runs_nothing() {
        assert_eq!(Hooks::none().run(Hook::AfterAdd, &["demo-1"]), 0);
    }

    #[cfg(unix)]
    #[test]
    fn runs_executable_with_issue_names() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("seen");
        let script = tmp.path().join("after_update");
        std::fs::write(
            &script,
            format!("#!/bin/sh\necho \"$@\" > '{}'\n", out.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let hooks = Hooks::new(vec![tmp.path().to_path_buf()], None);
        assert_eq!(hooks.run(Hook::AfterUpdate, &["demo-1"]), 1);
        assert_eq!(hooks.run(Hook::AfterAdd, &["demo-1"]), 0);
        assert_eq!(std::fs::read_to_string(out).unwrap().trim(), "demo-1");
    }
}
