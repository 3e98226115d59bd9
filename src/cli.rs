//! Command-line surface: argument parsing, dispatch, and output.

use std::ffi::OsString;
use std::io::Write;
use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::git::Vcs;
use crate::lifecycle::{self, CleanupOutcome};
use crate::update::{self, UpdateReport, UpdateStatus, UpdateTarget};

/// Usage text printed for `help`, no command, or an unknown command.
pub const USAGE: &str = "\
Usage: sandbox <command> [args]

Commands:
  create              Create a sandbox worktree from the latest main branch
  cleanup [pattern]   Remove the matching sandbox (default: the latest)
  list [--json]       List sandboxes
  update [pattern]    Merge the main branch into the matching sandbox
                      (default: the sandbox you are in, else the latest)
  update --all        Merge the main branch into every sandbox

Patterns match a substring of the sandbox directory, falling back to its branch.

Environment variables:
  SANDBOX_MAIN_BRANCH, SANDBOX_REMOTE, SANDBOX_NAMESPACE, SANDBOX_BASE_DIR,
  SANDBOX_MARKER, SANDBOX_FAIL_ON_CONFLICT=1, RUST_LOG
";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create,
    Cleanup { pattern: Option<String> },
    List { json: bool },
    Update(UpdateTarget),
    Help,
}

impl Command {
    /// Parses arguments following the program name.
    ///
    /// Anything unrecognised maps to [`Command::Help`]. Empty patterns are
    /// treated as absent.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let pattern = args.get(1).filter(|p| !p.is_empty()).cloned();

        match args.first().map(String::as_str) {
            Some("create") => Command::Create,
            Some("cleanup") => Command::Cleanup { pattern },
            Some("list") => Command::List {
                json: args.iter().skip(1).any(|a| a == "--json"),
            },
            Some("update") => Command::Update(match pattern {
                Some(p) if p == "--all" => UpdateTarget::All,
                Some(p) => UpdateTarget::Pattern(p),
                None => UpdateTarget::Auto,
            }),
            _ => Command::Help,
        }
    }

    /// Parses raw process arguments following the program name.
    ///
    /// Arguments that are not valid UTF-8 are converted lossily.
    pub fn parse_os<I>(args: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        Self::parse(args.into_iter().map(|a| a.to_string_lossy().into_owned()))
    }
}

/// Runs `command` and writes its report to `out`, returning the exit code.
///
/// Fatal errors are returned as `Err`; the caller reports them and exits 1.
pub fn execute<V: Vcs, W: Write>(
    command: &Command,
    config: &Config,
    vcs: &V,
    cwd: &Path,
    out: &mut W,
) -> Result<i32> {
    match command {
        Command::Help => {
            write!(out, "{}", USAGE)?;
            Ok(0)
        }
        Command::Create => {
            let created = lifecycle::create(config, vcs)?;
            writeln!(out, "Created sandbox")?;
            writeln!(out, "  path:   {}", created.path.display())?;
            writeln!(out, "  branch: {}", created.branch)?;
            Ok(0)
        }
        Command::Cleanup { pattern } => {
            match lifecycle::cleanup(config, vcs, pattern.as_deref())? {
                CleanupOutcome::NothingToClean => writeln!(out, "No sandboxes to clean up")?,
                CleanupOutcome::Removed {
                    path,
                    branch,
                    branch_deleted,
                } => {
                    writeln!(out, "Removed sandbox {}", path.display())?;
                    match branch {
                        Some(branch) if branch_deleted => {
                            writeln!(out, "Deleted branch {}", branch)?
                        }
                        Some(branch) => writeln!(
                            out,
                            "Branch {} was not deleted; remove it manually if needed",
                            branch
                        )?,
                        None => {}
                    }
                }
            }
            Ok(0)
        }
        Command::List { json } => {
            let inventory = lifecycle::list(config, vcs)?;
            if *json {
                serde_json::to_writer_pretty(&mut *out, inventory.sandboxes())
                    .map_err(std::io::Error::from)?;
                writeln!(out)?;
                return Ok(0);
            }

            writeln!(out, "Sandboxes:")?;
            if inventory.is_empty() {
                writeln!(out, "  (none)")?;
            }
            for sandbox in inventory.sandboxes() {
                writeln!(
                    out,
                    "  {}  [{}]",
                    sandbox.path.display(),
                    sandbox.branch.as_deref().unwrap_or("detached")
                )?;
            }
            Ok(0)
        }
        Command::Update(target) => {
            let report = update::update(config, vcs, target, cwd)?;
            render_update(&report, &config.upstream_ref(), out)?;
            Ok(report.exit_code(config.fail_on_conflict))
        }
    }
}

fn render_update<W: Write>(report: &UpdateReport, upstream: &str, out: &mut W) -> Result<()> {
    for result in &report.results {
        let branch = result.branch.as_deref().unwrap_or("detached");
        match &result.status {
            UpdateStatus::Updated => writeln!(
                out,
                "Updated {} [{}] from {}",
                result.path.display(),
                branch,
                upstream
            )?,
            UpdateStatus::UpToDate => writeln!(
                out,
                "Already up to date: {} [{}]",
                result.path.display(),
                branch
            )?,
            UpdateStatus::Conflict(detail) => {
                writeln!(
                    out,
                    "Conflict merging {} into [{}]; resolve manually in:",
                    upstream, branch
                )?;
                writeln!(out, "  {}", result.path.display())?;
                for line in detail.lines() {
                    writeln!(out, "    {}", line)?;
                }
            }
        }
    }

    if report.is_batch() {
        writeln!(
            out,
            "Summary: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        )?;
    }

    Ok(())
}
