//! Worktree Sandbox CLI
//!
//! CLI tool for managing disposable git worktree sandboxes.

use std::io::Write;

use worktree_sandbox::{execute, Command, Config, GitCli, USAGE};

fn main() {
    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let command = Command::parse_os(std::env::args_os().skip(1));

    // Usage needs no repository.
    if command == Command::Help {
        print!("{}", USAGE);
        return;
    }

    match run(&command) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(command: &Command) -> worktree_sandbox::Result<i32> {
    let cwd = std::env::current_dir()?;
    let git = GitCli::discover(&cwd)?;
    let config = Config::load(git.repo_path().to_path_buf())?;

    tracing::debug!(?config, ?command, "running command");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let code = execute(command, &config, &git, &cwd, &mut out)?;
    out.flush()?;
    Ok(code)
}
