use std::path::Path;

use super::ast::Command;
use super::env::Env;

/// `cd` runs in the shell process itself, never in a child. With a single
/// word the target falls back to `HOME` from the store; with extra arguments
/// the last one wins. Failures are reported and the session continues.
pub fn cd(cmd: &Command, env: &Env) {
    let target = if cmd.args.len() > 1 {
        cmd.args.last().map(String::as_str)
    } else {
        env.get("HOME")
    };

    let target = match target {
        Some(target) => target,
        None => {
            eprintln!("cd: HOME is not set");
            return;
        }
    };

    if let Err(err) = std::env::set_current_dir(Path::new(target)) {
        eprintln!("cd: {target}: {err}");
    }
}
