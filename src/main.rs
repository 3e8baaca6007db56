mod error;
mod shell;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write as _};
use std::path::PathBuf;

use argh::FromArgs;
use nix::libc::STDIN_FILENO;
use nix::unistd;

use crate::shell::{parse_line, run_pipeline, Env};

/// A small line-oriented pipeline shell.
#[derive(FromArgs)]
struct Args {
    /// run commands from this file instead of standard input
    #[argh(option, short = 'i', long = "init-file")]
    init_file: Option<PathBuf>,
}

fn main() {
    let args: Args = argh::from_env();
    let mut env = Env::from_process();

    let code = match &args.init_file {
        Some(path) => match File::open(path) {
            Ok(file) => repl(BufReader::new(file), false, &mut env),
            Err(err) => {
                eprintln!("rill: {}: {}", path.display(), err);
                1
            }
        },
        None => {
            let interactive = unistd::isatty(STDIN_FILENO).unwrap_or(false);
            repl(io::stdin().lock(), interactive, &mut env)
        }
    };

    std::process::exit(code);
}

/// Feed lines to the parser and pipelines to the engine until end of input.
/// Input and builtin errors are reported and the loop continues; resource
/// errors from the engine end the session.
fn repl(mut input: impl BufRead, interactive: bool, env: &mut Env) -> i32 {
    let mut buf = String::new();

    loop {
        if interactive {
            print_prompt();
        }

        buf.clear();
        match input.read_line(&mut buf) {
            Ok(0) => return 0,
            Ok(_) => {}
            Err(err) => {
                eprintln!("rill: {err}");
                return 1;
            }
        }
        let line = buf.trim_end_matches(|c| c == '\n' || c == '\r');

        match parse_line(line, env) {
            Ok(Some(pipeline)) => {
                if let Err(err) = run_pipeline(&pipeline, env) {
                    eprintln!("rill: {err}");
                    if err.is_fatal() {
                        return 1;
                    }
                }
            }
            Ok(None) => {}
            Err(err) => eprintln!("rill: {err}"),
        }
    }
}

fn print_prompt() {
    let cwd = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "?".to_owned());
    print!("{cwd} > ");
    let _ = io::stdout().flush();
}
