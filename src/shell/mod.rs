mod ast;
mod builtins;
mod env;
mod io;
mod parse;

pub use ast::{Command, Pipeline};
pub use env::Env;
pub use parse::parse_line;

use std::ffi::{CString, NulError};

use nix::errno::Errno;
use nix::fcntl::{self, OFlag};
use nix::libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::sys::stat::Mode;
use nix::sys::wait;
use nix::unistd::{self, ForkResult, Pid};

use crate::error::ExecError;
use io::{pipe_pair, FdRead, FdWrite};

/// Walk the pipeline left to right: one pipe per adjacent pair of external
/// stages, one forked child per external command, `cd` handled in place.
///
/// All children are spawned first and reaped together afterwards, so the
/// stages genuinely run in parallel with live pipes between them. Exit
/// statuses are discarded; a child that failed to exec has already reported
/// itself on stderr with a distinguished code.
pub fn run_pipeline(pipeline: &Pipeline, env: &Env) -> Result<(), ExecError> {
    // Every argv and environment string is built before the first fork so a
    // NUL byte aborts the pipeline while no fd or child exists yet.
    let exec_env = env.to_exec_env()?;
    let mut argvs = Vec::with_capacity(pipeline.stages.len());
    for stage in &pipeline.stages {
        argvs.push(match stage.args.first() {
            None => None,
            Some(arg0) if arg0 == "cd" => None,
            Some(_) => Some(cstring_argv(&stage.args)?),
        });
    }

    let last = pipeline.stages.len().saturating_sub(1);
    let mut prev_read: Option<FdRead> = None;
    let mut children: Vec<Pid> = Vec::new();

    for (i, stage) in pipeline.stages.iter().enumerate() {
        let argv = match &argvs[i] {
            Some(argv) => argv,
            None => {
                // a builtin stage neither consumes the inbound pipe nor
                // creates an outbound one
                if !stage.args.is_empty() {
                    builtins::cd(stage, env);
                }
                continue;
            }
        };

        let next_pipe = if i < last {
            Some(pipe_pair().map_err(ExecError::Pipe)?)
        } else {
            None
        };

        match unsafe { unistd::fork() }.map_err(ExecError::Fork)? {
            ForkResult::Child => {
                let stdout = next_pipe.map(|(_, write)| write);
                child_exec(stage, argv, &exec_env, prev_read, stdout);
            }

            ForkResult::Parent { child, .. } => {
                if let Some(read) = prev_read.take() {
                    read.close().map_err(ExecError::Close)?;
                }
                if let Some((read, write)) = next_pipe {
                    write.close().map_err(ExecError::Close)?;
                    prev_read = Some(read);
                }
                children.push(child);
            }
        }
    }

    // dangling read end, e.g. when the final stage was a builtin
    if let Some(read) = prev_read.take() {
        read.close().map_err(ExecError::Close)?;
    }

    for pid in children {
        wait::waitpid(pid, None).map_err(ExecError::Wait)?;
    }

    Ok(())
}

fn cstring_argv(args: &[String]) -> Result<Vec<CString>, NulError> {
    args.iter().map(|arg| CString::new(arg.as_bytes())).collect()
}

/// Child side of the fork: wire stdio, then replace the process image.
/// 127 means the program was not found, 126 any other exec failure.
fn child_exec(
    stage: &Command,
    argv: &[CString],
    exec_env: &[CString],
    stdin: Option<FdRead>,
    stdout: Option<FdWrite>,
) -> ! {
    if let Err(err) = wire_stdio(stage, stdin, stdout) {
        eprintln!("rill: {}: {}", stage.args[0], err);
        std::process::exit(1);
    }

    match unistd::execvpe(&argv[0], argv, exec_env) {
        Ok(_) => unreachable!(),
        Err(Errno::ENOENT) => {
            eprintln!("rill: {}: command not found", stage.args[0]);
            std::process::exit(127);
        }
        Err(err) => {
            eprintln!("rill: {}: {}", stage.args[0], err);
            std::process::exit(126);
        }
    }
}

/// An explicit file redirection replaces the pipe on the same side; the pipe
/// end is then left for O_CLOEXEC to discard at exec.
fn wire_stdio(
    stage: &Command,
    stdin: Option<FdRead>,
    stdout: Option<FdWrite>,
) -> nix::Result<()> {
    if let Some(path) = &stage.input {
        let fd = fcntl::open(path.as_str(), OFlag::O_RDONLY, Mode::empty())?;
        unistd::dup2(fd, STDIN_FILENO)?;
        unistd::close(fd)?;
    } else if let Some(read) = stdin {
        unistd::dup2(read.0, STDIN_FILENO)?;
        unistd::close(read.0)?;
    }

    if let Some(path) = &stage.output {
        let mut flags = OFlag::O_WRONLY | OFlag::O_CREAT;
        flags |= if stage.append {
            OFlag::O_APPEND
        } else {
            OFlag::O_TRUNC
        };
        let fd = fcntl::open(path.as_str(), flags, Mode::from_bits_truncate(0o644))?;
        unistd::dup2(fd, STDOUT_FILENO)?;
        unistd::close(fd)?;
    } else if let Some(write) = stdout {
        unistd::dup2(write.0, STDOUT_FILENO)?;
        unistd::close(write.0)?;
    }

    Ok(())
}
