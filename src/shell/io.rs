use nix::unistd;
use std::os::unix::io::RawFd;

/// Both ends carry O_CLOEXEC so a child only keeps the fds it dup2'ed onto
/// its stdio before exec.
pub fn pipe_pair() -> nix::Result<(FdRead, FdWrite)> {
    let flags = nix::fcntl::OFlag::O_CLOEXEC;
    let (pipe_out, pipe_in) = unistd::pipe2(flags)?;
    Ok((FdRead(pipe_out), FdWrite(pipe_in)))
}

// Move-only: an end is either dup2'ed into a child or closed, never both,
// and the compiler checks the hand-off.
#[derive(Debug)]
pub struct FdRead(pub RawFd);

#[derive(Debug)]
pub struct FdWrite(pub RawFd);

impl FdRead {
    pub fn close(self) -> nix::Result<()> {
        unistd::close(self.0)
    }
}

impl FdWrite {
    pub fn close(self) -> nix::Result<()> {
        unistd::close(self.0)
    }
}
