use thiserror::Error;

/// Problems with a single input line. The line is reported and discarded,
/// the shell keeps reading.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid variable name '{0}'")]
    InvalidVariableName(String),

    #[error("syntax error: {0}")]
    Syntax(#[from] peg::error::ParseError<peg::str::LineCol>),
}

/// Process and fd plumbing failures. Apart from a NUL byte smuggled into an
/// argument these indicate resource exhaustion and end the session.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("pipe: {0}")]
    Pipe(nix::errno::Errno),

    #[error("fork: {0}")]
    Fork(nix::errno::Errno),

    #[error("close: {0}")]
    Close(nix::errno::Errno),

    #[error("wait: {0}")]
    Wait(nix::errno::Errno),

    #[error("argument contains a NUL byte")]
    NulByte(#[from] std::ffi::NulError),
}

impl ExecError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ExecError::NulByte(_))
    }
}
