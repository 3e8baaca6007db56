use std::collections::HashMap;
use std::ffi::{CString, NulError};

/// The variable store. Parser and executor receive it explicitly instead of
/// going through the process-wide environment, which keeps them testable
/// against an empty store.
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from the real process environment at startup so that
    /// PATH, HOME and friends are visible to the shell and its children.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_owned(), value.to_owned());
    }

    /// `NAME=value` strings in the form execvpe wants them.
    pub fn to_exec_env(&self) -> Result<Vec<CString>, NulError> {
        self.vars
            .iter()
            .map(|(k, v)| {
                let k = k.as_bytes();
                let v = v.as_bytes();

                let mut buf = Vec::with_capacity(k.len() + 1 + v.len());
                buf.extend_from_slice(k);
                buf.push(b'=');
                buf.extend_from_slice(v);

                CString::new(buf)
            })
            .collect()
    }
}
