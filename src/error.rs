use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    InvalidData(String),
    InvalidConfig(String),
    InvalidShape(String),
    /// A working set was used against a network it was not built for.
    BindingMismatch(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            Error::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Error::InvalidShape(msg) => write!(f, "invalid shape: {msg}"),
            Error::BindingMismatch(msg) => write!(f, "binding mismatch: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Shape check used at API boundaries.
#[inline]
pub(crate) fn expect_len(what: &str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(Error::InvalidShape(format!(
            "{what} len {got} does not match expected {expected}"
        )));
    }
    Ok(())
}
