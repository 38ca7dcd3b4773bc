/// Recoverable failures surfaced to callers of the core.
///
/// Internal consistency violations (a dangling block index, a partition
/// losing a world) are bugs and panic instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unknown atom '{0}'")]
    UnknownAtom(String),
    #[error("unknown agent '{0}'")]
    UnknownAgent(String),
    #[error("action '{0}' is not applicable here")]
    NotApplicable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
