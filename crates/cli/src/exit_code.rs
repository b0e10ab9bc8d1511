//! Process exit codes
//!
//! Scripts wrapping `rsftp host` or `rsftp connect` branch on these values;
//! existing numbers never change meaning.

use rsftp_core::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    /// Bad arguments, target or bookmark name
    UsageError = 2,
    /// Connection refused, dropped or timed out
    NetworkError = 3,
    /// Credentials rejected or permission denied
    AuthError = 4,
    /// Bookmark or path missing
    NotFound = 5,
    /// Bookmark or path already present
    Conflict = 6,
    Interrupted = 130,
}

impl ExitCode {
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Exit code for a library error, by category
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Usage(_)
            | Error::Parse(_)
            | Error::UnknownCommand(_)
            | Error::InvalidPattern { .. }
            | Error::Config(_) => Self::UsageError,
            Error::Network(_) | Error::Protocol(_) => Self::NetworkError,
            Error::Auth(_) | Error::PermissionDenied(_) => Self::AuthError,
            Error::NotFound(_) | Error::HostNotFound(_) => Self::NotFound,
            Error::AlreadyExists(_) | Error::HostExists(_) => Self::Conflict,
            _ => Self::GeneralError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}
