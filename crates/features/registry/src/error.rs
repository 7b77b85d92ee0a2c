use std::borrow::Cow;

/// Failures of registry calls.
///
/// A failed call leaves the registry exactly as it was and emits no event.
#[rlist_derive::rlist_error]
#[derive(Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The caller lacks the role the operation requires.
    #[error("Unauthorized{}: {message}", format_context(.context))]
    Unauthorized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An argument is empty, zero, or equal to the current value.
    #[error("Invalid argument{}: {message}", format_context(.context))]
    InvalidArgument { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Already exists{}: {message}", format_context(.context))]
    AlreadyExists { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Capacity exceeded{}: {message}", format_context(.context))]
    CapacityExceeded { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The registry is not in a state that allows the operation.
    #[error("Precondition failed{}: {message}", format_context(.context))]
    PreconditionFailed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The external token capability refused or reverted the transfer.
    #[error("Transfer failed{}: {message}", format_context(.context))]
    TransferFailed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Coarse classification of a [`RegistryError`], convenient for matching and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    InvalidArgument,
    NotFound,
    AlreadyExists,
    CapacityExceeded,
    PreconditionFailed,
    TransferFailed,
}

impl RegistryError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::PreconditionFailed { .. } => ErrorKind::PreconditionFailed,
            Self::TransferFailed { .. } => ErrorKind::TransferFailed,
        }
    }

    /// The message without kind prefix or context.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized { message, .. }
            | Self::InvalidArgument { message, .. }
            | Self::NotFound { message, .. }
            | Self::AlreadyExists { message, .. }
            | Self::CapacityExceeded { message, .. }
            | Self::PreconditionFailed { message, .. }
            | Self::TransferFailed { message, .. } => message,
        }
    }

    pub(crate) fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized { message: message.into(), context: None }
    }

    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidArgument { message: message.into(), context: None }
    }

    pub(crate) fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: message.into(), context: None }
    }

    pub(crate) fn precondition(message: impl Into<Cow<'static, str>>) -> Self {
        Self::PreconditionFailed { message: message.into(), context: None }
    }

    pub(crate) fn transfer(message: impl Into<Cow<'static, str>>) -> Self {
        Self::TransferFailed { message: message.into(), context: None }
    }
}
