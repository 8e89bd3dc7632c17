use thiserror::Error;

use crate::shape::Shape;

/// Why a handler was refused at registration time.
///
/// One variant per rule, checked in declaration order; the first failing
/// rule is reported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistrationError {
    #[error("method name must not be empty")]
    EmptyMethodName,

    #[error("method name {0:?} is reserved (names starting with \"rpc.\" belong to the protocol)")]
    ReservedMethodName(String),

    #[error("invalid number of args: expected 1 or 2, got {0}")]
    InvalidArity(usize),

    #[error("invalid first arg type: expected Context, got {0}")]
    InvalidContextArg(Shape),

    #[error("invalid arg type: expected a payload type, got {0}")]
    InvalidParamType(Shape),

    #[error("invalid number of returns: expected 2, got {0}")]
    InvalidReturnArity(usize),

    #[error("invalid return type: expected a payload type, got {0}")]
    InvalidResultType(Shape),

    #[error("invalid error type: expected Error, got {0}")]
    InvalidErrorType(Shape),
}
