//! Error types for the projection engine.
//!
//! Only configuration mistakes are reported as errors. Data-dependent
//! failures (an unreadable member, a write that does not fit, a cycle) are
//! absorbed into sentinel values or ignored writes instead.

use super::reflect::MemberKind;

/// Result type alias for projection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors raised while setting up a projection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A projection was requested without any column specs.
    #[error("at least one column spec is required")]
    NoColumns,

    /// A column was bound against a null row object.
    #[error("column '{header}' cannot be bound to a null owner")]
    NullOwner { header: String },

    /// A column spec names a member the row object does not have.
    #[error("{kind} '{member}' not found on {type_name}")]
    MemberNotFound {
        member: String,
        kind: MemberKind,
        type_name: String,
    },
}

impl Error {
    /// Create a null-owner error.
    pub fn null_owner(header: impl Into<String>) -> Self {
        Self::NullOwner {
            header: header.into(),
        }
    }

    /// Create a missing-member error.
    pub fn member_not_found(
        member: impl Into<String>,
        kind: MemberKind,
        type_name: impl Into<String>,
    ) -> Self {
        Self::MemberNotFound {
            member: member.into(),
            kind,
            type_name: type_name.into(),
        }
    }
}

/// Errors returned by [`Reflect`](super::reflect::Reflect) implementations.
///
/// Accessors never pass these on: a failed read becomes
/// [`Sentinel::Unreadable`](super::value::Sentinel::Unreadable) and a failed
/// write is dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReflectError {
    /// The type has no member with this name.
    #[error("type '{type_name}' has no member '{member}'")]
    UnknownMember { type_name: String, member: String },

    /// The member exists but cannot be written.
    #[error("member '{member}' is read-only")]
    ReadOnly { member: String },

    /// The value does not fit the member's type.
    #[error("member '{member}' expects {expected}, got {actual}")]
    TypeMismatch {
        member: String,
        expected: String,
        actual: String,
    },

    /// Any other failure raised by a getter or setter.
    #[error("{0}")]
    Other(String),
}

impl ReflectError {
    /// Create an unknown-member error.
    pub fn unknown_member(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self::UnknownMember {
            type_name: type_name.into(),
            member: member.into(),
        }
    }

    /// Create a read-only error.
    pub fn read_only(member: impl Into<String>) -> Self {
        Self::ReadOnly {
            member: member.into(),
        }
    }

    /// Create a type-mismatch error.
    pub fn type_mismatch(
        member: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            member: member.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a free-form error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
