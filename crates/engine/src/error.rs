//! The module contains the errors the engine can throw.
//!
//! Uniqueness violations are reported per constraint ([`DuplicateKey`],
//! [`DuplicateUsername`], [`DuplicateSession`]) so callers never have to
//! inspect a raw [`DbErr`].
//!
//!  [`DuplicateKey`]: EngineError::DuplicateKey
//!  [`DuplicateUsername`]: EngineError::DuplicateUsername
//!  [`DuplicateSession`]: EngineError::DuplicateSession
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} already exists")]
    DuplicateKey(String),
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Attendance already submitted for this date")]
    DuplicateSession,
    #[error("{0} not found")]
    NotFound(String),
    #[error("You are not assigned to this class-subject combination")]
    NotAssigned,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Current password is incorrect")]
    InvalidCurrentPassword,
    #[error("No updates provided")]
    NoChangesProvided,
    #[error("Student {0} is not enrolled in this class")]
    StudentNotInClass(i32),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::DuplicateKey(a), Self::DuplicateKey(b)) => a == b,
            (Self::DuplicateUsername, Self::DuplicateUsername) => true,
            (Self::DuplicateSession, Self::DuplicateSession) => true,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::NotAssigned, Self::NotAssigned) => true,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Unauthenticated(a), Self::Unauthenticated(b)) => a == b,
            (Self::TokenExpired, Self::TokenExpired) => true,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::InvalidCurrentPassword, Self::InvalidCurrentPassword) => true,
            (Self::NoChangesProvided, Self::NoChangesProvided) => true,
            (Self::StudentNotInClass(a), Self::StudentNotInClass(b)) => a == b,
            (Self::PasswordHash(a), Self::PasswordHash(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
