//! Transport strategies for the booking request.
//!
//! A booking attempt is a (transport, dialect) pair. The dispatcher walks the
//! plan in order and stops at the first accepted response; the plan never has
//! more than two entries, so exactly one fallback occurs.

use crate::dialect::FieldDialect;

/// Wire encoding for a booking attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    UrlEncoded,
    Multipart,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UrlEncoded => write!(f, "urlencoded"),
            Self::Multipart => write!(f, "multipart"),
        }
    }
}

/// Builds the ordered attempt plan for one booking.
///
/// The primary attempt is form-urlencoded in the configured dialect; on a
/// non-success response the same logical payload is retried as multipart.
/// The multipart path only speaks the snake dialect, and `force_multipart`
/// skips the urlencoded attempt entirely.
#[must_use]
pub fn attempt_plan(force_multipart: bool, dialect: FieldDialect) -> Vec<(Transport, FieldDialect)> {
    if force_multipart {
        vec![(Transport::Multipart, FieldDialect::Snake)]
    } else {
        vec![
            (Transport::UrlEncoded, dialect),
            (Transport::Multipart, FieldDialect::Snake),
        ]
    }
}
