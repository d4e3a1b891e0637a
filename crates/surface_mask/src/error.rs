//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias.
//! Filter evaluation and placement queries never fail; these variants cover the
//! configuration surface: invalid grid or cache settings, stale handles, and
//! worker startup.
use thiserror::Error;

use crate::area::DescriptorId;
use crate::cache::AreaId;
use crate::surface::SurfaceId;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown planting area {id:?}")]
    UnknownArea { id: AreaId },

    #[error("unknown descriptor {id:?}")]
    UnknownDescriptor { id: DescriptorId },

    #[error("unknown surface {id:?}")]
    UnknownSurface { id: SurfaceId },

    #[error("failed to spawn placement worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_uses_other_variant() {
        let err: Error = String::from("boom").into();
        matches!(err, Error::Other(_))
            .then_some(())
            .expect("expected Other variant");
    }

    #[test]
    fn from_str_allocates_owned_message() {
        let err: Error = "issue".into();
        assert!(matches!(err, Error::Other(ref msg) if msg == "issue"));
    }

    #[test]
    fn unknown_area_mentions_id() {
        let err = Error::UnknownArea { id: AreaId(7) };
        assert!(err.to_string().contains('7'));
    }
}
