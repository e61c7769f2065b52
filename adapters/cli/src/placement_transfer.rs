use std::{error::Error, fmt};

use arrehab_core::{Facing, PlacedTile, Placement, SurfacePoint};
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

const SNAPSHOT_DOMAIN: &str = "arrehab";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded placement payload.
pub(crate) const SNAPSHOT_HEADER: &str = "arrehab:v1";
/// Delimiter used to separate the prefix segments from the payload.
const FIELD_DELIMITER: char = ':';

/// Committed placement captured for transfer between sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct PlacementSnapshot {
    surface_center: SurfacePoint,
    center: PlacedTile,
    facing: Facing,
    tiles: Vec<PlacedTile>,
}

impl PlacementSnapshot {
    /// Captures the provided placement.
    #[must_use]
    pub(crate) fn capture(placement: &Placement) -> Self {
        Self {
            surface_center: placement.surface_center,
            center: placement.center,
            facing: placement.facing,
            tiles: placement.tiles.clone(),
        }
    }

    /// Restores the captured placement.
    #[must_use]
    pub(crate) fn into_placement(self) -> Placement {
        Placement {
            surface_center: self.surface_center,
            center: self.center,
            facing: self.facing,
            tiles: self.tiles,
        }
    }

    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, PlacementTransferError> {
        let json = serde_json::to_vec(self).map_err(PlacementTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{SNAPSHOT_HEADER}{FIELD_DELIMITER}{encoded}"))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, PlacementTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PlacementTransferError::EmptyPayload);
        }

        let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
        let domain = parts.next().ok_or(PlacementTransferError::MissingPrefix)?;
        let version = parts
            .next()
            .ok_or(PlacementTransferError::MissingVersion)?;
        let payload = parts
            .next()
            .ok_or(PlacementTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(PlacementTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(PlacementTransferError::UnsupportedVersion(
                version.to_owned(),
            ));
        }

        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(PlacementTransferError::InvalidEncoding)?;
        let snapshot: Self =
            serde_json::from_slice(&bytes).map_err(PlacementTransferError::InvalidPayload)?;
        if snapshot.tiles.is_empty() {
            return Err(PlacementTransferError::EmptyBoard);
        }
        Ok(snapshot)
    }
}

/// Errors that can occur while transferring placement strings.
#[derive(Debug)]
pub(crate) enum PlacementTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    MissingVersion,
    /// The encoded snapshot did not include the payload segment.
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
    /// The decoded placement contained no board tiles.
    EmptyBoard,
}

impl fmt::Display for PlacementTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "placement string was empty"),
            Self::MissingPrefix => write!(f, "placement string is missing the prefix"),
            Self::MissingVersion => write!(f, "placement string is missing the version"),
            Self::MissingPayload => write!(f, "placement string is missing the payload"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "placement prefix '{prefix}' is not supported")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "placement version '{version}' is not supported")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode placement payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse placement payload: {error}")
            }
            Self::EmptyBoard => write!(f, "placement does not contain any board tiles"),
        }
    }
}

impl Error for PlacementTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}
