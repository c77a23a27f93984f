use std::fmt;

use engine::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) const DEFAULT_BOUNDARY: f32 = 40.0;
pub(crate) const DEFAULT_HEIGHT_MAX: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EntityKind {
    Physical,
    Spiritual,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum EntityError {
    #[error("invalid argument: the {field} is required")]
    InvalidArgument { field: &'static str },
}

/// How the z coordinate is checked against the boundary.
///
/// `LegacyRepeatX` re-tests x in place of z, which lets any z through. It
/// exists for parity with scenes that were tuned against that behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ZBoundCheck {
    #[default]
    Strict,
    LegacyRepeatX,
}

/// Open box a character may occupy: `|x| < boundary`, `0 < y < height_max`
/// and, under `ZBoundCheck::Strict`, `|z| < boundary`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WorldBounds {
    pub(crate) boundary: f32,
    pub(crate) height_max: f32,
    pub(crate) z_check: ZBoundCheck,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            boundary: DEFAULT_BOUNDARY,
            height_max: DEFAULT_HEIGHT_MAX,
            z_check: ZBoundCheck::Strict,
        }
    }
}

impl WorldBounds {
    pub(crate) fn contains(&self, point: Vec3) -> bool {
        let x_ok = -self.boundary < point.x && point.x < self.boundary;
        let y_ok = 0.0 < point.y && point.y < self.height_max;
        let z_ok = match self.z_check {
            ZBoundCheck::Strict => -self.boundary < point.z && point.z < self.boundary,
            ZBoundCheck::LegacyRepeatX => -self.boundary < point.x && point.x < self.boundary,
        };
        x_ok && y_ok && z_ok
    }
}

/// Logical record of a character. The stored location is fixed at
/// construction and is never checked against any bounds there.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Entity {
    name: String,
    talent: String,
    kind: EntityKind,
    location: Vec3,
}

impl Entity {
    pub(crate) fn new(
        name: impl Into<String>,
        talent: impl Into<String>,
        kind: EntityKind,
        location: Vec3,
    ) -> Result<Self, EntityError> {
        let talent = require_text("talent", talent.into())?;
        let name = require_text("name", name.into())?;
        Ok(Self {
            name,
            talent,
            kind,
            location,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn talent(&self) -> &str {
        &self.talent
    }

    pub(crate) fn kind(&self) -> EntityKind {
        self.kind
    }

    pub(crate) fn location(&self) -> Vec3 {
        self.location
    }

    pub(crate) fn validate_location(&self, point: Vec3, bounds: &WorldBounds) -> bool {
        bounds.contains(point)
    }

    /// Base movement contract: whether `target` is a legal destination.
    /// The stored location is left as is.
    pub(crate) fn move_check(&self, target: Vec3, bounds: &WorldBounds) -> bool {
        self.validate_location(target, bounds)
    }

    pub(crate) fn describe_location(&self) -> String {
        format!(
            "{} found at {} and entity is {}",
            self.name, self.location, self.talent
        )
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

pub(crate) fn require_text(field: &'static str, value: String) -> Result<String, EntityError> {
    if value.trim().is_empty() {
        return Err(EntityError::InvalidArgument { field });
    }
    Ok(value)
}
