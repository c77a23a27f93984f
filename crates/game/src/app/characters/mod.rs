pub(crate) mod entity;
pub(crate) mod lifecycle;
pub(crate) mod variant;

pub(crate) use entity::{WorldBounds, ZBoundCheck, DEFAULT_BOUNDARY, DEFAULT_HEIGHT_MAX};
pub(crate) use lifecycle::LifecycleController;
pub(crate) use variant::{CharacterKind, CharacterProfile};
