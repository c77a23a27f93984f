mod input;
mod loop_runner;
mod rendering;
mod scene;

pub use input::{InputAction, ToggleSnapshot, TOGGLE_COUNT};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{world_to_screen_px, Renderer, Viewport, PLACEHOLDER_HALF_SIZE_PX};
pub use scene::{
    Animator, BoundsOverlay, Camera, InputSnapshot, Prefab, RenderableDesc, RenderableKind, Scene,
    SceneCommand, SceneKey, SceneWorld, Transform, Vec3, VisualId, VisualObject,
};
