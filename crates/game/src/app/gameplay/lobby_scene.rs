use engine::{InputSnapshot, Scene, SceneCommand, SceneKey, SceneWorld};
use tracing::info;

/// Empty holding scene. Leaving it reloads the character scene from scratch.
#[derive(Debug, Default)]
pub(crate) struct LobbyScene;

impl LobbyScene {
    pub(crate) fn new() -> Self {
        Self
    }
}

impl Scene for LobbyScene {
    fn load(&mut self, world: &mut SceneWorld) {
        world.set_bounds_overlay(None);
        info!(scene = "lobby", "scene_loaded");
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        input: &InputSnapshot,
        _world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.switch_scene_pressed() {
            return SceneCommand::HardResetTo(SceneKey::Characters);
        }
        SceneCommand::None
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        info!(scene = "lobby", "scene_unloaded");
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        Some("Character Toggle | Lobby (Tab to reload)".to_string())
    }
}
