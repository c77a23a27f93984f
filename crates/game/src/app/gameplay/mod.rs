use engine::Scene;

use super::config::DemoConfig;

mod character_scene;
mod lobby_scene;

pub(crate) use character_scene::CharacterScene;
pub(crate) use lobby_scene::LobbyScene;

/// Lobby first, characters second, matching the order `run_app` expects.
pub(crate) fn build_scene_pair(config: DemoConfig) -> (Box<dyn Scene>, Box<dyn Scene>) {
    (
        Box::new(LobbyScene::new()),
        Box::new(CharacterScene::new(config)),
    )
}
