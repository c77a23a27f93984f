use engine::{BoundsOverlay, InputSnapshot, Scene, SceneCommand, SceneKey, SceneWorld};
use tracing::{debug, info};

use crate::app::characters::lifecycle::LifecycleEvent;
use crate::app::characters::{CharacterKind, LifecycleController};
use crate::app::config::DemoConfig;

/// The toggle demo. Each tick: toggle edges first, then move commands.
#[derive(Debug)]
pub(crate) struct CharacterScene {
    controller: LifecycleController,
}

impl CharacterScene {
    pub(crate) fn new(config: DemoConfig) -> Self {
        Self {
            controller: LifecycleController::new(config),
        }
    }

    #[cfg(test)]
    fn controller(&self) -> &LifecycleController {
        &self.controller
    }
}

impl Scene for CharacterScene {
    fn load(&mut self, world: &mut SceneWorld) {
        let bounds = self.controller.config().bounds;
        world.set_bounds_overlay(Some(BoundsOverlay {
            half_extent: bounds.boundary,
        }));
        info!(
            scene = "characters",
            boundary = bounds.boundary,
            height_max = bounds.height_max,
            "scene_loaded"
        );
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.switch_scene_pressed() {
            return SceneCommand::SwitchTo(SceneKey::Lobby);
        }

        for event in self.controller.poll(input.toggles(), world) {
            match event {
                LifecycleEvent::Spawned { kind, outcome } => {
                    debug!(kind = ?kind, outcome = ?outcome, "toggle_on_handled");
                }
                LifecycleEvent::Despawned { kind } => {
                    debug!(kind = ?kind, "toggle_off_handled");
                }
                LifecycleEvent::SpawnFailed { kind } => {
                    debug!(kind = ?kind, "toggle_on_refused");
                }
            }
        }

        let target = self.controller.config().move_target;
        for kind in CharacterKind::ALL {
            if input.was_pressed(kind.move_command()) {
                self.controller.move_character(kind, target, world);
            }
        }

        SceneCommand::None
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        self.controller.despawn_all(world);
        info!(scene = "characters", "scene_unloaded");
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        let present: Vec<&str> = CharacterKind::ALL
            .into_iter()
            .filter_map(|kind| self.controller.character(kind))
            .map(|character| character.entity().name())
            .collect();
        if present.is_empty() {
            Some("Character Toggle | none".to_string())
        } else {
            Some(format!("Character Toggle | {}", present.join(", ")))
        }
    }
}
