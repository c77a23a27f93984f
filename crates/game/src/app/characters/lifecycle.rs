use std::collections::HashMap;

use engine::{SceneWorld, ToggleSnapshot, Vec3};
use tracing::{error, info, warn};

use super::variant::{Character, CharacterKind, SpawnOutcome};
use crate::app::config::DemoConfig;

/// Tracked presence per kind, independent of the toggle widget's own value.
///
/// `Failed` means the toggle went on but construction was refused. It reads
/// as absent from the outside and returns to `Absent` once the toggle goes
/// off, so a bad profile is reported once per on-edge instead of every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Presence {
    #[default]
    Absent,
    Present,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LifecycleEvent {
    Spawned {
        kind: CharacterKind,
        outcome: SpawnOutcome,
    },
    Despawned {
        kind: CharacterKind,
    },
    SpawnFailed {
        kind: CharacterKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MoveResult {
    NotPresent,
    Moved,
    Rejected,
}

/// Edge-triggered spawner. Owns the kind to character registry and is the
/// only code that binds or unbinds a kind's visual.
#[derive(Debug)]
pub(crate) struct LifecycleController {
    config: DemoConfig,
    presence: [Presence; CharacterKind::ALL.len()],
    registry: HashMap<CharacterKind, Character>,
}

impl LifecycleController {
    pub(crate) fn new(config: DemoConfig) -> Self {
        Self {
            config,
            presence: [Presence::Absent; CharacterKind::ALL.len()],
            registry: HashMap::new(),
        }
    }

    /// Compares each kind's toggle against its tracked presence and acts on
    /// transitions only. Kinds are visited Angel, Devil, Doctor, Zombie.
    pub(crate) fn poll(
        &mut self,
        toggles: ToggleSnapshot,
        world: &mut SceneWorld,
    ) -> Vec<LifecycleEvent> {
        let mut events = Vec::new();
        for kind in CharacterKind::ALL {
            let wants_present = toggles.is_on(kind.toggle_slot());
            let slot = kind.toggle_slot();
            match (self.presence[slot], wants_present) {
                (Presence::Absent, true) => events.push(self.spawn_kind(kind, world)),
                (Presence::Present, false) => {
                    self.despawn_kind(kind, world);
                    events.push(LifecycleEvent::Despawned { kind });
                }
                (Presence::Failed, false) => self.presence[slot] = Presence::Absent,
                _ => {}
            }
        }
        events
    }

    pub(crate) fn move_character(
        &self,
        kind: CharacterKind,
        target: Vec3,
        world: &mut SceneWorld,
    ) -> MoveResult {
        let Some(character) = self.registry.get(&kind) else {
            info!(kind = ?kind, "move_ignored_not_present");
            return MoveResult::NotPresent;
        };

        if character.move_toward(world, target, &self.config.bounds) {
            info!(
                kind = ?kind,
                name = character.entity().name(),
                target = %target,
                "{} moved successfully",
                character.entity().name()
            );
            MoveResult::Moved
        } else {
            warn!(
                kind = ?kind,
                name = character.entity().name(),
                target = %target,
                "{} cannot move to that location",
                character.entity().name()
            );
            MoveResult::Rejected
        }
    }

    pub(crate) fn is_present(&self, kind: CharacterKind) -> bool {
        self.presence[kind.toggle_slot()] == Presence::Present
    }

    pub(crate) fn character(&self, kind: CharacterKind) -> Option<&Character> {
        self.registry.get(&kind)
    }

    pub(crate) fn config(&self) -> &DemoConfig {
        &self.config
    }

    /// Drops every binding and destroys the bound visuals. Used on scene
    /// unload so a reload starts from all-absent.
    pub(crate) fn despawn_all(&mut self, world: &mut SceneWorld) {
        for kind in CharacterKind::ALL {
            if self.is_present(kind) {
                self.despawn_kind(kind, world);
            }
            self.presence[kind.toggle_slot()] = Presence::Absent;
        }
    }

    fn spawn_kind(&mut self, kind: CharacterKind, world: &mut SceneWorld) -> LifecycleEvent {
        let slot = kind.toggle_slot();
        let location = self.config.spawn_point(kind);
        let profile = self.config.profile(kind);
        match Character::spawn(world, kind, profile, location, &self.config.bounds) {
            Ok((character, outcome)) => {
                info!(
                    kind = ?kind,
                    entity_kind = ?character.entity().kind(),
                    character = %character,
                    visual = ?character.visual(),
                    outcome = ?outcome,
                    "character_spawned"
                );
                self.registry.insert(kind, character);
                self.presence[slot] = Presence::Present;
                LifecycleEvent::Spawned { kind, outcome }
            }
            Err(err) => {
                error!(kind = ?kind, error = %err, "character_spawn_failed");
                self.presence[slot] = Presence::Failed;
                LifecycleEvent::SpawnFailed { kind }
            }
        }
    }

    fn despawn_kind(&mut self, kind: CharacterKind, world: &mut SceneWorld) {
        let destroyed = self
            .registry
            .remove(&kind)
            .is_some_and(|character| character.despawn(world));
        self.presence[kind.toggle_slot()] = Presence::Absent;
        info!(kind = ?kind, destroyed_visual = destroyed, "character_despawned");
    }
}
