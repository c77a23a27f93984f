use std::fmt;

use engine::{InputAction, Prefab, RenderableDesc, RenderableKind, SceneWorld, Vec3, VisualId};
use tracing::{debug, info, warn};

use super::entity::{require_text, Entity, EntityError, EntityKind, WorldBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum CharacterKind {
    Angel,
    Devil,
    Doctor,
    Zombie,
}

const ANGEL_PREFAB: Prefab = Prefab {
    tag: "Angel",
    renderable: RenderableDesc {
        kind: RenderableKind::Tinted {
            rgba: [235, 235, 255, 255],
        },
        debug_name: "angel",
    },
    default_rotation_y_degrees: 180.0,
};

const DEVIL_PREFAB: Prefab = Prefab {
    tag: "Devil",
    renderable: RenderableDesc {
        kind: RenderableKind::Tinted {
            rgba: [210, 50, 40, 255],
        },
        debug_name: "devil",
    },
    default_rotation_y_degrees: 180.0,
};

const DOCTOR_PREFAB: Prefab = Prefab {
    tag: "Doctor",
    renderable: RenderableDesc {
        kind: RenderableKind::Tinted {
            rgba: [80, 160, 230, 255],
        },
        debug_name: "doctor",
    },
    default_rotation_y_degrees: 180.0,
};

const ZOMBIE_PREFAB: Prefab = Prefab {
    tag: "Zombie",
    renderable: RenderableDesc {
        kind: RenderableKind::Tinted {
            rgba: [110, 170, 80, 255],
        },
        debug_name: "zombie",
    },
    default_rotation_y_degrees: 180.0,
};

impl CharacterKind {
    pub(crate) const ALL: [CharacterKind; 4] = [
        CharacterKind::Angel,
        CharacterKind::Devil,
        CharacterKind::Doctor,
        CharacterKind::Zombie,
    ];

    pub(crate) fn tag(self) -> &'static str {
        self.prefab().tag
    }

    pub(crate) fn animation_flag(self) -> &'static str {
        match self {
            CharacterKind::Angel => "Fly",
            CharacterKind::Devil => "Walk",
            CharacterKind::Doctor => "HopWalk",
            CharacterKind::Zombie => "DeadWalk",
        }
    }

    pub(crate) fn entity_kind(self) -> EntityKind {
        match self {
            CharacterKind::Angel | CharacterKind::Devil => EntityKind::Spiritual,
            CharacterKind::Doctor | CharacterKind::Zombie => EntityKind::Physical,
        }
    }

    pub(crate) fn prefab(self) -> &'static Prefab {
        match self {
            CharacterKind::Angel => &ANGEL_PREFAB,
            CharacterKind::Devil => &DEVIL_PREFAB,
            CharacterKind::Doctor => &DOCTOR_PREFAB,
            CharacterKind::Zombie => &ZOMBIE_PREFAB,
        }
    }

    /// Index of the on-screen toggle controlling this kind.
    pub(crate) fn toggle_slot(self) -> usize {
        match self {
            CharacterKind::Angel => 0,
            CharacterKind::Devil => 1,
            CharacterKind::Doctor => 2,
            CharacterKind::Zombie => 3,
        }
    }

    pub(crate) fn move_command(self) -> InputAction {
        match self {
            CharacterKind::Angel => InputAction::CommandA,
            CharacterKind::Devil => InputAction::CommandD,
            CharacterKind::Doctor => InputAction::CommandS,
            CharacterKind::Zombie => InputAction::CommandZ,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CharacterProfile {
    pub(crate) name: String,
    pub(crate) origin: String,
    pub(crate) talent: String,
}

impl CharacterProfile {
    pub(crate) fn new(
        name: impl Into<String>,
        origin: impl Into<String>,
        talent: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            origin: origin.into(),
            talent: talent.into(),
        }
    }

    pub(crate) fn default_for(kind: CharacterKind) -> Self {
        match kind {
            CharacterKind::Angel => Self::new("Gabriel", "Heaven", "Messenger Angel"),
            CharacterKind::Devil => Self::new("Lucifer", "Hell", "Fallen Angel"),
            CharacterKind::Doctor => Self::new("Frankenstein", "Geneva", "Mad Scientist"),
            CharacterKind::Zombie => Self::new("Romero", "Pittsburgh", "Undead Walker"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpawnOutcome {
    Spawned(VisualId),
    RejectedOutOfBounds,
}

/// One of the four character variants plus its binding to at most one
/// visual object in the scene world.
#[derive(Debug)]
pub(crate) struct Character {
    kind: CharacterKind,
    entity: Entity,
    origin: String,
    visual: Option<VisualId>,
}

impl Character {
    /// Builds the character and instantiates its visual when `location` is
    /// inside `bounds`. An out-of-bounds location still yields a character,
    /// just without a visual.
    pub(crate) fn spawn(
        world: &mut SceneWorld,
        kind: CharacterKind,
        profile: &CharacterProfile,
        location: Vec3,
        bounds: &WorldBounds,
    ) -> Result<(Self, SpawnOutcome), EntityError> {
        let origin = require_text("origin", profile.origin.clone())?;
        let entity = Entity::new(
            profile.name.clone(),
            profile.talent.clone(),
            kind.entity_kind(),
            location,
        )?;

        let mut character = Self {
            kind,
            entity,
            origin,
            visual: None,
        };

        let outcome = if character
            .entity
            .validate_location(character.entity.location(), bounds)
        {
            let visual = world.instantiate(kind.prefab(), location);
            world.set_animator_bool(visual, kind.animation_flag(), false);
            character.visual = Some(visual);
            info!("{}", character.entity.describe_location());
            SpawnOutcome::Spawned(visual)
        } else {
            warn!(
                kind = ?kind,
                name = character.entity.name(),
                talent = character.entity.talent(),
                location = %location,
                "spawn_rejected_out_of_bounds"
            );
            SpawnOutcome::RejectedOutOfBounds
        };

        Ok((character, outcome))
    }

    /// Checks `target`, then the visual's current position. Only when both
    /// pass is the animation flag raised and `true` returned.
    pub(crate) fn move_toward(
        &self,
        world: &mut SceneWorld,
        target: Vec3,
        bounds: &WorldBounds,
    ) -> bool {
        if !self.entity.move_check(target, bounds) {
            debug!(kind = ?self.kind, target = %target, "move_target_out_of_bounds");
            return false;
        }

        let Some(visual) = self.visual else {
            debug!(kind = ?self.kind, "move_without_visual");
            return false;
        };
        let Some(visual_position) = world.visual_position(visual) else {
            warn!(kind = ?self.kind, visual = visual.0, "bound_visual_missing");
            return false;
        };
        if !self.entity.validate_location(visual_position, bounds) {
            debug!(
                kind = ?self.kind,
                visual_position = %visual_position,
                "visual_position_out_of_bounds"
            );
            return false;
        }

        world.set_animator_bool(visual, self.kind.animation_flag(), true)
    }

    /// Destroys the bound visual, if any. Returns whether one was destroyed.
    pub(crate) fn despawn(self, world: &mut SceneWorld) -> bool {
        match self.visual {
            Some(visual) => world.despawn(visual),
            None => false,
        }
    }

    pub(crate) fn entity(&self) -> &Entity {
        &self.entity
    }

    pub(crate) fn visual(&self) -> Option<VisualId> {
        self.visual
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.origin.is_empty() {
            f.write_str(self.entity.name())
        } else {
            write!(f, "{}, {}", self.origin, self.entity.name())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANGEL_SPAWN: Vec3 = Vec3::new(8.3, 4.5, 3.0);
    const MOVE_TARGET: Vec3 = Vec3::new(8.3, 4.6, -18.7);

    fn spawn_kind(
        world: &mut SceneWorld,
        kind: CharacterKind,
        location: Vec3,
    ) -> (Character, SpawnOutcome) {
        Character::spawn(
            world,
            kind,
            &CharacterProfile::default_for(kind),
            location,
            &WorldBounds::default(),
        )
        .expect("spawn")
    }

    #[test]
    fn kind_table_matches_tags_flags_and_categories() {
        let rows: Vec<_> = CharacterKind::ALL
            .iter()
            .map(|kind| (kind.tag(), kind.animation_flag(), kind.entity_kind()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Angel", "Fly", EntityKind::Spiritual),
                ("Devil", "Walk", EntityKind::Spiritual),
                ("Doctor", "HopWalk", EntityKind::Physical),
                ("Zombie", "DeadWalk", EntityKind::Physical),
            ]
        );
    }

    #[test]
    fn toggle_slots_and_commands_are_distinct() {
        let slots: Vec<_> = CharacterKind::ALL.iter().map(|k| k.toggle_slot()).collect();
        assert_eq!(slots, vec![0, 1, 2, 3]);
        assert_eq!(CharacterKind::Doctor.move_command(), InputAction::CommandS);
    }

    #[test]
    fn default_profiles_spawn_for_every_kind() {
        let mut world = SceneWorld::default();
        for kind in CharacterKind::ALL {
            let (character, outcome) = spawn_kind(&mut world, kind, Vec3::new(0.0, 1.0, 0.0));
            assert!(matches!(outcome, SpawnOutcome::Spawned(_)));
            assert_eq!(character.entity().kind(), kind.entity_kind());
        }
        world.apply_pending();
        assert_eq!(world.visual_count(), 4);
    }

    #[test]
    fn blank_origin_fails_for_every_kind() {
        for kind in CharacterKind::ALL {
            let mut world = SceneWorld::default();
            let mut profile = CharacterProfile::default_for(kind);
            profile.origin = "  ".to_string();
            let err = Character::spawn(
                &mut world,
                kind,
                &profile,
                ANGEL_SPAWN,
                &WorldBounds::default(),
            )
            .expect_err("blank origin");
            assert_eq!(err, EntityError::InvalidArgument { field: "origin" });
            assert_eq!(world.find_with_tag(kind.tag()), None);
        }
    }

    #[test]
    fn origin_is_checked_before_name_and_talent() {
        let mut world = SceneWorld::default();
        let profile = CharacterProfile::new("", "", "");
        let err = Character::spawn(
            &mut world,
            CharacterKind::Zombie,
            &profile,
            ANGEL_SPAWN,
            &WorldBounds::default(),
        )
        .expect_err("blank profile");
        assert_eq!(err, EntityError::InvalidArgument { field: "origin" });
    }

    #[test]
    fn blank_name_fails_without_creating_a_visual() {
        let mut world = SceneWorld::default();
        let profile = CharacterProfile::new(" ", "Hell", "Fallen Angel");
        let err = Character::spawn(
            &mut world,
            CharacterKind::Devil,
            &profile,
            ANGEL_SPAWN,
            &WorldBounds::default(),
        )
        .expect_err("blank name");
        assert_eq!(err, EntityError::InvalidArgument { field: "name" });
        world.apply_pending();
        assert_eq!(world.visual_count(), 0);
    }

    #[test]
    fn in_bounds_spawn_creates_visual_with_flag_cleared() {
        let mut world = SceneWorld::default();
        let (angel, outcome) = spawn_kind(&mut world, CharacterKind::Angel, ANGEL_SPAWN);

        let SpawnOutcome::Spawned(visual) = outcome else {
            panic!("expected spawned outcome, got {outcome:?}");
        };
        assert_eq!(angel.visual(), Some(visual));
        assert_eq!(world.find_with_tag("Angel"), Some(visual));
        assert_eq!(world.visual_position(visual), Some(ANGEL_SPAWN));
        assert_eq!(world.animator_bool(visual, "Fly"), Some(false));
        let rotation = world.visual(visual).expect("visual").transform.rotation_y_degrees;
        assert_eq!(rotation, CharacterKind::Angel.prefab().default_rotation_y_degrees);
    }

    #[test]
    fn out_of_bounds_spawn_yields_character_without_visual() {
        let mut world = SceneWorld::default();
        let (doctor, outcome) =
            spawn_kind(&mut world, CharacterKind::Doctor, Vec3::new(0.0, -1.0, 0.0));

        assert_eq!(outcome, SpawnOutcome::RejectedOutOfBounds);
        assert_eq!(doctor.visual(), None);
        assert_eq!(doctor.entity().name(), "Frankenstein");
        world.apply_pending();
        assert_eq!(world.visual_count(), 0);
    }

    #[test]
    fn move_to_valid_target_raises_flag() {
        let mut world = SceneWorld::default();
        let (angel, outcome) = spawn_kind(&mut world, CharacterKind::Angel, ANGEL_SPAWN);
        let SpawnOutcome::Spawned(visual) = outcome else {
            panic!("expected spawned outcome");
        };
        world.apply_pending();

        assert!(angel.move_toward(&mut world, MOVE_TARGET, &WorldBounds::default()));
        assert_eq!(world.animator_bool(visual, "Fly"), Some(true));
        assert_eq!(angel.entity().location(), ANGEL_SPAWN);
    }

    #[test]
    fn move_to_invalid_target_leaves_flag_untouched() {
        let mut world = SceneWorld::default();
        let (zombie, outcome) = spawn_kind(&mut world, CharacterKind::Zombie, ANGEL_SPAWN);
        let SpawnOutcome::Spawned(visual) = outcome else {
            panic!("expected spawned outcome");
        };

        let outside = Vec3::new(8.3, 4.6, -58.7);
        assert!(!zombie.move_toward(&mut world, outside, &WorldBounds::default()));
        assert_eq!(world.animator_bool(visual, "DeadWalk"), Some(false));
    }

    #[test]
    fn move_is_rejected_when_visual_has_drifted_out_of_bounds() {
        let mut world = SceneWorld::default();
        let (devil, outcome) = spawn_kind(&mut world, CharacterKind::Devil, ANGEL_SPAWN);
        let SpawnOutcome::Spawned(visual) = outcome else {
            panic!("expected spawned outcome");
        };
        world.apply_pending();
        world.visual_mut(visual).expect("visual").transform.position = Vec3::new(0.0, 12.0, 0.0);

        assert!(!devil.move_toward(&mut world, MOVE_TARGET, &WorldBounds::default()));
        assert_eq!(world.animator_bool(visual, "Walk"), Some(false));
    }

    #[test]
    fn move_without_visual_fails() {
        let mut world = SceneWorld::default();
        let (doctor, _) = spawn_kind(&mut world, CharacterKind::Doctor, Vec3::new(99.0, 1.0, 0.0));
        assert!(!doctor.move_toward(&mut world, MOVE_TARGET, &WorldBounds::default()));
    }

    #[test]
    fn despawn_removes_bound_visual() {
        let mut world = SceneWorld::default();
        let (angel, _) = spawn_kind(&mut world, CharacterKind::Angel, ANGEL_SPAWN);
        world.apply_pending();

        assert!(angel.despawn(&mut world));
        world.apply_pending();
        assert_eq!(world.visual_count(), 0);
        assert_eq!(world.find_with_tag("Angel"), None);
    }

    #[test]
    fn display_prefixes_origin() {
        let mut world = SceneWorld::default();
        let (angel, _) = spawn_kind(&mut world, CharacterKind::Angel, ANGEL_SPAWN);
        assert_eq!(angel.to_string(), "Heaven, Gabriel");
        assert_eq!(angel.entity().to_string(), "Gabriel");
    }
}
