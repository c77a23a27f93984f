use std::collections::BTreeMap;
use std::fmt;

use super::input::{ActionStates, InputAction, ToggleSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Lobby,
    Characters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
    HardResetTo(SceneKey),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    switch_scene_pressed: bool,
    actions: ActionStates,
    toggles: ToggleSnapshot,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        switch_scene_pressed: bool,
        actions: ActionStates,
        toggles: ToggleSnapshot,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            switch_scene_pressed,
            actions,
            toggles,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn switch_scene_pressed(&self) -> bool {
        self.switch_scene_pressed
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// True only on the tick the action went from up to down.
    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.actions.was_pressed(action)
    }

    pub fn toggles(&self) -> ToggleSnapshot {
        self.toggles
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction, pressed: bool) -> Self {
        self.actions.set_pressed(action, pressed);
        self
    }

    pub fn with_switch_scene_pressed(mut self, pressed: bool) -> Self {
        self.switch_scene_pressed = pressed;
        self
    }

    pub fn with_toggles(mut self, toggles: ToggleSnapshot) -> Self {
        self.toggles = toggles;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

pub const CAMERA_PIXELS_PER_WORLD_DEFAULT: f32 = 8.0;

/// Top-down camera looking along -y. `center` uses the x/z components.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub center: Vec3,
    pub pixels_per_world: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            pixels_per_world: CAMERA_PIXELS_PER_WORLD_DEFAULT,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Transform {
    pub position: Vec3,
    pub rotation_y_degrees: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderableKind {
    Placeholder,
    Tinted { rgba: [u8; 4] },
}

#[derive(Debug, Clone, Copy)]
pub struct RenderableDesc {
    pub kind: RenderableKind,
    pub debug_name: &'static str,
}

/// Template a visual object is instantiated from.
#[derive(Debug, Clone, Copy)]
pub struct Prefab {
    pub tag: &'static str,
    pub renderable: RenderableDesc,
    pub default_rotation_y_degrees: f32,
}

/// Named boolean parameters driving a visual's animation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Animator {
    bools: BTreeMap<String, bool>,
}

impl Animator {
    pub fn set_bool(&mut self, name: &str, value: bool) {
        if let Some(slot) = self.bools.get_mut(name) {
            *slot = value;
        } else {
            self.bools.insert(name.to_string(), value);
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.bools.get(name).copied()
    }

    pub fn is_any_set(&self) -> bool {
        self.bools.values().any(|value| *value)
    }
}

#[derive(Debug, Clone)]
pub struct VisualObject {
    pub id: VisualId,
    pub tag: &'static str,
    pub transform: Transform,
    pub renderable: RenderableDesc,
    pub animator: Animator,
    applied_spawn_order: u64,
}

impl VisualObject {
    pub fn applied_spawn_order(&self) -> u64 {
        self.applied_spawn_order
    }
}

#[derive(Debug, Default)]
pub struct VisualIdAllocator {
    next: u64,
}

impl VisualIdAllocator {
    pub fn allocate(&mut self) -> VisualId {
        let id = VisualId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Square play area drawn by the renderer, centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsOverlay {
    pub half_extent: f32,
}

/// Visual objects of one scene. Instantiation is visible to lookups
/// immediately; despawns take effect at the next `apply_pending`.
#[derive(Debug, Default)]
pub struct SceneWorld {
    allocator: VisualIdAllocator,
    visuals: Vec<VisualObject>,
    pending_spawns: Vec<VisualObject>,
    pending_despawns: Vec<VisualId>,
    next_applied_spawn_order: u64,
    camera: Camera,
    bounds_overlay: Option<BoundsOverlay>,
}

impl SceneWorld {
    pub fn instantiate(&mut self, prefab: &Prefab, position: Vec3) -> VisualId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(VisualObject {
            id,
            tag: prefab.tag,
            transform: Transform {
                position,
                rotation_y_degrees: prefab.default_rotation_y_degrees,
            },
            renderable: prefab.renderable,
            animator: Animator::default(),
            applied_spawn_order: 0,
        });
        id
    }

    pub fn despawn(&mut self, id: VisualId) -> bool {
        let exists_now = self.visuals.iter().any(|visual| visual.id == id);
        let pending_spawn = self.pending_spawns.iter().any(|visual| visual.id == id);
        if !exists_now && !pending_spawn {
            return false;
        }
        self.pending_despawns.push(id);
        true
    }

    pub fn apply_pending(&mut self) {
        if !self.pending_despawns.is_empty() {
            self.pending_despawns.sort();
            self.pending_despawns.dedup();
            let pending = &self.pending_despawns;
            self.visuals
                .retain(|visual| pending.binary_search(&visual.id).is_err());
            self.pending_spawns
                .retain(|visual| pending.binary_search(&visual.id).is_err());
            self.pending_despawns.clear();
        }

        for mut visual in self.pending_spawns.drain(..) {
            visual.applied_spawn_order = self.next_applied_spawn_order;
            self.next_applied_spawn_order = self.next_applied_spawn_order.saturating_add(1);
            self.visuals.push(visual);
        }
    }

    pub fn clear(&mut self) {
        self.visuals.clear();
        self.pending_spawns.clear();
        self.pending_despawns.clear();
        self.next_applied_spawn_order = 0;
        self.camera = Camera::default();
    }

    /// First live visual carrying `tag`, in spawn order. Visuals already
    /// queued for despawn are skipped.
    pub fn find_with_tag(&self, tag: &str) -> Option<VisualId> {
        self.visuals
            .iter()
            .chain(self.pending_spawns.iter())
            .filter(|visual| !self.pending_despawns.contains(&visual.id))
            .find(|visual| visual.tag == tag)
            .map(|visual| visual.id)
    }

    pub fn visual(&self, id: VisualId) -> Option<&VisualObject> {
        self.visuals
            .iter()
            .chain(self.pending_spawns.iter())
            .find(|visual| visual.id == id)
    }

    pub fn visual_mut(&mut self, id: VisualId) -> Option<&mut VisualObject> {
        self.visuals
            .iter_mut()
            .chain(self.pending_spawns.iter_mut())
            .find(|visual| visual.id == id)
    }

    pub fn visual_position(&self, id: VisualId) -> Option<Vec3> {
        self.visual(id).map(|visual| visual.transform.position)
    }

    pub fn set_animator_bool(&mut self, id: VisualId, name: &str, value: bool) -> bool {
        match self.visual_mut(id) {
            Some(visual) => {
                visual.animator.set_bool(name, value);
                true
            }
            None => false,
        }
    }

    pub fn animator_bool(&self, id: VisualId, name: &str) -> Option<bool> {
        self.visual(id)
            .and_then(|visual| visual.animator.get_bool(name))
    }

    pub fn visual_count(&self) -> usize {
        self.visuals.len()
    }

    pub fn visuals(&self) -> &[VisualObject] {
        &self.visuals
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn set_bounds_overlay(&mut self, overlay: Option<BoundsOverlay>) {
        self.bounds_overlay = overlay;
    }

    pub fn bounds_overlay(&self) -> Option<BoundsOverlay> {
        self.bounds_overlay
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

pub(crate) struct SceneMachine {
    lobby: SceneRuntime,
    characters: SceneRuntime,
    active_scene: SceneKey,
}

impl SceneMachine {
    pub(crate) fn new(
        lobby: Box<dyn Scene>,
        characters: Box<dyn Scene>,
        active_scene: SceneKey,
    ) -> Self {
        Self {
            lobby: SceneRuntime {
                scene: lobby,
                world: SceneWorld::default(),
                is_loaded: false,
            },
            characters: SceneRuntime {
                scene: characters,
                world: SceneWorld::default(),
                is_loaded: false,
            },
            active_scene,
        }
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub(crate) fn load_active(&mut self) {
        self.load_scene_if_needed(self.active_scene);
    }

    pub(crate) fn update_active(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
    ) -> SceneCommand {
        let runtime = self.active_runtime_mut();
        let (scene, world) = (&mut runtime.scene, &mut runtime.world);
        scene.update(fixed_dt_seconds, input, world)
    }

    pub(crate) fn apply_pending_active(&mut self) {
        self.active_runtime_mut().world.apply_pending();
    }

    pub(crate) fn active_world(&self) -> &SceneWorld {
        &self.active_runtime_ref().world
    }

    pub(crate) fn debug_title_active(&self) -> Option<String> {
        let runtime = self.active_runtime_ref();
        runtime.scene.debug_title(&runtime.world)
    }

    pub(crate) fn switch_to(&mut self, next_scene: SceneKey) -> bool {
        if self.active_scene == next_scene {
            return false;
        }

        self.load_scene_if_needed(next_scene);
        self.active_scene = next_scene;
        true
    }

    /// Unloads `next_scene` if it was loaded, then loads it from scratch and
    /// makes it active.
    pub(crate) fn hard_reset_to(&mut self, next_scene: SceneKey) -> bool {
        let runtime = self.runtime_mut(next_scene);
        if runtime.is_loaded {
            let (scene, world) = (&mut runtime.scene, &mut runtime.world);
            scene.unload(world);
        }
        runtime.world.clear();
        {
            let (scene, world) = (&mut runtime.scene, &mut runtime.world);
            scene.load(world);
        }
        runtime.is_loaded = true;
        let changed = self.active_scene != next_scene;
        self.active_scene = next_scene;
        changed
    }

    pub(crate) fn shutdown_all(&mut self) {
        for runtime in [&mut self.lobby, &mut self.characters] {
            if runtime.is_loaded {
                let (scene, world) = (&mut runtime.scene, &mut runtime.world);
                scene.unload(world);
                runtime.world.clear();
                runtime.is_loaded = false;
            }
        }
    }

    fn load_scene_if_needed(&mut self, key: SceneKey) {
        let runtime = self.runtime_mut(key);
        if runtime.is_loaded {
            return;
        }
        {
            let (scene, world) = (&mut runtime.scene, &mut runtime.world);
            scene.load(world);
        }
        runtime.is_loaded = true;
    }

    fn active_runtime_mut(&mut self) -> &mut SceneRuntime {
        self.runtime_mut(self.active_scene)
    }

    fn active_runtime_ref(&self) -> &SceneRuntime {
        self.runtime_ref(self.active_scene)
    }

    fn runtime_mut(&mut self, key: SceneKey) -> &mut SceneRuntime {
        match key {
            SceneKey::Lobby => &mut self.lobby,
            SceneKey::Characters => &mut self.characters,
        }
    }

    fn runtime_ref(&self, key: SceneKey) -> &SceneRuntime {
        match key {
            SceneKey::Lobby => &self.lobby,
            SceneKey::Characters => &self.characters,
        }
    }
}
