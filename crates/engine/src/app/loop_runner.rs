use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::input::{ActionStates, ToggleBank};
use super::scene::SceneMachine;
use super::{InputAction, InputSnapshot, Renderer, Scene, SceneCommand, SceneKey};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub initial_scene: SceneKey,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Character Toggle".to_string(),
            window_width: 960,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            initial_scene: SceneKey::Characters,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(
    config: LoopConfig,
    lobby: Box<dyn Scene>,
    characters: Box<dyn Scene>,
) -> Result<(), AppError> {
    let mut scenes = SceneMachine::new(lobby, characters, config.initial_scene);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let window_for_loop = Arc::clone(&window);
    let mut renderer = Renderer::new(window).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let mut input_collector = InputCollector::new(config.window_width, config.window_height);
    scenes.load_active();
    scenes.apply_pending_active();
    info!(
        scene = ?scenes.active_scene(),
        visual_count = scenes.active_world().visual_count(),
        "scene_loaded"
    );
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_applied_title: Option<String> = None;
    let mut ticks_run: u64 = 0;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        input_collector.mark_quit_requested();
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        input_collector.set_window_size(new_size.width, new_size.height);
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        input_collector.set_window_size(size.width, size.height);
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_keyboard_input(&event);
                        if input_collector.quit_requested {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                        last_frame_instant = now;

                        let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                        accumulator = accumulator.saturating_add(clamped_frame_dt);

                        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                        for _ in 0..step_plan.ticks_to_run {
                            let input_snapshot = input_collector.snapshot_for_tick();
                            let command = scenes.update_active(fixed_dt_seconds, &input_snapshot);
                            scenes.apply_pending_active();

                            let switched = match command {
                                SceneCommand::SwitchTo(next_scene) => scenes.switch_to(next_scene),
                                SceneCommand::HardResetTo(next_scene) => {
                                    input_collector.reset_toggles();
                                    scenes.hard_reset_to(next_scene)
                                }
                                SceneCommand::None => false,
                            };
                            if switched {
                                scenes.apply_pending_active();
                                info!(
                                    scene = ?scenes.active_scene(),
                                    visual_count = scenes.active_world().visual_count(),
                                    "scene_switched"
                                );
                            }
                            ticks_run = ticks_run.saturating_add(1);
                        }
                        accumulator = step_plan.remaining_accumulator;

                        if step_plan.dropped_backlog > Duration::ZERO {
                            warn!(
                                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                                max_ticks_per_frame, "sim_clamp_triggered"
                            );
                        }

                        if let Err(error) = renderer.render_world(scenes.active_world()) {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }

                        let next_title = scenes.debug_title_active();
                        if next_title != last_applied_title {
                            if let Some(title) = &next_title {
                                window_for_loop.set_title(title);
                            } else {
                                window_for_loop.set_title(&config.window_title);
                            }
                            last_applied_title = next_title;
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                scenes.shutdown_all();
                info!(ticks_run, "shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    tab_is_down: bool,
    switch_scene_pressed_edge: bool,
    action_states: ActionStates,
    toggles: ToggleBank,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.handle_physical_key(key_event.physical_key, is_pressed);
        self.handle_key_state(is_tab_key(key_event), key_event.state);
    }

    fn handle_key_state(&mut self, is_tab: bool, state: ElementState) {
        if !is_tab {
            return;
        }

        match state {
            ElementState::Pressed => {
                if !self.tab_is_down {
                    self.switch_scene_pressed_edge = true;
                }
                self.tab_is_down = true;
            }
            ElementState::Released => self.tab_is_down = false,
        }
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        if let Some(slot) = toggle_slot_for_key(key) {
            self.toggles.handle_key(slot, is_pressed);
            if is_pressed {
                debug!(slot, on = self.toggles.snapshot().is_on(slot), "toggle_key");
            }
            return;
        }

        match key {
            PhysicalKey::Code(KeyCode::KeyA) => {
                self.action_states.set(InputAction::CommandA, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyD) => {
                self.action_states.set(InputAction::CommandD, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyS) => {
                self.action_states.set(InputAction::CommandS, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyZ) => {
                self.action_states.set(InputAction::CommandZ, is_pressed);
            }
            PhysicalKey::Code(KeyCode::Escape) => {
                self.action_states.set(InputAction::Quit, is_pressed);
                if is_pressed {
                    self.mark_quit_requested();
                }
            }
            _ => {}
        }
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.switch_scene_pressed_edge,
            self.action_states,
            self.toggles.snapshot(),
            self.window_width,
            self.window_height,
        );
        self.switch_scene_pressed_edge = false;
        self.action_states.clear_pressed();
        snapshot
    }

    fn reset_toggles(&mut self) {
        self.toggles.reset();
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }
}

fn toggle_slot_for_key(key: PhysicalKey) -> Option<usize> {
    match key {
        PhysicalKey::Code(KeyCode::Digit1) | PhysicalKey::Code(KeyCode::Numpad1) => Some(0),
        PhysicalKey::Code(KeyCode::Digit2) | PhysicalKey::Code(KeyCode::Numpad2) => Some(1),
        PhysicalKey::Code(KeyCode::Digit3) | PhysicalKey::Code(KeyCode::Numpad3) => Some(2),
        PhysicalKey::Code(KeyCode::Digit4) | PhysicalKey::Code(KeyCode::Numpad4) => Some(3),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::replace(&mut accumulator, Duration::ZERO)
    } else {
        Duration::ZERO
    };

    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn is_tab_key(key_event: &KeyEvent) -> bool {
    matches!(key_event.physical_key, PhysicalKey::Code(KeyCode::Tab))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ToggleSnapshot;

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(600), max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn zero_duration_falls_back() {
        assert_eq!(
            normalize_non_zero_duration(Duration::ZERO, Duration::from_secs(1)),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn held_tab_does_not_spam_press_edges() {
        let mut input = InputCollector::default();

        input.handle_key_state(true, ElementState::Pressed);
        let first = input.snapshot_for_tick();
        input.handle_key_state(true, ElementState::Pressed);
        let second = input.snapshot_for_tick();
        input.handle_key_state(true, ElementState::Released);
        input.handle_key_state(true, ElementState::Pressed);
        let third = input.snapshot_for_tick();

        assert!(first.switch_scene_pressed());
        assert!(!second.switch_scene_pressed());
        assert!(third.switch_scene_pressed());
    }

    #[test]
    fn command_keys_map_to_actions_with_single_tick_edges() {
        let mut input = InputCollector::default();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::KeyA), true);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::KeyZ), true);

        let first = input.snapshot_for_tick();
        assert!(first.was_pressed(InputAction::CommandA));
        assert!(first.was_pressed(InputAction::CommandZ));
        assert!(!first.was_pressed(InputAction::CommandD));

        let second = input.snapshot_for_tick();
        assert!(second.is_down(InputAction::CommandA));
        assert!(!second.was_pressed(InputAction::CommandA));
    }

    #[test]
    fn digit_keys_flip_toggles() {
        let mut input = InputCollector::default();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Digit2), true);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Digit2), false);

        let snapshot = input.snapshot_for_tick();
        assert!(!snapshot.toggles().is_on(0));
        assert!(snapshot.toggles().is_on(1));

        input.handle_physical_key(PhysicalKey::Code(KeyCode::Digit2), true);
        assert!(!input.snapshot_for_tick().toggles().is_on(1));
    }

    #[test]
    fn reset_toggles_clears_all_slots() {
        let mut input = InputCollector::default();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Digit1), true);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Numpad4), true);
        input.reset_toggles();
        assert_eq!(input.snapshot_for_tick().toggles(), ToggleSnapshot::all_off());
    }

    #[test]
    fn toggle_state_persists_across_ticks() {
        let mut input = InputCollector::default();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Digit4), true);
        assert!(input.snapshot_for_tick().toggles().is_on(3));
        assert!(input.snapshot_for_tick().toggles().is_on(3));
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputCollector::new(960, 720);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Escape), true);
        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.quit_requested());
        assert_eq!(snapshot.window_size(), (960, 720));
    }
}
