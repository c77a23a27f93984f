#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    CommandA,
    CommandD,
    CommandS,
    CommandZ,
    Quit,
}

const ACTION_COUNT: usize = 5;

pub const TOGGLE_COUNT: usize = 4;

/// Held state plus a press edge per action. Edges survive until the next
/// tick snapshot consumes them.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
    pressed: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        let index = action.index();
        if is_down && !self.down[index] {
            self.pressed[index] = true;
        }
        self.down[index] = is_down;
    }

    pub(crate) fn set_pressed(&mut self, action: InputAction, pressed: bool) {
        self.pressed[action.index()] = pressed;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed[action.index()]
    }

    pub(crate) fn clear_pressed(&mut self) {
        self.pressed = [false; ACTION_COUNT];
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::CommandA => 0,
            InputAction::CommandD => 1,
            InputAction::CommandS => 2,
            InputAction::CommandZ => 3,
            InputAction::Quit => 4,
        }
    }
}

/// Level state of the on-screen toggles, as read by a scene each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleSnapshot {
    on: [bool; TOGGLE_COUNT],
}

impl ToggleSnapshot {
    pub fn all_off() -> Self {
        Self::default()
    }

    pub fn is_on(&self, index: usize) -> bool {
        self.on.get(index).copied().unwrap_or(false)
    }

    pub fn with_toggle(mut self, index: usize, on: bool) -> Self {
        if let Some(slot) = self.on.get_mut(index) {
            *slot = on;
        }
        self
    }
}

/// Toggle widgets driven by the digit keys. A key press flips its toggle
/// once; holding the key does not keep flipping it.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ToggleBank {
    state: ToggleSnapshot,
    key_is_down: [bool; TOGGLE_COUNT],
}

impl ToggleBank {
    pub(crate) fn handle_key(&mut self, index: usize, is_pressed: bool) {
        let Some(key_down) = self.key_is_down.get_mut(index) else {
            return;
        };
        if is_pressed && !*key_down {
            let flipped = !self.state.is_on(index);
            self.state = self.state.with_toggle(index, flipped);
        }
        *key_down = is_pressed;
    }

    pub(crate) fn snapshot(&self) -> ToggleSnapshot {
        self.state
    }

    /// Turns every toggle off. Held keys stay held, so they do not flip
    /// again until released and pressed.
    pub(crate) fn reset(&mut self) {
        self.state = ToggleSnapshot::all_off();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_edge_is_recorded_once_while_held() {
        let mut states = ActionStates::default();
        states.set(InputAction::CommandA, true);
        assert!(states.was_pressed(InputAction::CommandA));

        states.clear_pressed();
        states.set(InputAction::CommandA, true);
        assert!(states.is_down(InputAction::CommandA));
        assert!(!states.was_pressed(InputAction::CommandA));
    }

    #[test]
    fn release_then_press_records_new_edge() {
        let mut states = ActionStates::default();
        states.set(InputAction::CommandZ, true);
        states.clear_pressed();
        states.set(InputAction::CommandZ, false);
        states.set(InputAction::CommandZ, true);
        assert!(states.was_pressed(InputAction::CommandZ));
    }

    #[test]
    fn toggle_bank_flips_on_press_not_on_hold() {
        let mut bank = ToggleBank::default();
        bank.handle_key(0, true);
        assert!(bank.snapshot().is_on(0));

        bank.handle_key(0, true);
        assert!(bank.snapshot().is_on(0));

        bank.handle_key(0, false);
        bank.handle_key(0, true);
        assert!(!bank.snapshot().is_on(0));
    }

    #[test]
    fn reset_turns_toggles_off_without_rearming_held_keys() {
        let mut bank = ToggleBank::default();
        bank.handle_key(2, true);
        bank.reset();
        assert_eq!(bank.snapshot(), ToggleSnapshot::all_off());

        bank.handle_key(2, true);
        assert!(!bank.snapshot().is_on(2));
    }

    #[test]
    fn toggle_bank_ignores_out_of_range_slots() {
        let mut bank = ToggleBank::default();
        bank.handle_key(TOGGLE_COUNT, true);
        assert_eq!(bank.snapshot(), ToggleSnapshot::all_off());
    }

    #[test]
    fn toggle_snapshot_out_of_range_reads_off() {
        let snapshot = ToggleSnapshot::all_off().with_toggle(9, true);
        assert!(!snapshot.is_on(9));
    }
}
