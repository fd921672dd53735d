use evdev::{InputEvent, InputEventKind, Key, RelativeAxisType};

/// Domain-level input decoded from a raw evdev event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnobInput {
    RotateClockwise,
    RotateCounterClockwise,
    Press,
    Release,
}

/// Classify one raw input event, or return `None` for anything the daemon
/// does not react to (sync reports, key repeats, off-by-more-than-one dial
/// deltas from a glitching encoder).
///
/// Pure and stateless; press timing lives in [`crate::knob::KnobStateMachine`].
pub fn classify(event: &InputEvent) -> Option<KnobInput> {
    match event.kind() {
        InputEventKind::RelAxis(RelativeAxisType::REL_DIAL) => match event.value() {
            1 => Some(KnobInput::RotateClockwise),
            -1 => Some(KnobInput::RotateCounterClockwise),
            _ => None,
        },
        InputEventKind::Key(Key::BTN_0) => match event.value() {
            1 => Some(KnobInput::Press),
            0 => Some(KnobInput::Release),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdev::EventType;

    fn dial(value: i32) -> InputEvent {
        InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_DIAL.0, value)
    }

    fn button(value: i32) -> InputEvent {
        InputEvent::new(EventType::KEY, Key::BTN_0.code(), value)
    }

    #[test]
    fn dial_deltas_map_to_rotation() {
        assert_eq!(classify(&dial(1)), Some(KnobInput::RotateClockwise));
        assert_eq!(classify(&dial(-1)), Some(KnobInput::RotateCounterClockwise));
    }

    #[test]
    fn dial_noise_is_ignored() {
        assert_eq!(classify(&dial(0)), None);
        assert_eq!(classify(&dial(2)), None);
        assert_eq!(classify(&dial(-3)), None);
    }

    #[test]
    fn button_edges_map_to_press_and_release() {
        assert_eq!(classify(&button(1)), Some(KnobInput::Press));
        assert_eq!(classify(&button(0)), Some(KnobInput::Release));
    }

    #[test]
    fn key_repeat_is_ignored() {
        assert_eq!(classify(&button(2)), None);
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let other_key = InputEvent::new(EventType::KEY, Key::KEY_A.code(), 1);
        assert_eq!(classify(&other_key), None);

        let other_axis = InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_X.0, 1);
        assert_eq!(classify(&other_axis), None);

        let sync = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
        assert_eq!(classify(&sync), None);
    }
}
