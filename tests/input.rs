use versus::input::{ActionMap, Control, InputState, KeyCode, KeyEvent};

#[test]
fn press_and_release_produce_edges_and_events() {
    let mut input = InputState::new();
    input.press(KeyCode::KeyA);
    assert!(input.is_key_held(KeyCode::KeyA));
    assert!(input.is_key_pressed(KeyCode::KeyA));
    assert_eq!(input.events, vec![KeyEvent::down(KeyCode::KeyA)]);

    input.clear_frame_state();
    assert!(input.is_key_held(KeyCode::KeyA));
    assert!(!input.is_key_pressed(KeyCode::KeyA));
    assert!(input.events.is_empty());

    input.release(KeyCode::KeyA);
    assert!(!input.is_key_held(KeyCode::KeyA));
    assert!(input.is_key_released(KeyCode::KeyA));
    assert_eq!(input.events, vec![KeyEvent::up(KeyCode::KeyA)]);
}

#[test]
fn key_repeat_does_not_repeat_events() {
    let mut input = InputState::new();
    input.press(KeyCode::Space);
    input.press(KeyCode::Space);
    assert_eq!(input.events.len(), 1);
}

#[test]
fn typed_control_characters_are_dropped() {
    let mut input = InputState::new();
    for ch in ['a', '\u{8}', '1', '\r'] {
        input.type_char(ch);
    }
    assert_eq!(input.chars_typed, vec!['a', '1']);
    input.clear_frame_state();
    assert!(input.chars_typed.is_empty());
}

#[test]
fn default_bindings_do_not_overlap() {
    let (p1, p2) = (ActionMap::player_one(), ActionMap::player_two());
    for control in Control::ALL {
        assert_eq!(p1.keys_for(control).len(), 1, "{control:?}");
        assert_eq!(p2.keys_for(control).len(), 1, "{control:?}");
        for key in p1.keys_for(control) {
            assert!(!p2.is_bound(*key), "{key:?} bound for both players");
        }
    }
    assert_eq!(p1.action_for(KeyCode::KeyU), Some(Control::Light));
    assert_eq!(p2.action_for(KeyCode::Backspace), Some(Control::Pause));
}

#[test]
fn held_collects_every_active_control() {
    let map = ActionMap::player_one();
    let mut input = InputState::new();
    input.press(KeyCode::KeyD);
    input.press(KeyCode::Space);
    input.press(KeyCode::ArrowLeft);
    let held = map.held(&input);
    assert_eq!(held.len(), 2);
    assert!(held.contains(&Control::Right));
    assert!(held.contains(&Control::Jump));
    assert!(map.is_pressed(Control::Jump, &input));
}

#[test]
fn extra_bindings_stack_up() {
    let mut map = ActionMap::player_one();
    map.bind(Control::Jump, KeyCode::KeyW);
    let mut input = InputState::new();
    input.press(KeyCode::KeyW);
    assert!(map.is_held(Control::Jump, &input));
    assert_eq!(map.keys_for(Control::Jump), &[KeyCode::Space, KeyCode::KeyW]);
}
