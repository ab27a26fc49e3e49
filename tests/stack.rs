use serde_json::Value;
use versus::error::StackError;
use versus::stack::{Millis, Persist, StackState, StateCore, StateMachine, Transition};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Key {
    A,
    B,
    C,
}

/// Records lifecycle calls into the shared log.
struct Probe {
    key: Key,
    core: StateCore<Key>,
}

impl Probe {
    fn new(key: Key) -> Self {
        Self { key, core: StateCore::new() }
    }
}

impl StackState<Key, Vec<String>> for Probe {
    fn core(&self) -> &StateCore<Key> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore<Key> {
        &mut self.core
    }

    fn startup(&mut self, log: &mut Vec<String>, persist: Persist, now: Millis) {
        log.push(format!("startup {:?}", self.key));
        self.core.enter(persist, now);
    }

    fn cleanup(&mut self, log: &mut Vec<String>) -> Persist {
        log.push(format!("cleanup {:?}", self.key));
        self.core.persist.insert("from".into(), Value::from(format!("{:?}", self.key)));
        self.core.take_persist()
    }

    fn pause(&mut self, log: &mut Vec<String>) -> Persist {
        log.push(format!("pause {:?}", self.key));
        self.core.persist.clone()
    }

    fn resume(&mut self, log: &mut Vec<String>, persist: Persist, now: Millis) {
        log.push(format!("resume {:?}", self.key));
        self.core.reenter(persist, now);
    }
}

fn machine() -> StateMachine<Key, Probe> {
    StateMachine::from_factory(&[Key::A, Key::B, Key::C], Probe::new)
}

#[test]
fn switch_hands_cleanup_data_to_startup() {
    let mut log = Vec::new();
    let mut sm = machine();
    sm.start(&mut log, Key::A, Persist::new(), 0).unwrap();
    sm.switch_to(&mut log, Key::B, 5).unwrap();

    assert_eq!(sm.keys(), &[Key::B]);
    assert_eq!(log, ["startup A", "cleanup A", "startup B"]);
    let b = sm.get(Key::B).unwrap();
    assert_eq!(b.core.persist.get("from"), Some(&Value::from("A")));
    assert_eq!(b.core.previous, Some(Key::A));
    assert_eq!(b.core.start_time, 5);
}

#[test]
fn push_pauses_and_pop_resumes_with_top_data() {
    let mut log = Vec::new();
    let mut sm = machine();
    sm.start(&mut log, Key::A, Persist::new(), 0).unwrap();
    sm.push(&mut log, Key::B, 1).unwrap();
    sm.push(&mut log, Key::C, 2).unwrap();
    assert_eq!(sm.keys(), &[Key::A, Key::B, Key::C]);
    assert_eq!(sm.beneath(), Some(Key::B));

    sm.pop(&mut log, 2, 3).unwrap();
    assert_eq!(sm.keys(), &[Key::A]);
    assert_eq!(&log[log.len() - 3..], ["cleanup C", "cleanup B", "resume A"]);
    let a = sm.get(Key::A).unwrap();
    assert_eq!(a.core.persist.get("from"), Some(&Value::from("B")));
    assert_eq!(a.core.resume_time, 3);
}

#[test]
fn pop_may_not_empty_the_stack() {
    let mut log = Vec::new();
    let mut sm = machine();
    sm.start(&mut log, Key::A, Persist::new(), 0).unwrap();
    assert_eq!(
        sm.pop(&mut log, 1, 0),
        Err(StackError::InvalidTransition { requested: 1, depth: 1 })
    );
    assert_eq!(sm.depth(), 1);
}

#[test]
fn pushing_a_state_twice_is_rejected() {
    let mut log = Vec::new();
    let mut sm = machine();
    sm.start(&mut log, Key::A, Persist::new(), 0).unwrap();
    sm.push(&mut log, Key::B, 0).unwrap();
    assert!(matches!(sm.push(&mut log, Key::A, 0), Err(StackError::AlreadyOnStack(_))));
}

#[test]
fn unknown_keys_are_errors() {
    let mut log = Vec::new();
    let mut sm: StateMachine<Key, Probe> = StateMachine::new();
    sm.register(Key::A, Probe::new(Key::A));
    assert!(matches!(sm.start(&mut log, Key::C, Persist::new(), 0), Err(StackError::UnknownState(_))));
    assert_eq!(sm.peek(), Err(StackError::Empty));
}

#[test]
fn flags_map_to_requests_in_dispatch_order() {
    let mut core: StateCore<Key> = StateCore::with_targets(Some(Key::B), Some(Key::C));
    assert_eq!(core.screen_request(), Ok(Transition::Stay));

    core.withdraw();
    core.suspended = true;
    assert_eq!(core.screen_request(), Ok(Transition::Push(Key::C)));
    core.suspended = false;
    core.done = true;
    assert_eq!(core.screen_request(), Ok(Transition::Switch(Key::B)));
    assert_eq!(core.action_request(), Ok(Transition::Pop(1)));

    core.quit = true;
    assert_eq!(core.screen_request(), Ok(Transition::Quit));
}

#[test]
fn raised_flag_without_target_is_an_error() {
    let mut core: StateCore<Key> = StateCore::new();
    core.done = true;
    assert_eq!(core.screen_request(), Err(StackError::MissingTarget("done")));
}

#[test]
fn exit_flags_are_cleared_after_leaving() {
    let mut log = Vec::new();
    let mut sm = machine();
    sm.start(&mut log, Key::A, Persist::new(), 0).unwrap();
    sm.get_mut(Key::A).unwrap().core.done = true;
    sm.apply(&mut log, Transition::Switch(Key::B), 0).unwrap();
    assert!(!sm.get(Key::A).unwrap().core.done);
}
