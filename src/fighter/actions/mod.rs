//! Concrete fighter actions. Each owns a frame strip: the animation frame
//! shown at every index of its own counter.

use crate::stack::{Millis, StateCore};

use super::{Action, ActionKind, Body};

macro_rules! core_access {
    () => {
        fn core(&self) -> &crate::stack::StateCore<crate::fighter::ActionKind> {
            &self.core
        }
        fn core_mut(&mut self) -> &mut crate::stack::StateCore<crate::fighter::ActionKind> {
            &mut self.core
        }
    };
}

mod aerial;
mod attacks;
mod ground;

pub use aerial::{Fall, Jumping};
pub use attacks::{LightAerial, LightNeutral};
pub use ground::{Dash, Guarding, Hurt, Idle, Walking};

/// `(animation, frame index)` per step of an action.
pub type Strip = Vec<(&'static str, usize)>;

/// Frames `from..to` of `animation`, each held for `hold` steps.
pub fn strip(animation: &'static str, from: usize, to: usize, hold: usize) -> Strip {
    (from..to).flat_map(|i| std::iter::repeat_n((animation, i), hold)).collect()
}

/// Registry factory.
pub fn build(kind: ActionKind) -> Box<dyn Action> {
    match kind {
        ActionKind::Idle => Box::new(Idle::new()),
        ActionKind::Walking => Box::new(Walking::new()),
        ActionKind::Jumping => Box::new(Jumping::new()),
        ActionKind::Falling => Box::new(Fall::new(ActionKind::Falling)),
        ActionKind::VulFall => Box::new(Fall::new(ActionKind::VulFall)),
        ActionKind::Dash => Box::new(Dash::new()),
        ActionKind::Guarding => Box::new(Guarding::new()),
        ActionKind::Hurt => Box::new(Hurt::new()),
        ActionKind::LightNeutral => Box::new(LightNeutral::new()),
        ActionKind::LightAerial => Box::new(LightAerial::new()),
    }
}

fn elapsed(core: &StateCore<ActionKind>, body: &Body) -> Millis {
    body.now.saturating_sub(core.start_time)
}

fn show(body: &mut Body, art: &crate::assets::CharacterArt, strip: &Strip, frame: usize) {
    if let Some(&(animation, index)) = strip.get(frame.min(strip.len().saturating_sub(1))) {
        body.present(art, animation, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_holds_each_frame() {
        let s = strip("stand", 0, 2, 3);
        assert_eq!(s, vec![("stand", 0), ("stand", 0), ("stand", 0), ("stand", 1), ("stand", 1), ("stand", 1)]);
    }

    #[test]
    fn factory_builds_matching_kinds() {
        for kind in ActionKind::ALL {
            assert_eq!(build(kind).kind(), kind);
        }
    }
}
