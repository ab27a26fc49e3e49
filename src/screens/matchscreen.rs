use serde_json::Value;
use tracing::{error, info, warn};

use crate::audio::{SoundConfig, cue};
use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::engine::Context;
use crate::error::StackError;
use crate::fade::{Sequence, Transitioner};
use crate::fight::Fight;
use crate::input::{Control, InputState, KeyEvent};
use crate::renderer::{Align, Color, DrawList};
use crate::stack::{Millis, Persist, StackState, StateCore};

use super::{
    CHAR1, CHAR2, EXIT_NOSAVE, PLAYERS, Screen, ScreenKind, control_for, draw_transition, leave_to, persist_str,
    run_transition,
};

/// The fight itself, with pause and the hand-off to the results screen.
pub struct MatchScreen {
    core: StateCore<ScreenKind>,
    fade: Transitioner,
    fight: Option<Fight>,
    /// Setup failure surfaced on the next update.
    failure: Option<StackError>,
}

impl MatchScreen {
    pub fn new() -> Self {
        Self {
            core: StateCore::with_targets(Some(ScreenKind::End), Some(ScreenKind::Pause)),
            fade: Transitioner::new(),
            fight: None,
            failure: None,
        }
    }

    fn exit_without_saving(&self) -> bool {
        self.core.persist.get(EXIT_NOSAVE).and_then(Value::as_bool).unwrap_or(false)
    }
}

impl Default for MatchScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl StackState<ScreenKind, Context> for MatchScreen {
    fn core(&self) -> &StateCore<ScreenKind> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore<ScreenKind> {
        &mut self.core
    }

    fn startup(&mut self, ctx: &mut Context, persist: Persist, now: Millis) {
        self.core.enter(persist, now);
        self.core.next = Some(ScreenKind::End);
        self.core.persist.insert(EXIT_NOSAVE.into(), Value::Bool(false));
        self.fade.reset();
        self.fade.start(Sequence::fade_in());

        let first = ctx.assets.roster().next().map(|art| art.id.clone()).unwrap_or_default();
        let chars = [CHAR1, CHAR2].map(|key| persist_str(&self.core.persist, key).unwrap_or(first.as_str()).to_string());
        let controls = [ctx.config.controls(1).clone(), ctx.config.controls(2).clone()];
        match Fight::new(&ctx.assets, [&chars[0], &chars[1]], controls, now) {
            Ok(fight) => self.fight = Some(fight),
            Err(e) => {
                error!(error = %e, "could not set up the match");
                self.fight = None;
                self.failure = Some(e);
            }
        }
        ctx.audio.play_music(cue::FIGHT_MUSIC, 0.5);
    }

    fn resume(&mut self, _ctx: &mut Context, persist: Persist, now: Millis) {
        self.core.reenter(persist, now);
        if self.exit_without_saving() {
            info!("match abandoned from pause menu");
            leave_to(&mut self.core, &mut self.fade, ScreenKind::MainMenu);
        }
    }

    fn cleanup(&mut self, _ctx: &mut Context) -> Persist {
        if self.exit_without_saving() {
            self.core.persist.insert(EXIT_NOSAVE.into(), Value::Bool(false));
        } else if let Some(fight) = &self.fight {
            match serde_json::to_value(fight.outcome()) {
                Ok(outcome) => {
                    self.core.persist.insert(PLAYERS.into(), outcome);
                }
                Err(e) => warn!(error = %e, "could not record match outcome"),
            }
        }
        self.fight = None;
        self.core.take_persist()
    }
}

impl Screen for MatchScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Match
    }

    fn handle_event(&mut self, ctx: &mut Context, event: KeyEvent) -> Result<(), StackError> {
        if self.fade.is_active() {
            return Ok(());
        }
        let pause = (1..=2).any(|p| control_for(ctx, p, event) == Some(Control::Pause));
        if pause {
            if event.is_up() {
                self.core.suspend(ScreenKind::Pause);
            }
            return Ok(());
        }
        match self.fight.as_mut() {
            Some(fight) => fight.handle_event(event),
            None => Ok(()),
        }
    }

    fn update(&mut self, ctx: &mut Context, input: &InputState, now: Millis, _dt: Millis) -> Result<(), StackError> {
        if let Some(e) = self.failure.take() {
            return Err(e);
        }
        if run_transition(&mut self.core, &mut self.fade) {
            return Ok(());
        }
        let Some(fight) = self.fight.as_mut() else { return Ok(()) };

        if !fight.is_over() {
            if fight.tick(input, now)?.is_some() {
                ctx.audio.play(cue::HIT, SoundConfig::default());
            }
        } else if fight.ready_to_leave(now) {
            leave_to(&mut self.core, &mut self.fade, ScreenKind::End);
        }
        Ok(())
    }

    fn draw(&self, ctx: &Context, out: &mut DrawList) {
        let Some(fight) = &self.fight else {
            draw_transition(&self.fade, out);
            return;
        };
        fight.draw(out);

        if ctx.config.debug {
            for number in 1..=2u8 {
                let character = &fight.player(number).character;
                let stack: Vec<String> = character.action_stack().iter().map(|k| format!("{k:?}")).collect();
                let line = format!("P{number} {} HP {}", stack.join(">"), character.body.hp);
                out.text(&line, 20, SCREEN_HEIGHT - 60 + i32::from(number) * 20, 2, Color::WHITE, Align::Left);
            }
        }
        out.overlay(self.fade.overlay(), SCREEN_WIDTH, SCREEN_HEIGHT);
    }
}
