//! A fighter: the published [`Body`] plus the action stack that drives it.

pub mod actions;

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use glam::Vec2;
use tracing::debug;

use crate::assets::CharacterArt;
use crate::error::StackError;
use crate::geometry::{Mask, Rect};
use crate::input::{ActionMap, Control, InputState, KeyEvent, KeyState};
use crate::stack::{Millis, Persist, StackState, StateMachine};

pub const MAX_HP: i32 = 1000;
/// Horizontal speed while walking or steering in the air.
pub const MAX_SPEED: f32 = 12.0;
pub const JUMP_VELOCITY: f32 = 20.0;
pub const GRAVITY: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// +1 facing right, -1 facing left.
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ground,
    Aerial,
    Attack,
    SpecialAttack,
    Hit,
    Knocked,
    Guard,
}

impl Status {
    /// States an attack can land on.
    pub fn is_vulnerable(self) -> bool {
        matches!(self, Status::Ground | Status::Aerial | Status::Hit)
    }
}

/// Sprite frame currently shown, placed on screen, with its collision mask.
#[derive(Debug, Clone)]
pub struct Pose {
    pub sprite: String,
    pub rect: Rect,
    pub flipped: bool,
    pub mask: Arc<Mask>,
}

// ── Body ─────────────────────────────────────────────────────────────────────

/// Everything about a fighter that actions mutate and the match reads.
#[derive(Debug, Clone)]
pub struct Body {
    pub player: u8,
    pub hp: i32,
    pub energy: i32,
    pub dmg: i32,
    /// Consecutive hits taken, cycling 0..=3.
    pub hit_count: u8,
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    /// Floor height; `pos.y` never goes past it.
    pub floor: f32,
    pub facing: Facing,
    pub status: Status,
    pub attack_time: Option<Millis>,
    pub now: Millis,
    /// Controls held this tick.
    pub held: HashSet<Control>,
    /// Action directly beneath the running one.
    pub beneath: Option<ActionKind>,
    pub pose: Option<Pose>,
}

impl Body {
    pub fn new(player: u8, x: f32, floor: f32) -> Self {
        Self {
            player,
            hp: MAX_HP,
            energy: 0,
            dmg: 0,
            hit_count: 0,
            pos: Vec2::new(x, floor),
            vel: Vec2::new(0.0, JUMP_VELOCITY),
            acc: Vec2::new(0.0, GRAVITY),
            floor,
            facing: if player == 1 { Facing::Right } else { Facing::Left },
            status: Status::Ground,
            attack_time: None,
            now: 0,
            held: HashSet::new(),
            beneath: None,
            pose: None,
        }
    }

    pub fn is_held(&self, control: Control) -> bool {
        self.held.contains(&control)
    }

    pub fn is_airborne(&self) -> bool {
        self.pos.y < self.floor
    }

    /// Move along the facing direction.
    pub fn step_forward(&mut self, px: f32) {
        self.pos.x += px * self.facing.sign();
    }

    /// Show `index` of `animation`, placed from the frame's trim offsets.
    pub fn present(&mut self, art: &CharacterArt, animation: &str, index: usize) {
        let Some(frame) = art.frame(animation, index) else {
            debug!(animation, index, "frame missing; keeping previous pose");
            return;
        };
        let (x, y) = (self.pos.x.round() as i32, self.pos.y.round() as i32);
        let (w, h) = (frame.width as i32, frame.height as i32);
        let (rect, mask, flipped) = match self.facing {
            Facing::Right => (Rect::from_bottom_left(x - frame.meta.dx, y, w, h), &frame.mask, false),
            Facing::Left => (
                Rect::from_bottom_right(x + frame.meta.dx + frame.meta.off_w, y, w, h),
                &frame.mask_flipped,
                true,
            ),
        };
        self.pose = Some(Pose { sprite: frame.sprite.clone(), rect, flipped, mask: Arc::clone(mask) });
    }
}

// ── Actions ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Idle,
    Walking,
    Jumping,
    Falling,
    VulFall,
    Dash,
    Guarding,
    Hurt,
    LightNeutral,
    LightAerial,
}

impl ActionKind {
    pub const ALL: [ActionKind; 10] = [
        ActionKind::Idle,
        ActionKind::Walking,
        ActionKind::Jumping,
        ActionKind::Falling,
        ActionKind::VulFall,
        ActionKind::Dash,
        ActionKind::Guarding,
        ActionKind::Hurt,
        ActionKind::LightNeutral,
        ActionKind::LightAerial,
    ];

    /// Actions a landed hit can interrupt.
    pub fn is_interruptible(self) -> bool {
        matches!(
            self,
            ActionKind::Idle | ActionKind::Walking | ActionKind::Jumping | ActionKind::Falling | ActionKind::VulFall
        )
    }
}

/// One entry of a fighter's action stack.
pub trait Action: StackState<ActionKind, Body> {
    fn kind(&self) -> ActionKind;

    /// Current index into this action's frame strip.
    fn frame(&self) -> usize;

    /// Part of a chained string, 1 to 3. Single-part actions stay on 1.
    fn part(&self) -> usize {
        1
    }

    /// A bound key went down or up.
    fn handle_event(&mut self, _body: &mut Body, _control: Control, _state: KeyState) {}

    fn update(&mut self, body: &mut Body);

    /// Publish the current pose. Some actions also advance their frame here.
    fn draw(&mut self, body: &mut Body, art: &CharacterArt);
}

// ── Character ────────────────────────────────────────────────────────────────

pub struct Character {
    pub body: Body,
    art_id: String,
    controls: ActionMap<Control>,
    actions: StateMachine<ActionKind, Box<dyn Action>>,
    queue: VecDeque<ActionKind>,
}

impl Character {
    /// Build every action once and start on `Idle`.
    pub fn new(
        art_id: &str,
        player: u8,
        controls: ActionMap<Control>,
        x: f32,
        floor: f32,
        now: Millis,
    ) -> Result<Self, StackError> {
        let mut body = Body::new(player, x, floor);
        body.now = now;
        let mut actions = StateMachine::from_factory(&ActionKind::ALL, actions::build);
        actions.start(&mut body, ActionKind::Idle, Persist::new(), now)?;
        Ok(Self { body, art_id: art_id.to_string(), controls, actions, queue: VecDeque::new() })
    }

    pub fn art_id(&self) -> &str {
        &self.art_id
    }

    pub fn controls(&self) -> &ActionMap<Control> {
        &self.controls
    }

    /// Running action.
    pub fn action(&self) -> Result<ActionKind, StackError> {
        self.actions.peek()
    }

    /// Action stack, bottom first.
    pub fn action_stack(&self) -> &[ActionKind] {
        self.actions.keys()
    }

    pub fn frame(&self) -> Result<usize, StackError> {
        Ok(self.actions.top()?.frame())
    }

    /// Part of the running action's string.
    pub fn part(&self) -> Result<usize, StackError> {
        Ok(self.actions.top()?.part())
    }

    pub fn pose(&self) -> Option<&Pose> {
        self.body.pose.as_ref()
    }

    /// Route a key event to the running action when it is one of ours.
    pub fn handle_event(&mut self, event: KeyEvent) -> Result<(), StackError> {
        let Some(control) = self.controls.action_for(event.key) else {
            return Ok(());
        };
        self.actions.top_mut()?.handle_event(&mut self.body, control, event.state);
        Ok(())
    }

    /// One simulation tick: stack dispatch, hit reaction, then the running
    /// action's update and draw.
    pub fn update(&mut self, input: &InputState, art: &CharacterArt, now: Millis) -> Result<(), StackError> {
        self.body.now = now;
        self.body.held = self.controls.held(input);

        let request = self.actions.top()?.core().action_request()?;
        self.actions.apply(&mut self.body, request, now)?;

        if self.body.hit_count > 0 {
            self.react_to_hit(now)?;
        }

        self.body.beneath = self.actions.beneath();
        let top = self.actions.top_mut()?;
        top.update(&mut self.body);
        top.draw(&mut self.body, art);
        Ok(())
    }

    fn react_to_hit(&mut self, now: Millis) -> Result<(), StackError> {
        let top = self.actions.peek()?;
        if !top.is_interruptible() {
            return Ok(());
        }
        debug!(player = self.body.player, interrupted = ?top, "hit reaction");
        match top {
            ActionKind::Walking => self.actions.switch_to(&mut self.body, ActionKind::Hurt, now),
            ActionKind::Jumping => {
                self.actions.switch_to(&mut self.body, ActionKind::VulFall, now)?;
                self.actions.push(&mut self.body, ActionKind::Hurt, now)
            }
            _ => self.actions.push(&mut self.body, ActionKind::Hurt, now),
        }
    }

    /// Apply a landed hit.
    pub fn take_hit(&mut self, dmg: i32) {
        self.body.hp -= dmg;
        self.body.hit_count = (self.body.hit_count + 1) % 4;
    }

    pub fn enqueue_action(&mut self, kind: ActionKind) {
        self.queue.push_back(kind);
    }

    pub fn dequeue_action(&mut self) -> Option<ActionKind> {
        let next = self.queue.pop_front();
        if next.is_none() {
            debug!(player = self.body.player, "no pending action");
        }
        next
    }
}
