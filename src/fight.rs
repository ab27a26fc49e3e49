//! One match: two players on a stage, collision and damage, scores, and the
//! end-of-match result handed to the results screen.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assets::{Assets, CharacterArt};
use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::error::StackError;
use crate::fighter::{Character, MAX_HP, Status};
use crate::geometry::{Rect, masks_collide};
use crate::input::{ActionMap, Control, InputState, KeyEvent};
use crate::renderer::{Align, Color, DrawList, font};
use crate::stack::Millis;

pub const FLOOR: f32 = 720.0;
pub const SPAWN_X: [f32; 2] = [100.0, 1180.0];
/// Fighters may lean this far past the right edge.
pub const EDGE_SLACK: i32 = 60;
pub const END_DELAY_MS: Millis = 2000;
pub const SCORE_PER_COMBO: f64 = 0.2;

// ── Player ───────────────────────────────────────────────────────────────────

pub struct Player {
    pub character: Character,
    art: CharacterArt,
    /// Unrounded running total; rounded only by [`Player::score`].
    score: f64,
    pub combo: u32,
    pub max_combo: u32,
    pub has_won: bool,
}

impl Player {
    pub fn new(number: u8, art: CharacterArt, controls: ActionMap<Control>, now: Millis) -> Result<Self, StackError> {
        let x = SPAWN_X[usize::from(number.saturating_sub(1)).min(1)];
        let character = Character::new(&art.id, number, controls, x, FLOOR, now)?;
        Ok(Self { character, art, score: 0.0, combo: 0, max_combo: 0, has_won: false })
    }

    pub fn number(&self) -> u8 {
        self.character.body.player
    }

    pub fn art(&self) -> &CharacterArt {
        &self.art
    }

    /// Score as shown and saved.
    pub fn score(&self) -> u32 {
        self.score.round() as u32
    }

    fn result(&self) -> PlayerResult {
        PlayerResult {
            player: self.number(),
            char_id: self.art.id.clone(),
            name: self.art.name.clone(),
            score: self.score(),
            combo: self.combo,
            max_combo: self.max_combo,
            won: self.has_won,
        }
    }
}

// ── MatchOutcome ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub player: u8,
    pub char_id: String,
    pub name: String,
    pub score: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub won: bool,
}

/// Result of a finished match, ordered by player number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub players: Vec<PlayerResult>,
    pub winner: Option<u8>,
}

impl MatchOutcome {
    pub fn player(&self, number: u8) -> Option<&PlayerResult> {
        self.players.iter().find(|p| p.player == number)
    }

    pub fn loser(&self) -> Option<u8> {
        self.winner.map(|w| if w == 1 { 2 } else { 1 })
    }
}

// ── Fight ────────────────────────────────────────────────────────────────────

pub struct Fight {
    players: [Player; 2],
    end_game: bool,
    end_time: Option<Millis>,
    winner: Option<u8>,
}

fn art_for(assets: &Assets, id: &str) -> Result<CharacterArt, StackError> {
    assets
        .character(id)
        .or_else(|| assets.roster().next())
        .cloned()
        .ok_or_else(|| StackError::UnknownState(format!("character {id}")))
}

impl Fight {
    pub fn new(
        assets: &Assets,
        chars: [&str; 2],
        controls: [ActionMap<Control>; 2],
        now: Millis,
    ) -> Result<Self, StackError> {
        let [c1, c2] = controls;
        let players = [
            Player::new(1, art_for(assets, chars[0])?, c1, now)?,
            Player::new(2, art_for(assets, chars[1])?, c2, now)?,
        ];
        info!(p1 = chars[0], p2 = chars[1], "match started");
        Ok(Self { players, end_game: false, end_time: None, winner: None })
    }

    pub fn player(&self, number: u8) -> &Player {
        &self.players[usize::from(number.saturating_sub(1)).min(1)]
    }

    pub fn player_mut(&mut self, number: u8) -> &mut Player {
        &mut self.players[usize::from(number.saturating_sub(1)).min(1)]
    }

    pub fn is_over(&self) -> bool {
        self.end_game
    }

    pub fn winner(&self) -> Option<u8> {
        self.winner
    }

    pub fn loser(&self) -> Option<u8> {
        self.winner.map(|w| if w == 1 { 2 } else { 1 })
    }

    pub fn handle_event(&mut self, event: KeyEvent) -> Result<(), StackError> {
        for p in &mut self.players {
            p.character.handle_event(event)?;
        }
        Ok(())
    }

    /// One live tick. Does nothing once the match has ended. Returns the
    /// player hit this tick, if any.
    pub fn tick(&mut self, input: &InputState, now: Millis) -> Result<Option<u8>, StackError> {
        if self.end_game {
            return Ok(None);
        }
        for p in &mut self.players {
            p.character.update(input, &p.art, now)?;
        }
        self.clamp_positions();
        let hit = self.resolve_collisions();
        self.update_scores();
        self.check_end(now);
        Ok(hit)
    }

    /// Keep fighters on stage. The published pose moves with them.
    pub fn clamp_positions(&mut self) {
        for p in &mut self.players {
            let body = &mut p.character.body;
            let width = body.pose.as_ref().map_or(0, |pose| pose.rect.w);
            let max_x = (SCREEN_WIDTH + EDGE_SLACK - width) as f32;
            let clamped = body.pos.x.clamp(0.0, max_x.max(0.0));
            let shift = (clamped - body.pos.x).round() as i32;
            body.pos.x = clamped;
            if let Some(pose) = body.pose.as_mut() {
                pose.rect.x += shift;
            }
        }
    }

    fn poses_overlap(&self) -> bool {
        let (a, b) = (self.players[0].character.pose(), self.players[1].character.pose());
        match (a, b) {
            (Some(a), Some(b)) => masks_collide(&a.rect, &a.mask, &b.rect, &b.mask),
            _ => false,
        }
    }

    /// Apply at most one hit this tick. Returns the player number that was hit.
    pub fn resolve_collisions(&mut self) -> Option<u8> {
        let (a, b) = (&self.players[0].character.body, &self.players[1].character.body);
        let attacking = (a.status == Status::Attack, b.status == Status::Attack);
        let attacker = match attacking {
            (true, true) => match (a.attack_time, b.attack_time) {
                (Some(ta), Some(tb)) if ta < tb => 0,
                (Some(ta), Some(tb)) if tb < ta => 1,
                _ => return None,
            },
            (true, false) if b.status.is_vulnerable() => 0,
            (false, true) if a.status.is_vulnerable() => 1,
            _ => return None,
        };
        if !self.poses_overlap() {
            return None;
        }

        let defender = 1 - attacker;
        let dmg = self.players[attacker].character.body.dmg;
        let target = &mut self.players[defender].character;
        target.take_hit(dmg);
        debug!(
            attacker = attacker + 1,
            defender = defender + 1,
            dmg,
            hp = target.body.hp,
            hit_count = target.body.hit_count,
            "hit"
        );
        Some(defender as u8 + 1)
    }

    /// A player's combo is the opponent's current hit count.
    pub fn update_scores(&mut self) {
        let hits = [self.players[0].character.body.hit_count, self.players[1].character.body.hit_count];
        for (i, p) in self.players.iter_mut().enumerate() {
            p.combo = u32::from(hits[1 - i]);
            p.max_combo = p.max_combo.max(p.combo);
            p.score += SCORE_PER_COMBO * f64::from(p.combo);
        }
    }

    /// Record the winner the first tick a player runs out of hp. Player 2 is
    /// checked first.
    pub fn check_end(&mut self, now: Millis) -> bool {
        if self.end_game {
            return true;
        }
        let winner = if self.players[1].character.body.hp <= 0 {
            1
        } else if self.players[0].character.body.hp <= 0 {
            2
        } else {
            return false;
        };
        self.winner = Some(winner);
        self.player_mut(winner).has_won = true;
        self.end_game = true;
        self.end_time = Some(now);
        info!(winner, "match over");
        true
    }

    /// The end banner has been up long enough.
    pub fn ready_to_leave(&self, now: Millis) -> bool {
        self.end_time.is_some_and(|t| now.saturating_sub(t) > END_DELAY_MS)
    }

    pub fn outcome(&self) -> MatchOutcome {
        MatchOutcome { players: self.players.iter().map(Player::result).collect(), winner: self.winner }
    }

    // ── Drawing ──────────────────────────────────────────────────────────────

    pub fn draw(&self, out: &mut DrawList) {
        out.sprite("stage/bg", Rect::new(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT));
        out.sprite("stage/fg", Rect::new(0, 320, SCREEN_WIDTH, 540));
        out.fill(Rect::new(0, 860, SCREEN_WIDTH, 100), Color::STAGE_FLOOR);

        for p in &self.players {
            if let Some(pose) = p.character.pose() {
                out.sprite_ex(&pose.sprite, pose.rect, pose.flipped, Color::WHITE);
            }
        }
        for p in &self.players {
            draw_hud(p, out);
        }

        if self.end_game {
            out.fill(Rect::new(0, SCREEN_HEIGHT / 2 - 25, SCREEN_WIDTH, 50), Color::BLACK.alpha8(150));
            out.text("GAME OVER!", SCREEN_WIDTH / 2, SCREEN_HEIGHT / 2 - 14, 4, Color::SPACE_GREY, Align::Center);
        }
    }
}

const HUD_MARGIN: i32 = 20;
const HP_BAR_W: i32 = 400;

/// Health panel in the top corner plus the pointer over the fighter.
fn draw_hud(p: &Player, out: &mut DrawList) {
    let number = p.number();
    // Player 2's panel is mirrored into the right corner.
    let place = |x: i32, y: i32, w: i32, h: i32| {
        if number == 1 {
            Rect::new(HUD_MARGIN + x, HUD_MARGIN + y, w, h)
        } else {
            Rect::new(SCREEN_WIDTH - HUD_MARGIN - x - w, HUD_MARGIN + y, w, h)
        }
    };

    let hp = p.character.body.hp.max(0);
    let hp_w = HP_BAR_W * hp.min(MAX_HP) / MAX_HP;
    out.fill(place(60, 5, 460, 40), Color::SPACE_GREY);
    out.fill(place(100, 11, HP_BAR_W, 28), Color::HP_BACK);
    if hp_w > 0 {
        out.fill(place(100, 11, hp_w, 28), Color::HP_FILL);
    }
    out.fill(place(0, 4, 140, 140), Color::SPACE_GREY);
    out.fill(place(10, 14, 120, 120), Color::NICE_GREY);
    out.sprite(&p.art.thumb, place(35, 39, 70, 70));

    let label = format!("{}  {}", p.art.name, p.score());
    let label_rect = place(150, 52, 0, 0);
    let align_x = if number == 1 { label_rect.x } else { label_rect.x - font::text_width(&label, 2) };
    out.text(&label, align_x, label_rect.y, 2, Color::SPACE_GREY, Align::Left);

    if let Some(pose) = p.character.pose() {
        let color = Color::player(number);
        let (cx, bottom) = (pose.rect.center_x(), pose.rect.y - 20);
        for row in 0..5 {
            let half = 25 - row * 5;
            out.fill(Rect::new(cx - half, bottom - 30 + row * 6, half * 2, 6), color);
        }
    }
}
