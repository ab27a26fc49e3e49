//! Screen transition animations as explicit step machines.
//!
//! A [`Sequence`] chains segments and advances exactly one step per tick. Every
//! segment yields a visible frame per step; the call after the last frame of the
//! last segment reports the sequence finished.

use std::collections::VecDeque;

pub const FADE_STEPS: u8 = 7;
pub const FADE_ALPHA_STEP: u8 = 36;
/// Overlay alpha at the start of a fade-in and the end of a fade-out.
pub const FADE_OPAQUE: u8 = FADE_STEPS * FADE_ALPHA_STEP;

pub const SLIDE_STEPS: u8 = 15;
pub const SLIDE_STEP_PX: i32 = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fade {
    Idle,
    FadingIn(u8),
    FadingOut(u8),
    Done,
}

impl Fade {
    pub fn fade_in() -> Self {
        Fade::FadingIn(0)
    }

    pub fn fade_out() -> Self {
        Fade::FadingOut(0)
    }

    /// Advance one step and return the black overlay alpha for this frame.
    /// Returns `None` once the fade has no frames left.
    pub fn advance(&mut self) -> Option<u8> {
        match *self {
            Fade::FadingIn(i) if i < FADE_STEPS => {
                *self = Fade::FadingIn(i + 1);
                Some(FADE_OPAQUE - FADE_ALPHA_STEP * (i + 1))
            }
            Fade::FadingOut(i) if i < FADE_STEPS => {
                *self = Fade::FadingOut(i + 1);
                Some(FADE_ALPHA_STEP * (i + 1))
            }
            Fade::Idle => None,
            _ => {
                *self = Fade::Done;
                None
            }
        }
    }
}

/// The menu logo rising from the screen centre.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slide {
    step: u8,
}

impl Slide {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    /// Returns the vertical offset for this frame.
    pub fn advance(&mut self) -> Option<i32> {
        if self.step >= SLIDE_STEPS {
            return None;
        }
        self.step += 1;
        Some(-SLIDE_STEP_PX * self.step as i32)
    }
}

impl Default for Slide {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
    Fade(Fade),
    Slide(Slide),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finish {
    /// Entry animation; normal logic resumes afterwards.
    Enter,
    /// Exit animation; the owner raises `done` afterwards.
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    Running,
    Entered,
    Exited,
}

#[derive(Clone, Debug)]
pub struct Sequence {
    segments: VecDeque<Segment>,
    finish: Finish,
}

impl Sequence {
    pub fn new(segments: impl IntoIterator<Item = Segment>, finish: Finish) -> Self {
        Self { segments: segments.into_iter().collect(), finish }
    }

    pub fn fade_in() -> Self {
        Self::new([Segment::Fade(Fade::fade_in())], Finish::Enter)
    }

    pub fn fade_out() -> Self {
        Self::new([Segment::Fade(Fade::fade_out())], Finish::Exit)
    }

    pub fn finish(&self) -> Finish {
        self.finish
    }
}

/// Owns the running sequence of a screen plus the visual state it leaves behind.
#[derive(Clone, Debug, Default)]
pub struct Transitioner {
    active: Option<Sequence>,
    overlay: u8,
    logo_offset: i32,
}

impl Transitioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, sequence: Sequence) {
        if let Some(Segment::Fade(Fade::FadingIn(_))) = sequence.segments.front() {
            self.overlay = FADE_OPAQUE;
        }
        self.active = Some(sequence);
    }

    /// Start an exit fade unless a sequence is already running.
    pub fn exit(&mut self) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.start(Sequence::fade_out());
        true
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_exiting(&self) -> bool {
        self.active.as_ref().is_some_and(|s| s.finish == Finish::Exit)
    }

    /// Black overlay alpha to draw over the screen.
    pub fn overlay(&self) -> u8 {
        self.overlay
    }

    pub fn logo_offset(&self) -> i32 {
        self.logo_offset
    }

    pub fn reset(&mut self) {
        self.active = None;
        self.overlay = 0;
        self.logo_offset = 0;
    }

    /// Advance the running sequence by one step. `None` means no sequence was
    /// running and the caller should run its own logic this tick.
    pub fn tick(&mut self) -> Option<Progress> {
        let seq = self.active.as_mut()?;
        while let Some(segment) = seq.segments.front_mut() {
            match segment {
                Segment::Fade(fade) => {
                    if let Some(alpha) = fade.advance() {
                        self.overlay = alpha;
                        return Some(Progress::Running);
                    }
                }
                Segment::Slide(slide) => {
                    if let Some(offset) = slide.advance() {
                        self.logo_offset = offset;
                        return Some(Progress::Running);
                    }
                }
            }
            seq.segments.pop_front();
        }

        let finish = seq.finish;
        self.active = None;
        Some(match finish {
            Finish::Enter => {
                self.overlay = 0;
                Progress::Entered
            }
            Finish::Exit => Progress::Exited,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_out_alphas_climb_by_fixed_step() {
        let mut fade = Fade::fade_out();
        let alphas: Vec<u8> = std::iter::from_fn(|| fade.advance()).collect();
        assert_eq!(alphas, vec![36, 72, 108, 144, 180, 216, 252]);
        assert_eq!(fade, Fade::Done);
    }

    #[test]
    fn fade_in_ends_transparent() {
        let mut fade = Fade::fade_in();
        let alphas: Vec<u8> = std::iter::from_fn(|| fade.advance()).collect();
        assert_eq!(alphas.len(), FADE_STEPS as usize);
        assert_eq!(alphas.last(), Some(&0));
    }

    #[test]
    fn idle_fade_yields_nothing() {
        assert_eq!(Fade::Idle.advance(), None);
    }
}
