use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use kira::{
    Volume,
    manager::{AudioManager, AudioManagerSettings, backend::DefaultBackend},
    sound::{
        PlaybackRate,
        static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    },
    tween::Tween,
};
use tracing::{debug, warn};

use crate::assets::Assets;

/// Sound names the screens trigger. Missing files simply stay silent.
pub mod cue {
    pub const MENU_MOVE: &str = "menu_move";
    pub const CONFIRM: &str = "confirm";
    pub const BACK: &str = "back";
    pub const HIT: &str = "hit";
    pub const MENU_MUSIC: &str = "menu";
    pub const FIGHT_MUSIC: &str = "battle";
}

#[derive(Debug, Clone, Copy)]
pub struct SoundConfig {
    pub volume: f32,
    pub pitch: f32,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self { volume: 1.0, pitch: 1.0 }
    }
}

pub struct AudioContext {
    /// `None` when no audio device exists (headless runs, tests).
    manager: Option<AudioManager>,
    sounds: HashMap<String, StaticSoundData>,
    music: Option<(String, StaticSoundHandle)>,
}

impl AudioContext {
    pub fn new() -> Self {
        let manager = match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
            Ok(m) => Some(m),
            Err(e) => {
                warn!(error = %e, "audio device unavailable; sound disabled");
                None
            }
        };
        Self { manager, sounds: HashMap::new(), music: None }
    }

    /// Context that never touches an audio device.
    pub fn silent() -> Self {
        Self { manager: None, sounds: HashMap::new(), music: None }
    }

    pub fn is_available(&self) -> bool {
        self.manager.is_some()
    }

    pub fn load_sound<P: AsRef<Path>>(&mut self, name: &str, path: P) {
        if self.manager.is_none() {
            return;
        }
        match StaticSoundData::from_file(path.as_ref()) {
            Ok(sound) => {
                self.sounds.insert(name.to_string(), sound);
            }
            Err(e) => warn!(sound = name, path = %path.as_ref().display(), error = %e, "could not load sound"),
        }
    }

    /// Decode every sound file the asset scan found.
    pub fn load_all(&mut self, assets: &Assets) {
        for (name, path) in assets.sounds() {
            self.load_sound(name, path);
        }
        debug!(count = self.sounds.len(), "sounds loaded");
    }

    pub fn play(&mut self, name: &str, config: SoundConfig) {
        let Some(manager) = self.manager.as_mut() else { return };
        let Some(data) = self.sounds.get(name) else { return };
        let mut settings = StaticSoundSettings::new();
        settings.playback_rate = PlaybackRate::Factor(f64::from(config.pitch)).into();
        settings.volume = Volume::Amplitude(f64::from(config.volume.clamp(0.0, 2.0))).into();
        if let Err(e) = manager.play(data.clone().with_settings(settings)) {
            debug!(sound = name, error = %e, "play failed");
        }
    }

    /// Loop `name` as background music, fading out whatever played before.
    /// Asking for the track already playing does nothing.
    pub fn play_music(&mut self, name: &str, fade_in_secs: f32) {
        if self.music.as_ref().is_some_and(|(current, _)| current == name) {
            return;
        }
        let Some(manager) = self.manager.as_mut() else { return };
        let Some(data) = self.sounds.get(name) else { return };

        if let Some((_, mut handle)) = self.music.take() {
            handle.stop(Tween { duration: Duration::from_secs_f32(0.5), ..Default::default() });
        }

        let mut settings = StaticSoundSettings::new().loop_region(0.0..);
        settings.volume = Volume::Amplitude(0.0).into();
        match manager.play(data.clone().with_settings(settings)) {
            Ok(mut handle) => {
                handle.set_volume(
                    Volume::Amplitude(1.0),
                    Tween { duration: Duration::from_secs_f32(fade_in_secs), ..Default::default() },
                );
                self.music = Some((name.to_string(), handle));
            }
            Err(e) => warn!(track = name, error = %e, "could not start music"),
        }
    }

    pub fn stop_music(&mut self) {
        if let Some((_, mut handle)) = self.music.take() {
            handle.stop(Tween::default());
        }
    }
}

impl Default for AudioContext {
    fn default() -> Self {
        Self::new()
    }
}
