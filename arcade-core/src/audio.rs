//! Procedural sound cues.
//!
//! Every cue is synthesized from scratch when it fires; nothing is cached between cues.
//! Output devices live behind [`CueSink`] so the core never touches an audio API.

use serde::{Deserialize, Serialize};

use crate::config::Features;
use crate::sim::GameEvent;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    Shoot,
    Explosion,
    Death,
    BossWarning,
    BossDeath,
}

impl Cue {
    pub const ALL: [Cue; 5] = [
        Self::Shoot,
        Self::Explosion,
        Self::Death,
        Self::BossWarning,
        Self::BossDeath,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shoot => "shoot",
            Self::Explosion => "explosion",
            Self::Death => "death",
            Self::BossWarning => "boss_warning",
            Self::BossDeath => "boss_death",
        }
    }

    /// Length of the rendered cue in seconds.
    pub fn duration_secs(self) -> f32 {
        self.tones()
            .iter()
            .map(|tone| tone.offset_secs + tone.duration_secs)
            .fold(0.0, f32::max)
    }

    fn tones(self) -> &'static [Tone] {
        match self {
            Self::Shoot => &SHOOT,
            Self::Explosion => &EXPLOSION,
            Self::Death => &DEATH,
            Self::BossWarning => &BOSS_WARNING,
            Self::BossDeath => &BOSS_DEATH,
        }
    }
}

impl std::str::FromStr for Cue {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|cue| cue.as_str() == value)
            .ok_or_else(|| {
                format!("invalid cue: {value} (expected shoot|explosion|death|boss_warning|boss_death)")
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Square,
    Sawtooth,
}

impl Waveform {
    /// `phase` is in cycles, `[0, 1)`.
    #[inline]
    fn sample(self, phase: f32) -> f32 {
        match self {
            Self::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Self::Sawtooth => 2.0 * phase - 1.0,
        }
    }
}

/// One oscillator voice: exponential pitch sweep under a linear fade-out.
#[derive(Clone, Copy, Debug)]
struct Tone {
    waveform: Waveform,
    start_hz: f32,
    end_hz: f32,
    offset_secs: f32,
    duration_secs: f32,
    gain: f32,
}

const fn tone(
    waveform: Waveform,
    start_hz: f32,
    end_hz: f32,
    offset_secs: f32,
    duration_secs: f32,
    gain: f32,
) -> Tone {
    Tone {
        waveform,
        start_hz,
        end_hz,
        offset_secs,
        duration_secs,
        gain,
    }
}

const SHOOT: [Tone; 1] = [tone(Waveform::Square, 880.0, 440.0, 0.0, 0.1, 0.2)];

const EXPLOSION: [Tone; 1] = [tone(Waveform::Sawtooth, 200.0, 50.0, 0.0, 0.3, 0.3)];

const DEATH: [Tone; 2] = [
    tone(Waveform::Sawtooth, 400.0, 50.0, 0.0, 0.8, 0.25),
    tone(Waveform::Square, 300.0, 40.0, 0.0, 0.8, 0.15),
];

const BOSS_WARNING: [Tone; 3] = [
    tone(Waveform::Square, 440.0, 440.0, 0.0, 0.15, 0.2),
    tone(Waveform::Square, 330.0, 330.0, 0.15, 0.15, 0.2),
    tone(Waveform::Square, 440.0, 440.0, 0.3, 0.15, 0.2),
];

const BOSS_DEATH: [Tone; 3] = [
    tone(Waveform::Sawtooth, 300.0, 40.0, 0.0, 0.3, 0.3),
    tone(Waveform::Sawtooth, 250.0, 35.0, 0.15, 0.3, 0.3),
    tone(Waveform::Sawtooth, 200.0, 30.0, 0.3, 0.3, 0.3),
];

/// Renders `cue` as mono samples in `[-1, 1]`.
pub fn synthesize(cue: Cue, sample_rate: u32) -> Vec<f32> {
    let rate = sample_rate.max(1) as f32;
    let total = (cue.duration_secs() * rate).ceil() as usize;
    let mut buffer = vec![0.0f32; total];

    for voice in cue.tones() {
        let start = (voice.offset_secs * rate) as usize;
        let length = (voice.duration_secs * rate) as usize;
        let ratio = voice.end_hz / voice.start_hz;
        let mut phase = 0.0f32;

        for index in 0..length {
            let Some(slot) = buffer.get_mut(start + index) else {
                break;
            };
            let progress = index as f32 / length as f32;
            let frequency = voice.start_hz * ratio.powf(progress);
            let envelope = voice.gain * (1.0 - progress);

            *slot += voice.waveform.sample(phase) * envelope;
            phase = (phase + frequency / rate).fract();
        }
    }

    for sample in &mut buffer {
        *sample = sample.clamp(-1.0, 1.0);
    }
    buffer
}

/// Which cue, if any, a simulation event should sound.
pub fn cue_for_event(event: &GameEvent) -> Option<Cue> {
    match event {
        GameEvent::Shot => Some(Cue::Shoot),
        GameEvent::EnemyDestroyed { .. } | GameEvent::BossHit { .. } => Some(Cue::Explosion),
        GameEvent::BossSpawned { .. } => Some(Cue::BossWarning),
        GameEvent::BossDefeated { .. } => Some(Cue::BossDeath),
        GameEvent::PlayerDied { .. } => Some(Cue::Death),
        GameEvent::PhaseAdvanced { .. } | GameEvent::NamePromptReady { .. } => None,
    }
}

/// Output device for rendered cues.
pub trait CueSink {
    fn sample_rate(&self) -> u32;

    fn play(&mut self, cue: Cue, samples: Vec<f32>);
}

/// Turns simulation events into sounds once the player has interacted with the page.
///
/// Browsers refuse to start audio before a user gesture, so the sink is only opened by
/// the first [`CuePlayer::unlock_with`]. Cues before that are dropped.
pub struct CuePlayer<S> {
    enabled: bool,
    unlocked: bool,
    sink: Option<S>,
}

impl<S: CueSink> CuePlayer<S> {
    pub fn new(features: Features) -> Self {
        Self {
            enabled: features.audio,
            unlocked: false,
            sink: None,
        }
    }

    /// Opens the sink on the first call. Later calls do nothing, even if opening failed.
    pub fn unlock_with(&mut self, open: impl FnOnce() -> Option<S>) {
        if self.unlocked || !self.enabled {
            return;
        }
        self.unlocked = true;
        self.sink = open();
        if self.sink.is_none() {
            tracing::warn!("audio output unavailable; cues muted");
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn is_active(&self) -> bool {
        self.enabled && self.sink.is_some()
    }

    pub fn play(&mut self, cue: Cue) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(sink) = self.sink.as_mut() else {
            return false;
        };
        let samples = synthesize(cue, sink.sample_rate());
        sink.play(cue, samples);
        true
    }

    /// Plays the cue for each event in order. Returns how many cues were sent.
    pub fn handle_events(&mut self, events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter_map(cue_for_event)
            .filter(|cue| self.play(*cue))
            .count()
    }

    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::EnemyKind;

    #[derive(Default)]
    struct RecordingSink {
        played: Vec<(Cue, usize)>,
    }

    impl CueSink for RecordingSink {
        fn sample_rate(&self) -> u32 {
            8_000
        }

        fn play(&mut self, cue: Cue, samples: Vec<f32>) {
            self.played.push((cue, samples.len()));
        }
    }

    fn zero_crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|pair| (pair[0] < 0.0) != (pair[1] < 0.0))
            .count()
    }

    #[test]
    fn death_is_the_longest_cue() {
        let death = Cue::Death.duration_secs();
        for cue in Cue::ALL {
            if cue != Cue::Death {
                assert!(cue.duration_secs() < death, "{cue:?} outlasts death");
            }
        }
        assert!(Cue::Explosion.duration_secs() > Cue::Shoot.duration_secs());
    }

    #[test]
    fn rendered_length_tracks_duration() {
        for cue in Cue::ALL {
            let samples = synthesize(cue, DEFAULT_SAMPLE_RATE);
            let expected = (cue.duration_secs() * DEFAULT_SAMPLE_RATE as f32).ceil() as usize;
            assert_eq!(samples.len(), expected);
        }
    }

    #[test]
    fn samples_are_bounded_and_audible() {
        for cue in Cue::ALL {
            let samples = synthesize(cue, DEFAULT_SAMPLE_RATE);
            assert!(samples.iter().all(|sample| (-1.0..=1.0).contains(sample)));
            assert!(samples.iter().any(|sample| sample.abs() > 0.05), "{cue:?} is silent");
        }
    }

    #[test]
    fn shoot_sweeps_downward() {
        let samples = synthesize(Cue::Shoot, DEFAULT_SAMPLE_RATE);
        let (head, tail) = samples.split_at(samples.len() / 2);
        assert!(zero_crossings(head) > zero_crossings(tail));
    }

    #[test]
    fn cue_names_parse_back() {
        for cue in Cue::ALL {
            assert_eq!(cue.as_str().parse::<Cue>(), Ok(cue));
        }
        assert!("laser".parse::<Cue>().is_err());
    }

    #[test]
    fn events_map_to_cues() {
        assert_eq!(cue_for_event(&GameEvent::Shot), Some(Cue::Shoot));
        assert_eq!(
            cue_for_event(&GameEvent::EnemyDestroyed {
                kind: EnemyKind::Wave,
                points: 20
            }),
            Some(Cue::Explosion)
        );
        assert_eq!(
            cue_for_event(&GameEvent::BossSpawned { phase: 1 }),
            Some(Cue::BossWarning)
        );
        assert_eq!(
            cue_for_event(&GameEvent::BossDefeated {
                phase: 1,
                points: 100
            }),
            Some(Cue::BossDeath)
        );
        assert_eq!(
            cue_for_event(&GameEvent::PlayerDied { score: 3 }),
            Some(Cue::Death)
        );
        assert_eq!(cue_for_event(&GameEvent::PhaseAdvanced { phase: 2 }), None);
    }

    #[test]
    fn cues_before_unlock_are_dropped() {
        let mut player: CuePlayer<RecordingSink> = CuePlayer::new(Features::default());
        assert!(!player.play(Cue::Shoot));

        player.unlock_with(|| Some(RecordingSink::default()));
        assert!(player.play(Cue::Shoot));
        assert_eq!(player.sink().map(|sink| sink.played.len()), Some(1));
    }

    #[test]
    fn unlock_opens_the_sink_once() {
        let mut opens = 0;
        let mut player: CuePlayer<RecordingSink> = CuePlayer::new(Features::default());

        for _ in 0..3 {
            player.unlock_with(|| {
                opens += 1;
                Some(RecordingSink::default())
            });
        }
        assert_eq!(opens, 1);
        assert!(player.is_unlocked());
    }

    #[test]
    fn failed_unlock_mutes_without_retrying() {
        let mut player: CuePlayer<RecordingSink> = CuePlayer::new(Features::default());
        player.unlock_with(|| None);
        player.unlock_with(|| Some(RecordingSink::default()));

        assert!(player.is_unlocked());
        assert!(!player.is_active());
        assert!(!player.play(Cue::Death));
    }

    #[test]
    fn disabled_audio_never_opens_a_sink() {
        let mut player: CuePlayer<RecordingSink> = CuePlayer::new(Features::BASIC);
        player.unlock_with(|| Some(RecordingSink::default()));

        assert!(!player.is_active());
        assert_eq!(player.handle_events(&[GameEvent::Shot]), 0);
    }

    #[test]
    fn handle_events_skips_silent_events() {
        let mut player: CuePlayer<RecordingSink> = CuePlayer::new(Features::default());
        player.unlock_with(|| Some(RecordingSink::default()));

        let played = player.handle_events(&[
            GameEvent::Shot,
            GameEvent::PhaseAdvanced { phase: 2 },
            GameEvent::PlayerDied { score: 0 },
            GameEvent::NamePromptReady { score: 0 },
        ]);
        assert_eq!(played, 2);

        let cues: Vec<Cue> = player
            .sink()
            .map(|sink| sink.played.iter().map(|(cue, _)| *cue).collect())
            .unwrap_or_default();
        assert_eq!(cues, vec![Cue::Shoot, Cue::Death]);
    }
}
