use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arcade_core::audio::{synthesize, DEFAULT_SAMPLE_RATE};
use arcade_core::{Cue, CueSink};

/// Writes mono 16-bit PCM.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("failed to create WAV file {}", path.display()))?;
    for &sample in samples {
        let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(sample_i16)
            .context("failed to write WAV sample")?;
    }
    writer.finalize().context("failed to finalize WAV file")?;
    Ok(())
}

/// Renders one cue straight to disk.
pub fn write_cue_wav(path: &Path, cue: Cue, sample_rate: u32) -> Result<usize> {
    let samples = synthesize(cue, sample_rate);
    write_wav(path, &samples, sample_rate)?;
    Ok(samples.len())
}

/// Discards every cue.
#[derive(Debug, Default)]
pub struct NullSink;

impl CueSink for NullSink {
    fn sample_rate(&self) -> u32 {
        DEFAULT_SAMPLE_RATE
    }

    fn play(&mut self, _cue: Cue, _samples: Vec<f32>) {}
}

/// Captures each played cue as a numbered WAV file, for auditioning a headless run.
#[derive(Debug)]
pub struct WavSink {
    dir: PathBuf,
    sample_rate: u32,
    written: Vec<PathBuf>,
}

impl WavSink {
    pub fn create(dir: &Path, sample_rate: u32) -> Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("failed creating {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            sample_rate,
            written: Vec::new(),
        })
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl CueSink for WavSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn play(&mut self, cue: Cue, samples: Vec<f32>) {
        let path = self
            .dir
            .join(format!("{:04}_{}.wav", self.written.len(), cue.as_str()));
        match write_wav(&path, &samples, self.sample_rate) {
            Ok(()) => self.written.push(path),
            Err(err) => tracing::warn!(error = %err, cue = cue.as_str(), "failed to capture cue"),
        }
    }
}

#[cfg(feature = "playback")]
pub use speaker::SpeakerSink;

#[cfg(feature = "playback")]
mod speaker {
    use arcade_core::audio::DEFAULT_SAMPLE_RATE;
    use arcade_core::{Cue, CueSink};
    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, OutputStreamHandle};

    /// Default output device. The stream must outlive every queued buffer.
    pub struct SpeakerSink {
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    impl SpeakerSink {
        pub fn open() -> Option<Self> {
            match OutputStream::try_default() {
                Ok((stream, handle)) => Some(Self {
                    _stream: stream,
                    handle,
                }),
                Err(err) => {
                    tracing::warn!(error = %err, "no audio output device");
                    None
                }
            }
        }
    }

    impl CueSink for SpeakerSink {
        fn sample_rate(&self) -> u32 {
            DEFAULT_SAMPLE_RATE
        }

        fn play(&mut self, cue: Cue, samples: Vec<f32>) {
            let source = SamplesBuffer::new(1, DEFAULT_SAMPLE_RATE, samples);
            if let Err(err) = self.handle.play_raw(source) {
                tracing::warn!(error = %err, cue = cue.as_str(), "cue playback failed");
            }
        }
    }
}

/// Sink used by interactive play.
#[cfg(feature = "playback")]
pub type PlaySink = SpeakerSink;
#[cfg(not(feature = "playback"))]
pub type PlaySink = NullSink;

pub fn open_play_sink() -> Option<PlaySink> {
    #[cfg(feature = "playback")]
    {
        SpeakerSink::open()
    }
    #[cfg(not(feature = "playback"))]
    {
        tracing::info!("built without the playback feature; cues are not played");
        None
    }
}

#[cfg(test)]
mod tests {
    use arcade_core::{CuePlayer, Features, GameEvent};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn cue_wav_has_expected_length_and_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shoot.wav");

        let written = write_cue_wav(&path, Cue::Shoot, 8_000).unwrap();
        assert_eq!(written, synthesize(Cue::Shoot, 8_000).len());
        assert!(written >= 800);

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 8_000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len() as usize, written);
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("loud.wav");
        write_wav(&path, &[2.0, -2.0, 0.0], 8_000).unwrap();

        let samples: Vec<i16> = hound::WavReader::open(&path)
            .unwrap()
            .into_samples::<i16>()
            .map(|sample| sample.unwrap())
            .collect();
        assert_eq!(samples, vec![i16::MAX, -i16::MAX, 0]);
    }

    #[test]
    fn wav_sink_numbers_captured_cues() {
        let dir = TempDir::new().unwrap();
        let sink = WavSink::create(&dir.path().join("cues"), 8_000).unwrap();

        let mut player = CuePlayer::new(Features::default());
        player.unlock_with(|| Some(sink));
        let sent = player.handle_events(&[GameEvent::Shot, GameEvent::PlayerDied { score: 3 }]);
        assert_eq!(sent, 2);

        let written = player.sink().map(WavSink::written).unwrap_or_default();
        let names: Vec<String> = written
            .iter()
            .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
            .collect();
        assert_eq!(names, vec!["0000_shoot.wav", "0001_death.wav"]);
        assert!(written.iter().all(|path| path.exists()));
    }
}
