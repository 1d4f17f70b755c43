//! Frame Simulator - A render loop without a renderer
//!
//! Simulates:
//! - Displays with steady, jittery or stalling frame pacing
//! - Audio advancing in real time while frames are late or early
//! - One avatar driven by a lip-sync player across several meshes

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use visage_core::{VisageResult, Viseme};
use visage_rig::{BrowTransform, EyebrowPair, MorphMesh};
use visage_runtime::{AvatarDriver, DriverConfig, TickReport};
use visage_time::{
    AudioClock, LipSyncPlayer, ManualClock, PlaybackHandle, PollOutcome, VisemeTrack,
};

/// Frame pacing model
#[derive(Clone, Debug)]
pub struct FrameJitter {
    /// Random jitter per frame (microseconds)
    pub jitter_us: u32,
    /// Every n-th frame stalls
    pub stall_every: Option<u32>,
    /// Length of a stalled frame
    pub stall: Duration,
}

impl FrameJitter {
    pub fn new(jitter_us: u32, stall_every: Option<u32>, stall: Duration) -> Self {
        FrameJitter {
            jitter_us,
            stall_every,
            stall,
        }
    }

    /// Perfect vsync
    pub fn steady() -> Self {
        Self::new(0, None, Duration::ZERO)
    }

    /// Busy main thread
    pub fn jittery() -> Self {
        Self::new(4_000, None, Duration::ZERO)
    }

    /// Occasional long frames (GC pause, tab switch)
    pub fn stalling() -> Self {
        Self::new(1_000, Some(30), Duration::from_millis(250))
    }

    /// Actual delta for frame `n`
    pub fn apply(&self, n: u64, nominal: Duration, rng: &mut StdRng) -> Duration {
        if let Some(every) = self.stall_every {
            if every > 0 && n > 0 && n % every as u64 == 0 {
                return self.stall;
            }
        }
        let jitter = if self.jitter_us > 0 {
            rng.gen_range(-(self.jitter_us as i64)..=self.jitter_us as i64)
        } else {
            0
        };
        let us = (nominal.as_micros() as i64 + jitter).max(1_000);
        Duration::from_micros(us as u64)
    }
}

/// One simulated frame
#[derive(Clone, Debug)]
pub struct FrameSample {
    pub frame: u64,
    /// Frame delta handed to the driver
    pub dt: Duration,
    /// Audio position after this frame, ms
    pub playback_ms: f64,
    pub outcome: PollOutcome,
    pub report: TickReport,
}

impl FrameSample {
    pub fn viseme(&self) -> Option<Viseme> {
        match self.outcome {
            PollOutcome::Active(v) => Some(v),
            _ => None,
        }
    }
}

/// Driver, player, clock and meshes stepped together
pub struct FrameSimulator {
    driver: AvatarDriver,
    player: LipSyncPlayer,
    clock: ManualClock,
    meshes: Vec<MorphMesh>,
    brows: EyebrowPair,
    nominal: Duration,
    jitter: FrameJitter,
    rng: StdRng,
    frame: u64,
}

impl FrameSimulator {
    pub fn new(config: DriverConfig, fps: f32, jitter: FrameJitter, seed: u64) -> VisageResult<Self> {
        let player = LipSyncPlayer::with_config(config.player.clone());
        let brows = EyebrowPair::with_config(
            config.brows.clone(),
            BrowTransform::default(),
            BrowTransform::default(),
        );
        let driver = AvatarDriver::with_config(config)?;
        Ok(FrameSimulator {
            driver,
            player,
            clock: ManualClock::new(),
            meshes: Vec::new(),
            brows,
            nominal: Duration::from_secs_f32(1.0 / fps),
            jitter,
            rng: StdRng::seed_from_u64(seed),
            frame: 0,
        })
    }

    /// Steady 60 fps with default configuration
    pub fn steady() -> Self {
        FrameSimulator {
            driver: AvatarDriver::new(),
            player: LipSyncPlayer::new(),
            clock: ManualClock::new(),
            meshes: Vec::new(),
            brows: EyebrowPair::default(),
            nominal: Duration::from_secs_f32(1.0 / 60.0),
            jitter: FrameJitter::steady(),
            rng: StdRng::seed_from_u64(0),
            frame: 0,
        }
    }

    pub fn with_mesh(mut self, mesh: MorphMesh) -> Self {
        self.meshes.push(mesh);
        self
    }

    pub fn add_mesh(&mut self, mesh: MorphMesh) {
        self.meshes.push(mesh);
    }

    pub fn mesh(&self, name: &str) -> Option<&MorphMesh> {
        self.meshes.iter().find(|m| m.name() == name)
    }

    pub fn driver(&self) -> &AvatarDriver {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut AvatarDriver {
        &mut self.driver
    }

    pub fn brows(&self) -> &EyebrowPair {
        &self.brows
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Start a playback, audio becoming audible after `lead_in`
    pub fn play(&mut self, track: VisemeTrack, lead_in: Duration) -> PlaybackHandle {
        self.clock.set_ms(-(lead_in.as_secs_f64() * 1000.0));
        self.player.start(track, self.clock.clone(), &mut self.driver)
    }

    pub fn stop(&mut self) -> bool {
        self.player.stop(&mut self.driver)
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    /// One frame: advance audio, poll the player, tick the driver
    pub fn step(&mut self) -> FrameSample {
        let dt = self.jitter.apply(self.frame, self.nominal, &mut self.rng);
        self.clock.advance(dt);

        let outcome = self.player.poll(&mut self.driver);
        let report = self.driver.tick(dt, self.meshes.iter_mut());
        self.driver.apply_brows(&mut self.brows);

        let sample = FrameSample {
            frame: self.frame,
            dt,
            playback_ms: self.clock.now().as_millis_f64(),
            outcome,
            report,
        };
        self.frame += 1;
        sample
    }

    /// Step `frames` times
    pub fn run_frames(&mut self, frames: u32) -> Vec<FrameSample> {
        (0..frames).map(|_| self.step()).collect()
    }

    /// Step until the player has nothing left, at most `max_frames`
    pub fn run_until_idle(&mut self, max_frames: u32) -> Vec<FrameSample> {
        let mut samples = Vec::new();
        for _ in 0..max_frames {
            samples.push(self.step());
            if !self.player.is_playing() {
                break;
            }
        }
        samples
    }

    /// Step for roughly `duration` of simulated time
    pub fn run_for(&mut self, duration: Duration) -> Vec<FrameSample> {
        let mut elapsed = Duration::ZERO;
        let mut samples = Vec::new();
        while elapsed < duration {
            let sample = self.step();
            elapsed += sample.dt;
            samples.push(sample);
        }
        samples
    }
}
