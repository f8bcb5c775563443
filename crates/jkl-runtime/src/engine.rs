//! Single-threaded frame loop

use log::{debug, info, trace};

use crate::collaborators::Collaborators;
use crate::config::EngineConfig;
use crate::context::{FrameContext, InitContext};
use crate::error::Result;
use crate::input::InputDirection;
use crate::scene::Scene;

/// Counts frames and reports the rate once per interval
#[derive(Debug, Clone)]
pub struct FpsCounter {
    interval: f64,
    window_start: f64,
    frames: u32,
}

impl FpsCounter {
    pub fn new(interval: f64, start: f64) -> Self {
        Self {
            interval,
            window_start: start,
            frames: 0,
        }
    }

    /// Count one frame finished at `now`
    ///
    /// Returns frames per second when an interval has elapsed.
    pub fn tick(&mut self, now: f64) -> Option<f64> {
        self.frames += 1;
        let elapsed = now - self.window_start;
        if elapsed < self.interval {
            return None;
        }

        let rate = f64::from(self.frames) / elapsed;
        self.frames = 0;
        self.window_start = now;
        Some(rate)
    }
}

/// What a finished run did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    /// Platform seconds between the first and last frame start
    pub elapsed: f64,
}

/// Owns the configuration and drives a [`Scene`]
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Initialise the scene, then run frames until the platform asks to close
    ///
    /// Each frame reads input, clears, hands control to the scene and
    /// presents. An error from the scene ends the run.
    pub fn run(&self, scene: &mut dyn Scene, collaborators: Collaborators<'_>) -> Result<RunSummary> {
        let Collaborators {
            platform,
            uniforms,
            geometry,
            textures,
            renderer,
        } = collaborators;

        debug!(
            "Starting \"{}\" at {}x{}",
            self.config.window_title, self.config.window_width, self.config.window_height
        );
        scene.init(&mut InitContext {
            config: &self.config,
            geometry: &mut *geometry,
            textures,
            uniforms: &mut *uniforms,
        })?;

        let start = platform.elapsed_seconds();
        let mut last = start;
        let mut fps = FpsCounter::new(self.config.fps_log_interval, start);
        let mut frame = 0u64;

        while !platform.should_close() {
            let now = platform.elapsed_seconds();
            let mut dt = (now - last).max(0.0) as f32;
            last = now;
            if let Some(max) = self.config.max_frame_delta {
                dt = dt.min(max);
            }

            let keys = platform.poll_input();
            let direction = InputDirection::from_keys(keys);
            trace!("Frame {frame}: dt {dt:.4}s, direction {direction:?}");

            renderer.clear(self.config.clear_color);
            scene.frame(
                &mut FrameContext {
                    config: &self.config,
                    frame,
                    elapsed: now,
                    keys,
                    direction,
                    uniforms: &mut *uniforms,
                    renderer: &mut *renderer,
                    geometry: &mut *geometry,
                },
                dt,
            )?;
            platform.present();
            frame += 1;

            if let Some(rate) = fps.tick(now) {
                info!("FPS: {rate:.1}");
            }
        }

        let summary = RunSummary {
            frames: frame,
            elapsed: last - start,
        };
        debug!("Frame loop finished after {} frames", summary.frames);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_counter_reports_once_per_interval() {
        let mut fps = FpsCounter::new(1.0, 0.0);
        let mut reports = Vec::new();
        for frame in 1..=120 {
            if let Some(rate) = fps.tick(f64::from(frame) / 60.0) {
                reports.push(rate);
            }
        }

        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|rate| (rate - 60.0).abs() < 0.5));
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let config = EngineConfig::default().with_window_size(0, 0);
        assert!(Engine::new(config).is_err());
    }
}
