//! Animation session: owns the registry and drives it from scheduled tasks
//!
//! Two states, Running and Paused, toggled by a Space key-down. Running keeps
//! a fast motion task and (optionally) a slow resize task scheduled; pausing
//! cancels both, resuming schedules fresh ones with a full period.

use std::time::Duration;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::Result;
use crate::memory::{MemorySample, MemorySampler};
use crate::render::Renderer;
use crate::scheduler::{Scheduler, Task, TaskHandle};
use crate::sim::{BallId, BallRegistry, SizingPolicy, TickReport, handle_click, settle, tick};

/// Whether the periodic tasks are live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Running,
    Paused,
}

/// Keys the session distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Pause/resume
    Space,
    Other,
}

impl Key {
    /// Map a host key code (`"Space"`, `" "`, ...) to a key
    pub fn from_code(code: &str) -> Self {
        match code {
            "Space" | "space" | " " => Key::Space,
            _ => Key::Other,
        }
    }
}

/// Input delivered by the host, in viewport-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Click(Vec2),
    /// `repeat` is set for auto-repeat key-downs while a key is held
    KeyDown { key: Key, repeat: bool },
}

pub struct Session<R: Renderer, M: MemorySampler> {
    config: SimConfig,
    seed: u64,
    rng: Pcg32,
    registry: BallRegistry,
    sizing: SizingPolicy,
    sampler: M,
    renderer: R,
    scheduler: Scheduler,
    motion_task: Option<TaskHandle>,
    resize_task: Option<TaskHandle>,
    state: RunState,
    ticks: u64,
}

impl<R: Renderer, M: MemorySampler> Session<R, M> {
    /// Validate the config, populate the registry, draw the first frame and
    /// start running.
    pub fn new(config: SimConfig, mut sampler: M, mut renderer: R) -> Result<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut sizing = SizingPolicy::new(config.max_radius, config.fallback_radius);
        let registry = BallRegistry::spawn(&config, &mut sizing, &mut sampler, &mut rng)?;
        renderer.render_frame(registry.as_slice());

        log::info!(
            "Session started: {} balls, {}x{}, seed {}",
            registry.len(),
            config.viewport.width,
            config.viewport.height,
            seed
        );

        let mut session = Self {
            config,
            seed,
            rng,
            registry,
            sizing,
            sampler,
            renderer,
            scheduler: Scheduler::new(),
            motion_task: None,
            resize_task: None,
            state: RunState::Paused,
            ticks: 0,
        };
        session.resume();
        Ok(session)
    }

    /// Feed one host input event
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Click(point) => {
                self.click(point);
            }
            InputEvent::KeyDown {
                key: Key::Space,
                repeat: false,
            } => {
                self.toggle_pause();
            }
            InputEvent::KeyDown { .. } => {}
        }
    }

    /// Recolor the ball under `point`; works while paused too
    pub fn click(&mut self, point: Vec2) -> Option<BallId> {
        let hit = handle_click(&mut self.registry, point, &mut self.rng);
        if hit.is_some() {
            self.renderer.render_frame(self.registry.as_slice());
        }
        hit
    }

    pub fn toggle_pause(&mut self) -> RunState {
        match self.state {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(),
        }
        self.state
    }

    /// Cancel both periodic tasks; no-op if already paused
    pub fn pause(&mut self) {
        if self.state == RunState::Paused {
            return;
        }
        for handle in [self.motion_task.take(), self.resize_task.take()]
            .into_iter()
            .flatten()
        {
            self.scheduler.cancel(handle);
        }
        self.state = RunState::Paused;
        log::info!("Paused after {} ticks", self.ticks);
    }

    /// Schedule fresh periodic tasks; no-op if already running
    pub fn resume(&mut self) {
        if self.state == RunState::Running {
            return;
        }
        self.motion_task = Some(
            self.scheduler
                .schedule_periodic(Task::Motion, self.config.refresh_interval()),
        );
        self.resize_task = self
            .config
            .memory_update_interval()
            .map(|period| self.scheduler.schedule_periodic(Task::Resize, period));
        self.state = RunState::Running;
        log::info!("Running");
    }

    /// Let `elapsed` host time pass, running every task that falls due.
    /// Returns the number of tasks run.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let due = self.scheduler.advance(elapsed);
        for task in &due {
            match task {
                Task::Motion => {
                    self.step();
                }
                Task::Resize => self.refresh_radii(),
            }
        }
        due.len()
    }

    /// One fast tick: physics, then render
    pub fn step(&mut self) -> TickReport {
        let report = tick(
            &mut self.registry,
            self.config.viewport,
            self.config.collision_radius,
        );
        self.ticks += 1;
        self.renderer.render_frame(self.registry.as_slice());
        report
    }

    /// One slow tick: resize every ball from a fresh memory reading, settle the
    /// grown balls apart, then render
    pub fn refresh_radii(&mut self) {
        let radius = self.sizing.radius_from(&mut self.sampler);
        self.registry.set_radius_all(radius, self.config.viewport);
        let outcome = settle(
            self.registry.as_mut_slice(),
            self.config.viewport,
            self.config.collision_radius,
        );
        if !outcome.is_settled() {
            log::warn!("Balls still touching after resize to radius {radius}");
        }
        if let Some(sample) = self.sizing.last_sample() {
            log::info!(
                "Memory usage {:.2} MiB, radius {}",
                sample.used_mib(),
                radius
            );
        }
        self.renderer.render_frame(self.registry.as_slice());
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn registry(&self) -> &BallRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Seed actually used (the config's, or the one picked at startup)
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fast ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Virtual time fed in through `advance`
    pub fn elapsed(&self) -> Duration {
        self.scheduler.now()
    }

    /// Most recent memory reading, for hosts that display it
    pub fn last_memory_sample(&self) -> Option<MemorySample> {
        self.sizing.last_sample()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
