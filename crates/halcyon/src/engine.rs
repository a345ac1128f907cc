//! # Engine
//!
//! Owns the [`EngineContext`] and the system [`Scheduler`] and drives them
//! one frame per [`Engine::tick`].

use std::time::{Duration, Instant};

use halcyon_core::{Phase, Scheduler, Signature, System};
use halcyon_rendering::GraphicsBackend;
use tracing::{error, info, warn};

use crate::config::EngineConfig;
use crate::context::EngineContext;
use crate::error::EngineResult;
use crate::game_loop::{FrameStats, FrameStatsAccumulator, MAX_FRAME_TIME};
use crate::systems::register_builtin_systems;

/// A running engine instance.
///
/// # Example
///
/// ```rust,ignore
/// let mut engine = Engine::new(EngineConfig::load("halcyon.toml")?)?;
/// let mut backend = RecordingBackend::new();
/// loop {
///     let stats = engine.tick(1.0 / 60.0, &mut backend);
/// }
/// ```
pub struct Engine {
    ctx: EngineContext,
    scheduler: Scheduler<EngineContext>,
    /// Unsimulated time, in seconds.
    accumulator: f32,
    frame: u64,
    stats: FrameStatsAccumulator,
}

impl Engine {
    /// Builds an engine with the built-in component types and systems.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        let budget = Duration::from_secs_f32(config.frame_budget());
        let mut ctx = EngineContext::new(config)?;
        let mut scheduler = Scheduler::new();
        register_builtin_systems(&mut scheduler, &mut ctx)?;
        info!(
            max_entities = ctx.config.max_entities,
            cell_size = ctx.spatial.cell_size(),
            "engine started"
        );
        Ok(Self {
            ctx,
            scheduler,
            accumulator: 0.0,
            frame: 0,
            stats: FrameStatsAccumulator::new(budget),
        })
    }

    /// Engine state.
    #[inline]
    #[must_use]
    pub const fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Engine state, for edits.
    #[inline]
    pub fn context_mut(&mut self) -> &mut EngineContext {
        &mut self.ctx
    }

    /// The system scheduler.
    #[inline]
    #[must_use]
    pub const fn scheduler(&self) -> &Scheduler<EngineContext> {
        &self.scheduler
    }

    /// Registers a game system after the built-in ones.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is taken.
    pub fn register_system<S>(
        &mut self,
        name: impl Into<String>,
        signature: Signature,
        system: S,
    ) -> EngineResult<()>
    where
        S: System<EngineContext> + 'static,
    {
        self.scheduler
            .register_system(&mut self.ctx, name, signature, system)?;
        Ok(())
    }

    /// Applies pending signature changes to system membership.
    ///
    /// [`Engine::tick`] does this on its own; call it to observe membership
    /// between frames.
    pub fn sync(&mut self) {
        self.scheduler.sync(&mut self.ctx);
    }

    /// Runs one frame of `elapsed` seconds and draws it to `backend`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn tick<B>(&mut self, elapsed: f32, backend: &mut B) -> FrameStats
    where
        B: GraphicsBackend + ?Sized,
    {
        let frame_start = Instant::now();
        let elapsed = elapsed.max(0.0);
        let mut stats = FrameStats {
            frame: self.frame,
            ..FrameStats::default()
        };
        self.ctx.advance_time(elapsed);

        // 1. Fixed update
        let step = self.ctx.config.fixed_delta();
        let max_steps = self.ctx.config.max_fixed_steps_per_frame;
        self.accumulator += elapsed;
        while self.accumulator >= step && stats.fixed_steps < max_steps {
            self.scheduler
                .run_phase(&mut self.ctx, Phase::FixedUpdate, step);
            self.accumulator -= step;
            stats.fixed_steps += 1;
        }
        if self.accumulator >= step {
            warn!(
                frame = self.frame,
                behind_s = self.accumulator,
                "fixed update fell behind, dropping time"
            );
            self.accumulator %= step;
        }
        let fixed_done = Instant::now();

        // 2. Update
        self.scheduler.run_phase(&mut self.ctx, Phase::Update, elapsed);
        let update_done = Instant::now();

        // 3-4. Render and flush
        self.ctx.update_camera_follow();
        self.scheduler.run_phase(&mut self.ctx, Phase::Render, elapsed);
        let background = self.ctx.config.background_color;
        let render = self.ctx.batcher.flush_and_render(backend, background);
        stats.draw_calls = render.draw_calls;
        let render_done = Instant::now();

        // 5-6. Deferred deletion, scene change, then creation
        stats.deleted = self.ctx.process_queued_deletions() as u32;
        self.scheduler.sync(&mut self.ctx);
        match self.ctx.process_queued_scene_change() {
            Ok(deleted) => stats.deleted += deleted as u32,
            Err(err) => error!(frame = self.frame, error = %err, "scene change failed"),
        }
        self.scheduler.sync(&mut self.ctx);
        stats.created = self.ctx.process_queued_creations() as u32;
        self.scheduler.sync(&mut self.ctx);

        stats.fixed_us = fixed_done.duration_since(frame_start).as_micros() as u64;
        stats.update_us = update_done.duration_since(fixed_done).as_micros() as u64;
        stats.render_us = render_done.duration_since(update_done).as_micros() as u64;
        stats.total_us = frame_start.elapsed().as_micros() as u64;

        self.stats.record(stats);
        if stats.total_us > MAX_FRAME_TIME.as_micros() as u64 {
            warn!(
                frame = self.frame,
                total_ms = stats.total_us as f64 / 1000.0,
                "frame exceeded budget"
            );
        }
        self.frame += 1;
        stats
    }

    /// Frames run so far.
    #[inline]
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Accumulated frame statistics.
    #[must_use]
    pub const fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats
    }

    /// Logs a summary and consumes the engine.
    pub fn shutdown(self) {
        info!(
            frames = self.stats.frames_recorded,
            avg_ms = self.stats.avg_frame_ms(),
            over_budget = self.stats.frames_over_budget,
            "engine stopped"
        );
    }
}

#[cfg(test)]
mod tests {
    use halcyon_rendering::RecordingBackend;

    use super::*;
    use crate::systems;

    #[test]
    fn test_builtin_systems_in_order() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let names: Vec<_> = engine.scheduler().system_names().collect();
        assert_eq!(
            names,
            vec![
                systems::COLLISION,
                systems::SPRITE_RENDERING,
                systems::ANIMATED_SPRITE_RENDERING,
                systems::COLOR_RECT_RENDERING,
                systems::PARALLAX,
                systems::SCRIPT,
            ]
        );
    }

    #[test]
    fn test_fixed_steps_clamped() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let mut backend = RecordingBackend::new();

        assert_eq!(engine.tick(1.0 / 60.0, &mut backend).fixed_steps, 1);
        assert_eq!(engine.tick(1.0, &mut backend).fixed_steps, 5);
        assert_eq!(engine.tick(0.0, &mut backend).fixed_steps, 0);
        assert_eq!(engine.frame_count(), 3);
        assert_eq!(backend.clears.len(), 3);
    }

    #[test]
    fn test_scene_change_applied_at_end_of_frame() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let mut backend = RecordingBackend::new();
        let old_root = engine.context_mut().spawn(None).unwrap();
        engine
            .context_mut()
            .queue_scene_change("next", |ctx| ctx.spawn(None).map(|_| ()));

        let stats = engine.tick(1.0 / 60.0, &mut backend);
        assert_eq!(stats.deleted, 1);
        assert!(!engine.context().world.is_alive(old_root));
        assert_eq!(engine.context().world.alive_count(), 1);
    }

    #[test]
    fn test_duplicate_system_rejected() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let sig = Signature::default();
        assert!(engine
            .register_system(systems::COLLISION, sig, systems::ParallaxSystem)
            .is_err());
    }
}
