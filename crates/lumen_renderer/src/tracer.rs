//! Iteration driver: owns the path arena and runs the stage sequence.

use crate::accumulate::{accumulate, Accumulator};
use crate::compaction::{partition_active, sort_by_material, MaterialSortScratch};
use crate::error::alloc_buffer;
use crate::intersection::{resolve_intersections, FirstBounceCache};
use crate::raygen::generate_camera_rays;
use crate::shading::shade;
use crate::{Color, FrameState, Intersection, PathState, RenderConfig, RenderError, Stage, MAX_TRACE_DEPTH};
use lumen_core::{Camera, Scene};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Counters from the most recent iteration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IterationStats {
    pub iteration: u32,
    /// Bounce passes run
    pub bounces: u32,
    /// Live path count entering each bounce
    pub active_per_bounce: Vec<usize>,
    /// Depth-0 records were served from the cache
    pub cache_hit: bool,
    /// Non-finite colors replaced during accumulation
    pub sanitized: usize,
}

/// Wavefront path tracer over a fixed scene.
///
/// `new` is init, `render_iteration` runs one full sample per pixel and
/// folds it into the accumulator, `teardown` releases the working buffers.
pub struct PathTracer {
    scene: Scene,
    config: RenderConfig,

    // Working buffers, sized to the pixel count at init
    paths: Vec<PathState>,
    intersections: Vec<Intersection>,
    pixel_scratch: Vec<Color>,
    cache: FirstBounceCache,
    sort_scratch: Option<MaterialSortScratch>,

    accumulator: Accumulator,
    stats: IterationStats,
    camera_moved: bool,
    poisoned: bool,
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run one stage dispatch, turning a panic into a `StageFault`.
fn run_stage<R>(stage: Stage, f: impl FnOnce() -> R) -> Result<R, RenderError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| RenderError::StageFault {
        stage,
        message: panic_message(payload),
    })
}

fn check_trace_depth(camera: &Camera) -> Result<(), RenderError> {
    if camera.trace_depth > MAX_TRACE_DEPTH {
        return Err(RenderError::Config(format!(
            "trace depth {} exceeds the maximum of {}",
            camera.trace_depth, MAX_TRACE_DEPTH
        )));
    }
    Ok(())
}

impl PathTracer {
    /// Validate the scene and config and allocate every working buffer.
    ///
    /// Builds the scene BVH if acceleration is requested and none is
    /// supplied.
    pub fn new(mut scene: Scene, config: RenderConfig) -> Result<Self, RenderError> {
        config.validate()?;
        check_trace_depth(&scene.camera)?;

        if config.use_bvh && scene.bvh.is_none() {
            scene.build_bvh();
        }
        scene.validate()?;

        let camera = &scene.camera;
        let pixel_count = camera.pixel_count();
        let paths = alloc_buffer("path", pixel_count, PathState::default())?;
        let intersections = alloc_buffer("intersection", pixel_count, Intersection::MISS)?;
        let pixel_scratch = alloc_buffer("pixel scratch", pixel_count, Color::ZERO)?;
        let cache = FirstBounceCache::new(pixel_count)?;
        let sort_scratch = if config.sort_by_material {
            Some(MaterialSortScratch::new(pixel_count)?)
        } else {
            None
        };
        let accumulator = Accumulator::new(camera.width(), camera.height())?;

        log::info!(
            "Path tracer ready: {}x{} ({} pixels), {} geoms, {} materials, BVH {}",
            camera.width(),
            camera.height(),
            pixel_count,
            scene.geoms.len(),
            scene.materials.len(),
            if config.use_bvh { "on" } else { "off" }
        );
        if config.cache_first_bounce && config.jitters_camera_rays() {
            log::warn!("First-bounce cache disabled: camera rays are jittered every iteration");
        }

        Ok(Self {
            scene,
            config,
            paths,
            intersections,
            pixel_scratch,
            cache,
            sort_scratch,
            accumulator,
            stats: IterationStats::default(),
            camera_moved: false,
            poisoned: false,
        })
    }

    /// Trace one sample per pixel and add it to the accumulator.
    ///
    /// A stage fault poisons the tracer; every later call fails with
    /// [`RenderError::Poisoned`].
    pub fn render_iteration(&mut self, iteration: u32, frame: FrameState) -> Result<&Accumulator, RenderError> {
        if self.poisoned {
            return Err(RenderError::Poisoned);
        }

        let frame = FrameState {
            scene_changed: frame.scene_changed || self.camera_moved,
        };
        match self.trace(iteration, frame) {
            Ok(stats) => {
                self.camera_moved = false;
                log::debug!(
                    "Iteration {}: {} bounces, active per bounce {:?}",
                    stats.iteration,
                    stats.bounces,
                    stats.active_per_bounce
                );
                self.stats = stats;
                Ok(&self.accumulator)
            }
            Err(err) => {
                self.poisoned = true;
                log::error!("Iteration {} aborted: {}", iteration, err);
                Err(err)
            }
        }
    }

    fn trace(&mut self, iteration: u32, frame: FrameState) -> Result<IterationStats, RenderError> {
        let Self {
            scene,
            config,
            paths,
            intersections,
            pixel_scratch,
            cache,
            sort_scratch,
            accumulator,
            ..
        } = self;
        let camera = &scene.camera;
        let bvh = if config.use_bvh { scene.bvh.as_ref() } else { None };

        run_stage(Stage::Generate, || generate_camera_rays(camera, config, iteration, paths))?;

        let mut stats = IterationStats {
            iteration,
            ..Default::default()
        };
        let mut num_active = paths.len();
        let mut depth = 0;

        while num_active > 0 && depth <= camera.trace_depth {
            stats.active_per_bounce.push(num_active);

            let hit_cache = run_stage(Stage::Intersect, || {
                resolve_intersections(
                    config,
                    frame,
                    depth,
                    &scene.geoms,
                    bvh,
                    &paths[..num_active],
                    &mut intersections[..num_active],
                    cache,
                )
            })?;
            if depth == 0 {
                stats.cache_hit = hit_cache;
            }

            if let Some(scratch) = sort_scratch.as_mut() {
                run_stage(Stage::Sort, || sort_by_material(paths, intersections, num_active, scratch))?;
            }

            run_stage(Stage::Shade, || {
                shade(
                    &mut paths[..num_active],
                    &intersections[..num_active],
                    &scene.materials,
                    iteration,
                    depth,
                )
            })?;

            num_active = run_stage(Stage::Compact, || partition_active(paths, intersections, num_active))?;
            depth += 1;
        }
        stats.bounces = depth;

        if num_active > 0 {
            log::warn!("{} paths still alive at the bounce cap; dropping them", num_active);
            paths[..num_active].iter_mut().for_each(PathState::terminate_black);
        }

        stats.sanitized = run_stage(Stage::Accumulate, || accumulate(paths, pixel_scratch, accumulator))?;
        Ok(stats)
    }

    /// Replace the camera. Resets the accumulated image and the first-bounce
    /// cache; resolution must match the one given at init.
    pub fn set_camera(&mut self, camera: Camera) -> Result<(), RenderError> {
        camera.validate()?;
        check_trace_depth(&camera)?;

        let current = self.scene.camera.resolution;
        if camera.resolution != current {
            return Err(RenderError::CameraResolutionChanged {
                expected: current.to_array(),
                actual: camera.resolution.to_array(),
            });
        }

        self.scene.camera = camera;
        self.cache.invalidate();
        self.accumulator.reset();
        self.camera_moved = true;
        Ok(())
    }

    pub fn stats(&self) -> &IterationStats {
        &self.stats
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Release the working buffers and hand back the image sums.
    pub fn teardown(self) -> Accumulator {
        log::info!("Path tracer finished after {} iterations", self.accumulator.iterations());
        self.accumulator
    }
}
