/// Visibility engine: batch frustum culling over a registry.
///
/// One `calculate_culling` call:
/// 1. broadcasts the frustum for the selected kernel's lane width,
/// 2. splits the AABBs into `workers` equal chunks whose size is a multiple
///    of the lane width, and runs the kernel on each chunk in the worker
///    pool (fork/join, the caller blocks until every chunk is done),
/// 3. runs the scalar kernel over the remainder on the calling thread.
///
/// Small batches (below `parallel_threshold`, or too small to give each
/// worker more than one lane group) skip step 2 entirely.
///
/// Results are identical whatever the kernel, worker count or split.

use std::thread;
use rayon::{ThreadPool, ThreadPoolBuilder};
use crate::error::{Error, Result};
use super::capabilities::CpuCapabilities;
use super::frustum::Frustum;
use super::kernel::{kernel_for, CullingKernel, KernelKind, ScalarKernel, VISIBLE};
use super::registry::AabbRegistry;

/// Visibility engine configuration
#[derive(Debug, Clone)]
pub struct VisibilityConfig {
    /// Worker count; `None` uses the hardware concurrency
    pub worker_threads: Option<usize>,
    /// Below this many AABBs everything runs on the calling thread
    pub parallel_threshold: usize,
    /// Force a kernel. Unsupported requests fall back to the widest
    /// supported kernel that is not wider.
    pub preferred_kernel: Option<KernelKind>,
    /// Worker thread name prefix (`<prefix>-<n>`)
    pub thread_name_prefix: String,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            parallel_threshold: 512,
            preferred_kernel: None,
            thread_name_prefix: "galaxy3d-cull".to_string(),
        }
    }
}

/// What one culling pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CullingStats {
    /// Kernel used for the parallel chunks
    pub kernel: KernelKind,
    pub lane_width: usize,
    /// Parallel chunks dispatched (0 when the whole batch ran on the caller)
    pub workers: usize,
    /// AABBs per parallel chunk
    pub chunk: usize,
    /// AABBs handled by the parallel chunks
    pub vectorized: usize,
    /// AABBs handled by the scalar pass on the calling thread
    pub remainder: usize,
    /// Slots marked culled
    pub culled: usize,
    /// Slots tested (live and released)
    pub total: usize,
}

/// Chunk size for a parallel pass, or `None` when the batch should run on
/// the calling thread.
///
/// The chunk is `count / workers` rounded down to a multiple of
/// `lane_width`, and must be strictly larger than one lane group.
pub fn partition_chunk(count: usize, workers: usize, lane_width: usize, threshold: usize) -> Option<usize> {
    if workers == 0 || lane_width == 0 {
        return None;
    }
    let chunk = count / workers / lane_width * lane_width;
    if count < threshold || chunk <= lane_width {
        None
    } else {
        Some(chunk)
    }
}

/// Batch culling engine with a persistent worker pool.
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_visibility::galaxy3d::culling::{
///     Aabb, AabbRegistry, Frustum, VisibilityConfig, VisibilityEngine,
/// };
/// use galaxy_3d_visibility::glam::{Vec3, Vec4};
///
/// let mut registry = AabbRegistry::new();
/// let handle = registry.allocate(Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0)));
///
/// let mut engine = VisibilityEngine::new(VisibilityConfig::default())?;
/// let frustum = Frustum::new([Vec4::new(0.0, 0.0, 1.0, 10.0); 6]);
/// engine.calculate_culling(&mut registry, &frustum);
///
/// let visible = !registry.is_culled(handle);
/// # Ok::<(), galaxy_3d_visibility::galaxy3d::Error>(())
/// ```
pub struct VisibilityEngine {
    config: VisibilityConfig,
    capabilities: CpuCapabilities,
    kernel: &'static dyn CullingKernel,
    pool: ThreadPool,
    worker_count: usize,
    last_stats: Option<CullingStats>,
}

impl VisibilityEngine {
    /// Detect the CPU, pick a kernel and start the worker pool.
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` if the worker pool cannot be built.
    pub fn new(config: VisibilityConfig) -> Result<Self> {
        let capabilities = CpuCapabilities::detect();

        let requested = config
            .preferred_kernel
            .unwrap_or_else(|| KernelKind::select(capabilities));
        let kind = requested.downgrade(capabilities);
        if kind != requested {
            crate::engine_warn!(
                "galaxy3d::VisibilityEngine",
                "{} kernel not supported by this CPU, using {}",
                requested, kind
            );
        }

        let kernel = kernel_for(kind)
            .or_else(|| kernel_for(KernelKind::Scalar))
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("No culling kernel available".to_string())
            ))?;

        let worker_count = config
            .worker_threads
            .unwrap_or_else(|| thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
            .max(1);

        let prefix = config.thread_name_prefix.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(move |i| format!("{}-{}", prefix, i))
            .build()
            .map_err(|e| Self::log_and_return_error(
                Error::InitializationFailed(format!("Culling worker pool: {}", e))
            ))?;

        crate::engine_info!(
            "galaxy3d::VisibilityEngine",
            "Using {} kernel ({} lanes) on {} workers",
            kernel.kind(), kernel.lane_width(), worker_count
        );

        Ok(Self {
            config,
            capabilities,
            kernel,
            pool,
            worker_count,
            last_stats: None,
        })
    }

    /// Engine with `VisibilityConfig::default()`
    pub fn with_defaults() -> Result<Self> {
        Self::new(VisibilityConfig::default())
    }

    fn log_and_return_error(error: Error) -> Error {
        crate::engine_error!("galaxy3d::VisibilityEngine", "{}", error);
        error
    }

    pub fn config(&self) -> &VisibilityConfig {
        &self.config
    }

    pub fn capabilities(&self) -> CpuCapabilities {
        self.capabilities
    }

    /// Kernel used for parallel chunks
    pub fn kernel(&self) -> KernelKind {
        self.kernel.kind()
    }

    pub fn lane_width(&self) -> usize {
        self.kernel.lane_width()
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Statistics of the most recent `calculate_culling` call
    pub fn last_stats(&self) -> Option<CullingStats> {
        self.last_stats
    }

    /// Classify every slot of `registry` against `frustum`.
    ///
    /// Writes `0` (visible) or a nonzero value (culled) into each slot's
    /// result, in place and in index order. Blocks until all chunks and the
    /// remainder are done. Released slots are tested too; their results are
    /// meaningless and overwritten on reuse.
    pub fn calculate_culling(&mut self, registry: &mut AabbRegistry, frustum: &Frustum) -> CullingStats {
        let kernel = self.kernel;
        let lane_width = kernel.lane_width();
        let broadcast = frustum.broadcast(lane_width);

        let (aabbs, results) = registry.culling_buffers();
        let total = aabbs.len();

        let chunk = partition_chunk(total, self.worker_count, lane_width, self.config.parallel_threshold)
            .unwrap_or(0);
        let workers = if chunk > 0 { self.worker_count } else { 0 };
        let vectorized = workers * chunk;

        {
            let (head_aabbs, tail_aabbs) = aabbs.split_at(vectorized);
            let (head_results, tail_results) = results.split_at_mut(vectorized);

            if workers > 0 {
                let broadcast = &broadcast;
                self.pool.scope(move |scope| {
                    for (out, boxes) in head_results.chunks_mut(chunk).zip(head_aabbs.chunks(chunk)) {
                        scope.spawn(move |_| kernel.cull(out, boxes, broadcast));
                    }
                });
            }

            ScalarKernel.cull(tail_results, tail_aabbs, &broadcast);
        }

        let culled = results.iter().filter(|&&r| r != VISIBLE).count();

        let stats = CullingStats {
            kernel: kernel.kind(),
            lane_width,
            workers,
            chunk,
            vectorized,
            remainder: total - vectorized,
            culled,
            total,
        };

        crate::engine_trace!(
            "galaxy3d::VisibilityEngine",
            "Culled {}/{} ({} kernel x{} chunks of {}, {} scalar)",
            culled, total, stats.kernel, workers, chunk, stats.remainder
        );

        self.last_stats = Some(stats);
        stats
    }
}

#[cfg(test)]
#[path = "visibility_tests.rs"]
mod tests;
