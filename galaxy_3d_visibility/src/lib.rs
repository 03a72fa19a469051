/*!
# Galaxy 3D Visibility

Batch frustum culling for the Galaxy 3D engine.

Bounding boxes live in an `AabbRegistry` as one dense array, addressed by
generation-tagged handles. Each frame a `VisibilityEngine` tests every box
against the six camera planes and writes one result per slot, using the
widest SIMD kernel the CPU supports and splitting large batches across a
persistent worker pool.

## Architecture

- **AabbRegistry**: slot storage for boxes and culling results
- **Frustum**: camera planes (`ax + by + cz + d`, positive inside)
- **CullingKernel**: scalar / SSE2 / AVX batch tests, chosen at runtime
- **VisibilityEngine**: fork/join culling pass over a registry
- **CullingEntry**: RAII slot over a shared registry
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod culling;
pub(crate) mod utils;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging hub
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Culling sub-module
    pub mod culling {
        pub use crate::culling::*;
    }
}

// Re-export math library at crate root
pub use glam;
