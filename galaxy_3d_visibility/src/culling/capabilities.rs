//! Runtime SIMD capability detection.
//!
//! Detection runs once per process; every later query reads the cached
//! value.

use std::sync::OnceLock;
use bitflags::bitflags;

bitflags! {
    /// SIMD instruction sets the culling kernels can use
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CpuCapabilities: u32 {
        /// 128-bit SSE2 (4 f32 lanes)
        const SSE2 = 1 << 0;
        /// 256-bit AVX (8 f32 lanes)
        const AVX  = 1 << 1;
    }
}

static DETECTED: OnceLock<CpuCapabilities> = OnceLock::new();

impl CpuCapabilities {
    /// Capabilities of the running CPU (cached after the first call)
    pub fn detect() -> Self {
        *DETECTED.get_or_init(Self::probe)
    }

    /// Whether 256-bit AVX kernels may run
    pub fn has_avx(self) -> bool {
        self.contains(Self::AVX)
    }

    /// Whether 128-bit SSE2 kernels may run
    pub fn has_sse2(self) -> bool {
        self.contains(Self::SSE2)
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn probe() -> Self {
        let mut caps = Self::empty();
        if is_x86_feature_detected!("sse2") {
            caps |= Self::SSE2;
        }
        if is_x86_feature_detected!("avx") {
            caps |= Self::AVX;
        }
        caps
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn probe() -> Self {
        Self::empty()
    }
}
