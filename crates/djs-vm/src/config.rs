//! Host-tunable VM limits (§6, "Configuration" / SPEC_FULL §7).
//!
//! There is deliberately no config-file format here (see `DESIGN.md`):
//! `djs-cli` is the only embedder, and it builds this struct directly
//! from its own flags/defaults.

use djs_gc::GcConfig;

/// Resource limits a [`crate::Vm`] enforces while running a program.
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Maximum number of operand-stack slots across every frame.
    pub stack_cap: usize,
    /// Maximum live call-frame depth before a `RangeError`-style
    /// stack-overflow status is raised.
    pub call_depth_cap: usize,
    /// Maximum number of live heap slots (distinct from `gc.overhead_threshold`,
    /// which governs *when* a collection runs rather than the hard cap on
    /// how large the object pool may grow).
    pub heap_capacity: usize,
    /// Collection trigger threshold.
    pub gc: GcConfig,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            stack_cap: 64 * 1024,
            call_depth_cap: 1024,
            heap_capacity: 1 << 20,
            gc: GcConfig::default(),
        }
    }
}
