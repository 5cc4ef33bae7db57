//! ds-compute: force-kernel providers for the n-body style systems.
//!
//! The process owns one active [`ComputeBackend`] at a time, selected at
//! first use: the wgpu backend when the `gpu` feature is compiled in and an
//! adapter answers, the CPU worker pool otherwise. Callers reach it through
//! [`backend`] and may swap it with [`set_backend`].

use std::sync::{Arc, OnceLock, RwLock};
use thiserror::Error;

mod cpu;
#[cfg(feature = "gpu")]
pub mod gpu;

pub use cpu::CpuBackend;
#[cfg(feature = "gpu")]
pub use gpu::WgpuBackend;

#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("no suitable gpu adapter")]
    NoAdapter,
    #[error("device request failed: {0}")]
    Device(String),
    #[error("buffer readback failed")]
    Readback,
}

pub type ComputeResult<T> = Result<T, ComputeError>;

/// A provider of the hot force kernels.
///
/// `nbody_forces` takes interleaved `[x0, y0, x1, y1, ...]` positions and
/// returns per-body acceleration components. Implementations must be safe
/// to call from concurrent ensemble trials.
pub trait ComputeBackend: Send + Sync {
    fn name(&self) -> &str;
    fn available(&self) -> bool;

    /// Softened all-pairs gravitational accelerations.
    fn nbody_forces(
        &self,
        positions: &[f64],
        masses: &[f64],
        g: f64,
        softening: f64,
    ) -> (Vec<f64>, Vec<f64>);

    /// Dense matrix-vector product, rows truncated to the shorter length.
    fn matvec(&self, mat: &[Vec<f64>], vec: &[f64]) -> Vec<f64>;

    /// Release device resources before the backend is replaced.
    fn cleanup(&self) {}
}

static ACTIVE: OnceLock<RwLock<Arc<dyn ComputeBackend>>> = OnceLock::new();

fn slot() -> &'static RwLock<Arc<dyn ComputeBackend>> {
    ACTIVE.get_or_init(|| RwLock::new(auto_select()))
}

fn auto_select() -> Arc<dyn ComputeBackend> {
    #[cfg(feature = "gpu")]
    {
        match WgpuBackend::new() {
            Ok(b) => {
                tracing::info!(backend = b.name(), "selected compute backend");
                return Arc::new(b);
            }
            Err(e) => tracing::debug!("gpu backend unavailable: {e}"),
        }
    }
    let b = CpuBackend::new();
    tracing::info!(backend = b.name(), "selected compute backend");
    Arc::new(b)
}

/// The process-wide active backend.
pub fn backend() -> Arc<dyn ComputeBackend> {
    slot()
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// Replace the active backend, cleaning up the old one.
pub fn set_backend(b: Arc<dyn ComputeBackend>) {
    let mut guard = slot().write().unwrap_or_else(|e| e.into_inner());
    guard.cleanup();
    *guard = b;
}
