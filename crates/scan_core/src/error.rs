use thiserror::Error;

/// Errors surfaced by the core. Steady-state conditions (ring overwrite,
/// empty batches, pick misses, frame overruns) are never reported here.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("point buffer capacity must be greater than zero")]
    ZeroCapacity,

    #[error("invalid color mode {0} (expected 0 = intensity, 1 = depth, 2 = normal)")]
    InvalidColorMode(u32),

    #[error("failed to spawn generation worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
