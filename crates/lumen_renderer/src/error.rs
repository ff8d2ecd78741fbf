//! Render errors.

use lumen_core::SceneError;
use std::fmt;
use thiserror::Error;

/// Pipeline stage, used to tag faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generate,
    Intersect,
    Sort,
    Shade,
    Compact,
    Accumulate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Generate => "generate",
            Stage::Intersect => "intersect",
            Stage::Sort => "sort",
            Stage::Shade => "shade",
            Stage::Compact => "compact",
            Stage::Accumulate => "accumulate",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid scene: {0}")]
    Scene(#[from] SceneError),

    #[error("Invalid render config: {0}")]
    Config(String),

    #[error("Failed to allocate {buffer} buffer of {len} elements")]
    Allocation { buffer: &'static str, len: usize },

    #[error("Stage '{stage}' faulted: {message}")]
    StageFault { stage: Stage, message: String },

    #[error("Tracer is poisoned by an earlier stage fault")]
    Poisoned,

    #[error("Camera resolution cannot change after init (was {}x{}, got {}x{})", .expected[0], .expected[1], .actual[0], .actual[1])]
    CameraResolutionChanged { expected: [u32; 2], actual: [u32; 2] },
}

/// Allocate a filled buffer, reporting failure instead of aborting.
pub(crate) fn alloc_buffer<T: Clone>(buffer: &'static str, len: usize, fill: T) -> Result<Vec<T>, RenderError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| RenderError::Allocation { buffer, len })?;
    v.resize(len, fill);
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_stage() {
        let err = RenderError::StageFault {
            stage: Stage::Shade,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "Stage 'shade' faulted: boom");

        let err: RenderError = SceneError::NoMaterials.into();
        assert!(matches!(err, RenderError::Scene(SceneError::NoMaterials)));
    }

    #[test]
    fn test_alloc_buffer() {
        let v = alloc_buffer("test", 16, 3u8).unwrap();
        assert_eq!(v, vec![3u8; 16]);

        let err = alloc_buffer("huge", usize::MAX / 2, 0u64).unwrap_err();
        assert!(matches!(err, RenderError::Allocation { buffer: "huge", .. }));
    }
}
