// THEORY:
// Every failure the engine can hit lives in one enum. The public pipeline calls
// never hand these back for Pipeline A: they are logged and folded into an empty
// (or partially filled) report, so "no glare" is the worst thing a caller sees.
// Internally every stage returns `Result<_, GlareError>` so the short-circuiting
// is plain `?`.

use std::fmt;
use thiserror::Error;

/// The filter stages of the spot pipeline whose output is kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Decode,
    Grayscale,
    Blur,
    Clamp,
    Contours,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Decode => "decode",
            Stage::Grayscale => "grayscale",
            Stage::Blur => "blur",
            Stage::Clamp => "clamp",
            Stage::Contours => "contours",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum GlareError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("Stage `{stage}` produced no output: {reason}")]
    StageUnavailable { stage: Stage, reason: String },
    #[error("Contour analysis failed: {0}")]
    Analysis(String),
    #[error("Kernel `{kernel}` could not be applied: {reason}")]
    Kernel { kernel: &'static str, reason: String },
    #[error("Mask sizes differ: {left:?} vs {right:?}")]
    DimensionMismatch { left: (u32, u32), right: (u32, u32) },
    #[error("Analysis task failed to complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl GlareError {
    /// The spot-pipeline stage this error belongs to, when there is one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            GlareError::Decode(_) | GlareError::EmptyImage { .. } => Some(Stage::Decode),
            GlareError::StageUnavailable { stage, .. } => Some(*stage),
            GlareError::Analysis(_) => Some(Stage::Contours),
            _ => None,
        }
    }

    pub(crate) fn stage_unavailable(stage: Stage, reason: impl Into<String>) -> Self {
        GlareError::StageUnavailable {
            stage,
            reason: reason.into(),
        }
    }

    pub(crate) fn kernel(kernel: &'static str, reason: impl Into<String>) -> Self {
        GlareError::Kernel {
            kernel,
            reason: reason.into(),
        }
    }
}
