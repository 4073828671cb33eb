use thiserror::Error;

use crate::state::{PolygonMode, TexGen};
use crate::vertex_program::VertexProgramError;

/// Stage kind handed to the graphics backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Geometry,
    Fragment,
}

impl ShaderStage {
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex shader",
            ShaderStage::Geometry => "geometry shader",
            ShaderStage::Fragment => "fragment shader",
        }
    }
}

/// A [`crate::ShaderState`] the emulated hardware cannot produce.
///
/// These indicate a register-decoding bug upstream. Synthesis stops at the first one and no
/// partial source is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShaderGenError {
    #[error("front ({front:?}) and back ({back:?}) polygon modes differ; two-sided polygon mode is unsupported")]
    AsymmetricPolygonMode {
        front: PolygonMode,
        back: PolygonMode,
    },
    #[error("texgen {mode:?} is not valid for channel {channel} of texture stage {stage}")]
    InvalidTexGenChannel {
        stage: usize,
        channel: char,
        mode: TexGen,
    },
    #[error("vertex program translation failed: {0}")]
    VertexProgram(#[from] VertexProgramError),
}

/// Failure to turn generated sources into a usable program.
///
/// Generated source is deterministic, so none of these are worth retrying with the same state.
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error(transparent)]
    Generate(#[from] ShaderGenError),
    #[error("{} compilation failed: {log}", stage.name())]
    Compile { stage: ShaderStage, log: String },
    #[error("shader linking failed: {log}")]
    Link { log: String },
    #[error("shader validation failed: {log}")]
    Validate { log: String },
}
