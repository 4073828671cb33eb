//! Boundary to the vertex program (`xvs`) bytecode translator.
//!
//! Decoding NV2A vertex program microcode is a separate job; the assembler only needs the two
//! text fragments a translator produces and splices them where the fixed-function code would go.

use crate::state::VshVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexProgramError {
    pub message: String,
}

impl VertexProgramError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for VertexProgramError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for VertexProgramError {}

/// Translated program text.
///
/// `header` is spliced after the attribute inputs, `body` at the top of `main()` after the
/// attribute decompression. The body must write `oPos` and `vtx.inv_w`; `oFog.x` carries the
/// fog distance when fog is enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexProgramFragments {
    pub header: String,
    pub body: String,
}

pub trait VertexProgramTranslator {
    fn translate(
        &self,
        version: VshVersion,
        tokens: &[u32],
        z_perspective: bool,
    ) -> Result<VertexProgramFragments, VertexProgramError>;
}

impl<T: VertexProgramTranslator + ?Sized> VertexProgramTranslator for &T {
    fn translate(
        &self,
        version: VshVersion,
        tokens: &[u32],
        z_perspective: bool,
    ) -> Result<VertexProgramFragments, VertexProgramError> {
        (**self).translate(version, tokens, z_perspective)
    }
}

/// Translator for callers that only ever run the fixed-function pipeline.
///
/// Any attempt to translate a program is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVertexPrograms;

impl VertexProgramTranslator for NoVertexPrograms {
    fn translate(
        &self,
        version: VshVersion,
        tokens: &[u32],
        _z_perspective: bool,
    ) -> Result<VertexProgramFragments, VertexProgramError> {
        Err(VertexProgramError::new(format!(
            "no vertex program translator installed ({version:?}, {} tokens)",
            tokens.len()
        )))
    }
}
