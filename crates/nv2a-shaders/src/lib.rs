//! `nv2a-shaders` synthesizes GLSL programs that emulate the NV2A (Xbox GPU) fixed-function
//! vertex pipeline on desktop OpenGL.
//!
//! Given a [`ShaderState`] snapshot of the relevant hardware registers, this crate provides:
//! - A vertex stage reproducing skinning, texgen, lighting, fog and point size, or wrapping a
//!   translated vertex program (see [`shader_gen`]).
//! - An optional geometry stage emulating primitive types OpenGL core profile lacks (quads,
//!   quad strips, line-mode triangles; see [`state::expand_topology`]).
//! - Program linkage and uniform lookup behind the [`ShaderBackend`] trait, with an
//!   implementation for `glow::Context` (feature `glow`).

mod source;

pub mod error;
pub mod fixed_function;
pub mod ir;
pub mod program;
pub mod regs;
pub mod shader_gen;
pub mod state;
pub mod uniforms;
pub mod vertex_program;

#[cfg(feature = "glow")]
mod glow_backend;

pub use error::{ProgramError, ShaderGenError, ShaderStage};
pub use program::{
    create_shader_binding, generate_shaders, ProgramOptions, ShaderBackend, ShaderBinding,
};
pub use shader_gen::{generate_program_sources, generate_vertex_shader, GeneratedProgramSources};
pub use source::SourceBuilder;
pub use state::{NativePrimitive, ShaderState};
pub use uniforms::UniformLocations;
pub use vertex_program::{
    NoVertexPrograms, VertexProgramError, VertexProgramFragments, VertexProgramTranslator,
};
