//! Turns generated sources into a linked host program and resolves its uniforms.

use tracing::{debug, error};

use crate::error::{ProgramError, ShaderStage};
use crate::regs::MAX_TEXTURES;
use crate::shader_gen::{generate_program_sources, GeneratedProgramSources};
use crate::state::{NativePrimitive, ShaderState};
use crate::uniforms::UniformLocations;
use crate::vertex_program::VertexProgramTranslator;

/// Graphics API operations needed to build a program.
///
/// Errors are the driver's info log.
pub trait ShaderBackend {
    type Shader: Copy;
    type Program: Copy;
    type UniformLocation: Clone;

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String>;

    /// Links `shaders` into a new program. On failure the backend has already deleted the
    /// program object; the shaders are still owned by the caller.
    fn link_program(&self, shaders: &[Self::Shader]) -> Result<Self::Program, String>;

    fn validate_program(&self, _program: Self::Program) -> Result<(), String> {
        Ok(())
    }

    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    fn set_sampler_unit(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
        unit: u32,
    );

    fn delete_shader(&self, shader: Self::Shader);

    fn delete_program(&self, program: Self::Program);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramOptions {
    /// Run [`ShaderBackend::validate_program`] after linking.
    ///
    /// Only as strong as the backend's implementation. The `glow::Context` backend keeps the
    /// default, which always succeeds, so there this flag has no effect.
    pub validate: bool,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self { validate: true }
    }
}

/// A linked program ready to draw with.
///
/// Owned by the caller's program cache. Dropping it leaks the host program; hand it back
/// through [`ShaderBinding::release`].
pub struct ShaderBinding<B: ShaderBackend> {
    pub program: B::Program,
    /// Primitive type to issue draws with.
    pub primitive: NativePrimitive,
    pub uniforms: UniformLocations<B::UniformLocation>,
}

impl<B: ShaderBackend> ShaderBinding<B> {
    pub fn release(self, backend: &B) {
        backend.delete_program(self.program);
    }
}

impl<B: ShaderBackend> std::fmt::Debug for ShaderBinding<B>
where
    B::Program: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderBinding")
            .field("program", &self.program)
            .field("primitive", &self.primitive)
            .field("resolved_uniforms", &self.uniforms.resolved_count())
            .finish()
    }
}

/// Compiles, links and introspects one program.
///
/// Every object created along the way is deleted again on failure.
pub fn create_shader_binding<B: ShaderBackend>(
    backend: &B,
    sources: &GeneratedProgramSources,
    fragment_glsl: &str,
    options: &ProgramOptions,
) -> Result<ShaderBinding<B>, ProgramError> {
    let stages = sources
        .geometry
        .as_deref()
        .map(|source| (ShaderStage::Geometry, source))
        .into_iter()
        .chain([
            (ShaderStage::Vertex, sources.vertex.as_str()),
            (ShaderStage::Fragment, fragment_glsl),
        ]);

    let mut shaders = Vec::with_capacity(3);
    for (stage, source) in stages {
        match backend.compile_shader(stage, source) {
            Ok(shader) => {
                debug!(stage = stage.name(), "compiled shader");
                shaders.push(shader);
            }
            Err(log) => {
                error!(stage = stage.name(), %log, %source, "shader compilation failed");
                for shader in shaders {
                    backend.delete_shader(shader);
                }
                return Err(ProgramError::Compile { stage, log });
            }
        }
    }

    let linked = backend.link_program(&shaders);
    for shader in shaders {
        backend.delete_shader(shader);
    }
    let program = linked.map_err(|log| {
        error!(%log, "shader linking failed");
        ProgramError::Link { log }
    })?;

    for unit in 0..MAX_TEXTURES {
        if let Some(location) = backend.uniform_location(program, &format!("texSamp{unit}")) {
            backend.set_sampler_unit(program, &location, unit as u32);
        }
    }

    if options.validate {
        if let Err(log) = backend.validate_program(program) {
            error!(%log, "shader validation failed");
            backend.delete_program(program);
            return Err(ProgramError::Validate { log });
        }
    }

    let uniforms = UniformLocations::lookup(|name| backend.uniform_location(program, name));
    debug!(
        primitive = %sources.primitive,
        geometry_stage = sources.geometry.is_some(),
        resolved_uniforms = uniforms.resolved_count(),
        "linked program"
    );

    Ok(ShaderBinding {
        program,
        primitive: sources.primitive,
        uniforms,
    })
}

/// Generates sources for `state` and builds the program.
pub fn generate_shaders<B: ShaderBackend>(
    backend: &B,
    state: &ShaderState,
    translator: &dyn VertexProgramTranslator,
    fragment_glsl: &str,
    options: &ProgramOptions,
) -> Result<ShaderBinding<B>, ProgramError> {
    let sources = generate_program_sources(state, translator)?;
    create_shader_binding(backend, &sources, fragment_glsl, options)
}
