//! [`ShaderBackend`] on top of a current `glow` OpenGL context.

use glow::HasContext;

use crate::error::ShaderStage;
use crate::program::ShaderBackend;

fn gl_shader_type(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Geometry => glow::GEOMETRY_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

/// All methods require the context to be current on the calling thread. `HasContext` methods
/// that share a name with [`ShaderBackend`] are called through the trait path.
impl ShaderBackend for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type UniformLocation = glow::UniformLocation;

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String> {
        unsafe {
            let shader = self.create_shader(gl_shader_type(stage))?;
            self.shader_source(shader, source);
            HasContext::compile_shader(self, shader);
            if self.get_shader_compile_status(shader) {
                Ok(shader)
            } else {
                let log = self.get_shader_info_log(shader);
                HasContext::delete_shader(self, shader);
                Err(log)
            }
        }
    }

    fn link_program(&self, shaders: &[Self::Shader]) -> Result<Self::Program, String> {
        unsafe {
            let program = self.create_program()?;
            for &shader in shaders {
                self.attach_shader(program, shader);
            }
            HasContext::link_program(self, program);
            for &shader in shaders {
                self.detach_shader(program, shader);
            }
            if self.get_program_link_status(program) {
                Ok(program)
            } else {
                let log = self.get_program_info_log(program);
                HasContext::delete_program(self, program);
                Err(log)
            }
        }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn set_sampler_unit(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
        unit: u32,
    ) {
        unsafe {
            self.use_program(Some(program));
            self.uniform_1_i32(Some(location), unit as i32);
        }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }
}
