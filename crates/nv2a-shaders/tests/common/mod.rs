#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;

use nv2a_shaders::state::{PolygonMode, PrimitiveMode, VshVersion};
use nv2a_shaders::{
    ShaderBackend, ShaderStage, VertexProgramError, VertexProgramFragments,
    VertexProgramTranslator,
};

/// Everything the backend was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Compile(ShaderStage),
    Link(Vec<u32>),
    Validate(u32),
    SetSampler { location: u32, unit: u32 },
    DeleteShader(u32),
    DeleteProgram(u32),
}

/// In-memory [`ShaderBackend`] with scriptable failures.
///
/// Shader handles count up from 1, program handles from 100. Uniform locations are assigned
/// in lookup order to every name in `exposed_uniforms`.
#[derive(Default)]
pub struct RecordingBackend {
    pub fail_compile: Option<(ShaderStage, String)>,
    pub fail_link: Option<String>,
    pub fail_validate: Option<String>,
    pub exposed_uniforms: HashSet<String>,
    pub calls: RefCell<Vec<Call>>,
    pub sources: RefCell<Vec<(ShaderStage, String)>>,
    next_shader: RefCell<u32>,
    next_location: RefCell<u32>,
}

impl RecordingBackend {
    pub fn exposing<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            exposed_uniforms: names.into_iter().map(str::to_owned).collect(),
            ..Self::default()
        }
    }

    pub fn failing_compile(stage: ShaderStage, log: &str) -> Self {
        Self {
            fail_compile: Some((stage, log.to_owned())),
            ..Self::default()
        }
    }

    pub fn failing_link(log: &str) -> Self {
        Self {
            fail_link: Some(log.to_owned()),
            ..Self::default()
        }
    }

    pub fn failing_validate(log: &str) -> Self {
        Self {
            fail_validate: Some(log.to_owned()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn compiled_stages(&self) -> Vec<ShaderStage> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Compile(stage) => Some(stage),
                _ => None,
            })
            .collect()
    }

    pub fn deleted_shaders(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::DeleteShader(shader) => Some(shader),
                _ => None,
            })
            .collect()
    }

    pub fn deleted_programs(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::DeleteProgram(program) => Some(program),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl ShaderBackend for RecordingBackend {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = u32;

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<u32, String> {
        self.record(Call::Compile(stage));
        self.sources.borrow_mut().push((stage, source.to_owned()));
        if let Some((failing, log)) = &self.fail_compile {
            if *failing == stage {
                return Err(log.clone());
            }
        }
        let mut next = self.next_shader.borrow_mut();
        *next += 1;
        Ok(*next)
    }

    fn link_program(&self, shaders: &[u32]) -> Result<u32, String> {
        self.record(Call::Link(shaders.to_vec()));
        match &self.fail_link {
            Some(log) => Err(log.clone()),
            None => Ok(100),
        }
    }

    fn validate_program(&self, program: u32) -> Result<(), String> {
        self.record(Call::Validate(program));
        match &self.fail_validate {
            Some(log) => Err(log.clone()),
            None => Ok(()),
        }
    }

    fn uniform_location(&self, _program: u32, name: &str) -> Option<u32> {
        if !self.exposed_uniforms.contains(name) {
            return None;
        }
        let mut next = self.next_location.borrow_mut();
        let location = *next;
        *next += 1;
        Some(location)
    }

    fn set_sampler_unit(&self, _program: u32, location: &u32, unit: u32) {
        self.record(Call::SetSampler {
            location: *location,
            unit,
        });
    }

    fn delete_shader(&self, shader: u32) {
        self.record(Call::DeleteShader(shader));
    }

    fn delete_program(&self, program: u32) {
        self.record(Call::DeleteProgram(program));
    }
}

/// Translator that emits a fixed body and records the last request.
#[derive(Default)]
pub struct StubTranslator {
    pub fail: Option<String>,
    pub last_request: RefCell<Option<(VshVersion, Vec<u32>, bool)>>,
}

impl VertexProgramTranslator for StubTranslator {
    fn translate(
        &self,
        version: VshVersion,
        tokens: &[u32],
        z_perspective: bool,
    ) -> Result<VertexProgramFragments, VertexProgramError> {
        *self.last_request.borrow_mut() = Some((version, tokens.to_vec(), z_perspective));
        if let Some(message) = &self.fail {
            return Err(VertexProgramError::new(message.clone()));
        }
        Ok(VertexProgramFragments {
            header: "uniform vec4 vpScratch;\n".to_owned(),
            body: "oPos = v0;\noFog = v0.zzzz;\nvtx.inv_w = 1.0 / oPos.w;\n".to_owned(),
        })
    }
}

pub const FRAGMENT_GLSL: &str = "#version 330\nout vec4 fragColor;\nvoid main() { fragColor = vec4(1.0); }\n";

pub fn polygon(mode: PolygonMode, primitive: PrimitiveMode) -> nv2a_shaders::ShaderState {
    nv2a_shaders::ShaderState {
        polygon_front_mode: mode,
        polygon_back_mode: mode,
        primitive_mode: primitive,
        ..Default::default()
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}
