//! Assembles complete GLSL sources for one [`ShaderState`].

use tracing::{debug, trace};

use crate::error::ShaderGenError;
use crate::fixed_function::{self, fog};
use crate::ir::{Block, GlslType};
use crate::regs::{self, xfctx};
use crate::source::SourceBuilder;
use crate::state::{
    expand_topology, NativePrimitive, ShaderState, VertexAttributes, VertexPipeline,
    VERTEX_DATA_STRUCT,
};
use crate::vertex_program::VertexProgramTranslator;

/// Output registers shared by both pipelines, with their reset values. `oFog.x` starts at 1 so a
/// program that never writes fog yields "no fog".
const OUTPUT_REGISTERS: [(&str, &str); 11] = [
    ("oPos", "vec4(0.0,0.0,0.0,1.0)"),
    ("oD0", "vec4(0.0,0.0,0.0,1.0)"),
    ("oD1", "vec4(0.0,0.0,0.0,1.0)"),
    ("oB0", "vec4(0.0,0.0,0.0,1.0)"),
    ("oB1", "vec4(0.0,0.0,0.0,1.0)"),
    ("oPts", "vec4(0.0,0.0,0.0,1.0)"),
    ("oFog", "vec4(1.0,0.0,0.0,1.0)"),
    ("oT0", "vec4(0.0,0.0,0.0,1.0)"),
    ("oT1", "vec4(0.0,0.0,0.0,1.0)"),
    ("oT2", "vec4(0.0,0.0,0.0,1.0)"),
    ("oT3", "vec4(0.0,0.0,0.0,1.0)"),
];

const DECOMPRESS_11_11_10: &str = "\
vec4 decompress_11_11_10(int cmp) {
    float x = float(bitfieldExtract(cmp, 0,  11)) / 1023.0;
    float y = float(bitfieldExtract(cmp, 11, 11)) / 1023.0;
    float z = float(bitfieldExtract(cmp, 22, 10)) / 511.0;
    return vec4(x, y, z, 1);
}
";

/// Everything needed to build one host program, minus the fragment stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedProgramSources {
    pub geometry: Option<String>,
    pub vertex: String,
    pub primitive: NativePrimitive,
}

impl GeneratedProgramSources {
    /// Interface-block prefix the vertex stage writes through.
    pub fn vtx_prefix(&self) -> char {
        vtx_prefix(self.geometry.is_some())
    }
}

fn vtx_prefix(has_geometry: bool) -> char {
    if has_geometry {
        'v'
    } else {
        'g'
    }
}

/// Generates the geometry stage (if the topology needs one) and the vertex stage.
pub fn generate_program_sources(
    state: &ShaderState,
    translator: &dyn VertexProgramTranslator,
) -> Result<GeneratedProgramSources, ShaderGenError> {
    let topology = expand_topology(
        state.polygon_front_mode,
        state.polygon_back_mode,
        state.primitive_mode,
    )?;
    let geometry = topology.geometry.as_ref().map(|g| g.to_glsl());
    debug!(
        primitive = %state.primitive_mode,
        native = %topology.primitive,
        geometry_stage = geometry.is_some(),
        "selected host topology"
    );

    let vertex = generate_vertex_shader(state, vtx_prefix(geometry.is_some()), translator)?;

    if let Some(geometry) = &geometry {
        trace!(source = %geometry, "generated geometry shader");
    }
    trace!(source = %vertex, "generated vertex shader");

    Ok(GeneratedProgramSources {
        geometry,
        vertex,
        primitive: topology.primitive,
    })
}

/// Generates the vertex stage. `vtx_prefix` names the output interface block: `'v'` when a
/// geometry stage sits between this and the fragment stage, `'g'` otherwise.
pub fn generate_vertex_shader(
    state: &ShaderState,
    vtx_prefix: char,
    translator: &dyn VertexProgramTranslator,
) -> Result<String, ShaderGenError> {
    let mut header = SourceBuilder::with_capacity(8192);
    append_preamble(&mut header, state.compressed_attrs, vtx_prefix);

    let mut body = Block::new();
    for slot in 0..regs::VERTEX_ATTRIBUTES {
        if state.compressed_attrs.contains_slot(slot) {
            body.decl(
                GlslType::Vec4,
                format!("v{slot}"),
                format!("decompress_11_11_10(v{slot}_cmp)"),
            );
        }
    }

    let from_program = match &state.vertex_pipeline {
        VertexPipeline::FixedFunction => {
            let ff = fixed_function::generate(state)?;
            header.append(&ff.header);
            body.extend(ff.body);
            false
        }
        VertexPipeline::Program(program) => {
            let fragments =
                translator.translate(program.version, &program.tokens, program.z_perspective)?;
            header.append(&fragments.header);
            body.raw(fragments.body);
            true
        }
    };

    if state.fog_enable {
        fog::append_factor(state.fog_mode, from_program, &mut body);
    } else {
        fog::append_disabled(&mut body);
    }
    append_outputs(&mut body);

    let mut src = header;
    src.append("void main() {\n");
    body.render(&mut src, 1);
    src.append("}\n");
    Ok(src.into_string())
}

fn append_preamble(h: &mut SourceBuilder, compressed: VertexAttributes, vtx_prefix: char) {
    h.append("#version 400\n\n");
    h.append("uniform vec2 clipRange;\nuniform vec2 surfaceSize;\n\n");
    h.append_fmt(format_args!(
        "uniform vec4 c[{}];\n\n",
        regs::VERTEX_SHADER_CONSTANTS
    ));
    h.append("uniform vec4 fogColor;\nuniform float fogParam[2];\n\n");

    h.append_fmt(format_args!("#define fogPlane c[{}]\n", xfctx::FOG));
    for (i, base) in xfctx::TEXTURE_MATRICES.into_iter().enumerate() {
        h.append_fmt(format_args!(
            "#define texMat{i} mat4(c[{}], c[{}], c[{}], c[{}])\n",
            base,
            base + 1,
            base + 2,
            base + 3
        ));
    }
    h.append("\n");

    for (register, reset) in OUTPUT_REGISTERS {
        h.append_fmt(format_args!("vec4 {register} = {reset};\n"));
    }
    h.append("\n");
    h.append(DECOMPRESS_11_11_10);
    h.append(VERTEX_DATA_STRUCT);
    h.append_fmt(format_args!(
        "noperspective out VertexData {vtx_prefix}_vtx;\n#define vtx {vtx_prefix}_vtx\n\n"
    ));

    for slot in 0..regs::VERTEX_ATTRIBUTES {
        if compressed.contains_slot(slot) {
            h.append_fmt(format_args!(
                "layout(location = {slot}) in int v{slot}_cmp;\n"
            ));
        } else {
            h.append_fmt(format_args!("layout(location = {slot}) in vec4 v{slot};\n"));
        }
    }
    h.append("\n");
}

/// Colors and texture coordinates are pre-divided by w; the fragment stage multiplies back.
fn append_outputs(body: &mut Block) {
    for color in ["D0", "D1", "B0", "B1"] {
        body.assign(
            format!("vtx.{color}"),
            format!("clamp(o{color}, 0.0, 1.0) * vtx.inv_w"),
        );
    }
    body.assign("vtx.Fog", "oFog.x * vtx.inv_w");
    for i in 0..regs::MAX_TEXTURES {
        body.assign(format!("vtx.T{i}"), format!("oT{i} * vtx.inv_w"));
    }
    body.assign("gl_Position", "oPos");
    body.assign("gl_PointSize", "oPts.x");
}
