mod common;

use nv2a_shaders::state::{
    FogGen, FogMode, VertexAttributes, VertexPipeline, VertexProgram, VshVersion,
};
use nv2a_shaders::{
    generate_program_sources, generate_vertex_shader, ShaderGenError, ShaderState,
    VertexProgramError,
};

use common::StubTranslator;

fn program_state() -> ShaderState {
    ShaderState {
        vertex_pipeline: VertexPipeline::Program(VertexProgram {
            version: VshVersion::Xvs,
            tokens: vec![0x0000_0000, 0x0020_001b, 0x0836_106c, 0x2070_f800],
            z_perspective: true,
        }),
        ..Default::default()
    }
}

#[test]
fn program_body_replaces_fixed_function() {
    let translator = StubTranslator::default();
    let src = generate_vertex_shader(&program_state(), 'g', &translator).unwrap();

    assert_eq!(
        *translator.last_request.borrow(),
        Some((
            VshVersion::Xvs,
            vec![0x0000_0000, 0x0020_001b, 0x0836_106c, 0x2070_f800],
            true
        ))
    );
    assert!(
        src.contains("layout(location = 15) in vec4 v15;\n\nuniform vec4 vpScratch;\n"),
        "{}",
        src
    );
    assert!(
        src.contains("void main() {\n  oPos = v0;\n  oFog = v0.zzzz;\n  vtx.inv_w = 1.0 / oPos.w;\n"),
        "{}",
        src
    );
    assert!(!src.contains("#define position"), "{}", src);
    assert!(!src.contains("tPosition"), "{}", src);
    assert!(src.contains("  oFog.xyzw = vec4(1.0);\n"), "{}", src);
}

#[test]
fn program_fog_reads_distance_from_fog_register() {
    let state = ShaderState {
        fog_enable: true,
        // Fog generation mode only selects the fixed-function distance source.
        fog_gen: FogGen::Radial,
        fog_mode: FogMode::Exp2Abs,
        ..program_state()
    };
    let src = generate_vertex_shader(&state, 'g', &StubTranslator::default()).unwrap();
    assert!(
        src.contains(concat!(
            "  float fogDistance = oFog.x;\n",
            "  float fogFactor = fogParam[0] + exp2(-fogDistance * fogDistance * fogParam[1] * fogParam[1] * 32.0);\n",
            "  fogFactor -= 1.5;\n",
            "  fogFactor = abs(fogFactor);\n",
            "  oFog.xyzw = vec4(fogFactor);\n",
        )),
        "{}",
        src
    );
    assert!(!src.contains("length(tPosition.xyz)"), "{}", src);
}

#[test]
fn compressed_attributes_are_decompressed_before_program_body() {
    let state = ShaderState {
        compressed_attrs: VertexAttributes::POSITION | VertexAttributes::TEXTURE1,
        ..program_state()
    };
    let src = generate_vertex_shader(&state, 'v', &StubTranslator::default()).unwrap();
    assert!(src.contains("layout(location = 0) in int v0_cmp;\n"), "{}", src);
    assert!(src.contains("layout(location = 10) in int v10_cmp;\n"), "{}", src);
    assert!(
        src.contains(concat!(
            "void main() {\n",
            "  vec4 v0 = decompress_11_11_10(v0_cmp);\n",
            "  vec4 v10 = decompress_11_11_10(v10_cmp);\n",
            "  oPos = v0;\n",
        )),
        "{}",
        src
    );
    assert!(src.contains("#define vtx v_vtx\n"), "{}", src);
}

#[test]
fn translator_failure_is_reported_without_output() {
    let translator = StubTranslator {
        fail: Some("unsupported opcode 0x1f".to_owned()),
        ..Default::default()
    };
    let err = generate_program_sources(&program_state(), &translator).unwrap_err();
    assert_eq!(
        err,
        ShaderGenError::VertexProgram(VertexProgramError::new("unsupported opcode 0x1f"))
    );
    assert_eq!(
        err.to_string(),
        "vertex program translation failed: unsupported opcode 0x1f"
    );
}
