//! Vertex body reproducing the NV2A fixed-function transform and lighting pipeline.
//!
//! The generated code reads its matrices and light parameters out of the transform engine's
//! constant banks (`c[]`, `ltctxa`, `ltctxb`, `ltc1`) through the macros declared in the header,
//! so switching between fixed-function and vertex-program mode never re-uploads constants.

pub(crate) mod fog;
mod lighting;
mod skinning;
mod texgen;

use tracing::debug;

use crate::error::ShaderGenError;
use crate::ir::{Block, GlslType};
use crate::regs::{self, ltc1, ltctxa, ltctxb, xfctx};
use crate::source::SourceBuilder;
use crate::state::{LightType, ShaderState, Skinning};

/// Register aliases for the sixteen vertex attribute slots.
const ATTRIBUTE_ALIASES: [(&str, &str); regs::VERTEX_ATTRIBUTES] = [
    ("position", "v0"),
    ("weight", "v1"),
    ("normal", "v2.xyz"),
    ("diffuse", "v3"),
    ("specular", "v4"),
    ("fogCoord", "v5.x"),
    ("pointSize", "v6"),
    ("backDiffuse", "v7"),
    ("backSpecular", "v8"),
    ("texture0", "v9"),
    ("texture1", "v10"),
    ("texture2", "v11"),
    ("texture3", "v12"),
    ("reserved1", "v13"),
    ("reserved2", "v14"),
    ("reserved3", "v15"),
];

/// Declarations and `main()` statements for the fixed-function pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedFunctionBody {
    pub header: String,
    pub body: Block,
}

pub fn generate(state: &ShaderState) -> Result<FixedFunctionBody, ShaderGenError> {
    let mut header = SourceBuilder::with_capacity(4096);
    append_header(&mut header);

    let mut body = Block::new();
    skinning::append(state.skinning, &mut body);
    if state.normalization {
        body.assign("tNormal", "normalize(tNormal)");
    }
    texgen::append(state, &mut body)?;
    lighting::append(state, &mut header, &mut body);
    if state.fog_enable {
        fog::append_distance(state.fog_gen, &mut body);
    }
    append_transform(state.skinning, &mut body);
    append_point_size(state, &mut body);
    body.assign("vtx.inv_w", "1.0 / oPos.w");

    debug!(
        skinning = ?state.skinning,
        lighting = state.lighting,
        lights = state.lights.iter().filter(|&&l| l != LightType::Off).count(),
        fog = state.fog_enable,
        "generated fixed-function vertex body"
    );

    Ok(FixedFunctionBody {
        header: header.into_string(),
        body,
    })
}

fn c_mat4(base: usize) -> String {
    format!(
        "mat4(c[{}], c[{}], c[{}], c[{}])",
        base,
        base + 1,
        base + 2,
        base + 3
    )
}

fn append_header(h: &mut SourceBuilder) {
    for (alias, register) in ATTRIBUTE_ALIASES {
        h.append_fmt(format_args!("#define {alias:<13} {register}\n"));
    }
    h.append("\n");
    h.append_fmt(format_args!(
        "uniform vec4 ltctxa[{}];\nuniform vec4 ltctxb[{}];\nuniform vec4 ltc1[{}];\n\n",
        regs::LTCTXA_COUNT,
        regs::LTCTXB_COUNT,
        regs::LTC1_COUNT
    ));

    h.append_fmt(format_args!("#define projectionMat {}\n", c_mat4(xfctx::PMAT0)));
    h.append_fmt(format_args!("#define compositeMat {}\n", c_mat4(xfctx::CMAT0)));
    h.append("\n");

    for (stage, base) in xfctx::TEXGEN_PLANES.into_iter().enumerate() {
        for (plane, offset) in regs::TEXGEN_PLANE_OFFSETS {
            h.append_fmt(format_args!(
                "#define texPlane{plane}{stage} c[{}]\n",
                base + offset
            ));
        }
        h.append("\n");
    }

    for (i, base) in xfctx::MODEL_VIEW.into_iter().enumerate() {
        h.append_fmt(format_args!("#define modelViewMat{i} {}\n", c_mat4(base)));
    }
    h.append("\n");
    for (i, base) in xfctx::INV_MODEL_VIEW.into_iter().enumerate() {
        h.append_fmt(format_args!("#define invModelViewMat{i} {}\n", c_mat4(base)));
    }
    h.append("\n");
    h.append_fmt(format_args!("#define eyePosition c[{}]\n\n", xfctx::EYEP));

    let b = ltctxb::LIGHT_STRIDE;
    h.append_fmt(format_args!(
        "#define lightAmbientColor(i) ltctxb[{} + (i)*{b}].xyz\n\
         #define lightDiffuseColor(i) ltctxb[{} + (i)*{b}].xyz\n\
         #define lightSpecularColor(i) ltctxb[{} + (i)*{b}].xyz\n\n",
        ltctxb::L0_AMB,
        ltctxb::L0_DIF,
        ltctxb::L0_SPC
    ));
    let a = ltctxa::LIGHT_STRIDE;
    h.append_fmt(format_args!(
        "#define lightSpotFalloff(i) ltctxa[{} + (i)*{a}].xyz\n\
         #define lightSpotDirection(i) ltctxa[{} + (i)*{a}]\n\n",
        ltctxa::L0_K,
        ltctxa::L0_SPT
    ));
    h.append_fmt(format_args!(
        "#define lightLocalRange(i) ltc1[{} + (i)].x\n\n",
        ltc1::R0
    ));
    h.append_fmt(format_args!(
        "#define sceneAmbientColor ltctxa[{}].xyz\n\
         #define materialEmissionColor ltctxa[{}].xyz\n\n",
        ltctxa::FR_AMB,
        ltctxa::CM_COL
    ));
    h.append("uniform mat4 invViewport;\n\n");
}

/// Without skinning the composite matrix already contains the model-view transform.
fn append_transform(skinning: Skinning, body: &mut Block) {
    if skinning == Skinning::Off {
        body.assign("tPosition", "position");
    }
    body.assign("oPos", "invViewport * (tPosition * compositeMat)");
    body.assign("oPos.z", "oPos.z * 2.0 - oPos.w");
}

/// Point size in pixels of the upscaled surface, capped at the hardware's 64 pixel maximum
/// when distance attenuation is on.
fn append_point_size(state: &ShaderState, body: &mut Block) {
    let factor = state.surface_scale_factor;
    if state.point_params_enable {
        let p = &state.point_params;
        let [a, b, c] = p.attenuation.map(float_literal);
        body.decl(
            GlslType::Float,
            "d_e",
            "length(position * modelViewMat0)",
        );
        body.assign(
            "oPts.x",
            format!(
                "1/sqrt({a} + {b}*d_e + {c}*d_e*d_e) + {}",
                float_literal(p.size_offset)
            ),
        );
        body.assign(
            "oPts.x",
            format!(
                "min(oPts.x*{} + {}, 64.0) * {factor}",
                float_literal(p.size_scale),
                float_literal(p.size_bias)
            ),
        );
    } else {
        body.assign(
            "oPts.x",
            format!("{} * {factor}", float_literal(state.point_size)),
        );
    }
}

/// Six-digit decimal literal. Register values that are not finite become constant
/// expressions, since GLSL has no literal for them.
fn float_literal(value: f32) -> String {
    if value.is_nan() {
        "(0.0/0.0)".to_owned()
    } else if value.is_infinite() {
        if value > 0.0 {
            "(1.0/0.0)".to_owned()
        } else {
            "(-1.0/0.0)".to_owned()
        }
    } else {
        format!("{value:.6}")
    }
}
