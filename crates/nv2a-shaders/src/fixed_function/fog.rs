//! Fog distance selection (fixed-function only) and the fog factor post-pass shared by both
//! vertex pipelines.
//!
//! `fogParam[0]`/`fogParam[1]` are the bias and scale the hardware precomputes from the
//! application's fog start/end/density; the formulas below just evaluate them.

use crate::ir::{Block, GlslType};
use crate::state::{FogGen, FogMode};

/// Declares `fogDistance` from the eye-space quantity selected by `fog_gen`.
pub(crate) fn append_distance(fog_gen: FogGen, body: &mut Block) {
    let distance = match fog_gen {
        FogGen::SpecularAlpha => "clamp(specular.a, 0.0, 1.0)",
        FogGen::Radial => "length(tPosition.xyz)",
        FogGen::Planar | FogGen::AbsPlanar => "dot(fogPlane.xyz, tPosition.xyz) + fogPlane.w",
        FogGen::FogX => "fogCoord",
    };
    body.decl(GlslType::Float, "fogDistance", distance);
    if fog_gen == FogGen::AbsPlanar {
        body.assign("fogDistance", "abs(fogDistance)");
    }
}

/// Turns `fogDistance` into `oFog`. Vertex programs hand the distance over in `oFog.x`.
pub(crate) fn append_factor(mode: FogMode, from_program: bool, body: &mut Block) {
    if from_program {
        body.decl(GlslType::Float, "fogDistance", "oFog.x");
    }

    if matches!(mode, FogMode::Linear | FogMode::LinearAbs | FogMode::Exp) {
        let mut clamp = Block::new();
        clamp.assign("fogDistance", "0.0");
        body.if_then("isinf(fogDistance)", clamp);
    }

    let (factor, bias) = match mode {
        FogMode::Linear | FogMode::LinearAbs => ("fogParam[0] + fogDistance * fogParam[1]", "1.0"),
        FogMode::Exp | FogMode::ExpAbs => (
            "fogParam[0] + exp2(fogDistance * fogParam[1] * 16.0)",
            "1.5",
        ),
        FogMode::Exp2 | FogMode::Exp2Abs => (
            "fogParam[0] + exp2(-fogDistance * fogDistance * fogParam[1] * fogParam[1] * 32.0)",
            "1.5",
        ),
    };
    body.decl(GlslType::Float, "fogFactor", factor);
    body.sub_assign("fogFactor", bias);
    if mode.is_absolute() {
        body.assign("fogFactor", "abs(fogFactor)");
    }
    body.assign("oFog.xyzw", "vec4(fogFactor)");
}

pub(crate) fn append_disabled(body: &mut Block) {
    body.assign("oFog.xyzw", "vec4(1.0)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn abs_planar_distance_is_made_absolute() {
        let mut body = Block::new();
        append_distance(FogGen::AbsPlanar, &mut body);
        assert_eq!(
            body.to_glsl(1),
            concat!(
                "  float fogDistance = dot(fogPlane.xyz, tPosition.xyz) + fogPlane.w;\n",
                "  fogDistance = abs(fogDistance);\n",
            )
        );
    }

    #[test]
    fn linear_abs_factor() {
        let mut body = Block::new();
        append_factor(FogMode::LinearAbs, false, &mut body);
        assert_eq!(
            body.to_glsl(1),
            concat!(
                "  if (isinf(fogDistance)) {\n",
                "    fogDistance = 0.0;\n",
                "  }\n",
                "  float fogFactor = fogParam[0] + fogDistance * fogParam[1];\n",
                "  fogFactor -= 1.0;\n",
                "  fogFactor = abs(fogFactor);\n",
                "  oFog.xyzw = vec4(fogFactor);\n",
            )
        );
    }

    #[test]
    fn exp2_from_program_reads_fog_register_without_inf_clamp() {
        let mut body = Block::new();
        append_factor(FogMode::Exp2, true, &mut body);
        let src = body.to_glsl(0);
        assert!(src.starts_with("float fogDistance = oFog.x;\n"), "{}", src);
        assert!(!src.contains("isinf"), "{}", src);
        assert!(src.contains("fogFactor -= 1.5;\n"), "{}", src);
        assert!(!src.contains("abs("), "{}", src);
    }
}
