use tracing::warn;

use crate::ir::{Block, GlslType};
use crate::state::{Skinning, SkinningWeights};

const WEIGHT_COMPONENTS: [char; 4] = ['x', 'y', 'z', 'w'];

/// One quantity blended across the model-view matrix palette.
struct BlendTarget {
    ty: GlslType,
    output: &'static str,
    input: &'static str,
    matrix: &'static str,
    swizzle: &'static str,
}

const POSITION: BlendTarget = BlendTarget {
    ty: GlslType::Vec4,
    output: "tPosition",
    input: "position",
    matrix: "modelViewMat",
    swizzle: "xyzw",
};

const NORMAL: BlendTarget = BlendTarget {
    ty: GlslType::Vec3,
    output: "tNormal",
    input: "vec4(normal, 0.0)",
    matrix: "invModelViewMat",
    swizzle: "xyz",
};

/// Declares and computes `tPosition` (eye space) and `tNormal`.
pub(super) fn append(skinning: Skinning, body: &mut Block) {
    body.comment(format!("Skinning mode {}", skinning as u8));

    let count = skinning.matrix_count();
    let weights = skinning.weights();
    if weights == Some(SkinningWeights::Explicit) {
        warn!(
            ?skinning,
            "explicit-weight skinning has not been validated against hardware"
        );
    }

    for target in [POSITION, NORMAL] {
        match weights {
            None => {
                body.decl(
                    target.ty,
                    target.output,
                    format!("({} * {}0).{}", target.input, target.matrix, target.swizzle),
                );
            }
            Some(kind) => {
                body.decl(
                    target.ty,
                    target.output,
                    format!("{}(0.0)", target.ty.name()),
                );
                match kind {
                    SkinningWeights::Blend => append_blend(&target, count, body),
                    SkinningWeights::Explicit => append_explicit(&target, count, body),
                }
            }
        }
    }
}

/// The last matrix gets whatever weight the others leave over, so `weight` is only read for the
/// first `count - 1` matrices.
fn append_blend(target: &BlendTarget, count: usize, body: &mut Block) {
    let mut scope = Block::new();
    scope
        .decl_uninit(GlslType::Float, "weight_i")
        .decl(GlslType::Float, "weight_n", "1.0");
    for i in 0..count {
        if i + 1 < count {
            scope
                .assign("weight_i", format!("weight.{}", WEIGHT_COMPONENTS[i]))
                .sub_assign("weight_n", "weight_i");
        } else {
            scope.assign("weight_i", "weight_n");
        }
        scope.add_assign(
            target.output,
            format!(
                "({} * {}{}).{} * weight_i",
                target.input, target.matrix, i, target.swizzle
            ),
        );
    }
    body.scope(None, scope);
}

fn append_explicit(target: &BlendTarget, count: usize, body: &mut Block) {
    for (i, component) in WEIGHT_COMPONENTS.iter().enumerate().take(count) {
        body.add_assign(
            target.output,
            format!(
                "({} * {}{}).{} * weight.{}",
                target.input, target.matrix, i, target.swizzle, component
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Stmt;

    fn weighted_terms(block: &Block, output: &str) -> usize {
        let mut count = 0;
        block.visit(&mut |stmt| {
            if matches!(stmt, Stmt::Assign { target, .. } if target == output) {
                count += 1;
            }
        });
        count
    }

    #[test]
    fn skinning_off_uses_first_matrix_only() {
        let mut body = Block::new();
        append(Skinning::Off, &mut body);
        let src = body.to_glsl(0);
        assert!(
            src.contains("vec4 tPosition = (position * modelViewMat0).xyzw;\n"),
            "{}",
            src
        );
        assert!(
            src.contains("vec3 tNormal = (vec4(normal, 0.0) * invModelViewMat0).xyz;\n"),
            "{}",
            src
        );
        assert!(!src.contains("weight"), "{}", src);
    }

    #[test]
    fn three_matrix_blend_derives_last_weight() {
        let mut body = Block::new();
        append(Skinning::TwoWeights, &mut body);
        let src = body.to_glsl(0);
        assert_eq!(weighted_terms(&body, "tPosition"), 3);
        assert!(src.contains("  weight_i = weight.x;\n"), "{}", src);
        assert!(src.contains("  weight_i = weight.y;\n"), "{}", src);
        assert!(!src.contains("weight.z"), "{}", src);
        assert!(
            src.contains("  tPosition += (position * modelViewMat2).xyzw * weight_i;\n"),
            "{}",
            src
        );
    }

    #[test]
    fn explicit_weights_read_one_component_per_matrix() {
        let mut body = Block::new();
        append(Skinning::FourWeightsFourMatrices, &mut body);
        let src = body.to_glsl(0);
        assert_eq!(weighted_terms(&body, "tNormal"), 4);
        assert!(
            src.contains("tNormal += (vec4(normal, 0.0) * invModelViewMat3).xyz * weight.w;\n"),
            "{}",
            src
        );
        assert!(!src.contains("weight_n"), "{}", src);
    }
}
