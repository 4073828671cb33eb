use tracing::warn;

use crate::error::ShaderGenError;
use crate::ir::{Block, GlslType};
use crate::state::{ShaderState, TexGen};

/// Output swizzle and plane-name suffix per texture coordinate channel.
const CHANNELS: [(char, char); 4] = [('x', 'S'), ('y', 'T'), ('z', 'R'), ('w', 'Q')];

/// Writes `oT0..oT3` from texgen and then applies the enabled texture matrices.
pub(super) fn append(state: &ShaderState, body: &mut Block) -> Result<(), ShaderGenError> {
    for (stage, modes) in state.texgen.iter().enumerate() {
        body.comment(format!("Texgen for stage {stage}"));
        for (channel, &mode) in modes.iter().enumerate() {
            let (component, plane) = CHANNELS[channel];
            if !mode.valid_for_channel(channel) {
                return Err(ShaderGenError::InvalidTexGenChannel {
                    stage,
                    channel: plane,
                    mode,
                });
            }
            append_channel(stage, component, plane, mode, body);
        }
    }

    for (stage, &enabled) in state.texture_matrix_enable.iter().enumerate() {
        if enabled {
            body.assign(
                format!("oT{stage}"),
                format!("oT{stage} * texMat{stage}"),
            );
        }
    }
    Ok(())
}

fn append_channel(stage: usize, c: char, plane: char, mode: TexGen, body: &mut Block) {
    let target = format!("oT{stage}.{c}");
    match mode {
        TexGen::Disable => {
            body.assign(target, format!("texture{stage}.{c}"));
        }
        TexGen::EyeLinear => {
            body.assign(target, format!("dot(texPlane{plane}{stage}, tPosition)"));
        }
        TexGen::ObjectLinear => {
            warn!(stage, channel = %plane, "object-linear texgen has not been validated against hardware");
            body.assign(target, format!("dot(texPlane{plane}{stage}, position)"));
        }
        TexGen::SphereMap => {
            let mut scope = reflection_vector();
            scope
                .decl(
                    GlslType::Float,
                    "invM",
                    "1.0 / (2.0 * length(r + vec3(0.0, 0.0, 1.0)))",
                )
                .assign(target, format!("r.{c} * invM + 0.5"));
            body.scope(None, scope);
        }
        TexGen::ReflectionMap => {
            let mut scope = reflection_vector();
            scope.assign(target, format!("r.{c}"));
            body.scope(None, scope);
        }
        TexGen::NormalMap => {
            body.assign(target, format!("tNormal.{c}"));
        }
    }
}

/// Eye-space reflection of the view vector about the transformed normal.
fn reflection_vector() -> Block {
    let mut scope = Block::new();
    scope
        .decl(GlslType::Vec3, "u", "normalize(tPosition.xyz)")
        .decl(GlslType::Vec3, "r", "reflect(u, tNormal)");
    scope
}
