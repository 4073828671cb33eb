use crate::ir::{Block, GlslType};
use crate::source::SourceBuilder;
use crate::state::{LightType, MaterialColorSource, ShaderState};

/// Exponent used for the specular power. The hardware's specular curve coefficients
/// (`ltctxa` L/M/N) are not decoded yet.
const SPECULAR_EXPONENT: &str = "0.001";

/// Front color and per-light accumulation into `oD0`/`oD1`, plus the back-color passthrough.
///
/// Light uniforms are only declared in `header` for lights that are switched on.
pub(super) fn append(state: &ShaderState, header: &mut SourceBuilder, body: &mut Block) {
    if state.lighting {
        let ambient = match state.ambient_src {
            MaterialColorSource::Material => "sceneAmbientColor",
            MaterialColorSource::Diffuse => "diffuse.rgb",
            MaterialColorSource::Specular => "specular.rgb",
        };
        body.assign("oD0", format!("vec4({ambient}, diffuse.a)"));
        body.mul_assign("oD0.rgb", "materialEmissionColor.rgb");

        let emission = match state.emission_src {
            MaterialColorSource::Material => "sceneAmbientColor",
            MaterialColorSource::Diffuse => "diffuse.rgb",
            MaterialColorSource::Specular => "specular.rgb",
        };
        body.add_assign("oD0.rgb", emission);
        body.assign("oD1", "vec4(0.0, 0.0, 0.0, specular.a)");

        for (i, &light) in state.lights.iter().enumerate() {
            if let Some(scope) = light_scope(i, light, header) {
                body.scope(Some(format!("Light {i}")), scope);
            }
        }
    } else {
        body.assign("oD0", "diffuse");
        body.assign("oD1", "specular");
    }

    body.assign("oB0", "backDiffuse");
    body.assign("oB1", "backSpecular");
}

fn light_scope(i: usize, light: LightType, header: &mut SourceBuilder) -> Option<Block> {
    let mut scope = Block::new();
    match light {
        LightType::Off => return None,
        LightType::Infinite => {
            header.append_fmt(format_args!(
                "uniform vec3 lightInfiniteHalfVector{i};\n\
                 uniform vec3 lightInfiniteDirection{i};\n"
            ));
            scope
                .decl(GlslType::Float, "attenuation", "1.0")
                .decl(
                    GlslType::Float,
                    "nDotVP",
                    format!("max(0.0, dot(tNormal, normalize(vec3(lightInfiniteDirection{i}))))"),
                )
                .decl(
                    GlslType::Float,
                    "nDotHV",
                    format!("max(0.0, dot(tNormal, vec3(lightInfiniteHalfVector{i})))"),
                );
        }
        LightType::Local => {
            append_local(i, header, &mut scope);
        }
        LightType::Spot => {
            append_local(i, header, &mut scope);
            append_spot_cone(i, &mut scope);
        }
    }

    let mut no_specular = Block::new();
    no_specular.assign("pf", "0.0");
    let mut specular = Block::new();
    specular.assign("pf", format!("pow(nDotHV, {SPECULAR_EXPONENT})"));

    scope
        .decl_uninit(GlslType::Float, "pf")
        .if_else("nDotVP == 0.0", no_specular, specular)
        .decl(
            GlslType::Vec3,
            "lightAmbient",
            format!("lightAmbientColor({i}) * attenuation"),
        )
        .decl(
            GlslType::Vec3,
            "lightDiffuse",
            format!("lightDiffuseColor({i}) * attenuation * nDotVP"),
        )
        .decl(
            GlslType::Vec3,
            "lightSpecular",
            format!("lightSpecularColor({i}) * pf"),
        )
        .add_assign("oD0.xyz", "lightAmbient")
        .add_assign("oD0.xyz", "diffuse.xyz * lightDiffuse")
        .add_assign("oD1.xyz", "specular.xyz * lightSpecular");
    Some(scope)
}

/// Point light: direction, distance attenuation and Blinn half vector.
fn append_local(i: usize, header: &mut SourceBuilder, scope: &mut Block) {
    header.append_fmt(format_args!(
        "uniform vec3 lightLocalPosition{i};\n\
         uniform vec3 lightLocalAttenuation{i};\n"
    ));
    scope
        .decl(
            GlslType::Vec3,
            "VP",
            format!("lightLocalPosition{i} - tPosition.xyz/tPosition.w"),
        )
        .decl(GlslType::Float, "d", "length(VP)")
        .assign("VP", "normalize(VP)")
        .decl(
            GlslType::Float,
            "attenuation",
            format!(
                "1.0 / (lightLocalAttenuation{i}.x + lightLocalAttenuation{i}.y * d + lightLocalAttenuation{i}.z * d * d)"
            ),
        )
        .decl(
            GlslType::Vec3,
            "halfVector",
            "normalize(VP + eyePosition.xyz / eyePosition.w)",
        )
        .decl(GlslType::Float, "nDotVP", "max(0.0, dot(tNormal, VP))")
        .decl(GlslType::Float, "nDotHV", "max(0.0, dot(tNormal, halfVector))");
}

/// D3D-style spotlight factor. `spotDir.w` carries the outer cone cosine pre-scaled by the
/// direction length.
fn append_spot_cone(i: usize, scope: &mut Block) {
    let mut outside = Block::new();
    outside.assign("attenuation", "0.0");
    let mut penumbra = Block::new();
    penumbra.mul_assign("attenuation", "spotDirDotVP + spotDir.w");
    let mut beyond_inner = Block::new();
    beyond_inner.if_else("rho <= cosHalfPhi", outside, penumbra);

    scope
        .decl(GlslType::Vec4, "spotDir", format!("lightSpotDirection({i})"))
        .decl(GlslType::Float, "invScale", "1/length(spotDir.xyz)")
        .decl(GlslType::Float, "cosHalfPhi", "-invScale*spotDir.w")
        .decl(GlslType::Float, "cosHalfTheta", "invScale + cosHalfPhi")
        .decl(GlslType::Float, "spotDirDotVP", "dot(spotDir.xyz, VP)")
        .decl(GlslType::Float, "rho", "invScale*spotDirDotVP")
        .if_else("rho > cosHalfTheta", Block::new(), beyond_inner);
}
