//! Snapshot of the NV2A register state that selects a generated program.

pub mod topology;

use bitflags::bitflags;

use crate::regs::{MAX_LIGHTS, MAX_TEXTURES};

pub use topology::{
    expand_topology, GeometryInput, GeometryOutput, GeometryProgram, NativePrimitive, PolygonMode,
    PrimitiveMode, TopologyExpansion, VERTEX_DATA_STRUCT,
};

bitflags! {
    /// Vertex attribute slots, named after the fixed-function register aliases.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct VertexAttributes: u16 {
        const POSITION = 1 << 0;
        const WEIGHT = 1 << 1;
        const NORMAL = 1 << 2;
        const DIFFUSE = 1 << 3;
        const SPECULAR = 1 << 4;
        const FOG_COORD = 1 << 5;
        const POINT_SIZE = 1 << 6;
        const BACK_DIFFUSE = 1 << 7;
        const BACK_SPECULAR = 1 << 8;
        const TEXTURE0 = 1 << 9;
        const TEXTURE1 = 1 << 10;
        const TEXTURE2 = 1 << 11;
        const TEXTURE3 = 1 << 12;
        const RESERVED1 = 1 << 13;
        const RESERVED2 = 1 << 14;
        const RESERVED3 = 1 << 15;
    }
}

impl VertexAttributes {
    /// Flag for attribute slot `index` (`v<index>`). Slots above 15 map to the empty set.
    pub fn slot(index: usize) -> Self {
        if index < 16 {
            Self::from_bits_retain(1 << index)
        } else {
            Self::empty()
        }
    }

    pub fn contains_slot(self, index: usize) -> bool {
        !Self::slot(index).is_empty() && self.contains(Self::slot(index))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Skinning {
    #[default]
    Off,
    OneWeight,
    TwoWeightsTwoMatrices,
    TwoWeights,
    ThreeWeightsThreeMatrices,
    ThreeWeights,
    FourWeightsFourMatrices,
}

/// How per-matrix weights are obtained when skinning is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkinningWeights {
    /// The last weight is implied as `1 - sum(previous)`; only `matrices - 1` are read.
    Blend,
    /// One weight per matrix, read straight from the `weight` attribute.
    Explicit,
}

impl Skinning {
    /// Number of model-view matrices blended (0 when skinning is off).
    pub fn matrix_count(self) -> usize {
        match self {
            Skinning::Off => 0,
            Skinning::OneWeight | Skinning::TwoWeightsTwoMatrices => 2,
            Skinning::TwoWeights | Skinning::ThreeWeightsThreeMatrices => 3,
            Skinning::ThreeWeights | Skinning::FourWeightsFourMatrices => 4,
        }
    }

    pub fn weights(self) -> Option<SkinningWeights> {
        match self {
            Skinning::Off => None,
            Skinning::OneWeight | Skinning::TwoWeights | Skinning::ThreeWeights => {
                Some(SkinningWeights::Blend)
            }
            Skinning::TwoWeightsTwoMatrices
            | Skinning::ThreeWeightsThreeMatrices
            | Skinning::FourWeightsFourMatrices => Some(SkinningWeights::Explicit),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TexGen {
    #[default]
    Disable,
    EyeLinear,
    ObjectLinear,
    SphereMap,
    ReflectionMap,
    NormalMap,
}

impl TexGen {
    /// Whether the mode can drive channel `channel` (0..4 = S, T, R, Q).
    pub fn valid_for_channel(self, channel: usize) -> bool {
        match self {
            TexGen::Disable | TexGen::EyeLinear | TexGen::ObjectLinear => channel < 4,
            TexGen::SphereMap => channel < 2,
            TexGen::ReflectionMap | TexGen::NormalMap => channel < 3,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaterialColorSource {
    #[default]
    Material,
    Diffuse,
    Specular,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LightType {
    #[default]
    Off,
    Infinite,
    Local,
    Spot,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FogGen {
    #[default]
    SpecularAlpha,
    Radial,
    Planar,
    AbsPlanar,
    FogX,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FogMode {
    #[default]
    Linear,
    LinearAbs,
    Exp,
    ExpAbs,
    Exp2,
    Exp2Abs,
}

impl FogMode {
    pub fn is_absolute(self) -> bool {
        matches!(self, FogMode::LinearAbs | FogMode::ExpAbs | FogMode::Exp2Abs)
    }
}

/// Point size attenuation parameters (`NV097_SET_POINT_PARAMS`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointParams {
    /// Constant, linear and quadratic distance attenuation coefficients.
    pub attenuation: [f32; 3],
    pub size_offset: f32,
    pub size_scale: f32,
    pub size_bias: f32,
}

impl Default for PointParams {
    fn default() -> Self {
        Self {
            attenuation: [1.0, 0.0, 0.0],
            size_offset: 0.0,
            size_scale: 1.0,
            size_bias: 0.0,
        }
    }
}

/// Vertex program instruction-set flavor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VshVersion {
    /// Regular vertex program.
    #[default]
    Xvs,
    /// Vertex state program.
    Xvss,
    /// Read/write vertex program.
    Xvsw,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct VertexProgram {
    pub version: VshVersion,
    pub tokens: Vec<u32>,
    pub z_perspective: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum VertexPipeline {
    #[default]
    FixedFunction,
    Program(VertexProgram),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShaderState {
    /// Attribute slots fed as packed 11/11/10 integers instead of `vec4`.
    pub compressed_attrs: VertexAttributes,

    pub skinning: Skinning,
    pub normalization: bool,

    /// Indexed by `[stage][channel]`, channels in S, T, R, Q order.
    pub texgen: [[TexGen; 4]; MAX_TEXTURES],
    pub texture_matrix_enable: [bool; MAX_TEXTURES],

    pub lighting: bool,
    pub ambient_src: MaterialColorSource,
    pub emission_src: MaterialColorSource,
    pub lights: [LightType; MAX_LIGHTS],

    pub fog_enable: bool,
    pub fog_gen: FogGen,
    pub fog_mode: FogMode,

    pub polygon_front_mode: PolygonMode,
    pub polygon_back_mode: PolygonMode,
    pub primitive_mode: PrimitiveMode,

    pub point_params_enable: bool,
    pub point_params: PointParams,
    pub point_size: f32,
    /// Integer upscale factor of the render surface.
    pub surface_scale_factor: u32,

    pub vertex_pipeline: VertexPipeline,
}

impl Default for ShaderState {
    fn default() -> Self {
        Self {
            compressed_attrs: VertexAttributes::empty(),
            skinning: Skinning::Off,
            normalization: false,
            texgen: [[TexGen::Disable; 4]; MAX_TEXTURES],
            texture_matrix_enable: [false; MAX_TEXTURES],
            lighting: false,
            ambient_src: MaterialColorSource::Material,
            emission_src: MaterialColorSource::Material,
            lights: [LightType::Off; MAX_LIGHTS],
            fog_enable: false,
            fog_gen: FogGen::SpecularAlpha,
            fog_mode: FogMode::Linear,
            polygon_front_mode: PolygonMode::Fill,
            polygon_back_mode: PolygonMode::Fill,
            primitive_mode: PrimitiveMode::Triangles,
            point_params_enable: false,
            point_params: PointParams::default(),
            point_size: 1.0,
            surface_scale_factor: 1,
            vertex_pipeline: VertexPipeline::FixedFunction,
        }
    }
}

impl ShaderState {
    /// Deterministic 64-bit key for caching generated programs.
    ///
    /// Every field participates; floats are hashed by bit pattern so `-0.0` and `0.0` key
    /// differently, matching the textual difference they produce in generated source.
    pub fn state_hash(&self) -> u64 {
        let mut h = StateHasher::new();

        h.u32(u32::from(self.compressed_attrs.bits()));
        h.u8(self.skinning as u8);
        h.bool(self.normalization);
        for stage in &self.texgen {
            for channel in stage {
                h.u8(*channel as u8);
            }
        }
        for enabled in self.texture_matrix_enable {
            h.bool(enabled);
        }

        h.bool(self.lighting);
        h.u8(self.ambient_src as u8);
        h.u8(self.emission_src as u8);
        for light in self.lights {
            h.u8(light as u8);
        }

        h.bool(self.fog_enable);
        h.u8(self.fog_gen as u8);
        h.u8(self.fog_mode as u8);

        h.u8(self.polygon_front_mode as u8);
        h.u8(self.polygon_back_mode as u8);
        h.u8(self.primitive_mode as u8);

        h.bool(self.point_params_enable);
        for v in self.point_params.attenuation {
            h.f32(v);
        }
        h.f32(self.point_params.size_offset);
        h.f32(self.point_params.size_scale);
        h.f32(self.point_params.size_bias);
        h.f32(self.point_size);
        h.u32(self.surface_scale_factor);

        match &self.vertex_pipeline {
            VertexPipeline::FixedFunction => h.u8(0),
            VertexPipeline::Program(program) => {
                h.u8(1);
                h.u8(program.version as u8);
                h.bool(program.z_perspective);
                h.u32(program.tokens.len() as u32);
                for token in &program.tokens {
                    h.u32(*token);
                }
            }
        }

        h.finish()
    }
}

struct StateHasher(blake3::Hasher);

impl StateHasher {
    fn new() -> Self {
        Self(blake3::Hasher::new())
    }

    fn u8(&mut self, v: u8) {
        self.0.update(&[v]);
    }

    fn bool(&mut self, v: bool) {
        self.u8(v as u8);
    }

    fn u32(&mut self, v: u32) {
        self.0.update(&v.to_le_bytes());
    }

    fn f32(&mut self, v: f32) {
        self.u32(v.to_bits());
    }

    fn finish(self) -> u64 {
        let hash = self.0.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skinning_modes_map_to_matrix_counts_and_weight_kinds() {
        let cases = [
            (Skinning::Off, 0, None),
            (Skinning::OneWeight, 2, Some(SkinningWeights::Blend)),
            (Skinning::TwoWeightsTwoMatrices, 2, Some(SkinningWeights::Explicit)),
            (Skinning::TwoWeights, 3, Some(SkinningWeights::Blend)),
            (Skinning::ThreeWeightsThreeMatrices, 3, Some(SkinningWeights::Explicit)),
            (Skinning::ThreeWeights, 4, Some(SkinningWeights::Blend)),
            (Skinning::FourWeightsFourMatrices, 4, Some(SkinningWeights::Explicit)),
        ];
        for (mode, count, weights) in cases {
            assert_eq!(mode.matrix_count(), count, "{mode:?}");
            assert_eq!(mode.weights(), weights, "{mode:?}");
        }
    }

    #[test]
    fn texgen_channel_validity() {
        assert!(TexGen::SphereMap.valid_for_channel(1));
        assert!(!TexGen::SphereMap.valid_for_channel(2));
        assert!(TexGen::ReflectionMap.valid_for_channel(2));
        assert!(!TexGen::ReflectionMap.valid_for_channel(3));
        assert!(!TexGen::NormalMap.valid_for_channel(3));
        assert!(TexGen::EyeLinear.valid_for_channel(3));
    }

    #[test]
    fn vertex_attribute_slots() {
        assert_eq!(VertexAttributes::slot(3), VertexAttributes::DIFFUSE);
        assert_eq!(VertexAttributes::slot(16), VertexAttributes::empty());
        let attrs = VertexAttributes::NORMAL | VertexAttributes::TEXTURE3;
        assert!(attrs.contains_slot(2));
        assert!(attrs.contains_slot(12));
        assert!(!attrs.contains_slot(0));
        assert!(!attrs.contains_slot(40));
    }

    #[test]
    fn state_hash_is_stable_and_sensitive_to_every_kind_of_field() {
        let base = ShaderState::default();
        assert_eq!(base.state_hash(), base.clone().state_hash());

        let mut texgen = base.clone();
        texgen.texgen[2][1] = TexGen::EyeLinear;
        assert_ne!(base.state_hash(), texgen.state_hash());

        let mut point = base.clone();
        point.point_size = 2.0;
        assert_ne!(base.state_hash(), point.state_hash());

        let mut program = base.clone();
        program.vertex_pipeline = VertexPipeline::Program(VertexProgram {
            version: VshVersion::Xvs,
            tokens: vec![0, 1, 2, 3],
            z_perspective: false,
        });
        let mut other_program = program.clone();
        if let VertexPipeline::Program(p) = &mut other_program.vertex_pipeline {
            p.tokens[3] = 4;
        }
        assert_ne!(base.state_hash(), program.state_hash());
        assert_ne!(program.state_hash(), other_program.state_hash());
    }
}
