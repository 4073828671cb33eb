//! Fixed table of uniforms a linked NV2A program may expose.
//!
//! The table is resolved once at link time. The driver optimizes away uniforms a given program
//! never reads, so any entry may be `None`; callers skip uploads for those.

use crate::regs::{
    CLIP_REGIONS, COMBINER_CONSTANT_STAGES, LTC1_COUNT, LTCTXA_COUNT, LTCTXB_COUNT, MAX_LIGHTS,
    MAX_TEXTURES, VERTEX_SHADER_CONSTANTS,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniformLocations<L> {
    /// Register combiner constants, `c{j}_{i}`: indexed `[j][i]`.
    pub combiner_constants: [[Option<L>; COMBINER_CONSTANT_STAGES]; 2],
    pub alpha_ref: Option<L>,
    /// Bump environment per texture stage. Stage 0 has none; slot 0 is always `None`.
    pub bump_mat: [Option<L>; MAX_TEXTURES],
    pub bump_scale: [Option<L>; MAX_TEXTURES],
    pub bump_offset: [Option<L>; MAX_TEXTURES],
    pub tex_scale: [Option<L>; MAX_TEXTURES],

    /// `c[i]`, the transform engine constant bank.
    pub vertex_constants: Vec<Option<L>>,
    pub surface_size: Option<L>,
    pub clip_range: Option<L>,
    pub fog_color: Option<L>,
    pub fog_param: [Option<L>; 2],
    pub inv_viewport: Option<L>,

    pub ltctxa: Vec<Option<L>>,
    pub ltctxb: Vec<Option<L>>,
    pub ltc1: Vec<Option<L>>,

    pub light_infinite_half_vector: [Option<L>; MAX_LIGHTS],
    pub light_infinite_direction: [Option<L>; MAX_LIGHTS],
    pub light_local_position: [Option<L>; MAX_LIGHTS],
    pub light_local_attenuation: [Option<L>; MAX_LIGHTS],

    pub clip_region: [Option<L>; CLIP_REGIONS],
}

impl<L> UniformLocations<L> {
    /// Resolves every entry through `lookup`, called once per expected name.
    pub fn lookup(mut lookup: impl FnMut(&str) -> Option<L>) -> Self {
        let mut named = |name: String| lookup(&name);

        let combiner_constants = std::array::from_fn(|j| {
            std::array::from_fn(|i| named(format!("c{j}_{i}")))
        });
        let alpha_ref = named("alphaRef".to_owned());
        let bump_mat = bump_stages(|i| named(format!("bumpMat{i}")));
        let bump_scale = bump_stages(|i| named(format!("bumpScale{i}")));
        let bump_offset = bump_stages(|i| named(format!("bumpOffset{i}")));
        let tex_scale = std::array::from_fn(|i| named(format!("texScale{i}")));

        let vertex_constants = (0..VERTEX_SHADER_CONSTANTS)
            .map(|i| named(format!("c[{i}]")))
            .collect();
        let surface_size = named("surfaceSize".to_owned());
        let clip_range = named("clipRange".to_owned());
        let fog_color = named("fogColor".to_owned());
        let fog_param = std::array::from_fn(|i| named(format!("fogParam[{i}]")));
        let inv_viewport = named("invViewport".to_owned());

        let ltctxa = (0..LTCTXA_COUNT)
            .map(|i| named(format!("ltctxa[{i}]")))
            .collect();
        let ltctxb = (0..LTCTXB_COUNT)
            .map(|i| named(format!("ltctxb[{i}]")))
            .collect();
        let ltc1 = (0..LTC1_COUNT)
            .map(|i| named(format!("ltc1[{i}]")))
            .collect();

        let light_infinite_half_vector =
            std::array::from_fn(|i| named(format!("lightInfiniteHalfVector{i}")));
        let light_infinite_direction =
            std::array::from_fn(|i| named(format!("lightInfiniteDirection{i}")));
        let light_local_position =
            std::array::from_fn(|i| named(format!("lightLocalPosition{i}")));
        let light_local_attenuation =
            std::array::from_fn(|i| named(format!("lightLocalAttenuation{i}")));

        let clip_region = std::array::from_fn(|i| named(format!("clipRegion[{i}]")));

        Self {
            combiner_constants,
            alpha_ref,
            bump_mat,
            bump_scale,
            bump_offset,
            tex_scale,
            vertex_constants,
            surface_size,
            clip_range,
            fog_color,
            fog_param,
            inv_viewport,
            ltctxa,
            ltctxb,
            ltc1,
            light_infinite_half_vector,
            light_infinite_direction,
            light_local_position,
            light_local_attenuation,
            clip_region,
        }
    }

    /// Every name [`UniformLocations::lookup`] queries, in query order.
    pub fn names() -> Vec<String> {
        let mut names = Vec::new();
        UniformLocations::<()>::lookup(|name| {
            names.push(name.to_owned());
            None
        });
        names
    }

    pub fn resolved_count(&self) -> usize {
        let singles = [
            &self.alpha_ref,
            &self.surface_size,
            &self.clip_range,
            &self.fog_color,
            &self.inv_viewport,
        ];
        let slices: [&[Option<L>]; 16] = [
            &self.combiner_constants[0],
            &self.combiner_constants[1],
            &self.bump_mat,
            &self.bump_scale,
            &self.bump_offset,
            &self.tex_scale,
            &self.vertex_constants,
            &self.fog_param,
            &self.ltctxa,
            &self.ltctxb,
            &self.ltc1,
            &self.light_infinite_half_vector,
            &self.light_infinite_direction,
            &self.light_local_position,
            &self.light_local_attenuation,
            &self.clip_region,
        ];
        singles.into_iter().filter(|l| l.is_some()).count()
            + slices
                .into_iter()
                .flatten()
                .filter(|l| l.is_some())
                .count()
    }
}

/// Stages 1..4 in order; stage 0 is never queried.
fn bump_stages<L>(mut f: impl FnMut(usize) -> Option<L>) -> [Option<L>; MAX_TEXTURES] {
    std::array::from_fn(|i| if i == 0 { None } else { f(i) })
}
