//! NV2A transform engine (XF) constant bank layout.
//!
//! The fixed-function pipeline reads its matrices, texgen planes and light parameters out of the
//! same 192-entry constant bank that vertex programs use (`c[]`), plus three small light context
//! banks (`ltctxa`, `ltctxb`, `ltc1`). Slot numbers below are indices into those arrays.

pub const MAX_TEXTURES: usize = 4;
pub const MAX_LIGHTS: usize = 8;
pub const VERTEX_ATTRIBUTES: usize = 16;
pub const VERTEX_SHADER_CONSTANTS: usize = 192;

pub const LTCTXA_COUNT: usize = 26;
pub const LTCTXB_COUNT: usize = 52;
pub const LTC1_COUNT: usize = 20;

/// Number of `clipRegion[]` rectangles consumed by the fragment stage.
pub const CLIP_REGIONS: usize = 8;

/// Register-combiner final/general stage constants (`c0_<i>`, `c1_<i>`).
pub const COMBINER_CONSTANT_STAGES: usize = 9;

pub mod xfctx {
    pub const CMAT0: usize = 0x00;
    pub const PMAT0: usize = 0x04;
    pub const MMAT0: usize = 0x08;
    pub const IMMAT0: usize = 0x0c;
    pub const MMAT1: usize = 0x10;
    pub const IMMAT1: usize = 0x14;
    pub const MMAT2: usize = 0x18;
    pub const IMMAT2: usize = 0x1c;
    pub const MMAT3: usize = 0x20;
    pub const IMMAT3: usize = 0x24;
    pub const EYEP: usize = 0x38;
    pub const FOG: usize = 0x39;
    pub const TG0MAT: usize = 0x40;
    pub const T0MAT: usize = 0x44;
    pub const TG1MAT: usize = 0x48;
    pub const T1MAT: usize = 0x4c;
    pub const TG2MAT: usize = 0x50;
    pub const T2MAT: usize = 0x54;
    pub const TG3MAT: usize = 0x58;
    pub const T3MAT: usize = 0x5c;

    pub const MODEL_VIEW: [usize; 4] = [MMAT0, MMAT1, MMAT2, MMAT3];
    pub const INV_MODEL_VIEW: [usize; 4] = [IMMAT0, IMMAT1, IMMAT2, IMMAT3];
    pub const TEXGEN_PLANES: [usize; 4] = [TG0MAT, TG1MAT, TG2MAT, TG3MAT];
    pub const TEXTURE_MATRICES: [usize; 4] = [T0MAT, T1MAT, T2MAT, T3MAT];
}

pub mod ltctxa {
    /// Spot falloff of light 0; light `i` lives at `L0_K + 2 * i`.
    pub const L0_K: usize = 0x00;
    /// Spot direction of light 0; light `i` lives at `L0_SPT + 2 * i`.
    pub const L0_SPT: usize = 0x01;
    pub const LIGHT_STRIDE: usize = 2;
    pub const FR_AMB: usize = 0x11;
    pub const CM_COL: usize = 0x13;
}

pub mod ltctxb {
    pub const L0_AMB: usize = 0x00;
    pub const L0_DIF: usize = 0x01;
    pub const L0_SPC: usize = 0x02;
    pub const LIGHT_STRIDE: usize = 6;
}

pub mod ltc1 {
    pub const R0: usize = 0x04;
}

/// Texgen plane slots within a stage's four-vector block. The hardware stores Q before R.
pub const TEXGEN_PLANE_OFFSETS: [(char, usize); 4] = [('S', 0), ('T', 1), ('Q', 2), ('R', 3)];
