use std::fmt;

use crate::error::ShaderGenError;
use crate::ir::Block;
use crate::source::SourceBuilder;

/// Interface block passed from the vertex stage (and, when present, the geometry stage) to the
/// fragment stage. Colors and texture coordinates arrive pre-multiplied by `inv_w` so the
/// fragment stage can interpolate them without perspective correction.
pub const VERTEX_DATA_STRUCT: &str = "\
struct VertexData {
  float inv_w;
  vec4 D0;
  vec4 D1;
  vec4 B0;
  vec4 B1;
  float Fog;
  vec4 T0;
  vec4 T1;
  vec4 T2;
  vec4 T3;
};
";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    Point,
    Line,
    #[default]
    Fill,
}

impl fmt::Display for PolygonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PolygonMode::Point => "point",
            PolygonMode::Line => "line",
            PolygonMode::Fill => "fill",
        };
        f.write_str(s)
    }
}

/// Primitive types the NV2A accepts in `NV097_SET_BEGIN_END`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
    Quads,
    QuadStrip,
    Polygon,
}

impl fmt::Display for PrimitiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrimitiveMode::Points => "points",
            PrimitiveMode::Lines => "lines",
            PrimitiveMode::LineLoop => "line_loop",
            PrimitiveMode::LineStrip => "line_strip",
            PrimitiveMode::Triangles => "triangles",
            PrimitiveMode::TriangleStrip => "triangle_strip",
            PrimitiveMode::TriangleFan => "triangle_fan",
            PrimitiveMode::Quads => "quads",
            PrimitiveMode::QuadStrip => "quad_strip",
            PrimitiveMode::Polygon => "polygon",
        };
        f.write_str(s)
    }
}

/// Primitive type the draw call is actually issued with on the host API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NativePrimitive {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
    LinesAdjacency,
    LineStripAdjacency,
}

impl NativePrimitive {
    /// OpenGL enum value (`GL_POINTS`, `GL_LINES_ADJACENCY`, ...).
    pub fn gl_enum(self) -> u32 {
        match self {
            NativePrimitive::Points => 0x0000,
            NativePrimitive::Lines => 0x0001,
            NativePrimitive::LineLoop => 0x0002,
            NativePrimitive::LineStrip => 0x0003,
            NativePrimitive::Triangles => 0x0004,
            NativePrimitive::TriangleStrip => 0x0005,
            NativePrimitive::TriangleFan => 0x0006,
            NativePrimitive::LinesAdjacency => 0x000A,
            NativePrimitive::LineStripAdjacency => 0x000B,
        }
    }
}

impl fmt::Display for NativePrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NativePrimitive::Points => "points",
            NativePrimitive::Lines => "lines",
            NativePrimitive::LineLoop => "line_loop",
            NativePrimitive::LineStrip => "line_strip",
            NativePrimitive::Triangles => "triangles",
            NativePrimitive::TriangleStrip => "triangle_strip",
            NativePrimitive::TriangleFan => "triangle_fan",
            NativePrimitive::LinesAdjacency => "lines_adjacency",
            NativePrimitive::LineStripAdjacency => "line_strip_adjacency",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryInput {
    Triangles,
    LinesAdjacency,
}

impl GeometryInput {
    pub fn layout(self) -> &'static str {
        match self {
            GeometryInput::Triangles => "triangles",
            GeometryInput::LinesAdjacency => "lines_adjacency",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryOutput {
    LineStrip,
    TriangleStrip,
}

impl GeometryOutput {
    pub fn layout(self) -> &'static str {
        match self {
            GeometryOutput::LineStrip => "line_strip",
            GeometryOutput::TriangleStrip => "triangle_strip",
        }
    }
}

/// Geometry stage that re-emits host primitives as the topology the guest asked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeometryProgram {
    pub input: GeometryInput,
    pub output: GeometryOutput,
    pub max_vertices: u32,
    pub body: Block,
}

impl GeometryProgram {
    /// Number of `emit_vertex` calls in the body, across all branches.
    pub fn emit_count(&self) -> usize {
        self.body.calls_to("emit_vertex")
    }

    pub fn to_glsl(&self) -> String {
        let mut s = SourceBuilder::with_capacity(1024);
        s.append("#version 330\n\n");
        s.append_fmt(format_args!("layout({}) in;\n", self.input.layout()));
        s.append_fmt(format_args!(
            "layout({}, max_vertices = {}) out;\n",
            self.output.layout(),
            self.max_vertices
        ));
        s.append("\n");
        s.append(VERTEX_DATA_STRUCT);
        s.append(
            "noperspective in VertexData v_vtx[];\n\
             noperspective out VertexData g_vtx;\n\
             \n\
             void emit_vertex(int index) {\n\
            \x20 gl_Position = gl_in[index].gl_Position;\n\
            \x20 gl_PointSize = gl_in[index].gl_PointSize;\n\
            \x20 g_vtx = v_vtx[index];\n\
            \x20 EmitVertex();\n\
             }\n\
             \n\
             void main() {\n",
        );
        self.body.render(&mut s, 1);
        s.append("}\n");
        s.into_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopologyExpansion {
    pub primitive: NativePrimitive,
    /// `None` when the host API draws `primitive` natively with the requested fill.
    pub geometry: Option<GeometryProgram>,
}

impl TopologyExpansion {
    fn native(primitive: NativePrimitive) -> Self {
        Self {
            primitive,
            geometry: None,
        }
    }

    fn staged(
        primitive: NativePrimitive,
        input: GeometryInput,
        output: GeometryOutput,
        max_vertices: u32,
        body: Block,
    ) -> Self {
        Self {
            primitive,
            geometry: Some(GeometryProgram {
                input,
                output,
                max_vertices,
                body,
            }),
        }
    }
}

/// Picks the host primitive for a guest primitive/fill pair and, where the host has no direct
/// equivalent, the geometry stage that emulates it.
pub fn expand_topology(
    front: PolygonMode,
    back: PolygonMode,
    primitive: PrimitiveMode,
) -> Result<TopologyExpansion, ShaderGenError> {
    if front != back {
        return Err(ShaderGenError::AsymmetricPolygonMode { front, back });
    }
    let mode = front;

    if mode == PolygonMode::Point {
        return Ok(TopologyExpansion::native(NativePrimitive::Points));
    }
    let line = mode == PolygonMode::Line;

    let expansion = match primitive {
        PrimitiveMode::Points => TopologyExpansion::native(NativePrimitive::Points),
        PrimitiveMode::Lines => TopologyExpansion::native(NativePrimitive::Lines),
        PrimitiveMode::LineLoop => TopologyExpansion::native(NativePrimitive::LineLoop),
        PrimitiveMode::LineStrip => TopologyExpansion::native(NativePrimitive::LineStrip),
        PrimitiveMode::Triangles if !line => TopologyExpansion::native(NativePrimitive::Triangles),
        PrimitiveMode::Triangles => TopologyExpansion::staged(
            NativePrimitive::Triangles,
            GeometryInput::Triangles,
            GeometryOutput::LineStrip,
            4,
            closed_outline(&[0, 1, 2]),
        ),
        PrimitiveMode::TriangleStrip if !line => {
            TopologyExpansion::native(NativePrimitive::TriangleStrip)
        }
        PrimitiveMode::TriangleStrip => TopologyExpansion::staged(
            NativePrimitive::TriangleStrip,
            GeometryInput::Triangles,
            GeometryOutput::LineStrip,
            4,
            triangle_strip_outline(),
        ),
        PrimitiveMode::TriangleFan if !line => {
            TopologyExpansion::native(NativePrimitive::TriangleFan)
        }
        PrimitiveMode::TriangleFan => TopologyExpansion::staged(
            NativePrimitive::TriangleFan,
            GeometryInput::Triangles,
            GeometryOutput::LineStrip,
            4,
            triangle_fan_outline(),
        ),
        PrimitiveMode::Quads if line => TopologyExpansion::staged(
            NativePrimitive::LinesAdjacency,
            GeometryInput::LinesAdjacency,
            GeometryOutput::LineStrip,
            5,
            closed_outline(&[0, 1, 2, 3]),
        ),
        PrimitiveMode::Quads => TopologyExpansion::staged(
            NativePrimitive::LinesAdjacency,
            GeometryInput::LinesAdjacency,
            GeometryOutput::TriangleStrip,
            4,
            // Strip (1,2,0), (0,2,3): both triangles keep the quad's winding and share 0-2.
            emit_sequence(Block::new(), &[1, 2, 0, 3]),
        ),
        PrimitiveMode::QuadStrip if line => TopologyExpansion::staged(
            NativePrimitive::LineStripAdjacency,
            GeometryInput::LinesAdjacency,
            GeometryOutput::LineStrip,
            5,
            // Quad-strip vertices zig-zag, so the outline visits 3 before 2.
            emit_sequence(skip_odd_primitives(), &[0, 1, 3, 2, 0]),
        ),
        PrimitiveMode::QuadStrip => TopologyExpansion::staged(
            NativePrimitive::LineStripAdjacency,
            GeometryInput::LinesAdjacency,
            GeometryOutput::TriangleStrip,
            4,
            emit_sequence(skip_odd_primitives(), &[0, 1, 2, 3]),
        ),
        PrimitiveMode::Polygon if line => TopologyExpansion::native(NativePrimitive::LineLoop),
        PrimitiveMode::Polygon => TopologyExpansion::native(NativePrimitive::TriangleFan),
    };
    Ok(expansion)
}

fn emit(block: &mut Block, index: u32) {
    block.call("emit_vertex", [index.to_string()]);
}

fn end_primitive(block: &mut Block) {
    block.call("EndPrimitive", Vec::<String>::new());
}

fn emit_sequence(mut block: Block, indices: &[u32]) -> Block {
    for &index in indices {
        emit(&mut block, index);
    }
    end_primitive(&mut block);
    block
}

fn closed_outline(indices: &[u32]) -> Block {
    let mut order = indices.to_vec();
    if let Some(&first) = indices.first() {
        order.push(first);
    }
    emit_sequence(Block::new(), &order)
}

/// Adjacent triangles of a strip share an edge; each invocation draws only the edges the
/// previous one did not, and the very first triangle also draws its leading edge.
fn triangle_strip_outline() -> Block {
    let mut even = Block::new();
    even.if_then("gl_PrimitiveIDIn == 0", first_vertex());
    emit(&mut even, 1);
    emit(&mut even, 2);
    emit(&mut even, 0);

    let mut odd = Block::new();
    emit(&mut odd, 2);
    emit(&mut odd, 1);
    emit(&mut odd, 0);

    let mut body = Block::new();
    body.if_else("(gl_PrimitiveIDIn & 1) == 0", even, odd);
    end_primitive(&mut body);
    body
}

fn triangle_fan_outline() -> Block {
    let mut body = Block::new();
    body.if_then("gl_PrimitiveIDIn == 0", first_vertex());
    emit(&mut body, 1);
    emit(&mut body, 2);
    emit(&mut body, 0);
    end_primitive(&mut body);
    body
}

fn first_vertex() -> Block {
    let mut block = Block::new();
    emit(&mut block, 0);
    block
}

/// Line-strip adjacency delivers every overlapping four-vertex window; only even ones are quads.
fn skip_odd_primitives() -> Block {
    let mut exit = Block::new();
    exit.ret();
    let mut body = Block::new();
    body.if_then("(gl_PrimitiveIDIn & 1) != 0", exit);
    body
}
