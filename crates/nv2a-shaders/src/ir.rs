//! Statement-level IR for generated GLSL function bodies.
//!
//! Generators build a [`Block`] of [`Stmt`] nodes and render it once at the end. Operands are kept
//! as GLSL expression text; the node kinds carry the structure (declarations, compound
//! assignments, calls, scopes, branches) so tests can inspect what was generated without
//! pattern-matching on rendered source.

use std::fmt::Write;

use crate::source::SourceBuilder;

const INDENT: &str = "  ";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlslType {
    Float,
    Vec3,
    Vec4,
}

impl GlslType {
    pub fn name(self) -> &'static str {
        match self {
            GlslType::Float => "float",
            GlslType::Vec3 => "vec3",
            GlslType::Vec4 => "vec4",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Set => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    Comment(String),
    Decl {
        ty: GlslType,
        name: String,
        init: Option<String>,
    },
    Assign {
        target: String,
        op: AssignOp,
        value: String,
    },
    Call {
        function: String,
        args: Vec<String>,
    },
    Return,
    /// A nested `{ ... }` scope, optionally preceded by a `/* label */` comment on the same line.
    Scope {
        label: Option<String>,
        body: Block,
    },
    /// `if`/`else`. An `otherwise` block holding a single `If` renders as `else if`; an early
    /// exit with no `else` renders on one line.
    If {
        cond: String,
        then: Block,
        otherwise: Option<Block>,
    },
    /// Pre-rendered text spliced verbatim, one indented line per input line.
    Raw(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    stmts: Vec<Stmt>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stmt: Stmt) -> &mut Self {
        self.stmts.push(stmt);
        self
    }

    pub fn comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Stmt::Comment(text.into()))
    }

    pub fn decl(
        &mut self,
        ty: GlslType,
        name: impl Into<String>,
        init: impl Into<String>,
    ) -> &mut Self {
        self.push(Stmt::Decl {
            ty,
            name: name.into(),
            init: Some(init.into()),
        })
    }

    pub fn decl_uninit(&mut self, ty: GlslType, name: impl Into<String>) -> &mut Self {
        self.push(Stmt::Decl {
            ty,
            name: name.into(),
            init: None,
        })
    }

    pub fn assign(&mut self, target: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.compound(target, AssignOp::Set, value)
    }

    pub fn add_assign(&mut self, target: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.compound(target, AssignOp::Add, value)
    }

    pub fn sub_assign(&mut self, target: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.compound(target, AssignOp::Sub, value)
    }

    pub fn mul_assign(&mut self, target: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.compound(target, AssignOp::Mul, value)
    }

    fn compound(
        &mut self,
        target: impl Into<String>,
        op: AssignOp,
        value: impl Into<String>,
    ) -> &mut Self {
        self.push(Stmt::Assign {
            target: target.into(),
            op,
            value: value.into(),
        })
    }

    pub fn call<I, S>(&mut self, function: impl Into<String>, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Stmt::Call {
            function: function.into(),
            args: args.into_iter().map(Into::into).collect(),
        })
    }

    pub fn ret(&mut self) -> &mut Self {
        self.push(Stmt::Return)
    }

    pub fn scope(&mut self, label: Option<String>, body: Block) -> &mut Self {
        self.push(Stmt::Scope { label, body })
    }

    pub fn if_then(&mut self, cond: impl Into<String>, then: Block) -> &mut Self {
        self.push(Stmt::If {
            cond: cond.into(),
            then,
            otherwise: None,
        })
    }

    pub fn if_else(&mut self, cond: impl Into<String>, then: Block, otherwise: Block) -> &mut Self {
        self.push(Stmt::If {
            cond: cond.into(),
            then,
            otherwise: Some(otherwise),
        })
    }

    pub fn raw(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Stmt::Raw(text.into()))
    }

    pub fn extend(&mut self, other: Block) -> &mut Self {
        self.stmts.extend(other.stmts);
        self
    }

    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    /// Depth-first visit of every statement, including those nested in scopes and branches.
    pub fn visit(&self, f: &mut impl FnMut(&Stmt)) {
        for stmt in &self.stmts {
            f(stmt);
            match stmt {
                Stmt::Scope { body, .. } => body.visit(f),
                Stmt::If {
                    then, otherwise, ..
                } => {
                    then.visit(f);
                    if let Some(otherwise) = otherwise {
                        otherwise.visit(f);
                    }
                }
                _ => {}
            }
        }
    }

    /// Number of calls to `function` anywhere in the block.
    pub fn calls_to(&self, function: &str) -> usize {
        let mut count = 0;
        self.visit(&mut |stmt| {
            if matches!(stmt, Stmt::Call { function: f, .. } if f == function) {
                count += 1;
            }
        });
        count
    }

    pub fn render(&self, out: &mut SourceBuilder, depth: usize) {
        for stmt in &self.stmts {
            render_stmt(stmt, out, depth);
        }
    }

    pub fn to_glsl(&self, depth: usize) -> String {
        let mut out = SourceBuilder::new();
        self.render(&mut out, depth);
        out.into_string()
    }
}

fn indent(out: &mut SourceBuilder, depth: usize) {
    for _ in 0..depth {
        out.append(INDENT);
    }
}

fn render_stmt(stmt: &Stmt, out: &mut SourceBuilder, depth: usize) {
    match stmt {
        Stmt::Comment(text) => {
            indent(out, depth);
            let _ = writeln!(out, "/* {text} */");
        }
        Stmt::Decl { ty, name, init } => {
            indent(out, depth);
            match init {
                Some(init) => {
                    let _ = writeln!(out, "{} {} = {};", ty.name(), name, init);
                }
                None => {
                    let _ = writeln!(out, "{} {};", ty.name(), name);
                }
            }
        }
        Stmt::Assign { target, op, value } => {
            indent(out, depth);
            let _ = writeln!(out, "{} {} {};", target, op.symbol(), value);
        }
        Stmt::Call { function, args } => {
            indent(out, depth);
            let _ = writeln!(out, "{}({});", function, args.join(", "));
        }
        Stmt::Return => {
            indent(out, depth);
            out.append("return;\n");
        }
        Stmt::Scope { label, body } => {
            indent(out, depth);
            if let Some(label) = label {
                let _ = write!(out, "/* {label} */ ");
            }
            out.append("{\n");
            body.render(out, depth + 1);
            indent(out, depth);
            out.append("}\n");
        }
        Stmt::If {
            cond,
            then,
            otherwise,
        } => {
            indent(out, depth);
            render_if_chain(cond, then, otherwise.as_ref(), out, depth);
        }
        Stmt::Raw(text) => {
            for line in text.lines() {
                if !line.is_empty() {
                    indent(out, depth);
                    out.append(line);
                }
                out.append("\n");
            }
        }
    }
}

fn render_if_chain(
    cond: &str,
    then: &Block,
    otherwise: Option<&Block>,
    out: &mut SourceBuilder,
    depth: usize,
) {
    if otherwise.is_none() && matches!(then.stmts(), [Stmt::Return]) {
        let _ = writeln!(out, "if ({cond}) {{ return; }}");
        return;
    }
    let _ = writeln!(out, "if ({cond}) {{");
    then.render(out, depth + 1);
    indent(out, depth);
    match otherwise {
        None => out.append("}\n"),
        Some(block) => match block.stmts() {
            [Stmt::If {
                cond,
                then,
                otherwise,
            }] => {
                out.append("} else ");
                render_if_chain(cond, then, otherwise.as_ref(), out, depth);
            }
            _ => {
                out.append("} else {\n");
                block.render(out, depth + 1);
                indent(out, depth);
                out.append("}\n");
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_declarations_assignments_and_calls() {
        let mut block = Block::new();
        block
            .comment("Skinning mode 0")
            .decl(GlslType::Vec4, "tPosition", "vec4(0.0)")
            .decl_uninit(GlslType::Float, "pf")
            .add_assign("oD0.xyz", "lightAmbient")
            .mul_assign("oD0.rgb", "materialEmissionColor.rgb")
            .call("emit_vertex", ["0"])
            .call("EndPrimitive", Vec::<String>::new());

        assert_eq!(
            block.to_glsl(1),
            concat!(
                "  /* Skinning mode 0 */\n",
                "  vec4 tPosition = vec4(0.0);\n",
                "  float pf;\n",
                "  oD0.xyz += lightAmbient;\n",
                "  oD0.rgb *= materialEmissionColor.rgb;\n",
                "  emit_vertex(0);\n",
                "  EndPrimitive();\n",
            )
        );
    }

    #[test]
    fn else_block_with_single_if_renders_as_else_if() {
        let mut zero = Block::new();
        zero.assign("attenuation", "0.0");
        let mut between = Block::new();
        between.mul_assign("attenuation", "spotDirDotVP + spotDir.w");
        let mut chain = Block::new();
        chain.if_else("rho <= cosHalfPhi", zero, between);

        let mut block = Block::new();
        block.if_else("rho > cosHalfTheta", Block::new(), chain);

        assert_eq!(
            block.to_glsl(0),
            concat!(
                "if (rho > cosHalfTheta) {\n",
                "} else if (rho <= cosHalfPhi) {\n",
                "  attenuation = 0.0;\n",
                "} else {\n",
                "  attenuation *= spotDirDotVP + spotDir.w;\n",
                "}\n",
            )
        );
    }

    #[test]
    fn labelled_scope_and_raw_text_are_indented() {
        let mut inner = Block::new();
        inner.raw("float a = 1.0;\n\nfloat b = a;");
        let mut block = Block::new();
        block.scope(Some("Light 3".to_owned()), inner);

        assert_eq!(
            block.to_glsl(1),
            "  /* Light 3 */ {\n    float a = 1.0;\n\n    float b = a;\n  }\n"
        );
    }

    #[test]
    fn early_return_renders_on_one_line() {
        let mut exit = Block::new();
        exit.ret();
        let mut block = Block::new();
        block.if_then("(gl_PrimitiveIDIn & 1) != 0", exit.clone());
        block.if_else("x", exit, Block::new());

        assert_eq!(
            block.to_glsl(1),
            concat!(
                "  if ((gl_PrimitiveIDIn & 1) != 0) { return; }\n",
                "  if (x) {\n",
                "    return;\n",
                "  } else {\n",
                "  }\n",
            )
        );
    }

    #[test]
    fn visit_reaches_nested_statements() {
        let mut then = Block::new();
        then.call("emit_vertex", ["0"]);
        let mut block = Block::new();
        block.if_then("gl_PrimitiveIDIn == 0", then);
        block.call("emit_vertex", ["1"]);
        block.call("EndPrimitive", Vec::<String>::new());

        assert_eq!(block.calls_to("emit_vertex"), 2);
        assert_eq!(block.calls_to("EndPrimitive"), 1);
    }
}
