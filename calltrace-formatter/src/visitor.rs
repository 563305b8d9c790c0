// AST visitor that renders a translation unit as C-like source

use crate::config::{BraceStyle, Config};
use crate::rules::{brace_separator, char_literal, indent_string, real_literal, string_literal};
use calltrace_ast::*;

pub struct EmitVisitor<'a> {
    config: &'a Config,
    unit: &'a TranslationUnit,
    /// Parameters of the function being rendered
    params: &'a [Param],
    output: String,
    indent_level: usize,
}

impl<'a> EmitVisitor<'a> {
    pub fn new(config: &'a Config, unit: &'a TranslationUnit) -> Self {
        Self {
            config,
            unit,
            params: &[],
            output: String::new(),
            indent_level: 0,
        }
    }

    pub fn output(self) -> String {
        self.output
    }

    pub fn visit_unit(&mut self) {
        let unit = self.unit;
        let mut previous: Option<&Item> = None;

        for item in &unit.items {
            // Functions are set apart by a blank line
            let separate = matches!(item, Item::Function(_))
                || matches!(previous, Some(Item::Function(_)));
            if previous.is_some() && separate {
                self.write_line("");
            }
            self.visit_item(item);
            previous = Some(item);
        }
    }

    fn visit_item(&mut self, item: &'a Item) {
        match item {
            Item::Extern(decl) => self.visit_extern(decl),
            Item::Function(func) => self.visit_function(func),
            Item::Directive(directive) => self.visit_directive(directive),
        }
    }

    fn visit_extern(&mut self, decl: &ExternDecl) {
        self.write(&declarator(&decl.return_type, &decl.name));
        self.write("(");
        self.write(&parameter_list(&decl.params, decl.variadic));
        self.write_line(");");
    }

    fn visit_directive(&mut self, directive: &Directive) {
        self.write("#pragma ");
        self.write_line(&directive.text);
    }

    fn visit_function(&mut self, func: &'a FunctionDecl) {
        self.params = &func.params;

        self.write(&declarator(&func.return_type, &func.name));
        self.write("(");
        self.write(&parameter_list(&func.params, false));
        self.write(")");
        self.open_brace();

        self.indent_level += 1;
        for directive in &func.directives {
            self.visit_directive(directive);
        }
        self.visit_block_contents(func.body);
        self.indent_level -= 1;

        self.write_line("}");
        self.params = &[];
    }

    /// Write `{`, the statements of `id` and `}` (without a trailing newline).
    /// A scope is its own block, anything else becomes the single statement.
    fn visit_block(&mut self, id: NodeId, trailer: Option<&str>) {
        self.write_line("{");
        self.indent_level += 1;

        self.visit_block_contents(id);
        if let Some(trailer) = trailer {
            self.write_indent();
            self.write_line(trailer);
        }

        self.indent_level -= 1;
        self.write_indent();
        self.write("}");
    }

    fn visit_block_contents(&mut self, id: NodeId) {
        let body = match self.node(id) {
            Some(Node::Scope(inner)) => *inner,
            _ => id,
        };
        self.visit_statement(body);
    }

    fn visit_statement(&mut self, id: NodeId) {
        let Some(node) = self.node(id) else {
            self.write_indent();
            self.write_line(&format!("/* dangling {} */", id));
            return;
        };

        if let Node::Sequence(stmts) = node {
            for stmt in stmts {
                self.visit_statement(*stmt);
            }
            return;
        }

        self.write_indent();

        match node {
            Node::Scope(_) => {
                self.visit_block(id, None);
                self.write_line("");
            }
            Node::Conditional {
                scrutinee,
                branches,
            } => self.visit_conditional(*scrutinee, branches),
            Node::Return(value) => {
                self.write("return");
                if let Some(value) = value {
                    self.write(" ");
                    let value = self.expression(*value);
                    self.write(&value);
                }
                self.write_line(";");
            }
            Node::Bind { name, value } => {
                let value = self.expression(*value);
                self.write_line(&format!("__auto_type {} = {};", name, value));
            }
            _ => {
                let expr = self.expression(id);
                self.write(&expr);
                self.write_line(";");
            }
        }
    }

    fn visit_conditional(&mut self, scrutinee: NodeId, branches: &[NodeId]) {
        let condition = self.expression(scrutinee);

        match branches {
            [] => self.write_line(&format!("(void)({});", condition)),
            [then] => {
                self.write(&format!("if ({})", condition));
                self.open_brace_inline();
                self.visit_block(*then, None);
                self.write_line("");
            }
            [then, otherwise] => {
                self.write(&format!("if ({})", condition));
                self.open_brace_inline();
                self.visit_block(*then, None);
                match self.config.brace_style {
                    BraceStyle::SameLine => self.write(" else"),
                    BraceStyle::NextLine => {
                        self.write_line("");
                        self.write_indent();
                        self.write("else");
                    }
                }
                self.open_brace_inline();
                self.visit_block(*otherwise, None);
                self.write_line("");
            }
            arms => {
                self.write(&format!("switch ({})", condition));
                self.open_brace();
                self.indent_level += 1;
                let last = arms.len() - 1;
                for (index, arm) in arms.iter().enumerate() {
                    self.write_indent();
                    if index == last {
                        self.write("default:");
                    } else {
                        self.write(&format!("case {}:", index));
                    }
                    self.open_brace_inline();
                    self.visit_block(*arm, Some("break;"));
                    self.write_line("");
                }
                self.indent_level -= 1;
                self.write_indent();
                self.write_line("}");
            }
        }
    }

    /// Render an expression-position node
    fn expression(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return format!("/* dangling {} */", id);
        };

        match node {
            Node::Call { callee, args } => {
                let name = match callee {
                    Callee::Decl(decl) => self.unit.decl_name(*decl).unwrap_or("__unresolved"),
                    Callee::Named(name) => name.as_str(),
                };
                let args: Vec<String> = args.iter().map(|arg| self.expression(*arg)).collect();
                format!("{}({})", name, args.join(", "))
            }
            Node::Literal(Literal::Str(text)) => string_literal(text),
            Node::Literal(Literal::Int(value)) => value.to_string(),
            Node::Literal(Literal::Real(value)) => real_literal(*value),
            Node::Literal(Literal::Char(c)) => char_literal(*c),
            Node::DeclRef(DeclRef::Param(index)) => match self.params.get(*index) {
                Some(param) => param.name.clone(),
                None => format!("__param_{}", index),
            },
            Node::DeclRef(DeclRef::Local(name)) => name.clone(),
            Node::Opaque { text, .. } => text.clone(),
            Node::Bind { name, value } => format!("({} = {})", name, self.expression(*value)),
            other => format!("/* {} */", other.kind_name()),
        }
    }

    fn node(&self, id: NodeId) -> Option<&'a Node> {
        let unit = self.unit;
        unit.ast.get(id)
    }

    /// Brace of a top-level construct, followed by a newline
    fn open_brace(&mut self) {
        let separator = brace_separator(
            self.config.brace_style,
            self.indent_level,
            self.config.indent_size,
        );
        self.write(&separator);
        self.write_line("{");
    }

    /// Separator only; the block writes its own `{`
    fn open_brace_inline(&mut self) {
        let separator = brace_separator(
            self.config.brace_style,
            self.indent_level,
            self.config.indent_size,
        );
        self.write(&separator);
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_line(&mut self, s: &str) {
        self.output.push_str(s);
        self.output.push('\n');
    }

    fn write_indent(&mut self) {
        let indent = indent_string(self.indent_level, self.config.indent_size);
        self.write(&indent);
    }
}

/// `int x`, `char *s`
fn declarator(ty: &TypeDescriptor, name: &str) -> String {
    let ty = ty.to_string();
    if ty.ends_with('*') {
        format!("{}{}", ty, name)
    } else {
        format!("{} {}", ty, name)
    }
}

fn parameter_list(params: &[Param], variadic: bool) -> String {
    let mut parts: Vec<String> = params
        .iter()
        .map(|param| declarator(&param.ty, &param.name))
        .collect();
    if variadic {
        parts.push("...".to_string());
    }
    if parts.is_empty() {
        "void".to_string()
    } else {
        parts.join(", ")
    }
}
