use serde::{Deserialize, Serialize};

pub mod arena;
pub mod source;

pub use arena::{Ast, NodeId};
pub use source::{LowerError, SourceDirective, SourceItem, SourceNode, SourceUnit};

/// Static type of a parameter or return value, as far as instrumentation cares
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDescriptor {
    #[default]
    Void,
    Char,
    Int,
    Real,
    /// `char *` and friends
    CharPointer,
    /// Anything else, spelled the way the host spells it
    Other(String),
}

impl TypeDescriptor {
    pub fn is_void(&self) -> bool {
        matches!(self, TypeDescriptor::Void)
    }
}

impl std::fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeDescriptor::Void => write!(f, "void"),
            TypeDescriptor::Char => write!(f, "char"),
            TypeDescriptor::Int => write!(f, "int"),
            TypeDescriptor::Real => write!(f, "double"),
            TypeDescriptor::CharPointer => write!(f, "char *"),
            TypeDescriptor::Other(spelling) => write!(f, "{}", spelling),
        }
    }
}

/// Source position of an item (1-based; 0 means unknown)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeDescriptor,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Str(String),
    Int(i64),
    Real(f64),
    Char(char),
}

/// Reference to a named value without copying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclRef {
    /// Parameter of the enclosing function, by position
    Param(usize),
    /// Local introduced by a `Bind`
    Local(String),
}

/// Index of an item in its [`TranslationUnit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Callee {
    /// Resolved external declaration
    Decl(DeclId),
    /// Callee the host left unresolved
    Named(String),
}

/// AST node. Children are arena ids, so a subtree can be re-referenced from
/// a new parent without being copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Statements sharing one lexical level
    Sequence(Vec<NodeId>),
    /// Nested lexical block
    Scope(NodeId),
    /// if/else (two branches) or switch-like arms (more)
    Conditional {
        scrutinee: NodeId,
        branches: Vec<NodeId>,
    },
    Return(Option<NodeId>),
    Call {
        callee: Callee,
        args: Vec<NodeId>,
    },
    Literal(Literal),
    DeclRef(DeclRef),
    /// Local binding: `name = value;`
    Bind {
        name: String,
        value: NodeId,
    },
    /// Any other host construct, carried through verbatim
    Opaque {
        text: String,
        pure: bool,
    },
}

impl Node {
    pub fn opaque(text: impl Into<String>, pure: bool) -> Self {
        Node::Opaque {
            text: text.into(),
            pure,
        }
    }

    pub fn string(text: impl Into<String>) -> Self {
        Node::Literal(Literal::Str(text.into()))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Sequence(_) => "sequence",
            Node::Scope(_) => "scope",
            Node::Conditional { .. } => "conditional",
            Node::Return(_) => "return",
            Node::Call { .. } => "call",
            Node::Literal(_) => "literal",
            Node::DeclRef(_) => "decl_ref",
            Node::Bind { .. } => "bind",
            Node::Opaque { .. } => "opaque",
        }
    }
}

/// Directive found in the source, e.g. `#pragma calltrace debug`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub text: String,
    pub location: Location,
}

/// Function definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TypeDescriptor,
    pub body: NodeId,
    pub location: Location,
    /// Directives that appeared lexically inside the body
    pub directives: Vec<Directive>,
}

/// External function declaration (prototype only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TypeDescriptor,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Item {
    Extern(ExternDecl),
    Function(FunctionDecl),
    Directive(Directive),
}

/// One source file after parsing: the node arena plus its items in source order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub file: String,
    pub ast: Ast,
    pub items: Vec<Item>,
}

impl TranslationUnit {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ast: Ast::new(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: Item) -> DeclId {
        let id = DeclId(self.items.len());
        self.items.push(item);
        id
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(func) => Some(func),
            _ => None,
        })
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions().find(|func| func.name == name)
    }

    /// Item index of the function called `name`
    pub fn function_index(&self, name: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| matches!(item, Item::Function(func) if func.name == name))
    }

    pub fn function_names(&self) -> Vec<String> {
        self.functions().map(|func| func.name.clone()).collect()
    }

    /// Name of the declaration an id refers to
    pub fn decl_name(&self, id: DeclId) -> Option<&str> {
        match self.items.get(id.0)? {
            Item::Extern(decl) => Some(&decl.name),
            Item::Function(func) => Some(&func.name),
            Item::Directive(_) => None,
        }
    }

    /// Find an external declaration called `name` among the first `before` items
    pub fn lookup_extern(&self, name: &str, before: usize) -> Option<DeclId> {
        self.items
            .iter()
            .take(before)
            .position(|item| matches!(item, Item::Extern(decl) if decl.name == name))
            .map(DeclId)
    }
}
