// Interchange form of a translation unit.
//
// The host front-end hands over a nested tree (children inline, callees and
// parameters by name). `SourceUnit::lower` moves it into the arena form the
// instrumentation engine works on, `TranslationUnit::raise` goes back.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::{
    Callee, DeclId, DeclRef, Directive, ExternDecl, FunctionDecl, Item, Literal, Location, Node,
    NodeId, Param, TranslationUnit, TypeDescriptor,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceUnit {
    pub file: String,
    pub items: Vec<SourceItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDirective {
    pub text: String,
    #[serde(default)]
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum SourceItem {
    Extern {
        name: String,
        #[serde(default)]
        params: Vec<Param>,
        #[serde(default)]
        return_type: TypeDescriptor,
        #[serde(default)]
        variadic: bool,
    },
    Function {
        name: String,
        #[serde(default)]
        params: Vec<Param>,
        #[serde(default)]
        return_type: TypeDescriptor,
        body: SourceNode,
        #[serde(default)]
        directives: Vec<SourceDirective>,
        #[serde(default)]
        location: Location,
    },
    Directive(SourceDirective),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceNode {
    Sequence {
        stmts: Vec<SourceNode>,
    },
    Scope {
        body: Box<SourceNode>,
    },
    Conditional {
        scrutinee: Box<SourceNode>,
        branches: Vec<SourceNode>,
    },
    Return {
        #[serde(default)]
        value: Option<Box<SourceNode>>,
    },
    Call {
        callee: String,
        #[serde(default)]
        args: Vec<SourceNode>,
    },
    Literal {
        value: Literal,
    },
    Param {
        name: String,
    },
    Local {
        name: String,
    },
    Bind {
        name: String,
        value: Box<SourceNode>,
    },
    Opaque {
        text: String,
        #[serde(default)]
        pure: bool,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LowerError {
    #[error("function `{function}` refers to unknown parameter `{name}`")]
    UnknownParam { function: String, name: String },

    #[error("function `{0}` is defined more than once")]
    DuplicateFunction(String),
}

impl SourceUnit {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Build the arena form. Callee names resolve to `extern` items declared
    /// earlier in the file; anything else stays a named callee.
    pub fn lower(&self) -> Result<TranslationUnit, LowerError> {
        let mut unit = TranslationUnit::new(self.file.clone());
        let mut externs: HashMap<String, DeclId> = HashMap::new();

        for item in &self.items {
            match item {
                SourceItem::Extern {
                    name,
                    params,
                    return_type,
                    variadic,
                } => {
                    let id = unit.push(Item::Extern(ExternDecl {
                        name: name.clone(),
                        params: params.clone(),
                        return_type: return_type.clone(),
                        variadic: *variadic,
                    }));
                    externs.insert(name.clone(), id);
                }
                SourceItem::Function {
                    name,
                    params,
                    return_type,
                    body,
                    directives,
                    location,
                } => {
                    if unit.function(name).is_some() {
                        return Err(LowerError::DuplicateFunction(name.clone()));
                    }
                    let body = Lowering {
                        ast: &mut unit.ast,
                        externs: &externs,
                        params,
                        function: name,
                    }
                    .lower(body)?;
                    unit.push(Item::Function(FunctionDecl {
                        name: name.clone(),
                        params: params.clone(),
                        return_type: return_type.clone(),
                        body,
                        location: *location,
                        directives: directives
                            .iter()
                            .map(|d| Directive {
                                text: d.text.clone(),
                                location: d.location,
                            })
                            .collect(),
                    }));
                }
                SourceItem::Directive(d) => {
                    unit.push(Item::Directive(Directive {
                        text: d.text.clone(),
                        location: d.location,
                    }));
                }
            }
        }

        Ok(unit)
    }
}

struct Lowering<'a> {
    ast: &'a mut crate::Ast,
    externs: &'a HashMap<String, DeclId>,
    params: &'a [Param],
    function: &'a str,
}

impl Lowering<'_> {
    fn lower(&mut self, node: &SourceNode) -> Result<NodeId, LowerError> {
        let lowered = match node {
            SourceNode::Sequence { stmts } => {
                let ids = stmts
                    .iter()
                    .map(|stmt| self.lower(stmt))
                    .collect::<Result<Vec<_>, _>>()?;
                Node::Sequence(ids)
            }
            SourceNode::Scope { body } => Node::Scope(self.lower(body)?),
            SourceNode::Conditional {
                scrutinee,
                branches,
            } => {
                let scrutinee = self.lower(scrutinee)?;
                let branches = branches
                    .iter()
                    .map(|branch| self.lower(branch))
                    .collect::<Result<Vec<_>, _>>()?;
                Node::Conditional {
                    scrutinee,
                    branches,
                }
            }
            SourceNode::Return { value } => {
                let value = match value {
                    Some(value) => Some(self.lower(value)?),
                    None => None,
                };
                Node::Return(value)
            }
            SourceNode::Call { callee, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.lower(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let callee = match self.externs.get(callee) {
                    Some(id) => Callee::Decl(*id),
                    None => Callee::Named(callee.clone()),
                };
                Node::Call { callee, args }
            }
            SourceNode::Literal { value } => Node::Literal(value.clone()),
            SourceNode::Param { name } => {
                let index = self
                    .params
                    .iter()
                    .position(|param| &param.name == name)
                    .ok_or_else(|| LowerError::UnknownParam {
                        function: self.function.to_string(),
                        name: name.clone(),
                    })?;
                Node::DeclRef(DeclRef::Param(index))
            }
            SourceNode::Local { name } => Node::DeclRef(DeclRef::Local(name.clone())),
            SourceNode::Bind { name, value } => Node::Bind {
                name: name.clone(),
                value: self.lower(value)?,
            },
            SourceNode::Opaque { text, pure } => Node::Opaque {
                text: text.clone(),
                pure: *pure,
            },
        };
        Ok(self.ast.alloc(lowered))
    }
}

impl TranslationUnit {
    /// Convert back to the nested interchange form. A node referenced from
    /// several places is written out at each of them.
    pub fn raise(&self) -> SourceUnit {
        let items = self
            .items
            .iter()
            .map(|item| match item {
                Item::Extern(decl) => SourceItem::Extern {
                    name: decl.name.clone(),
                    params: decl.params.clone(),
                    return_type: decl.return_type.clone(),
                    variadic: decl.variadic,
                },
                Item::Function(func) => SourceItem::Function {
                    name: func.name.clone(),
                    params: func.params.clone(),
                    return_type: func.return_type.clone(),
                    body: self.raise_node(func.body, &func.params),
                    directives: func
                        .directives
                        .iter()
                        .map(|d| SourceDirective {
                            text: d.text.clone(),
                            location: d.location,
                        })
                        .collect(),
                    location: func.location,
                },
                Item::Directive(d) => SourceItem::Directive(SourceDirective {
                    text: d.text.clone(),
                    location: d.location,
                }),
            })
            .collect();

        SourceUnit {
            file: self.file.clone(),
            items,
        }
    }

    fn raise_node(&self, id: NodeId, params: &[Param]) -> SourceNode {
        let Some(node) = self.ast.get(id) else {
            return SourceNode::Opaque {
                text: format!("<dangling {}>", id),
                pure: false,
            };
        };
        match node {
            Node::Sequence(stmts) => SourceNode::Sequence {
                stmts: stmts.iter().map(|s| self.raise_node(*s, params)).collect(),
            },
            Node::Scope(body) => SourceNode::Scope {
                body: Box::new(self.raise_node(*body, params)),
            },
            Node::Conditional {
                scrutinee,
                branches,
            } => SourceNode::Conditional {
                scrutinee: Box::new(self.raise_node(*scrutinee, params)),
                branches: branches
                    .iter()
                    .map(|b| self.raise_node(*b, params))
                    .collect(),
            },
            Node::Return(value) => SourceNode::Return {
                value: value.map(|v| Box::new(self.raise_node(v, params))),
            },
            Node::Call { callee, args } => SourceNode::Call {
                callee: match callee {
                    Callee::Decl(decl) => self.decl_name(*decl).unwrap_or("<unknown>").to_string(),
                    Callee::Named(name) => name.clone(),
                },
                args: args.iter().map(|a| self.raise_node(*a, params)).collect(),
            },
            Node::Literal(value) => SourceNode::Literal {
                value: value.clone(),
            },
            Node::DeclRef(DeclRef::Param(index)) => SourceNode::Param {
                name: params
                    .get(*index)
                    .map_or_else(|| format!("<param {}>", index), |p| p.name.clone()),
            },
            Node::DeclRef(DeclRef::Local(name)) => SourceNode::Local { name: name.clone() },
            Node::Bind { name, value } => SourceNode::Bind {
                name: name.clone(),
                value: Box::new(self.raise_node(*value, params)),
            },
            Node::Opaque { text, pure } => SourceNode::Opaque {
                text: text.clone(),
                pure: *pure,
            },
        }
    }
}
