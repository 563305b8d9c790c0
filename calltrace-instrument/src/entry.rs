use calltrace_ast::{Ast, DeclId, DeclRef, FunctionDecl, Node, NodeId};

use crate::format::specifier_for;
use crate::synth::{make_call, Message};

/// Prepend a `Calling function` call and one `Param` call per parameter to the
/// function's body. Returns the body to install: the same id when the body
/// already was a sequence, a new sequence wrapping it otherwise.
pub fn instrument_entry(ast: &mut Ast, handle: DeclId, function: &FunctionDecl) -> NodeId {
    let mut calls = Vec::with_capacity(function.params.len() + 1);
    calls.push(make_call(ast, handle, &Message::Calling(&function.name), &[]));

    for (index, param) in function.params.iter().enumerate() {
        let specifier = specifier_for(&param.ty);
        let args = match specifier {
            Some(_) => vec![ast.alloc(Node::DeclRef(DeclRef::Param(index)))],
            None => Vec::new(),
        };
        let message = Message::Param {
            name: &param.name,
            specifier,
        };
        calls.push(make_call(ast, handle, &message, &args));
    }

    log::debug!(
        "prepending {} entry call(s) to `{}`",
        calls.len(),
        function.name
    );

    let body = function.body;
    match ast.statements_mut(body) {
        Some(stmts) => {
            stmts.splice(0..0, calls);
            body
        }
        None => {
            calls.push(body);
            ast.alloc(Node::Sequence(calls))
        }
    }
}
