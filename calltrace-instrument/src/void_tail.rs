use calltrace_ast::{Ast, DeclId, Node, NodeId};

use crate::synth::{make_call, Message};

/// Append `Function returns void type` to the body. Only meaningful for
/// functions returning void; early returns do not reach the call.
pub fn instrument_void_tail(ast: &mut Ast, handle: DeclId, body: NodeId) -> NodeId {
    let call = make_call(ast, handle, &Message::VoidReturn, &[]);

    match ast.statements_mut(body) {
        Some(stmts) => {
            stmts.push(call);
            body
        }
        None => ast.alloc(Node::Sequence(vec![body, call])),
    }
}
