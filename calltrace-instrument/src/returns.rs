// Return-site instrumentation
//
// Walks a function body and places a `Result is <fmt>` call right before the
// reachable returns:
// - a scope delegates to its child
// - in a sequence, nested scopes and every branch of a conditional are
//   searched independently, and the first return found ends the search of
//   that sequence (later sibling returns are left alone)
// - a conditional branch that is a bare return becomes a two-statement sequence
// - a conditional branch that is itself a conditional (`else if`) is searched
//   branch by branch
// - a valueless return gets the label-only result call

use calltrace_ast::{Ast, DeclId, DeclRef, Node, NodeId, TypeDescriptor};

use crate::config::ReturnCapture;
use crate::format::specifier_for;
use crate::synth::{make_call, Message};

/// Prefix of the locals introduced by [`ReturnCapture::Temporary`]
pub const RESULT_TEMPORARY: &str = "__calltrace_result";

/// Instrument the returns under `body`. Returns how many sites received a call.
pub fn instrument_returns(
    ast: &mut Ast,
    handle: DeclId,
    body: NodeId,
    return_type: &TypeDescriptor,
    capture: ReturnCapture,
) -> usize {
    let specifier = specifier_for(return_type);
    let mut walker = ReturnWalker {
        ast,
        handle,
        message: Message::Result(specifier),
        with_value: specifier.is_some(),
        capture,
        temporaries: 0,
        sites: 0,
    };
    walker.visit(body);
    walker.sites
}

struct ReturnWalker<'a> {
    ast: &'a mut Ast,
    handle: DeclId,
    message: Message<'static>,
    with_value: bool,
    capture: ReturnCapture,
    temporaries: usize,
    sites: usize,
}

impl ReturnWalker<'_> {
    fn visit(&mut self, id: NodeId) {
        match &self.ast[id] {
            Node::Scope(inner) => {
                let inner = *inner;
                self.visit(inner);
            }
            Node::Sequence(_) => self.visit_sequence(id),
            Node::Conditional { .. } => self.visit_conditional(id),
            _ => {}
        }
    }

    fn visit_conditional(&mut self, conditional: NodeId) {
        let Node::Conditional { branches, .. } = &self.ast[conditional] else {
            return;
        };
        let branches = branches.clone();
        for (position, branch) in branches.into_iter().enumerate() {
            self.visit_branch(conditional, position, branch);
        }
    }

    fn visit_sequence(&mut self, seq: NodeId) {
        let mut index = 0;
        while let Some(stmt) = self.ast.statements(seq).and_then(|s| s.get(index).copied()) {
            match &self.ast[stmt] {
                Node::Scope(_) => self.visit(stmt),
                Node::Return(value) => {
                    let value = *value;
                    let before = self.instrument_site(stmt, value);
                    if let Some(stmts) = self.ast.statements_mut(seq) {
                        stmts.splice(index..index, before);
                    }
                    return;
                }
                Node::Conditional { .. } => self.visit_conditional(stmt),
                _ => {}
            }
            index += 1;
        }
    }

    fn visit_branch(&mut self, conditional: NodeId, position: usize, branch: NodeId) {
        let Node::Return(value) = self.ast[branch] else {
            self.visit(branch);
            return;
        };

        let mut stmts = self.instrument_site(branch, value);
        stmts.push(branch);
        let wrapped = self.ast.alloc(Node::Sequence(stmts));
        if let Node::Conditional { branches, .. } = &mut self.ast[conditional] {
            if let Some(slot) = branches.get_mut(position) {
                *slot = wrapped;
            }
        }
    }

    /// Statements to place before the return at `ret`
    fn instrument_site(&mut self, ret: NodeId, value: Option<NodeId>) -> Vec<NodeId> {
        self.sites += 1;

        let value = match value {
            Some(value) if self.with_value => value,
            _ => {
                log::debug!("return {} gets a label-only result call", ret);
                let label = Message::Result(None);
                return vec![make_call(self.ast, self.handle, &label, &[])];
            }
        };

        if self.capture == ReturnCapture::Temporary && !self.ast.is_pure(value) {
            let name = format!("{}_{}", RESULT_TEMPORARY, self.temporaries);
            self.temporaries += 1;
            log::debug!("binding return value {} to `{}`", value, name);

            let bind = self.ast.alloc(Node::Bind {
                name: name.clone(),
                value,
            });
            let printed = self.ast.alloc(Node::DeclRef(DeclRef::Local(name.clone())));
            let returned = self.ast.alloc(Node::DeclRef(DeclRef::Local(name)));
            self.ast.replace(ret, Node::Return(Some(returned)));
            let call = make_call(self.ast, self.handle, &self.message, &[printed]);
            return vec![bind, call];
        }

        log::debug!("return {} shares value {} with its result call", ret, value);
        vec![make_call(self.ast, self.handle, &self.message, &[value])]
    }
}
