// Print-call construction
//
// Every injected call is `printf("\033[1;32m<message>\033[0m\n", args...)`.

use std::fmt;

use calltrace_ast::{Ast, Callee, DeclId, Node, NodeId};

/// Bright green on
pub const COLOR_PREFIX: &str = "\x1b[1;32m";
/// Attributes off, then newline
pub const COLOR_SUFFIX: &str = "\x1b[0m\n";

/// Text of one injected call, before colorizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message<'a> {
    Calling(&'a str),
    Param {
        name: &'a str,
        specifier: Option<&'a str>,
    },
    Result(Option<&'a str>),
    VoidReturn,
}

impl fmt::Display for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Calling(name) => write!(f, "Calling function: {}", name),
            Message::Param { name, specifier } => {
                write!(f, "Param: {}", name)?;
                if let Some(specifier) = specifier {
                    write!(f, "; Value: {}", specifier)?;
                }
                Ok(())
            }
            // Unprintable return types still announce the result
            Message::Result(specifier) => write!(f, "Result is {}", specifier.unwrap_or("")),
            Message::VoidReturn => write!(f, "Function returns void type"),
        }
    }
}

/// Wrap `message` in the color escape sequence and terminate the line
pub fn colorize(message: &str) -> String {
    format!("{}{}{}", COLOR_PREFIX, message, COLOR_SUFFIX)
}

/// Allocate a call of `handle` with the colorized `message` as format string
/// followed by `args`. The call is not linked anywhere; splicing is up to the
/// caller.
pub fn make_call(ast: &mut Ast, handle: DeclId, message: &Message<'_>, args: &[NodeId]) -> NodeId {
    let format = ast.alloc(Node::string(colorize(&message.to_string())));
    let mut call_args = Vec::with_capacity(args.len() + 1);
    call_args.push(format);
    call_args.extend_from_slice(args);
    ast.alloc(Node::Call {
        callee: Callee::Decl(handle),
        args: call_args,
    })
}
