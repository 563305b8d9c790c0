use calltrace_ast::TypeDescriptor;

/// printf conversion for a value of type `ty`, `None` when the value is not
/// printed (void and every type without a conversion).
pub fn specifier_for(ty: &TypeDescriptor) -> Option<&'static str> {
    match ty {
        TypeDescriptor::Char => Some("%c"),
        TypeDescriptor::CharPointer => Some("%s"),
        TypeDescriptor::Int => Some("%d"),
        TypeDescriptor::Real => Some("%f"),
        TypeDescriptor::Void | TypeDescriptor::Other(_) => None,
    }
}
