use std::collections::HashMap;

use calltrace_ast::{DeclId, Item, TranslationUnit};

use crate::error::InstrumentError;

/// Output function every injected call targets
pub const OUTPUT_FUNCTION: &str = "printf";

/// Names visible at the point where a function is being instrumented
pub trait DeclarationScope {
    fn lookup(&self, name: &str) -> Option<DeclId>;

    /// Whether `id` is a declaration of `name` this scope can see
    fn is_visible(&self, name: &str, id: DeclId) -> bool;
}

/// A translation unit as seen from one of its items: only declarations that
/// come earlier in source order are visible.
pub struct UnitScope<'a> {
    unit: &'a TranslationUnit,
    before: usize,
}

impl<'a> UnitScope<'a> {
    pub fn new(unit: &'a TranslationUnit, before: usize) -> Self {
        Self { unit, before }
    }
}

impl DeclarationScope for UnitScope<'_> {
    fn lookup(&self, name: &str) -> Option<DeclId> {
        self.unit.lookup_extern(name, self.before)
    }

    fn is_visible(&self, name: &str, id: DeclId) -> bool {
        id.0 < self.before
            && matches!(self.unit.items.get(id.0), Some(Item::Extern(decl)) if decl.name == name)
    }
}

/// Looks up declarations the injected calls depend on. A name is looked up
/// once per run; later requests reuse the handle when their scope can see it.
#[derive(Debug, Default)]
pub struct DeclarationResolver {
    resolved: HashMap<String, DeclId>,
}

impl DeclarationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve<S>(
        &mut self,
        scope: &S,
        name: &str,
        function: &str,
    ) -> Result<DeclId, InstrumentError>
    where
        S: DeclarationScope + ?Sized,
    {
        if let Some(&handle) = self.resolved.get(name) {
            if scope.is_visible(name, handle) {
                return Ok(handle);
            }
            log::debug!("`{}` at {:?} is not visible from `{}`", name, handle, function);
        }

        let handle = scope
            .lookup(name)
            .ok_or_else(|| InstrumentError::MissingDependency {
                name: name.to_string(),
                function: function.to_string(),
            })?;
        log::debug!("resolved `{}` to declaration {:?}", name, handle);
        self.resolved.insert(name.to_string(), handle);
        Ok(handle)
    }

    pub fn is_resolved(&self, name: &str) -> bool {
        self.resolved.contains_key(name)
    }
}
