use crate::module::Module;
use crate::span::Span;
use crate::typedb::TypeDatabase;

/// The concrete type an `auto` keyword stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoMaterialization {
    /// Replacement text for the keyword.
    pub typename: String,
    pub display_name: String,
    /// Absolute span of the `auto` keyword.
    pub keyword: Span,
}

/// `auto` declarations touching `[start, end]` whose inferred type is known
/// to the database. Reads the module's symbol list.
pub fn auto_materializations(module: &Module, db: &TypeDatabase, start: usize, end: usize) -> Vec<AutoMaterialization> {
    module
        .symbols_in_range(start, end)
        .filter(|symbol| symbol.is_auto)
        .filter_map(|symbol| {
            let ty = db.resolve_typename(&symbol.name)?;
            Some(AutoMaterialization {
                typename: symbol.name.clone(),
                display_name: ty.display_name().to_string(),
                keyword: symbol.span,
            })
        })
        .collect()
}
