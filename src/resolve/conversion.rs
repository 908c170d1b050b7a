use std::sync::Arc;

use super::ExprType;
use crate::typedb::{primitive_rank, DBType, TypeDatabase, TypeKind};

/// How a value of one type reaches a slot of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    /// Same type.
    Identity,
    /// Accepted without a cast: upcasts, numeric conversions, enum to
    /// integer and `nullptr` to an object handle.
    Implicit,
    /// Only valid through `Cast<T>()`: a downcast along the class hierarchy.
    Cast,
    Incompatible,
}

/// Classify assigning `from` to a slot of type `to`. `None` when the source
/// type is unknown.
pub fn classify_conversion(db: &TypeDatabase, from: &ExprType, to: &Arc<DBType>) -> Option<Conversion> {
    let from = match from {
        ExprType::Unknown => return None,
        ExprType::Nullptr => {
            return Some(if is_handle_type(to) { Conversion::Implicit } else { Conversion::Incompatible });
        }
        ExprType::Type(from) => from,
    };

    if from.typename == to.typename {
        return Some(Conversion::Identity);
    }
    if from.is_primitive() || to.is_primitive() {
        return Some(primitive_conversion(from, to));
    }
    if from.is_struct() || to.is_struct() || from.is_enum() || to.is_enum() {
        return Some(Conversion::Incompatible);
    }
    if from.inherits_from(db, &to.typename) {
        return Some(Conversion::Implicit);
    }
    if to.inherits_from(db, &from.typename) {
        return Some(Conversion::Cast);
    }
    Some(Conversion::Incompatible)
}

fn is_handle_type(ty: &DBType) -> bool {
    matches!(ty.kind, TypeKind::Class | TypeKind::Delegate | TypeKind::Event)
}

fn primitive_conversion(from: &DBType, to: &DBType) -> Conversion {
    let numeric = |ty: &DBType| primitive_rank(&ty.typename).filter(|rank| *rank > 0).is_some();
    match (from.kind, to.kind) {
        (TypeKind::Primitive, TypeKind::Primitive) if numeric(from) && numeric(to) => Conversion::Implicit,
        (TypeKind::Enum, TypeKind::Primitive) if numeric(to) => Conversion::Implicit,
        _ => Conversion::Incompatible,
    }
}
