//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**; they represent
/// concepts where identity does not matter (a quantity, a signature). To
/// "modify" one, build a new value. The trait bounds keep them cheap to copy,
/// comparable, and debuggable.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
