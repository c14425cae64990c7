//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity: two instances with the same attributes are
/// the same value. They are immutable; "modifying" one means building a new one.
///
/// - **Value object**: a reference range `{ min: 7.5, max: 8.5, unit: "pH" }`
/// - **Entity**: a pond, identified by its `PondId` regardless of its phase
///
/// Static configuration tables are built from value objects so they can be
/// shared by reference across threads after process start.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
