//! Equality policies
//!
//! A cursor groups runs of consecutive items that its policy considers
//! equal. A run counts as one slot toward the page size, but every item in
//! it is produced.
//!
//! Policies only need to be well-behaved across neighbouring items:
//! reflexive and symmetric, and transitive along a run.

use crate::types::lookup_path;
use serde_json::Value;
use std::fmt;

/// Decides whether two neighbouring items belong to the same group
pub trait EqualityPolicy<T: ?Sized> {
    /// Returns true when `b` continues the group that `a` belongs to
    fn equals(&self, a: &T, b: &T) -> bool;
}

impl<T: ?Sized, F> EqualityPolicy<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn equals(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

/// Groups items that compare equal with `PartialEq`
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueEquality;

impl<T: PartialEq + ?Sized> EqualityPolicy<T> for ValueEquality {
    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Groups items whose extracted keys are equal
///
/// ```
/// use query_pager::equality::{EqualityPolicy, KeyEquality};
///
/// // All versions of a package form one group.
/// let by_id = KeyEquality::new(|pkg: &(String, u32)| pkg.0.clone());
/// let serde_1 = ("serde".to_string(), 1);
/// let serde_2 = ("serde".to_string(), 2);
/// let tokio_1 = ("tokio".to_string(), 1);
/// assert!(by_id.equals(&serde_1, &serde_2));
/// assert!(!by_id.equals(&serde_1, &tokio_1));
/// ```
#[derive(Clone, Copy)]
pub struct KeyEquality<F> {
    key: F,
}

impl<F> KeyEquality<F> {
    /// Create a policy from a key extractor
    pub fn new(key: F) -> Self {
        Self { key }
    }
}

impl<F> fmt::Debug for KeyEquality<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyEquality").finish_non_exhaustive()
    }
}

impl<T, K, F> EqualityPolicy<T> for KeyEquality<F>
where
    F: Fn(&T) -> K,
    K: PartialEq,
{
    fn equals(&self, a: &T, b: &T) -> bool {
        (self.key)(a) == (self.key)(b)
    }
}

/// Groups JSON records that share the value at a dotted field path
///
/// Records missing the field never join another record's group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEquality {
    path: String,
}

impl FieldEquality {
    /// Create a policy comparing the value at `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// The field path being compared
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl EqualityPolicy<Value> for FieldEquality {
    fn equals(&self, a: &Value, b: &Value) -> bool {
        match (lookup_path(a, &self.path), lookup_path(b, &self.path)) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }
}

/// Policy used by the CLI: whole-record equality or a field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonEquality {
    /// Whole records must be equal
    Whole,
    /// Records are compared on one field
    Field(FieldEquality),
}

impl JsonEquality {
    /// Build from an optional `group_by` path
    pub fn from_group_by(group_by: Option<&str>) -> Self {
        match group_by {
            Some(path) => Self::Field(FieldEquality::new(path)),
            None => Self::Whole,
        }
    }
}

impl EqualityPolicy<Value> for JsonEquality {
    fn equals(&self, a: &Value, b: &Value) -> bool {
        match self {
            Self::Whole => ValueEquality.equals(a, b),
            Self::Field(field) => field.equals(a, b),
        }
    }
}
