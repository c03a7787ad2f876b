//! Numeric-type normalization of caller-supplied vectors.
//!
//! The engine consumes 32-bit float components only. Callers hand over
//! one-dimensional arrays tagged with their runtime element type; arrays
//! that are already `float4` pass through without a copy, `int4` arrays are
//! widened into a fresh operation-scoped buffer, and everything else is
//! rejected before any allocation happens.

use crate::{Error, Result};
use std::borrow::Cow;
use std::fmt;

/// A normalized vector: either a borrowed view of caller storage (zero-copy
/// fast path) or an owned buffer scoped to the surrounding operation.
pub type VectorBuffer<'a> = Cow<'a, [f32]>;

/// Runtime element-type tag of a caller-supplied array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Float4,
    Int4,
    Float8,
    Text,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ElementType::Float4 => "float4",
            ElementType::Int4 => "int4",
            ElementType::Float8 => "float8",
            ElementType::Text => "text",
        })
    }
}

/// A one-dimensional caller-owned array with its runtime element type.
#[derive(Debug)]
pub enum SourceArray<'a> {
    Float4(&'a [f32]),
    Int4(&'a [i32]),
    Float8(&'a [f64]),
    Text(&'a [String]),
}

impl SourceArray<'_> {
    pub fn element_type(&self) -> ElementType {
        match self {
            SourceArray::Float4(_) => ElementType::Float4,
            SourceArray::Int4(_) => ElementType::Int4,
            SourceArray::Float8(_) => ElementType::Float8,
            SourceArray::Text(_) => ElementType::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SourceArray::Float4(v) => v.len(),
            SourceArray::Int4(v) => v.len(),
            SourceArray::Float8(v) => v.len(),
            SourceArray::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Coerce a caller array into canonical `f32` form.
///
/// `float4` input aliases the caller's storage: no allocation, caller-owned
/// lifetime. `int4` input is widened elementwise into an owned buffer of the
/// same length and order; the conversion is exact for the integer magnitudes
/// vectors carry in practice. Any other element type is fatal.
pub fn normalize(array: SourceArray<'_>) -> Result<VectorBuffer<'_>> {
    match array {
        SourceArray::Float4(values) => Ok(Cow::Borrowed(values)),
        SourceArray::Int4(values) => Ok(Cow::Owned(values.iter().map(|&v| v as f32).collect())),
        other => Err(Error::UnsupportedElementType(other.element_type())),
    }
}
