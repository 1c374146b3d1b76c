//! Purpose: Reinterpret engine nodes as `Compact` values in place.
//! Exports: `node`, `node_mut`, `nodes`, `nodes_mut`.
//! Role: The only module in the crate that contains `unsafe`.
//! Invariants: `Compact` is `#[repr(transparent)]` over `OwnedValue`; size and alignment are
//! asserted at compile time next to the type.
//! Invariants: Casts keep the lifetime and mutability of the borrow they are given.
use simd_json::OwnedValue;

use super::Compact;

pub(super) fn node(value: &OwnedValue) -> &Compact {
    // SAFETY: `Compact` is a transparent wrapper around `OwnedValue`.
    unsafe { &*(value as *const OwnedValue).cast::<Compact>() }
}

pub(super) fn node_mut(value: &mut OwnedValue) -> &mut Compact {
    // SAFETY: as above; the unique borrow is carried over unchanged.
    unsafe { &mut *(value as *mut OwnedValue).cast::<Compact>() }
}

pub(super) fn nodes(values: &[OwnedValue]) -> &[Compact] {
    // SAFETY: identical layout means identical element stride.
    unsafe { std::slice::from_raw_parts(values.as_ptr().cast::<Compact>(), values.len()) }
}

pub(super) fn nodes_mut(values: &mut [OwnedValue]) -> &mut [Compact] {
    // SAFETY: as for `nodes`; the unique borrow is carried over unchanged.
    unsafe { std::slice::from_raw_parts_mut(values.as_mut_ptr().cast::<Compact>(), values.len()) }
}
