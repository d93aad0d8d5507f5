//! Host-resident array storage.
//!
//! ## Purpose
//!
//! This module provides [`ArrayStore`], the owner of the three equal-length
//! benchmark arrays `a`, `b` and `c`. Host backends keep one store for the
//! lifetime of an engine; the store is released when the engine drops.
//!
//! ## Design notes
//!
//! * **Fallible allocation**: Buffers are reserved with `try_reserve_exact`
//!   so an oversized request surfaces as `StreamError::Allocation` instead of
//!   aborting the process.
//! * **Disjoint borrows**: [`ArrayStore::split_mut`] hands out three mutable
//!   slices at once so kernels can read two arrays while writing the third.
//! * **Fixed length**: There is no resize method; N is chosen at allocation.
//!
//! ## Invariants
//!
//! * `a.len() == b.len() == c.len() == N` for the lifetime of the store.
//! * `N > 0`.
//!
//! ## Non-goals
//!
//! * Device-resident or unified memory (owned by the device backends).
//! * Alignment tuning.

// External dependencies
use core::mem::size_of;

// Internal dependencies
use crate::primitives::element::StreamFloat;
use crate::primitives::errors::StreamError;

/// Exclusive owner of the three benchmark arrays.
///
/// Not `Clone`; the buffers are released exactly once, when the store drops.
#[derive(Debug)]
pub struct ArrayStore<T> {
    a: Vec<T>,
    b: Vec<T>,
    c: Vec<T>,
}

impl<T: StreamFloat> ArrayStore<T> {
    /// Allocate three zero-filled arrays of `array_size` elements.
    pub fn allocate(array_size: usize) -> Result<Self, StreamError> {
        if array_size == 0 {
            return Err(StreamError::InvalidArraySize(array_size));
        }

        Ok(Self {
            a: Self::allocate_one("a", array_size)?,
            b: Self::allocate_one("b", array_size)?,
            c: Self::allocate_one("c", array_size)?,
        })
    }

    fn allocate_one(array: &'static str, n: usize) -> Result<Vec<T>, StreamError> {
        let requested_bytes = n.saturating_mul(size_of::<T>());
        let mut buf = Vec::new();
        buf.try_reserve_exact(n).map_err(|_| StreamError::Allocation {
            array,
            requested_bytes,
        })?;
        buf.resize(n, T::zero());
        Ok(buf)
    }

    /// Number of elements per array.
    #[inline]
    pub fn len(&self) -> usize {
        self.a.len()
    }

    /// Always false; an allocated store holds at least one element.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// Total bytes held by the three arrays.
    pub fn total_bytes(&self) -> usize {
        3 * self.len() * size_of::<T>()
    }

    /// Shared view of `a`.
    #[inline]
    pub fn a(&self) -> &[T] {
        &self.a
    }

    /// Shared view of `b`.
    #[inline]
    pub fn b(&self) -> &[T] {
        &self.b
    }

    /// Shared view of `c`.
    #[inline]
    pub fn c(&self) -> &[T] {
        &self.c
    }

    /// Mutable views of `(a, b, c)` at once.
    #[inline]
    pub fn split_mut(&mut self) -> (&mut [T], &mut [T], &mut [T]) {
        (&mut self.a, &mut self.b, &mut self.c)
    }

    /// Set every element of each array to the given value.
    pub fn fill(&mut self, init_a: T, init_b: T, init_c: T) {
        self.a.fill(init_a);
        self.b.fill(init_b);
        self.c.fill(init_c);
    }

    /// Copy the arrays into caller-provided host buffers.
    ///
    /// Every destination is length-checked before anything is written.
    pub fn read_into(&self, a: &mut [T], b: &mut [T], c: &mut [T]) -> Result<(), StreamError> {
        check_destination("a", self.len(), a.len())?;
        check_destination("b", self.len(), b.len())?;
        check_destination("c", self.len(), c.len())?;

        a.copy_from_slice(&self.a);
        b.copy_from_slice(&self.b);
        c.copy_from_slice(&self.c);
        Ok(())
    }
}

/// Fail with `SizeMismatch` unless a destination holds exactly `expected` elements.
pub fn check_destination(
    array: &'static str,
    expected: usize,
    got: usize,
) -> Result<(), StreamError> {
    if expected != got {
        return Err(StreamError::SizeMismatch {
            array,
            expected,
            got,
        });
    }
    Ok(())
}
