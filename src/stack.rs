//! Holds the [`Stack`] type and methods

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use core::{
    cell::UnsafeCell,
    sync::atomic::{AtomicBool, Ordering},
};

/// Statically allocated stack storage, with the given size `LEN` bytes.
///
/// Use this for threads that exist before any heap does, such as the idle
/// thread, and attach it with [`StackCreator::use_stack`](crate::StackCreator::use_stack).
///
/// The value of `LEN` must be a multiple of 4, which is checked with an
/// assert.
///
/// We align stacks on 8-byte boundaries, as required by AAPCS. If you need
/// TLS, which needs the whole window alignment, wrap this in a type with a
/// bigger `repr(align)`.
#[repr(C, align(8))]
pub struct Stack<const LEN: usize> {
    /// The memory reserved for the stack
    contents: UnsafeCell<[u8; LEN]>,
    /// Has someone taken the memory yet?
    taken: AtomicBool,
}

impl<const LEN: usize> Stack<LEN> {
    /// Create a new stack
    pub const fn new() -> Self {
        assert!(LEN.is_multiple_of(4));
        Self {
            contents: UnsafeCell::new([0u8; LEN]),
            taken: AtomicBool::new(false),
        }
    }

    /// Take the stack memory, if nobody has yet
    pub fn take(&'static self) -> Option<&'static mut [u8]> {
        if self.taken.swap(true, Ordering::AcqRel) {
            None
        } else {
            // SAFETY: the flag means we only ever hand this out once
            let contents: &'static mut [u8; LEN] = unsafe { &mut *self.contents.get() };
            Some(contents.as_mut_slice())
        }
    }

    /// Access the stack through an exclusive borrow
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.contents.get_mut()
    }
}

/// SAFETY: Our stack object only hands out its contents once, so is
/// thread-safe despite containing an `UnsafeCell`.
unsafe impl<const LEN: usize> Sync for Stack<LEN> {}

impl<const LEN: usize> Default for Stack<LEN> {
    fn default() -> Self {
        Stack::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_only_once() {
        static STACK: Stack<64> = Stack::new();
        let stack = STACK.take().unwrap();
        assert_eq!(stack.len(), 64);
        assert_eq!(stack.as_ptr() as usize % 8, 0);
        assert!(STACK.take().is_none());
    }
}

// End of File
