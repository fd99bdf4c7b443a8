//! Holds the [`Heap`] trait and the [`Heaps`] selector

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use core::{alloc::Layout, ptr::NonNull};

use crate::ThreadKind;

/// A heap that thread stacks can be carved out of
///
/// The heap is responsible for its own locking. Stack creation may block on
/// it but does nothing else that waits.
pub trait Heap {
    /// Allocate a block matching `layout`
    ///
    /// Returns `None` if the heap is exhausted.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Give a block back to the heap
    ///
    /// # Safety
    ///
    /// `ptr` must have come from [`Heap::allocate`] on this heap with the same
    /// `layout`, and must not be used afterwards.
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout);
}

impl<H: Heap + ?Sized> Heap for &H {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).allocate(layout)
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: passed straight through from our caller
        unsafe { (**self).free(ptr, layout) }
    }
}

/// The heaps that thread stacks come from
///
/// In a flat build there is a single heap shared by kernel and user code. In
/// a protected build (the `kernel-heap` feature) kernel threads get their
/// stacks from protected kernel memory and everything else comes from memory
/// that user code can reach.
pub struct Heaps<'h, H> {
    user: &'h H,
    #[cfg(feature = "kernel-heap")]
    kernel: Option<&'h H>,
}

impl<'h, H: Heap> Heaps<'h, H> {
    /// One heap for everything
    pub const fn flat(heap: &'h H) -> Heaps<'h, H> {
        Heaps {
            user: heap,
            #[cfg(feature = "kernel-heap")]
            kernel: None,
        }
    }

    /// Separate kernel and user heaps
    #[cfg(feature = "kernel-heap")]
    pub const fn protected(kernel: &'h H, user: &'h H) -> Heaps<'h, H> {
        Heaps {
            user,
            kernel: Some(kernel),
        }
    }

    /// Pick the heap that stacks for this kind of thread come from
    pub fn select(&self, kind: ThreadKind) -> &'h H {
        match kind {
            #[cfg(feature = "kernel-heap")]
            ThreadKind::Kernel => self.kernel.unwrap_or(self.user),
            _ => self.user,
        }
    }
}

impl<H> Clone for Heaps<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for Heaps<'_, H> {}


// End of File
