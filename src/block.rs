//! Holds the [`StackBlock`] type and methods

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use core::{alloc::Layout, marker::PhantomData, ptr::NonNull};

use crate::{Heap, StackError, ThreadKind};

/// Who gives the memory back when a block is dropped
enum Owner<'h, H> {
    /// The block came from this heap, with this layout
    Heap { heap: &'h H, layout: Layout },
    /// The caller lent us the memory and keeps it afterwards
    Borrowed(PhantomData<&'h mut [u8]>),
}

/// The memory behind a thread's stack
///
/// A thread control block holds exactly one of these while it has a stack.
/// Dropping the block releases it back to the heap it came from.
pub struct StackBlock<'h, H: Heap> {
    base: NonNull<u8>,
    size: usize,
    kind: ThreadKind,
    owner: Owner<'h, H>,
}

impl<'h, H: Heap> StackBlock<'h, H> {
    /// Allocate `size` bytes from `heap`, with the base aligned to `align`
    ///
    /// An `align` of one is a plain allocation.
    pub(crate) fn allocate(
        heap: &'h H,
        kind: ThreadKind,
        size: usize,
        align: usize,
    ) -> Result<StackBlock<'h, H>, StackError> {
        let layout =
            Layout::from_size_align(size, align).map_err(|_| StackError::AllocationFailed { size })?;
        let base = heap
            .allocate(layout)
            .ok_or(StackError::AllocationFailed { size })?;
        Ok(StackBlock {
            base,
            size,
            kind,
            owner: Owner::Heap { heap, layout },
        })
    }

    /// Wrap memory the caller already owns
    pub(crate) fn borrowed(stack: &'h mut [u8], kind: ThreadKind) -> StackBlock<'h, H> {
        StackBlock {
            size: stack.len(),
            base: NonNull::from(stack).cast(),
            kind,
            owner: Owner::Borrowed(PhantomData),
        }
    }

    /// Lowest address of the block
    pub fn base(&self) -> NonNull<u8> {
        self.base
    }

    /// Size of the block in bytes, including any TLS header
    pub fn size(&self) -> usize {
        self.size
    }

    /// The kind of thread this block was made for
    pub fn kind(&self) -> ThreadKind {
        self.kind
    }

    /// Will dropping this block free it?
    pub fn is_heap_allocated(&self) -> bool {
        matches!(self.owner, Owner::Heap { .. })
    }
}

impl<H: Heap> Drop for StackBlock<'_, H> {
    fn drop(&mut self) {
        if let Owner::Heap { heap, layout } = self.owner {
            // SAFETY: the block came from this heap with this layout, and we're
            // the only owner
            unsafe { heap.free(self.base, layout) };
        }
    }
}

impl<H: Heap> core::fmt::Debug for StackBlock<'_, H> {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fmt.debug_struct("StackBlock")
            .field("base", &self.base)
            .field("size", &self.size)
            .field("kind", &self.kind)
            .field("heap_allocated", &self.is_heap_allocated())
            .finish()
    }
}

// End of File
