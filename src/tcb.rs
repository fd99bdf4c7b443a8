//! Holds the [`Tcb`] type and the [`ThreadKind`] flag

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::{Heap, StackBlock};

/// What sort of thread a stack is for
///
/// In a protected build this decides which heap the stack comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ThreadKind {
    /// Normal user task
    Task,
    /// User pthread
    Pthread,
    /// Kernel thread
    Kernel,
}

/// The stack-related parts of a thread control block
///
/// The TCB owns its stack block exclusively: dropping the TCB releases the
/// stack. If TLS is enabled, the stack header points back at the TCB, so the
/// TCB must not move while it has a stack attached.
pub struct Tcb<'h, H: Heap> {
    /// The memory backing the stack, if any
    pub(crate) stack_alloc: Option<StackBlock<'h, H>>,
    /// The initial stack pointer
    pub(crate) adj_stack_ptr: *mut u32,
    /// Usable stack size, from the block base up to and including `adj_stack_ptr`
    pub(crate) adj_stack_size: usize,
}

impl<'h, H: Heap> Tcb<'h, H> {
    /// Make a TCB with no stack attached
    pub const fn new() -> Tcb<'h, H> {
        Tcb {
            stack_alloc: None,
            adj_stack_ptr: core::ptr::null_mut(),
            adj_stack_size: 0,
        }
    }

    /// Base of the attached stack block, or null if there isn't one
    pub fn stack_alloc_ptr(&self) -> *mut u8 {
        self.stack_alloc
            .as_ref()
            .map_or(core::ptr::null_mut(), |block| block.base().as_ptr())
    }

    /// The value the context switch will load into the stack pointer
    pub fn adj_stack_ptr(&self) -> *mut u32 {
        self.adj_stack_ptr
    }

    /// The usable stack size in bytes, after alignment
    pub fn adj_stack_size(&self) -> usize {
        self.adj_stack_size
    }

    /// The attached stack block, if any
    pub fn stack(&self) -> Option<&StackBlock<'h, H>> {
        self.stack_alloc.as_ref()
    }

    /// Does this TCB have a stack?
    pub fn has_stack(&self) -> bool {
        self.stack_alloc.is_some()
    }
}

impl<H: Heap> Default for Tcb<'_, H> {
    fn default() -> Self {
        Tcb::new()
    }
}

impl<H: Heap> core::fmt::Debug for Tcb<'_, H> {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fmt.debug_struct("Tcb")
            .field("stack_alloc", &self.stack_alloc)
            .field("adj_stack_ptr", &self.adj_stack_ptr)
            .field("adj_stack_size", &self.adj_stack_size)
            .finish()
    }
}

// End of File
