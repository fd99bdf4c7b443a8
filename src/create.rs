//! Holds the [`StackCreator`] type, which attaches stacks to new threads

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::{
    Board, Heap, Heaps, LedEvent, StackBlock, StackConfig, StackError, StackGeometry, Tcb,
    ThreadKind, TlsInfo,
};

/// Creates and releases thread stacks
///
/// Owned by the task-creation code. It holds the heaps that stacks come from,
/// the stack configuration for this build, and the board hooks.
///
/// Nothing here locks. The caller must have exclusive access to any TCB it
/// passes in, which is the case while a thread is being constructed.
pub struct StackCreator<'h, H: Heap, B: Board = ()> {
    heaps: Heaps<'h, H>,
    config: StackConfig,
    board: B,
}

impl<'h, H: Heap> StackCreator<'h, H> {
    /// Build a stack creator with no board hooks
    pub const fn new(heaps: Heaps<'h, H>, config: StackConfig) -> StackCreator<'h, H> {
        StackCreator::with_board(heaps, config, ())
    }
}

impl<'h, H: Heap, B: Board> StackCreator<'h, H, B> {
    /// Build a stack creator that reports to the given board
    pub const fn with_board(
        heaps: Heaps<'h, H>,
        config: StackConfig,
        board: B,
    ) -> StackCreator<'h, H, B> {
        StackCreator {
            heaps,
            config,
            board,
        }
    }

    /// Get the configuration stacks are made with
    pub const fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Get the board hooks
    pub const fn board(&self) -> &B {
        &self.board
    }

    /// Allocate a stack for a new thread and attach it to the TCB
    ///
    /// At least `stack_size` bytes are usable by the thread, plus the TLS
    /// header if TLS is enabled. On success the TCB's initial stack pointer and
    /// usable size are set.
    ///
    /// If the TCB already has a stack of the same size, it is kept and set up
    /// again. A stack of any other size is released first.
    ///
    /// If allocation fails the stack fields are left as they were after that
    /// release, which for a fresh TCB means untouched. The other errors are
    /// reported before the TCB is looked at.
    pub fn create_stack(
        &self,
        tcb: &mut Tcb<'h, H>,
        stack_size: usize,
        kind: ThreadKind,
    ) -> Result<(), StackError> {
        let stack_size = self.config.effective_size(stack_size)?;

        // Blocks remember their exact allocation size, so a matching stack is
        // never mistaken for a different one because of alignment losses
        if tcb
            .stack_alloc
            .as_ref()
            .is_some_and(|block| block.size() != stack_size)
        {
            self.release_stack(tcb, kind);
        }

        let block = match tcb.stack_alloc.take() {
            Some(block) => {
                trace!("Reusing stack of {=usize} bytes", block.size());
                block
            }
            None => {
                let heap = self.heaps.select(kind);
                StackBlock::allocate(heap, kind, stack_size, self.config.block_align())
                    .inspect_err(|_| {
                        error!(
                            "ERROR: Failed to allocate stack, size {=usize}, {}",
                            stack_size,
                            kind
                        )
                    })?
            }
        };

        self.attach(tcb, block)
    }

    /// Attach a stack the caller already owns
    ///
    /// Used for threads whose stacks exist before any heap does, like the idle
    /// thread. The whole slice is used, and it is set up exactly like a stack
    /// from [`create_stack`](Self::create_stack). Dropping or releasing it
    /// does not free anything.
    ///
    /// With TLS enabled the slice must start on the TLS window boundary and
    /// fit inside the window.
    pub fn use_stack(
        &self,
        tcb: &mut Tcb<'h, H>,
        stack: &'h mut [u8],
        kind: ThreadKind,
    ) -> Result<(), StackError> {
        let size = stack.len();
        if let Some(tls) = self.config.tls {
            if size > tls.max_stack() {
                return Err(StackError::TlsOverflow {
                    size,
                    max: tls.max_stack(),
                });
            }
            let align = tls.stack_align();
            if !(stack.as_ptr() as usize).is_multiple_of(align) {
                return Err(StackError::Misaligned { align });
            }
        }
        if size < self.config.min_stack_size() {
            return Err(StackError::TooSmall { size });
        }

        if tcb.has_stack() {
            self.release_stack(tcb, kind);
        }

        self.attach(tcb, StackBlock::borrowed(stack, kind))
    }

    /// Release the TCB's stack, if it has one
    ///
    /// The stack goes back to the heap it came from. The TCB is left with no
    /// stack, a null stack pointer and zero size.
    pub fn release_stack(&self, tcb: &mut Tcb<'h, H>, kind: ThreadKind) {
        if let Some(block) = tcb.stack_alloc.take() {
            if block.kind() != kind {
                warn!("Stack made for {} released as {}", block.kind(), kind);
            }
            debug!(
                "Release stack @ 0x{=usize:08x}, {=usize} bytes",
                block.base().as_ptr() as usize,
                block.size()
            );
            drop(block);
        }
        tcb.adj_stack_ptr = core::ptr::null_mut();
        tcb.adj_stack_size = 0;
    }

    /// How many bytes of the TCB's stack have been used so far
    ///
    /// Only meaningful if coloration is enabled. Returns zero if the TCB has
    /// no stack.
    pub fn stack_used(&self, tcb: &Tcb<'h, H>) -> usize {
        let Some(block) = tcb.stack() else {
            return 0;
        };
        let header_size = self.config.header_size();
        let nbytes = tcb.adj_stack_size().saturating_sub(header_size);
        // SAFETY: the usable region above the header lies inside the block
        unsafe { crate::stack_used(block.base().as_ptr().add(header_size), nbytes) }
    }

    /// Set up a block and hand it to the TCB
    fn attach(&self, tcb: &mut Tcb<'h, H>, block: StackBlock<'h, H>) -> Result<(), StackError> {
        let header_size = self.config.header_size();
        let base = block.base().as_ptr();
        let geometry = StackGeometry::compute(
            base as usize,
            block.size(),
            self.config.alignment,
            header_size,
        )
        .ok_or(StackError::TooSmall { size: block.size() })?;

        if self.config.tls.is_some() {
            let owner = core::ptr::from_ref(tcb).cast::<()>();
            // SAFETY: the block is aligned to the TLS window and holds at
            // least the header, and nobody else has it
            unsafe { TlsInfo::init(base, owner) };
        }

        if self.config.coloration {
            // SAFETY: `[base + header, top]` lies inside the block and the
            // thread hasn't started
            unsafe { crate::stack_color(base.add(header_size), geometry.size - header_size) };
        }

        // The top stays inside the block, so keep the block's provenance
        tcb.adj_stack_ptr = base.wrapping_add(geometry.top - geometry.base).cast();
        tcb.adj_stack_size = geometry.size;
        tcb.stack_alloc = Some(block);

        debug!(
            "Stack @ 0x{=usize:08x}, top 0x{=usize:08x}, {=usize} bytes",
            geometry.base,
            geometry.top,
            geometry.size
        );
        self.board.autoled_on(LedEvent::StackCreated);
        Ok(())
    }
}

// End of File
