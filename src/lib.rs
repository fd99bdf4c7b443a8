//! Thread stack creation for Arm real-time kernels
//!
//! When the kernel builds a new thread, it asks a [`StackCreator`] to carve a
//! stack out of the right [`Heap`], work out the initial stack pointer the
//! context switch will load, and optionally instrument the stack:
//!
//! * With TLS enabled, a [`TlsInfo`] header sits at the lowest address of the
//!   stack and the block is aligned so the header can be found by masking the
//!   stack pointer.
//! * With coloration enabled, the usable stack is filled with [`STACK_COLOR`]
//!   so [`StackCreator::stack_used`] can report a high-water mark later.
//!
//! ```
//! use armstack::{Heaps, StackConfig, StackCreator, Tcb, ThreadKind};
//! # use armstack::Heap;
//! # use core::{alloc::Layout, ptr::NonNull};
//! # struct SystemHeap;
//! # impl Heap for SystemHeap {
//! #     fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
//! #         NonNull::new(unsafe { std::alloc::alloc(layout) })
//! #     }
//! #     unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
//! #         unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
//! #     }
//! # }
//!
//! let heap = SystemHeap;
//! let creator = StackCreator::new(Heaps::flat(&heap), StackConfig::DEFAULT);
//! let mut tcb = Tcb::new();
//! creator.create_stack(&mut tcb, 1024, ThreadKind::Task).unwrap();
//! assert!(tcb.adj_stack_size() >= 1024 - 8);
//! ```

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

mod block;
mod board;
mod color;
mod config;
mod create;
mod error;
mod geometry;
mod heap;
mod stack;
mod tcb;
mod tls;

pub use block::StackBlock;
pub use board::{Board, LedEvent};
pub use color::{stack_color, stack_color_slice, stack_used};
pub use config::{STACK_ALIGNMENT, STACK_COLOR, StackAlignment, StackConfig, TlsConfig};
pub use create::StackCreator;
pub use error::StackError;
pub use geometry::StackGeometry;
pub use heap::{Heap, Heaps};
pub use stack::Stack;
pub use tcb::{Tcb, ThreadKind};
pub use tls::{TLS_NELEM, TlsInfo};

// End of File
