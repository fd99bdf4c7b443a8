//! Heaps and boards for driving the stack creator on the host

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

#![allow(dead_code)]

use std::{alloc::Layout, cell::Cell, ptr::NonNull};

use armstack::{Board, Heap, LedEvent};

/// A heap on top of the system allocator that counts what happens to it
#[derive(Default)]
pub struct RecordingHeap {
    allocations: Cell<usize>,
    frees: Cell<usize>,
    fail: Cell<bool>,
    last_layout: Cell<Option<Layout>>,
}

impl RecordingHeap {
    pub fn new() -> RecordingHeap {
        RecordingHeap::default()
    }

    /// Make every following allocation fail
    pub fn exhaust(&self) {
        self.fail.set(true);
    }

    pub fn allocations(&self) -> usize {
        self.allocations.get()
    }

    pub fn frees(&self) -> usize {
        self.frees.get()
    }

    pub fn last_layout(&self) -> Option<Layout> {
        self.last_layout.get()
    }
}

impl Heap for RecordingHeap {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.last_layout.set(Some(layout));
        if self.fail.get() {
            return None;
        }
        let ptr = NonNull::new(unsafe { std::alloc::alloc(layout) })?;
        self.allocations.set(self.allocations.get() + 1);
        Some(ptr)
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        self.frees.set(self.frees.get() + 1);
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

/// The byte the padding around a [`CanaryHeap`] block is filled with
pub const CANARY: u8 = 0xA5;

/// Guard bytes each side of a [`CanaryHeap`] block
pub const GUARD: usize = 32;

/// A heap that hands out deliberately misaligned blocks with canaries around
/// them
pub struct CanaryHeap {
    /// How far past a 16-byte boundary each block starts
    offset: usize,
    last: Cell<Option<(NonNull<u8>, usize)>>,
}

impl CanaryHeap {
    pub fn new(offset: usize) -> CanaryHeap {
        assert!(offset < 16);
        CanaryHeap {
            offset,
            last: Cell::new(None),
        }
    }

    fn outer_layout(&self, size: usize) -> Layout {
        Layout::from_size_align(size + 2 * GUARD + self.offset, 16).unwrap()
    }

    /// Are the guard bytes around the last block intact?
    pub fn canaries_intact(&self) -> bool {
        let (base, size) = self.last.get().expect("nothing allocated");
        let below = unsafe { std::slice::from_raw_parts(base.as_ptr().sub(GUARD), GUARD) };
        let above = unsafe { std::slice::from_raw_parts(base.as_ptr().add(size), GUARD) };
        below.iter().chain(above).all(|b| *b == CANARY)
    }
}

impl Heap for CanaryHeap {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        let outer = self.outer_layout(layout.size());
        let raw = unsafe { std::alloc::alloc(outer) };
        let raw = NonNull::new(raw)?;
        unsafe { raw.as_ptr().write_bytes(CANARY, outer.size()) };
        let base = unsafe { raw.add(GUARD + self.offset) };
        self.last.set(Some((base, layout.size())));
        Some(base)
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        let outer = self.outer_layout(layout.size());
        unsafe { std::alloc::dealloc(ptr.as_ptr().sub(GUARD + self.offset), outer) }
    }
}

/// A board that counts LED events
#[derive(Default)]
pub struct RecordingBoard {
    stacks_created: Cell<usize>,
}

impl RecordingBoard {
    pub fn stacks_created(&self) -> usize {
        self.stacks_created.get()
    }
}

impl Board for RecordingBoard {
    fn autoled_on(&self, event: LedEvent) {
        match event {
            LedEvent::StackCreated => self.stacks_created.set(self.stacks_created.get() + 1),
            _ => {}
        }
    }
}

/// The stack fields of a TCB, for before-and-after comparisons
pub type Snapshot = (*mut u8, *mut u32, usize);

pub fn snapshot<H: Heap>(tcb: &armstack::Tcb<'_, H>) -> Snapshot {
    (tcb.stack_alloc_ptr(), tcb.adj_stack_ptr(), tcb.adj_stack_size())
}

/// Read the 32-bit words from `base + from` up to `base + to`
pub fn words(base: *const u8, from: usize, to: usize) -> Vec<u32> {
    assert_eq!((base as usize + from) % 4, 0);
    assert_eq!((to - from) % 4, 0);
    (from..to)
        .step_by(4)
        .map(|offset| unsafe { base.add(offset).cast::<u32>().read() })
        .collect()
}
