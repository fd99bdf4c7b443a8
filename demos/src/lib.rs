//! Common heap, board and panic/fault handlers for the demos

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

#![no_std]

use core::{alloc::Layout, ptr::NonNull};

use armstack::{Board, Heap, LedEvent};
use buddy_system_allocator::LockedHeap;
use defmt_semihosting as _;

/// A buddy-allocated heap that thread stacks can come from
pub struct BuddyHeap(LockedHeap<32>);

impl BuddyHeap {
    /// Make an empty heap
    pub const fn new() -> BuddyHeap {
        BuddyHeap(LockedHeap::empty())
    }

    /// Give the heap some memory to manage
    pub fn init(&self, memory: &'static mut [u8]) {
        let start = memory.as_mut_ptr() as usize;
        // SAFETY: the memory is ours forever and nobody else can touch it
        unsafe { self.0.lock().init(start, memory.len()) };
        defmt::info!(
            "Heap @ 0x{=usize:08x}, {=usize} bytes",
            start,
            memory.len()
        );
    }
}

impl Default for BuddyHeap {
    fn default() -> Self {
        BuddyHeap::new()
    }
}

impl Heap for BuddyHeap {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.0.lock().alloc(layout).ok()
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        self.0.lock().dealloc(ptr, layout)
    }
}

/// A board whose only LED is the defmt log
pub struct LogBoard;

impl Board for LogBoard {
    fn autoled_on(&self, event: LedEvent) {
        defmt::info!("LED on: {}", event);
    }
}

/// Called when a panic occurs.
///
/// Logs the panic to defmt and then crashes the CPU.
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    defmt::println!("PANIC: {}", defmt::Debug2Format(info));
    cortex_m::asm::udf();
}

/// Called when a HardFault occurs.
///
/// Logs the fault to defmt and then crashes the CPU.
#[cortex_m_rt::exception]
unsafe fn HardFault(info: &cortex_m_rt::ExceptionFrame) -> ! {
    defmt::println!("FAULT: {}", defmt::Debug2Format(info));
    cortex_m::asm::udf();
}

// End of File
