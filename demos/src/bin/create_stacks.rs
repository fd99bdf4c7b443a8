//! Creates stacks for one thread of each kind, from separate kernel and user
//! heaps, then checks how much of each has been used

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

#![no_std]
#![no_main]

use armstack::{Heaps, StackConfig, StackCreator, Tcb, ThreadKind};
use armstack_demos::{BuddyHeap, LogBoard};

/// Size of each heap's memory
const HEAP_SIZE: usize = 64 * 1024;

static KERNEL_HEAP: BuddyHeap = BuddyHeap::new();
static USER_HEAP: BuddyHeap = BuddyHeap::new();

#[cortex_m_rt::entry]
fn main() -> ! {
    static mut KERNEL_MEMORY: [u8; HEAP_SIZE] = [0; HEAP_SIZE];
    static mut USER_MEMORY: [u8; HEAP_SIZE] = [0; HEAP_SIZE];

    defmt::info!("Hello!");
    KERNEL_HEAP.init(KERNEL_MEMORY);
    USER_HEAP.init(USER_MEMORY);

    let creator = StackCreator::with_board(
        Heaps::protected(&KERNEL_HEAP, &USER_HEAP),
        StackConfig::DEFAULT,
        LogBoard,
    );
    defmt::info!("Config: {}", creator.config());

    let mut threads: heapless::Vec<(ThreadKind, Tcb<'static, BuddyHeap>), 3> = heapless::Vec::new();
    for (kind, size) in [
        (ThreadKind::Task, 1024),
        (ThreadKind::Pthread, 2048),
        (ThreadKind::Kernel, 512),
    ] {
        if threads.push((kind, Tcb::new())).is_err() {
            defmt::panic!("Too many threads");
        }
        let Some((_, tcb)) = threads.last_mut() else {
            unreachable!();
        };
        match creator.create_stack(tcb, size, kind) {
            Ok(()) => defmt::info!(
                "{}: stack @ 0x{=usize:08x}, sp 0x{=usize:08x}, {=usize} bytes",
                kind,
                tcb.stack_alloc_ptr() as usize,
                tcb.adj_stack_ptr() as usize,
                tcb.adj_stack_size()
            ),
            Err(e) => defmt::error!("{}: {}", kind, e),
        }
    }

    for (kind, tcb) in threads.iter() {
        defmt::info!("{}: {=usize} bytes used", kind, creator.stack_used(tcb));
    }

    for (kind, tcb) in threads.iter_mut() {
        creator.release_stack(tcb, *kind);
    }

    defmt::info!("Done!");
    semihosting::process::exit(0);
}

// End of File
