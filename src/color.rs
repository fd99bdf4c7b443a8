//! Stack coloration and high-water-mark accounting

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::STACK_COLOR;

/// The whole 32-bit words inside `[base, base + nbytes)`
///
/// Returns the first word and how many words follow it.
fn word_span(base: *const u8, nbytes: usize) -> (*const u8, usize) {
    let addr = base as usize;
    let start = (addr + 3) & !3;
    let end = addr.saturating_add(nbytes) & !3;
    let nwords = end.saturating_sub(start) / 4;
    (base.wrapping_add(start - addr), nwords)
}

/// Fill a region with [`STACK_COLOR`]
///
/// Only whole, aligned words inside the region are written: the start is
/// rounded up and the end rounded down to a 4-byte boundary.
///
/// # Safety
///
/// `base` must be valid for writes of `nbytes` bytes, and nothing else may be
/// using that memory (in particular, not as a running stack).
pub unsafe fn stack_color(base: *mut u8, nbytes: usize) {
    let (start, nwords) = word_span(base, nbytes);
    trace!(
        "Color {=usize} words from 0x{=usize:08x}",
        nwords,
        start as usize
    );
    let mut ptr = start.cast_mut().cast::<u32>();
    for _ in 0..nwords {
        // SAFETY: `ptr` is word aligned and inside the region the caller gave us
        unsafe {
            ptr.write_volatile(STACK_COLOR);
            ptr = ptr.add(1);
        }
    }
}

/// How many bytes of a colored region have been used
///
/// The stack grows down from the top of the region, so we count the words
/// from the bottom that still hold [`STACK_COLOR`] and report the rest.
///
/// # Safety
///
/// `base` must be valid for reads of `nbytes` bytes, and the region must have
/// been filled with [`stack_color`] before the stack was first used.
pub unsafe fn stack_used(base: *const u8, nbytes: usize) -> usize {
    let (start, nwords) = word_span(base, nbytes);
    let ptr = start.cast::<u32>();
    let mut unused = 0;
    while unused < nwords {
        // SAFETY: `ptr + unused` is word aligned and inside the caller's region
        let word = unsafe { ptr.add(unused).read_volatile() };
        if word != STACK_COLOR {
            break;
        }
        unused += 1;
    }
    (nwords - unused) * 4
}

/// Fill a whole stack slice with [`STACK_COLOR`]
///
/// Use this for stacks that never go through [`crate::StackCreator`], such as
/// the idle thread's.
pub fn stack_color_slice(stack: &mut [u8]) {
    // SAFETY: we have exclusive access to the slice
    unsafe { stack_color(stack.as_mut_ptr(), stack.len()) }
}


// End of File
