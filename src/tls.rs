//! Holds the [`TlsInfo`] header placed at the base of each stack

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

/// Number of thread-local values each thread may store
pub const TLS_NELEM: usize = 3;

/// The thread-local storage header
///
/// This lives at the lowest address of a stack block. The TLS accessors find
/// it by masking the stack pointer down to the TLS window, so this code only
/// ever writes it once, when the stack is attached.
#[repr(C)]
#[derive(Debug)]
pub struct TlsInfo {
    /// The thread control block that owns this stack
    pub tl_tcb: *const (),
    /// Thread-local values
    pub tl_elem: [usize; TLS_NELEM],
}

impl TlsInfo {
    /// Zero the header at `base`, then point it back at the owning thread
    ///
    /// # Safety
    ///
    /// `base` must be valid for writes of `size_of::<TlsInfo>()` bytes and
    /// aligned for a [`TlsInfo`].
    pub(crate) unsafe fn init(base: *mut u8, tcb: *const ()) {
        let info = base.cast::<TlsInfo>();
        // SAFETY: the caller gives us a writable, aligned header slot
        unsafe {
            base.write_bytes(0, core::mem::size_of::<TlsInfo>());
            core::ptr::addr_of_mut!((*info).tl_tcb).write(tcb);
        }
    }

    /// Read back the header at the base of a stack
    ///
    /// # Safety
    ///
    /// `base` must point at a header written by an attached stack with TLS
    /// enabled, and the stack must still be attached.
    pub unsafe fn from_base<'a>(base: *const u8) -> &'a TlsInfo {
        // SAFETY: the caller promises there's an initialised header here
        unsafe { &*base.cast::<TlsInfo>() }
    }
}


// End of File
