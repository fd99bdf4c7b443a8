//! Holds the [`StackError`] type

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

/// Why a stack could not be attached to a thread
///
/// Every variant except [`StackError::AllocationFailed`] is detected before
/// the thread control block is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StackError {
    /// The stack cannot hold a single aligned word above the TLS header
    TooSmall {
        /// The effective size in bytes, including any TLS header
        size: usize,
    },
    /// The stack does not fit inside the window the TLS locator can mask
    TlsOverflow {
        /// The effective size in bytes, including the TLS header
        size: usize,
        /// The largest stack the TLS locator supports
        max: usize,
    },
    /// The heap had no block of the requested size
    AllocationFailed {
        /// The effective size in bytes we asked the heap for
        size: usize,
    },
    /// A caller-supplied stack does not start on the TLS alignment
    Misaligned {
        /// The alignment the stack base needed
        align: usize,
    },
}

impl core::fmt::Display for StackError {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StackError::TooSmall { size } => {
                write!(fmt, "stack of {size} bytes is too small")
            }
            StackError::TlsOverflow { size, max } => {
                write!(fmt, "stack of {size} bytes exceeds TLS maximum of {max}")
            }
            StackError::AllocationFailed { size } => {
                write!(fmt, "failed to allocate stack, size {size}")
            }
            StackError::Misaligned { align } => {
                write!(fmt, "stack base is not aligned to {align} bytes")
            }
        }
    }
}

impl core::error::Error for StackError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_log_line() {
        let err = StackError::AllocationFailed { size: 1040 };
        assert_eq!(err.to_string(), "failed to allocate stack, size 1040");
    }
}

// End of File
