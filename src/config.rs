//! Holds the [`StackConfig`] type and the build-time stack constants

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::{StackError, tls::TlsInfo};

/// The sentinel written over unused stack, for high-water-mark accounting
pub const STACK_COLOR: u32 = 0xdead_beef;

/// Alignment the ABI requires of the stack pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StackAlignment {
    /// 4-byte alignment, for the old Arm ABI
    Word,
    /// 8-byte alignment, as required by AAPCS at public interfaces
    DoubleWord,
}

impl StackAlignment {
    /// The alignment in bytes
    pub const fn bytes(self) -> usize {
        match self {
            StackAlignment::Word => 4,
            StackAlignment::DoubleWord => 8,
        }
    }

    /// Round an address down to this alignment
    pub const fn align_down(self, addr: usize) -> usize {
        addr & !(self.bytes() - 1)
    }

    /// Is this address aligned?
    pub const fn is_aligned(self, addr: usize) -> bool {
        addr & (self.bytes() - 1) == 0
    }
}

/// The stack alignment for this build
///
/// Set `ARMSTACK_STACK_ALIGNMENT` when building to override it. Otherwise
/// every Arm EABI target gets 8-byte alignment and anything else gets 4.
pub const STACK_ALIGNMENT: StackAlignment = if cfg!(stack_alignment = "4") {
    StackAlignment::Word
} else if cfg!(stack_alignment = "8") {
    StackAlignment::DoubleWord
} else if cfg!(any(arm_abi = "eabi", arm_abi = "eabihf")) {
    StackAlignment::DoubleWord
} else {
    StackAlignment::Word
};

/// Thread-local storage settings
///
/// TLS accessors find the [`TlsInfo`] header by masking the stack pointer
/// down to `1 << log2_maxstack`, so every stack has to start on that boundary
/// and cannot be any bigger than it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TlsConfig {
    log2_maxstack: u8,
}

impl TlsConfig {
    /// An 8 KiB TLS window
    pub const DEFAULT: TlsConfig = TlsConfig::new(13);

    /// Make a TLS configuration with a window of `1 << log2_maxstack` bytes
    pub const fn new(log2_maxstack: u8) -> TlsConfig {
        assert!(log2_maxstack >= 4 && log2_maxstack < 31);
        TlsConfig { log2_maxstack }
    }

    /// The alignment of every stack block (`TLS_STACK_ALIGN`)
    pub const fn stack_align(&self) -> usize {
        1 << self.log2_maxstack
    }

    /// The largest stack, header included (`TLS_MAXSTACK`)
    pub const fn max_stack(&self) -> usize {
        self.stack_align()
    }

    /// The size of the header at the base of every stack (`TLS_HEADER_SIZE`)
    pub const fn header_size(&self) -> usize {
        core::mem::size_of::<TlsInfo>()
    }
}

impl Default for TlsConfig {
    fn default() -> Self {
        TlsConfig::DEFAULT
    }
}

/// How stacks are shaped and instrumented when they are attached to a thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StackConfig {
    /// Alignment of the initial stack pointer
    pub alignment: StackAlignment,
    /// Reserve a TLS header at the base of the stack, if set
    pub tls: Option<TlsConfig>,
    /// Fill the usable stack with [`STACK_COLOR`]
    pub coloration: bool,
}

impl StackConfig {
    /// The configuration selected by the Cargo features of this build
    pub const DEFAULT: StackConfig = StackConfig {
        alignment: STACK_ALIGNMENT,
        tls: if cfg!(feature = "tls") {
            Some(TlsConfig::DEFAULT)
        } else {
            None
        },
        coloration: cfg!(feature = "stack-coloration"),
    };

    /// A plain configuration: given alignment, no TLS, no coloration
    pub const fn new(alignment: StackAlignment) -> StackConfig {
        StackConfig {
            alignment,
            tls: None,
            coloration: false,
        }
    }

    /// Enable thread-local storage
    pub const fn with_tls(mut self, tls: TlsConfig) -> StackConfig {
        self.tls = Some(tls);
        self
    }

    /// Enable or disable stack coloration
    pub const fn with_coloration(mut self, coloration: bool) -> StackConfig {
        self.coloration = coloration;
        self
    }

    /// Bytes reserved at the base of each stack for the TLS header
    pub const fn header_size(&self) -> usize {
        match self.tls {
            Some(tls) => tls.header_size(),
            None => 0,
        }
    }

    /// Alignment the heap must give the block base
    ///
    /// One, unless TLS needs the block on its window boundary.
    pub const fn block_align(&self) -> usize {
        match self.tls {
            Some(tls) => tls.stack_align(),
            None => 1,
        }
    }

    /// The smallest block that always yields a usable stack
    ///
    /// Rounding the top down may lose up to `alignment - 1` bytes on an
    /// unaligned base, and we need at least one word above the TLS header.
    pub const fn min_stack_size(&self) -> usize {
        self.header_size() + 2 * self.alignment.bytes()
    }

    /// Work out how many bytes to allocate for a requested stack size
    pub fn effective_size(&self, requested_size: usize) -> Result<usize, StackError> {
        let size = requested_size.saturating_add(self.header_size());
        if let Some(tls) = self.tls {
            if size > tls.max_stack() {
                return Err(StackError::TlsOverflow {
                    size,
                    max: tls.max_stack(),
                });
            }
        }
        if size < self.min_stack_size() {
            return Err(StackError::TooSmall { size });
        }
        Ok(size)
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        StackConfig::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_rounds_down() {
        assert_eq!(StackAlignment::DoubleWord.align_down(0x2000_13FC), 0x2000_13F8);
        assert_eq!(StackAlignment::Word.align_down(0x2000_13FC), 0x2000_13FC);
        assert_eq!(StackAlignment::Word.align_down(0x2000_13FE), 0x2000_13FC);
    }

    #[test]
    fn effective_size_without_tls() {
        let config = StackConfig::new(StackAlignment::DoubleWord);
        assert_eq!(config.effective_size(1024), Ok(1024));
    }

    #[test]
    fn effective_size_adds_tls_header() {
        let config = StackConfig::new(StackAlignment::DoubleWord).with_tls(TlsConfig::new(11));
        let header = core::mem::size_of::<TlsInfo>();
        assert_eq!(config.effective_size(1024), Ok(1024 + header));
    }

    #[test]
    fn tls_overflow_is_reported() {
        let tls = TlsConfig::new(11);
        let config = StackConfig::new(StackAlignment::DoubleWord).with_tls(tls);
        let header = tls.header_size();
        // Exactly the window is fine
        assert_eq!(config.effective_size(2048 - header), Ok(2048));
        assert_eq!(
            config.effective_size(2048),
            Err(StackError::TlsOverflow {
                size: 2048 + header,
                max: 2048
            })
        );
    }

    #[test]
    fn tiny_stacks_are_rejected() {
        let config = StackConfig::new(StackAlignment::DoubleWord);
        assert_eq!(config.effective_size(0), Err(StackError::TooSmall { size: 0 }));
        assert_eq!(config.effective_size(15), Err(StackError::TooSmall { size: 15 }));
        assert_eq!(config.effective_size(16), Ok(16));
    }

    #[test]
    fn huge_requests_do_not_wrap() {
        let config = StackConfig::new(StackAlignment::Word).with_tls(TlsConfig::DEFAULT);
        assert!(matches!(
            config.effective_size(usize::MAX),
            Err(StackError::TlsOverflow { .. })
        ));
    }
}

// End of File
