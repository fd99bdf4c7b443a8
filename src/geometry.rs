//! Holds the [`StackGeometry`] type

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::StackAlignment;

/// Where the usable part of a stack block begins and ends
///
/// Arm uses a full-descending stack: it grows towards lower addresses and the
/// stack pointer holds the address of the last item pushed. So `top` must be a
/// valid word inside the block, which is why we reserve the final word and
/// round down rather than up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StackGeometry {
    /// Lowest address of the block
    pub base: usize,
    /// The initial stack pointer
    pub top: usize,
    /// Bytes from `base` up to and including the word at `top`
    pub size: usize,
}

impl StackGeometry {
    /// Work out the initial stack pointer for a block
    ///
    /// Returns `None` if the block cannot hold a word above `reserved` bytes
    /// at its base.
    pub const fn compute(
        base: usize,
        block_size: usize,
        alignment: StackAlignment,
        reserved: usize,
    ) -> Option<StackGeometry> {
        let Some(end) = base.checked_add(block_size) else {
            return None;
        };
        let Some(raw_top) = end.checked_sub(4) else {
            return None;
        };
        let top = alignment.align_down(raw_top);
        // The top must be above the reserved area, and above the base
        if top < base.saturating_add(reserved) || top <= base {
            return None;
        }
        Some(StackGeometry {
            base,
            top,
            size: top - base + 4,
        })
    }

    /// First byte past the word at `top`
    pub const fn end(&self) -> usize {
        self.top + 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eabi_rounds_top_down_to_eight() {
        let geometry =
            StackGeometry::compute(0x2000_1000, 1024, StackAlignment::DoubleWord, 0).unwrap();
        assert_eq!(geometry.top, 0x2000_13F8);
        assert_eq!(geometry.size, 0x3FC);
        assert_eq!(geometry.size, 1020);
    }

    #[test]
    fn oabi_keeps_the_last_word() {
        let geometry = StackGeometry::compute(0x2000_1000, 1024, StackAlignment::Word, 0).unwrap();
        assert_eq!(geometry.top, 0x2000_13FC);
        assert_eq!(geometry.size, 1024);
    }

    #[test]
    fn tls_header_counts_towards_the_block() {
        let geometry =
            StackGeometry::compute(0x2000_2000, 1024 + 16, StackAlignment::DoubleWord, 16)
                .unwrap();
        assert_eq!(geometry.top, 0x2000_2408);
        assert_eq!(geometry.size, 0x40C);
        assert_eq!(geometry.size, 1036);
    }

    #[test]
    fn unaligned_base_stays_inside_block() {
        for base in 0x2000_1001..0x2000_1010 {
            for alignment in [StackAlignment::Word, StackAlignment::DoubleWord] {
                let geometry = StackGeometry::compute(base, 100, alignment, 0).unwrap();
                assert!(alignment.is_aligned(geometry.top));
                assert!(geometry.top > base);
                assert!(geometry.end() <= base + 100);
                assert_eq!(geometry.size, geometry.top - base + 4);
            }
        }
    }

    #[test]
    fn too_small_blocks_have_no_geometry() {
        assert_eq!(
            StackGeometry::compute(0x2000_1000, 4, StackAlignment::Word, 0),
            None
        );
        assert_eq!(
            StackGeometry::compute(0x2000_1000, 16, StackAlignment::Word, 16),
            None
        );
        assert_eq!(StackGeometry::compute(0, 2, StackAlignment::Word, 0), None);
    }
}

// End of File
