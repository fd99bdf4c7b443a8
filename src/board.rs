//! Holds the [`Board`] diagnostic hook

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

/// Kernel events a board can show on its status LEDs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum LedEvent {
    /// A thread stack was created
    StackCreated,
}

/// Board-specific diagnostic hooks
pub trait Board {
    /// Light the LEDs for a kernel event
    fn autoled_on(&self, event: LedEvent);
}

/// A board with no LEDs
impl Board for () {
    fn autoled_on(&self, _event: LedEvent) {}
}

impl<B: Board + ?Sized> Board for &B {
    fn autoled_on(&self, event: LedEvent) {
        (**self).autoled_on(event)
    }
}

// End of File
