//! Build script for armstack

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use std::env;

/// Lets the build environment override the ABI stack alignment
const STACK_ALIGNMENT_VAR: &str = "ARMSTACK_STACK_ALIGNMENT";

/// Entry point to the build script
fn main() {
    arm_targets::process();

    println!("cargo::rustc-check-cfg=cfg(stack_alignment, values(\"4\", \"8\"))");
    println!("cargo::rerun-if-env-changed={STACK_ALIGNMENT_VAR}");
    match env::var(STACK_ALIGNMENT_VAR).as_deref() {
        Ok(value @ ("4" | "8")) => {
            println!("cargo::rustc-cfg=stack_alignment=\"{value}\"");
        }
        Ok(other) => {
            panic!("{STACK_ALIGNMENT_VAR} must be 4 or 8, not {other:?}");
        }
        Err(_) => {
            // Use the ABI default
        }
    }
}

// End of File
