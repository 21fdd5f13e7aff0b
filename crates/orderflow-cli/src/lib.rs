// SPDX-License-Identifier: MIT OR Apache-2.0
//! Library-level command implementations backing the `orderflow` binary,
//! kept separate from argument parsing so they can be unit tested directly.

#![deny(unsafe_code)]

pub mod commands;
