#![no_std]

// Game engine for the Luminus Memory LED-matrix game.
//
// This crate stays portable across the RP2040 firmware and the host emulator by
// avoiding the Rust standard library. Hardware access happens only through the
// traits in `hal`; everything else is plain state owned by a `Session`.

pub mod config;
pub mod cursor;
pub mod frame;
pub mod grid;
pub mod hal;
pub mod input;
pub mod messages;
pub mod playback;
pub mod sequence;
pub mod session;
pub mod telemetry;
pub mod verify;
