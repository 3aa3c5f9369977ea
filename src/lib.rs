#![cfg_attr(not(test), no_std)]

//! [Si570](https://www.skyworksinc.com/en/Products/Timing/CMOS-Oscillators/Si570) frequency synthesizer control.
//!
//! Frequencies are MHz in 11.21 fixed point, the crystal in 8.24. The
//! [`SynthesisController`](controller::SynthesisController) picks dividers,
//! encodes the frequency control registers and decides between a smooth
//! (RFREQ only) update and a full reprogram. An AD9850 DDS backend is
//! available behind the same [`Synthesizer`](synth::Synthesizer) interface.

pub mod constants;
pub mod errors;
pub mod fixed;
pub mod frequency;
pub mod divider;
pub mod register;
pub mod smooth;
pub mod config;
pub mod bus;
pub mod synth;
pub mod device;
pub mod dds;
pub mod controller;
