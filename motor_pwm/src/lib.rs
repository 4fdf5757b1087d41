// Complementary, center-aligned PWM for the six-switch bridge of a three-phase BLDC motor.

// Key Features:
// - Derives tick-based timing limits (minimum pulse, dead time, ADC advance) from nanoseconds
// - Brings up the low-side and high-side counters in exact phase lock
// - Maps duty codes into the complementary half-bridge domain
// - Drives each phase high, low, floating or at half duty with dead time on the turn-on edge
// - Provides the six-step commutation table and a diagnostic beeper

// Detailed Operation:
// The crate does not touch registers itself. Everything hardware related goes through the
// `PwmTimers` trait (counter pair) and the `critical-section` crate (interrupt masking), so
// the same code runs on the target and against the simulated timer pair used by the tests.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

#![cfg_attr(not(test), no_std)]

pub mod beep;
pub mod bridge;
pub mod commutation;
pub mod config;
pub mod error;
pub mod timer;

#[cfg(test)]
mod sim;

pub use beep::Monotonic;
pub use bridge::{MotorPwm, NormalizedDuty, Phase, PhaseMode};
pub use commutation::{commutation_step, CommutationStep, COMMUTATION_TABLE, NUM_COMMUTATION_STEPS};
pub use config::{PwmConfig, TimingConstants};
pub use error::{BringupError, ConfigError, PwmError};
pub use timer::{Channel, Counter, MasterMode, Output, Polarity, PwmTimers, SlaveMode};
