//! Board side of the bridge PWM: counter pair, cycle counter clock and pin configuration.
#![no_std]

pub mod clock;
pub mod pinout;
pub mod pwm;
