// Error types of the PWM bring-up. Both kinds are fatal: the caller is expected to halt.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use core::fmt;

use crate::timer::Counter;

/// Timing configuration that cannot be used safely with the chosen clock and resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Timer clock of 0 Hz
    ZeroTimerClock,
    /// Counting resolution outside the supported range (bits)
    ResolutionOutOfRange(u8),
    /// External duty resolution narrower than the counting resolution or wider than 16 bits
    DutyResolutionOutOfRange(u8),
    /// Minimum pulse is 5% of the period or longer (ns)
    MinPulseOutOfRange(u32),
    /// Dead time is 5% of the period or longer (ns)
    DeadTimeOutOfRange(u32),
    /// ADC trigger advance is 30% of the period or longer (ns)
    AdcAdvanceOutOfRange(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroTimerClock => write!(f, "timer clock is zero"),
            Self::ResolutionOutOfRange(bits) => {
                write!(f, "counting resolution of {} bits is not supported", bits)
            }
            Self::DutyResolutionOutOfRange(bits) => {
                write!(f, "duty resolution of {} bits is not supported", bits)
            }
            Self::MinPulseOutOfRange(ns) => write!(f, "minimum pulse of {} ns is too long", ns),
            Self::DeadTimeOutOfRange(ns) => write!(f, "dead time of {} ns is too long", ns),
            Self::AdcAdvanceOutOfRange(ns) => {
                write!(f, "ADC trigger advance of {} ns is too long", ns)
            }
        }
    }
}

/// Counter pair that did not come up in lock step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BringupError {
    /// Counter was already counting before the synchronized start
    CounterAlreadyRunning(Counter),
    /// Counter was not counting after the synchronized start
    CounterNotStarted(Counter),
}

impl fmt::Display for BringupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CounterAlreadyRunning(counter) => {
                write!(f, "{:?} counter is running before start", counter)
            }
            Self::CounterNotStarted(counter) => {
                write!(f, "{:?} counter did not start", counter)
            }
        }
    }
}

/// Any failure of [`MotorPwm::init`](crate::MotorPwm::init)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmError {
    Config(ConfigError),
    Bringup(BringupError),
}

impl From<ConfigError> for PwmError {
    fn from(err: ConfigError) -> Self {
        PwmError::Config(err)
    }
}

impl From<BringupError> for PwmError {
    fn from(err: BringupError) -> Self {
        PwmError::Bringup(err)
    }
}

impl fmt::Display for PwmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "PWM configuration: {}", err),
            Self::Bringup(err) => write!(f, "PWM bring-up: {}", err),
        }
    }
}
