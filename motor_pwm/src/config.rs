// Implements the timing constants of the bridge, converting physical limits into counter ticks.

// Key Features:
// - Holds the board configuration (timer clock, resolution, pulse limits) with defaults
// - Converts nanoseconds into ticks with exact integer arithmetic
// - Rejects limits that do not fit into a safe fraction of the PWM period
// - Computes the highest duty that still recharges the bootstrap capacitor

// Detailed Operation:
// The counters count center-aligned, so the PWM frequency is
//      f = timer_clock / ((top + 1) * 2)
// which for a 72 MHz clock gives 35156.25 Hz at 10 bits and 17578.125 Hz at 11 bits.
// The minimum pulse is halved before it is taken off the top because a center-aligned pulse
// is split evenly around the middle of the period. The dead time is applied to a single edge
// and is therefore never halved.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::error::ConfigError;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Supported counting resolution, bits
const RESOLUTION_RANGE: core::ops::RangeInclusive<u8> = 2..=15;

/// Largest external duty code width, bits (duty codes are `u16`)
const MAX_DUTY_RESOLUTION: u8 = 16;

/// Upper bound of a tick count as a fraction of `top`
struct Limit {
    num: u128,
    den: u128,
}

/// Minimum pulse and dead time must stay below 5% of the period
const PULSE_LIMIT: Limit = Limit { num: 5, den: 100 };
/// ADC trigger advance must stay below 30% of the period
const ADC_ADVANCE_LIMIT: Limit = Limit { num: 3, den: 10 };

/// Board level PWM configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmConfig {
    /// Input clock of both counters, Hz
    pub timer_clock_hz: u32,
    /// Counting resolution, bits. Effective duty resolution is one bit less
    pub resolution_bits: u8,
    /// Resolution of the duty codes given to `compute_normalized`, bits
    pub duty_resolution_bits: u8,
    /// Shortest low-side pulse that keeps the bootstrap capacitor charged, ns
    pub min_pulse_ns: u32,
    /// Gap between one switch turning off and its complement turning on, ns
    pub dead_time_ns: u32,
    /// How long before the center of the period the ADC is triggered, ns
    pub adc_advance_ns: u32,
}

impl Default for PwmConfig {
    fn default() -> Self {
        PwmConfig {
            timer_clock_hz: 72_000_000,
            resolution_bits: 10,
            duty_resolution_bits: 16,
            // Limited by the high side bootstrap capacitor
            min_pulse_ns: 300,
            // Shoot-through with IR2301S + IRLR7843:
            //   300ns - about 2mA average at 35kHz
            //   400ns - less than 1mA at 35kHz
            //   500ns - much less than 1mA
            dead_time_ns: 400,
            adc_advance_ns: 200,
        }
    }
}

/// Tick values derived once from a [`PwmConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConstants {
    /// Reload value of both counters, 2^resolution - 1
    pub top: u16,
    /// Center of the period, 2^resolution / 2
    pub half_top: u16,
    /// Highest normalized duty
    pub pwm_max: u16,
    pub min_pulse_ticks: u16,
    pub dead_time_ticks: u16,
    pub adc_advance_ticks: u16,
    /// Largest external duty code
    pub duty_max: u16,
    /// Bits dropped from a duty code before normalization
    pub duty_shift: u8,
    /// Resulting PWM frequency, Hz
    pub pwm_frequency_hz: u32,
}

impl TimingConstants {
    /// Derives every tick constant from `config`.
    ///
    /// Fails when a limit does not fit into its share of the period, which means the clock
    /// and resolution cannot honor the physical constraints of the bridge.
    pub fn derive(config: &PwmConfig) -> Result<Self, ConfigError> {
        if config.timer_clock_hz == 0 {
            return Err(ConfigError::ZeroTimerClock);
        }
        let bits = config.resolution_bits;
        if !RESOLUTION_RANGE.contains(&bits) {
            return Err(ConfigError::ResolutionOutOfRange(bits));
        }
        let duty_bits = config.duty_resolution_bits;
        if duty_bits < bits || duty_bits > MAX_DUTY_RESOLUTION {
            return Err(ConfigError::DutyResolutionOutOfRange(duty_bits));
        }

        let top = ((1u32 << bits) - 1) as u16;
        let half_top = ((1u32 << bits) / 2) as u16;
        let clock = config.timer_clock_hz;

        let min_pulse_ticks = ns_to_ticks(config.min_pulse_ns, clock, top, &PULSE_LIMIT)
            .ok_or(ConfigError::MinPulseOutOfRange(config.min_pulse_ns))?;
        let dead_time_ticks = ns_to_ticks(config.dead_time_ns, clock, top, &PULSE_LIMIT)
            .ok_or(ConfigError::DeadTimeOutOfRange(config.dead_time_ns))?;
        let adc_advance_ticks = ns_to_ticks(config.adc_advance_ns, clock, top, &ADC_ADVANCE_LIMIT)
            .ok_or(ConfigError::AdcAdvanceOutOfRange(config.adc_advance_ns))?;

        // Halved, the pulse is centered in the period
        let pwm_max = top - (min_pulse_ticks / 2 + 1);

        Ok(TimingConstants {
            top,
            half_top,
            pwm_max,
            min_pulse_ticks,
            dead_time_ticks,
            adc_advance_ticks,
            duty_max: ((1u32 << duty_bits) - 1) as u16,
            duty_shift: duty_bits - bits,
            pwm_frequency_hz: clock / ((top as u32 + 1) * 2),
        })
    }

    /// Compare value of the ADC trigger channel, slightly ahead of the period center
    pub fn adc_trigger_compare(&self) -> u16 {
        self.half_top - self.adc_advance_ticks
    }
}

/// Truncated tick count of `ns` at `clock_hz`, or `None` when it is not below `limit * top`.
///
/// The bound is checked on the exact product, before truncation.
fn ns_to_ticks(ns: u32, clock_hz: u32, top: u16, limit: &Limit) -> Option<u16> {
    let scaled = ns as u128 * clock_hz as u128; // ticks * 1e9
    if scaled * limit.den >= top as u128 * limit.num * NANOS_PER_SEC {
        return None;
    }
    Some((scaled / NANOS_PER_SEC) as u16)
}
