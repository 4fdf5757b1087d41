// Implements the MotorPwm controller, owner of the counter pair and of the phase output state.

// Key Features:
// - Derives timing constants and brings up both counters in phase lock
// - Normalizes duty codes into the complementary half-bridge domain
// - Drives every phase high, low, floating or at half duty
// - De-energizes the whole bridge in one masked section on emergency

// Detailed Operation:
// `MotorPwm::init` consumes the counter pair, so after a successful bring-up the controller is
// the only writer of compare and polarity registers. Every register change of a phase happens
// inside a critical section, polarity first, so an interrupt never observes a phase with new
// polarity and old timing. A fault handler reaches the controller through a
// `critical_section::Mutex`, which also rules out preempting a half finished update.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

mod bringup;
mod duty;
mod phase;

pub use duty::NormalizedDuty;
pub use phase::{Phase, PhaseMode};

use crate::config::{PwmConfig, TimingConstants};
use crate::error::PwmError;
use crate::timer::PwmTimers;

/// Complementary PWM driver of a three-phase bridge
pub struct MotorPwm<T: PwmTimers> {
    /// Counter pair generating the six gate signals
    timers: T,
    /// Tick constants, fixed until the next `init`
    consts: TimingConstants,
}

impl<T: PwmTimers> MotorPwm<T> {
    /// Derives the timing constants, starts both counters synchronously and leaves the bridge
    /// floating.
    ///
    /// Any error is fatal: the counters must not drive the bridge with these settings.
    pub fn init(mut timers: T, config: &PwmConfig) -> Result<Self, PwmError> {
        let consts = TimingConstants::derive(config)?;

        bringup::configure_counters(&mut timers, &consts);
        bringup::start_counters(&mut timers)?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Motor: PWM max: {}; Dead time: {} ticks; {} Hz",
            consts.pwm_max,
            consts.dead_time_ticks,
            consts.pwm_frequency_hz
        );

        let mut pwm = MotorPwm { timers, consts };
        // Counters run with zero compares but normal polarity until every phase is floated
        pwm.set_all_floating();
        Ok(pwm)
    }

    /// Maps a duty code (0 = 0%, `duty_max` = 100%) to the value taken by `set_phase`.
    ///
    /// Low bits beyond the counting resolution are dropped and the result is clamped to
    /// `pwm_max` so the low side keeps pulsing.
    #[inline(always)]
    pub fn compute_normalized(&self, duty: u16) -> NormalizedDuty {
        NormalizedDuty::compute(&self.consts, duty)
    }

    pub fn constants(&self) -> &TimingConstants {
        &self.consts
    }

    /// Read-only view of the counter pair. Gate registers are written by `MotorPwm` alone:
    ///
    /// ```compile_fail
    /// use motor_pwm::{MotorPwm, Output, Polarity, PwmTimers};
    ///
    /// fn bypass<T: PwmTimers>(pwm: &mut MotorPwm<T>, output: Output) {
    ///     pwm.timers_mut().set_polarity(output, Polarity::Inverted);
    /// }
    /// ```
    pub fn timers(&self) -> &T {
        &self.timers
    }

    #[cfg(test)]
    pub(crate) fn timers_mut(&mut self) -> &mut T {
        &mut self.timers
    }

    /// Stops driving the bridge and hands the counter pair back
    pub fn release(mut self) -> T {
        self.emergency_stop();
        self.timers
    }
}
