// Implements the diagnostic beeper: short pulses through the motor windings at an audible rate.

// Detailed Operation:
// Phase B is held low while phases A and C are energized in turn for a few microseconds and
// then floated, each pulse followed by half a tone period of silence. The loop runs until the
// requested duration has elapsed on the monotonic clock and always ends with a floating bridge.
// Busy waiting is fine here: beeping is a foreground diagnostic, never mixed with motor drive.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use embedded_hal::delay::DelayNs;

use crate::bridge::{MotorPwm, Phase, PhaseMode};
use crate::timer::PwmTimers;

/// How long a phase stays energized per pulse, us
const ENERGIZING_DURATION_US: u32 = 9;

/// Free running microsecond clock
pub trait Monotonic {
    fn now_us(&self) -> u64;
}

impl<T: PwmTimers> MotorPwm<T> {
    /// Beeps at `frequency_hz` for `duration_ms`.
    ///
    /// A zero frequency or duration leaves the bridge floating without a sound.
    pub fn beep<C>(&mut self, clock: &mut C, frequency_hz: u32, duration_ms: u32)
    where
        C: DelayNs + Monotonic,
    {
        self.set_all_floating();
        if frequency_hz == 0 || duration_ms == 0 {
            return;
        }

        // B is always low, A and C are alternating
        self.manip(Phase::B, PhaseMode::Low);

        let half_period_us = (1_000_000 / frequency_hz) / 2;
        let end_time = clock.now_us() + duration_ms as u64 * 1000;

        while end_time > clock.now_us() {
            for phase in [Phase::A, Phase::C] {
                self.manip(phase, PhaseMode::High);
                clock.delay_us(ENERGIZING_DURATION_US);
                self.manip(phase, PhaseMode::Floating);
                clock.delay_us(half_period_us);
            }
        }

        self.set_all_floating();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::tests::started;
    use crate::sim::{Access, SimClock};
    use crate::timer::HIGH_SIDE;

    /// Number of writes putting a non-zero compare on the high side of `phase`
    fn pulses(accesses: &[Access], phase: Phase) -> usize {
        accesses
            .iter()
            .filter(|access| {
                matches!(access, Access::Compare(output, value)
                    if *output == HIGH_SIDE[phase.index()] && *value != 0)
            })
            .count()
    }

    #[test]
    fn alternates_a_and_c_until_deadline() {
        let mut pwm = started();
        let mut clock = SimClock::new();
        pwm.timers_mut().accesses.clear();

        pwm.beep(&mut clock, 1000, 10);

        // One round is 2 * (9 + 500) us, rounds start at 0, 1018, ... 9162 us
        let accesses = &pwm.timers().accesses;
        assert_eq!(pulses(accesses, Phase::A), 10);
        assert_eq!(pulses(accesses, Phase::C), 10);
        assert_eq!(pulses(accesses, Phase::B), 0);
        assert_eq!(clock.now_us(), 10 * 1018);
    }

    #[test]
    fn ends_floating() {
        let mut pwm = started();
        let mut clock = SimClock::new();

        pwm.beep(&mut clock, 2000, 3);
        for phase in Phase::ALL {
            let state = pwm.timers().phase(phase);
            assert_eq!((state.high, state.low), (0, 0));
            assert!(!state.high_inverted && !state.low_inverted);
        }
    }

    #[test]
    fn holds_b_low_while_beeping() {
        let mut pwm = started();
        let mut clock = SimClock::new();
        pwm.timers_mut().accesses.clear();

        pwm.beep(&mut clock, 1000, 1);

        let b_low = crate::timer::LOW_SIDE[Phase::B.index()];
        let first = pwm.timers().accesses.iter().position(|access| {
            matches!(access, Access::Compare(output, 1023) if *output == b_low)
        });
        let first_pulse = pwm.timers().accesses.iter().position(|access| {
            matches!(access, Access::Compare(output, value)
                if *output == HIGH_SIDE[Phase::A.index()] && *value != 0)
        });
        assert!(first.unwrap() < first_pulse.unwrap());
    }

    #[test]
    fn zero_frequency_is_silent() {
        let mut pwm = started();
        let mut clock = SimClock::new();
        pwm.manip(Phase::A, PhaseMode::High);

        pwm.beep(&mut clock, 0, 100);
        assert_eq!(clock.now_us(), 0);
        assert_eq!(pwm.timers().phase(Phase::A).high, 0);
    }
}
