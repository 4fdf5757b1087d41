// Implements the phase outputs: complementary compare values with dead time, and the four
// discrete modes a phase can be put in.

// Key Features:
// - Inserts dead time on the edge that turns a switch on, never on the one turning it off
// - Keeps polarity bits consistent with the inverted/non-inverted pairing of each phase
// - Drives a phase high, low, floating or at half duty
// - Zeroes the whole bridge in one masked section

// Detailed Operation:
// A non-inverted phase runs the high side with normal polarity and the low side inverted, so
// both gates switch around the same compare value and complement each other. Moving one of
// the two compare values by the dead time opens a gap where both switches are off. Which one
// moves depends on the side of the period center the duty is on and on the pairing, the
// inverted pairing swapping the roles of the two gates.
// HIGH and HALF need the low side to keep pulsing for the bootstrap capacitor and therefore go
// through `set_phase`. LOW and FLOATING do not switch the high side at all.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use critical_section::CriticalSection;

use super::duty::NormalizedDuty;
use super::MotorPwm;
use crate::timer::{Polarity, PwmTimers, HIGH_SIDE, LOW_SIDE};

/// Motor phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    A = 0,
    B = 1,
    C = 2,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::A, Phase::B, Phase::C];

    /// Phase with index 0, 1 or 2.
    ///
    /// # Panics
    /// On any other index. Writing to a fourth phase would hit undefined registers.
    pub const fn from_index(index: usize) -> Phase {
        match index {
            0 => Phase::A,
            1 => Phase::B,
            2 => Phase::C,
            _ => panic!("phase index out of range"),
        }
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Discrete output mode of a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseMode {
    /// Connected to the positive rail, low side still pulsing at the minimum width
    High,
    /// Low side permanently on
    Low,
    /// Both switches off
    Floating,
    /// 50% duty, which is zero applied voltage with complementary switching
    Half,
}

impl<T: PwmTimers> MotorPwm<T> {
    /// Programs the complementary pair of `phase` for `duty`.
    ///
    /// Takes a critical section token: compare and polarity registers are shared with the
    /// interrupt handlers that commutate the motor.
    pub fn set_phase(
        &mut self,
        _cs: CriticalSection<'_>,
        phase: Phase,
        duty: NormalizedDuty,
        inverted: bool,
    ) {
        let duty = duty.ticks();
        let dead_time = self.consts.dead_time_ticks;
        let above_center = duty > self.consts.half_top;

        let mut high = duty;
        let mut low = duty;
        match (inverted, above_center) {
            (false, true) => high -= dead_time,
            (false, false) => low += dead_time,
            (true, true) => low -= dead_time,
            (true, false) => high += dead_time,
        }

        // Inverted: high side inverted, low side not. Normal: the other way round
        let (high_pol, low_pol) = if inverted {
            (Polarity::Inverted, Polarity::Normal)
        } else {
            (Polarity::Normal, Polarity::Inverted)
        };

        let i = phase.index();
        self.timers.set_polarity(LOW_SIDE[i], low_pol);
        self.timers.set_polarity(HIGH_SIDE[i], high_pol);
        self.timers.set_compare(HIGH_SIDE[i], high);
        self.timers.set_compare(LOW_SIDE[i], low);
    }

    /// Puts `phase` into `mode`
    pub fn manip(&mut self, phase: Phase, mode: PhaseMode) {
        match mode {
            PhaseMode::High | PhaseMode::Half => {
                let code = if mode == PhaseMode::High {
                    self.consts.duty_max
                } else {
                    0
                };
                let duty = self.compute_normalized(code);
                critical_section::with(|cs| self.set_phase(cs, phase, duty, false));
            }
            PhaseMode::Low | PhaseMode::Floating => {
                // No high side pump needed, the cycling stops
                let low = if mode == PhaseMode::Low {
                    self.consts.top
                } else {
                    0
                };
                critical_section::with(|_| self.write_direct(phase, low));
            }
        }
    }

    /// Idle and startup state of the bridge
    pub fn set_all_floating(&mut self) {
        for phase in Phase::ALL {
            self.manip(phase, PhaseMode::Floating);
        }
    }

    /// Switches every gate off, whatever the previous mode of each phase.
    ///
    /// Nests inside any critical section the caller may hold.
    pub fn emergency_stop(&mut self) {
        critical_section::with(|_| {
            for phase in Phase::ALL {
                self.write_direct(phase, 0);
            }
        });
    }

    /// No inversion, high side off, low side compare as given
    fn write_direct(&mut self, phase: Phase, low: u16) {
        let i = phase.index();
        self.timers.set_polarity(LOW_SIDE[i], Polarity::Normal);
        self.timers.set_polarity(HIGH_SIDE[i], Polarity::Normal);
        self.timers.set_compare(HIGH_SIDE[i], 0);
        self.timers.set_compare(LOW_SIDE[i], low);
    }
}
