// Six-step commutation table, read by the sequencer that decides which phase gets which mode.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::bridge::{Phase, PhaseMode};

pub const NUM_COMMUTATION_STEPS: usize = 6;

/// Phases energized on one electrical step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommutationStep {
    pub positive: Phase,
    pub negative: Phase,
    pub floating: Phase,
}

impl CommutationStep {
    const fn new(positive: Phase, negative: Phase, floating: Phase) -> Self {
        CommutationStep {
            positive,
            negative,
            floating,
        }
    }

    /// Output mode of `phase` on this step
    pub fn phase_mode(&self, phase: Phase) -> PhaseMode {
        if phase == self.positive {
            PhaseMode::High
        } else if phase == self.negative {
            PhaseMode::Low
        } else {
            PhaseMode::Floating
        }
    }
}

use crate::bridge::Phase::{A, B, C};

pub const COMMUTATION_TABLE: [CommutationStep; NUM_COMMUTATION_STEPS] = [
    CommutationStep::new(B, A, C), // Positive, negative, floating
    CommutationStep::new(B, C, A),
    CommutationStep::new(A, C, B),
    CommutationStep::new(A, B, C),
    CommutationStep::new(C, B, A),
    CommutationStep::new(C, A, B),
];

/// Step `index`, wrapping around after the sixth
#[inline(always)]
pub fn commutation_step(index: usize) -> &'static CommutationStep {
    &COMMUTATION_TABLE[index % NUM_COMMUTATION_STEPS]
}
