// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::config::TimingConstants;

/// Duty in counter ticks, always within `[half_top, pwm_max]`.
///
/// With complementary switching the high and low pulses cancel at the center of the period,
/// so `half_top` means 0% applied and `top` would mean 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NormalizedDuty(u16);

impl NormalizedDuty {
    /// Ref. "Influence of PWM Schemes and Commutation Methods for DC and Brushless Motors
    /// and Drives", page 4.
    pub(crate) fn compute(consts: &TimingConstants, duty: u16) -> Self {
        // Precision loss is accepted, no rounding
        let corrected = duty >> consts.duty_shift;

        let top = consts.top;
        let mut normalized = top - top.saturating_sub(corrected) / 2;

        // Keep the high side pump capacitor cycling
        if normalized > consts.pwm_max {
            normalized = consts.pwm_max;
        }

        debug_assert!(normalized >= consts.half_top);
        debug_assert!(normalized <= top);
        NormalizedDuty(normalized)
    }

    #[inline(always)]
    pub fn ticks(self) -> u16 {
        self.0
    }
}
