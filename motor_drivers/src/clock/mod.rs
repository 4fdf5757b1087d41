// Implements the foreground clock used by the beeper: a microsecond monotonic counter and busy
// wait delays, both built on the DWT cycle counter.

// Detailed Operation:
// CYCCNT is 32 bits wide and wraps after ~25 s at 170 MHz. Every read folds the elapsed cycles
// into a 64-bit total, so the clock stays monotonic as long as it is read at least once per wrap.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use core::cell::Cell;

use cortex_m::peripheral::{DCB, DWT};
use embedded_hal::delay::DelayNs;

use motor_pwm::Monotonic;

pub struct DwtClock {
    core_hz: u32,
    last: Cell<u32>,
    cycles: Cell<u64>,
}

impl DwtClock {
    /// Starts the cycle counter. `core_hz` is the CPU clock.
    pub fn new(dcb: &mut DCB, dwt: &mut DWT, core_hz: u32) -> Self {
        dcb.enable_trace();
        dwt.enable_cycle_counter();

        DwtClock {
            core_hz,
            last: Cell::new(DWT::cycle_count()),
            cycles: Cell::new(0),
        }
    }

    /// Cycles since construction
    fn cycles(&self) -> u64 {
        let now = DWT::cycle_count();
        let elapsed = now.wrapping_sub(self.last.get());
        self.last.set(now);
        self.cycles.set(self.cycles.get() + elapsed as u64);
        self.cycles.get()
    }
}

impl Monotonic for DwtClock {
    fn now_us(&self) -> u64 {
        self.cycles() * 1_000_000 / self.core_hz as u64
    }
}

impl DelayNs for DwtClock {
    fn delay_ns(&mut self, ns: u32) {
        let cycles = (ns as u64 * self.core_hz as u64).div_ceil(1_000_000_000);
        cortex_m::asm::delay(cycles.min(u32::MAX as u64) as u32);
    }
}
