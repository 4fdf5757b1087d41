// Implements the counter pair of the bridge on TIM3 (low side, leader) and TIM4 (high side,
// follower, ADC trigger on CH4).

// Key Features:
// - Center-aligned counting with preloaded reload and compare registers
// - Per-channel compare and polarity for the six gates
// - Leader/follower trigger for the synchronized start

// Detailed Operation:
// TIM3 CH2..CH4 drive the low-side gates and TIM4 CH1..CH3 the high-side gates. TIM3 emits
// TRGO on enable and TIM4 is put in trigger mode on ITR2 (TIM3) with master/slave delay, so
// setting CEN on TIM3 starts both on the same clock edge.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::{
    clocks::Clocks,
    pac::{RCC, TIM3, TIM4},
    timer::{
        Alignment, CaptureCompareDma, CountDir, MasterModeSelection, OutputCompare,
        Polarity as HalPolarity, TimChannel, Timer, TimerConfig, UpdateReqSrc,
    },
};

use motor_pwm::{Channel, Counter, MasterMode, Output, Polarity, PwmTimers, SlaveMode};

/// SMCR.SMS trigger mode: counter starts on a rising edge of TRGI
const SMS_TRIGGER: u8 = 0b0110;
/// SMCR.TS internal trigger 2, which is TIM3 for TIM4
const TS_ITR2: u8 = 0b0010;
/// CR1.CMS center-aligned mode 1
const CMS_CENTER1: u8 = 0b01;

/// Runs `$body` with `$tim` bound to the HAL timer of `$counter`
macro_rules! with_timer {
    ($self:ident, $counter:expr, |$tim:ident| $body:expr) => {
        match $counter {
            Counter::LowSide => {
                let $tim = &mut $self.low;
                $body
            }
            Counter::HighSide => {
                let $tim = &mut $self.high;
                $body
            }
        }
    };
}

pub struct BridgeTimers {
    low: Timer<TIM3>,
    high: Timer<TIM4>,
}

impl BridgeTimers {
    pub fn new(tim3: TIM3, tim4: TIM4, clock_cfg: &Clocks, pwm_freq: f32) -> Self {
        let cfg = || TimerConfig {
            one_pulse_mode: false,
            update_request_source: UpdateReqSrc::Any,
            auto_reload_preload: true,
            alignment: Alignment::Center1,
            capture_compare_dma: CaptureCompareDma::Update,
            direction: CountDir::Up,
        };

        BridgeTimers {
            low: Timer::new_tim3(tim3, pwm_freq, cfg(), clock_cfg),
            high: Timer::new_tim4(tim4, pwm_freq, cfg(), clock_cfg),
        }
    }

    #[inline(always)]
    fn channel(channel: Channel) -> TimChannel {
        match channel {
            Channel::C1 => TimChannel::C1,
            Channel::C2 => TimChannel::C2,
            Channel::C3 => TimChannel::C3,
            Channel::C4 => TimChannel::C4,
        }
    }
}

impl PwmTimers for BridgeTimers {
    fn enable_and_reset(&mut self) {
        let rcc = unsafe { &(*RCC::ptr()) };
        rcc.apb1enr1()
            .modify(|_, w| w.tim3en().set_bit().tim4en().set_bit());
        rcc.apb1rstr1()
            .modify(|_, w| w.tim3rst().set_bit().tim4rst().set_bit());
        rcc.apb1rstr1()
            .modify(|_, w| w.tim3rst().clear_bit().tim4rst().clear_bit());
    }

    fn configure(&mut self, counter: Counter, top: u16) {
        with_timer!(self, counter, |tim| {
            tim.set_prescaler(0);
            tim.set_auto_reload(top as u32);

            // Buffered update, center-aligned
            tim.regs
                .cr1()
                .modify(|_, w| unsafe { w.arpe().set_bit().cms().bits(CMS_CENTER1) });

            for channel in Channel::ALL {
                let channel = Self::channel(channel);
                tim.enable_pwm_output(channel, OutputCompare::Pwm1, 0.0);
                tim.set_preload(channel, true);
                tim.set_polarity(channel, HalPolarity::ActiveHigh);
            }

            // Fast enable on every channel
            tim.regs
                .ccmr1_output()
                .modify(|_, w| w.oc1fe().set_bit().oc2fe().set_bit());
            tim.regs
                .ccmr2_output()
                .modify(|_, w| w.oc3fe().set_bit().oc4fe().set_bit());
        })
    }

    fn set_compare(&mut self, output: Output, value: u16) {
        let channel = Self::channel(output.channel);
        with_timer!(self, output.counter, |tim| tim.set_duty(channel, value.into()))
    }

    fn set_polarity(&mut self, output: Output, polarity: Polarity) {
        let channel = Self::channel(output.channel);
        let polarity = match polarity {
            Polarity::Normal => HalPolarity::ActiveHigh,
            Polarity::Inverted => HalPolarity::ActiveLow,
        };
        with_timer!(self, output.counter, |tim| tim.set_polarity(channel, polarity))
    }

    fn generate_update(&mut self, counter: Counter) {
        with_timer!(self, counter, |tim| tim.reinitialize())
    }

    fn set_master_mode(&mut self, counter: Counter, mode: MasterMode) {
        let mode = match mode {
            MasterMode::Reset => MasterModeSelection::Reset,
            MasterMode::Enable => MasterModeSelection::Enable,
        };
        with_timer!(self, counter, |tim| tim.set_mastermode(mode))
    }

    fn set_slave_mode(&mut self, counter: Counter, mode: SlaveMode) {
        with_timer!(self, counter, |tim| match mode {
            SlaveMode::Disabled => tim.regs.smcr().reset(),
            SlaveMode::Trigger { .. } => tim.regs.smcr().write(|w| unsafe {
                w.sms().bits(SMS_TRIGGER).msm().set_bit().ts().bits(TS_ITR2)
            }),
        })
    }

    fn start(&mut self, counter: Counter) {
        with_timer!(self, counter, |tim| tim.enable())
    }

    fn stop(&mut self, counter: Counter) {
        with_timer!(self, counter, |tim| tim.disable())
    }

    fn is_running(&self, counter: Counter) -> bool {
        match counter {
            Counter::LowSide => self.low.is_enabled(),
            Counter::HighSide => self.high.is_enabled(),
        }
    }
}
