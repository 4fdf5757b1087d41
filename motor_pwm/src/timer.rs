// Contract between the PWM logic and the counter pair that generates the gate signals.

// Key Features:
// - Names the two counters, their channels, polarity and synchronization modes
// - Holds the channel map of the bridge (which compare register drives which gate)
// - Declares the PwmTimers trait implemented by the board driver and by the test simulator

// Detailed Operation:
// The low-side counter drives the low-side gates and leads the synchronized start.
// The high-side counter drives the high-side gates and, on its fourth channel, the ADC trigger.
// Both counters count center-aligned up to the same top value, so a compare value `x` on either
// of them produces a pulse centered on the same instant of the PWM period.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// One of the two counters of the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Counter {
    /// Low-side gates, leader of the synchronized start
    LowSide = 0,
    /// High-side gates and ADC trigger, follower of the synchronized start
    HighSide = 1,
}

/// Output compare channel of a counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    C1 = 0,
    C2 = 1,
    C3 = 2,
    C4 = 3,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::C1, Channel::C2, Channel::C3, Channel::C4];
}

/// Signal sense of an output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Output is active while the counter is below the compare value
    Normal,
    /// Output sense inverted (polarity bit set)
    Inverted,
}

/// What a counter emits on its trigger output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MasterMode {
    /// No start-of-counting trigger
    Reset,
    /// Trigger pulse when counting is enabled
    Enable,
}

/// How a counter reacts to the trigger of the other counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlaveMode {
    /// Free running
    Disabled,
    /// Starts counting on the trigger of `source`, clocks aligned with it
    Trigger { source: Counter },
}

/// A single gate output: a counter and one of its channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Output {
    pub counter: Counter,
    pub channel: Channel,
}

impl Output {
    pub const fn new(counter: Counter, channel: Channel) -> Self {
        Output { counter, channel }
    }
}

/// High-side gate of phases A, B, C
pub const HIGH_SIDE: [Output; 3] = [
    Output::new(Counter::HighSide, Channel::C1),
    Output::new(Counter::HighSide, Channel::C2),
    Output::new(Counter::HighSide, Channel::C3),
];

/// Low-side gate of phases A, B, C
pub const LOW_SIDE: [Output; 3] = [
    Output::new(Counter::LowSide, Channel::C2),
    Output::new(Counter::LowSide, Channel::C3),
    Output::new(Counter::LowSide, Channel::C4),
];

/// Channel whose compare event triggers the ADC
pub const ADC_TRIGGER: Output = Output::new(Counter::HighSide, Channel::C4);

/// Counter pair driving the bridge.
///
/// Compare and reload registers are preloaded: a write becomes visible to the gates on the
/// next update event, never in the middle of a period.
pub trait PwmTimers {
    /// Enables the clocks of both counters and pulses their reset lines.
    /// Called with interrupts masked.
    fn enable_and_reset(&mut self);

    /// Center-aligned counting from 0 to `top` with preloaded reload, every channel in PWM
    /// mode with fast enable and compare preload, every output enabled with normal polarity.
    /// The counter is left stopped.
    fn configure(&mut self, counter: Counter, top: u16);

    fn set_compare(&mut self, output: Output, value: u16);

    fn set_polarity(&mut self, output: Output, polarity: Polarity);

    /// Forces an update event, moving preloaded values into the active registers
    fn generate_update(&mut self, counter: Counter);

    fn set_master_mode(&mut self, counter: Counter, mode: MasterMode);

    fn set_slave_mode(&mut self, counter: Counter, mode: SlaveMode);

    fn start(&mut self, counter: Counter);

    fn stop(&mut self, counter: Counter);

    fn is_running(&self, counter: Counter) -> bool;
}
