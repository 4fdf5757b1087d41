// Simulated counter pair and clock for the unit tests.

use embedded_hal::delay::DelayNs;

use crate::beep::Monotonic;
use crate::bridge::Phase;
use crate::timer::{
    Channel, Counter, MasterMode, Output, Polarity, PwmTimers, SlaveMode, HIGH_SIDE, LOW_SIDE,
};

/// Register level access recorded by [`SimTimers`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Compare(Output, u16),
    Polarity(Output, Polarity),
}

#[derive(Debug, Clone)]
pub struct SimCounter {
    pub clocked: bool,
    pub top: Option<u16>,
    pub compare: [u16; 4],
    pub polarity: [Polarity; 4],
    pub master: MasterMode,
    pub slave: SlaveMode,
    pub updates: u32,
    pub running: bool,
    /// Value of the simulated instant when counting began
    pub started_at: Option<u32>,
}

impl SimCounter {
    fn new() -> Self {
        SimCounter {
            clocked: false,
            top: None,
            compare: [0; 4],
            polarity: [Polarity::Normal; 4],
            master: MasterMode::Reset,
            slave: SlaveMode::Disabled,
            updates: 0,
            running: false,
            started_at: None,
        }
    }
}

/// Gate state of one phase as seen on the compare and polarity registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseState {
    pub high: u16,
    pub low: u16,
    pub high_inverted: bool,
    pub low_inverted: bool,
}

pub struct SimTimers {
    pub counters: [SimCounter; 2],
    pub accesses: Vec<Access>,
    /// Follower ignores the trigger, as with a wrong trigger source wiring
    pub ignore_trigger: bool,
    instant: u32,
}

impl SimTimers {
    pub fn new() -> Self {
        SimTimers {
            counters: [SimCounter::new(), SimCounter::new()],
            accesses: Vec::new(),
            ignore_trigger: false,
            instant: 0,
        }
    }

    pub fn counter(&self, counter: Counter) -> &SimCounter {
        &self.counters[counter as usize]
    }

    pub fn compare(&self, output: Output) -> u16 {
        self.counter(output.counter).compare[output.channel as usize]
    }

    pub fn polarity(&self, output: Output) -> Polarity {
        self.counter(output.counter).polarity[output.channel as usize]
    }

    pub fn phase(&self, phase: Phase) -> PhaseState {
        let high = HIGH_SIDE[phase.index()];
        let low = LOW_SIDE[phase.index()];
        PhaseState {
            high: self.compare(high),
            low: self.compare(low),
            high_inverted: self.polarity(high) == Polarity::Inverted,
            low_inverted: self.polarity(low) == Polarity::Inverted,
        }
    }

    /// Puts arbitrary compare and polarity values on every channel
    pub fn scramble(&mut self) {
        for (i, counter) in self.counters.iter_mut().enumerate() {
            for channel in Channel::ALL {
                let ch = channel as usize;
                counter.compare[ch] = 100 + 37 * (i as u16) + 11 * ch as u16;
                counter.polarity[ch] = if (i + ch) % 2 == 0 {
                    Polarity::Inverted
                } else {
                    Polarity::Normal
                };
            }
        }
    }

    fn counter_mut(&mut self, counter: Counter) -> &mut SimCounter {
        &mut self.counters[counter as usize]
    }
}

impl PwmTimers for SimTimers {
    fn enable_and_reset(&mut self) {
        for counter in self.counters.iter_mut() {
            *counter = SimCounter::new();
            counter.clocked = true;
        }
    }

    fn configure(&mut self, counter: Counter, top: u16) {
        let counter = self.counter_mut(counter);
        assert!(counter.clocked, "configured without clock");
        counter.top = Some(top);
        counter.polarity = [Polarity::Normal; 4];
    }

    fn set_compare(&mut self, output: Output, value: u16) {
        self.accesses.push(Access::Compare(output, value));
        self.counter_mut(output.counter).compare[output.channel as usize] = value;
    }

    fn set_polarity(&mut self, output: Output, polarity: Polarity) {
        self.accesses.push(Access::Polarity(output, polarity));
        self.counter_mut(output.counter).polarity[output.channel as usize] = polarity;
    }

    fn generate_update(&mut self, counter: Counter) {
        self.counter_mut(counter).updates += 1;
    }

    fn set_master_mode(&mut self, counter: Counter, mode: MasterMode) {
        self.counter_mut(counter).master = mode;
    }

    fn set_slave_mode(&mut self, counter: Counter, mode: SlaveMode) {
        self.counter_mut(counter).slave = mode;
    }

    fn start(&mut self, counter: Counter) {
        self.instant += 1;
        let instant = self.instant;
        let emits_trigger = self.counter(counter).master == MasterMode::Enable;

        let leader = self.counter_mut(counter);
        leader.running = true;
        leader.started_at = Some(instant);

        if !emits_trigger || self.ignore_trigger {
            return;
        }
        for other in self.counters.iter_mut() {
            if other.slave == (SlaveMode::Trigger { source: counter }) && !other.running {
                other.running = true;
                other.started_at = Some(instant);
            }
        }
    }

    fn stop(&mut self, counter: Counter) {
        self.counter_mut(counter).running = false;
    }

    fn is_running(&self, counter: Counter) -> bool {
        self.counter(counter).running
    }
}

/// Clock that only moves when something waits on it
pub struct SimClock {
    pub now_ns: u64,
}

impl SimClock {
    pub fn new() -> Self {
        SimClock { now_ns: 0 }
    }
}

impl DelayNs for SimClock {
    fn delay_ns(&mut self, ns: u32) {
        self.now_ns += ns as u64;
    }
}

impl Monotonic for SimClock {
    fn now_us(&self) -> u64 {
        self.now_ns / 1000
    }
}
