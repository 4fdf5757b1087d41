// Brings up the counter pair: identical center-aligned configuration, then a synchronized start.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::config::TimingConstants;
use crate::error::BringupError;
use crate::timer::{Counter, MasterMode, PwmTimers, SlaveMode, ADC_TRIGGER};

/// Emits the start trigger
pub(super) const LEADER: Counter = Counter::LowSide;
/// Starts on the trigger of the leader
pub(super) const FOLLOWER: Counter = Counter::HighSide;

const BOTH: [Counter; 2] = [LEADER, FOLLOWER];

/// Configures both counters identically and leaves them stopped.
pub(super) fn configure_counters<T: PwmTimers>(timers: &mut T, consts: &TimingConstants) {
    // Known power-on state, whatever ran before
    critical_section::with(|_| timers.enable_and_reset());

    for counter in BOTH {
        timers.configure(counter, consts.top);
    }

    // ADC sampling slightly before the symmetric center of the period
    timers.set_compare(ADC_TRIGGER, consts.adc_trigger_compare());

    // Push reload, compare and mode into the active registers
    for counter in BOTH {
        timers.generate_update(counter);
    }
}

/// Starts both counters on the same clock edge.
///
/// The leader emits a trigger when it is enabled and the follower is gated on that trigger.
/// The link is removed right after the start so the counters run independently.
pub(super) fn start_counters<T: PwmTimers>(timers: &mut T) -> Result<(), BringupError> {
    for counter in BOTH {
        if timers.is_running(counter) {
            return Err(BringupError::CounterAlreadyRunning(counter));
        }
    }

    timers.set_master_mode(LEADER, MasterMode::Enable);
    timers.set_slave_mode(FOLLOWER, SlaveMode::Trigger { source: LEADER });

    timers.start(LEADER);

    timers.set_master_mode(LEADER, MasterMode::Reset);
    timers.set_slave_mode(FOLLOWER, SlaveMode::Disabled);

    for counter in BOTH {
        if !timers.is_running(counter) {
            // Never leave one of them counting alone
            for counter in BOTH {
                timers.stop(counter);
            }
            return Err(BringupError::CounterNotStarted(counter));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PwmConfig;
    use crate::sim::SimTimers;
    use crate::timer::Channel;

    fn consts() -> TimingConstants {
        TimingConstants::derive(&PwmConfig::default()).unwrap()
    }

    #[test]
    fn counters_are_configured_but_stopped() {
        let mut timers = SimTimers::new();
        configure_counters(&mut timers, &consts());

        for counter in BOTH {
            let sim = timers.counter(counter);
            assert!(sim.clocked);
            assert_eq!(sim.top, Some(1023));
            assert_eq!(sim.updates, 1);
            assert!(!sim.running);
        }
        assert_eq!(timers.compare(ADC_TRIGGER), 512 - 14);
        assert_eq!(ADC_TRIGGER.counter, Counter::HighSide);
        assert_eq!(ADC_TRIGGER.channel, Channel::C4);
    }

    #[test]
    fn follower_starts_with_leader_and_link_is_removed() {
        let mut timers = SimTimers::new();
        configure_counters(&mut timers, &consts());

        assert_eq!(start_counters(&mut timers), Ok(()));

        let leader = timers.counter(LEADER);
        let follower = timers.counter(FOLLOWER);
        assert!(leader.running && follower.running);
        assert!(leader.started_at.is_some());
        assert_eq!(leader.started_at, follower.started_at);
        assert_eq!(leader.master, MasterMode::Reset);
        assert_eq!(follower.slave, SlaveMode::Disabled);
    }

    #[test]
    fn follower_ignoring_trigger_is_fatal() {
        let mut timers = SimTimers::new();
        timers.ignore_trigger = true;
        configure_counters(&mut timers, &consts());

        assert_eq!(
            start_counters(&mut timers),
            Err(BringupError::CounterNotStarted(FOLLOWER))
        );
        assert!(!timers.is_running(LEADER));
        assert!(!timers.is_running(FOLLOWER));
    }

    #[test]
    fn running_counter_is_fatal() {
        let mut timers = SimTimers::new();
        configure_counters(&mut timers, &consts());
        timers.start(FOLLOWER);

        assert_eq!(
            start_counters(&mut timers),
            Err(BringupError::CounterAlreadyRunning(FOLLOWER))
        );
    }

    #[test]
    fn reset_clears_a_previous_session() {
        let mut timers = SimTimers::new();
        configure_counters(&mut timers, &consts());
        start_counters(&mut timers).unwrap();

        configure_counters(&mut timers, &consts());
        assert!(!timers.is_running(LEADER));
        assert_eq!(start_counters(&mut timers), Ok(()));
    }
}
