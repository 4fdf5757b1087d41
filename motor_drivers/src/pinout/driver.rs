//! Gate driver pins of the three-phase bridge.
use super::PinDef;
use super::{PinMode, Port};

/// Reset pin of the gate driver, active low
pub const RESET: PinDef = PinDef::new(Port::B, 2, PinMode::Output);

/// Enable pin of the gate driver
pub const ENABLE: PinDef = PinDef::new(Port::A, 4, PinMode::Output);

/// High-side gates of phases A, B, C: TIM4 CH1..CH3
pub const PWM_HIGH: [PinDef; 3] = [
    PinDef::new(Port::B, 6, PinMode::Alt(2)),
    PinDef::new(Port::B, 7, PinMode::Alt(2)),
    PinDef::new(Port::B, 8, PinMode::Alt(2)),
];

/// Low-side gates of phases A, B, C: TIM3 CH2..CH4
pub const PWM_LOW: [PinDef; 3] = [
    PinDef::new(Port::B, 5, PinMode::Alt(2)),
    PinDef::new(Port::B, 0, PinMode::Alt(2)),
    PinDef::new(Port::B, 1, PinMode::Alt(2)),
];

/// Configures the six gate pins and releases the driver from reset.
///
/// Outputs stay disabled; the caller enables them once the bridge is floating.
pub fn init() -> hal::gpio::Pin {
    for pin in PWM_HIGH.iter().chain(PWM_LOW.iter()) {
        pin.init();
    }

    let mut reset = RESET.init();
    reset.set_high();

    let mut enable = ENABLE.init();
    enable.set_low();
    enable
}
