use hal::gpio::{Pin, PinMode, Port};

pub mod driver;

/// Board pin of the gate driver: port, number and mode, kept as a `const` table entry
pub struct PinDef {
    port: Port,
    pin: u8,
    mode: PinMode, // Alt(n) routes the pin to a timer channel
}

impl PinDef {
    pub const fn new(port: Port, pin: u8, mode: PinMode) -> PinDef {
        PinDef { port, pin, mode }
    }

    /// Applies the mode to the pad and returns the configured pin
    pub fn init(&self) -> Pin {
        Pin::new(self.port, self.pin, self.mode)
    }
}
