#![no_main]
#![no_std]

use defmt_rtt as _;
use panic_probe as _;

use cortex_m_rt::entry;
use hal::{self, clocks::Clocks, pac};

use motor_drivers::{clock::DwtClock, pinout, pwm::BridgeTimers};
use motor_pwm::{MotorPwm, PwmConfig};

/// Counter resolution; 10 bits cannot hold the dead time at 170 MHz
const PWM_RESOLUTION_BITS: u8 = 11;

const STARTUP_BEEP_HZ: u32 = 2000;
const STARTUP_BEEP_MS: u32 = 200;

#[entry]
fn main() -> ! {
    let mut cp = cortex_m::Peripherals::take().unwrap();
    let dp = pac::Peripherals::take().unwrap();

    let clock_cfg = Clocks::default();
    clock_cfg.setup().unwrap();

    let sysclk_freq = clock_cfg.sysclk(); // System clock frequency in Hz
    defmt::debug!("SYSTEM: Clock frequency is {} MHz", sysclk_freq / 1000000);

    let mut dr_en = pinout::driver::init();

    let config = PwmConfig {
        timer_clock_hz: clock_cfg.apb1_timer(),
        resolution_bits: PWM_RESOLUTION_BITS,
        ..Default::default()
    };

    // Timer frequency is reprogrammed by the bridge bring-up, the HAL only needs a valid one
    let pwm_freq = (config.timer_clock_hz >> PWM_RESOLUTION_BITS) as f32;
    let timers = BridgeTimers::new(dp.TIM3, dp.TIM4, &clock_cfg, pwm_freq);

    let mut motor = match MotorPwm::init(timers, &config) {
        Ok(motor) => motor,
        Err(e) => defmt::panic!("Motor: bring-up failed: {}", e),
    };

    // Bridge is floating, gates can follow the timers now
    dr_en.set_high();

    let mut clock = DwtClock::new(&mut cp.DCB, &mut cp.DWT, sysclk_freq);
    motor.beep(&mut clock, STARTUP_BEEP_HZ, STARTUP_BEEP_MS);

    loop {
        cortex_m::asm::wfi();
    }
}

#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}
