#![no_std]
#![no_main]

use defmt_rtt as _;

use letimer_pwm::{
    clock::{Clock, ClockSource, ClockTree, LfBranch},
    gpio::{self, PinMode, PF4},
    letimer::{WaveformTimer, LOC28_PF4},
    low_power,
};

const OUT_FREQ_HZ: u32 = 1;
const DUTY_CYCLE_PERCENT: u32 = 30;
const LF_SOURCE: ClockSource = ClockSource::Lfxo;

#[cortex_m_rt::entry]
fn main() -> ! {
    let p = letimer_pwm::init();
    let Some(core) = cortex_m::Peripherals::take() else {
        defmt::panic!("core peripherals already taken");
    };

    let mut clocks = ClockTree::new(p.cmu);
    clocks.enable(Clock::Gpio);
    gpio::set_pin_mode(&p.gpio, PF4, PinMode::PushPull, false);

    clocks.enable(Clock::Le);
    if let Err(e) = clocks.select_source(LfBranch::Lfa, LF_SOURCE) {
        defmt::panic!("LF clock: {:?}", e);
    }
    clocks.enable(Clock::Letimer0);

    let _pwm = WaveformTimer::new(p.letimer0, clocks.frequency(Clock::Letimer0))
        .configure(OUT_FREQ_HZ, DUTY_CYCLE_PERCENT)
        .route_output(LOC28_PF4)
        .start();
    defmt::info!("PWM on PF4: {} Hz, {}%", OUT_FREQ_HZ, DUTY_CYCLE_PERCENT);

    low_power::sleep_forever(&p.emu, clocks.cmu(), core.SCB, LF_SOURCE.deepest_sleep())
}
