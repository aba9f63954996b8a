#![cfg_attr(target_arch = "arm", no_std, no_main)]

// On the host this target has nothing to run; the waveform is covered by
// tests/waveform.rs against the register models.
#[cfg(not(target_arch = "arm"))]
fn main() {}

#[cfg(target_arch = "arm")]
use cortex_m_rt as _;
#[cfg(all(target_arch = "arm", feature = "defmt"))]
use defmt_rtt as _;

#[cfg(target_arch = "arm")]
#[embedded_test::tests]
mod tests {
    use letimer_pwm::{
        clock::{Clock, ClockSource, ClockTree, LfBranch},
        gpio::{self, PinMode, PF4},
        letimer::{WaveformTimer, LOC28_PF4},
        pac::letimer::CNT,
        pac::{Gpio, Letimer, Peripherals},
        reg::Mmio,
    };

    struct State {
        gpio: Gpio<Mmio>,
        letimer0: Letimer<Mmio>,
        clocks: ClockTree<Mmio>,
    }

    /// This function is run before each test case.
    #[init]
    fn init() -> State {
        // SAFETY: each test case owns the chip for its whole run
        let p = unsafe { Peripherals::steal() };
        let mut clocks = ClockTree::new(p.cmu);
        clocks.enable(Clock::Gpio);
        clocks.enable(Clock::Le);
        clocks
            .select_source(LfBranch::Lfa, ClockSource::Lfxo)
            .unwrap();
        clocks.enable(Clock::Letimer0);
        State {
            gpio: p.gpio,
            letimer0: p.letimer0,
            clocks,
        }
    }

    fn spin(n: u32) {
        for _ in 0..n {
            cortex_m::asm::nop();
        }
    }

    #[test]
    fn tick_is_32k(state: State) {
        assert_eq!(state.clocks.frequency(Clock::Letimer0), 32_768);
    }

    #[test]
    fn counter_runs_after_start(state: State) {
        let State {
            gpio: pins,
            letimer0,
            clocks,
        } = state;
        gpio::set_pin_mode(&pins, PF4, PinMode::PushPull, false);
        let pwm = WaveformTimer::new(letimer0, clocks.frequency(Clock::Letimer0))
            .configure(1, 30)
            .route_output(LOC28_PF4)
            .start();
        assert_eq!(pwm.top(), 32_768);
        assert_eq!(pwm.compare(), 9_830);
        spin(100_000);
        assert!(pwm.is_running());
        let a = pwm.regs().cnt().read(CNT::CNT);
        spin(100_000);
        let b = pwm.regs().cnt().read(CNT::CNT);
        assert_ne!(a, b);
    }
}
