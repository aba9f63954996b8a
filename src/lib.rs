#![cfg_attr(not(test), no_std)]

//! LETIMER0 PWM for EFM32 Series 1.
//!
//! A boot that wants a waveform on a pin and nothing else:
//! [`init`], set up the clock tree, put the pin in push-pull, configure and
//! route LETIMER0, start it, then [`low_power::sleep_forever`].
//!
//! Everything register-facing is generic over [`reg::Bus`]. On the chip that
//! is [`reg::Mmio`]; on the host [`sim`] provides register models so the same
//! code can be tested without hardware.

#[macro_use]
mod fmt;

// Pure modules (available everywhere)
pub mod pwm_math;
pub mod reg;

pub mod clock;
pub mod gpio;
pub mod letimer;
pub mod low_power;
pub mod pac;
#[cfg(not(target_arch = "arm"))]
pub mod sim;

#[cfg(all(feature = "utils", target_arch = "arm", not(test)))]
mod utils;

/// Board bring-up. Hands out the peripherals; panics if called twice.
///
/// EFM32PG1 revision C needs no errata fixups for the LF domain, so this is
/// where they would go and currently does nothing else.
pub fn init() -> pac::Peripherals {
    let Some(p) = pac::Peripherals::take() else {
        panic!("init called twice");
    };
    debug!("chip init: no errata fixups");
    p
}
