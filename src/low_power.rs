//! Energy modes.
//!
//! The EFM32 energy modes that matter here:
//!
//!  * `EM1`: core clock gated, everything else runs. Plain `WFI` without
//!    `SLEEPDEEP`.
//!  * `EM2`: high frequency clocks off. LFXO and LFRCO keep running, so does
//!    anything on the LFA branch, including LETIMER0.
//!  * `EM3`: like EM2 but only ULFRCO is left. A timer on ULFRCO keeps going,
//!    one on LFXO stops.
//!
//! [`sleep_forever`] is the end of a boot that hands the waveform to the
//! hardware: it never returns, and every wake (an interrupt from somewhere
//! else) goes straight back to sleep.

use crate::pac::cmu::OSCENCMD;
use crate::pac::emu::CTRL;
use crate::pac::{Cmu, Emu};
use crate::reg::Bus;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnergyMode {
    Em1,
    Em2,
    Em3,
}

impl EnergyMode {
    /// SLEEPDEEP has to be set for this mode.
    pub fn is_deep(self) -> bool {
        self >= EnergyMode::Em2
    }
}

/// Get the EMU and CMU ready for `mode`.
///
/// EM2 and EM3 need EM2BLOCK clear, otherwise deep sleep silently degrades
/// to EM1. EM3 additionally turns LFXO and LFRCO off.
pub fn prepare<E: Bus, C: Bus>(emu: &Emu<E>, cmu: &Cmu<C>, mode: EnergyMode) {
    if mode.is_deep() {
        emu.ctrl().modify(CTRL::EM2BLOCK::CLEAR);
    }
    if mode == EnergyMode::Em3 {
        cmu.oscencmd()
            .write(OSCENCMD::LFXODIS::SET + OSCENCMD::LFRCODIS::SET);
    }
    debug!("prepared for {:?}", mode);
}

/// Enter `mode` once. Returns after the next wake-up event.
#[cfg(target_arch = "arm")]
pub fn enter(scb: &mut cortex_m::peripheral::SCB, mode: EnergyMode) {
    if mode.is_deep() {
        scb.set_sleepdeep();
    } else {
        scb.clear_sleepdeep();
    }
    cortex_m::asm::dsb();
    cortex_m::asm::wfi();
}

/// Put the core to sleep for good. Peripherals on a clock that survives `mode`
/// keep running.
#[cfg(target_arch = "arm")]
pub fn sleep_forever<E: Bus, C: Bus>(
    emu: &Emu<E>,
    cmu: &Cmu<C>,
    mut scb: cortex_m::peripheral::SCB,
    mode: EnergyMode,
) -> ! {
    prepare(emu, cmu, mode);
    info!("entering {:?}, waveform continues in hardware", mode);
    loop {
        enter(&mut scb, mode);
    }
}
