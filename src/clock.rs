//! Low frequency clock tree.
//!
//! LETIMER0 runs from the LFA branch. Getting a usable tick out of it is three
//! steps and the order matters:
//!
//! 1. [`ClockTree::select_source`]: start an oscillator, wait for it, and
//!    point the branch at it.
//! 2. [`ClockTree::enable`]: open the gate from the branch to the consumer.
//! 3. [`ClockTree::frequency`]: read back the tick rate the consumer sees.
//!
//! Asking for the frequency before step 1 gives 0, the value a disabled branch
//! reports.

use tock_registers::fields::FieldValue;

use crate::low_power::EnergyMode;
use crate::pac::cmu::{HFBUSCLKEN0, LFACLKEN0, LFAPRESC0, LFCLKSEL, OSCENCMD, STATUS};
use crate::pac::Cmu;
use crate::reg::{Bus, Reg};

pub const LFXO_HZ: u32 = 32_768;
pub const LFRCO_HZ: u32 = 32_768;
pub const ULFRCO_HZ: u32 = 1_000;
/// HFRCO band out of reset. Nothing here changes it.
pub const HFRCO_DEFAULT_HZ: u32 = 19_000_000;
/// STATUS polls before an oscillator is given up on. LFXO needs about a
/// second to start on a cold crystal, this is several times that at 19 MHz.
pub const OSC_READY_TIMEOUT: u32 = 20_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// 32.768 kHz RC oscillator
    Lfrco,
    /// 32.768 kHz crystal
    Lfxo,
    /// 1 kHz RC oscillator, always on
    Ulfrco,
}

impl ClockSource {
    pub const fn frequency(self) -> u32 {
        match self {
            ClockSource::Lfrco => LFRCO_HZ,
            ClockSource::Lfxo => LFXO_HZ,
            ClockSource::Ulfrco => ULFRCO_HZ,
        }
    }

    /// Deepest energy mode this oscillator survives.
    pub const fn deepest_sleep(self) -> EnergyMode {
        match self {
            ClockSource::Lfrco | ClockSource::Lfxo => EnergyMode::Em2,
            ClockSource::Ulfrco => EnergyMode::Em3,
        }
    }

    fn select(self) -> FieldValue<u32, LFCLKSEL::Register> {
        match self {
            ClockSource::Lfrco => LFCLKSEL::SEL::Lfrco,
            ClockSource::Lfxo => LFCLKSEL::SEL::Lfxo,
            ClockSource::Ulfrco => LFCLKSEL::SEL::Ulfrco,
        }
    }

    fn from_select(sel: Option<LFCLKSEL::SEL::Value>) -> Option<Self> {
        match sel? {
            LFCLKSEL::SEL::Value::Disabled => None,
            LFCLKSEL::SEL::Value::Lfrco => Some(ClockSource::Lfrco),
            LFCLKSEL::SEL::Value::Lfxo => Some(ClockSource::Lfxo),
            LFCLKSEL::SEL::Value::Ulfrco => Some(ClockSource::Ulfrco),
        }
    }
}

/// Divider between the LFA branch and LETIMER0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Prescaler {
    Div1 = 0,
    Div2,
    Div4,
    Div8,
    Div16,
    Div32,
    Div64,
    Div128,
    Div256,
    Div512,
    Div1024,
    Div2048,
    Div4096,
    Div8192,
    Div16384,
    Div32768,
}

/// Low frequency branches with their own source select.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LfBranch {
    Lfa,
    Lfb,
    Lfe,
}

/// Clock gates in front of a consumer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Clock {
    /// Bus interface to the low energy peripherals
    Le,
    Gpio,
    Letimer0,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// The oscillator was enabled but never reported ready.
    OscillatorTimeout(ClockSource),
}

pub struct ClockTree<B> {
    cmu: Cmu<B>,
}

impl<B: Bus> ClockTree<B> {
    pub fn new(cmu: Cmu<B>) -> Self {
        Self { cmu }
    }

    pub fn cmu(&self) -> &Cmu<B> {
        &self.cmu
    }

    /// Start `source` and feed `branch` from it.
    ///
    /// The branch select is left alone if the oscillator does not come up.
    pub fn select_source(&mut self, branch: LfBranch, source: ClockSource) -> Result<(), ClockError> {
        self.start_oscillator(source)?;
        self.lfclksel(branch).write(source.select());
        info!("{:?} <- {:?}", branch, source);
        Ok(())
    }

    fn start_oscillator(&mut self, source: ClockSource) -> Result<(), ClockError> {
        match source {
            ClockSource::Lfrco => self.cmu.oscencmd().write(OSCENCMD::LFRCOEN::SET),
            ClockSource::Lfxo => self.cmu.oscencmd().write(OSCENCMD::LFXOEN::SET),
            ClockSource::Ulfrco => return Ok(()),
        }
        let ready = match source {
            ClockSource::Lfxo => STATUS::LFXORDY,
            _ => STATUS::LFRCORDY,
        };
        for _ in 0..OSC_READY_TIMEOUT {
            if self.cmu.status().is_set(ready) {
                return Ok(());
            }
        }
        error!("{:?} did not become ready", source);
        Err(ClockError::OscillatorTimeout(source))
    }

    /// Open the gate to `clock`.
    pub fn enable(&mut self, clock: Clock) {
        match clock {
            Clock::Le => self.cmu.hfbusclken0().modify(HFBUSCLKEN0::LE::SET),
            Clock::Gpio => self.cmu.hfbusclken0().modify(HFBUSCLKEN0::GPIO::SET),
            Clock::Letimer0 => {
                self.wait_lf_sync();
                self.cmu.lfaclken0().modify(LFACLKEN0::LETIMER0::SET);
            }
        }
        debug!("{:?} enabled", clock);
    }

    /// Divide the LFA clock going into LETIMER0.
    pub fn set_letimer_prescaler(&mut self, presc: Prescaler) {
        self.wait_lf_sync();
        self.cmu
            .lfapresc0()
            .modify(LFAPRESC0::LETIMER0.val(presc as u32));
    }

    /// Oscillator currently feeding `branch`, `None` while it is disabled.
    pub fn source(&self, branch: LfBranch) -> Option<ClockSource> {
        ClockSource::from_select(self.lfclksel(branch).read_as_enum(LFCLKSEL::SEL))
    }

    /// Frequency of `branch` in Hz, 0 while it is disabled.
    pub fn lf_frequency(&self, branch: LfBranch) -> u32 {
        self.source(branch).map_or(0, ClockSource::frequency)
    }

    /// Tick frequency seen by `clock`, in Hz.
    pub fn frequency(&self, clock: Clock) -> u32 {
        match clock {
            Clock::Le | Clock::Gpio => HFRCO_DEFAULT_HZ,
            Clock::Letimer0 => {
                let log2 = self.cmu.lfapresc0().read(LFAPRESC0::LETIMER0);
                self.lf_frequency(LfBranch::Lfa) >> log2
            }
        }
    }

    fn lfclksel(&self, branch: LfBranch) -> Reg<'_, B, LFCLKSEL::Register> {
        match branch {
            LfBranch::Lfa => self.cmu.lfaclksel(),
            LfBranch::Lfb => self.cmu.lfbclksel(),
            LfBranch::Lfe => self.cmu.lfeclksel(),
        }
    }

    // LFACLKEN0 and LFAPRESC0 live in the LF domain, a second write before the
    // first has synchronised is lost.
    fn wait_lf_sync(&self) {
        while self.cmu.syncbusy().get() != 0 {}
    }
}
