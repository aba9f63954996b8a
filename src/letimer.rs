//! Hardware PWM on LETIMER0.
//!
//! The timer counts down from COMP0 on the LF tick and reloads on underflow,
//! so COMP0 is the period. With the underflow output action set to PWM, OUT0
//! goes active when the counter passes COMP1 and idles again at underflow, so
//! COMP1 is the active time. Once started nothing in software touches it
//! again; the core can sleep in EM2 (or EM3 on ULFRCO) and the pin keeps
//! toggling.
//!
//! The setup order is encoded in the type:
//!
//! ```ignore
//! let pwm = WaveformTimer::new(p.letimer0, clocks.frequency(Clock::Letimer0))
//!     .configure(1, 30)          // Uninit -> Configured
//!     .route_output(LOC28_PF4)   // Configured -> Routed
//!     .start();                  // Routed -> Running
//! ```
//!
//! `Running` is final. There is no stop; the waveform runs until reset.
use core::marker::PhantomData;

use tock_registers::fields::FieldValue;

use crate::gpio::{GpioPin, Port};
use crate::pac::letimer::{Letimer, CMD, CNT, COMP, CTRL, REP, ROUTELOC0, ROUTEPEN, STATUS};
use crate::pwm_math;
use crate::reg::Bus;

/// COMP0/COMP1/CNT are 16 bit.
pub const MAX_TICKS: u32 = 0xFFFF;

/// What the counter does once REP0 runs out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RepeatMode {
    /// Count until stopped
    Free,
    /// Stop when REP0 reaches zero
    OneShot,
    /// Reload REP0 from REP1 once
    Buffered,
    /// Stop when both REP0 and REP1 reach zero
    Double,
}

impl RepeatMode {
    fn field(self) -> FieldValue<u32, CTRL::Register> {
        match self {
            RepeatMode::Free => CTRL::REPMODE::Free,
            RepeatMode::OneShot => CTRL::REPMODE::OneShot,
            RepeatMode::Buffered => CTRL::REPMODE::Buffered,
            RepeatMode::Double => CTRL::REPMODE::Double,
        }
    }
}

/// What OUT0 does on underflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputAction {
    None,
    Toggle,
    /// One tick active per underflow
    Pulse,
    /// Active from the COMP1 match to the underflow
    Pwm,
}

impl OutputAction {
    fn field(self) -> FieldValue<u32, CTRL::Register> {
        match self {
            OutputAction::None => CTRL::UFOA0::NoAction,
            OutputAction::Toggle => CTRL::UFOA0::Toggle,
            OutputAction::Pulse => CTRL::UFOA0::Pulse,
            OutputAction::Pwm => CTRL::UFOA0::Pwm,
        }
    }
}

/// Idle level of OUT0. The active level is the opposite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    IdleLow,
    IdleHigh,
}

/// One of the 32 fixed pins LETIMER0 OUT0 can be routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputLocation(u8);

/// PF4, LED0 on the starter kit.
pub const LOC28_PF4: OutputLocation = OutputLocation(28);

impl OutputLocation {
    /// `None` unless `index` is a valid location (0..=31).
    pub const fn new(index: u8) -> Option<Self> {
        if index < 32 {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    /// The pin this location drives.
    pub const fn pin(self) -> GpioPin {
        let i = self.0;
        match i {
            0..=5 => GpioPin::new(Port::A, i),
            6..=10 => GpioPin::new(Port::B, i + 5),
            11..=16 => GpioPin::new(Port::C, i - 5),
            17..=23 => GpioPin::new(Port::D, i - 8),
            _ => GpioPin::new(Port::F, i - 24),
        }
    }

    /// Location that drives `pin`, if OUT0 can reach it at all.
    pub fn for_pin(pin: GpioPin) -> Option<Self> {
        (0..32).map(OutputLocation).find(|loc| loc.pin() == pin)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Output frequency in Hz
    pub frequency_hz: u32,
    /// Active time in percent of the period, 0..=100
    pub duty_cycle_percent: u32,
    pub polarity: Polarity,
    /// REP0. PWM output only appears while this is nonzero.
    pub repeat: u8,
    pub output_action: OutputAction,
    pub repeat_mode: RepeatMode,
    /// Keep counting while the core is halted by a debugger
    pub debug_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            frequency_hz: 1,
            duty_cycle_percent: 30,
            polarity: Polarity::IdleLow,
            repeat: 1,
            output_action: OutputAction::Pwm,
            repeat_mode: RepeatMode::Free,
            debug_run: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    ZeroFrequency,
    DutyOutOfRange(u32),
    ZeroRepeat,
}

impl Config {
    /// Checks the things that would otherwise come out as a wrong or missing
    /// waveform. [`WaveformTimer::configure_with`] does not call this.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frequency_hz == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        if self.duty_cycle_percent > 100 {
            return Err(ConfigError::DutyOutOfRange(self.duty_cycle_percent));
        }
        if self.repeat == 0 {
            return Err(ConfigError::ZeroRepeat);
        }
        Ok(())
    }
}

pub struct Uninit;
pub struct Configured;
pub struct Routed;
pub struct Running;

pub struct WaveformTimer<B, S> {
    regs: Letimer<B>,
    tick_hz: u32,
    _state: PhantomData<S>,
}

impl<B: Bus, S> WaveformTimer<B, S> {
    fn into_state<T>(self) -> WaveformTimer<B, T> {
        WaveformTimer {
            regs: self.regs,
            tick_hz: self.tick_hz,
            _state: PhantomData,
        }
    }

    /// Tick rate the register values are computed from.
    pub fn tick_hz(&self) -> u32 {
        self.tick_hz
    }

    /// COMP0, the period in ticks.
    pub fn top(&self) -> u32 {
        self.regs.comp0().read(COMP::COMP)
    }

    /// COMP1, the active time in ticks.
    pub fn compare(&self) -> u32 {
        self.regs.comp1().read(COMP::COMP)
    }

    pub fn regs(&self) -> &Letimer<B> {
        &self.regs
    }
}

impl<B: Bus> WaveformTimer<B, Uninit> {
    /// `tick_hz` is what [`ClockTree::frequency`] reports for LETIMER0 after
    /// the clock tree has been set up.
    ///
    /// [`ClockTree::frequency`]: crate::clock::ClockTree::frequency
    pub fn new(regs: Letimer<B>, tick_hz: u32) -> Self {
        Self {
            regs,
            tick_hz,
            _state: PhantomData,
        }
    }

    /// Free-running PWM at `frequency_hz` with `duty_cycle_percent` active
    /// time. The counter is not started.
    ///
    /// Top and compare are clamped to 16 bits one by one, so a tick rate too
    /// fast for the requested frequency does not keep the duty ratio: both
    /// end up at 0xFFFF and the output sits at 100 %. A warning is logged;
    /// slow the tick down with the LETIMER0 prescaler instead.
    pub fn configure(self, frequency_hz: u32, duty_cycle_percent: u32) -> WaveformTimer<B, Configured> {
        self.configure_with(Config {
            frequency_hz,
            duty_cycle_percent,
            ..Config::default()
        })
    }

    pub fn configure_with(self, config: Config) -> WaveformTimer<B, Configured> {
        let top = pwm_math::top_value(self.tick_hz, config.frequency_hz);
        let compare = pwm_math::compare_value(self.tick_hz, config.frequency_hz, config.duty_cycle_percent);
        if top > MAX_TICKS || compare > MAX_TICKS {
            warn!(
                "top {} / compare {} exceed 16 bits, saturating; use a prescaler",
                top,
                compare
            );
        }
        let top = top.min(MAX_TICKS);
        let compare = compare.min(MAX_TICKS);

        let regs = &self.regs;
        regs.wait_sync();
        regs.cmd().write(CMD::STOP::SET);
        regs.ctrl().write(
            config.repeat_mode.field()
                + config.output_action.field()
                + CTRL::OPOL0.val((config.polarity == Polarity::IdleHigh) as u32)
                + CTRL::COMP0TOP::SET
                + CTRL::DEBUGRUN.val(config.debug_run as u32),
        );
        regs.rep0().write(REP::REP.val(config.repeat as u32));
        regs.comp0().write(COMP::COMP.val(top));
        regs.comp1().write(COMP::COMP.val(compare));
        // a full first period instead of an immediate underflow
        regs.cnt().write(CNT::CNT.val(top));
        info!(
            "letimer: {} Hz, {}% -> top {} compare {} at {} Hz tick",
            config.frequency_hz,
            config.duty_cycle_percent,
            top,
            compare,
            self.tick_hz
        );
        self.into_state()
    }
}

impl<B: Bus> WaveformTimer<B, Configured> {
    /// Connect OUT0 to `location`. The pin has to be an output already.
    pub fn route_output(self, location: OutputLocation) -> WaveformTimer<B, Routed> {
        let regs = &self.regs;
        regs.routepen().modify(ROUTEPEN::OUT0PEN::SET);
        regs.routeloc0()
            .modify(ROUTELOC0::OUT0LOC.val(location.index() as u32));
        debug!("OUT0 -> location {}", location.index());
        self.into_state()
    }
}

impl<B: Bus> WaveformTimer<B, Routed> {
    /// Start counting. From here on the waveform needs no software.
    pub fn start(self) -> WaveformTimer<B, Running> {
        let regs = &self.regs;
        regs.wait_sync();
        if regs.rep0().read(REP::REP) == 0 {
            // hardware keeps OUT0 idle with REP0 == 0, even in free mode
            warn!("REP0 is 0, OUT0 will stay idle");
        }
        regs.cmd().write(CMD::START::SET);
        self.into_state()
    }
}

impl<B: Bus> WaveformTimer<B, Running> {
    pub fn is_running(&self) -> bool {
        self.regs.status().is_set(STATUS::RUNNING)
    }
}
