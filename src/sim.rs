//! Host model of the chip.
//!
//! The register blocks here implement [`Bus`], so the real [`ClockTree`] and
//! [`WaveformTimer`] code runs against them unchanged. [`Board`] wires the
//! CMU, GPIO and LETIMER0 models together and lets a test step the LF clock
//! and look at a pin the way a logic analyser would.
//!
//! Timer model: with COMP0 as top the counter visits `top, top-1, .., 1` and
//! reloads on the tick after 1, so one period is exactly `top` ticks. In PWM
//! mode OUT0 is active while `CNT <= COMP1`. Silicon spends one more tick at
//! zero before reloading; the model folds that tick into the reload so 0 %
//! and 100 % duty come out as flat lines.
//!
//! [`ClockTree`]: crate::clock::ClockTree
//! [`WaveformTimer`]: crate::letimer::WaveformTimer

use core::cell::Cell;

use heapless::Vec;
use tock_registers::LocalRegisterCopy;

use crate::clock::ClockSource;
use crate::gpio::GpioPin;
use crate::letimer::OutputLocation;
use crate::pac::cmu::{self, LFACLKEN0, LFAPRESC0, LFCLKSEL, OSCENCMD};
use crate::pac::letimer::{self, CMD, COMP, CTRL, REP, ROUTELOC0, ROUTEPEN};
use crate::pac::{self, gpio};
use crate::reg::Bus;

type RepMode = CTRL::REPMODE::Value;
type UnderflowAction = CTRL::UFOA0::Value;

/// Anything that advances on a clock edge.
pub trait Clocked {
    fn tick(&self);
}

/// Plain RAM registers. Reads outside the block return zero, writes are
/// dropped.
pub struct RegisterFile<const N: usize> {
    words: [Cell<u32>; N],
}

impl<const N: usize> RegisterFile<N> {
    pub fn new() -> Self {
        Self {
            words: core::array::from_fn(|_| Cell::new(0)),
        }
    }

    fn copy<R: tock_registers::RegisterLongName>(&self, offset: usize) -> LocalRegisterCopy<u32, R> {
        LocalRegisterCopy::new(self.read(offset))
    }
}

impl<const N: usize> Default for RegisterFile<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Bus for RegisterFile<N> {
    fn read(&self, offset: usize) -> u32 {
        self.words.get(offset / 4).map_or(0, Cell::get)
    }
    fn write(&self, offset: usize, value: u32) {
        if let Some(w) = self.words.get(offset / 4) {
            w.set(value);
        }
    }
}

const CMU_WORDS: usize = cmu::offset::SYNCBUSY / 4 + 1;
const EMU_WORDS: usize = 4;
const GPIO_WORDS: usize = 6 * gpio::PORT_STRIDE / 4;
const LETIMER_WORDS: usize = letimer::offset::ROUTELOC0 / 4 + 1;

pub type SimEmu = RegisterFile<EMU_WORDS>;
pub type SimGpio = RegisterFile<GPIO_WORDS>;

/// CMU with oscillators that come up as soon as they are enabled, unless
/// told otherwise with [`SimCmu::kill`].
pub struct SimCmu {
    regs: RegisterFile<CMU_WORDS>,
    dead: Cell<Option<ClockSource>>,
}

impl SimCmu {
    pub fn new() -> Self {
        Self {
            regs: RegisterFile::new(),
            dead: Cell::new(None),
        }
    }

    /// The oscillator never reports ready, like a crystal that isn't fitted.
    pub fn kill(&self, source: ClockSource) {
        self.dead.set(Some(source));
    }

    fn alive(&self, source: ClockSource) -> bool {
        self.dead.get() != Some(source)
    }

    /// LFA is selected onto an oscillator that is running.
    pub fn lfa_running(&self) -> bool {
        let sel: LocalRegisterCopy<u32, LFCLKSEL::Register> = self.regs.copy(cmu::offset::LFACLKSEL);
        let status: LocalRegisterCopy<u32, cmu::STATUS::Register> = self.regs.copy(cmu::offset::STATUS);
        match sel.read_as_enum(LFCLKSEL::SEL) {
            Some(LFCLKSEL::SEL::Value::Lfrco) => status.is_set(cmu::STATUS::LFRCORDY),
            Some(LFCLKSEL::SEL::Value::Lfxo) => status.is_set(cmu::STATUS::LFXORDY),
            Some(LFCLKSEL::SEL::Value::Ulfrco) => true,
            Some(LFCLKSEL::SEL::Value::Disabled) | None => false,
        }
    }

    pub fn letimer0_gated(&self) -> bool {
        self.regs
            .copy::<LFACLKEN0::Register>(cmu::offset::LFACLKEN0)
            .is_set(LFACLKEN0::LETIMER0)
    }

    pub fn letimer0_divisor(&self) -> u32 {
        let log2 = self
            .regs
            .copy::<LFAPRESC0::Register>(cmu::offset::LFAPRESC0)
            .read(LFAPRESC0::LETIMER0);
        1 << log2
    }
}

impl Default for SimCmu {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimCmu {
    fn read(&self, offset: usize) -> u32 {
        match offset {
            cmu::offset::OSCENCMD => 0,
            _ => self.regs.read(offset),
        }
    }

    fn write(&self, offset: usize, value: u32) {
        if offset != cmu::offset::OSCENCMD {
            return self.regs.write(offset, value);
        }
        let cmd: LocalRegisterCopy<u32, OSCENCMD::Register> = LocalRegisterCopy::new(value);
        let mut st: LocalRegisterCopy<u32, cmu::STATUS::Register> = self.regs.copy(cmu::offset::STATUS);
        if cmd.is_set(OSCENCMD::LFRCOEN) {
            let ready = self.alive(ClockSource::Lfrco) as u32;
            st.modify(cmu::STATUS::LFRCOENS::SET + cmu::STATUS::LFRCORDY.val(ready));
        }
        if cmd.is_set(OSCENCMD::LFRCODIS) {
            st.modify(cmu::STATUS::LFRCOENS::CLEAR + cmu::STATUS::LFRCORDY::CLEAR);
        }
        if cmd.is_set(OSCENCMD::LFXOEN) {
            let ready = self.alive(ClockSource::Lfxo) as u32;
            st.modify(cmu::STATUS::LFXOENS::SET + cmu::STATUS::LFXORDY.val(ready));
        }
        if cmd.is_set(OSCENCMD::LFXODIS) {
            st.modify(cmu::STATUS::LFXOENS::CLEAR + cmu::STATUS::LFXORDY::CLEAR);
        }
        self.regs.write(cmu::offset::STATUS, st.get());
    }
}

/// LETIMER0 behaviour: CMD/STATUS semantics, the counter and OUT0.
pub struct SimLetimer {
    regs: RegisterFile<LETIMER_WORDS>,
    cnt: Cell<u32>,
    running: Cell<bool>,
    active: Cell<bool>,
    underflows: Cell<u32>,
}

impl SimLetimer {
    pub fn new() -> Self {
        Self {
            regs: RegisterFile::new(),
            cnt: Cell::new(0),
            running: Cell::new(false),
            active: Cell::new(false),
            underflows: Cell::new(0),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn count(&self) -> u32 {
        self.cnt.get()
    }

    pub fn underflows(&self) -> u32 {
        self.underflows.get()
    }

    fn ctrl(&self) -> LocalRegisterCopy<u32, CTRL::Register> {
        self.regs.copy(letimer::offset::CTRL)
    }

    fn comp(&self, offset: usize) -> u32 {
        self.regs.copy::<COMP::Register>(offset).read(COMP::COMP)
    }

    fn rep(&self, offset: usize) -> u32 {
        self.regs.copy::<REP::Register>(offset).read(REP::REP)
    }

    /// OUT0 level with polarity applied, before routing.
    pub fn out0(&self) -> bool {
        self.active.get() != self.ctrl().is_set(CTRL::OPOL0)
    }

    /// Where OUT0 is routed and its level, `None` while routing is off.
    pub fn routed_out0(&self) -> Option<(OutputLocation, bool)> {
        let pen: LocalRegisterCopy<u32, ROUTEPEN::Register> = self.regs.copy(letimer::offset::ROUTEPEN);
        if !pen.is_set(ROUTEPEN::OUT0PEN) {
            return None;
        }
        let loc = self
            .regs
            .copy::<ROUTELOC0::Register>(letimer::offset::ROUTELOC0)
            .read(ROUTELOC0::OUT0LOC);
        OutputLocation::new(loc as u8).map(|l| (l, self.out0()))
    }

    // One-shot family bookkeeping on underflow. Returns false when the timer
    // stopped.
    fn count_repeat(&self, mode: RepMode) -> bool {
        if mode == RepMode::Free {
            return true;
        }
        let left = self.rep(letimer::offset::REP0).saturating_sub(1);
        self.regs.write(letimer::offset::REP0, left);
        if left != 0 {
            return true;
        }
        let rep1 = self.rep(letimer::offset::REP1);
        if mode != RepMode::OneShot && rep1 != 0 {
            self.regs.write(letimer::offset::REP0, rep1);
            self.regs.write(letimer::offset::REP1, 0);
            return true;
        }
        self.running.set(false);
        self.active.set(false);
        false
    }
}

impl Default for SimLetimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimLetimer {
    fn read(&self, offset: usize) -> u32 {
        match offset {
            letimer::offset::CMD | letimer::offset::SYNCBUSY => 0,
            letimer::offset::STATUS => self.running.get() as u32,
            letimer::offset::CNT => self.cnt.get(),
            _ => self.regs.read(offset),
        }
    }

    fn write(&self, offset: usize, value: u32) {
        match offset {
            letimer::offset::CMD => {
                let cmd: LocalRegisterCopy<u32, CMD::Register> = LocalRegisterCopy::new(value);
                if cmd.is_set(CMD::CLEAR) {
                    self.cnt.set(0);
                }
                if cmd.is_set(CMD::CTO0) {
                    self.active.set(false);
                }
                if cmd.is_set(CMD::STOP) {
                    self.running.set(false);
                }
                if cmd.is_set(CMD::START) {
                    self.running.set(true);
                }
            }
            letimer::offset::CNT => self.cnt.set(value & 0xFFFF),
            letimer::offset::STATUS | letimer::offset::SYNCBUSY => {}
            _ => self.regs.write(offset, value),
        }
    }
}

impl Clocked for SimLetimer {
    fn tick(&self) {
        if !self.running.get() {
            return;
        }
        let ctrl = self.ctrl();
        let top = if ctrl.is_set(CTRL::COMP0TOP) {
            self.comp(letimer::offset::COMP0)
        } else {
            0xFFFF
        };
        let cnt = self.cnt.get();
        let underflow = cnt <= 1;
        let next = if underflow { top } else { cnt - 1 };
        self.cnt.set(next);

        if underflow {
            self.underflows.set(self.underflows.get() + 1);
            let mode = ctrl.read_as_enum(CTRL::REPMODE).unwrap_or(RepMode::Free);
            if !self.count_repeat(mode) {
                return;
            }
        }

        // REP0 == 0 keeps OUT0 idle even in free mode
        let armed = self.rep(letimer::offset::REP0) != 0;
        let active = match ctrl.read_as_enum(CTRL::UFOA0) {
            Some(UnderflowAction::Toggle) => self.active.get() != (underflow && armed),
            Some(UnderflowAction::Pulse) => underflow && armed,
            Some(UnderflowAction::Pwm) => {
                armed && next != 0 && next <= self.comp(letimer::offset::COMP1)
            }
            Some(UnderflowAction::NoAction) | None => false,
        };
        self.active.set(active);
    }
}

/// What a pin did over a capture window.
#[derive(Debug, Default, Clone)]
pub struct Capture {
    pub high: u32,
    pub low: u32,
    /// Samples where nothing drove the pin.
    pub undriven: u32,
    pub edges: u32,
    /// Board tick of the first 16 rising edges.
    pub rising: Vec<u64, 16>,
    /// Rising edges that came after `rising` filled up.
    pub missed_rising: u32,
}

impl Capture {
    /// Ticks between the first two rising edges.
    pub fn period(&self) -> Option<u64> {
        match (self.rising.first(), self.rising.get(1)) {
            (Some(a), Some(b)) => Some(b - a),
            _ => None,
        }
    }

    fn record_rising(&mut self, tick: u64) {
        if self.rising.push(tick).is_err() {
            self.missed_rising += 1;
        }
    }
}

/// The peripherals a PWM boot touches, wired together. One board tick is one
/// period of whatever oscillator LFA runs from.
pub struct Board {
    pub cmu: SimCmu,
    pub emu: SimEmu,
    pub gpio: SimGpio,
    pub letimer0: SimLetimer,
    ticks: Cell<u64>,
}

impl Board {
    pub fn new() -> Self {
        Self {
            cmu: SimCmu::new(),
            emu: SimEmu::new(),
            gpio: SimGpio::new(),
            letimer0: SimLetimer::new(),
            ticks: Cell::new(0),
        }
    }

    pub fn cmu(&self) -> pac::Cmu<&SimCmu> {
        pac::Cmu::new(&self.cmu)
    }

    pub fn emu(&self) -> pac::Emu<&SimEmu> {
        pac::Emu::new(&self.emu)
    }

    pub fn gpio(&self) -> pac::Gpio<&SimGpio> {
        pac::Gpio::new(&self.gpio)
    }

    pub fn letimer0(&self) -> pac::Letimer<&SimLetimer> {
        pac::Letimer::new(&self.letimer0)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    /// Level on `pin`, `None` if the pin is not an output.
    pub fn level(&self, pin: GpioPin) -> Option<bool> {
        if !crate::gpio::pin_mode(&self.gpio(), pin).is_output() {
            return None;
        }
        match self.letimer0.routed_out0() {
            Some((loc, level)) if loc.pin() == pin => Some(level),
            _ => Some(crate::gpio::output_level(&self.gpio(), pin)),
        }
    }

    /// Step `ticks` board ticks and record what `pin` does.
    pub fn capture(&self, pin: GpioPin, ticks: u32) -> Capture {
        let mut cap = Capture::default();
        let mut prev = self.level(pin);
        for _ in 0..ticks {
            self.tick();
            let now = self.level(pin);
            match now {
                Some(true) => cap.high += 1,
                Some(false) => cap.low += 1,
                None => cap.undriven += 1,
            }
            if let (Some(a), Some(b)) = (prev, now) {
                if a != b {
                    cap.edges += 1;
                    if b {
                        cap.record_rising(self.ticks());
                    }
                }
            }
            prev = now;
        }
        cap
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Clocked for Board {
    fn tick(&self) {
        let n = self.ticks.get() + 1;
        self.ticks.set(n);
        if !self.cmu.lfa_running() || !self.cmu.letimer0_gated() {
            return;
        }
        if n % self.cmu.letimer0_divisor() as u64 == 0 {
            self.letimer0.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_file_ignores_out_of_range() {
        let f = RegisterFile::<2>::new();
        f.write(4, 7);
        f.write(8, 9);
        assert_eq!(f.read(4), 7);
        assert_eq!(f.read(8), 0);
    }

    #[test]
    fn dead_oscillator_never_ready() {
        let sim = SimCmu::new();
        sim.kill(ClockSource::Lfxo);
        let regs = pac::Cmu::new(&sim);
        regs.oscencmd().write(OSCENCMD::LFXOEN::SET);
        let st = regs.status().extract();
        assert!(st.is_set(cmu::STATUS::LFXOENS));
        assert!(!st.is_set(cmu::STATUS::LFXORDY));
    }

    #[test]
    fn command_register_reads_zero() {
        let t = SimLetimer::new();
        let regs = pac::Letimer::new(&t);
        regs.cmd().write(CMD::START::SET);
        assert_eq!(regs.cmd().get(), 0);
        assert!(regs.status().is_set(letimer::STATUS::RUNNING));
        regs.cmd().write(CMD::STOP::SET);
        assert!(!t.is_running());
    }

    #[test]
    fn pulse_mode_is_one_tick_per_period() {
        let t = SimLetimer::new();
        let regs = pac::Letimer::new(&t);
        regs.ctrl().write(CTRL::COMP0TOP::SET + CTRL::UFOA0::Pulse);
        regs.comp0().write(COMP::COMP.val(4));
        regs.rep0().write(REP::REP.val(1));
        regs.cnt().set(4);
        regs.cmd().write(CMD::START::SET);
        let mut high = 0;
        for _ in 0..12 {
            t.tick();
            high += t.out0() as u32;
        }
        assert_eq!(high, 3);
        assert_eq!(t.underflows(), 3);
    }

    #[test]
    fn one_shot_stops_after_rep0_periods() {
        let t = SimLetimer::new();
        let regs = pac::Letimer::new(&t);
        regs.ctrl()
            .write(CTRL::COMP0TOP::SET + CTRL::REPMODE::OneShot + CTRL::UFOA0::Toggle);
        regs.comp0().write(COMP::COMP.val(3));
        regs.rep0().write(REP::REP.val(2));
        regs.cnt().set(3);
        regs.cmd().write(CMD::START::SET);
        for _ in 0..20 {
            t.tick();
        }
        assert!(!t.is_running());
        assert_eq!(t.underflows(), 2);
    }

    #[test]
    fn edges_past_the_buffer_are_counted() {
        let mut cap = Capture::default();
        for tick in 0..20 {
            cap.record_rising(tick * 10);
        }
        assert_eq!(cap.rising.len(), 16);
        assert_eq!(cap.missed_rising, 4);
        assert_eq!(cap.period(), Some(10));
    }
}
