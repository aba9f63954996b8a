//! Low energy timer.
//!
//! LETIMER is a 16 bit down-counter on the LFA clock. With `COMP0TOP` set the
//! counter reloads from COMP0 on underflow, so COMP0 sets the period. COMP1
//! together with the underflow output action decides when OUT0 goes active.

use tock_registers::register_bitfields;

use crate::reg::{Bus, Reg};

pub mod offset {
    pub const CTRL: usize = 0x000;
    pub const CMD: usize = 0x004;
    pub const STATUS: usize = 0x008;
    pub const CNT: usize = 0x00C;
    pub const COMP0: usize = 0x010;
    pub const COMP1: usize = 0x014;
    pub const REP0: usize = 0x018;
    pub const REP1: usize = 0x01C;
    pub const SYNCBUSY: usize = 0x034;
    pub const ROUTEPEN: usize = 0x040;
    pub const ROUTELOC0: usize = 0x044;
}

register_bitfields![u32,
    pub CTRL [
        REPMODE OFFSET(0) NUMBITS(2) [
            /// Count until stopped
            Free = 0,
            /// Count until REP0 reaches zero
            OneShot = 1,
            /// Like one-shot, REP1 is loaded into REP0 when it runs out
            Buffered = 2,
            /// Count until both REP0 and REP1 reach zero
            Double = 3
        ],
        /// What OUT0 does on underflow
        UFOA0 OFFSET(2) NUMBITS(2) [
            NoAction = 0,
            Toggle = 1,
            /// Active for one tick on each underflow
            Pulse = 2,
            /// Active on COMP1 match, idle on underflow
            Pwm = 3
        ],
        /// Idle level of OUT0
        OPOL0 OFFSET(6) NUMBITS(1) [],
        BUFTOP OFFSET(8) NUMBITS(1) [],
        COMP0TOP OFFSET(9) NUMBITS(1) [],
        DEBUGRUN OFFSET(12) NUMBITS(1) []
    ],
    /// Command register, write only
    pub CMD [
        START OFFSET(0) NUMBITS(1) [],
        STOP OFFSET(1) NUMBITS(1) [],
        CLEAR OFFSET(2) NUMBITS(1) [],
        CTO0 OFFSET(3) NUMBITS(1) []
    ],
    pub STATUS [
        RUNNING OFFSET(0) NUMBITS(1) []
    ],
    pub CNT [
        CNT OFFSET(0) NUMBITS(16) []
    ],
    /// COMP0 and COMP1
    pub COMP [
        COMP OFFSET(0) NUMBITS(16) []
    ],
    /// REP0 and REP1
    pub REP [
        REP OFFSET(0) NUMBITS(8) []
    ],
    pub SYNCBUSY [
        CTRL OFFSET(0) NUMBITS(1) [],
        CMD OFFSET(1) NUMBITS(1) [],
        COMP0 OFFSET(2) NUMBITS(1) [],
        COMP1 OFFSET(3) NUMBITS(1) [],
        REP0 OFFSET(4) NUMBITS(1) [],
        REP1 OFFSET(5) NUMBITS(1) []
    ],
    pub ROUTEPEN [
        OUT0PEN OFFSET(0) NUMBITS(1) [],
        OUT1PEN OFFSET(1) NUMBITS(1) []
    ],
    pub ROUTELOC0 [
        OUT0LOC OFFSET(0) NUMBITS(6) [],
        OUT1LOC OFFSET(8) NUMBITS(6) []
    ]
];

pub struct Letimer<B> {
    bus: B,
}

impl<B: Bus> Letimer<B> {
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn ctrl(&self) -> Reg<'_, B, CTRL::Register> {
        Reg::new(&self.bus, offset::CTRL)
    }
    pub fn cmd(&self) -> Reg<'_, B, CMD::Register> {
        Reg::new(&self.bus, offset::CMD)
    }
    pub fn status(&self) -> Reg<'_, B, STATUS::Register> {
        Reg::new(&self.bus, offset::STATUS)
    }
    pub fn cnt(&self) -> Reg<'_, B, CNT::Register> {
        Reg::new(&self.bus, offset::CNT)
    }
    pub fn comp0(&self) -> Reg<'_, B, COMP::Register> {
        Reg::new(&self.bus, offset::COMP0)
    }
    pub fn comp1(&self) -> Reg<'_, B, COMP::Register> {
        Reg::new(&self.bus, offset::COMP1)
    }
    pub fn rep0(&self) -> Reg<'_, B, REP::Register> {
        Reg::new(&self.bus, offset::REP0)
    }
    pub fn syncbusy(&self) -> Reg<'_, B, SYNCBUSY::Register> {
        Reg::new(&self.bus, offset::SYNCBUSY)
    }
    pub fn routepen(&self) -> Reg<'_, B, ROUTEPEN::Register> {
        Reg::new(&self.bus, offset::ROUTEPEN)
    }
    pub fn routeloc0(&self) -> Reg<'_, B, ROUTELOC0::Register> {
        Reg::new(&self.bus, offset::ROUTELOC0)
    }

    /// Wait until every LF domain write has reached the timer.
    pub fn wait_sync(&self) {
        while self.syncbusy().get() != 0 {}
    }
}
