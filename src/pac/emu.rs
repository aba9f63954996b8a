//! Energy management unit.

use tock_registers::register_bitfields;

use crate::reg::{Bus, Reg};

pub mod offset {
    pub const CTRL: usize = 0x000;
}

register_bitfields![u32,
    pub CTRL [
        /// Blocks EM2 entry, the core falls back to EM1 on deep sleep
        EM2BLOCK OFFSET(1) NUMBITS(1) []
    ]
];

pub struct Emu<B> {
    bus: B,
}

impl<B: Bus> Emu<B> {
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn ctrl(&self) -> Reg<'_, B, CTRL::Register> {
        Reg::new(&self.bus, offset::CTRL)
    }
}
