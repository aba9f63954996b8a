//! Clock management unit.

use tock_registers::register_bitfields;

use crate::reg::{Bus, Reg};

pub mod offset {
    pub const OSCENCMD: usize = 0x060;
    pub const LFACLKSEL: usize = 0x080;
    pub const LFBCLKSEL: usize = 0x084;
    pub const LFECLKSEL: usize = 0x088;
    pub const STATUS: usize = 0x090;
    pub const HFBUSCLKEN0: usize = 0x0B0;
    pub const LFACLKEN0: usize = 0x0E0;
    pub const LFAPRESC0: usize = 0x120;
    pub const SYNCBUSY: usize = 0x140;
}

register_bitfields![u32,
    /// Oscillator enable/disable command, write only
    pub OSCENCMD [
        LFRCOEN OFFSET(6) NUMBITS(1) [],
        LFRCODIS OFFSET(7) NUMBITS(1) [],
        LFXOEN OFFSET(8) NUMBITS(1) [],
        LFXODIS OFFSET(9) NUMBITS(1) []
    ],
    pub STATUS [
        LFRCOENS OFFSET(6) NUMBITS(1) [],
        LFRCORDY OFFSET(7) NUMBITS(1) [],
        LFXOENS OFFSET(8) NUMBITS(1) [],
        LFXORDY OFFSET(9) NUMBITS(1) []
    ],
    /// LFACLKSEL, LFBCLKSEL and LFECLKSEL share this layout
    pub LFCLKSEL [
        SEL OFFSET(0) NUMBITS(3) [
            Disabled = 0,
            Lfrco = 1,
            Lfxo = 2,
            Ulfrco = 4
        ]
    ],
    /// High frequency bus clock gates
    pub HFBUSCLKEN0 [
        LE OFFSET(0) NUMBITS(1) [],
        GPIO OFFSET(2) NUMBITS(1) []
    ],
    pub LFACLKEN0 [
        LETIMER0 OFFSET(0) NUMBITS(1) []
    ],
    /// The field holds log2 of the division
    pub LFAPRESC0 [
        LETIMER0 OFFSET(0) NUMBITS(4) []
    ],
    /// Set while a write to an LF domain register is being synchronised
    pub SYNCBUSY [
        LFACLKEN0 OFFSET(0) NUMBITS(1) [],
        LFAPRESC0 OFFSET(2) NUMBITS(1) []
    ]
];

pub struct Cmu<B> {
    bus: B,
}

impl<B: Bus> Cmu<B> {
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn oscencmd(&self) -> Reg<'_, B, OSCENCMD::Register> {
        Reg::new(&self.bus, offset::OSCENCMD)
    }
    pub fn lfaclksel(&self) -> Reg<'_, B, LFCLKSEL::Register> {
        Reg::new(&self.bus, offset::LFACLKSEL)
    }
    pub fn lfbclksel(&self) -> Reg<'_, B, LFCLKSEL::Register> {
        Reg::new(&self.bus, offset::LFBCLKSEL)
    }
    pub fn lfeclksel(&self) -> Reg<'_, B, LFCLKSEL::Register> {
        Reg::new(&self.bus, offset::LFECLKSEL)
    }
    pub fn status(&self) -> Reg<'_, B, STATUS::Register> {
        Reg::new(&self.bus, offset::STATUS)
    }
    pub fn hfbusclken0(&self) -> Reg<'_, B, HFBUSCLKEN0::Register> {
        Reg::new(&self.bus, offset::HFBUSCLKEN0)
    }
    pub fn lfaclken0(&self) -> Reg<'_, B, LFACLKEN0::Register> {
        Reg::new(&self.bus, offset::LFACLKEN0)
    }
    pub fn lfapresc0(&self) -> Reg<'_, B, LFAPRESC0::Register> {
        Reg::new(&self.bus, offset::LFAPRESC0)
    }
    pub fn syncbusy(&self) -> Reg<'_, B, SYNCBUSY::Register> {
        Reg::new(&self.bus, offset::SYNCBUSY)
    }
}
