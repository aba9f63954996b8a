//! General purpose I/O. Each port has its own 0x30 byte register window.

use tock_registers::fields::Field;
use tock_registers::register_bitfields;

use crate::reg::{Bus, Reg};

pub const PORT_STRIDE: usize = 0x30;

pub mod offset {
    pub const MODEL: usize = 0x04;
    pub const MODEH: usize = 0x08;
    pub const DOUT: usize = 0x0C;
}

register_bitfields![u32,
    /// MODEL (pins 0..8) and MODEH (pins 8..16), four bits per pin. Only
    /// the first pin is named, [`mode_field`] reaches the others.
    pub MODE [
        MODE0 OFFSET(0) NUMBITS(4) [
            Disabled = 0,
            Input = 1,
            InputPull = 2,
            InputPullFilter = 3,
            PushPull = 4,
            PushPullAlternate = 5,
            WiredOr = 6,
            WiredOrPullDown = 7,
            WiredAnd = 8,
            WiredAndFilter = 9,
            WiredAndPullUp = 10,
            WiredAndPullUpFilter = 11,
            WiredAndAlternate = 12,
            WiredAndAlternateFilter = 13,
            WiredAndAlternatePullUp = 14,
            WiredAndAlternatePullUpFilter = 15
        ]
    ],
    /// One bit per pin
    pub DOUT [
        DOUT0 OFFSET(0) NUMBITS(1) []
    ]
];

pub type PinMode = MODE::MODE0::Value;

impl PinMode {
    /// True for every mode that drives the pin.
    pub fn is_output(self) -> bool {
        self as u32 >= PinMode::PushPull as u32
    }
}

/// Mode field of pin `n` within its half port.
pub const fn mode_field(n: usize) -> Field<u32, MODE::Register> {
    assert!(n < 8);
    Field::new(0xF, n * 4)
}

/// Output bit of pin `n`.
pub const fn dout_field(n: usize) -> Field<u32, DOUT::Register> {
    assert!(n < 16);
    Field::new(1, n)
}

pub struct Gpio<B> {
    bus: B,
}

impl<B: Bus> Gpio<B> {
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn model(&self, port: usize) -> Reg<'_, B, MODE::Register> {
        Reg::new(&self.bus, port * PORT_STRIDE + offset::MODEL)
    }
    pub fn modeh(&self, port: usize) -> Reg<'_, B, MODE::Register> {
        Reg::new(&self.bus, port * PORT_STRIDE + offset::MODEH)
    }
    pub fn dout(&self, port: usize) -> Reg<'_, B, DOUT::Register> {
        Reg::new(&self.bus, port * PORT_STRIDE + offset::DOUT)
    }
}
