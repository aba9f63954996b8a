//! Register access over a [`Bus`].
//!
//! Every peripheral register block is a thin handle over a [`Bus`]. On the
//! chip that bus is [`Mmio`], a base address read and written with volatile
//! accesses. On the host the same handles sit on top of the register files in
//! `crate::sim`, which is how the clock and timer logic gets tested without
//! hardware.
//!
//! Field layouts are declared with `tock_registers::register_bitfields!` in
//! [`crate::pac`]. [`Reg`] gives them the usual `get/set/read/write/modify`
//! surface, with [`LocalRegisterCopy`] as the value a read hands back.

use core::marker::PhantomData;

use tock_registers::fields::{Field, FieldValue, TryFromValue};
use tock_registers::{LocalRegisterCopy, RegisterLongName};

/// Word access to a register block, addressed by byte offset.
pub trait Bus {
    fn read(&self, offset: usize) -> u32;
    fn write(&self, offset: usize, value: u32);
}

impl<B: Bus + ?Sized> Bus for &B {
    #[inline]
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }
    #[inline]
    fn write(&self, offset: usize, value: u32) {
        (**self).write(offset, value)
    }
}

/// Memory mapped register block at a fixed base address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// # Safety
    /// `base` must be the address of a peripheral register block, and only one
    /// handle per block may be live at a time.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    pub const fn base(&self) -> usize {
        self.base
    }
}

impl Bus for Mmio {
    #[inline]
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: `new` requires `base` to point at a live register block
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u32) }
    }
    #[inline]
    fn write(&self, offset: usize, value: u32) {
        // SAFETY: see `read`
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }
}

/// One register inside a block, typed by its bitfield layout `R`.
pub struct Reg<'a, B: ?Sized, R: RegisterLongName> {
    bus: &'a B,
    offset: usize,
    _reg: PhantomData<R>,
}

impl<'a, B: Bus + ?Sized, R: RegisterLongName> Reg<'a, B, R> {
    #[inline]
    pub fn new(bus: &'a B, offset: usize) -> Self {
        Self {
            bus,
            offset,
            _reg: PhantomData,
        }
    }

    /// Raw register value.
    #[inline]
    pub fn get(&self) -> u32 {
        self.bus.read(self.offset)
    }

    #[inline]
    pub fn set(&self, value: u32) {
        self.bus.write(self.offset, value)
    }

    /// One read, for looking at several fields of the same value.
    #[inline]
    pub fn extract(&self) -> LocalRegisterCopy<u32, R> {
        LocalRegisterCopy::new(self.get())
    }

    #[inline]
    pub fn read(&self, field: Field<u32, R>) -> u32 {
        self.extract().read(field)
    }

    /// `None` for a bit pattern with no named value.
    #[inline]
    pub fn read_as_enum<E: TryFromValue<u32, EnumType = E>>(&self, field: Field<u32, R>) -> Option<E> {
        self.extract().read_as_enum(field)
    }

    #[inline]
    pub fn is_set(&self, field: Field<u32, R>) -> bool {
        self.extract().is_set(field)
    }

    /// Write `fields`; every bit outside them goes to 0.
    #[inline]
    pub fn write(&self, fields: FieldValue<u32, R>) {
        let mut v = LocalRegisterCopy::new(0);
        v.write(fields);
        self.set(v.get());
    }

    /// Read, change `fields`, write back.
    #[inline]
    pub fn modify(&self, fields: FieldValue<u32, R>) {
        let mut v = self.extract();
        v.modify(fields);
        self.set(v.get());
    }
}
