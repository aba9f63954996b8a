//! Register blocks for the EFM32 Series 1 peripherals this crate touches.
//!
//! Only the registers and fields the clock tree, LETIMER0, GPIO and EMU code
//! needs are described. Every block is generic over its [`Bus`] so the same
//! driver code runs on the chip ([`Mmio`]) and against [`crate::sim`].

pub mod cmu;
pub mod emu;
pub mod gpio;
pub mod letimer;

pub use cmu::Cmu;
pub use emu::Emu;
pub use gpio::Gpio;
pub use letimer::Letimer;

use crate::reg::{Bus, Mmio};

pub const CMU_BASE: usize = 0x400E_4000;
pub const EMU_BASE: usize = 0x400E_3000;
pub const GPIO_BASE: usize = 0x4000_A000;
pub const LETIMER0_BASE: usize = 0x4004_6000;

static mut TAKEN: bool = false;

/// Owned handles to every register block, handed out once per boot.
pub struct Peripherals<B: Bus = Mmio> {
    pub cmu: Cmu<B>,
    pub emu: Emu<B>,
    pub gpio: Gpio<B>,
    pub letimer0: Letimer<B>,
}

impl Peripherals<Mmio> {
    /// Returns the peripherals the first time it is called, `None` after.
    pub fn take() -> Option<Self> {
        critical_section::with(|_| {
            // SAFETY: TAKEN is only touched inside a critical section
            unsafe {
                if TAKEN {
                    return None;
                }
                TAKEN = true;
                Some(Self::steal())
            }
        })
    }

    /// # Safety
    /// Creates a second set of handles if the peripherals were already taken.
    /// The caller has to make sure the two never write the same registers.
    pub unsafe fn steal() -> Self {
        // SAFETY: fixed addresses from the reference manual memory map
        unsafe {
            Self {
                cmu: Cmu::new(Mmio::new(CMU_BASE)),
                emu: Emu::new(Mmio::new(EMU_BASE)),
                gpio: Gpio::new(Mmio::new(GPIO_BASE)),
                letimer0: Letimer::new(Mmio::new(LETIMER0_BASE)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peripherals_are_handed_out_once() {
        let first = Peripherals::take();
        assert!(first.is_some());
        assert!(Peripherals::take().is_none());
        let p = first.unwrap();
        assert_eq!(p.letimer0.bus().base(), LETIMER0_BASE);
        assert_eq!(p.cmu.bus().base(), CMU_BASE);
    }
}
