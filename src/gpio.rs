//! Pin mode setup. This is the whole of what the PWM path needs from GPIO:
//! put a pin into an output mode with a known level before a peripheral is
//! routed onto it.

use crate::pac::gpio::{dout_field, mode_field};
pub use crate::pac::gpio::PinMode;
use crate::pac::Gpio;
use crate::reg::Bus;

macro_rules! define_gpio_pin {
    ($($name:ident: $port:ident, $pin:expr),*) => {
        $(
            pub const $name: GpioPin = GpioPin {
                port: Port::$port,
                pin: $pin,
            };
        )*
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
}

impl Port {
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioPin {
    pub port: Port,
    pub pin: u8,
}

impl GpioPin {
    pub const fn new(port: Port, pin: u8) -> Self {
        Self { port, pin }
    }
}

define_gpio_pin!(
    PF0: F, 0, PF1: F, 1, PF2: F, 2, PF3: F, 3,
    PF4: F, 4, PF5: F, 5, PF6: F, 6, PF7: F, 7
);

/// Set the mode of `pin` and its output latch.
///
/// The latch is written first so a pin switched to push-pull never shows the
/// wrong level for a cycle.
pub fn set_pin_mode<B: Bus>(gpio: &Gpio<B>, pin: GpioPin, mode: PinMode, initial_high: bool) {
    let port = pin.port.index();
    let n = pin.pin as usize;
    gpio.dout(port).modify(dout_field(n).val(initial_high as u32));
    let mode_reg = if n < 8 { gpio.model(port) } else { gpio.modeh(port) };
    mode_reg.modify(mode_field(n % 8).val(mode as u32));
    debug!("{:?} mode {}", pin, mode as u32);
}

pub fn pin_mode<B: Bus>(gpio: &Gpio<B>, pin: GpioPin) -> PinMode {
    let port = pin.port.index();
    let n = pin.pin as usize;
    let mode_reg = if n < 8 { gpio.model(port) } else { gpio.modeh(port) };
    // every 4 bit pattern is a named mode
    mode_reg
        .read_as_enum(mode_field(n % 8))
        .unwrap_or(PinMode::Disabled)
}

/// Level in the output latch of `pin`.
pub fn output_level<B: Bus>(gpio: &Gpio<B>, pin: GpioPin) -> bool {
    gpio.dout(pin.port.index()).is_set(dout_field(pin.pin as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::gpio::offset::{DOUT, MODEH, MODEL};
    use crate::pac::gpio::PORT_STRIDE;
    use crate::sim::SimGpio;

    #[test]
    fn pf4_push_pull_low() {
        let file = SimGpio::new();
        let gpio = Gpio::new(&file);
        // PF0 already configured, must survive
        file.write(5 * PORT_STRIDE + MODEL, 0x0000_0001);
        file.write(5 * PORT_STRIDE + DOUT, 0x0000_0010);
        set_pin_mode(&gpio, PF4, PinMode::PushPull, false);
        assert_eq!(file.read(5 * PORT_STRIDE + MODEL), 0x0004_0001);
        assert_eq!(file.read(5 * PORT_STRIDE + DOUT), 0);
        assert_eq!(pin_mode(&gpio, PF4), PinMode::PushPull);
        assert!(pin_mode(&gpio, PF4).is_output());
        assert!(!output_level(&gpio, PF4));
    }

    #[test]
    fn high_pins_use_modeh() {
        let file = SimGpio::new();
        let gpio = Gpio::new(&file);
        let pb11 = GpioPin::new(Port::B, 11);
        set_pin_mode(&gpio, pb11, PinMode::WiredAnd, true);
        assert_eq!(file.read(PORT_STRIDE + MODEH), 8 << 12);
        assert!(output_level(&gpio, pb11));
        assert_eq!(pin_mode(&gpio, GpioPin::new(Port::B, 3)), PinMode::Disabled);
    }

    #[test]
    fn inputs_are_not_outputs() {
        assert!(!PinMode::Input.is_output());
        assert!(!PinMode::InputPullFilter.is_output());
        assert!(PinMode::WiredAndAlternatePullUpFilter.is_output());
    }
}
