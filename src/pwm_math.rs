//! Pure tick arithmetic for the waveform timer.
//!
//! Everything truncates toward zero. A zero output frequency gives zero
//! instead of a division panic, the timer then simply produces no output.

/// Ticks per output period: `tick_hz / frequency_hz`.
pub fn top_value(tick_hz: u32, frequency_hz: u32) -> u32 {
    tick_hz.checked_div(frequency_hz).unwrap_or(0)
}

/// Ticks the output stays active per period:
/// `tick_hz * duty / (frequency_hz * 100)`.
///
/// Multiplies first and divides last, in 64 bit so neither step can overflow.
pub fn compare_value(tick_hz: u32, frequency_hz: u32, duty_cycle_percent: u32) -> u32 {
    let num = tick_hz as u64 * duty_cycle_percent as u64;
    let den = frequency_hz as u64 * 100;
    let v = num.checked_div(den).unwrap_or(0);
    u32::try_from(v).unwrap_or(u32::MAX)
}

/// Duration of `ticks` at `tick_hz`, in microseconds.
pub fn ticks_to_us(ticks: u64, tick_hz: u32) -> u64 {
    (ticks as u128 * 1_000_000)
        .checked_div(tick_hz as u128)
        .unwrap_or(0) as u64
}
