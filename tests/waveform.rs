//! Boot sequences run against the register models, checked on the pin.
#![cfg(not(target_arch = "arm"))]

use letimer_pwm::{
    clock::{Clock, ClockSource, ClockTree, LfBranch, Prescaler},
    gpio::{self, PinMode, PF4},
    letimer::{Config, Polarity, WaveformTimer, LOC28_PF4},
    low_power::{self, EnergyMode},
    pac::letimer::CMD,
    pwm_math,
    sim::{Board, SimCmu, SimLetimer},
};

type Clocks<'a> = ClockTree<&'a SimCmu>;
type Uninit<'a> = WaveformTimer<&'a SimLetimer, letimer_pwm::letimer::Uninit>;

/// The clock and pin part of the boot, up to a timer that is ready to be
/// configured.
fn bring_up(board: &Board, source: ClockSource) -> (Clocks<'_>, Uninit<'_>) {
    let mut clocks = ClockTree::new(board.cmu());
    clocks.enable(Clock::Gpio);
    gpio::set_pin_mode(&board.gpio(), PF4, PinMode::PushPull, false);
    clocks.enable(Clock::Le);
    clocks.select_source(LfBranch::Lfa, source).unwrap();
    clocks.enable(Clock::Letimer0);
    let tick = clocks.frequency(Clock::Letimer0);
    (clocks, WaveformTimer::new(board.letimer0(), tick))
}

fn run_pwm(board: &Board, freq: u32, duty: u32) {
    let (_, timer) = bring_up(board, ClockSource::Lfxo);
    let pwm = timer.configure(freq, duty).route_output(LOC28_PF4).start();
    assert!(pwm.is_running());
}

#[test]
fn one_hertz_thirty_percent_on_pf4() {
    let board = Board::new();
    run_pwm(&board, 1, 30);
    let cap = board.capture(PF4, 3 * 32_768);
    assert_eq!(cap.period(), Some(32_768));
    assert_eq!(cap.high, 3 * 9_830);
    assert_eq!(cap.low, 3 * (32_768 - 9_830));
    assert_eq!(cap.edges, 6);
    assert_eq!(cap.undriven, 0);
    // 1.000 s period, 0.300 s high
    assert_eq!(pwm_math::ticks_to_us(32_768, 32_768), 1_000_000);
    assert_eq!(pwm_math::ticks_to_us(9_830, 32_768), 299_987);
}

#[test]
fn period_follows_frequency() {
    for freq in [2, 8, 64] {
        let board = Board::new();
        run_pwm(&board, freq, 50);
        let cap = board.capture(PF4, 4 * 32_768 / freq);
        assert_eq!(cap.period(), Some((32_768 / freq) as u64), "{freq} Hz");
        assert_eq!(cap.high, cap.low, "{freq} Hz");
    }
}

#[test]
fn duty_sets_high_time() {
    let board = Board::new();
    run_pwm(&board, 16, 25);
    let top = 32_768 / 16;
    let cap = board.capture(PF4, 2 * top);
    assert_eq!(cap.high, 2 * top / 4);
}

#[test]
fn zero_duty_is_flat_low() {
    let board = Board::new();
    run_pwm(&board, 4, 0);
    let cap = board.capture(PF4, 3 * 8_192);
    assert_eq!(cap.high, 0);
    assert_eq!(cap.edges, 0);
}

#[test]
fn full_duty_is_flat_high() {
    let board = Board::new();
    run_pwm(&board, 4, 100);
    let cap = board.capture(PF4, 3 * 8_192);
    // one edge as the counter leaves its preload
    assert_eq!(cap.edges, 1);
    assert_eq!(cap.low, 0);
}

#[test]
fn idle_high_inverts() {
    let board = Board::new();
    let (_, timer) = bring_up(&board, ClockSource::Lfxo);
    timer
        .configure_with(Config {
            polarity: Polarity::IdleHigh,
            ..Config::default()
        })
        .route_output(LOC28_PF4)
        .start();
    let cap = board.capture(PF4, 32_768);
    assert_eq!(cap.low, 9_830);
    assert_eq!(cap.high, 32_768 - 9_830);
}

#[test]
fn without_routing_the_pin_only_shows_its_latch() {
    let board = Board::new();
    let (_, timer) = bring_up(&board, ClockSource::Lfxo);
    let _pwm = timer.configure(4, 50);
    board.letimer0().cmd().write(CMD::START::SET);
    let cap = board.capture(PF4, 3 * 8_192);
    assert_eq!(cap.edges, 0);
    assert_eq!(cap.high, 0);
    assert_eq!(board.letimer0.underflows(), 3);
}

#[test]
fn zero_repeat_keeps_output_idle() {
    let board = Board::new();
    let (_, timer) = bring_up(&board, ClockSource::Lfxo);
    let pwm = timer
        .configure_with(Config {
            frequency_hz: 4,
            repeat: 0,
            ..Config::default()
        })
        .route_output(LOC28_PF4)
        .start();
    let cap = board.capture(PF4, 3 * 8_192);
    assert!(pwm.is_running());
    assert_eq!(cap.high, 0);
    assert_eq!(cap.edges, 0);
}

#[test]
fn ungated_timer_never_counts() {
    let board = Board::new();
    let mut clocks = ClockTree::new(board.cmu());
    clocks.enable(Clock::Gpio);
    gpio::set_pin_mode(&board.gpio(), PF4, PinMode::PushPull, false);
    clocks.enable(Clock::Le);
    clocks.select_source(LfBranch::Lfa, ClockSource::Lfxo).unwrap();
    // LETIMER0 gate left closed
    WaveformTimer::new(board.letimer0(), clocks.frequency(Clock::Letimer0))
        .configure(4, 50)
        .route_output(LOC28_PF4)
        .start();
    let cap = board.capture(PF4, 3 * 8_192);
    assert_eq!(cap.edges, 0);
    assert_eq!(board.letimer0.count(), 8_192);
}

#[test]
fn prescaled_tick_keeps_the_requested_frequency() {
    let board = Board::new();
    let (mut clocks, _) = bring_up(&board, ClockSource::Lfxo);
    clocks.set_letimer_prescaler(Prescaler::Div2);
    let tick = clocks.frequency(Clock::Letimer0);
    assert_eq!(tick, 16_384);
    let pwm = WaveformTimer::new(board.letimer0(), tick)
        .configure(1, 50)
        .route_output(LOC28_PF4)
        .start();
    assert_eq!(pwm.top(), 16_384);
    // board ticks are LFA ticks, two per timer tick
    let cap = board.capture(PF4, 2 * 32_768);
    assert_eq!(cap.period(), Some(32_768));
}

#[test]
fn unconfigured_pin_is_undriven() {
    let board = Board::new();
    let mut clocks = ClockTree::new(board.cmu());
    clocks.enable(Clock::Le);
    clocks.select_source(LfBranch::Lfa, ClockSource::Lfxo).unwrap();
    clocks.enable(Clock::Letimer0);
    WaveformTimer::new(board.letimer0(), clocks.frequency(Clock::Letimer0))
        .configure(4, 50)
        .route_output(LOC28_PF4)
        .start();
    let cap = board.capture(PF4, 8_192);
    assert_eq!(cap.undriven, 8_192);
    assert_eq!(cap.edges, 0);
}

#[test]
fn missing_crystal_falls_back_to_lfrco() {
    let board = Board::new();
    board.cmu.kill(ClockSource::Lfxo);
    let mut clocks = ClockTree::new(board.cmu());
    clocks.enable(Clock::Gpio);
    gpio::set_pin_mode(&board.gpio(), PF4, PinMode::PushPull, false);
    clocks.enable(Clock::Le);
    assert!(clocks.select_source(LfBranch::Lfa, ClockSource::Lfxo).is_err());
    clocks.select_source(LfBranch::Lfa, ClockSource::Lfrco).unwrap();
    clocks.enable(Clock::Letimer0);
    WaveformTimer::new(board.letimer0(), clocks.frequency(Clock::Letimer0))
        .configure(8, 30)
        .route_output(LOC28_PF4)
        .start();
    let cap = board.capture(PF4, 2 * 4_096);
    assert_eq!(cap.period(), Some(4_096));
}

#[test]
fn em2_keeps_lfxo_waveform() {
    let board = Board::new();
    run_pwm(&board, 8, 50);
    low_power::prepare(&board.emu(), &board.cmu(), ClockSource::Lfxo.deepest_sleep());
    let cap = board.capture(PF4, 4 * 4_096);
    assert_eq!(cap.period(), Some(4_096));
}

#[test]
fn em3_stops_lfxo_waveform_but_not_ulfrco() {
    let board = Board::new();
    run_pwm(&board, 8, 50);
    low_power::prepare(&board.emu(), &board.cmu(), EnergyMode::Em3);
    let cap = board.capture(PF4, 4 * 4_096);
    assert_eq!(cap.edges, 0);

    let board = Board::new();
    let (_, timer) = bring_up(&board, ClockSource::Ulfrco);
    let pwm = timer.configure(10, 50).route_output(LOC28_PF4).start();
    assert_eq!(pwm.top(), 100);
    low_power::prepare(&board.emu(), &board.cmu(), ClockSource::Ulfrco.deepest_sleep());
    let cap = board.capture(PF4, 400);
    assert_eq!(cap.period(), Some(100));
    assert_eq!(cap.high, 200);
}
