#![no_std]
#![no_main]

mod benchmark;
mod bridge;
mod config;
mod fmt;
mod hardware;
mod state;
mod tasks;

#[cfg(not(feature = "defmt"))]
use panic_halt as _;
#[cfg(feature = "defmt")]
use {defmt_rtt as _, panic_probe as _};

use embassy_executor::Spawner;
use embassy_stm32::{
    adc::{Adc, AdcChannel, SampleTime},
    gpio::{Level, Output, Speed},
    timer::{
        complementary_pwm::{ComplementaryPwm, ComplementaryPwmPin},
        low_level::CountingMode,
        simple_pwm::PwmPin,
        Channel,
    },
};
use embassy_time::{Duration, Timer};

use bridge::RectifierPwm;
use fmt::*;
use tasks::{led_task, rectifier_control_task, status_report_task};

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // ハードウェア初期化
    let config = hardware::create_clock_config();
    let p = embassy_stm32::init(config);

    info!("═══════════════════════════════════════════════════════════");
    info!("");
    info!("    ██████╗ ██╗  ██╗    ██████╗ ███████╗ ██████╗████████╗");
    info!("   ██╔════╝ ██║  ██║    ██╔══██╗██╔════╝██╔════╝╚══██╔══╝");
    info!("   ██║  ███╗███████║    ██████╔╝█████╗  ██║        ██║   ");
    info!("   ██║   ██║╚════██║    ██╔══██╗██╔══╝  ██║        ██║   ");
    info!("   ╚██████╔╝     ██║    ██║  ██║███████╗╚██████╗   ██║   ");
    info!("    ╚═════╝      ╚═╝    ╚═╝  ╚═╝╚══════╝ ╚═════╝   ╚═╝   ");
    info!("");
    info!("        Active PWM Rectifier • STM32G431VB @ 170MHz");
    info!("");
    info!("═══════════════════════════════════════════════════════════");

    // LED初期化＆タスク起動
    let led1 = Output::new(p.PC13, Level::High, Speed::Low);
    let led2 = Output::new(p.PC14, Level::High, Speed::Low);
    let led3 = Output::new(p.PC15, Level::High, Speed::Low);
    spawner.spawn(led_task(led1, led2, led3)).unwrap();

    // ADC初期化
    // 7チャネルを100μs周期に収めるため短いサンプル時間を使用
    let mut adc1 = Adc::new(p.ADC1);
    adc1.set_sample_time(SampleTime::CYCLES24_5);

    // 取得チャネル（{Uab, Ubc, Uca, Ud, Ia, Ib, Ic}の順）
    let channels = [
        p.PA0.degrade_adc(),
        p.PA1.degrade_adc(),
        p.PA2.degrade_adc(),
        p.PA3.degrade_adc(),
        p.PB0.degrade_adc(),
        p.PB1.degrade_adc(),
        p.PB12.degrade_adc(),
    ];

    // PWM初期化（TIM1、3相補完PWM）
    // 出力は無効のまま初期化し、制御タスクがモードに応じて有効化する
    let mut leg_pwm = ComplementaryPwm::new(
        p.TIM1,
        Some(PwmPin::new(
            p.PE9,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(ComplementaryPwmPin::new(
            p.PE8,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(PwmPin::new(
            p.PE11,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(ComplementaryPwmPin::new(
            p.PE10,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(PwmPin::new(
            p.PE13,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(ComplementaryPwmPin::new(
            p.PE12,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        None,
        None,
        config::pwm::CARRIER_FREQUENCY,
        CountingMode::EdgeAlignedUp,
    );
    leg_pwm.disable(Channel::Ch1);
    leg_pwm.disable(Channel::Ch2);
    leg_pwm.disable(Channel::Ch3);
    leg_pwm.set_dead_time(config::pwm::DEAD_TIME);

    let bridge = RectifierPwm::new(leg_pwm);
    info!("PWM bridge ready: max duty = {}", bridge.max_duty());

    // ベンチマーク実行
    unsafe {
        benchmark::enable_cycle_counter();
    }
    benchmark::run_sin_cos_benchmark(1000);
    benchmark::run_cycle_benchmark(1000);

    info!("Starting rectifier control...");

    // 制御タスクとステータスタスクを起動
    spawner
        .spawn(rectifier_control_task(adc1, channels, bridge))
        .unwrap();
    spawner.spawn(status_report_task()).unwrap();

    // メインループ（将来の拡張用）
    loop {
        Timer::after(Duration::from_millis(100)).await;
    }
}
