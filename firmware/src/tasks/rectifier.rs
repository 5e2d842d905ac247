//! 整流器制御タスク
//!
//! 10kHzでADC取得と制御サイクルを実行します。

use embassy_stm32::{
    adc::{Adc, AnyAdcChannel},
    peripherals,
};
use embassy_time::{Duration, Ticker};

use g4_rectifier::{RawSamples, RectifierConfig, RectifierController, RectifierMode};

use crate::bridge::RectifierPwm;
use crate::config;
use crate::fmt::*;
use crate::state::BUS_STATUS;

/// 整流器制御タスク（10kHz制御ループ）
///
/// 7チャネルを{Uab, Ubc, Uca, Ud, Ia, Ib, Ic}の順でブロッキング変換し、
/// 制御コアに渡してゲート出力を更新します。
#[embassy_executor::task]
pub async fn rectifier_control_task(
    mut adc: Adc<'static, peripherals::ADC1>,
    mut channels: [AnyAdcChannel<peripherals::ADC1>; 7],
    mut bridge: RectifierPwm,
) {
    info!("Rectifier control task started");

    let mut controller: RectifierController =
        RectifierController::new(RectifierConfig::default());

    info!(
        "Control loop: {}Hz, history depth {}",
        1_000_000 / config::CONTROL_PERIOD_US,
        g4_rectifier::HISTORY_LEN
    );

    let mut ticker = Ticker::every(Duration::from_micros(config::CONTROL_PERIOD_US));
    let mut cycles = 0u32;

    loop {
        ticker.next().await;

        // 取得順はハードウェアのチャネル順に固定
        let mut seq = [0u16; 7];
        for (code, channel) in seq.iter_mut().zip(channels.iter_mut()) {
            *code = adc.blocking_read(channel);
        }
        let raw = RawSamples::from_sequence(seq);

        controller.run_cycle(&raw, &mut bridge);

        cycles = cycles.wrapping_add(1);

        // 共有状態は100Hzで更新（ロック頻度を抑える）
        if cycles % config::STATUS_UPDATE_CYCLES == 0 {
            let m = controller.measurements();
            let mut status = BUS_STATUS.lock().await;
            status.ud = m.ud;
            status.active = controller.mode() == RectifierMode::Active;
            status.saturated = controller.is_saturated();
            status.istand = controller.istand();
            status.cycles = cycles;
        }
    }
}
