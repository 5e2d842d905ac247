//! LED表示タスク
//!
//! ハートビートと整流器の状態を3つのLEDで表示します。

use embassy_stm32::gpio::Output;
use embassy_time::{Duration, Timer};

use crate::fmt::*;
use crate::state::BUS_STATUS;

/// LED表示タスク
///
/// LED1: 500msごとのハートビート
/// LED2: アクティブ整流モード中に点灯
/// LED3: 電圧ループ飽和中に点灯
#[embassy_executor::task]
pub async fn led_task(
    mut led1: Output<'static>,
    mut led2: Output<'static>,
    mut led3: Output<'static>,
) {
    info!("LED task started");

    loop {
        led1.toggle();

        let status = *BUS_STATUS.lock().await;
        if status.active {
            led2.set_high();
        } else {
            led2.set_low();
        }
        if status.saturated {
            led3.set_high();
        } else {
            led3.set_low();
        }

        Timer::after(Duration::from_millis(500)).await;
    }
}
