//! ステータスレポートタスク
//!
//! バス状態を1秒ごとにログ出力します。

use embassy_time::{Duration, Ticker};

use crate::config;
use crate::fmt::*;
use crate::state::BUS_STATUS;

/// ステータスレポートタスク（1Hz）
#[embassy_executor::task]
pub async fn status_report_task() {
    info!("Status report task started");

    let mut ticker = Ticker::every(Duration::from_millis(config::STATUS_PERIOD_MS));

    loop {
        ticker.next().await;

        let status = *BUS_STATUS.lock().await;
        let mode = if status.active { "active" } else { "uncontrolled" };
        info!(
            "[Bus] Ud={}V, mode={}, Istand={}A, saturated={}, cycles={}",
            status.ud, mode, status.istand, status.saturated, status.cycles
        );
    }
}
