//! グローバル共有状態管理
//!
//! タスク間で共有される状態をMutexで保護して管理します。

use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::mutex::Mutex;

/// DCバスの状態（ステータスログとLED表示用）
#[derive(Debug, Clone, Copy)]
pub struct BusStatus {
    /// DCバス電圧 [V]
    pub ud: f32,
    /// アクティブ整流モードか
    pub active: bool,
    /// 電圧ループが飽和しているか
    pub saturated: bool,
    /// 電流指令振幅 [A]
    pub istand: f32,
    /// 実行済み制御サイクル数
    pub cycles: u32,
}

impl BusStatus {
    pub const fn new() -> Self {
        Self {
            ud: 0.0,
            active: false,
            saturated: false,
            istand: 0.0,
            cycles: 0,
        }
    }
}

/// バス状態（制御タスクが書き込み、ログとLEDタスクが読み取り）
pub static BUS_STATUS: Mutex<ThreadModeRawMutex, BusStatus> = Mutex::new(BusStatus::new());
