//! 整流器制御とハードウェアの設定パラメータ

/// 制御周期 [μs]（10kHz = 100μs）
pub const CONTROL_PERIOD_US: u64 = 100;

/// ステータスログ周期 [ms]
pub const STATUS_PERIOD_MS: u64 = 1000;

/// ステータス共有の更新間隔 [制御サイクル数]（10kHz / 100 = 100Hz）
pub const STATUS_UPDATE_CYCLES: u32 = 100;

/// PWM設定
pub mod pwm {
    use embassy_stm32::time::Hertz;

    /// キャリア周波数（制御周期と同じ10kHz）
    pub const CARRIER_FREQUENCY: Hertz = Hertz(10_000);

    /// デッドタイム（タイマカウント単位）
    pub const DEAD_TIME: u16 = 170;
}
