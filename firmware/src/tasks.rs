//! タスクモジュール
//!
//! 各タスクの実装を分離して管理します。

pub mod led;
pub mod rectifier;
pub mod status;

// タスク関数を再エクスポート
pub use led::led_task;
pub use rectifier::rectifier_control_task;
pub use status::status_report_task;
