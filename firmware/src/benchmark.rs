//! ベンチマークモジュール
//!
//! 制御関数と制御サイクル全体のパフォーマンス測定を提供します。

use core::sync::atomic::{compiler_fence, Ordering};

use cortex_m::peripheral::DWT;
use libm::{cosf, sinf};

use g4_rectifier::control::transforms::sin_cos;
use g4_rectifier::{
    CycleOutput, RawSamples, RectifierBridge, RectifierConfig, RectifierController,
};

use crate::fmt::*;

/// DWTサイクルカウンタを有効化
///
/// # Safety
/// Cortex-Mペリフェラルへの直接アクセスを含む
pub unsafe fn enable_cycle_counter() {
    let mut cp = cortex_m::Peripherals::steal();
    cp.DCB.enable_trace();
    cp.DWT.enable_cycle_counter();
}

/// sin_cos()のベンチマークを実行して結果を表示
///
/// # 引数
/// * `iterations` - ベンチマーク実行回数
pub fn run_sin_cos_benchmark(iterations: u32) {
    info!("Running sin_cos() benchmark...");

    let theta = 1.57; // 約90度

    let (result_idsp, result_libm, ticks_idsp, ticks_libm) = unsafe {
        let dwt = &*DWT::PTR;

        // idsp実装のベンチマーク
        let start_idsp = dwt.cyccnt.read();
        let mut result_idsp = (0.0f32, 0.0f32);
        for _ in 0..iterations {
            result_idsp = sin_cos(theta);
            // 最適化による除去を防止
            compiler_fence(Ordering::SeqCst);
        }
        let end_idsp = dwt.cyccnt.read();

        // libm実装のベンチマーク
        let start_libm = dwt.cyccnt.read();
        let mut result_libm = (0.0f32, 0.0f32);
        for _ in 0..iterations {
            result_libm = (sinf(theta), cosf(theta));
            compiler_fence(Ordering::SeqCst);
        }
        let end_libm = dwt.cyccnt.read();

        (
            result_idsp,
            result_libm,
            end_idsp.wrapping_sub(start_idsp),
            end_libm.wrapping_sub(start_libm),
        )
    };

    // サイクル/呼び出し を計算（整数に変換してdefmtで表示）
    let cycles_per_call_idsp = ticks_idsp / iterations;
    let cycles_per_call_libm = ticks_libm / iterations;
    let speedup_x10 = (cycles_per_call_libm * 10) / cycles_per_call_idsp; // 10倍してdefmtで表示

    info!("Benchmark results ({} iterations):", iterations);
    info!(
        "  idsp::cossin():  {} cycles total, {} cycles/call",
        ticks_idsp, cycles_per_call_idsp
    );
    info!(
        "  libm::sinf/cosf: {} cycles total, {} cycles/call",
        ticks_libm, cycles_per_call_libm
    );
    info!(
        "  Speedup: {}.{}x faster with idsp",
        speedup_x10 / 10,
        speedup_x10 % 10
    );
    info!(
        "  Result idsp:  sin={}, cos={}",
        result_idsp.0, result_idsp.1
    );
    info!(
        "  Result libm:  sin={}, cos={}",
        result_libm.0, result_libm.1
    );
    info!(
        "  Error: sin={}, cos={}",
        result_idsp.0 - result_libm.0,
        result_idsp.1 - result_libm.1
    );
}

/// 何もしないブリッジ（計測専用）
struct NullBridge;

impl RectifierBridge for NullBridge {
    fn commit(&mut self, _output: &CycleOutput) {}
    fn rearm_acquisition(&mut self) {}
}

/// 制御サイクル全体の所要サイクル数を測定
///
/// 100μs周期（170MHzで17000サイクル）に収まることを確認するための計測です。
/// アクティブモードに入るバス電圧を与え、最も重い経路を通します。
///
/// # 引数
/// * `iterations` - ベンチマーク実行回数
pub fn run_cycle_benchmark(iterations: u32) {
    info!("Running control cycle benchmark...");

    // 履歴長は計測に影響しないため短縮してスタックを節約
    let mut controller: RectifierController<16> =
        RectifierController::new(RectifierConfig::default());
    let mut bridge = NullBridge;
    let raw = RawSamples::from_sequence([2048, 2048, 2048, 600, 2069, 2069, 2069]);

    let ticks = unsafe {
        let dwt = &*DWT::PTR;
        let start = dwt.cyccnt.read();
        for _ in 0..iterations {
            controller.run_cycle(&raw, &mut bridge);
            compiler_fence(Ordering::SeqCst);
        }
        let end = dwt.cyccnt.read();
        end.wrapping_sub(start)
    };

    let cycles_per_call = ticks / iterations;
    info!(
        "Control cycle: {} cycles/call ({} iterations)",
        cycles_per_call, iterations
    );
}
