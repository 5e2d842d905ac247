//! ゲート駆動レイヤー
//!
//! 制御コアが決定したサイクル出力をTIM1の3相補完PWMに反映します。
//! ハードウェアへの直接アクセスをここに集約します。

use embassy_stm32::{
    peripherals,
    timer::{complementary_pwm::ComplementaryPwm, Channel},
};

use g4_rectifier::{CycleOutput, GatePolarity, LegCommand, RectifierBridge};

/// 3相整流器ブリッジドライバー
///
/// 相ごとのレッグ指令を補完PWMのデューティとチャネル有効/無効に変換します。
/// ActiveLow極性ではデューティを反転し、相補出力（下アーム）が
/// レッグ指令どおりに導通します。
pub struct RectifierPwm {
    pwm: ComplementaryPwm<'static, peripherals::TIM1>,
    max_duty: u16,
}

impl RectifierPwm {
    /// 新しいブリッジドライバーを作成
    ///
    /// # 引数
    /// * `pwm` - PWMペリフェラル（TIM1）
    pub fn new(pwm: ComplementaryPwm<'static, peripherals::TIM1>) -> Self {
        let max_duty = pwm.get_max_duty();
        Self { pwm, max_duty }
    }

    /// PWMの最大Duty値を取得
    pub fn max_duty(&self) -> u16 {
        self.max_duty
    }

    /// レッグ指令と極性からコンペア値を計算
    fn duty_for(&self, command: LegCommand, polarity: GatePolarity) -> u16 {
        let base = match command {
            LegCommand::MaxDuty => self.max_duty,
            LegCommand::MinDuty | LegCommand::ForcedOff => 0,
        };
        match polarity {
            GatePolarity::ActiveHigh => base,
            // 反転: MaxDuty指令で上アームのコンペアが0になり、
            // 相補出力の下アームが（デッドタイムを除き）常時導通する
            GatePolarity::ActiveLow => self.max_duty - base,
        }
    }

    /// 1チャネルに指令を適用
    fn apply_leg(&mut self, channel: Channel, command: LegCommand, polarity: GatePolarity) {
        match command {
            LegCommand::ForcedOff => {
                // 出力を無効化してダイオード整流に任せる
                self.pwm.set_duty(channel, 0);
                self.pwm.disable(channel);
            }
            LegCommand::MaxDuty | LegCommand::MinDuty => {
                self.pwm.set_duty(channel, self.duty_for(command, polarity));
                self.pwm.enable(channel);
            }
        }
    }
}

impl RectifierBridge for RectifierPwm {
    fn commit(&mut self, output: &CycleOutput) {
        self.apply_leg(Channel::Ch1, output.legs[0], output.polarity);
        self.apply_leg(Channel::Ch2, output.legs[1], output.polarity);
        self.apply_leg(Channel::Ch3, output.legs[2], output.polarity);
    }

    fn rearm_acquisition(&mut self) {
        // ブロッキング変換を使用しているため再アームは不要
        // （トリガ駆動のDMA取得に移行する場合はここで再アームする）
    }
}
