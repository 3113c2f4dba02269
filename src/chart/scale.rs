//! Nice Scale Module
//!
//! 値軸の範囲を、読みやすい目盛り（{1, 2, 5} × 10^k 刻み）に丸めるモジュール。
//!
//! 目盛りは整数インデックス × 刻み幅で求めるため、同じ入力からは
//! 常に同じ目盛りが得られます。

/// 目盛り数の下限
pub(crate) const MIN_TICKS: usize = 4;

/// 目盛り数の上限
pub(crate) const MAX_TICKS: usize = 8;

const STEP_MANTISSAS: [f64; 3] = [1.0, 2.0, 5.0];

/// 値軸のスケール
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NiceScale {
    min: f64,
    max: f64,
    step: f64,
    /// 最初の目盛りのインデックス（値は`first * step`）
    first: i64,
    /// 最後の目盛りのインデックス
    last: i64,
}

impl NiceScale {
    /// `[lo, hi]`を含む最小の読みやすい範囲を求める
    ///
    /// 目盛り数は4〜8になります。`lo == hi`の場合は値の前後に余白を取ります。
    ///
    /// # 戻り値
    ///
    /// * `Some(NiceScale)` - 読みやすい範囲
    /// * `None` - 入力が非有限値、または目盛りの端が`f64`の範囲を超える
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use sheetglaze::NiceScale;
    ///
    /// let scale = NiceScale::new(0.0, 100.0).unwrap();
    /// assert_eq!(scale.ticks(), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
    ///
    /// assert!(NiceScale::new(-f64::MAX, f64::MAX).is_none());
    /// ```
    pub fn new(lo: f64, hi: f64) -> Option<Self> {
        if !lo.is_finite() || !hi.is_finite() {
            return None;
        }
        let (lo, hi) = widen_degenerate(lo.min(hi), lo.max(hi));
        if !lo.is_finite() || !hi.is_finite() {
            return None;
        }
        // hi - lo は有限の入力でもオーバーフローし得る
        let half_range = hi / 2.0 - lo / 2.0;
        if !(half_range > 0.0) {
            return None;
        }
        let start = ((half_range.log10() + std::f64::consts::LOG10_2).floor() as i32)
            .saturating_sub(2);

        let mut fallback = None;
        for exponent in start..=start.saturating_add(5) {
            for mantissa in STEP_MANTISSAS {
                let step = mantissa * 10f64.powi(exponent);
                if !step.is_finite() || step <= 0.0 {
                    continue;
                }
                let (first, last) = outer_indices(lo, hi, step);
                let scale = Self {
                    min: first as f64 * step,
                    max: last as f64 * step,
                    step,
                    first,
                    last,
                };
                if !scale.min.is_finite() || !scale.max.is_finite() {
                    continue;
                }
                if scale.tick_count() <= MAX_TICKS {
                    return Some(scale);
                }
                fallback = Some(scale);
            }
        }
        fallback
    }

    /// 範囲を`[lo, hi]`に固定し、内側の目盛りだけを読みやすい刻みで求める
    ///
    /// 刻み幅を決められない場合は`None`を返します。
    pub fn fixed(lo: f64, hi: f64) -> Option<Self> {
        let (lo, hi) = (lo.min(hi), lo.max(hi));
        if hi / 2.0 - lo / 2.0 <= lo.abs().max(hi.abs()) * 0.5e-9 {
            return Self::new(lo, hi);
        }
        let nice = Self::new(lo, hi)?;
        let step = nice.step;
        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        Some(Self {
            min: lo,
            max: hi,
            step,
            first,
            last: last.max(first - 1),
        })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// 目盛りの数
    pub fn tick_count(&self) -> usize {
        (self.last - self.first + 1).max(0) as usize
    }

    /// 目盛りの値（昇順）
    pub fn ticks(&self) -> Vec<f64> {
        (self.first..=self.last).map(|i| i as f64 * self.step).collect()
    }

    /// 値を`[from, to]`の画素座標に写像する
    pub fn map(&self, value: f64, from: f64, to: f64) -> f64 {
        let span = self.max - self.min;
        if span.is_finite() {
            if span <= 0.0 {
                return from;
            }
            return from + (value - self.min) / span * (to - from);
        }
        // 範囲の幅が`f64`を超える場合は半分の値で比を求める
        let half = self.max / 2.0 - self.min / 2.0;
        from + (value / 2.0 - self.min / 2.0) / half * (to - from)
    }

    /// 範囲内に収めた値
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// 目盛りラベル（刻み幅に合わせた小数桁）
    pub fn label(&self, value: f64) -> String {
        if value.abs() < self.step * 1e-9 {
            return "0".to_string();
        }
        let decimals = if self.step >= 1.0 {
            0
        } else {
            (-self.step.log10().floor()).max(0.0) as usize
        };
        format!("{:.*}", decimals, value)
    }
}

/// 幅0（またはほぼ0）の範囲に余白を付ける
fn widen_degenerate(lo: f64, hi: f64) -> (f64, f64) {
    let magnitude = lo.abs().max(hi.abs());
    if hi - lo > magnitude * 1e-9 {
        return (lo, hi);
    }
    if magnitude == 0.0 {
        (0.0, 1.0)
    } else {
        (lo - magnitude * 0.1, hi + magnitude * 0.1)
    }
}

/// `[lo, hi]`を確実に含む目盛りインデックスの範囲
fn outer_indices(lo: f64, hi: f64, step: f64) -> (i64, i64) {
    let mut first = (lo / step).floor() as i64;
    let mut last = (hi / step).ceil() as i64;
    if first as f64 * step > lo {
        first -= 1;
    }
    if (last as f64 * step) < hi {
        last += 1;
    }
    (first, last)
}
