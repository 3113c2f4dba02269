//! Chart Layout Module
//!
//! キャンバスの余白・描画領域の計算と、カテゴリラベルの配置を行うモジュール。

use unicode_width::UnicodeWidthStr;

use super::Quality;

/// キャンバスの最小幅（px）
pub(crate) const MIN_WIDTH: u32 = 200;
/// キャンバスの最小高さ（px）
pub(crate) const MIN_HEIGHT: u32 = 150;
/// キャンバスの最大幅（px）
pub(crate) const MAX_WIDTH: u32 = 1200;
/// キャンバスの最大高さ（px）
pub(crate) const MAX_HEIGHT: u32 = 800;

pub(crate) const MARGIN_TOP: f64 = 50.0;
pub(crate) const MARGIN_RIGHT: f64 = 100.0;
pub(crate) const MARGIN_BOTTOM: f64 = 80.0;
pub(crate) const MARGIN_LEFT: f64 = 80.0;

/// 軸ラベルのフォントサイズ
pub(crate) const AXIS_FONT_SIZE: f64 = 12.0;

/// 半角1文字あたりの推定幅（12px フォント）
const GLYPH_WIDTH: f64 = 7.0;

/// 回転したラベルの最大桁数（全角は2桁）
const MAX_ROTATED_COLUMNS: usize = 12;

/// 2次元座標
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 中心`self`から角度`degrees`（12時方向を0度として時計回り）、半径`radius`の点
    pub fn polar(&self, radius: f64, degrees: f64) -> Point {
        let radians = (degrees - 90.0).to_radians();
        Point::new(self.x + radius * radians.cos(), self.y + radius * radians.sin())
    }
}

/// 矩形
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// キャンバスと描画領域
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    /// 余白を除いた描画領域
    pub plot: Rect,
}

impl Canvas {
    /// 要求サイズからキャンバスを作る
    ///
    /// # 戻り値
    ///
    /// * `Ok(Canvas)` - 描画領域を計算済みのキャンバス
    /// * `Err(String)` - サイズが許容範囲外（エラーメッセージ）
    pub fn new(width: u32, height: u32) -> Result<Self, String> {
        check_size(width, height)?;
        let plot = Rect::new(
            MARGIN_LEFT,
            MARGIN_TOP,
            f64::from(width) - MARGIN_LEFT - MARGIN_RIGHT,
            f64::from(height) - MARGIN_TOP - MARGIN_BOTTOM,
        );
        Ok(Self {
            width,
            height,
            plot,
        })
    }

    pub fn full(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// キャンバスサイズの許容範囲を検査
pub(crate) fn check_size(width: u32, height: u32) -> Result<(), String> {
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        return Err(format!(
            "canvas {}x{} is below the minimum {}x{}",
            width, height, MIN_WIDTH, MIN_HEIGHT
        ));
    }
    if width > MAX_WIDTH || height > MAX_HEIGHT {
        return Err(format!(
            "canvas {}x{} exceeds the maximum {}x{}",
            width, height, MAX_WIDTH, MAX_HEIGHT
        ));
    }
    Ok(())
}

/// カテゴリラベルの配置結果
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryLabels {
    /// 表示するラベル（`None`は間引き対象）
    pub labels: Vec<Option<String>>,
    /// -45度に回転するか
    pub rotated: bool,
}

/// 表示幅の推定（px）
pub(crate) fn text_width(text: &str) -> f64 {
    UnicodeWidthStr::width(text) as f64 * GLYPH_WIDTH
}

/// 表示幅`max_columns`桁に収まるよう末尾を省略する
pub(crate) fn truncate_columns(text: &str, max_columns: usize) -> String {
    if UnicodeWidthStr::width(text) <= max_columns {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max_columns {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// `span`px に等間隔で並ぶカテゴリラベルの回転・省略・間引きを決める
///
/// 横書きで収まらない場合は回転して桁数を制限し、
/// それでも品質設定のラベル間隔より狭い場合は間引きます。
pub(crate) fn fit_category_labels(labels: &[String], span: f64, quality: Quality) -> CategoryLabels {
    if labels.is_empty() {
        return CategoryLabels {
            labels: Vec::new(),
            rotated: false,
        };
    }
    let slot = span / labels.len() as f64;
    let widest = labels.iter().map(|l| text_width(l)).fold(0.0, f64::max);
    let rotated = widest > slot;

    let stride = if rotated {
        (quality.label_pitch() / slot).ceil().max(1.0) as usize
    } else {
        1
    };

    let labels = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            (i % stride == 0).then(|| {
                if rotated {
                    truncate_columns(label, MAX_ROTATED_COLUMNS)
                } else {
                    label.clone()
                }
            })
        })
        .collect();

    CategoryLabels { labels, rotated }
}
