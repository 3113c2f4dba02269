//! Chart Geometry Module
//!
//! チャート定義（`ChartSpec`）から、座標系・軸・凡例・図形を計算し、
//! 自己完結したSVGとして出力するモジュール。
//!
//! # 処理の流れ
//!
//! 1. キャンバス検証（`ChartLayout`エラー）
//! 2. データ検証（`ChartData`エラー）
//! 3. 種別ごとの幾何計算（直交座標系: `cartesian`、極座標系: `polar`）
//! 4. タイトル・凡例の付加
//! 5. 品質設定の小数桁でSVGに直列化
//!
//! 未対応の種別を別の種別で代用することはありません。

mod cartesian;
mod drawing;
mod layout;
mod palette;
mod polar;
mod scale;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SheetGlazeError;
use crate::types::CellCoord;

pub use drawing::{Drawing, Label, Paint, PathCommand, Shape, TextAnchor};
pub use layout::{Canvas, Point, Rect};
pub use palette::ColorScheme;
pub use scale::NiceScale;

pub(crate) use layout::check_size;

/// 凡例の色見本の一辺（px）
const LEGEND_SWATCH: f64 = 15.0;
/// 凡例の行間隔（px）
const LEGEND_ROW: f64 = 25.0;
/// 凡例ラベルの最大桁数
const LEGEND_COLUMNS: usize = 10;

/// チャートの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// 縦棒
    Column,
    /// 横棒
    Bar,
    Line,
    Pie,
    Donut,
    Area,
    Scatter,
    /// バブル（第3の値を面積で表す）
    Bubble,
    Radar,
    /// ゲージ（最初の値を最大値に対する割合で表示）
    Gauge,
    /// 縦棒と折れ線の組み合わせ
    Combo,
}

impl ChartKind {
    pub const ALL: [ChartKind; 11] = [
        ChartKind::Column,
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::Donut,
        ChartKind::Area,
        ChartKind::Scatter,
        ChartKind::Bubble,
        ChartKind::Radar,
        ChartKind::Gauge,
        ChartKind::Combo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Column => "column",
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Donut => "donut",
            ChartKind::Area => "area",
            ChartKind::Scatter => "scatter",
            ChartKind::Bubble => "bubble",
            ChartKind::Radar => "radar",
            ChartKind::Gauge => "gauge",
            ChartKind::Combo => "combo",
        }
    }

    /// 値軸が0を含む必要があるか
    pub fn requires_zero_baseline(&self) -> bool {
        matches!(
            self,
            ChartKind::Column | ChartKind::Bar | ChartKind::Area | ChartKind::Combo
        )
    }

    /// 凡例が系列ではなくカテゴリを表すか
    fn legend_by_category(&self) -> bool {
        matches!(self, ChartKind::Pie | ChartKind::Donut)
    }
}

impl FromStr for ChartKind {
    type Err = SheetGlazeError;

    /// 種別名を解析する（大文字小文字は区別しない）
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use sheetglaze::{ChartKind, SheetGlazeError};
    ///
    /// assert_eq!("Column".parse::<ChartKind>().unwrap(), ChartKind::Column);
    /// assert!(matches!(
    ///     "waterfall".parse::<ChartKind>(),
    ///     Err(SheetGlazeError::UnsupportedChartKind(_))
    /// ));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if name == "doughnut" {
            return Ok(ChartKind::Donut);
        }
        ChartKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| SheetGlazeError::UnsupportedChartKind(s.to_string()))
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 品質設定
///
/// 座標の小数桁・補助目盛り線・ラベル密度を制御します。
/// データから図形への写像は変わりません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Low,
    Medium,
    #[default]
    High,
}

impl Quality {
    /// 座標の小数桁数
    pub fn precision(&self) -> usize {
        match self {
            Quality::Low => 0,
            Quality::Medium => 1,
            Quality::High => 2,
        }
    }

    /// 補助目盛り線を描くか
    pub fn minor_gridlines(&self) -> bool {
        matches!(self, Quality::High)
    }

    /// 回転したカテゴリラベルの最小間隔（px）
    pub(crate) fn label_pitch(&self) -> f64 {
        match self {
            Quality::Low => 48.0,
            Quality::Medium => 32.0,
            Quality::High => 20.0,
        }
    }
}

impl FromStr for Quality {
    type Err = SheetGlazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Quality::Low),
            "medium" => Ok(Quality::Medium),
            "high" => Ok(Quality::High),
            other => Err(SheetGlazeError::Config(format!(
                "Unknown chart quality: {}",
                other
            ))),
        }
    }
}

/// 組み合わせチャートでの系列の描き方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComboPart {
    Column,
    Line,
}

/// チャートの見た目の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub color_scheme: ColorScheme,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::Default,
            width: 600,
            height: 400,
            quality: Quality::High,
        }
    }
}

/// データ系列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    /// バブルの大きさ（バブルチャートのみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<f64>>,
    /// 組み合わせチャートでの描き方（未指定は縦棒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combo: Option<ComboPart>,
    /// 第2軸を使うか（組み合わせチャートのみ）
    #[serde(default)]
    pub secondary_axis: bool,
}

impl Series {
    /// 新しい系列を生成
    pub fn new<C, S, V>(name: impl Into<String>, categories: C, values: V) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
        V: IntoIterator<Item = f64>,
    {
        Self {
            name: name.into(),
            categories: categories.into_iter().map(Into::into).collect(),
            values: values.into_iter().collect(),
            sizes: None,
            combo: None,
            secondary_axis: false,
        }
    }

    pub fn with_sizes(mut self, sizes: impl IntoIterator<Item = f64>) -> Self {
        self.sizes = Some(sizes.into_iter().collect());
        self
    }

    pub fn with_combo(mut self, part: ComboPart) -> Self {
        self.combo = Some(part);
        self
    }

    pub fn on_secondary_axis(mut self) -> Self {
        self.secondary_axis = true;
        self
    }

    fn finite_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied().filter(|v| v.is_finite())
    }
}

/// チャート定義
///
/// # 使用例
///
/// ```rust
/// use sheetglaze::{ChartKind, ChartSpec, ChartStyle, Series};
///
/// let chart = ChartSpec::new(ChartKind::Column, "Sales")
///     .with_series(Series::new("2024", ["Q1", "Q2"], [100.0, 150.0]));
/// let svg = chart.to_svg(&ChartStyle::default()).unwrap();
/// assert!(svg.starts_with("<svg"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_title: Option<String>,
    #[serde(default)]
    pub series: Vec<Series>,
    /// 未指定の場合は変換器の既定値を使う
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ChartStyle>,
    /// チャートを埋め込むセル
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<CellCoord>,
    /// 値軸の範囲の固定（ゲージでは最小値と最大値）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_range: Option<(f64, f64)>,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            x_title: None,
            y_title: None,
            series: Vec::new(),
            style: None,
            anchor: None,
            value_range: None,
        }
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_axis_titles(mut self, x_title: impl Into<String>, y_title: impl Into<String>) -> Self {
        self.x_title = Some(x_title.into());
        self.y_title = Some(y_title.into());
        self
    }

    pub fn with_style(mut self, style: ChartStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_anchor(mut self, row: u32, col: u32) -> Self {
        self.anchor = Some(CellCoord::new(row, col));
        self
    }

    pub fn with_value_range(mut self, min: f64, max: f64) -> Self {
        self.value_range = Some((min, max));
        self
    }

    /// エラーや警告で使う名前（タイトルが空なら種別名）
    pub fn label(&self) -> String {
        if self.title.trim().is_empty() {
            format!("{} chart", self.kind)
        } else {
            self.title.clone()
        }
    }

    /// データの整合性を検証する
    ///
    /// # 発生し得るエラー
    ///
    /// * `SheetGlazeError::ChartData`: 次のいずれかの場合
    ///   * 系列がない、または値が空の系列がある
    ///   * カテゴリ数と値の数（バブルの大きさの数）が一致しない
    ///   * すべての値が非有限値
    ///   * `value_range`が空、または非有限値
    pub fn validate(&self) -> Result<(), SheetGlazeError> {
        let invalid = |message: String| SheetGlazeError::chart_data(&self.label(), message);

        if self.series.is_empty() {
            return Err(invalid("chart has no series".to_string()));
        }
        for series in &self.series {
            if series.values.is_empty() {
                return Err(invalid(format!("series '{}' has no values", series.name)));
            }
            if series.categories.len() != series.values.len() {
                return Err(invalid(format!(
                    "series '{}' has {} categories but {} values",
                    series.name,
                    series.categories.len(),
                    series.values.len()
                )));
            }
            if let Some(sizes) = &series.sizes {
                if sizes.len() != series.values.len() {
                    return Err(invalid(format!(
                        "series '{}' has {} sizes but {} values",
                        series.name,
                        sizes.len(),
                        series.values.len()
                    )));
                }
            }
        }
        if !self.series.iter().any(|s| s.finite_values().next().is_some()) {
            return Err(invalid("all values are non-finite".to_string()));
        }
        if let Some((lo, hi)) = self.value_range {
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(invalid(format!("invalid value range [{}, {}]", lo, hi)));
            }
        }
        Ok(())
    }

    /// 図形ツリーを計算する
    ///
    /// # 引数
    ///
    /// * `defaults` - チャート自身に`style`がない場合に使う設定
    ///
    /// # 戻り値
    ///
    /// * `Ok(Drawing)` - 図形ツリー
    /// * `Err(SheetGlazeError)` - `ChartLayout`（キャンバス不正）または`ChartData`（データ不整合）
    pub fn layout(&self, defaults: &ChartStyle) -> Result<Drawing, SheetGlazeError> {
        let style = self.style.as_ref().unwrap_or(defaults);
        let label = self.label();
        let canvas = Canvas::new(style.width, style.height)
            .map_err(|message| SheetGlazeError::chart_layout(&label, message))?;
        self.validate()?;

        let frame = Frame {
            spec: self,
            canvas,
            plot: canvas.plot,
            scheme: style.color_scheme,
            quality: style.quality,
        };

        let body = match self.kind {
            ChartKind::Pie | ChartKind::Donut | ChartKind::Radar | ChartKind::Gauge => {
                polar::layout(&frame)
            }
            ChartKind::Column
            | ChartKind::Bar
            | ChartKind::Line
            | ChartKind::Area
            | ChartKind::Scatter
            | ChartKind::Bubble
            | ChartKind::Combo => cartesian::layout(&frame),
        }
        .map_err(|message| SheetGlazeError::chart_data(&label, message))?;

        let mut shapes = Vec::with_capacity(body.len() + 2);
        if !self.title.trim().is_empty() {
            shapes.push(Shape::Text(
                Label::new(
                    Point::new(f64::from(canvas.width) / 2.0, 30.0),
                    self.title.clone(),
                    16.0,
                )
                .anchored(TextAnchor::Middle)
                .bold(),
            ));
        }
        shapes.extend(body);
        shapes.push(frame.legend());

        Ok(Drawing {
            width: canvas.width,
            height: canvas.height,
            title: label,
            shapes,
        })
    }

    /// SVG文字列を生成する
    ///
    /// 座標の小数桁は品質設定（Low: 0桁、Medium: 1桁、High: 2桁）に従います。
    pub fn to_svg(&self, defaults: &ChartStyle) -> Result<String, SheetGlazeError> {
        let quality = self.style.as_ref().unwrap_or(defaults).quality;
        Ok(self.layout(defaults)?.to_svg(quality.precision()))
    }
}

/// 幾何計算に共通する文脈
pub(crate) struct Frame<'a> {
    pub spec: &'a ChartSpec,
    pub canvas: Canvas,
    pub plot: Rect,
    pub scheme: ColorScheme,
    pub quality: Quality,
}

impl<'a> Frame<'a> {
    /// 最も長い系列のカテゴリ
    pub fn categories(&self) -> &'a [String] {
        self.spec
            .series
            .iter()
            .max_by_key(|s| s.categories.len())
            .map(|s| s.categories.as_slice())
            .unwrap_or(&[])
    }

    /// 系列（またはカテゴリ）インデックスの色
    pub fn color(&self, index: usize) -> &'static str {
        self.scheme.color(index)
    }

    /// 第2軸を使う系列があるか（組み合わせチャートのみ）
    pub fn has_secondary_axis(&self) -> bool {
        self.spec.kind == ChartKind::Combo && self.spec.series.iter().any(|s| s.secondary_axis)
    }

    /// 凡例（系列の宣言順、円グラフはカテゴリ順）
    fn legend(&self) -> Shape {
        let names: Vec<&str> = if self.spec.kind.legend_by_category() {
            self.spec
                .series
                .first()
                .map(|s| s.categories.iter().map(String::as_str).collect())
                .unwrap_or_default()
        } else {
            self.spec.series.iter().map(|s| s.name.as_str()).collect()
        };

        let offset = if self.has_secondary_axis() {
            cartesian::SECONDARY_AXIS_WIDTH
        } else {
            0.0
        };
        let x = self.plot.right() + 20.0 + offset;
        let y = self.plot.y + 20.0;

        let mut children = Vec::with_capacity(names.len() * 2);
        for (i, name) in names.iter().enumerate() {
            let row_y = y + i as f64 * LEGEND_ROW;
            children.push(Shape::Rect {
                rect: Rect::new(x, row_y, LEGEND_SWATCH, LEGEND_SWATCH),
                paint: Paint::fill(self.color(i)).with_stroke("#333333", 1.0),
                tooltip: None,
            });
            children.push(Shape::Text(Label::new(
                Point::new(x + 25.0, row_y + 12.0),
                layout::truncate_columns(name, LEGEND_COLUMNS),
                11.0,
            )));
        }
        Shape::group("legend", children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_chart() -> ChartSpec {
        ChartSpec::new(ChartKind::Column, "Quarterly")
            .with_series(Series::new("A", ["Q1", "Q2", "Q3"], [120.0, 150.0, 180.0]))
            .with_series(Series::new("B", ["Q1", "Q2", "Q3"], [100.0, 130.0, 160.0]))
    }

    #[test]
    fn test_kind_parse_and_display() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.as_str().parse::<ChartKind>().unwrap(), kind);
        }
        assert_eq!("doughnut".parse::<ChartKind>().unwrap(), ChartKind::Donut);
        assert!(matches!(
            "sunburst".parse::<ChartKind>(),
            Err(SheetGlazeError::UnsupportedChartKind(name)) if name == "sunburst"
        ));
    }

    #[test]
    fn test_unsupported_kind_in_json_is_an_error() {
        let json = r#"{"kind":"funnel","series":[]}"#;
        assert!(serde_json::from_str::<ChartSpec>(json).is_err());
    }

    #[test]
    fn test_label() {
        assert_eq!(column_chart().label(), "Quarterly");
        assert_eq!(ChartSpec::new(ChartKind::Pie, " ").label(), "pie chart");
    }

    #[test]
    fn test_validate_length_mismatch() {
        let chart = ChartSpec::new(ChartKind::Line, "Broken")
            .with_series(Series::new("S", ["a", "b", "c"], [1.0, 2.0]));
        let err = chart.validate().unwrap_err();
        assert!(matches!(err, SheetGlazeError::ChartData { .. }));
        assert!(err.to_string().contains("3 categories but 2 values"));
    }

    #[test]
    fn test_validate_non_finite_and_empty() {
        let nan = ChartSpec::new(ChartKind::Line, "NaN")
            .with_series(Series::new("S", ["a", "b"], [f64::NAN, f64::INFINITY]));
        assert!(nan.validate().unwrap_err().to_string().contains("non-finite"));

        let empty = ChartSpec::new(ChartKind::Column, "Empty");
        assert!(empty.validate().unwrap_err().to_string().contains("no series"));

        let bad_range = column_chart().with_value_range(10.0, 10.0);
        assert!(bad_range.validate().is_err());
    }

    #[test]
    fn test_layout_rejects_small_canvas() {
        let chart = column_chart().with_style(ChartStyle {
            width: 100,
            height: 100,
            ..Default::default()
        });
        let err = chart.layout(&ChartStyle::default()).unwrap_err();
        assert!(matches!(err, SheetGlazeError::ChartLayout { .. }));
    }

    #[test]
    fn test_legend_follows_declaration_order() {
        let drawing = column_chart().layout(&ChartStyle::default()).unwrap();
        let legend = drawing.group("legend").unwrap();
        assert_eq!(legend.len(), 4);
        match (&legend[0], &legend[1], &legend[3]) {
            (Shape::Rect { paint, .. }, Shape::Text(first), Shape::Text(second)) => {
                assert_eq!(paint.fill.as_deref(), Some("#1f77b4"));
                assert_eq!(first.text, "A");
                assert_eq!(second.text, "B");
            }
            other => panic!("unexpected legend shapes: {:?}", other),
        }
    }

    #[test]
    fn test_spec_style_overrides_defaults() {
        let chart = column_chart().with_style(ChartStyle {
            width: 800,
            height: 500,
            color_scheme: ColorScheme::Modern,
            quality: Quality::Low,
        });
        let drawing = chart.layout(&ChartStyle::default()).unwrap();
        assert_eq!((drawing.width, drawing.height), (800, 500));
        let svg = chart.to_svg(&ChartStyle::default()).unwrap();
        assert!(svg.contains("#667eea"));
    }

    #[test]
    fn test_same_input_same_svg() {
        let a = column_chart().to_svg(&ChartStyle::default()).unwrap();
        let b = column_chart().to_svg(&ChartStyle::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_kind_renders() {
        for kind in ChartKind::ALL {
            let mut chart = ChartSpec::new(kind, kind.as_str())
                .with_series(Series::new("S1", ["1", "2", "3"], [3.0, 5.0, 2.0]).with_sizes([1.0, 4.0, 9.0]))
                .with_series(
                    Series::new("S2", ["1", "2", "3"], [4.0, 1.0, 6.0])
                        .with_sizes([2.0, 2.0, 2.0])
                        .with_combo(ComboPart::Line),
                );
            if kind == ChartKind::Gauge {
                chart = chart.with_value_range(0.0, 10.0);
            }
            let svg = chart.to_svg(&ChartStyle::default());
            assert!(svg.is_ok(), "{} failed: {:?}", kind, svg.err());
        }
    }
}
