//! Style Module
//!
//! セルスタイルの型定義と、スタイルの重複排除（インターン化）テーブルを提供するモジュール。
//!
//! 同じ書式を持つセルは必ず同じ`StyleId`を参照します。スタイル解決は
//! セル数ではなく、異なるスタイルの数に比例したコストで行われます。

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// RGB色
///
/// `#RGB`、`#RRGGBB`、Excel形式の`AARRGGBB`、および少数の色名から生成できます。
/// シリアライズ時は`#rrggbb`形式の文字列になります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// RGB値から色を生成
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS用の16進表記（`#rrggbb`）
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// 2色間を線形補間
    ///
    /// `ratio`は0.0〜1.0に丸められます。
    pub fn interpolate(&self, other: &Color, ratio: f64) -> Color {
        let ratio = if ratio.is_finite() {
            ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mix = |a: u8, b: u8| -> u8 {
            (f64::from(a) + (f64::from(b) - f64::from(a)) * ratio).round() as u8
        };
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let named = match trimmed.to_ascii_lowercase().as_str() {
            "black" => Some(Color::BLACK),
            "white" => Some(Color::WHITE),
            "red" => Some(Color::rgb(255, 0, 0)),
            "green" => Some(Color::rgb(0, 128, 0)),
            "blue" => Some(Color::rgb(0, 0, 255)),
            "yellow" => Some(Color::rgb(255, 255, 0)),
            "cyan" => Some(Color::rgb(0, 255, 255)),
            "magenta" => Some(Color::rgb(255, 0, 255)),
            _ => None,
        };
        if let Some(color) = named {
            return Ok(color);
        }

        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Invalid color: '{}'", s));
        }

        let channel = |part: &str| u8::from_str_radix(part, 16).map_err(|e| e.to_string());
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..=i].repeat(2));
                Ok(Color::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Color::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            // ARGB（Excel形式）: 先頭2桁のアルファは捨てる
            8 => Ok(Color::rgb(
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => Err(format!("Invalid color: '{}'", s)),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// フォントサイズ（1/100ポイント単位）
///
/// `Style`を`Hash`/`Eq`で比較できるよう、浮動小数点ではなく整数で保持します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct FontSize(u32);

impl FontSize {
    /// ポイント値から生成（負値・非有限値は0）
    pub fn from_points(points: f64) -> Self {
        if points.is_finite() && points > 0.0 {
            FontSize((points * 100.0).round() as u32)
        } else {
            FontSize(0)
        }
    }

    /// ポイント値
    pub fn points(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl From<f64> for FontSize {
    fn from(value: f64) -> Self {
        FontSize::from_points(value)
    }
}

impl From<FontSize> for f64 {
    fn from(value: FontSize) -> Self {
        value.points()
    }
}

/// フォント属性
///
/// `None`/`false`の項目は「未指定」を意味し、テーマの値が使われます。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Font {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<FontSize>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

/// 罫線の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderKind {
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl BorderKind {
    /// CSSの`(線幅, 線種)`
    pub fn css(&self) -> (&'static str, &'static str) {
        match self {
            BorderKind::Thin | BorderKind::Hair => ("1px", "solid"),
            BorderKind::Medium => ("2px", "solid"),
            BorderKind::Thick => ("3px", "solid"),
            BorderKind::Dashed | BorderKind::DashDot | BorderKind::DashDotDot => ("1px", "dashed"),
            BorderKind::MediumDashed
            | BorderKind::MediumDashDot
            | BorderKind::MediumDashDotDot
            | BorderKind::SlantDashDot => ("2px", "dashed"),
            BorderKind::Dotted => ("1px", "dotted"),
            BorderKind::Double => ("3px", "double"),
        }
    }
}

/// 1辺分の罫線
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderEdge {
    pub kind: BorderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl BorderEdge {
    /// 新しい罫線を生成
    pub fn new(kind: BorderKind, color: Option<Color>) -> Self {
        Self { kind, color }
    }

    /// CSSの`border-*`値（例: `1px solid #000000`）
    pub fn to_css(&self) -> String {
        let (width, line) = self.kind.css();
        let color = self.color.unwrap_or(Color::BLACK);
        format!("{} {} {}", width, line, color.to_hex())
    }
}

/// 4辺の罫線
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Border {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<BorderEdge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<BorderEdge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<BorderEdge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<BorderEdge>,
}

impl Border {
    /// 4辺すべてに同じ罫線を設定
    pub fn all(edge: BorderEdge) -> Self {
        Self {
            top: Some(edge),
            right: Some(edge),
            bottom: Some(edge),
            left: Some(edge),
        }
    }

    /// `(CSSプロパティ名, 罫線)`の組を上・右・下・左の順で返す
    pub fn edges(&self) -> [(&'static str, Option<BorderEdge>); 4] {
        [
            ("border-top", self.top),
            ("border-right", self.right),
            ("border-bottom", self.bottom),
            ("border-left", self.left),
        ]
    }
}

/// 水平方向の配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HAlign {
    Left,
    Center,
    Right,
    Justify,
}

impl HAlign {
    pub fn as_css(&self) -> &'static str {
        match self {
            HAlign::Left => "left",
            HAlign::Center => "center",
            HAlign::Right => "right",
            HAlign::Justify => "justify",
        }
    }
}

/// 垂直方向の配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

impl VAlign {
    /// CSSの`vertical-align`値（`Center`は`middle`）
    pub fn as_css(&self) -> &'static str {
        match self {
            VAlign::Top => "top",
            VAlign::Center => "middle",
            VAlign::Bottom => "bottom",
        }
    }
}

/// セルスタイル
///
/// インターン化後は不変です。未指定の属性はテーマの値で補われます。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub font: Font,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    pub border: Border,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h_align: Option<HAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v_align: Option<VAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
    pub wrap: bool,
}

impl Style {
    /// 太字を設定したスタイルを返す
    pub fn bold(mut self) -> Self {
        self.font.bold = true;
        self
    }

    /// 斜体を設定したスタイルを返す
    pub fn italic(mut self) -> Self {
        self.font.italic = true;
        self
    }

    /// 背景色を設定したスタイルを返す
    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    /// 文字色を設定したスタイルを返す
    pub fn with_font_color(mut self, color: Color) -> Self {
        self.font.color = Some(color);
        self
    }

    /// 水平配置を設定したスタイルを返す
    pub fn with_h_align(mut self, align: HAlign) -> Self {
        self.h_align = Some(align);
        self
    }

    /// 数値書式を設定したスタイルを返す
    pub fn with_number_format(mut self, format: impl Into<String>) -> Self {
        self.number_format = Some(format.into());
        self
    }
}

/// スタイルテーブル内の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleId(pub u32);

impl StyleId {
    /// 既定スタイル（テーブル作成時に必ず登録される）
    pub const DEFAULT: StyleId = StyleId(0);

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 重複排除されたスタイルテーブル
///
/// 内容からIDへの索引（`HashMap<Style, StyleId>`）を持ち、
/// 同じ内容のスタイルを登録すると既存のIDを返します。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Style>", into = "Vec<Style>")]
pub struct StyleTable {
    styles: Vec<Style>,
    index: HashMap<Style, StyleId>,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleTable {
    /// 既定スタイルのみを含むテーブルを生成
    pub fn new() -> Self {
        let mut table = Self {
            styles: Vec::new(),
            index: HashMap::new(),
        };
        table.intern(Style::default());
        table
    }

    /// スタイルを登録し、IDを返す
    ///
    /// 同じ内容のスタイルが既に登録されている場合は、そのIDを返します。
    pub fn intern(&mut self, style: Style) -> StyleId {
        if let Some(id) = self.index.get(&style) {
            return *id;
        }
        let id = StyleId(self.styles.len() as u32);
        self.index.insert(style.clone(), id);
        self.styles.push(style);
        id
    }

    /// IDからスタイルを取得
    pub fn get(&self, id: StyleId) -> Option<&Style> {
        self.styles.get(id.index())
    }

    /// 登録済みスタイル数
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// テーブルが空かどうか（既定スタイルがあるため通常は`false`）
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// `(StyleId, &Style)`をID順に列挙
    pub fn iter(&self) -> impl Iterator<Item = (StyleId, &Style)> {
        self.styles
            .iter()
            .enumerate()
            .map(|(i, style)| (StyleId(i as u32), style))
    }
}

impl TryFrom<Vec<Style>> for StyleTable {
    type Error = String;

    fn try_from(styles: Vec<Style>) -> Result<Self, Self::Error> {
        if styles.is_empty() {
            return Ok(Self::new());
        }
        let mut table = Self {
            styles: Vec::with_capacity(styles.len()),
            index: HashMap::with_capacity(styles.len()),
        };
        for (i, style) in styles.into_iter().enumerate() {
            let id = table.intern(style);
            if id.index() != i {
                return Err(format!(
                    "duplicate style: style {} is identical to style {}",
                    i, id
                ));
            }
        }
        Ok(table)
    }
}

impl From<StyleTable> for Vec<Style> {
    fn from(value: StyleTable) -> Self {
        value.styles
    }
}
