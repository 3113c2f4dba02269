//! Color Palette Module
//!
//! チャートの系列色を決める配色パレット。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SheetGlazeError;

const DEFAULT: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const BUSINESS: [&str; 10] = [
    "#1f4e79", "#5b9bd5", "#70ad47", "#ffc000", "#c55a11", "#264478", "#7030a0", "#0563c1",
    "#954f72", "#e7e6e6",
];

const MODERN: [&str; 10] = [
    "#667eea", "#764ba2", "#f093fb", "#f5576c", "#4facfe", "#00f2fe", "#43e97b", "#38f9d7",
    "#ffecd2", "#fcb69f",
];

const COLORFUL: [&str; 10] = [
    "#ff6b6b", "#4ecdc4", "#45b7d1", "#96ceb4", "#ffeaa7", "#dda0dd", "#98d8c8", "#f7dc6f",
    "#bb8fce", "#85c1e9",
];

/// 配色パレット
///
/// 系列`i`の色は`colors()[i % colors().len()]`です。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    #[default]
    Default,
    Business,
    Modern,
    Colorful,
}

impl ColorScheme {
    /// パレットの色一覧
    pub fn colors(&self) -> &'static [&'static str] {
        match self {
            ColorScheme::Default => &DEFAULT,
            ColorScheme::Business => &BUSINESS,
            ColorScheme::Modern => &MODERN,
            ColorScheme::Colorful => &COLORFUL,
        }
    }

    /// 系列インデックスに対応する色（パレットを循環）
    pub fn color(&self, index: usize) -> &'static str {
        let colors = self.colors();
        colors[index % colors.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Default => "default",
            ColorScheme::Business => "business",
            ColorScheme::Modern => "modern",
            ColorScheme::Colorful => "colorful",
        }
    }
}

impl FromStr for ColorScheme {
    type Err = SheetGlazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(ColorScheme::Default),
            "business" => Ok(ColorScheme::Business),
            "modern" => Ok(ColorScheme::Modern),
            "colorful" => Ok(ColorScheme::Colorful),
            other => Err(SheetGlazeError::Config(format!(
                "Unknown color scheme: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
