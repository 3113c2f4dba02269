//! Conditional Formatting Module
//!
//! セルの値に応じてスタイルを上書きする条件付き書式ルールを提供するモジュール。
//!
//! ルールはアドレスではなく値に対して評価されます。色スケール・データバー・
//! 上位/下位・重複値のように、シート全体の値の分布を使うルールは
//! `SheetStats`（シートごとに一度だけ集計）を参照します。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::style::Color;
use crate::theme::Declarations;
use crate::types::CellValue;

/// 数値比較の演算子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Equal,
    NotEqual,
    Between,
    NotBetween,
}

/// 文字列一致の演算子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOperator {
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
}

/// ルールが一致したときに適用する書式
///
/// `None`の項目は変更しません。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionalFormat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
}

impl ConditionalFormat {
    /// 既存の宣言集合に書式を上書きする
    pub fn apply_to(&self, decls: &mut Declarations) {
        if let Some(bold) = self.bold {
            decls.set("font-weight", if bold { "bold" } else { "normal" });
        }
        if let Some(italic) = self.italic {
            decls.set("font-style", if italic { "italic" } else { "normal" });
        }
        if let Some(underline) = self.underline {
            let current = decls.get("text-decoration").unwrap_or("none");
            let strike = current.contains("line-through");
            let value = match (underline, strike) {
                (true, true) => "underline line-through",
                (true, false) => "underline",
                (false, true) => "line-through",
                (false, false) => "none",
            };
            decls.set("text-decoration", value);
        }
        if let Some(color) = self.text_color {
            decls.set("color", &color.to_hex());
        }
        if let Some(color) = self.background_color {
            decls.set("background-color", &color.to_hex());
        }
    }
}

/// 条件付き書式ルール
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionalRule {
    /// 数値を閾値と比較する
    ValueBased {
        operator: ComparisonOperator,
        value1: f64,
        /// `Between`/`NotBetween`の上限
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value2: Option<f64>,
        format: ConditionalFormat,
    },

    /// 文字列をパターンと照合する
    TextBased {
        operator: TextOperator,
        pattern: String,
        #[serde(default)]
        case_sensitive: bool,
        format: ConditionalFormat,
    },

    /// シート内の数値の最小〜最大に応じて背景色を補間する
    ColorScale {
        min_color: Color,
        max_color: Color,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mid_color: Option<Color>,
    },

    /// シート内の数値の位置に応じた長さの横棒を背景に描く
    DataBar { color: Color },

    /// シート内の数値の上位（または下位）N件を強調する
    TopBottom {
        count: usize,
        #[serde(default = "default_true")]
        top: bool,
        format: ConditionalFormat,
    },

    /// シート内で2回以上現れる値を強調する（大文字小文字と前後の空白を無視）
    DuplicateValues { format: ConditionalFormat },
}

fn default_true() -> bool {
    true
}

impl ConditionalRule {
    /// ルールを評価し、一致した場合は宣言集合を上書きする
    ///
    /// # 戻り値
    ///
    /// ルールが一致して上書きを行った場合は`true`
    pub fn apply(&self, value: &CellValue, stats: &SheetStats, decls: &mut Declarations) -> bool {
        let value = value.effective();
        match self {
            ConditionalRule::ValueBased {
                operator,
                value1,
                value2,
                format,
            } => {
                let Some(num) = value.as_number() else {
                    return false;
                };
                if compare(*operator, num, *value1, *value2) {
                    format.apply_to(decls);
                    true
                } else {
                    false
                }
            }

            ConditionalRule::TextBased {
                operator,
                pattern,
                case_sensitive,
                format,
            } => {
                let CellValue::Text(text) = value else {
                    return false;
                };
                let (text, pattern) = if *case_sensitive {
                    (text.clone(), pattern.clone())
                } else {
                    (text.to_lowercase(), pattern.to_lowercase())
                };
                let matched = match operator {
                    TextOperator::Contains => text.contains(&pattern),
                    TextOperator::NotContains => !text.contains(&pattern),
                    TextOperator::StartsWith => text.starts_with(&pattern),
                    TextOperator::EndsWith => text.ends_with(&pattern),
                };
                if matched {
                    format.apply_to(decls);
                }
                matched
            }

            ConditionalRule::ColorScale {
                min_color,
                max_color,
                mid_color,
            } => {
                let Some(ratio) = value.as_number().and_then(|n| stats.ratio(n)) else {
                    return false;
                };
                let color = match mid_color {
                    Some(mid) if ratio < 0.5 => min_color.interpolate(mid, ratio * 2.0),
                    Some(mid) => mid.interpolate(max_color, (ratio - 0.5) * 2.0),
                    None => min_color.interpolate(max_color, ratio),
                };
                decls.set("background-color", &color.to_hex());
                true
            }

            ConditionalRule::DataBar { color } => {
                let Some(ratio) = value.as_number().and_then(|n| stats.ratio(n)) else {
                    return false;
                };
                let percent = format_percent(ratio * 100.0);
                let hex = color.to_hex();
                decls.set(
                    "background",
                    &format!(
                        "linear-gradient(to right, {hex} 0%, {hex} {p}%, transparent {p}%, transparent 100%)",
                        hex = hex,
                        p = percent
                    ),
                );
                true
            }

            ConditionalRule::TopBottom { count, top, format } => {
                let Some(num) = value.as_number() else {
                    return false;
                };
                let Some(threshold) = stats.rank_threshold(*count, *top) else {
                    return false;
                };
                let selected = if *top {
                    num >= threshold
                } else {
                    num <= threshold
                };
                if selected {
                    format.apply_to(decls);
                }
                selected
            }

            ConditionalRule::DuplicateValues { format } => {
                let Some(key) = duplicate_key(value) else {
                    return false;
                };
                let duplicated = stats.occurrences(&key) > 1;
                if duplicated {
                    format.apply_to(decls);
                }
                duplicated
            }
        }
    }

    /// シート全体の統計を必要とするルールかどうか
    pub(crate) fn needs_stats(&self) -> bool {
        !matches!(
            self,
            ConditionalRule::ValueBased { .. } | ConditionalRule::TextBased { .. }
        )
    }
}

fn compare(operator: ComparisonOperator, num: f64, value1: f64, value2: Option<f64>) -> bool {
    match operator {
        ComparisonOperator::GreaterThan => num > value1,
        ComparisonOperator::GreaterThanOrEqual => num >= value1,
        ComparisonOperator::LessThan => num < value1,
        ComparisonOperator::LessThanOrEqual => num <= value1,
        ComparisonOperator::Equal => (num - value1).abs() < f64::EPSILON,
        ComparisonOperator::NotEqual => (num - value1).abs() >= f64::EPSILON,
        ComparisonOperator::Between => value2.is_some_and(|v2| num >= value1 && num <= v2),
        ComparisonOperator::NotBetween => value2.is_some_and(|v2| num < value1 || num > v2),
    }
}

/// 百分率を小数2桁までで表記（末尾の0は省く）
fn format_percent(value: f64) -> String {
    let s = format!("{:.2}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// 重複判定用のキー
fn duplicate_key(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Text(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| format!("t:{}", trimmed.to_lowercase()))
        }
        CellValue::Number(n) if n.is_finite() => Some(format!("n:{}", n)),
        CellValue::Boolean(b) => Some(format!("b:{}", b)),
        CellValue::Date(d) => Some(format!("d:{}", d)),
        _ => None,
    }
}

/// シート全体の値の分布
///
/// シートごとに一度だけ集計され、以降は読み取り専用です。
#[derive(Debug, Clone, Default)]
pub struct SheetStats {
    /// 昇順にソートされた有限な数値
    numbers: Vec<f64>,
    occurrences: HashMap<String, usize>,
}

impl SheetStats {
    /// 値の列から統計を集計
    pub fn collect<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a CellValue>,
    {
        let mut stats = SheetStats::default();
        for value in values {
            let value = value.effective();
            if let Some(n) = value.as_number() {
                stats.numbers.push(n);
            }
            if let Some(key) = duplicate_key(value) {
                *stats.occurrences.entry(key).or_insert(0) += 1;
            }
        }
        stats.numbers.sort_by(f64::total_cmp);
        stats
    }

    /// 最小値
    pub fn min(&self) -> Option<f64> {
        self.numbers.first().copied()
    }

    /// 最大値
    pub fn max(&self) -> Option<f64> {
        self.numbers.last().copied()
    }

    /// 値の最小〜最大における相対位置（0.0〜1.0）
    ///
    /// 最小値と最大値が等しい場合は0.5を返します。
    fn ratio(&self, value: f64) -> Option<f64> {
        let (min, max) = (self.min()?, self.max()?);
        if max > min {
            Some(((value - min) / (max - min)).clamp(0.0, 1.0))
        } else {
            Some(0.5)
        }
    }

    /// 上位（下位）N件に入るための閾値
    fn rank_threshold(&self, count: usize, top: bool) -> Option<f64> {
        if count == 0 || self.numbers.is_empty() {
            return None;
        }
        let n = count.min(self.numbers.len());
        if top {
            self.numbers.get(self.numbers.len() - n).copied()
        } else {
            self.numbers.get(n - 1).copied()
        }
    }

    fn occurrences(&self, key: &str) -> usize {
        self.occurrences.get(key).copied().unwrap_or(0)
    }
}
