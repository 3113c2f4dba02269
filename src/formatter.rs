//! Formatter Module
//!
//! セル値を表示文字列に変換するモジュール。
//! 出力はホストのロケールに依存しません。

use std::fmt::Write as _;

use chrono::{NaiveDateTime, Timelike};

use crate::api::{DateFormat, FormulaMode};
use crate::numfmt::{serial_to_datetime, NumberFormat};
use crate::types::CellValue;

/// 有効桁数（既定の数値表記）
const SIGNIFICANT_DIGITS: usize = 15;

/// セルフォーマッター
///
/// 数式の表示モードと日付形式を保持し、セル値と数値書式から表示文字列を生成します。
#[derive(Debug, Clone, Default)]
pub(crate) struct CellFormatter {
    formula_mode: FormulaMode,
    date_format: DateFormat,
}

impl CellFormatter {
    /// 新しいCellFormatterインスタンスを生成
    pub fn new(formula_mode: FormulaMode, date_format: DateFormat) -> Self {
        Self {
            formula_mode,
            date_format,
        }
    }

    /// セル値をフォーマット
    ///
    /// # 引数
    ///
    /// * `value` - セル値
    /// * `format` - セルのスタイルに設定された解析済み数値書式
    ///
    /// # 戻り値
    ///
    /// 表示文字列（エスケープ前）
    pub fn format_value(&self, value: &CellValue, format: Option<&NumberFormat>) -> String {
        match value {
            CellValue::Empty => String::new(),
            CellValue::Text(text) => format
                .and_then(|f| f.format_text(text))
                .unwrap_or_else(|| text.clone()),
            CellValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Number(n) => self.format_number(*n, format),
            CellValue::Date(dt) => self.format_date(dt, format),
            CellValue::Formula { text, cached } => match (self.formula_mode, cached) {
                (FormulaMode::CachedValue, Some(result)) => self.format_value(result, format),
                _ => text.clone(),
            },
        }
    }

    fn format_number(&self, value: f64, format: Option<&NumberFormat>) -> String {
        let Some(format) = format else {
            return default_number(value);
        };

        // 日付書式を持つ数値はシリアル値として扱う
        if format.is_datetime() {
            if let DateFormat::Custom(pattern) = &self.date_format {
                if let Some(dt) = serial_to_datetime(value) {
                    return custom_datetime(&dt, pattern);
                }
            }
        }
        format.format_number(value, default_number)
    }

    fn format_date(&self, datetime: &NaiveDateTime, format: Option<&NumberFormat>) -> String {
        match &self.date_format {
            DateFormat::Custom(pattern) => custom_datetime(datetime, pattern),
            DateFormat::Iso8601 => format
                .and_then(|f| f.format_datetime(datetime))
                .unwrap_or_else(|| iso_datetime(datetime)),
        }
    }
}

/// ISO 8601形式（時刻部分が0時ちょうどの場合は日付のみ）
fn iso_datetime(datetime: &NaiveDateTime) -> String {
    if datetime.num_seconds_from_midnight() == 0 {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// chrono互換フォーマット文字列で書式化
///
/// 不正なフォーマット指定子を含む場合はISO 8601形式にフォールバックします。
fn custom_datetime(datetime: &NaiveDateTime, pattern: &str) -> String {
    let mut out = String::new();
    match write!(out, "{}", datetime.format(pattern)) {
        Ok(()) => out,
        Err(_) => iso_datetime(datetime),
    }
}

/// 既定の数値表記
///
/// 整数は小数部なしで、それ以外は有効15桁に丸めて表示します。
/// 非常に大きい値・小さい値は指数表記になります。
pub(crate) fn default_number(value: f64) -> String {
    if !value.is_finite() {
        return "#NUM!".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }

    let rounded: f64 = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value)
        .parse()
        .unwrap_or(value);
    let magnitude = rounded.abs();
    if magnitude >= 1e15 || magnitude < 1e-9 {
        format!("{:e}", rounded)
    } else {
        format!("{}", rounded)
    }
}
