//! Format Section Module
//!
//! 数値書式の1セクション（正数・負数・ゼロ・文字列）を表し、
//! 値への適用を行います。

use chrono::{Datelike, NaiveDateTime, Timelike};

use super::tokens::{tokenize, FormatToken};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

/// 数値部分の構造
#[derive(Debug, Clone, Default, PartialEq)]
struct NumericLayout {
    /// 整数部の最小桁数（`0`の数）
    min_int_digits: usize,
    /// 小数部の最小桁数（`0`の数）
    min_frac_digits: usize,
    /// 小数部の最大桁数
    max_frac_digits: usize,
    /// 桁区切りを行うか
    grouping: bool,
    /// 末尾の`,`による1000倍スケールの回数
    scale_thousands: u32,
    /// `%`の数
    percent: u32,
    /// 指数表記
    exponent: Option<(bool, usize)>,
}

/// 書式の1セクション
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FormatSection {
    pub tokens: Vec<FormatToken>,
    layout: NumericLayout,
}

impl FormatSection {
    /// セクション文字列を解析
    pub fn parse(source: &str) -> Self {
        let tokens = tokenize(source);
        let layout = analyze(&tokens);
        Self { tokens, layout }
    }

    /// 日付・時刻書式かどうか
    pub fn is_datetime(&self) -> bool {
        self.tokens.iter().any(FormatToken::is_datetime)
    }

    /// 数字の桁を含むかどうか
    pub fn has_digits(&self) -> bool {
        self.tokens.iter().any(FormatToken::is_digit)
    }

    /// `General`を含むかどうか
    pub fn is_general(&self) -> bool {
        self.tokens.contains(&FormatToken::General)
    }

    /// `@`を含むかどうか
    pub fn has_text_placeholder(&self) -> bool {
        self.tokens.contains(&FormatToken::TextPlaceholder)
    }

    /// 数値を書式化（符号は呼び出し側で扱うため、絶対値を渡す）
    ///
    /// `general`は`General`トークンの位置に埋め込む既定表記です。
    pub fn format_magnitude(&self, magnitude: f64, general: &str) -> String {
        if !self.has_digits() {
            return self.render_literals(general, "");
        }

        let layout = &self.layout;
        let mut value = magnitude * 100f64.powi(layout.percent as i32);
        value /= 1000f64.powi(layout.scale_thousands as i32);

        let (mantissa, exponent_text) = match layout.exponent {
            Some((plus, digits)) => {
                let (m, e) = split_exponent(value, layout.min_int_digits.max(1));
                let sign = if e < 0 {
                    "-"
                } else if plus {
                    "+"
                } else {
                    ""
                };
                (m, format!("E{}{:0width$}", sign, e.abs(), width = digits))
            }
            None => (value, String::new()),
        };

        // 四捨五入は0から遠い方向（format!の偶数丸めは使わない）
        let factor = 10f64.powi(layout.max_frac_digits as i32);
        let mantissa = (mantissa * factor).round() / factor;
        let rounded = format!("{:.*}", layout.max_frac_digits, mantissa);
        let (int_raw, frac_raw) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));

        let mut int_part = int_raw.trim_start_matches('0').to_string();
        while int_part.len() < layout.min_int_digits {
            int_part.insert(0, '0');
        }
        if layout.grouping {
            int_part = group_thousands(&int_part);
        }

        let mut frac_part = frac_raw.to_string();
        while frac_part.len() > layout.min_frac_digits && frac_part.ends_with('0') {
            frac_part.pop();
        }

        let mut number = int_part;
        if !frac_part.is_empty() {
            number.push('.');
            number.push_str(&frac_part);
        }
        if number.is_empty() {
            number.push('0');
        }
        number.push_str(&exponent_text);

        self.render_literals(general, &number)
    }

    /// 桁トークンの連なりを`number`に置き換え、リテラルと`%`をそのまま出力する
    fn render_literals(&self, general: &str, number: &str) -> String {
        let mut out = String::new();
        let mut number_emitted = false;
        for token in &self.tokens {
            match token {
                t if t.is_digit() || matches!(t, FormatToken::DecimalPoint | FormatToken::Comma) => {
                    if !number_emitted {
                        out.push_str(number);
                        number_emitted = true;
                    }
                }
                FormatToken::Exponent { .. } => {}
                FormatToken::Percent => out.push('%'),
                FormatToken::General => out.push_str(general),
                FormatToken::Literal(text) => out.push_str(text),
                _ => {}
            }
        }
        out
    }

    /// 日付・時刻を書式化
    pub fn format_datetime(&self, datetime: &NaiveDateTime) -> String {
        let twelve_hour = self
            .tokens
            .iter()
            .any(|t| matches!(t, FormatToken::AmPm { .. }));
        let mut out = String::new();

        for token in &self.tokens {
            match token {
                FormatToken::Year(n) => {
                    if *n <= 2 {
                        out.push_str(&format!("{:02}", datetime.year().rem_euclid(100)));
                    } else {
                        out.push_str(&format!("{:04}", datetime.year()));
                    }
                }
                FormatToken::Month(n) => {
                    let month = datetime.month();
                    let name = MONTH_NAMES[month0(month)];
                    match n {
                        1 => out.push_str(&month.to_string()),
                        2 => out.push_str(&format!("{:02}", month)),
                        3 => out.push_str(&name[..3]),
                        4 => out.push_str(name),
                        _ => out.push_str(&name[..1]),
                    }
                }
                FormatToken::Day(n) => {
                    let weekday = WEEKDAY_NAMES[datetime.weekday().num_days_from_monday() as usize];
                    match n {
                        1 => out.push_str(&datetime.day().to_string()),
                        2 => out.push_str(&format!("{:02}", datetime.day())),
                        3 => out.push_str(&weekday[..3]),
                        _ => out.push_str(weekday),
                    }
                }
                FormatToken::Hour(n) => {
                    let mut hour = datetime.hour();
                    if twelve_hour {
                        hour %= 12;
                        if hour == 0 {
                            hour = 12;
                        }
                    }
                    out.push_str(&pad(hour, *n));
                }
                FormatToken::Minute(n) => out.push_str(&pad(datetime.minute(), *n)),
                FormatToken::Second(n) => out.push_str(&pad(datetime.second(), *n)),
                FormatToken::AmPm { short } => {
                    let pm = datetime.hour() >= 12;
                    out.push_str(match (*short, pm) {
                        (false, false) => "AM",
                        (false, true) => "PM",
                        (true, false) => "A",
                        (true, true) => "P",
                    });
                }
                FormatToken::Literal(text) => out.push_str(text),
                _ => {}
            }
        }
        out
    }

    /// 文字列を書式化（`@`を置き換える）
    pub fn format_text(&self, text: &str) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                FormatToken::TextPlaceholder => out.push_str(text),
                FormatToken::Literal(lit) => out.push_str(lit),
                _ => {}
            }
        }
        out
    }
}

fn month0(month: u32) -> usize {
    (month.clamp(1, 12) - 1) as usize
}

fn pad(value: u32, width: usize) -> String {
    if width >= 2 {
        format!("{:02}", value)
    } else {
        value.to_string()
    }
}

/// トークン列から数値部分の構造を求める
fn analyze(tokens: &[FormatToken]) -> NumericLayout {
    let mut layout = NumericLayout::default();
    let mut after_point = false;
    let mut seen_digit = false;

    for (i, token) in tokens.iter().enumerate() {
        match token {
            FormatToken::Zero | FormatToken::Hash | FormatToken::Space => {
                seen_digit = true;
                if after_point {
                    layout.max_frac_digits += 1;
                    if *token != FormatToken::Hash {
                        layout.min_frac_digits = layout.max_frac_digits;
                    }
                } else if *token != FormatToken::Hash {
                    layout.min_int_digits += 1;
                }
            }
            FormatToken::DecimalPoint => after_point = true,
            FormatToken::Comma if seen_digit => {
                let rest = &tokens[i + 1..];
                let more_int_digits = !after_point
                    && rest
                        .iter()
                        .take_while(|t| !matches!(t, FormatToken::DecimalPoint))
                        .any(FormatToken::is_digit);
                if more_int_digits {
                    layout.grouping = true;
                } else if !after_point || !rest.iter().any(FormatToken::is_digit) {
                    layout.scale_thousands += 1;
                }
            }
            FormatToken::Percent => layout.percent += 1,
            FormatToken::Exponent { plus, digits } => layout.exponent = Some((*plus, *digits)),
            _ => {}
        }
    }
    layout
}

/// 仮数と指数に分解（仮数の整数部は`int_digits`桁）
fn split_exponent(value: f64, int_digits: usize) -> (f64, i32) {
    if value == 0.0 || !value.is_finite() {
        return (0.0, 0);
    }
    let exponent = value.abs().log10().floor() as i32 - (int_digits as i32 - 1);
    (value / 10f64.powi(exponent), exponent)
}

/// 3桁ごとに`,`を挿入
pub(crate) fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fmt(source: &str, value: f64) -> String {
        FormatSection::parse(source).format_magnitude(value, "")
    }

    #[test]
    fn test_fixed_decimals() {
        assert_eq!(fmt("0.00", 3.14159), "3.14");
        assert_eq!(fmt("0.00", 2.0), "2.00");
        assert_eq!(fmt("0", 2.5), "3");
        assert_eq!(fmt("#.##", 0.5), ".5");
        assert_eq!(fmt("0.##", 4.0), "4");
    }

    #[test]
    fn test_grouping_and_scaling() {
        assert_eq!(fmt("#,##0", 1234567.0), "1,234,567");
        assert_eq!(fmt("#,##0.00", 1234.5), "1,234.50");
        assert_eq!(fmt("#,##0", 12.0), "12");
        assert_eq!(fmt("0.0,\"K\"", 12345.0), "12.3K");
    }

    #[test]
    fn test_percent_and_literals() {
        assert_eq!(fmt("0%", 0.256), "26%");
        assert_eq!(fmt("0.0%", 0.5), "50.0%");
        assert_eq!(fmt("\"$\"#,##0.00", 1500.0), "$1,500.00");
        assert_eq!(fmt("000", 7.0), "007");
    }

    #[test]
    fn test_exponent() {
        assert_eq!(fmt("0.00E+00", 12345.0), "1.23E+04");
        assert_eq!(fmt("0.0E+00", 0.00012), "1.2E-04");
    }

    #[test]
    fn test_datetime_tokens() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 9)
            .unwrap();
        assert_eq!(FormatSection::parse("yyyy-mm-dd").format_datetime(&dt), "2024-03-05");
        assert_eq!(FormatSection::parse("d-mmm-yy").format_datetime(&dt), "5-Mar-24");
        assert_eq!(FormatSection::parse("h:mm AM/PM").format_datetime(&dt), "2:07 PM");
        assert_eq!(FormatSection::parse("hh:mm:ss").format_datetime(&dt), "14:07:09");
        assert_eq!(FormatSection::parse("dddd, mmmm d").format_datetime(&dt), "Tuesday, March 5");
    }

    #[test]
    fn test_text_section() {
        assert_eq!(FormatSection::parse("\"Item: \"@").format_text("apple"), "Item: apple");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("123456"), "123,456");
    }
}
