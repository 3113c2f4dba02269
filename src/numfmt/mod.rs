//! Number Format Module
//!
//! Excel数値書式文字列の解析と適用を提供します。
//!
//! 出力はホストのロケールに依存しません（小数点は`.`、桁区切りは`,`、
//! 月名・曜日名は英語）。色指定・条件・ロケール指定（角括弧）は読み捨てます。

mod section;
mod tokens;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use section::FormatSection;

/// 解析済みの数値書式
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NumberFormat {
    sections: Vec<FormatSection>,
    /// 4番目のセクション（文字列用）
    text: Option<FormatSection>,
}

impl NumberFormat {
    /// 書式文字列を解析する
    ///
    /// 解析は失敗しません。解釈できない文字はリテラルとして扱われます。
    pub fn parse(source: &str) -> Self {
        let mut parts: Vec<FormatSection> = split_sections(source)
            .iter()
            .map(|s| FormatSection::parse(s))
            .collect();

        let text = if parts.len() >= 4 {
            parts.truncate(4);
            parts.pop()
        } else {
            None
        };
        if parts.is_empty() {
            parts.push(FormatSection::parse("General"));
        }
        Self {
            sections: parts,
            text,
        }
    }

    /// `General`（既定表記）のみの書式かどうか
    pub fn is_general(&self) -> bool {
        self.sections.len() == 1
            && self.sections[0].is_general()
            && !self.sections[0].has_digits()
    }

    /// 日付・時刻書式かどうか（先頭セクションで判定）
    pub fn is_datetime(&self) -> bool {
        self.sections.first().is_some_and(FormatSection::is_datetime)
    }

    /// 数値を書式化する
    ///
    /// # 引数
    ///
    /// * `value` - 数値
    /// * `general` - `General`トークンに使う既定表記（絶対値を受け取る）
    pub fn format_number(&self, value: f64, general: impl Fn(f64) -> String) -> String {
        if !value.is_finite() {
            return general(value);
        }

        let (section, signed) = self.select_section(value);

        if section.is_datetime() {
            return match serial_to_datetime(value) {
                Some(dt) => section.format_datetime(&dt),
                None => general(value),
            };
        }

        let magnitude = value.abs();
        let body = section.format_magnitude(magnitude, &general(magnitude));
        if signed && value < 0.0 && body.chars().any(|c| matches!(c, '1'..='9')) {
            format!("-{}", body)
        } else {
            body
        }
    }

    /// 日付・時刻を書式化する
    ///
    /// 先頭セクションが日付・時刻書式でない場合は`None`を返します。
    pub fn format_datetime(&self, datetime: &NaiveDateTime) -> Option<String> {
        let section = self.sections.first()?;
        section
            .is_datetime()
            .then(|| section.format_datetime(datetime))
    }

    /// 文字列を書式化する
    ///
    /// 文字列用セクション（4番目）か、`@`を含む単一セクションがある場合のみ適用します。
    pub fn format_text(&self, text: &str) -> Option<String> {
        if let Some(section) = &self.text {
            return Some(section.format_text(text));
        }
        match self.sections.as_slice() {
            [only] if only.has_text_placeholder() => Some(only.format_text(text)),
            _ => None,
        }
    }

    /// 値に対応するセクションと、符号を付けるべきかを返す
    ///
    /// 負数用セクションが明示されている場合、符号はそのセクションの
    /// リテラル（括弧など）に任せます。
    fn select_section(&self, value: f64) -> (&FormatSection, bool) {
        match self.sections.as_slice() {
            [only] => (only, true),
            [positive, negative] => {
                if value < 0.0 {
                    (negative, false)
                } else {
                    (positive, true)
                }
            }
            [positive, negative, zero, ..] => {
                if value > 0.0 {
                    (positive, true)
                } else if value < 0.0 {
                    (negative, false)
                } else {
                    (zero, true)
                }
            }
            [] => unreachable_default(),
        }
    }
}

/// セクションが空になることはないが、念のため`General`を返す
fn unreachable_default() -> (&'static FormatSection, bool) {
    static GENERAL: std::sync::OnceLock<FormatSection> = std::sync::OnceLock::new();
    (GENERAL.get_or_init(|| FormatSection::parse("General")), true)
}

/// 引用符・角括弧・エスケープの外にある`;`でセクションに分割
fn split_sections(source: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_brackets = false;
    let mut escaped = false;

    for ch in source.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' if !in_quotes => {
                escaped = true;
                current.push(ch);
            }
            '"' if !in_brackets => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            '[' if !in_quotes => {
                in_brackets = true;
                current.push(ch);
            }
            ']' if !in_quotes => {
                in_brackets = false;
                current.push(ch);
            }
            ';' if !in_quotes && !in_brackets => {
                sections.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() || !sections.is_empty() {
        sections.push(current);
    }
    sections
}

/// Excelのシリアル値（1900年システム）を日時に変換
///
/// 1899-12-30を起点とします。1900年3月1日以降の日付はExcelと一致します。
/// 秒未満は四捨五入します。
pub(crate) fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > 2_958_465.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let total_seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::seconds(total_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn general(value: f64) -> String {
        value.to_string()
    }

    fn fmt(source: &str, value: f64) -> String {
        NumberFormat::parse(source).format_number(value, general)
    }

    #[test]
    fn test_single_section_negative_keeps_sign() {
        assert_eq!(fmt("#,##0.00", -1234.5), "-1,234.50");
        assert_eq!(fmt("0%", -0.25), "-25%");
        assert_eq!(fmt("0", -0.2), "0");
    }

    #[test]
    fn test_negative_section_controls_sign() {
        assert_eq!(fmt("#,##0;(#,##0)", -1500.0), "(1,500)");
        assert_eq!(fmt("#,##0;(#,##0)", 1500.0), "1,500");
        assert_eq!(fmt("0.0;-0.0;\"zero\"", 0.0), "zero");
        assert_eq!(fmt("0.0;-0.0;\"zero\"", -2.0), "-2.0");
    }

    #[test]
    fn test_general() {
        let format = NumberFormat::parse("General");
        assert!(format.is_general());
        assert_eq!(format.format_number(3.5, general), "3.5");
        assert_eq!(format.format_number(-3.5, general), "-3.5");
        assert!(NumberFormat::parse("").is_general());
    }

    #[test]
    fn test_datetime_from_serial() {
        let format = NumberFormat::parse("yyyy-mm-dd");
        assert!(format.is_datetime());
        assert_eq!(format.format_number(45292.0, general), "2024-01-01");
        assert_eq!(
            NumberFormat::parse("yyyy-mm-dd hh:mm").format_number(45292.75, general),
            "2024-01-01 18:00"
        );
    }

    #[test]
    fn test_text_sections() {
        let format = NumberFormat::parse("0;-0;0;\"<\"@\">\"");
        assert_eq!(format.format_text("x").as_deref(), Some("<x>"));
        assert_eq!(NumberFormat::parse("@\" units\"").format_text("5").as_deref(), Some("5 units"));
        assert_eq!(NumberFormat::parse("0.00").format_text("abc"), None);
    }

    #[test]
    fn test_split_sections_respects_quotes() {
        assert_eq!(split_sections("0;\"a;b\"0"), vec!["0", "\"a;b\"0"]);
        assert_eq!(split_sections("[<0]0;0"), vec!["[<0]0", "0"]);
        assert_eq!(split_sections("0\\;0"), vec!["0\\;0"]);
    }

    #[test]
    fn test_serial_to_datetime() {
        let dt = serial_to_datetime(45292.5).unwrap();
        assert_eq!(dt.to_string(), "2024-01-01 12:00:00");
        assert!(serial_to_datetime(-1.0).is_none());
        assert!(serial_to_datetime(f64::NAN).is_none());
    }
}
