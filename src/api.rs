//! Public API Types
//!
//! 公開APIで使用する設定用の列挙型を定義するモジュール。

use serde::{Deserialize, Serialize};

/// スタイルの出力モード
///
/// 解決済みスタイルをHTMLにどう埋め込むかを指定します。
/// どちらのモードでも見た目は同じになります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum StyleMode {
    /// 各セルの`style`属性に宣言を直接書き込む（デフォルト）
    ///
    /// # 出力例
    ///
    /// ```html
    /// <td style="border: 1px solid #ddd; padding: 8px; font-weight: bold">Q1</td>
    /// ```
    #[default]
    Inline,

    /// 重複を除いたクラス表をスタイルシートとして一度だけ出力し、
    /// セルはクラス名のみを参照する
    ///
    /// クラス名はスタイル内容のハッシュから決定的に生成されるため、
    /// 同じ入力からは常に同じクラス名が得られます。
    ///
    /// # 出力例
    ///
    /// ```html
    /// <td class="s-bold-3fa2c1d0">Q1</td>
    /// ```
    Class,
}

/// 日付の出力形式
///
/// 日付セル、および日付書式を持つ数値セルの出力形式を指定します。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DateFormat {
    /// ISO 8601形式（YYYY-MM-DD、時刻部分がある場合は`YYYY-MM-DD HH:MM:SS`）
    ///
    /// 例: `2025-11-20`
    #[default]
    Iso8601,

    /// カスタム形式（chrono互換フォーマット文字列）
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use sheetglaze::{ConverterBuilder, DateFormat};
    ///
    /// # fn main() -> Result<(), sheetglaze::SheetGlazeError> {
    /// let converter = ConverterBuilder::new()
    ///     .with_date_format(DateFormat::Custom("%Y年%m月%d日".to_string()))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    Custom(String),
}

/// 数式セルの出力モード
///
/// 数式の再計算は行いません。アダプターが記録したキャッシュ値か、
/// 数式文字列のどちらを表示するかだけを選びます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum FormulaMode {
    /// キャッシュされた結果値を出力（デフォルト）
    ///
    /// キャッシュ値がない場合は数式文字列を出力します。
    /// 例: `=SUM(A1:A10)` → `100`
    #[default]
    CachedValue,

    /// 数式文字列を出力
    ///
    /// 例: `=SUM(A1:A10)` → `=SUM(A1:A10)`
    Formula,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(StyleMode::default(), StyleMode::Inline);
        assert_eq!(DateFormat::default(), DateFormat::Iso8601);
        assert_eq!(FormulaMode::default(), FormulaMode::CachedValue);
    }

    #[test]
    fn test_deserialize_snake_case() {
        let mode: StyleMode = serde_json::from_str("\"class\"").unwrap();
        assert_eq!(mode, StyleMode::Class);

        let mode: FormulaMode = serde_json::from_str("\"formula\"").unwrap();
        assert_eq!(mode, FormulaMode::Formula);

        let format: DateFormat = serde_json::from_str("{\"custom\":\"%d/%m/%Y\"}").unwrap();
        assert_eq!(format, DateFormat::Custom("%d/%m/%Y".to_string()));
    }
}
