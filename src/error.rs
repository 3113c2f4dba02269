//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// sheetglazeクレート全体で使用するエラー型
///
/// 中間シートモデルの構築、スタイル解決、HTML出力、チャート描画の
/// 各段階で発生するエラーを統一的に扱います。すべての変種は、
/// 原因となったシート・セル・チャートを特定できる情報を保持します。
///
/// # エラーの種類
///
/// - `Validation`: 中間モデルの不変条件違反（範囲外、重複アドレス、結合の重なりなど）
/// - `Render`: HTML出力中の内部不変条件違反（スタイルIDの欠落など）
/// - `ChartData`: チャート定義のデータ不整合（このチャートのみスキップ可能）
/// - `ChartLayout`: キャンバスサイズが不正（このチャートのみ致命的）
/// - `UnsupportedChartKind`: 未知のチャート種別
/// - `Config`: 設定の検証に失敗
///
/// # 使用例
///
/// ```rust
/// use sheetglaze::{SheetBuilder, SheetGlazeError};
///
/// let result = SheetBuilder::new("Sheet1")
///     .with_text(0, 0, "a")
///     .with_text(0, 0, "b")
///     .build();
///
/// match result {
///     Err(SheetGlazeError::Validation { sheet, message }) => {
///         assert_eq!(sheet, "Sheet1");
///         assert!(message.contains("duplicate"));
///     }
///     _ => panic!("expected validation error"),
/// }
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SheetGlazeError {
    /// 中間シートモデルの検証に失敗したエラー
    ///
    /// 行・列の上限超過、アドレスの重複、結合範囲の重なり、
    /// 未登録のスタイルIDなどが検出された場合に発生します。
    /// `message`には違反した制約名が含まれます。
    #[error("Validation failed at sheet '{sheet}': {message}")]
    Validation {
        /// エラーが発生したシート名
        sheet: String,
        /// 違反した制約を含む詳細メッセージ
        message: String,
    },

    /// HTML出力中の内部不変条件違反
    ///
    /// 正しく構築されたモデルでは到達しないはずですが、
    /// 出力境界での検査として必ず報告されます。
    #[error("Render error at sheet '{sheet}', cell {cell}: {message}")]
    Render {
        /// エラーが発生したシート名
        sheet: String,
        /// エラーが発生したセルの座標（A1記法）
        cell: String,
        /// エラーの詳細メッセージ
        message: String,
    },

    /// チャートデータの不整合
    ///
    /// カテゴリ数と値の数の不一致、すべての値が非有限値、
    /// 円グラフの負値や合計ゼロなどで発生します。
    /// ドキュメント出力時は、このチャートだけがプレースホルダーに置き換わります。
    #[error("Chart data error in chart '{chart}': {message}")]
    ChartData {
        /// チャートの識別子（タイトルまたは位置）
        chart: String,
        /// エラーの詳細メッセージ
        message: String,
    },

    /// チャートのキャンバス設定が不正
    #[error("Chart layout error in chart '{chart}': {message}")]
    ChartLayout {
        /// チャートの識別子（タイトルまたは位置）
        chart: String,
        /// エラーの詳細メッセージ
        message: String,
    },

    /// サポートされていないチャート種別
    ///
    /// 別の種別へのフォールバックは行いません。
    #[error("Unsupported chart kind: {0}")]
    UnsupportedChartKind(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    ///
    /// # 例
    ///
    /// ```rust
    /// use sheetglaze::{ConverterBuilder, SheetGlazeError};
    ///
    /// let result = ConverterBuilder::new()
    ///     .with_chart_size(10, 10)
    ///     .build();
    ///
    /// assert!(matches!(result, Err(SheetGlazeError::Config(_))));
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O操作中に発生したエラー
    ///
    /// 呼び出し側が渡した`Write`への書き込み失敗時に発生します。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// シリアライズ済みドキュメントのデコードに失敗したエラー
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SheetGlazeError {
    /// シート名とメッセージから`Validation`エラーを生成
    pub(crate) fn validation(sheet: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            sheet: sheet.to_string(),
            message: message.into(),
        }
    }

    /// チャート名とメッセージから`ChartData`エラーを生成
    pub(crate) fn chart_data(chart: &str, message: impl Into<String>) -> Self {
        Self::ChartData {
            chart: chart.to_string(),
            message: message.into(),
        }
    }

    /// チャート名とメッセージから`ChartLayout`エラーを生成
    pub(crate) fn chart_layout(chart: &str, message: impl Into<String>) -> Self {
        Self::ChartLayout {
            chart: chart.to_string(),
            message: message.into(),
        }
    }

    /// チャート単位で回復可能なエラーかどうか
    ///
    /// `ChartData`と`ChartLayout`は該当チャートのみを置き換え、
    /// ドキュメントの残りの出力を継続できます。
    pub fn is_chart_recoverable(&self) -> bool {
        matches!(self, Self::ChartData { .. } | Self::ChartLayout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let error: SheetGlazeError = io_err.into();

        match error {
            SheetGlazeError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::BrokenPipe);
                assert_eq!(e.to_string(), "pipe closed");
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_validation_error_display() {
        let error = SheetGlazeError::validation("Data", "overlapping merge: A1:B2 and B2:C3");
        let msg = error.to_string();

        assert!(msg.starts_with("Validation failed"));
        assert!(msg.contains("Data"));
        assert!(msg.contains("overlapping merge"));
    }

    #[test]
    fn test_render_error_display() {
        let error = SheetGlazeError::Render {
            sheet: "Sheet1".to_string(),
            cell: "C4".to_string(),
            message: "style id 9 missing".to_string(),
        };
        let msg = error.to_string();

        assert!(msg.contains("Render error"));
        assert!(msg.contains("Sheet1"));
        assert!(msg.contains("C4"));
        assert!(msg.contains("style id 9 missing"));
    }

    #[test]
    fn test_chart_errors_are_recoverable() {
        let data = SheetGlazeError::chart_data("Sales", "3 categories but 2 values");
        let layout = SheetGlazeError::chart_layout("Sales", "width 10 below minimum 200");
        let config = SheetGlazeError::Config("bad".to_string());

        assert!(data.is_chart_recoverable());
        assert!(layout.is_chart_recoverable());
        assert!(!config.is_chart_recoverable());
        assert!(data.to_string().contains("Chart data error in chart 'Sales'"));
        assert!(layout.to_string().starts_with("Chart layout error"));
    }

    #[test]
    fn test_unsupported_chart_kind_display() {
        let error = SheetGlazeError::UnsupportedChartKind("waterfall".to_string());
        assert_eq!(error.to_string(), "Unsupported chart kind: waterfall");
    }

    #[test]
    fn test_json_error_conversion() {
        fn decode() -> Result<serde_json::Value, SheetGlazeError> {
            Ok(serde_json::from_str("{not json")?)
        }

        assert!(matches!(decode(), Err(SheetGlazeError::Json(_))));
    }
}
