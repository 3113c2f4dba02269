//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use std::io::{BufWriter, Write};

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::api::{DateFormat, FormulaMode, StyleMode};
use crate::chart::{check_size, ChartStyle, ColorScheme, Quality};
use crate::conditional::ConditionalRule;
use crate::error::SheetGlazeError;
use crate::formatter::CellFormatter;
use crate::output::{HtmlRenderer, RenderOptions, RenderedDocument, RenderedSheet};
use crate::resolve::{ResolvedStyles, StyleResolver};
use crate::security::Limits;
use crate::sheet::{Sheet, SheetDocument};
use crate::style::StyleTable;
use crate::theme::{Theme, ThemeName};

/// 変換処理の設定
///
/// すべての項目にデフォルト値があり、JSONなどから部分的に読み込めます。
///
/// # 使用例
///
/// ```rust
/// use sheetglaze::{ConversionConfig, ConverterBuilder, StyleMode};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config: ConversionConfig =
///     serde_json::from_str(r#"{ "style_mode": "class", "theme": "dark" }"#)?;
/// assert_eq!(config.style_mode, StyleMode::Class);
///
/// let converter = ConverterBuilder::from_config(config).build()?;
/// # let _ = converter;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// セルコメントを出力するか
    pub include_comments: bool,

    /// ハイパーリンクを出力するか
    pub include_hyperlinks: bool,

    /// 組み込みテーマ
    pub theme: ThemeName,

    /// カスタムテーマ（指定時は`theme`より優先）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_theme: Option<Theme>,

    /// `true`なら表の断片のみを出力する
    pub table_only: bool,

    /// スタイルの出力モード
    pub style_mode: StyleMode,

    /// チャートを出力するか
    pub charts: bool,

    /// チャートの既定設定（チャート自身の設定が優先）
    pub chart_style: ChartStyle,

    /// シートの大きさの上限
    pub limits: Limits,

    /// 数式出力モード
    pub formula_mode: FormulaMode,

    /// 日付形式
    pub date_format: DateFormat,

    /// 条件付き書式ルール（宣言順に適用）
    pub conditional_rules: Vec<ConditionalRule>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            include_comments: true,
            include_hyperlinks: true,
            theme: ThemeName::Default,
            custom_theme: None,
            table_only: false,
            style_mode: StyleMode::Inline,
            charts: true,
            chart_style: ChartStyle::default(),
            limits: Limits::default(),
            formula_mode: FormulaMode::CachedValue,
            date_format: DateFormat::Iso8601,
            conditional_rules: Vec::new(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Converter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust
/// use sheetglaze::{ConverterBuilder, StyleMode, ThemeName};
///
/// # fn main() -> Result<(), sheetglaze::SheetGlazeError> {
/// let converter = ConverterBuilder::new()
///     .with_theme(ThemeName::Minimal)
///     .with_style_mode(StyleMode::Class)
///     .table_only(true)
///     .build()?;
/// # let _ = converter;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - コメント・ハイパーリンク: 出力する
    /// - テーマ: `default`
    /// - 出力: HTML文書全体、インラインスタイル
    /// - チャート: 出力する（600×400、高品質、既定の配色）
    /// - 上限: 1,000,000行 × 16,384列
    /// - 数式モード: キャッシュ値を出力
    /// - 日付形式: ISO 8601
    pub fn new() -> Self {
        Self::default()
    }

    /// 読み込み済みの設定から始める
    pub fn from_config(config: ConversionConfig) -> Self {
        Self { config }
    }

    /// セルコメントを出力するかを指定する
    ///
    /// コメントは`title`属性と`data-comment-author`属性にのみ出力され、
    /// スクリプトは生成しません。
    pub fn include_comments(mut self, include: bool) -> Self {
        self.config.include_comments = include;
        self
    }

    /// ハイパーリンクを出力するかを指定する
    ///
    /// `false`の場合、リンク付きセルはテキストのみになります。
    pub fn include_hyperlinks(mut self, include: bool) -> Self {
        self.config.include_hyperlinks = include;
        self
    }

    /// 組み込みテーマを指定する
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use sheetglaze::{ConverterBuilder, ThemeName};
    ///
    /// let builder = ConverterBuilder::new().with_theme("print".parse::<ThemeName>().unwrap());
    /// ```
    pub fn with_theme(mut self, theme: ThemeName) -> Self {
        self.config.theme = theme;
        self.config.custom_theme = None;
        self
    }

    /// カスタムテーマを指定する
    pub fn with_custom_theme(mut self, theme: Theme) -> Self {
        self.config.custom_theme = Some(theme);
        self
    }

    /// 表の断片のみを出力するかを指定する
    ///
    /// # 引数
    ///
    /// * `table_only: bool`:
    ///   * `true`: `<table>`（とチャート）のみ。クラスモードの規則は`RenderedDocument::stylesheet`に返す
    ///   * `false`: `<!DOCTYPE html>`から始まる文書全体（デフォルト）
    pub fn table_only(mut self, table_only: bool) -> Self {
        self.config.table_only = table_only;
        self
    }

    /// スタイルの出力モードを指定する
    pub fn with_style_mode(mut self, mode: StyleMode) -> Self {
        self.config.style_mode = mode;
        self
    }

    /// チャートを出力するかを指定する
    pub fn with_charts(mut self, enabled: bool) -> Self {
        self.config.charts = enabled;
        self
    }

    /// チャートの品質（座標の小数桁と補助目盛り線）を指定する
    pub fn with_chart_quality(mut self, quality: Quality) -> Self {
        self.config.chart_style.quality = quality;
        self
    }

    /// チャートの配色を指定する
    pub fn with_color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.config.chart_style.color_scheme = scheme;
        self
    }

    /// チャートの既定サイズを指定する
    ///
    /// # 制約
    ///
    /// * 200×150以上、1200×800以下
    /// * 制約違反の場合、`build()`時に`SheetGlazeError::Config`を返す
    pub fn with_chart_size(mut self, width: u32, height: u32) -> Self {
        self.config.chart_style.width = width;
        self.config.chart_style.height = height;
        self
    }

    /// シートの大きさの上限を指定する
    ///
    /// 上限を超えるシートは切り詰めずに`Validation`エラーになります。
    pub fn with_limits(mut self, max_rows: u32, max_cols: u32) -> Self {
        self.config.limits = Limits::new(max_rows, max_cols);
        self
    }

    /// 数式セルの出力モードを指定する
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use sheetglaze::{ConverterBuilder, FormulaMode};
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_formula_mode(FormulaMode::Formula);
    /// ```
    pub fn with_formula_mode(mut self, mode: FormulaMode) -> Self {
        self.config.formula_mode = mode;
        self
    }

    /// 日付の出力形式を指定する
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.config.date_format = format;
        self
    }

    /// 条件付き書式ルールを追加する
    ///
    /// ルールは追加順に評価され、後のルールが同じプロパティを上書きします。
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use sheetglaze::{Color, ConditionalRule, ConverterBuilder};
    ///
    /// let builder = ConverterBuilder::new().with_conditional_rule(ConditionalRule::DataBar {
    ///     color: "#638ec6".parse::<Color>().unwrap(),
    /// });
    /// ```
    pub fn with_conditional_rule(mut self, rule: ConditionalRule) -> Self {
        self.config.conditional_rules.push(rule);
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `SheetGlazeError::Config(String)`: 設定の検証に失敗した場合
    ///   * 上限の行数・列数が0
    ///   * チャートの既定サイズが許容範囲外
    ///   * カスタム日付形式が空
    pub fn build(self) -> Result<Converter, SheetGlazeError> {
        let config = self.config;

        // 1. 上限
        if config.limits.max_rows == 0 || config.limits.max_cols == 0 {
            return Err(SheetGlazeError::Config(format!(
                "Invalid limits: {} rows x {} columns (both must be positive)",
                config.limits.max_rows, config.limits.max_cols
            )));
        }

        // 2. チャートの既定サイズ
        check_size(config.chart_style.width, config.chart_style.height)
            .map_err(|msg| SheetGlazeError::Config(format!("Invalid chart size: {}", msg)))?;

        // 3. カスタム日付形式
        if let DateFormat::Custom(ref format_str) = config.date_format {
            if format_str.trim().is_empty() {
                return Err(SheetGlazeError::Config(format!(
                    "Invalid date format string: '{}'",
                    format_str
                )));
            }
        }

        Ok(Converter::new(config))
    }
}

/// 変換処理のファサード
///
/// `SheetDocument`をHTMLに変換するメインエントリーポイントです。
/// 構築後は読み取り専用で、複数スレッドから共有できます。
///
/// # 使用例
///
/// ```rust
/// use sheetglaze::{ConverterBuilder, SheetBuilder, SheetDocument};
///
/// # fn main() -> Result<(), sheetglaze::SheetGlazeError> {
/// let sheet = SheetBuilder::new("Sales")
///     .with_row(0, ["Q", "Sales"])
///     .with_row(1, ["Q1", "100"])
///     .build()?;
/// let document = SheetDocument::single(sheet)?;
///
/// let converter = ConverterBuilder::new().build()?;
/// let html = converter.convert_to_string(&document)?;
/// assert!(html.starts_with("<!DOCTYPE html>"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    /// 変換設定
    config: ConversionConfig,

    /// 適用するテーマ
    theme: Theme,

    /// セルフォーマッター
    formatter: CellFormatter,

    /// 出力内容の切り替え
    options: RenderOptions,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        let theme = config
            .custom_theme
            .clone()
            .unwrap_or_else(|| config.theme.theme());
        let options = RenderOptions {
            include_comments: config.include_comments,
            include_hyperlinks: config.include_hyperlinks,
            charts: config.charts.then(|| config.chart_style.clone()),
        };
        Self {
            formatter: CellFormatter::new(config.formula_mode, config.date_format.clone()),
            theme,
            options,
            config,
        }
    }

    /// 変換設定
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    fn renderer<'a>(&'a self, resolved: &'a ResolvedStyles) -> HtmlRenderer<'a> {
        let resolver = StyleResolver::new(
            &self.theme,
            self.config.style_mode,
            resolved,
            &self.config.conditional_rules,
        );
        HtmlRenderer::new(resolver, &self.formatter, &self.options)
    }

    /// ドキュメント全体を変換する
    ///
    /// # 戻り値
    ///
    /// * `Ok(RenderedDocument)` - HTML、表のみモードのスタイルシート、シートごとの出力と警告
    /// * `Err(SheetGlazeError)` - `Validation`（上限超過）または`Render`
    ///
    /// # 処理フロー
    ///
    /// 1. すべてのシートを上限に対して検証
    /// 2. スタイルテーブルを一度だけ解決
    /// 3. 各シートを並列に出力（結果は宣言順に並べ直す）
    /// 4. ドキュメントに組み立て
    pub fn render_document(&self, document: &SheetDocument) -> Result<RenderedDocument, SheetGlazeError> {
        // 1. 上限の検証
        for sheet in document.sheets() {
            sheet.check_limits(&self.config.limits)?;
        }

        // 2. スタイル解決
        let resolved = ResolvedStyles::resolve(document.styles());
        let renderer = self.renderer(&resolved);

        // 3. 各シートの処理を並列化
        let sheet_outputs: Result<Vec<(usize, RenderedSheet)>, SheetGlazeError> = document
            .sheets()
            .par_iter()
            .enumerate()
            .map(|(sheet_idx, sheet)| Ok((sheet_idx, renderer.render_sheet(sheet)?)))
            .collect();

        let mut sheet_outputs = sheet_outputs?;

        // 結果をインデックス順にソート（並列処理の順序を保証）
        sheet_outputs.sort_by_key(|(idx, _)| *idx);

        // 4. 組み立て
        let rendered = renderer.assemble(
            sheet_outputs.into_iter().map(|(_, sheet)| sheet).collect(),
            self.config.table_only,
        );
        info!(
            "Rendered {} sheets ({} bytes, {} warnings)",
            rendered.sheets.len(),
            rendered.html.len(),
            rendered.warnings().count()
        );
        Ok(rendered)
    }

    /// 1シートのみを変換する
    ///
    /// # 引数
    ///
    /// * `sheet` - 変換対象のシート
    /// * `styles` - シートのセルが参照するスタイルテーブル
    ///
    /// # 戻り値
    ///
    /// 表の断片（文書全体の組み立ては行わない）
    pub fn render_sheet(&self, sheet: &Sheet, styles: &StyleTable) -> Result<RenderedSheet, SheetGlazeError> {
        sheet.check_limits(&self.config.limits)?;
        let resolved = ResolvedStyles::resolve(styles);
        self.renderer(&resolved).render_sheet(sheet)
    }

    /// ドキュメントを変換してライターに書き込む
    ///
    /// # 引数
    ///
    /// * `document` - 変換対象のドキュメント
    /// * `output` - HTML出力先のライター（Writeトレイトを実装）
    ///
    /// # 戻り値
    ///
    /// * `Ok(RenderedDocument)` - 書き込んだ内容（警告の確認用）
    /// * `Err(SheetGlazeError)` - 変換エラー、または書き込み時の`Io`エラー
    pub fn convert<W: Write>(
        &self,
        document: &SheetDocument,
        mut output: W,
    ) -> Result<RenderedDocument, SheetGlazeError> {
        let rendered = self.render_document(document)?;

        let mut writer = BufWriter::new(&mut output);
        writer.write_all(rendered.html.as_bytes())?;
        writer.flush()?;
        debug!("Wrote {} bytes", rendered.html.len());

        Ok(rendered)
    }

    /// ドキュメントをHTML文字列に変換
    pub fn convert_to_string(&self, document: &SheetDocument) -> Result<String, SheetGlazeError> {
        Ok(self.render_document(document)?.html)
    }
}
