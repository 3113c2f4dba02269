//! HTML Renderer
//!
//! シートを行優先で走査し、`<table>`とチャートの`<figure>`を生成する。

use std::collections::BTreeMap;

use log::{debug, warn};

use super::{escape_html, merge_stylesheets, RenderedDocument, RenderedSheet, Warning, WarningKind};
use crate::api::StyleMode;
use crate::chart::{ChartSpec, ChartStyle};
use crate::conditional::SheetStats;
use crate::error::SheetGlazeError;
use crate::formatter::CellFormatter;
use crate::resolve::{CellRole, ClassRegistry, StyleResolver, SHEET_CLASS};
use crate::security::validate_link_target;
use crate::sheet::{MergeLookup, Sheet};
use crate::types::CellCoord;

/// コメント付きセルの右上に赤い三角を描く（スクリプトなし）
const COMMENT_CSS: &str = "\
.sg-sheet .has-comment { position: relative }
.sg-sheet .has-comment::after { content: \"\"; position: absolute; top: 0; right: 0; border-style: solid; border-width: 0 6px 6px 0; border-color: transparent #d32f2f transparent transparent }
";

const CHART_CSS: &str = "\
.sg-chart-figure { margin: 16px 0 }
.sg-chart-error { padding: 12px; border: 1px dashed #c62828; color: #c62828 }
";

/// 出力内容の切り替え
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RenderOptions {
    pub include_comments: bool,
    pub include_hyperlinks: bool,
    /// チャートの既定設定（`None`はチャートを出力しない）
    pub charts: Option<ChartStyle>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_comments: true,
            include_hyperlinks: true,
            charts: Some(ChartStyle::default()),
        }
    }
}

/// HTMLレンダラー
///
/// 参照のみを保持する読み取り専用の構造体で、複数シートを並列に出力できます。
#[derive(Debug, Clone, Copy)]
pub(crate) struct HtmlRenderer<'a> {
    resolver: StyleResolver<'a>,
    formatter: &'a CellFormatter,
    options: &'a RenderOptions,
}

impl<'a> HtmlRenderer<'a> {
    pub fn new(
        resolver: StyleResolver<'a>,
        formatter: &'a CellFormatter,
        options: &'a RenderOptions,
    ) -> Self {
        Self {
            resolver,
            formatter,
            options,
        }
    }

    /// 1シートを`<table>`に変換する
    ///
    /// # 戻り値
    ///
    /// * `Ok(RenderedSheet)` - 表、クラス規則、警告
    /// * `Err(SheetGlazeError)` - `Render`（スタイルIDが解決済みテーブルにない）
    ///
    /// `ChartData`・`ChartLayout`はエラーにせず、プレースホルダーと警告に置き換えます。
    pub fn render_sheet(&self, sheet: &Sheet) -> Result<RenderedSheet, SheetGlazeError> {
        let extent = sheet.used_extent();
        debug!(
            "Rendering sheet '{}' ({} rows x {} cols, {} charts)",
            sheet.name(),
            extent.rows,
            extent.cols,
            sheet.charts().len()
        );

        let (anchored, adjacent) = self.place_charts(sheet);
        let mut writer = SheetWriter {
            renderer: *self,
            sheet,
            stats: self
                .resolver
                .collect_stats(sheet.cells().map(|(_, cell)| &cell.value)),
            registry: ClassRegistry::new(),
            warnings: Vec::new(),
            anchored,
            html: String::new(),
        };

        writer.table()?;
        if self.options.include_comments {
            writer.dropped_comments();
        }
        for chart in adjacent {
            let figure = writer.chart_figure(chart)?;
            writer.html.push_str(&figure);
        }

        debug!(
            "Rendered sheet '{}': {} classes, {} warnings",
            sheet.name(),
            writer.registry.len(),
            writer.warnings.len()
        );
        Ok(RenderedSheet {
            name: sheet.name().to_string(),
            stylesheet: writer.registry.css_rules(),
            html: writer.html,
            warnings: writer.warnings,
        })
    }

    /// チャートをセル内（アンカー）と表の後ろに振り分ける
    ///
    /// アンカーが出力範囲外、または結合で隠れるセルの場合は表の後ろに置きます。
    #[allow(clippy::type_complexity)]
    fn place_charts<'s>(
        &self,
        sheet: &'s Sheet,
    ) -> (BTreeMap<CellCoord, Vec<&'s ChartSpec>>, Vec<&'s ChartSpec>) {
        let mut anchored: BTreeMap<CellCoord, Vec<&ChartSpec>> = BTreeMap::new();
        let mut adjacent = Vec::new();
        if self.options.charts.is_none() {
            return (anchored, adjacent);
        }

        let extent = sheet.used_extent();
        for chart in sheet.charts() {
            match chart.anchor {
                Some(at)
                    if at.row < extent.rows
                        && at.col < extent.cols
                        && !matches!(sheet.merge_at(at), MergeLookup::Covered(_)) =>
                {
                    anchored.entry(at).or_default().push(chart)
                }
                _ => adjacent.push(chart),
            }
        }
        (anchored, adjacent)
    }

    /// シートの出力をまとめてドキュメントにする
    ///
    /// # 引数
    ///
    /// * `sheets` - シートごとの出力（宣言順）
    /// * `table_only` - `true`なら表の断片のみを連結する
    pub fn assemble(&self, sheets: Vec<RenderedSheet>, table_only: bool) -> RenderedDocument {
        let classes = merge_stylesheets(sheets.iter().map(|s| s.stylesheet.as_str()));

        if table_only {
            let html = sheets
                .iter()
                .map(|s| s.html.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            let stylesheet = match self.resolver.mode() {
                StyleMode::Class => format!("{}{}", self.resolver.theme_rules(), classes),
                _ => String::new(),
            };
            return RenderedDocument {
                html,
                stylesheet,
                sheets,
            };
        }

        let title = sheets
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let mut css = self.resolver.body_rule();
        css.push_str(&self.resolver.theme_rules());
        if self.options.include_comments {
            css.push_str(COMMENT_CSS);
        }
        if self.options.charts.is_some() {
            css.push_str(CHART_CSS);
        }
        css.push_str(&classes);

        let mut html = String::with_capacity(css.len() + sheets.iter().map(|s| s.html.len()).sum::<usize>() + 512);
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        html.push_str(&format!("<title>{}</title>\n", escape_html(&title)));
        html.push_str(&format!("<style>\n{}</style>\n</head>\n<body>\n", css));
        for sheet in &sheets {
            let name = escape_html(&sheet.name);
            html.push_str(&format!(
                "<section class=\"sg-sheet-section\" data-sheet=\"{}\">\n<h2>{}</h2>\n{}\n</section>\n",
                name, name, sheet.html
            ));
        }
        html.push_str("</body>\n</html>\n");

        RenderedDocument {
            html,
            stylesheet: String::new(),
            sheets,
        }
    }
}

/// 1シート分の出力状態
struct SheetWriter<'r, 's> {
    renderer: HtmlRenderer<'r>,
    sheet: &'s Sheet,
    stats: SheetStats,
    registry: ClassRegistry,
    warnings: Vec<Warning>,
    anchored: BTreeMap<CellCoord, Vec<&'s ChartSpec>>,
    html: String,
}

impl SheetWriter<'_, '_> {
    fn table(&mut self) -> Result<(), SheetGlazeError> {
        let renderer = self.renderer;
        let extent = self.sheet.used_extent();

        self.html.push_str(&format!("<table class=\"{}\"", SHEET_CLASS));
        if renderer.resolver.mode() == StyleMode::Inline {
            let decls = renderer.resolver.table_declarations();
            if !decls.is_empty() {
                self.html
                    .push_str(&format!(" style=\"{}\"", escape_html(&decls.to_css())));
            }
        }
        self.html.push('>');

        for row in 0..extent.rows {
            self.html.push_str("<tr>");
            for col in 0..extent.cols {
                let at = CellCoord::new(row, col);
                let span = match self.sheet.merge_at(at) {
                    MergeLookup::Covered(_) => continue,
                    MergeLookup::Owner(merge) => Some((merge.row_span(), merge.col_span())),
                    MergeLookup::Unmerged => None,
                };
                self.cell(at, span)?;
            }
            self.html.push_str("</tr>");
        }
        self.html.push_str("</table>");
        Ok(())
    }

    fn cell(&mut self, at: CellCoord, span: Option<(u32, u32)>) -> Result<(), SheetGlazeError> {
        let renderer = self.renderer;
        let sheet = self.sheet;
        let Some(value) = sheet.value_at(at) else {
            return Ok(());
        };

        let style_id = sheet.style_at(at);
        let role = if at.row == 0 {
            CellRole::Header
        } else {
            CellRole::Body
        };
        let cell_style = renderer
            .resolver
            .resolve_cell(style_id, value, role, &self.stats, &mut self.registry)
            .ok_or_else(|| SheetGlazeError::Render {
                sheet: sheet.name().to_string(),
                cell: at.to_a1_notation(),
                message: format!("style id {} is missing from the resolved style table", style_id),
            })?;
        let text = renderer
            .formatter
            .format_value(value, renderer.resolver.number_format(style_id));

        let tag = match role {
            CellRole::Header => "th",
            CellRole::Body => "td",
        };
        let comment = if renderer.options.include_comments {
            sheet.comment_at(at)
        } else {
            None
        };

        let mut classes = Vec::new();
        if let Some(class) = &cell_style.class {
            classes.push(class.as_str());
        }
        if comment.is_some() {
            classes.push("has-comment");
        }

        let mut open = format!("<{}", tag);
        if let Some((rows, cols)) = span {
            if rows > 1 {
                open.push_str(&format!(" rowspan=\"{}\"", rows));
            }
            if cols > 1 {
                open.push_str(&format!(" colspan=\"{}\"", cols));
            }
        }
        if !classes.is_empty() {
            open.push_str(&format!(" class=\"{}\"", escape_html(&classes.join(" "))));
        }
        if let Some(inline) = &cell_style.inline {
            open.push_str(&format!(" style=\"{}\"", escape_html(inline)));
        }
        if let Some(comment) = comment {
            open.push_str(&format!(" title=\"{}\"", escape_html(&comment.text)));
            if let Some(author) = comment.author.as_deref().filter(|a| !a.is_empty()) {
                open.push_str(&format!(" data-comment-author=\"{}\"", escape_html(author)));
            }
        }
        open.push('>');

        let content = self.content(at, &text);
        self.html.push_str(&open);
        self.html.push_str(&content);
        if let Some(charts) = self.anchored.remove(&at) {
            for chart in charts {
                let figure = self.chart_figure(chart)?;
                self.html.push_str(&figure);
            }
        }
        self.html.push_str(&format!("</{}>", tag));
        Ok(())
    }

    /// セル本文（リンクは出力時点で再検証する）
    fn content(&mut self, at: CellCoord, text: &str) -> String {
        let link = if self.renderer.options.include_hyperlinks {
            self.sheet.hyperlink_at(at)
        } else {
            None
        };
        let Some(link) = link else {
            return escape_html(text).into_owned();
        };

        match validate_link_target(&link.target) {
            Ok(href) => {
                let display = link
                    .display
                    .as_deref()
                    .filter(|d| !d.is_empty())
                    .or_else(|| Some(text).filter(|t| !t.is_empty()))
                    .unwrap_or(href.as_str());
                format!(
                    "<a href=\"{}\" rel=\"noopener noreferrer\" target=\"_blank\">{}</a>",
                    escape_html(&href),
                    escape_html(display)
                )
            }
            Err(reason) => {
                self.warn(at.to_a1_notation(), WarningKind::DroppedHyperlink, reason);
                let kept = if text.is_empty() {
                    link.display.as_deref().unwrap_or("")
                } else {
                    text
                };
                escape_html(kept).into_owned()
            }
        }
    }

    /// 出力されたセルに付かなかったコメントを警告として記録する
    fn dropped_comments(&mut self) {
        let sheet = self.sheet;
        let extent = sheet.used_extent();
        for (at, _) in sheet.comments() {
            let reason = if at.row >= extent.rows || at.col >= extent.cols {
                "comment is attached to an empty cell outside the rendered table"
            } else if matches!(sheet.merge_at(at), MergeLookup::Covered(_)) {
                "comment is attached to a cell hidden by a merged range"
            } else {
                continue;
            };
            self.warn(at.to_a1_notation(), WarningKind::DroppedComment, reason.to_string());
        }
    }

    fn chart_figure(&mut self, chart: &ChartSpec) -> Result<String, SheetGlazeError> {
        let renderer = self.renderer;
        let Some(style) = &renderer.options.charts else {
            return Ok(String::new());
        };

        match chart.to_svg(style) {
            Ok(svg) => Ok(format!(
                "<figure class=\"sg-chart-figure\" data-chart-kind=\"{}\">{}</figure>",
                chart.kind, svg
            )),
            Err(err) if err.is_chart_recoverable() => {
                let label = chart.label();
                self.warn(label.clone(), WarningKind::ChartPlaceholder, err.to_string());
                Ok(format!(
                    "<figure class=\"sg-chart-figure sg-chart-error\" data-chart-kind=\"{}\"><figcaption>Chart unavailable: {}</figcaption></figure>",
                    chart.kind,
                    escape_html(&label)
                ))
            }
            Err(err) => Err(err),
        }
    }

    fn warn(&mut self, location: String, kind: WarningKind, message: String) {
        warn!("sheet '{}', {}: {}", self.sheet.name(), location, message);
        self.warnings.push(Warning {
            sheet: self.sheet.name().to_string(),
            location,
            kind,
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartKind, Series};
    use crate::resolve::ResolvedStyles;
    use crate::sheet::SheetBuilder;
    use crate::style::{Style, StyleId, StyleTable};
    use crate::theme::Theme;
    use crate::types::{CellValue, Comment, Hyperlink};

    fn render_with(
        sheet: &Sheet,
        styles: &StyleTable,
        mode: StyleMode,
        options: &RenderOptions,
    ) -> Result<RenderedSheet, SheetGlazeError> {
        let theme = Theme::default();
        let resolved = ResolvedStyles::resolve(styles);
        let resolver = StyleResolver::new(&theme, mode, &resolved, &[]);
        let formatter = CellFormatter::default();
        HtmlRenderer::new(resolver, &formatter, options).render_sheet(sheet)
    }

    fn render(sheet: &Sheet) -> RenderedSheet {
        render_with(sheet, &StyleTable::new(), StyleMode::Inline, &RenderOptions::default()).unwrap()
    }

    #[test]
    fn test_quarterly_sales_table() {
        let sheet = SheetBuilder::new("Sales")
            .with_row(0, ["Q", "Sales"])
            .with_row(1, [CellValue::from("Q1"), CellValue::from(100)])
            .with_row(2, [CellValue::from("Q2"), CellValue::from(150)])
            .build()
            .unwrap();
        let out = render(&sheet);

        assert_eq!(out.html.matches("<tr>").count(), 3);
        assert_eq!(out.html.matches("<th").count(), 2);
        assert_eq!(out.html.matches("<td").count(), 4);
        assert!(out.html.contains(
            "<th style=\"border: 1px solid #ddd; padding: 8px; text-align: left; background-color: #f8f9fa; font-weight: bold; color: #333\">Q</th>"
        ));
        assert!(out.html.contains(">150</td>"));
        assert!(!out.html.contains("rowspan"));
        assert!(out.warnings.is_empty());
        assert!(out.stylesheet.is_empty());
    }

    #[test]
    fn test_merge_owner_spans_and_covered_cells_vanish() {
        let sheet = SheetBuilder::new("S")
            .with_text(0, 0, "owner")
            .with_text(1, 1, "hidden")
            .with_merge((0, 0), (1, 1))
            .build()
            .unwrap();
        let out = render(&sheet);

        assert_eq!(out.html.matches("rowspan=\"2\" colspan=\"2\"").count(), 1);
        assert_eq!(out.html.matches("<th").count() + out.html.matches("<td").count(), 1);
        assert!(!out.html.contains("hidden"));
    }

    #[test]
    fn test_single_axis_merge_omits_unit_span() {
        let sheet = SheetBuilder::new("S")
            .with_text(0, 0, "wide")
            .with_merge((0, 0), (0, 2))
            .build()
            .unwrap();
        let out = render(&sheet);
        assert!(out.html.contains("<th colspan=\"3\""));
        assert!(!out.html.contains("rowspan"));
    }

    #[test]
    fn test_links_are_revalidated() {
        let sheet = SheetBuilder::new("Links")
            .with_text(0, 0, "safe")
            .with_text(0, 1, "evil")
            .with_hyperlink(0, 0, Hyperlink::new("https://example.com", None))
            .with_hyperlink(0, 1, Hyperlink::new("javascript:alert(1)", None))
            .build()
            .unwrap();
        let out = render(&sheet);

        assert!(out.html.contains(
            "<a href=\"https://example.com/\" rel=\"noopener noreferrer\" target=\"_blank\">safe</a>"
        ));
        assert!(!out.html.contains("javascript"));
        assert!(out.html.contains(">evil</th>"));
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].kind, WarningKind::DroppedHyperlink);
        assert_eq!(out.warnings[0].location, "B1");
    }

    #[test]
    fn test_link_display_override() {
        let sheet = SheetBuilder::new("Links")
            .with_hyperlink(1, 0, Hyperlink::new("mailto:a@example.com", Some("Mail <us>".to_string())))
            .build()
            .unwrap();
        let out = render(&sheet);
        assert!(out.html.contains(">Mail &lt;us&gt;</a>"));
    }

    #[test]
    fn test_hyperlinks_disabled() {
        let sheet = SheetBuilder::new("Links")
            .with_text(0, 0, "site")
            .with_hyperlink(0, 0, Hyperlink::new("https://example.com", None))
            .build()
            .unwrap();
        let options = RenderOptions {
            include_hyperlinks: false,
            ..Default::default()
        };
        let out = render_with(&sheet, &StyleTable::new(), StyleMode::Inline, &options).unwrap();
        assert!(!out.html.contains("<a "));
        assert!(out.html.contains(">site</th>"));
    }

    #[test]
    fn test_comment_goes_to_attributes() {
        let sheet = SheetBuilder::new("Notes")
            .with_text(0, 0, "value")
            .with_comment(
                0,
                0,
                Comment::new(Some("Ann".to_string()), "\"quoted\" <b>note</b>"),
            )
            .build()
            .unwrap();
        let out = render(&sheet);
        assert!(out.html.contains("class=\"has-comment\""));
        assert!(out
            .html
            .contains("title=\"&quot;quoted&quot; &lt;b&gt;note&lt;/b&gt;\""));
        assert!(out.html.contains("data-comment-author=\"Ann\""));
        assert!(out.html.contains(">value</th>"));

        let options = RenderOptions {
            include_comments: false,
            ..Default::default()
        };
        let hidden = render_with(&sheet, &StyleTable::new(), StyleMode::Inline, &options).unwrap();
        assert!(!hidden.html.contains("title="));
    }

    #[test]
    fn test_comments_on_unrendered_cells_are_reported() {
        let sheet = SheetBuilder::new("Notes")
            .with_text(0, 0, "merged")
            .with_merge((0, 0), (0, 1))
            .with_comment(0, 1, Comment::new(None, "hidden"))
            .with_comment(5, 5, Comment::new(None, "trailing"))
            .with_comment(0, 0, Comment::new(None, "shown"))
            .build()
            .unwrap();
        let out = render(&sheet);
        assert_eq!(out.html.matches("has-comment").count(), 1);
        assert!(!out.html.contains("trailing"));

        let dropped: Vec<_> = out
            .warnings
            .iter()
            .map(|w| (w.location.as_str(), w.kind))
            .collect();
        assert_eq!(
            dropped,
            vec![
                ("B1", WarningKind::DroppedComment),
                ("F6", WarningKind::DroppedComment)
            ]
        );

        let options = RenderOptions {
            include_comments: false,
            ..Default::default()
        };
        let hidden = render_with(&sheet, &StyleTable::new(), StyleMode::Inline, &options).unwrap();
        assert!(hidden.warnings.is_empty());
    }

    #[test]
    fn test_class_mode_shares_classes() {
        let mut styles = StyleTable::new();
        let bold = styles.intern(Style::default().bold());
        let sheet = SheetBuilder::new("S")
            .with_cell(0, 0, "a", bold)
            .with_cell(1, 0, "b", bold)
            .with_text(1, 1, "plain")
            .build()
            .unwrap();
        let out = render_with(&sheet, &styles, StyleMode::Class, &RenderOptions::default()).unwrap();

        assert!(!out.html.contains("style="));
        assert_eq!(out.html.matches("class=\"s-bold-").count(), 2);
        assert_eq!(out.stylesheet.lines().count(), 1);
        assert!(out.stylesheet.starts_with(".sg-sheet .s-bold-"));
        assert!(out.html.contains("<td>plain</td>"));
    }

    #[test]
    fn test_missing_style_is_render_error() {
        let sheet = SheetBuilder::new("S")
            .with_cell(2, 1, "x", StyleId(9))
            .build()
            .unwrap();
        let err = render_with(&sheet, &StyleTable::new(), StyleMode::Inline, &RenderOptions::default())
            .unwrap_err();
        match err {
            SheetGlazeError::Render { sheet, cell, .. } => {
                assert_eq!(sheet, "S");
                assert_eq!(cell, "B3");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_number_format_applied() {
        let mut styles = StyleTable::new();
        let money = styles.intern(Style::default().with_number_format("#,##0.00"));
        let sheet = SheetBuilder::new("S")
            .with_text(0, 0, "Amount")
            .with_cell(1, 0, 1234.5, money)
            .build()
            .unwrap();
        let out = render_with(&sheet, &styles, StyleMode::Inline, &RenderOptions::default()).unwrap();
        assert!(out.html.contains(">1,234.50</td>"));
    }

    #[test]
    fn test_anchored_and_adjacent_charts() {
        let chart = |title: &str| {
            ChartSpec::new(ChartKind::Column, title)
                .with_series(Series::new("S", ["a", "b"], [1.0, 2.0]))
        };
        let sheet = SheetBuilder::new("Charts")
            .with_row(0, ["x", "y"])
            .with_chart(chart("Inside").with_anchor(0, 1))
            .with_chart(chart("Outside").with_anchor(50, 50))
            .with_chart(chart("Free"))
            .build()
            .unwrap();
        let out = render(&sheet);

        let table_end = out.html.find("</table>").unwrap();
        let inside = out.html.find("aria-label=\"Inside\"").unwrap();
        assert!(inside < table_end);
        assert!(out.html.find("aria-label=\"Outside\"").unwrap() > table_end);
        assert_eq!(out.html.matches("<svg").count(), 3);
    }

    #[test]
    fn test_broken_chart_becomes_placeholder() {
        let sheet = SheetBuilder::new("Charts")
            .with_text(0, 0, "x")
            .with_chart(
                ChartSpec::new(ChartKind::Line, "Broken")
                    .with_series(Series::new("S", ["a", "b", "c"], [1.0, 2.0])),
            )
            .with_chart(
                ChartSpec::new(ChartKind::Line, "Fine")
                    .with_series(Series::new("S", ["a", "b"], [1.0, 2.0])),
            )
            .build()
            .unwrap();
        let out = render(&sheet);

        assert!(out.html.contains("sg-chart-error"));
        assert!(out.html.contains("Chart unavailable: Broken"));
        assert!(out.html.contains("aria-label=\"Fine\""));
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].kind, WarningKind::ChartPlaceholder);
        assert_eq!(out.warnings[0].location, "Broken");
    }

    #[test]
    fn test_charts_disabled() {
        let sheet = SheetBuilder::new("Charts")
            .with_text(0, 0, "x")
            .with_chart(
                ChartSpec::new(ChartKind::Pie, "P").with_series(Series::new("S", ["a"], [1.0])),
            )
            .build()
            .unwrap();
        let options = RenderOptions {
            charts: None,
            ..Default::default()
        };
        let out = render_with(&sheet, &StyleTable::new(), StyleMode::Inline, &options).unwrap();
        assert!(!out.html.contains("<figure"));
    }

    #[test]
    fn test_assemble_full_document() {
        let sheet = SheetBuilder::new("A & B").with_text(0, 0, "x").build().unwrap();
        let styles = StyleTable::new();
        let theme = Theme::default();
        let resolved = ResolvedStyles::resolve(&styles);
        let resolver = StyleResolver::new(&theme, StyleMode::Inline, &resolved, &[]);
        let formatter = CellFormatter::default();
        let options = RenderOptions::default();
        let renderer = HtmlRenderer::new(resolver, &formatter, &options);

        let rendered = renderer.render_sheet(&sheet).unwrap();
        let document = renderer.assemble(vec![rendered.clone()], false);
        assert!(document.html.starts_with("<!DOCTYPE html>"));
        assert!(document.html.contains("<title>A &amp; B</title>"));
        assert!(document.html.contains("body { font-family: Arial, sans-serif"));
        assert!(document.html.contains(".has-comment::after"));
        assert!(document.html.contains(&rendered.html));

        let fragment = renderer.assemble(vec![rendered.clone()], true);
        assert_eq!(fragment.html, rendered.html);
        assert!(fragment.stylesheet.is_empty());
    }
}
