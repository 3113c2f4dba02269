//! Sheet Module
//!
//! 中間シートモデル（`Sheet`、`SheetDocument`）と、その検証付きビルダーを提供するモジュール。
//!
//! モデルはアダプターによって一度だけ構築され、以降は読み取り専用です。
//! 構築時に次の不変条件を検証します:
//!
//! - 行・列が上限（`Limits`）内にある
//! - 同じアドレスのセルが二重に登録されていない
//! - 結合範囲が互いに重ならない
//! - セルが参照するスタイルIDがスタイルテーブルに存在する

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chart::ChartSpec;
use crate::error::SheetGlazeError;
use crate::security::Limits;
use crate::style::{Style, StyleId, StyleTable};
use crate::types::{CellCoord, CellValue, Comment, Hyperlink, MergeRange};

/// アドレス未登録のセルに返す空値
static EMPTY_VALUE: CellValue = CellValue::Empty;

/// セル
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// セルの値
    pub value: CellValue,
    /// スタイルテーブル内のID
    pub style: StyleId,
}

impl Cell {
    /// 新しいセルを生成
    pub fn new(value: CellValue, style: StyleId) -> Self {
        Self { value, style }
    }
}

/// 行数・列数の組
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    pub rows: u32,
    pub cols: u32,
}

impl Extent {
    fn include(&mut self, coord: CellCoord) {
        self.rows = self.rows.max(coord.row.saturating_add(1));
        self.cols = self.cols.max(coord.col.saturating_add(1));
    }

    /// 空（0行または0列）かどうか
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

/// 結合範囲の参照結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeLookup<'a> {
    /// 結合されていない
    Unmerged,
    /// 結合範囲の所有者（左上セル）
    Owner(&'a MergeRange),
    /// 結合範囲に覆われたセル（出力しない）
    Covered(&'a MergeRange),
}

/// 1枚のワークシート
///
/// フィールドは非公開で、読み取り用のアクセサーのみを提供します。
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    limits: Limits,
    cells: BTreeMap<CellCoord, Cell>,
    /// 開始座標順にソート済み
    merges: Vec<MergeRange>,
    comments: BTreeMap<CellCoord, Comment>,
    hyperlinks: BTreeMap<CellCoord, Hyperlink>,
    charts: Vec<ChartSpec>,
    used_extent: Extent,
    bounds: Extent,
}

impl Sheet {
    /// シート名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 構築時に適用した上限
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// アドレスからセルを取得（未登録なら`None`）
    pub fn cell(&self, at: CellCoord) -> Option<&Cell> {
        self.cells.get(&at)
    }

    /// アドレスからセルの値を取得
    ///
    /// 上限内で未登録のアドレスには`CellValue::Empty`を返します。
    /// 上限外のアドレスには`None`を返します。
    pub fn value_at(&self, at: CellCoord) -> Option<&CellValue> {
        if !self.limits.contains(at.row, at.col) {
            return None;
        }
        Some(
            self.cells
                .get(&at)
                .map(|cell| &cell.value)
                .unwrap_or(&EMPTY_VALUE),
        )
    }

    /// アドレスのスタイルIDを取得（未登録なら既定スタイル）
    pub fn style_at(&self, at: CellCoord) -> StyleId {
        self.cells
            .get(&at)
            .map(|cell| cell.style)
            .unwrap_or(StyleId::DEFAULT)
    }

    /// 登録済みセルを行優先順で列挙
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, &Cell)> {
        self.cells.iter().map(|(coord, cell)| (*coord, cell))
    }

    /// 結合範囲の一覧（開始座標順）
    pub fn merges(&self) -> &[MergeRange] {
        &self.merges
    }

    /// アドレスが結合範囲に含まれるかを調べる
    pub fn merge_at(&self, at: CellCoord) -> MergeLookup<'_> {
        for merge in &self.merges {
            if merge.start.row > at.row {
                break;
            }
            if merge.contains(at) {
                return if merge.start == at {
                    MergeLookup::Owner(merge)
                } else {
                    MergeLookup::Covered(merge)
                };
            }
        }
        MergeLookup::Unmerged
    }

    /// アドレスのコメントを取得
    pub fn comment_at(&self, at: CellCoord) -> Option<&Comment> {
        self.comments.get(&at)
    }

    /// アドレスのハイパーリンクを取得
    pub fn hyperlink_at(&self, at: CellCoord) -> Option<&Hyperlink> {
        self.hyperlinks.get(&at)
    }

    /// コメントを行優先順で列挙
    pub fn comments(&self) -> impl Iterator<Item = (CellCoord, &Comment)> {
        self.comments.iter().map(|(coord, c)| (*coord, c))
    }

    /// ハイパーリンクを行優先順で列挙
    pub fn hyperlinks(&self) -> impl Iterator<Item = (CellCoord, &Hyperlink)> {
        self.hyperlinks.iter().map(|(coord, h)| (*coord, h))
    }

    /// チャート定義の一覧
    pub fn charts(&self) -> &[ChartSpec] {
        &self.charts
    }

    /// 出力対象の範囲
    ///
    /// 空でないセル、ハイパーリンク付きセル、結合範囲に含まれるセルのうち
    /// 最後の行・列までを含みます。末尾の空行・空列は含みません。
    pub fn used_extent(&self) -> Extent {
        self.used_extent
    }

    /// 登録されたすべての要素を含む範囲
    pub(crate) fn bounds(&self) -> Extent {
        self.bounds
    }

    /// 上限に対してシートの大きさを検証
    pub(crate) fn check_limits(&self, limits: &Limits) -> Result<(), SheetGlazeError> {
        if self.bounds.is_empty() {
            return Ok(());
        }
        limits
            .check(self.bounds.rows - 1, self.bounds.cols - 1)
            .map_err(|msg| SheetGlazeError::validation(&self.name, msg))
    }
}

/// `Sheet`を段階的に構築するビルダー
///
/// # 使用例
///
/// ```rust
/// use sheetglaze::{CellValue, SheetBuilder};
///
/// # fn main() -> Result<(), sheetglaze::SheetGlazeError> {
/// let sheet = SheetBuilder::new("Sales")
///     .with_row(0, ["Q", "Sales"])
///     .with_row(1, [CellValue::from("Q1"), CellValue::from(100)])
///     .with_merge((3, 0), (3, 1))
///     .build()?;
///
/// assert_eq!(sheet.used_extent().rows, 4);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SheetBuilder {
    name: String,
    limits: Limits,
    cells: Vec<(CellCoord, Cell)>,
    merges: Vec<MergeRange>,
    comments: Vec<(CellCoord, Comment)>,
    hyperlinks: Vec<(CellCoord, Hyperlink)>,
    charts: Vec<ChartSpec>,
}

impl SheetBuilder {
    /// 空のシートビルダーを生成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            limits: Limits::default(),
            cells: Vec::new(),
            merges: Vec::new(),
            comments: Vec::new(),
            hyperlinks: Vec::new(),
            charts: Vec::new(),
        }
    }

    /// 行・列の上限を設定する
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// スタイル付きのセルを追加する
    pub fn with_cell(
        mut self,
        row: u32,
        col: u32,
        value: impl Into<CellValue>,
        style: StyleId,
    ) -> Self {
        self.cells
            .push((CellCoord::new(row, col), Cell::new(value.into(), style)));
        self
    }

    /// 既定スタイルのセルを追加する
    pub fn with_value(self, row: u32, col: u32, value: impl Into<CellValue>) -> Self {
        self.with_cell(row, col, value, StyleId::DEFAULT)
    }

    /// 既定スタイルの文字列セルを追加する
    pub fn with_text(self, row: u32, col: u32, text: &str) -> Self {
        self.with_value(row, col, CellValue::Text(text.to_string()))
    }

    /// 1行分の値を列0から順に追加する
    pub fn with_row<I, V>(mut self, row: u32, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        for (col, value) in values.into_iter().enumerate() {
            self = self.with_value(row, col as u32, value);
        }
        self
    }

    /// 結合範囲を追加する（`(row, col)`、両端を含む）
    pub fn with_merge(mut self, start: (u32, u32), end: (u32, u32)) -> Self {
        self.merges.push(MergeRange::new(
            CellCoord::new(start.0, start.1),
            CellCoord::new(end.0, end.1),
        ));
        self
    }

    /// コメントを追加する
    pub fn with_comment(mut self, row: u32, col: u32, comment: Comment) -> Self {
        self.comments.push((CellCoord::new(row, col), comment));
        self
    }

    /// ハイパーリンクを追加する
    pub fn with_hyperlink(mut self, row: u32, col: u32, link: Hyperlink) -> Self {
        self.hyperlinks.push((CellCoord::new(row, col), link));
        self
    }

    /// チャート定義を追加する
    pub fn with_chart(mut self, chart: ChartSpec) -> Self {
        self.charts.push(chart);
        self
    }

    /// 不変条件を検証し、`Sheet`を生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `SheetGlazeError::Validation`: 次のいずれかの場合
    ///   * シート名が空
    ///   * セル・結合・コメント・リンク・チャートのアンカーが上限外
    ///   * アドレスの重複
    ///   * 開始座標が終了座標より大きい結合範囲
    ///   * 結合範囲の重なり
    pub fn build(self) -> Result<Sheet, SheetGlazeError> {
        let name = self.name;
        let limits = self.limits;
        let invalid = |message: String| SheetGlazeError::validation(&name, message);

        if name.trim().is_empty() {
            return Err(invalid("empty sheet name".to_string()));
        }

        let mut bounds = Extent::default();
        let mut used_extent = Extent::default();

        // 1. セル
        let mut cells = BTreeMap::new();
        for (coord, cell) in self.cells {
            limits
                .check(coord.row, coord.col)
                .map_err(|msg| invalid(format!("{} at {}", msg, coord)))?;
            bounds.include(coord);
            if !cell.value.is_empty() {
                used_extent.include(coord);
            }
            if cells.insert(coord, cell).is_some() {
                return Err(invalid(format!("duplicate address {}", coord)));
            }
        }

        // 2. 結合範囲
        let mut merges = self.merges;
        for merge in &merges {
            if merge.start.row > merge.end.row || merge.start.col > merge.end.col {
                return Err(invalid(format!(
                    "inverted merge {}: start must be the top-left cell",
                    merge
                )));
            }
            limits
                .check(merge.end.row, merge.end.col)
                .map_err(|msg| invalid(format!("{} in merge {}", msg, merge)))?;
            bounds.include(merge.end);
            used_extent.include(merge.end);
        }
        merges.sort_by_key(|m| (m.start, m.end));
        for (i, merge) in merges.iter().enumerate() {
            for other in merges[i + 1..]
                .iter()
                .take_while(|other| other.start.row <= merge.end.row)
            {
                if merge.overlaps(other) {
                    return Err(invalid(format!(
                        "overlapping merge: {} and {}",
                        merge, other
                    )));
                }
            }
        }

        // 3. コメントとハイパーリンク
        let mut comments = BTreeMap::new();
        for (coord, comment) in self.comments {
            limits
                .check(coord.row, coord.col)
                .map_err(|msg| invalid(format!("{} at comment {}", msg, coord)))?;
            bounds.include(coord);
            if comments.insert(coord, comment).is_some() {
                return Err(invalid(format!("duplicate comment at {}", coord)));
            }
        }

        let mut hyperlinks = BTreeMap::new();
        for (coord, link) in self.hyperlinks {
            limits
                .check(coord.row, coord.col)
                .map_err(|msg| invalid(format!("{} at hyperlink {}", msg, coord)))?;
            bounds.include(coord);
            used_extent.include(coord);
            if hyperlinks.insert(coord, link).is_some() {
                return Err(invalid(format!("duplicate hyperlink at {}", coord)));
            }
        }

        // 4. チャートのアンカー
        for chart in &self.charts {
            if let Some(anchor) = chart.anchor {
                limits.check(anchor.row, anchor.col).map_err(|msg| {
                    invalid(format!("{} at anchor of chart '{}'", msg, chart.label()))
                })?;
            }
        }

        Ok(Sheet {
            name,
            limits,
            cells,
            merges,
            comments,
            hyperlinks,
            charts: self.charts,
            used_extent,
            bounds,
        })
    }
}

/// シートの順序付き集合と、共有されるスタイルテーブル
///
/// スタイルテーブルはドキュメントごとに一度だけ構築され、以降は読み取り専用です。
#[derive(Debug, Clone, PartialEq)]
pub struct SheetDocument {
    sheets: Vec<Sheet>,
    styles: StyleTable,
}

impl SheetDocument {
    /// 既定スタイルのみを使う1シートのドキュメントを生成
    pub fn single(sheet: Sheet) -> Result<Self, SheetGlazeError> {
        DocumentBuilder::new().with_sheet(sheet).build()
    }

    /// シートの一覧（宣言順）
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// 名前でシートを取得
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// スタイルテーブル
    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    /// JSONからドキュメントを復元する
    ///
    /// 復元後、`SheetBuilder`・`DocumentBuilder`と同じ検証を行います。
    ///
    /// # 発生し得るエラー
    ///
    /// * `SheetGlazeError::Json`: JSONとして不正、またはスタイルの重複
    /// * `SheetGlazeError::Validation`: モデルの不変条件違反
    pub fn from_json(json: &str) -> Result<Self, SheetGlazeError> {
        let record: DocumentRecord = serde_json::from_str(json)?;
        let mut builder = DocumentBuilder::new().with_styles(record.styles);
        for sheet in record.sheets {
            builder = builder.with_sheet(sheet.into_builder().build()?);
        }
        builder.build()
    }

    /// ドキュメントをJSONに変換する
    pub fn to_json(&self) -> Result<String, SheetGlazeError> {
        let record = DocumentRecord {
            styles: self.styles.clone(),
            sheets: self.sheets.iter().map(SheetRecord::from_sheet).collect(),
        };
        Ok(serde_json::to_string(&record)?)
    }
}

/// `SheetDocument`を構築するビルダー
///
/// # 使用例
///
/// ```rust
/// use sheetglaze::{DocumentBuilder, SheetBuilder, Style};
///
/// # fn main() -> Result<(), sheetglaze::SheetGlazeError> {
/// let mut builder = DocumentBuilder::new();
/// let bold = builder.intern_style(Style::default().bold());
///
/// let sheet = SheetBuilder::new("Sheet1")
///     .with_cell(0, 0, "Total", bold)
///     .build()?;
///
/// let document = builder.with_sheet(sheet).build()?;
/// assert_eq!(document.styles().len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    styles: StyleTable,
    sheets: Vec<Sheet>,
}

impl DocumentBuilder {
    /// 既定スタイルのみを持つビルダーを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// スタイルテーブルを置き換える
    pub fn with_styles(mut self, styles: StyleTable) -> Self {
        self.styles = styles;
        self
    }

    /// スタイルを登録し、IDを返す（同じ内容なら同じID）
    pub fn intern_style(&mut self, style: Style) -> StyleId {
        self.styles.intern(style)
    }

    /// シートを追加する
    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.sheets.push(sheet);
        self
    }

    /// スタイル参照を検証し、`SheetDocument`を生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `SheetGlazeError::Validation`: 未登録のスタイルIDを参照するセルがある場合
    pub fn build(self) -> Result<SheetDocument, SheetGlazeError> {
        for sheet in &self.sheets {
            for (coord, cell) in sheet.cells() {
                if self.styles.get(cell.style).is_none() {
                    return Err(SheetGlazeError::validation(
                        sheet.name(),
                        format!("unknown style id {} at {}", cell.style, coord),
                    ));
                }
            }
        }
        Ok(SheetDocument {
            sheets: self.sheets,
            styles: self.styles,
        })
    }
}

/// JSON入出力用のドキュメント表現
#[derive(Debug, Serialize, Deserialize)]
struct DocumentRecord {
    #[serde(default)]
    styles: StyleTable,
    sheets: Vec<SheetRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SheetRecord {
    name: String,
    #[serde(default)]
    cells: Vec<CellRecord>,
    #[serde(default)]
    merges: Vec<MergeRange>,
    #[serde(default)]
    comments: Vec<CommentRecord>,
    #[serde(default)]
    hyperlinks: Vec<HyperlinkRecord>,
    #[serde(default)]
    charts: Vec<ChartSpec>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CellRecord {
    row: u32,
    col: u32,
    #[serde(default)]
    value: CellValue,
    #[serde(default)]
    style: StyleId,
}

#[derive(Debug, Serialize, Deserialize)]
struct CommentRecord {
    row: u32,
    col: u32,
    #[serde(flatten)]
    comment: Comment,
}

#[derive(Debug, Serialize, Deserialize)]
struct HyperlinkRecord {
    row: u32,
    col: u32,
    #[serde(flatten)]
    link: Hyperlink,
}

impl SheetRecord {
    fn from_sheet(sheet: &Sheet) -> Self {
        Self {
            name: sheet.name.clone(),
            cells: sheet
                .cells()
                .map(|(at, cell)| CellRecord {
                    row: at.row,
                    col: at.col,
                    value: cell.value.clone(),
                    style: cell.style,
                })
                .collect(),
            merges: sheet.merges.clone(),
            comments: sheet
                .comments()
                .map(|(at, comment)| CommentRecord {
                    row: at.row,
                    col: at.col,
                    comment: comment.clone(),
                })
                .collect(),
            hyperlinks: sheet
                .hyperlinks()
                .map(|(at, link)| HyperlinkRecord {
                    row: at.row,
                    col: at.col,
                    link: link.clone(),
                })
                .collect(),
            charts: sheet.charts.clone(),
        }
    }

    fn into_builder(self) -> SheetBuilder {
        let mut builder = SheetBuilder::new(self.name);
        for cell in self.cells {
            builder = builder.with_cell(cell.row, cell.col, cell.value, cell.style);
        }
        builder.merges = self.merges;
        for c in self.comments {
            builder = builder.with_comment(c.row, c.col, c.comment);
        }
        for h in self.hyperlinks {
            builder = builder.with_hyperlink(h.row, h.col, h.link);
        }
        builder.charts = self.charts;
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation_message(result: Result<Sheet, SheetGlazeError>) -> String {
        match result {
            Err(SheetGlazeError::Validation { message, .. }) => message,
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_value_at_returns_empty_for_unaddressed() {
        let sheet = SheetBuilder::new("S")
            .with_limits(Limits::new(10, 10))
            .with_text(0, 0, "a")
            .build()
            .unwrap();

        assert_eq!(sheet.value_at(CellCoord::new(0, 0)), Some(&CellValue::from("a")));
        assert_eq!(sheet.value_at(CellCoord::new(5, 5)), Some(&CellValue::Empty));
        assert_eq!(sheet.value_at(CellCoord::new(10, 0)), None);
        assert_eq!(sheet.style_at(CellCoord::new(5, 5)), StyleId::DEFAULT);
    }

    #[test]
    fn test_cells_iterate_row_major() {
        let sheet = SheetBuilder::new("S")
            .with_text(1, 0, "c")
            .with_text(0, 1, "b")
            .with_text(0, 0, "a")
            .build()
            .unwrap();

        let order: Vec<String> = sheet.cells().map(|(at, _)| at.to_a1_notation()).collect();
        assert_eq!(order, vec!["A1", "B1", "A2"]);
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let result = SheetBuilder::new("S")
            .with_text(2, 3, "x")
            .with_value(2, 3, 1.0)
            .build();
        assert_eq!(validation_message(result), "duplicate address D3");
    }

    #[test]
    fn test_limits_exceeded_rejected() {
        let result = SheetBuilder::new("S")
            .with_limits(Limits::new(5, 5))
            .with_text(5, 0, "x")
            .build();
        assert!(validation_message(result).contains("max_rows"));

        let result = SheetBuilder::new("S")
            .with_limits(Limits::new(5, 5))
            .with_merge((0, 0), (0, 7))
            .build();
        assert!(validation_message(result).contains("max_cols"));
    }

    #[test]
    fn test_overlapping_merges_rejected() {
        let result = SheetBuilder::new("S")
            .with_merge((0, 0), (1, 1))
            .with_merge((1, 1), (2, 2))
            .build();
        assert!(validation_message(result).contains("overlapping merge"));
    }

    #[test]
    fn test_adjacent_merges_accepted() {
        let sheet = SheetBuilder::new("S")
            .with_merge((0, 0), (1, 1))
            .with_merge((0, 2), (1, 3))
            .with_merge((2, 0), (2, 3))
            .build()
            .unwrap();
        assert_eq!(sheet.merges().len(), 3);
    }

    #[test]
    fn test_inverted_merge_rejected() {
        let result = SheetBuilder::new("S").with_merge((3, 0), (1, 0)).build();
        assert!(validation_message(result).contains("inverted merge"));
    }

    #[test]
    fn test_merge_lookup() {
        let sheet = SheetBuilder::new("S")
            .with_text(0, 0, "owner")
            .with_merge((0, 0), (1, 1))
            .build()
            .unwrap();

        assert!(matches!(sheet.merge_at(CellCoord::new(0, 0)), MergeLookup::Owner(_)));
        assert!(matches!(sheet.merge_at(CellCoord::new(1, 1)), MergeLookup::Covered(m) if m.start == CellCoord::new(0, 0)));
        assert_eq!(sheet.merge_at(CellCoord::new(2, 0)), MergeLookup::Unmerged);
    }

    #[test]
    fn test_used_extent_ignores_trailing_empties() {
        let sheet = SheetBuilder::new("S")
            .with_text(0, 0, "a")
            .with_value(1, 2, 3.0)
            .with_value(7, 9, CellValue::Empty)
            .with_text(8, 8, "")
            .build()
            .unwrap();

        assert_eq!(sheet.used_extent(), Extent { rows: 2, cols: 3 });
        assert_eq!(sheet.bounds(), Extent { rows: 9, cols: 10 });
    }

    #[test]
    fn test_used_extent_includes_merges() {
        let sheet = SheetBuilder::new("S")
            .with_text(0, 0, "a")
            .with_merge((0, 0), (3, 4))
            .build()
            .unwrap();
        assert_eq!(sheet.used_extent(), Extent { rows: 4, cols: 5 });
    }

    #[test]
    fn test_empty_sheet_name_rejected() {
        let result = SheetBuilder::new("  ").build();
        assert!(validation_message(result).contains("empty sheet name"));
    }

    #[test]
    fn test_unknown_style_rejected() {
        let sheet = SheetBuilder::new("S")
            .with_cell(0, 0, "a", StyleId(7))
            .build()
            .unwrap();
        let result = DocumentBuilder::new().with_sheet(sheet).build();

        match result {
            Err(SheetGlazeError::Validation { sheet, message }) => {
                assert_eq!(sheet, "S");
                assert_eq!(message, "unknown style id 7 at A1");
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn test_document_json_roundtrip() {
        let mut builder = DocumentBuilder::new();
        let bold = builder.intern_style(Style::default().bold());
        let sheet = SheetBuilder::new("Data")
            .with_cell(0, 0, "Name", bold)
            .with_value(1, 0, 42.5)
            .with_merge((2, 0), (2, 1))
            .with_comment(1, 0, Comment::new(Some("amy".to_string()), "checked"))
            .with_hyperlink(0, 0, Hyperlink::new("https://example.com", None))
            .build()
            .unwrap();
        let document = builder.with_sheet(sheet).build().unwrap();

        let json = document.to_json().unwrap();
        let restored = SheetDocument::from_json(&json).unwrap();
        assert_eq!(restored, document);
    }

    #[test]
    fn test_from_json_validates() {
        let json = r#"{"sheets":[{"name":"S","merges":[
            {"start":{"row":0,"col":0},"end":{"row":1,"col":1}},
            {"start":{"row":1,"col":0},"end":{"row":2,"col":0}}]}]}"#;
        let result = SheetDocument::from_json(json);
        assert!(matches!(result, Err(SheetGlazeError::Validation { .. })));
    }

    #[test]
    fn test_check_limits() {
        let sheet = SheetBuilder::new("S").with_text(20, 3, "x").build().unwrap();
        assert!(sheet.check_limits(&Limits::new(100, 100)).is_ok());
        assert!(sheet.check_limits(&Limits::new(20, 100)).is_err());
    }
}
