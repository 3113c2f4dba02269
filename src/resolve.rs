//! Style Resolution Module
//!
//! `Style`とテーマから、セルごとの具体的なCSS宣言を解決するモジュール。
//!
//! 解決は次の順で行われます:
//!
//! 1. テーマの役割（セル、またはヘッダー行）の宣言
//! 2. セルのスタイルが明示的に設定した属性（テーマより優先）
//! 3. 条件付き書式ルール（宣言順に適用し、後のルールが優先）
//!
//! スタイルごとの宣言（手順2）はドキュメントごとに一度だけ計算され、
//! 以降は読み取り専用のテーブルとして共有されます。

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::api::StyleMode;
use crate::conditional::{ConditionalRule, SheetStats};
use crate::numfmt::NumberFormat;
use crate::style::{Style, StyleId, StyleTable};
use crate::theme::{Declarations, Theme};
use crate::types::CellValue;

/// クラス名に含める特徴語の最大数
const MAX_CLASS_FEATURES: usize = 3;

/// テーブル全体に付けるクラス名（スタイルシートのスコープ）
pub(crate) const SHEET_CLASS: &str = "sg-sheet";

/// スタイルが明示的に設定した属性をCSS宣言に変換する
///
/// 未設定の属性は宣言に含めません（テーマの値が使われます）。
pub fn style_declarations(style: &Style) -> Declarations {
    let mut decls = Declarations::new();
    let font = &style.font;

    if let Some(family) = &font.family {
        if family.chars().any(char::is_whitespace) {
            decls.set("font-family", &format!("\"{}\"", family.replace('"', "")));
        } else {
            decls.set("font-family", family);
        }
    }
    if let Some(size) = font.size {
        if size.points() > 0.0 {
            decls.set("font-size", &format!("{}pt", trim_decimal(size.points())));
        }
    }
    if font.bold {
        decls.set("font-weight", "bold");
    }
    if font.italic {
        decls.set("font-style", "italic");
    }
    match (font.underline, font.strike) {
        (true, true) => decls.set("text-decoration", "underline line-through"),
        (true, false) => decls.set("text-decoration", "underline"),
        (false, true) => decls.set("text-decoration", "line-through"),
        (false, false) => {}
    }
    if let Some(color) = font.color {
        decls.set("color", &color.to_hex());
    }
    if let Some(fill) = style.fill {
        decls.set("background-color", &fill.to_hex());
    }
    for (prop, edge) in style.border.edges() {
        if let Some(edge) = edge {
            decls.set(prop, &edge.to_css());
        }
    }
    if let Some(align) = style.h_align {
        decls.set("text-align", align.as_css());
    }
    if let Some(align) = style.v_align {
        decls.set("vertical-align", align.as_css());
    }
    if style.wrap {
        decls.set("white-space", "pre-wrap");
    }
    decls
}

/// 小数2桁までで表記（末尾の0は省く）
fn trim_decimal(value: f64) -> String {
    let s = format!("{:.2}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// 宣言内容から決定的なクラス名を生成する
///
/// 形式は`s-<特徴>-<ハッシュ8桁>`です。特徴語（bold、italic、fill など）は
/// 人が読んで内容を推測できるようにするためのもので、一意性はハッシュが保証します。
///
/// # 使用例
///
/// ```rust
/// use sheetglaze::{class_name, style_declarations, Style};
///
/// let decls = style_declarations(&Style::default().bold());
/// let name = class_name(&decls);
/// assert!(name.starts_with("s-bold-"));
/// assert_eq!(name, class_name(&decls));
/// ```
pub fn class_name(decls: &Declarations) -> String {
    let digest = Sha256::digest(decls.to_css().as_bytes());
    let hash: String = format!("{:x}", digest).chars().take(8).collect();

    let features = class_features(decls);
    if features.is_empty() {
        format!("s-{}", hash)
    } else {
        format!("s-{}-{}", features.join("-"), hash)
    }
}

fn class_features(decls: &Declarations) -> Vec<&'static str> {
    let mut features = Vec::new();
    if decls.get("font-weight").is_some_and(|v| v == "bold") {
        features.push("bold");
    }
    if decls.get("font-style").is_some_and(|v| v == "italic") {
        features.push("italic");
    }
    if decls.get("text-decoration").is_some_and(|v| v.contains("underline")) {
        features.push("underline");
    }
    if decls.get("background-color").is_some() || decls.get("background").is_some() {
        features.push("fill");
    }
    if decls.get("color").is_some() {
        features.push("color");
    }
    match decls.get("text-align") {
        Some("center") => features.push("center"),
        Some("right") => features.push("right"),
        _ => {}
    }
    if decls.iter().any(|(p, _)| p.starts_with("border")) {
        features.push("border");
    }
    features.truncate(MAX_CLASS_FEATURES);
    features
}

/// スタイルIDごとの解決済み宣言テーブル
///
/// ドキュメントのスタイルテーブルから一度だけ構築され、読み取り専用で共有されます。
#[derive(Debug, Clone, Default)]
pub struct ResolvedStyles {
    by_id: Vec<Declarations>,
    /// スタイルIDごとの解析済み数値書式
    formats: Vec<Option<NumberFormat>>,
}

impl ResolvedStyles {
    /// スタイルテーブルの全スタイルを解決
    ///
    /// 数値書式もここで一度だけ解析します。空の書式は未設定として扱います。
    pub fn resolve(table: &StyleTable) -> Self {
        let (by_id, formats) = table
            .iter()
            .map(|(_, style)| {
                let format = style
                    .number_format
                    .as_deref()
                    .filter(|f| !f.trim().is_empty())
                    .map(NumberFormat::parse);
                (style_declarations(style), format)
            })
            .unzip();
        Self { by_id, formats }
    }

    /// スタイルIDの宣言を取得（未登録なら`None`）
    pub fn get(&self, id: StyleId) -> Option<&Declarations> {
        self.by_id.get(id.index())
    }

    /// スタイルIDの解析済み数値書式
    pub(crate) fn number_format(&self, id: StyleId) -> Option<&NumberFormat> {
        self.formats.get(id.index()).and_then(Option::as_ref)
    }

    /// 解決済みスタイル数
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// セルの役割
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellRole {
    /// ヘッダー行（先頭行）
    Header,
    /// 本体
    Body,
}

/// セルに付与するスタイル
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct CellStyle {
    /// `style`属性の値（インラインモード）
    pub inline: Option<String>,
    /// `class`属性の値（クラスモード）
    pub class: Option<String>,
}

/// クラスモードで使用したクラスの登録簿
///
/// 登録順（行優先の出現順）を保持するため、同じ入力からは
/// バイト単位で同じスタイルシートが得られます。
#[derive(Debug, Clone, Default)]
pub(crate) struct ClassRegistry {
    classes: Vec<(String, Declarations)>,
    index: HashMap<Declarations, usize>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 宣言に対応するクラス名を返す（未登録なら登録する）
    pub fn class_for(&mut self, decls: &Declarations) -> String {
        if let Some(i) = self.index.get(decls) {
            return self.classes[*i].0.clone();
        }
        let name = class_name(decls);
        self.index.insert(decls.clone(), self.classes.len());
        self.classes.push((name.clone(), decls.clone()));
        name
    }

    /// 登録済みクラス数
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// クラス定義をCSS規則として書き出す
    pub fn css_rules(&self) -> String {
        let mut css = String::new();
        for (name, decls) in &self.classes {
            css.push_str(&format!(".{} .{} {{ {} }}\n", SHEET_CLASS, name, decls.to_css()));
        }
        css
    }
}

/// セル単位のスタイル解決器
///
/// 不変のテーマ・解決済みテーブル・ルールへの参照だけを持ち、
/// シート間で共有しても安全です。
#[derive(Debug, Clone, Copy)]
pub(crate) struct StyleResolver<'a> {
    theme: &'a Theme,
    mode: StyleMode,
    resolved: &'a ResolvedStyles,
    rules: &'a [ConditionalRule],
}

impl<'a> StyleResolver<'a> {
    pub fn new(
        theme: &'a Theme,
        mode: StyleMode,
        resolved: &'a ResolvedStyles,
        rules: &'a [ConditionalRule],
    ) -> Self {
        Self {
            theme,
            mode,
            resolved,
            rules,
        }
    }

    /// セルのスタイルに設定された解析済み数値書式
    pub fn number_format(&self, id: StyleId) -> Option<&'a NumberFormat> {
        self.resolved.number_format(id)
    }

    /// 条件付き書式に統計が必要な場合のみ集計する
    pub fn collect_stats<'v, I>(&self, values: I) -> SheetStats
    where
        I: IntoIterator<Item = &'v CellValue>,
    {
        if self.rules.iter().any(ConditionalRule::needs_stats) {
            SheetStats::collect(values)
        } else {
            SheetStats::default()
        }
    }

    /// テーブル要素に付ける宣言（インラインモード用）
    pub fn table_declarations(&self) -> &Declarations {
        &self.theme.table
    }

    /// セルのスタイルを解決する
    ///
    /// # 戻り値
    ///
    /// * `Some(CellStyle)` - 解決結果（属性が不要なら両方`None`）
    /// * `None` - スタイルIDが解決済みテーブルに存在しない
    pub fn resolve_cell(
        &self,
        style: StyleId,
        value: &CellValue,
        role: CellRole,
        stats: &SheetStats,
        registry: &mut ClassRegistry,
    ) -> Option<CellStyle> {
        let mut own = self.resolved.get(style)?.clone();
        for rule in self.rules {
            rule.apply(value, stats, &mut own);
        }

        let resolved = match self.mode {
            StyleMode::Inline => {
                let mut decls = match role {
                    CellRole::Header => self.theme.header_cell(),
                    CellRole::Body => self.theme.cell.clone(),
                };
                decls.extend(&own);
                CellStyle {
                    inline: (!decls.is_empty()).then(|| decls.to_css()),
                    class: None,
                }
            }
            StyleMode::Class => CellStyle {
                inline: None,
                class: (!own.is_empty()).then(|| registry.class_for(&own)),
            },
        };
        Some(resolved)
    }

    /// テーマの役割ごとの規則（クラスモード、またはドキュメント全体出力用）
    pub fn theme_rules(&self) -> String {
        let mut css = String::new();
        css.push_str(&format!(".{} {{ {} }}\n", SHEET_CLASS, self.theme.table.to_css()));
        css.push_str(&format!(
            ".{s} td, .{s} th {{ {} }}\n",
            self.theme.cell.to_css(),
            s = SHEET_CLASS
        ));
        css.push_str(&format!(".{} th {{ {} }}\n", SHEET_CLASS, self.theme.header.to_css()));
        css
    }

    /// `body`要素の規則（ドキュメント全体出力用）
    pub fn body_rule(&self) -> String {
        format!("body {{ {} }}\n", self.theme.body.to_css())
    }

    pub fn mode(&self) -> StyleMode {
        self.mode
    }
}
