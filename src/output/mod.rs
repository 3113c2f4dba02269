//! Output Module
//!
//! 中間シートモデルと解決済みスタイルから、無害化済みのHTMLを生成するモジュール。
//!
//! 出力結果は文字列として返し、ファイルへの書き込みは呼び出し側の責務です。
//! 無害化による劣化（リンクの削除、チャートの置き換え）はエラーではなく、
//! `Warning`として結果に含めたうえで`log`にも出力します。

mod escape;
mod html;

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

pub(crate) use escape::escape_html;
pub(crate) use html::{HtmlRenderer, RenderOptions};

/// 警告の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum WarningKind {
    /// 許可されないハイパーリンクを削除した（セルのテキストは残る）
    DroppedHyperlink,
    /// チャートを描画できず、プレースホルダーに置き換えた
    ChartPlaceholder,
    /// 出力されないセル（範囲外、または結合で隠れるセル）のコメントを省いた
    DroppedComment,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::DroppedHyperlink => "dropped_hyperlink",
            WarningKind::ChartPlaceholder => "chart_placeholder",
            WarningKind::DroppedComment => "dropped_comment",
        }
    }
}

/// 出力中に記録された警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// シート名
    pub sheet: String,
    /// セル座標（A1記法）またはチャート名
    pub location: String,
    pub kind: WarningKind,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] sheet '{}', {}: {}",
            self.kind.as_str(),
            self.sheet,
            self.location,
            self.message
        )
    }
}

/// 1シート分の出力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSheet {
    /// シート名
    pub name: String,
    /// `<table>`要素（およびチャートの`<figure>`）
    pub html: String,
    /// クラスモードで使用したクラスの規則（インラインモードでは空）
    pub stylesheet: String,
    pub warnings: Vec<Warning>,
}

/// ドキュメント全体の出力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// HTML文書全体、または表のみモードでは表の断片の連結
    pub html: String,
    /// 表のみモードで埋め込まれなかったスタイルシート
    ///
    /// ドキュメント全体出力では`<style>`に含まれるため空です。
    pub stylesheet: String,
    /// シートごとの出力（宣言順）
    pub sheets: Vec<RenderedSheet>,
}

impl RenderedDocument {
    /// すべてのシートの警告（宣言順）
    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.sheets.iter().flat_map(|s| s.warnings.iter())
    }
}

/// 複数シートのクラス規則を、出現順を保ったまま重複なく連結する
///
/// クラス名は宣言内容のハッシュから決まるため、同名の規則は同じ内容です。
pub(crate) fn merge_stylesheets<'a, I>(sheets: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut css = String::new();
    for sheet in sheets {
        for line in sheet.lines() {
            if seen.insert(line) {
                css.push_str(line);
                css.push('\n');
            }
        }
    }
    css
}
