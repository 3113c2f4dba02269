//! Theme Module
//!
//! テーマ（body・table・セル・ヘッダー行の4種類の既定スタイル）と、
//! CSS宣言の順序付き集合である`Declarations`を提供するモジュール。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SheetGlazeError;

/// CSS宣言の順序付き集合
///
/// 同じプロパティを再設定すると、元の位置のまま値だけが置き換わります。
/// プロパティ名と値は設定時に無害化され、`style`属性やスタイルシートから
/// 抜け出す文字（`<`、`>`、`{`、`}`、`;`、引用符の不整合など）は取り除かれます。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Declarations {
    entries: Vec<(String, String)>,
}

impl Declarations {
    /// 空の宣言集合を生成
    pub fn new() -> Self {
        Self::default()
    }

    /// `prop: value; prop: value`形式の文字列から生成
    ///
    /// コロンを含まない断片は無視します。
    pub fn parse(css: &str) -> Self {
        let mut decls = Self::new();
        for part in split_declarations(css) {
            if let Some((prop, value)) = part.split_once(':') {
                decls.set(prop, value);
            }
        }
        decls
    }

    /// プロパティを設定する
    ///
    /// 無害化の結果、名前か値が空になった場合は何もしません。
    pub fn set(&mut self, prop: &str, value: &str) {
        let prop = sanitize_property(prop);
        let value = sanitize_value(value);
        if prop.is_empty() || value.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(p, _)| *p == prop) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((prop, value)),
        }
    }

    /// プロパティの値を取得
    pub fn get(&self, prop: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prop)
            .map(|(_, v)| v.as_str())
    }

    /// 他の宣言集合で上書きした新しい集合を返す
    pub fn merged(&self, other: &Declarations) -> Declarations {
        let mut result = self.clone();
        result.extend(other);
        result
    }

    /// 他の宣言集合の内容で上書きする
    pub fn extend(&mut self, other: &Declarations) {
        for (prop, value) in &other.entries {
            match self.entries.iter_mut().find(|(p, _)| p == prop) {
                Some(entry) => entry.1 = value.clone(),
                None => self.entries.push((prop.clone(), value.clone())),
            }
        }
    }

    /// 宣言が1つもないかどうか
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 宣言数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `(プロパティ, 値)`を設定順に列挙
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    /// CSS文字列（`prop: value; prop: value`）に変換
    pub fn to_css(&self) -> String {
        self.entries
            .iter()
            .map(|(p, v)| format!("{}: {}", p, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for Declarations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl TryFrom<String> for Declarations {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ok(Declarations::parse(&value))
    }
}

impl From<Declarations> for String {
    fn from(value: Declarations) -> Self {
        value.to_css()
    }
}

/// 引用符の外にある`;`で分割する
fn split_declarations(css: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in css.char_indices() {
        match (quote, ch) {
            (None, '"' | '\'') => quote = Some(ch),
            (Some(q), c) if c == q => quote = None,
            (None, ';') => {
                parts.push(&css[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&css[start..]);
    parts
}

/// プロパティ名は英小文字・数字・ハイフンのみ
fn sanitize_property(prop: &str) -> String {
    prop.trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// 値から区切り文字と山括弧を除き、引用符の不整合がある場合は引用符も除く
fn sanitize_value(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | ';' | '\\' | '`') && !c.is_control())
        .collect();
    let balanced = cleaned.matches('"').count() % 2 == 0 && cleaned.matches('\'').count() % 2 == 0;
    if balanced {
        cleaned
    } else {
        cleaned.chars().filter(|c| *c != '"' && *c != '\'').collect()
    }
}

/// テーマ
///
/// すべてのテーマは同じ4つの役割（body、table、セル、ヘッダー行）を定義します。
/// 独自テーマも同じ構造で与えます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// ページ全体（`body`）
    pub body: Declarations,
    /// 表全体（`table`）
    pub table: Declarations,
    /// 一般セル（`td`、`th`）
    pub cell: Declarations,
    /// ヘッダー行（`th`）
    pub header: Declarations,
}

impl Theme {
    /// 4つの宣言文字列からテーマを生成
    pub fn new(body: &str, table: &str, cell: &str, header: &str) -> Self {
        Self {
            body: Declarations::parse(body),
            table: Declarations::parse(table),
            cell: Declarations::parse(cell),
            header: Declarations::parse(header),
        }
    }

    /// ヘッダー行セルの宣言（セル宣言をヘッダー宣言で上書き）
    pub fn header_cell(&self) -> Declarations {
        self.cell.merged(&self.header)
    }
}

impl Default for Theme {
    fn default() -> Self {
        ThemeName::Default.theme()
    }
}

/// 組み込みテーマ名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ThemeName {
    /// 淡い灰色の背景と影付きの表（デフォルト）
    #[default]
    Default,
    /// 余白を広く取った簡素な表
    Minimal,
    /// 暗い背景
    Dark,
    /// 印刷向け（セリフ体、黒罫線）
    Print,
}

impl ThemeName {
    /// すべての組み込みテーマ名
    pub const ALL: [ThemeName; 4] = [
        ThemeName::Default,
        ThemeName::Minimal,
        ThemeName::Dark,
        ThemeName::Print,
    ];

    /// テーマ名の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Default => "default",
            ThemeName::Minimal => "minimal",
            ThemeName::Dark => "dark",
            ThemeName::Print => "print",
        }
    }

    /// 組み込みテーマの定義を返す
    pub fn theme(&self) -> Theme {
        match self {
            ThemeName::Default => Theme::new(
                "font-family: Arial, sans-serif; margin: 20px; background-color: #f5f5f5",
                "border-collapse: collapse; width: 100%; background-color: white; box-shadow: 0 2px 5px rgba(0,0,0,0.1)",
                "border: 1px solid #ddd; padding: 8px; text-align: left",
                "background-color: #f8f9fa; font-weight: bold; color: #333",
            ),
            ThemeName::Minimal => Theme::new(
                "font-family: \"Helvetica Neue\", Arial, sans-serif; margin: 20px; background-color: white",
                "border-collapse: collapse; width: 100%",
                "border: 1px solid #e0e0e0; padding: 12px; text-align: left",
                "border-bottom: 2px solid #333; font-weight: 500; color: #333",
            ),
            ThemeName::Dark => Theme::new(
                "font-family: Arial, sans-serif; margin: 20px; background-color: #1a1a1a; color: #e0e0e0",
                "border-collapse: collapse; width: 100%; background-color: #2d2d2d",
                "border: 1px solid #444; padding: 8px; text-align: left; color: #e0e0e0",
                "background-color: #404040; font-weight: bold; color: #fff",
            ),
            ThemeName::Print => Theme::new(
                "font-family: \"Times New Roman\", serif; margin: 0; background-color: white",
                "border-collapse: collapse; width: 100%",
                "border: 1px solid black; padding: 4px; text-align: left",
                "background-color: #f0f0f0; font-weight: bold; border: 2px solid black",
            ),
        }
    }
}

impl FromStr for ThemeName {
    type Err = SheetGlazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SheetGlazeError::Config(format!("Unknown theme: '{}'", s)))
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
