//! Types Module
//!
//! 中間シートモデルで使用する共通データ型を定義するモジュール。

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// セルの値を表す列挙型
///
/// アダプターが各フォーマットの値をこのタグ付き値に正規化します。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    /// 空セル
    #[default]
    Empty,

    /// 文字列
    Text(String),

    /// 数値（f64）
    Number(f64),

    /// 論理値
    Boolean(bool),

    /// 日付・時刻
    Date(NaiveDateTime),

    /// 数式
    ///
    /// 数式は再計算しません。`cached`はアダプターが記録した計算結果です。
    Formula {
        /// 数式文字列（例: `=SUM(A1:A3)`）
        text: String,
        /// キャッシュされた計算結果
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cached: Option<Box<CellValue>>,
    },
}

impl CellValue {
    /// 値が空かどうかを判定
    ///
    /// `Empty`と空文字列の`Text`を空とみなします。
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// 表示に使う値を返す
    ///
    /// 数式の場合はキャッシュ値（存在すれば）を、それ以外は自身を返します。
    pub fn effective(&self) -> &CellValue {
        match self {
            CellValue::Formula {
                cached: Some(inner),
                ..
            } => inner.effective(),
            other => other,
        }
    }

    /// 数値として解釈できる場合はその値を返す
    pub fn as_number(&self) -> Option<f64> {
        match self.effective() {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    /// 数式セルを生成
    pub fn formula(text: impl Into<String>, cached: Option<CellValue>) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached: cached.map(Box::new),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::Date(value)
    }
}

/// セル座標（0始まり）
///
/// `Ord`は行優先順（row, col）で比較します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    #[allow(clippy::wrong_self_convention)]
    pub fn to_a1_notation(&self) -> String {
        let col_str = Self::col_index_to_letter(self.col);
        format!("{}{}", col_str, u64::from(self.row) + 1)
    }

    /// 列インデックスを文字列に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
    fn col_index_to_letter(mut col: u32) -> String {
        let mut result = String::new();
        loop {
            let remainder = col % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        result
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_a1_notation())
    }
}

/// セル結合範囲（両端を含む）
///
/// 左上セル（`start`）が内容の所有者となり、
/// 範囲内のその他のセルは出力されません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeRange {
    /// 左上セル
    pub start: CellCoord,
    /// 右下セル
    pub end: CellCoord,
}

impl MergeRange {
    /// 新しい結合範囲を生成
    pub fn new(start: CellCoord, end: CellCoord) -> Self {
        Self { start, end }
    }

    /// 指定された座標が範囲内にあるかを判定
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row >= self.start.row
            && coord.row <= self.end.row
            && coord.col >= self.start.col
            && coord.col <= self.end.col
    }

    /// 他の範囲と1セルでも重なるかを判定
    pub fn overlaps(&self, other: &MergeRange) -> bool {
        self.start.row <= other.end.row
            && other.start.row <= self.end.row
            && self.start.col <= other.end.col
            && other.start.col <= self.end.col
    }

    /// 結合セルの行数
    pub fn row_span(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// 結合セルの列数
    pub fn col_span(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// 範囲内の全座標を行優先順で列挙
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (self.start.row..=self.end.row)
            .flat_map(move |row| (self.start.col..=self.end.col).map(move |col| CellCoord::new(row, col)))
    }
}

impl std::fmt::Display for MergeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// セルコメント
///
/// ホバー時に表示される注釈として出力され、セル本文には含まれません。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// 作成者（任意）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// コメント本文
    pub text: String,
}

impl Comment {
    /// 新しいコメントを生成
    pub fn new(author: Option<String>, text: impl Into<String>) -> Self {
        Self {
            author,
            text: text.into(),
        }
    }
}

/// ハイパーリンク
///
/// `target`は出力時にスキーム許可リストで検証されます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperlink {
    /// リンク先URI
    pub target: String,
    /// 表示テキストの上書き（任意）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Hyperlink {
    /// 新しいハイパーリンクを生成
    pub fn new(target: impl Into<String>, display: Option<String>) -> Self {
        Self {
            target: target.into(),
            display,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_coord_to_a1_notation() {
        assert_eq!(CellCoord::new(0, 0).to_a1_notation(), "A1");
        assert_eq!(CellCoord::new(0, 25).to_a1_notation(), "Z1");
        assert_eq!(CellCoord::new(0, 26).to_a1_notation(), "AA1");
        assert_eq!(CellCoord::new(9, 701).to_a1_notation(), "ZZ10");
        assert_eq!(CellCoord::new(0, 702).to_a1_notation(), "AAA1");
    }

    #[test]
    fn test_cell_coord_ordering_is_row_major() {
        let mut coords = vec![
            CellCoord::new(1, 0),
            CellCoord::new(0, 5),
            CellCoord::new(0, 1),
        ];
        coords.sort();
        assert_eq!(
            coords,
            vec![CellCoord::new(0, 1), CellCoord::new(0, 5), CellCoord::new(1, 0)]
        );
    }

    #[test]
    fn test_merge_range_spans() {
        let merge = MergeRange::new(CellCoord::new(1, 1), CellCoord::new(2, 4));
        assert_eq!(merge.row_span(), 2);
        assert_eq!(merge.col_span(), 4);
        assert!(merge.contains(CellCoord::new(2, 4)));
        assert!(!merge.contains(CellCoord::new(3, 1)));
        assert_eq!(merge.cells().count(), 8);
        assert_eq!(merge.to_string(), "B2:E3");
    }

    #[test]
    fn test_merge_range_overlaps() {
        let a = MergeRange::new(CellCoord::new(0, 0), CellCoord::new(1, 1));
        let b = MergeRange::new(CellCoord::new(1, 1), CellCoord::new(2, 2));
        let c = MergeRange::new(CellCoord::new(0, 2), CellCoord::new(1, 3));

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_cell_value_effective() {
        let formula = CellValue::formula("=A1*2", Some(CellValue::Number(4.0)));
        assert_eq!(formula.effective(), &CellValue::Number(4.0));
        assert_eq!(formula.as_number(), Some(4.0));

        let uncached = CellValue::formula("=A1*2", None);
        assert_eq!(uncached.effective(), &uncached);
        assert_eq!(uncached.as_number(), None);
        assert!(!uncached.is_empty());

        assert!(CellValue::Text(String::new()).is_empty());
        assert_eq!(CellValue::Number(f64::NAN).as_number(), None);
    }

    #[test]
    fn test_cell_value_serde_tagged() {
        let value = CellValue::Number(1.5);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"type":"number","value":1.5}"#);

        let back: CellValue = serde_json::from_str(r#"{"type":"text","value":"Q1"}"#).unwrap();
        assert_eq!(back, CellValue::Text("Q1".to_string()));

        let empty: CellValue = serde_json::from_str(r#"{"type":"empty"}"#).unwrap();
        assert_eq!(empty, CellValue::Empty);
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_a1_notation_row_suffix(row in 0u32..1_000_000, col in 0u32..16_384) {
                let a1 = CellCoord::new(row, col).to_a1_notation();
                let letters: String = a1.chars().take_while(|c| c.is_ascii_uppercase()).collect();
                let digits = &a1[letters.len()..];

                prop_assert!(!letters.is_empty() && letters.len() <= 3);
                prop_assert_eq!(digits.parse::<u32>().unwrap(), row + 1);
            }
        }
    }
}
