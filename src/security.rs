//! Security Module
//!
//! 出力の安全性に関わる制限と検証を提供するモジュール。
//! シートの大きさの上限と、ハイパーリンクのスキーム許可リストを扱います。

use serde::{Deserialize, Serialize};
use url::Url;

/// 許可するハイパーリンクのスキーム
pub(crate) const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// シートの大きさの上限
///
/// 上限を超えるモデルは切り詰めずに検証エラーとします。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// 最大行数
    /// デフォルト: 1,000,000
    pub max_rows: u32,
    /// 最大列数
    /// デフォルト: 16,384
    pub max_cols: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_rows: 1_000_000,
            max_cols: 16_384,
        }
    }
}

impl Limits {
    /// 新しい上限を生成
    pub fn new(max_rows: u32, max_cols: u32) -> Self {
        Self { max_rows, max_cols }
    }

    /// 0始まりの行・列が上限内かを判定
    pub fn contains(&self, row: u32, col: u32) -> bool {
        row < self.max_rows && col < self.max_cols
    }

    /// 座標を検証し、違反時は制約名を含むメッセージを返す
    pub(crate) fn check(&self, row: u32, col: u32) -> Result<(), String> {
        if row >= self.max_rows {
            return Err(format!(
                "max_rows exceeded: row {} is outside the limit of {} rows",
                u64::from(row) + 1,
                self.max_rows
            ));
        }
        if col >= self.max_cols {
            return Err(format!(
                "max_cols exceeded: column {} is outside the limit of {} columns",
                u64::from(col) + 1,
                self.max_cols
            ));
        }
        Ok(())
    }
}

/// ハイパーリンク先の検証
///
/// スキームが許可リスト（`http`、`https`、`mailto`）に含まれる絶対URIのみを受け付けます。
/// 相対URIやスキームのない文字列は拒否します。
///
/// # 引数
///
/// * `target` - 検証するリンク先
///
/// # 戻り値
///
/// * `Ok(String)` - 正規化されたURI（出力にはこの値を使う）
/// * `Err(String)` - 拒否理由
pub(crate) fn validate_link_target(target: &str) -> Result<String, String> {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return Err("Empty link target".to_string());
    }

    // 制御文字を含むURIはスキーム判定をすり抜ける可能性があるため拒否
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(format!("Control character in link target: {:?}", trimmed));
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| format!("Unparseable link target '{}': {}", trimmed, e))?;

    let scheme = parsed.scheme();
    if !ALLOWED_SCHEMES.contains(&scheme) {
        return Err(format!("Disallowed link scheme '{}'", scheme));
    }

    if matches!(scheme, "http" | "https") && parsed.host_str().map_or(true, str::is_empty) {
        return Err(format!("Link target without host: '{}'", trimmed));
    }

    Ok(parsed.to_string())
}
