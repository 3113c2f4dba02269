//! Format Tokens Module
//!
//! Excel数値書式文字列の字句要素と、字句解析器を提供します。

/// 数値書式のトークン
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FormatToken {
    /// `0`: 必ず表示する桁
    Zero,
    /// `#`: 有効桁のみ表示する桁
    Hash,
    /// `?`: 有効桁がない場合は空白を表示する桁
    Space,
    /// `.`
    DecimalPoint,
    /// `,`（桁区切り、または末尾で1000倍スケール）
    Comma,
    /// `%`
    Percent,
    /// `E+00`/`E-00`（`plus`は正の指数にも符号を付けるか、`digits`は最小桁数）
    Exponent { plus: bool, digits: usize },
    /// `@`: 文字列の埋め込み位置
    TextPlaceholder,
    /// `General`
    General,
    /// 年（桁数）
    Year(usize),
    /// 月（桁数、3以上は英語名）
    Month(usize),
    /// 日（桁数、3以上は曜日名）
    Day(usize),
    /// 時（桁数）
    Hour(usize),
    /// 分（桁数）
    Minute(usize),
    /// 秒（桁数）
    Second(usize),
    /// `AM/PM`または`A/P`（12時間表記）
    AmPm { short: bool },
    /// そのまま出力する文字列
    Literal(String),
}

impl FormatToken {
    /// 日付・時刻トークンかどうか
    pub fn is_datetime(&self) -> bool {
        matches!(
            self,
            FormatToken::Year(_)
                | FormatToken::Month(_)
                | FormatToken::Day(_)
                | FormatToken::Hour(_)
                | FormatToken::Minute(_)
                | FormatToken::Second(_)
                | FormatToken::AmPm { .. }
        )
    }

    /// 数字の桁トークンかどうか
    pub fn is_digit(&self) -> bool {
        matches!(self, FormatToken::Zero | FormatToken::Hash | FormatToken::Space)
    }
}

/// 1セクション分の文字列をトークン列に分解する
///
/// 角括弧の内容（色、ロケール、条件）と、`*`（繰り返し文字）は読み捨てます。
/// `_x`は空白1文字になります。
pub(crate) fn tokenize(section: &str) -> Vec<FormatToken> {
    let chars: Vec<char> = section.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '"' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != '"' {
                    end += 1;
                }
                push_literal(&mut tokens, &chars[start..end.min(chars.len())].iter().collect::<String>());
                i = end + 1;
                continue;
            }
            '\\' => {
                if let Some(next) = chars.get(i + 1) {
                    push_literal(&mut tokens, &next.to_string());
                }
                i += 2;
                continue;
            }
            '[' => {
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
            }
            '_' => {
                push_literal(&mut tokens, " ");
                i += 1;
            }
            '*' => {
                i += 1;
            }
            '0' => tokens.push(FormatToken::Zero),
            '#' => tokens.push(FormatToken::Hash),
            '?' => tokens.push(FormatToken::Space),
            '.' => tokens.push(FormatToken::DecimalPoint),
            ',' => tokens.push(FormatToken::Comma),
            '%' => tokens.push(FormatToken::Percent),
            '@' => tokens.push(FormatToken::TextPlaceholder),
            'E' | 'e' if matches!(chars.get(i + 1), Some('+') | Some('-')) => {
                let plus = chars[i + 1] == '+';
                let mut j = i + 2;
                while j < chars.len() && matches!(chars[j], '0' | '#') {
                    j += 1;
                }
                tokens.push(FormatToken::Exponent {
                    plus,
                    digits: (j - (i + 2)).max(1),
                });
                i = j;
                continue;
            }
            'G' | 'g' if starts_with_ignore_case(&chars[i..], "general") => {
                tokens.push(FormatToken::General);
                i += "general".len();
                continue;
            }
            'A' | 'a' if starts_with_ignore_case(&chars[i..], "am/pm") => {
                tokens.push(FormatToken::AmPm { short: false });
                i += "am/pm".len();
                continue;
            }
            'A' | 'a' if starts_with_ignore_case(&chars[i..], "a/p") => {
                tokens.push(FormatToken::AmPm { short: true });
                i += "a/p".len();
                continue;
            }
            'y' | 'Y' | 'm' | 'M' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' => {
                let lower = ch.to_ascii_lowercase();
                let mut j = i;
                while j < chars.len() && chars[j].to_ascii_lowercase() == lower {
                    j += 1;
                }
                let count = j - i;
                tokens.push(match lower {
                    'y' => FormatToken::Year(count),
                    'm' => FormatToken::Month(count),
                    'd' => FormatToken::Day(count),
                    'h' => FormatToken::Hour(count),
                    _ => FormatToken::Second(count),
                });
                i = j;
                continue;
            }
            other => push_literal(&mut tokens, &other.to_string()),
        }
        i += 1;
    }

    resolve_minutes(&mut tokens);
    tokens
}

fn starts_with_ignore_case(chars: &[char], word: &str) -> bool {
    let word: Vec<char> = word.chars().collect();
    chars.len() >= word.len()
        && chars
            .iter()
            .zip(&word)
            .all(|(a, b)| a.to_ascii_lowercase() == *b)
}

/// 連続するリテラルは1つにまとめる
fn push_literal(tokens: &mut Vec<FormatToken>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(FormatToken::Literal(last)) = tokens.last_mut() {
        last.push_str(text);
    } else {
        tokens.push(FormatToken::Literal(text.to_string()));
    }
}

/// 時の直後、または秒の直前にある`m`を分として扱う
fn resolve_minutes(tokens: &mut [FormatToken]) {
    let positions: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_datetime())
        .map(|(i, _)| i)
        .collect();

    for (k, &pos) in positions.iter().enumerate() {
        let FormatToken::Month(count) = tokens[pos] else {
            continue;
        };
        let after_hour = k > 0 && matches!(tokens[positions[k - 1]], FormatToken::Hour(_));
        let before_second = positions
            .get(k + 1)
            .is_some_and(|&next| matches!(tokens[next], FormatToken::Second(_)));
        if (after_hour || before_second) && count <= 2 {
            tokens[pos] = FormatToken::Minute(count);
        }
    }
}
