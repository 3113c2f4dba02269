//! Drawing Tree Module
//!
//! チャートの描画結果を表す宣言的な図形ツリーと、そのSVGへの直列化。
//!
//! 幾何計算は図形ツリーまでで完結し、座標の小数桁（品質設定）は
//! 直列化の時点でのみ適用されます。

use std::fmt::Write as _;

use super::layout::{Point, Rect};
use crate::output::escape_html;

/// 塗りと線
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paint {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
    /// 破線パターン（例: `4 3`）
    pub dash: Option<&'static str>,
}

impl Paint {
    /// 塗りのみ
    pub fn fill(color: &str) -> Self {
        Self {
            fill: Some(color.to_string()),
            ..Default::default()
        }
    }

    /// 線のみ（塗りなし）
    pub fn stroke(color: &str, width: f64) -> Self {
        Self {
            fill: Some("none".to_string()),
            stroke: Some(color.to_string()),
            stroke_width: Some(width),
            ..Default::default()
        }
    }

    pub fn with_stroke(mut self, color: &str, width: f64) -> Self {
        self.stroke = Some(color.to_string());
        self.stroke_width = Some(width);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn dashed(mut self, pattern: &'static str) -> Self {
        self.dash = Some(pattern);
        self
    }
}

/// テキストの配置基準
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

impl TextAnchor {
    fn as_svg(&self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// テキスト図形
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub at: Point,
    pub text: String,
    pub anchor: TextAnchor,
    pub size: f64,
    pub bold: bool,
    pub fill: String,
    /// 配置点を中心とした回転角（度）
    pub rotate: Option<f64>,
}

impl Label {
    pub fn new(at: Point, text: impl Into<String>, size: f64) -> Self {
        Self {
            at,
            text: text.into(),
            anchor: TextAnchor::Start,
            size,
            bold: false,
            fill: "#333333".to_string(),
            rotate: None,
        }
    }

    pub fn anchored(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn colored(mut self, fill: &str) -> Self {
        self.fill = fill.to_string();
        self
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotate = Some(degrees);
        self
    }
}

/// パスの描画命令
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// 楕円弧（SVGの`A`命令）
    Arc {
        radius: f64,
        large_arc: bool,
        clockwise: bool,
        to: Point,
    },
    Close,
}

/// 図形
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        rect: Rect,
        paint: Paint,
        tooltip: Option<String>,
    },
    Line {
        from: Point,
        to: Point,
        paint: Paint,
    },
    Path {
        commands: Vec<PathCommand>,
        paint: Paint,
        tooltip: Option<String>,
    },
    Circle {
        center: Point,
        radius: f64,
        paint: Paint,
        tooltip: Option<String>,
    },
    Text(Label),
    /// 名前付きのまとまり（`<g class="...">`）
    Group {
        class: &'static str,
        children: Vec<Shape>,
    },
}

impl Shape {
    pub fn group(class: &'static str, children: Vec<Shape>) -> Self {
        Shape::Group { class, children }
    }
}

/// チャート1枚分の図形ツリー
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    pub width: u32,
    pub height: u32,
    /// アクセシビリティ用の説明（チャートのタイトル）
    pub title: String,
    pub shapes: Vec<Shape>,
}

impl Drawing {
    /// 指定クラスのグループの子図形（最初に見つかったもの）
    pub fn group(&self, class: &str) -> Option<&[Shape]> {
        fn find<'a>(shapes: &'a [Shape], class: &str) -> Option<&'a [Shape]> {
            shapes.iter().find_map(|shape| match shape {
                Shape::Group { class: c, children } if *c == class => Some(children.as_slice()),
                Shape::Group { children, .. } => find(children, class),
                _ => None,
            })
        }
        find(&self.shapes, class)
    }

    /// SVG文字列に直列化する
    ///
    /// # 引数
    ///
    /// * `precision` - 座標の小数桁数
    pub fn to_svg(&self, precision: usize) -> String {
        let mut writer = SvgWriter {
            out: String::new(),
            precision,
        };
        writer.open_root(self);
        for shape in &self.shapes {
            writer.shape(shape);
        }
        writer.out.push_str("</svg>");
        writer.out
    }
}

struct SvgWriter {
    out: String,
    precision: usize,
}

impl SvgWriter {
    fn num(&self, value: f64) -> String {
        format_number(value, self.precision)
    }

    fn open_root(&mut self, drawing: &Drawing) {
        let _ = write!(
            self.out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" class=\"sg-chart\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" role=\"img\" aria-label=\"{}\" font-family=\"Arial, sans-serif\">",
            escape_html(&drawing.title),
            w = drawing.width,
            h = drawing.height,
        );
        let _ = write!(
            self.out,
            "<rect width=\"{}\" height=\"{}\" fill=\"#ffffff\"/>",
            drawing.width, drawing.height
        );
    }

    fn paint(&mut self, paint: &Paint) {
        if let Some(fill) = &paint.fill {
            let _ = write!(self.out, " fill=\"{}\"", escape_html(fill));
        }
        if let Some(stroke) = &paint.stroke {
            let _ = write!(self.out, " stroke=\"{}\"", escape_html(stroke));
        }
        if let Some(width) = paint.stroke_width {
            let width = self.num(width);
            let _ = write!(self.out, " stroke-width=\"{}\"", width);
        }
        if let Some(opacity) = paint.opacity {
            let _ = write!(self.out, " opacity=\"{}\"", format_number(opacity, 2));
        }
        if let Some(dash) = paint.dash {
            let _ = write!(self.out, " stroke-dasharray=\"{}\"", dash);
        }
    }

    /// ツールチップがあれば子要素`<title>`として閉じ、なければ自己終了する
    fn close(&mut self, tag: &str, tooltip: Option<&String>) {
        match tooltip {
            Some(text) => {
                let _ = write!(self.out, "><title>{}</title></{}>", escape_html(text), tag);
            }
            None => self.out.push_str("/>"),
        }
    }

    fn shape(&mut self, shape: &Shape) {
        match shape {
            Shape::Rect {
                rect,
                paint,
                tooltip,
            } => {
                let (x, y, w, h) = (
                    self.num(rect.x),
                    self.num(rect.y),
                    self.num(rect.width),
                    self.num(rect.height),
                );
                let _ = write!(
                    self.out,
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
                    x, y, w, h
                );
                self.paint(paint);
                self.close("rect", tooltip.as_ref());
            }
            Shape::Line { from, to, paint } => {
                let (x1, y1, x2, y2) = (
                    self.num(from.x),
                    self.num(from.y),
                    self.num(to.x),
                    self.num(to.y),
                );
                let _ = write!(
                    self.out,
                    "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"",
                    x1, y1, x2, y2
                );
                self.paint(paint);
                self.out.push_str("/>");
            }
            Shape::Path {
                commands,
                paint,
                tooltip,
            } => {
                let d = self.path_data(commands);
                let _ = write!(self.out, "<path d=\"{}\"", d);
                self.paint(paint);
                self.close("path", tooltip.as_ref());
            }
            Shape::Circle {
                center,
                radius,
                paint,
                tooltip,
            } => {
                let (cx, cy, r) = (self.num(center.x), self.num(center.y), self.num(*radius));
                let _ = write!(self.out, "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"", cx, cy, r);
                self.paint(paint);
                self.close("circle", tooltip.as_ref());
            }
            Shape::Text(label) => self.text(label),
            Shape::Group { class, children } => {
                let _ = write!(self.out, "<g class=\"{}\">", class);
                for child in children {
                    self.shape(child);
                }
                self.out.push_str("</g>");
            }
        }
    }

    fn text(&mut self, label: &Label) {
        let (x, y) = (self.num(label.at.x), self.num(label.at.y));
        let _ = write!(
            self.out,
            "<text x=\"{}\" y=\"{}\" text-anchor=\"{}\" font-size=\"{}\" fill=\"{}\"",
            x,
            y,
            label.anchor.as_svg(),
            format_number(label.size, 1),
            escape_html(&label.fill)
        );
        if label.bold {
            self.out.push_str(" font-weight=\"bold\"");
        }
        if let Some(angle) = label.rotate {
            let _ = write!(
                self.out,
                " transform=\"rotate({} {} {})\"",
                format_number(angle, 1),
                x,
                y
            );
        }
        let _ = write!(self.out, ">{}</text>", escape_html(&label.text));
    }

    fn path_data(&self, commands: &[PathCommand]) -> String {
        let mut d = String::new();
        for command in commands {
            if !d.is_empty() {
                d.push(' ');
            }
            match command {
                PathCommand::MoveTo(p) => {
                    let _ = write!(d, "M {} {}", self.num(p.x), self.num(p.y));
                }
                PathCommand::LineTo(p) => {
                    let _ = write!(d, "L {} {}", self.num(p.x), self.num(p.y));
                }
                PathCommand::Arc {
                    radius,
                    large_arc,
                    clockwise,
                    to,
                } => {
                    let r = self.num(*radius);
                    let _ = write!(
                        d,
                        "A {} {} 0 {} {} {} {}",
                        r,
                        r,
                        u8::from(*large_arc),
                        u8::from(*clockwise),
                        self.num(to.x),
                        self.num(to.y)
                    );
                }
                PathCommand::Close => d.push('Z'),
            }
        }
        d
    }
}

/// 小数`precision`桁で丸め、末尾の0と`-0`を取り除く
pub(crate) fn format_number(value: f64, precision: usize) -> String {
    let mut s = format!("{:.*}", precision, value);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}
