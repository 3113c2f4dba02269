//! sheetglaze - Pure-Rust spreadsheet-to-HTML renderer
//!
//! スプレッドシートの中間モデル（セル値・スタイル・結合・コメント・リンク・チャート）を、
//! テーマ付きで無害化済みのHTMLと、自己完結したSVGチャートに変換するクレートです。
//!
//! ファイル形式の読み込みは行いません。アダプターが`SheetBuilder`や
//! `SheetDocument::from_json`で中間モデルを構築し、`Converter`がHTMLを生成します。
//!
//! # Quick Start
//!
//! ```rust
//! use sheetglaze::{CellValue, ConverterBuilder, SheetBuilder, SheetDocument};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sheet = SheetBuilder::new("Sales")
//!         .with_row(0, ["Q", "Sales"])
//!         .with_row(1, [CellValue::from("Q1"), CellValue::from(100)])
//!         .with_row(2, [CellValue::from("Q2"), CellValue::from(150)])
//!         .build()?;
//!     let document = SheetDocument::single(sheet)?;
//!
//!     // Create a converter with default settings
//!     let converter = ConverterBuilder::new().build()?;
//!     let html = converter.convert_to_string(&document)?;
//!
//!     assert!(html.contains("<th"));
//!     assert!(html.contains(">150</td>"));
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust
//! use sheetglaze::{
//!     ChartKind, ChartSpec, ConverterBuilder, Quality, Series, SheetBuilder, SheetDocument,
//!     StyleMode, ThemeName,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let chart = ChartSpec::new(ChartKind::Column, "Quarterly")
//!         .with_series(Series::new("Sales", ["Q1", "Q2"], [100.0, 150.0]));
//!     let sheet = SheetBuilder::new("Sales")
//!         .with_row(0, ["Q", "Sales"])
//!         .with_chart(chart)
//!         .build()?;
//!
//!     let converter = ConverterBuilder::new()
//!         .with_theme(ThemeName::Dark)
//!         .with_style_mode(StyleMode::Class) // shared classes instead of inline styles
//!         .with_chart_quality(Quality::Medium)
//!         .table_only(true)
//!         .build()?;
//!
//!     let rendered = converter.render_document(&SheetDocument::single(sheet)?)?;
//!     assert!(rendered.html.contains("<svg"));
//!     assert!(!rendered.stylesheet.is_empty());
//!     Ok(())
//! }
//! ```
//!
//! # Writing to a File
//!
//! ```rust,no_run
//! use std::fs::File;
//! use sheetglaze::{ConverterBuilder, SheetDocument};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let json = std::fs::read_to_string("workbook.json")?;
//!     let document = SheetDocument::from_json(&json)?;
//!
//!     let converter = ConverterBuilder::new().build()?;
//!     let rendered = converter.convert(&document, File::create("workbook.html")?)?;
//!     for warning in rendered.warnings() {
//!         eprintln!("{}", warning);
//!     }
//!     Ok(())
//! }
//! ```

mod api;
mod builder;
mod chart;
mod conditional;
mod error;
mod formatter;
mod numfmt;
mod output;
mod resolve;
mod security;
mod sheet;
mod style;
mod theme;
mod types;

// 公開API
pub use api::{DateFormat, FormulaMode, StyleMode};
pub use builder::{ConversionConfig, Converter, ConverterBuilder};
pub use chart::{
    Canvas, ChartKind, ChartSpec, ChartStyle, ColorScheme, ComboPart, Drawing, Label, NiceScale,
    Paint, PathCommand, Point, Quality, Rect, Series, Shape, TextAnchor,
};
pub use conditional::{
    ComparisonOperator, ConditionalFormat, ConditionalRule, SheetStats, TextOperator,
};
pub use error::SheetGlazeError;
pub use output::{RenderedDocument, RenderedSheet, Warning, WarningKind};
pub use resolve::{class_name, style_declarations, ResolvedStyles};
pub use security::Limits;
pub use sheet::{Cell, DocumentBuilder, Extent, MergeLookup, Sheet, SheetBuilder, SheetDocument};
pub use style::{
    Border, BorderEdge, BorderKind, Color, Font, FontSize, HAlign, Style, StyleId, StyleTable,
    VAlign,
};
pub use theme::{Declarations, Theme, ThemeName};
pub use types::{CellCoord, CellValue, Comment, Hyperlink, MergeRange};
