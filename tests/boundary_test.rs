//! Boundary Tests for sheetglaze
//!
//! 空のシート、末尾の空セル、上限、極端な値などの境界条件を検証します。

use sheetglaze::{
    CellCoord, CellValue, Comment, ConverterBuilder, DocumentBuilder, Hyperlink, Limits,
    SheetBuilder, SheetDocument, SheetGlazeError, StyleId, WarningKind,
};

fn table_only(document: &SheetDocument) -> String {
    ConverterBuilder::new()
        .table_only(true)
        .build()
        .unwrap()
        .convert_to_string(document)
        .unwrap()
}

/// セルのないシートは空の表になる
#[test]
fn test_empty_sheet() {
    let sheet = SheetBuilder::new("Empty").build().unwrap();
    assert!(sheet.used_extent().is_empty());

    let html = table_only(&SheetDocument::single(sheet).unwrap());
    assert!(html.starts_with("<table class=\"sg-sheet\""));
    assert!(html.ends_with("</table>"));
    assert!(!html.contains("<tr>"));
}

/// シートのないドキュメントも文書として出力できる
#[test]
fn test_document_without_sheets() {
    let document = DocumentBuilder::new().build().unwrap();
    let html = ConverterBuilder::new()
        .build()
        .unwrap()
        .convert_to_string(&document)
        .unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(!html.contains("<section"));
}

/// 末尾の空セルは出力範囲に含まれない
#[test]
fn test_trailing_empty_cells_are_trimmed() {
    let sheet = SheetBuilder::new("Trailing")
        .with_text(0, 0, "a")
        .with_text(1, 1, "b")
        .with_value(5, 7, CellValue::Empty)
        .with_value(2, 3, "")
        .build()
        .unwrap();
    assert_eq!(sheet.used_extent().rows, 2);
    assert_eq!(sheet.used_extent().cols, 2);

    let html = table_only(&SheetDocument::single(sheet).unwrap());
    assert_eq!(html.matches("<tr>").count(), 2);
    assert_eq!(html.matches("<td").count() + html.matches("<th").count(), 4);
}

/// 結合範囲とハイパーリンクは空でも出力範囲を広げる
#[test]
fn test_merge_and_link_extend_extent() {
    let sheet = SheetBuilder::new("Extent")
        .with_text(0, 0, "x")
        .with_merge((2, 0), (3, 1))
        .with_hyperlink(0, 4, Hyperlink::new("https://example.com", Some("site".to_string())))
        .build()
        .unwrap();
    assert_eq!(sheet.used_extent().rows, 4);
    assert_eq!(sheet.used_extent().cols, 5);
}

/// 出力範囲外の空セルのコメントは範囲を広げず、警告として報告される
#[test]
fn test_trailing_comment_is_reported() {
    let sheet = SheetBuilder::new("Notes")
        .with_text(0, 0, "a")
        .with_comment(3, 2, Comment::new(Some("Kim".to_string()), "late note"))
        .build()
        .unwrap();
    assert_eq!(sheet.used_extent().rows, 1);

    let rendered = ConverterBuilder::new()
        .table_only(true)
        .build()
        .unwrap()
        .render_document(&SheetDocument::single(sheet).unwrap())
        .unwrap();
    assert!(!rendered.html.contains("late note"));

    let warnings: Vec<_> = rendered.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, WarningKind::DroppedComment);
    assert_eq!(warnings[0].location, "C4");
    assert_eq!(warnings[0].sheet, "Notes");
}

/// 上限を超えるシートは切り詰めずにエラーになる
#[test]
fn test_converter_limits() {
    let sheet = SheetBuilder::new("Wide")
        .with_text(0, 0, "a")
        .with_text(0, 20, "b")
        .build()
        .unwrap();
    let document = SheetDocument::single(sheet).unwrap();

    let result = ConverterBuilder::new()
        .with_limits(100, 20)
        .build()
        .unwrap()
        .render_document(&document);
    match result {
        Err(SheetGlazeError::Validation { sheet, message }) => {
            assert_eq!(sheet, "Wide");
            assert!(message.contains("max_cols"));
        }
        other => panic!("Expected Validation error, got {:?}", other),
    }

    // ちょうど上限に収まる場合は成功する
    assert!(ConverterBuilder::new()
        .with_limits(1, 21)
        .build()
        .unwrap()
        .render_document(&document)
        .is_ok());
}

/// 構築時の上限も検証される
#[test]
fn test_builder_limits() {
    let limits = Limits::new(10, 10);
    assert!(limits.contains(9, 9));
    assert!(!limits.contains(10, 0));

    let result = SheetBuilder::new("Small")
        .with_limits(limits)
        .with_text(10, 0, "outside")
        .build();
    assert!(matches!(result, Err(SheetGlazeError::Validation { .. })));

    let result = SheetBuilder::new("Small")
        .with_limits(limits)
        .with_merge((8, 8), (8, 12))
        .build();
    assert!(matches!(result, Err(SheetGlazeError::Validation { .. })));
}

/// モデルの不変条件違反は検証エラーになる
#[test]
fn test_model_invariants() {
    let duplicate = SheetBuilder::new("Dup")
        .with_text(0, 0, "a")
        .with_text(0, 0, "b")
        .build();
    assert!(matches!(duplicate, Err(SheetGlazeError::Validation { .. })));

    let overlap = SheetBuilder::new("Overlap")
        .with_merge((0, 0), (1, 1))
        .with_merge((1, 1), (2, 2))
        .build();
    assert!(matches!(overlap, Err(SheetGlazeError::Validation { .. })));

    let inverted = SheetBuilder::new("Inverted").with_merge((2, 2), (0, 0)).build();
    assert!(matches!(inverted, Err(SheetGlazeError::Validation { .. })));

    let unnamed = SheetBuilder::new("  ").build();
    assert!(matches!(unnamed, Err(SheetGlazeError::Validation { .. })));

    let sheet = SheetBuilder::new("Styled")
        .with_cell(0, 0, "x", StyleId(3))
        .build()
        .unwrap();
    let unknown_style = DocumentBuilder::new().with_sheet(sheet).build();
    match unknown_style {
        Err(SheetGlazeError::Validation { message, .. }) => {
            assert!(message.contains("unknown style id 3"))
        }
        other => panic!("Expected Validation error, got {:?}", other),
    }
}

/// 極端な数値
#[test]
fn test_extreme_numbers() {
    let sheet = SheetBuilder::new("Numbers")
        .with_text(0, 0, "value")
        .with_value(1, 0, f64::NAN)
        .with_value(2, 0, f64::INFINITY)
        .with_value(3, 0, -0.0)
        .with_value(4, 0, 0.1 + 0.2)
        .with_value(5, 0, 123456789012.0)
        .build()
        .unwrap();
    let html = table_only(&SheetDocument::single(sheet).unwrap());

    assert_eq!(html.matches(">#NUM!</td>").count(), 2);
    assert!(html.contains(">0</td>"));
    assert!(html.contains(">0.3</td>"));
    assert!(html.contains(">123456789012</td>"));
}

/// 非ASCIIのシート名とテキストはそのまま出力される
#[test]
fn test_unicode_content() {
    let sheet = SheetBuilder::new("売上")
        .with_row(0, ["四半期", "売上"])
        .with_row(1, ["第1四半期", "😀"])
        .build()
        .unwrap();
    let html = ConverterBuilder::new()
        .build()
        .unwrap()
        .convert_to_string(&SheetDocument::single(sheet).unwrap())
        .unwrap();

    assert!(html.contains("<h2>売上</h2>"));
    assert!(html.contains(">第1四半期</td>"));
    assert!(html.contains(">😀</td>"));
}

/// 大きめのシートも行優先で欠けなく出力される
#[test]
fn test_many_rows() {
    let mut builder = SheetBuilder::new("Large");
    for row in 0..2000u32 {
        builder = builder.with_row(row, (0..10).map(|col| CellValue::from(f64::from(row * 10 + col))));
    }
    let sheet = builder.build().unwrap();
    let document = SheetDocument::single(sheet).unwrap();
    let html = table_only(&document);

    assert_eq!(html.matches("<tr>").count(), 2000);
    assert_eq!(html.matches("<td").count(), 1999 * 10);
    assert!(html.contains(">19999</td>"));

    let last = document.sheets()[0].value_at(CellCoord::new(1999, 9));
    assert_eq!(last, Some(&CellValue::Number(19999.0)));
}
