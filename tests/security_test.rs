//! Security Tests
//!
//! 出力の無害化を検証します。
//! セルテキスト・シート名・コメントのエスケープ、リンクのスキーム許可リスト、
//! スタイル宣言からの脱出を扱います。

use sheetglaze::{
    ChartKind, ChartSpec, Comment, ConverterBuilder, Declarations, Hyperlink, Series,
    SheetBuilder, SheetDocument, Theme, WarningKind,
};

fn render(sheet: SheetBuilder) -> sheetglaze::RenderedDocument {
    let document = SheetDocument::single(sheet.build().unwrap()).unwrap();
    ConverterBuilder::new()
        .build()
        .unwrap()
        .render_document(&document)
        .unwrap()
}

/// スクリプトを含むセルテキストはエスケープされる
#[test]
fn test_script_in_cell_is_escaped() {
    let rendered = render(
        SheetBuilder::new("Data")
            .with_text(0, 0, "<script>alert('x')</script>")
            .with_text(1, 0, "Tom & \"Jerry\""),
    );
    let html = &rendered.html;

    assert!(!html.contains("<script"));
    assert!(html.contains("&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;"));
    assert!(html.contains("Tom &amp; &quot;Jerry&quot;"));
}

/// シート名は見出しと属性の両方でエスケープされる
#[test]
fn test_sheet_name_is_escaped() {
    let rendered = render(SheetBuilder::new("\"><img src=x onerror=alert(1)>").with_text(0, 0, "x"));
    let html = &rendered.html;

    assert!(!html.contains("<img"));
    assert!(html.contains("data-sheet=\"&quot;&gt;&lt;img src=x onerror=alert(1)&gt;\""));
}

/// 許可されないスキームのリンクは削除され、警告が記録される
#[test]
fn test_disallowed_link_schemes_are_dropped() {
    let targets = [
        "javascript:alert(1)",
        "JavaScript:alert(1)",
        "data:text/html;base64,PHNjcmlwdD4=",
        "vbscript:msgbox",
        "file:///etc/passwd",
        "not a url",
    ];
    let mut builder = SheetBuilder::new("Links");
    for (row, target) in targets.iter().enumerate() {
        builder = builder
            .with_text(row as u32, 0, &format!("link{}", row))
            .with_hyperlink(row as u32, 0, Hyperlink::new(*target, None));
    }
    let rendered = render(builder);

    assert!(!rendered.html.contains("<a "));
    assert!(!rendered.html.to_ascii_lowercase().contains("javascript:"));
    assert!(!rendered.html.contains("data:text"));
    for row in 0..targets.len() {
        assert!(rendered.html.contains(&format!(">link{}</", row)));
    }

    let warnings: Vec<_> = rendered.warnings().collect();
    assert_eq!(warnings.len(), targets.len());
    assert!(warnings.iter().all(|w| w.kind == WarningKind::DroppedHyperlink));
    assert_eq!(warnings[0].location, "A1");
}

/// 許可されたスキームのリンクは安全な属性付きで出力される
#[test]
fn test_allowed_links_are_kept() {
    let rendered = render(
        SheetBuilder::new("Links")
            .with_text(0, 0, "site")
            .with_hyperlink(0, 0, Hyperlink::new("https://example.com/a?b=1&c=\"2\"", None))
            .with_text(1, 0, "mail")
            .with_hyperlink(1, 0, Hyperlink::new("mailto:team@example.com", None)),
    );
    let html = &rendered.html;

    assert_eq!(html.matches("rel=\"noopener noreferrer\"").count(), 2);
    assert!(html.contains("href=\"mailto:team@example.com\""));
    // 属性値に生の引用符は残らない
    assert!(html.contains("href=\"https://example.com/a?b=1&amp;c=%222%22\""));
    assert_eq!(rendered.warnings().count(), 0);
}

/// コメントは属性にのみ出力され、スクリプトは生成されない
#[test]
fn test_comment_cannot_inject_markup() {
    let rendered = render(
        SheetBuilder::new("Notes").with_text(0, 0, "cell").with_comment(
            0,
            0,
            Comment::new(
                Some("\" onmouseover=\"alert(1)".to_string()),
                "</td><script>alert(1)</script>",
            ),
        ),
    );
    let html = &rendered.html;

    assert!(!html.contains("<script"));
    assert!(!html.contains("onmouseover=\"alert"));
    assert!(html.contains("data-comment-author=\"&quot; onmouseover=&quot;alert(1)\""));
    assert!(html.contains("title=\"&lt;/td&gt;&lt;script&gt;alert(1)&lt;/script&gt;\""));
}

/// テーマの宣言から`<style>`要素を抜け出せない
#[test]
fn test_theme_declarations_cannot_close_style_element() {
    let theme = Theme::new(
        "margin: 0 } </style><script>alert(1)</script><style> body {",
        "width: 100%",
        "padding: 4px; color: red\"><script>",
        "font-weight: bold",
    );
    let sheet = SheetBuilder::new("S").with_text(0, 0, "x").with_text(1, 0, "y");
    let document = SheetDocument::single(sheet.build().unwrap()).unwrap();
    let html = ConverterBuilder::new()
        .with_custom_theme(theme)
        .build()
        .unwrap()
        .convert_to_string(&document)
        .unwrap();

    assert!(!html.contains("<script"));
    assert_eq!(html.matches("</style>").count(), 1);
}

/// 宣言の解析は危険な文字を取り除く
#[test]
fn test_declarations_strip_markup() {
    let decls = Declarations::parse("color: red</style><b>; background: url(javascript:x)");
    let css = decls.to_css();
    assert!(!css.contains('<'));
    assert!(!css.contains('>'));
}

/// チャートのタイトル・系列名・カテゴリはSVG内でエスケープされる
#[test]
fn test_chart_text_is_escaped() {
    let chart = ChartSpec::new(ChartKind::Column, "<script>alert(1)</script>").with_series(
        Series::new("<b>series</b>", ["<i>cat</i>", "a&b"], [1.0, 2.0]),
    );
    let rendered = render(SheetBuilder::new("Charts").with_text(0, 0, "x").with_chart(chart));
    let html = &rendered.html;

    assert!(html.contains("<svg"));
    assert!(!html.contains("<script"));
    assert!(!html.contains("<b>series"));
    assert!(!html.contains("<i>cat"));
    assert!(html.contains("a&amp;b"));
}
