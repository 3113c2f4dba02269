//! Cartesian Charts
//!
//! 縦棒・横棒・折れ線・面・散布図・バブル・組み合わせチャートの幾何計算。

use super::drawing::{Label, Paint, PathCommand, Shape, TextAnchor};
use super::layout::{fit_category_labels, truncate_columns, Point, Rect, AXIS_FONT_SIZE, MARGIN_LEFT};
use super::scale::NiceScale;
use super::{ChartKind, ComboPart, Frame, Series};
use crate::formatter::default_number;

/// 第2軸ラベルのために凡例をずらす幅（px）
pub(crate) const SECONDARY_AXIS_WIDTH: f64 = 40.0;

const GRID_COLOR: &str = "#e0e0e0";
const MINOR_GRID_COLOR: &str = "#f2f2f2";
const AXIS_COLOR: &str = "#333333";
const LABEL_COLOR: &str = "#666666";

/// カテゴリ帯のうち棒が占める割合
const BAND_FILL: f64 = 0.8;
const MARKER_RADIUS: f64 = 4.0;
const LINE_WIDTH: f64 = 2.5;
const MAX_BUBBLE_RADIUS: f64 = 30.0;

/// 値軸の向き
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    /// 値が縦方向（縦棒、折れ線など）
    Vertical,
    /// 値が横方向（横棒）
    Horizontal,
}

/// 値軸の位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

pub(crate) fn layout(frame: &Frame) -> Result<Vec<Shape>, String> {
    match frame.spec.kind {
        ChartKind::Bar => bar_chart(frame),
        ChartKind::Scatter | ChartKind::Bubble => point_chart(frame),
        ChartKind::Combo => combo_chart(frame),
        _ => category_chart(frame),
    }
}

/// 縦棒・折れ線・面
fn category_chart(frame: &Frame) -> Result<Vec<Shape>, String> {
    let categories = frame.categories();
    let all: Vec<(usize, &Series)> = frame.spec.series.iter().enumerate().collect();
    let scale = value_scale(frame, &all, frame.spec.kind.requires_zero_baseline(), true)?;

    let mut shapes = vec![
        value_grid(frame, &scale, Orientation::Vertical),
        axes(frame, &scale, Side::Left, Orientation::Vertical, categories),
    ];
    shapes.push(match frame.spec.kind {
        ChartKind::Line => Shape::group("lines", lines(frame, &all, &scale, categories.len())),
        ChartKind::Area => Shape::group("areas", areas(frame, &all, &scale, categories.len())),
        _ => Shape::group("columns", columns(frame, &all, &[&scale], categories.len())),
    });
    shapes.extend(axis_titles(frame));
    Ok(shapes)
}

/// 横棒
fn bar_chart(frame: &Frame) -> Result<Vec<Shape>, String> {
    let plot = frame.plot;
    let categories = frame.categories();
    let all: Vec<(usize, &Series)> = frame.spec.series.iter().enumerate().collect();
    let scale = value_scale(frame, &all, true, true)?;

    let n = categories.len().max(1);
    let band = plot.height / n as f64;
    let group = band * BAND_FILL;
    let bar = group / all.len().max(1) as f64;
    let baseline = scale.map(scale.clamp(0.0), plot.x, plot.right());

    let mut bars = Vec::new();
    for (slot, (index, series)) in all.iter().enumerate() {
        for (i, value) in series.values.iter().enumerate() {
            if !value.is_finite() {
                continue;
            }
            let x = scale.map(scale.clamp(*value), plot.x, plot.right());
            let y = plot.y + i as f64 * band + (band - group) / 2.0 + slot as f64 * bar;
            bars.push(Shape::Rect {
                rect: Rect::new(x.min(baseline), y, (x - baseline).abs(), bar),
                paint: Paint::fill(frame.color(*index)).with_opacity(0.9),
                tooltip: Some(tooltip(series, i, *value)),
            });
        }
    }

    let mut shapes = vec![
        value_grid(frame, &scale, Orientation::Horizontal),
        axes(frame, &scale, Side::Left, Orientation::Horizontal, categories),
        Shape::group("bars", bars),
    ];
    shapes.extend(axis_titles(frame));
    Ok(shapes)
}

/// 縦棒（主軸）と折れ線、第2軸
fn combo_chart(frame: &Frame) -> Result<Vec<Shape>, String> {
    let categories = frame.categories();
    let indexed: Vec<(usize, &Series)> = frame.spec.series.iter().enumerate().collect();
    let (secondary, primary): (Vec<_>, Vec<_>) =
        indexed.iter().copied().partition(|(_, s)| s.secondary_axis);

    let primary_scale = value_scale(frame, &primary, has_columns(&primary), true)?;
    let secondary_scale = if secondary.is_empty() {
        None
    } else {
        Some(value_scale(frame, &secondary, has_columns(&secondary), false)?)
    };

    let (line_series, column_series): (Vec<_>, Vec<_>) = indexed
        .iter()
        .copied()
        .partition(|(_, s)| s.combo == Some(ComboPart::Line));
    let column_scales: Vec<&NiceScale> = column_series
        .iter()
        .map(|(_, s)| axis_of(s, &primary_scale, secondary_scale.as_ref()))
        .collect();

    let mut shapes = vec![
        value_grid(frame, &primary_scale, Orientation::Vertical),
        axes(frame, &primary_scale, Side::Left, Orientation::Vertical, categories),
    ];
    if let Some(scale) = &secondary_scale {
        shapes.push(Shape::group(
            "secondary-axis",
            value_labels(frame, scale, Side::Right, Orientation::Vertical),
        ));
    }
    shapes.push(Shape::group(
        "columns",
        columns(frame, &column_series, &column_scales, categories.len()),
    ));

    let mut line_shapes = Vec::new();
    for entry in &line_series {
        let scale = axis_of(entry.1, &primary_scale, secondary_scale.as_ref());
        line_shapes.extend(lines(frame, &[*entry], scale, categories.len()));
    }
    shapes.push(Shape::group("lines", line_shapes));
    shapes.extend(axis_titles(frame));
    Ok(shapes)
}

/// 縦棒として描く系列を含むか
fn has_columns(series: &[(usize, &Series)]) -> bool {
    series.iter().any(|(_, s)| s.combo != Some(ComboPart::Line))
}

/// 系列が使う値軸
fn axis_of<'s>(series: &Series, primary: &'s NiceScale, secondary: Option<&'s NiceScale>) -> &'s NiceScale {
    match secondary {
        Some(scale) if series.secondary_axis => scale,
        _ => primary,
    }
}

/// 散布図・バブル
fn point_chart(frame: &Frame) -> Result<Vec<Shape>, String> {
    let plot = frame.plot;
    let bubble = frame.spec.kind == ChartKind::Bubble;

    let xs: Vec<Vec<f64>> = frame.spec.series.iter().map(x_values).collect();
    let (x_lo, x_hi) = bounds(xs.iter().flatten().copied()).unwrap_or((0.0, 1.0));
    let x_scale = NiceScale::new(x_lo, x_hi).ok_or_else(|| too_wide(x_lo, x_hi))?;
    let all: Vec<(usize, &Series)> = frame.spec.series.iter().enumerate().collect();
    let y_scale = value_scale(frame, &all, false, true)?;

    let max_size = if bubble {
        let mut max = 0.0f64;
        for series in &frame.spec.series {
            for size in series.sizes.iter().flatten() {
                if *size < 0.0 {
                    return Err(format!("negative bubble size {} in series '{}'", size, series.name));
                }
                if size.is_finite() {
                    max = max.max(*size);
                }
            }
        }
        if frame.spec.series.iter().all(|s| s.sizes.is_none()) {
            1.0
        } else {
            max
        }
    } else {
        0.0
    };
    let max_radius = MAX_BUBBLE_RADIUS.min(plot.width.min(plot.height) / 8.0);

    let mut points = Vec::new();
    for ((index, series), x_row) in all.iter().zip(&xs) {
        for (i, (value, x)) in series.values.iter().zip(x_row).enumerate() {
            if !value.is_finite() {
                continue;
            }
            let center = Point::new(
                x_scale.map(*x, plot.x, plot.right()),
                y_scale.map(y_scale.clamp(*value), plot.bottom(), plot.y),
            );
            let radius = if bubble {
                let size = series.sizes.as_ref().map_or(1.0, |sizes| sizes[i]);
                if !size.is_finite() || max_size <= 0.0 {
                    continue;
                }
                // 面積が大きさに比例する
                max_radius * (size / max_size).sqrt()
            } else {
                MARKER_RADIUS
            };
            if radius <= 0.0 {
                continue;
            }
            let paint = if bubble {
                Paint::fill(frame.color(*index))
                    .with_opacity(0.6)
                    .with_stroke("#ffffff", 1.0)
            } else {
                Paint::fill(frame.color(*index))
            };
            points.push(Shape::Circle {
                center,
                radius,
                paint,
                tooltip: Some(format!(
                    "{}: ({}, {})",
                    series.name,
                    default_number(*x),
                    default_number(*value)
                )),
            });
        }
    }

    let mut grid = grid_lines(frame, &y_scale, Orientation::Vertical);
    grid.extend(grid_lines(frame, &x_scale, Orientation::Horizontal));

    let mut axis = axis_lines(frame);
    axis.extend(value_labels(frame, &y_scale, Side::Left, Orientation::Vertical));
    for tick in x_scale.ticks() {
        let x = x_scale.map(tick, plot.x, plot.right());
        axis.push(axis_label(Point::new(x, plot.bottom() + 20.0), x_scale.label(tick), TextAnchor::Middle));
    }

    let mut shapes = vec![
        Shape::group("grid", grid),
        Shape::group("axes", axis),
        Shape::group(if bubble { "bubbles" } else { "points" }, points),
    ];
    shapes.extend(axis_titles(frame));
    Ok(shapes)
}

/// 散布図のx値（カテゴリがすべて数値ならその値、そうでなければ1始まりの連番）
fn x_values(series: &Series) -> Vec<f64> {
    let parsed: Option<Vec<f64>> = series
        .categories
        .iter()
        .map(|c| c.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect();
    parsed.unwrap_or_else(|| (1..=series.values.len()).map(|i| i as f64).collect())
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// 系列群の値軸スケール（`allow_fixed`のとき`value_range`を優先）
fn value_scale(
    frame: &Frame,
    series: &[(usize, &Series)],
    zero_baseline: bool,
    allow_fixed: bool,
) -> Result<NiceScale, String> {
    if let (true, Some((lo, hi))) = (allow_fixed, frame.spec.value_range) {
        return NiceScale::fixed(lo, hi).ok_or_else(|| too_wide(lo, hi));
    }
    let (mut lo, mut hi) =
        bounds(series.iter().flat_map(|(_, s)| s.finite_values())).unwrap_or((0.0, 1.0));
    if zero_baseline {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    NiceScale::new(lo, hi).ok_or_else(|| too_wide(lo, hi))
}

/// 目盛りを有限の値で表せない範囲
pub(crate) fn too_wide(lo: f64, hi: f64) -> String {
    format!("value range [{}, {}] is too wide to draw an axis", lo, hi)
}

fn tooltip(series: &Series, index: usize, value: f64) -> String {
    match series.categories.get(index) {
        Some(category) => format!("{} - {}: {}", series.name, category, default_number(value)),
        None => format!("{}: {}", series.name, default_number(value)),
    }
}

/// カテゴリ帯の中心（x座標）
fn band_center(frame: &Frame, count: usize, index: usize) -> f64 {
    let band = frame.plot.width / count.max(1) as f64;
    frame.plot.x + (index as f64 + 0.5) * band
}

/// 縦棒（`scales[k]`は`series[k]`の値軸）
fn columns(frame: &Frame, series: &[(usize, &Series)], scales: &[&NiceScale], count: usize) -> Vec<Shape> {
    let plot = frame.plot;
    let band = plot.width / count.max(1) as f64;
    let group = band * BAND_FILL;
    let width = group / series.len().max(1) as f64;

    let mut shapes = Vec::new();
    for (slot, (index, s)) in series.iter().enumerate() {
        let Some(scale) = scales.get(slot).or_else(|| scales.first()) else {
            continue;
        };
        let baseline = scale.map(scale.clamp(0.0), plot.bottom(), plot.y);
        for (i, value) in s.values.iter().enumerate() {
            if !value.is_finite() {
                continue;
            }
            let x = plot.x + i as f64 * band + (band - group) / 2.0 + slot as f64 * width;
            let y = scale.map(scale.clamp(*value), plot.bottom(), plot.y);
            shapes.push(Shape::Rect {
                rect: Rect::new(x, y.min(baseline), width, (y - baseline).abs()),
                paint: Paint::fill(frame.color(*index)).with_opacity(0.9),
                tooltip: Some(tooltip(s, i, *value)),
            });
        }
    }
    shapes
}

/// 系列の点列（非有限値の位置で線を切る）
fn polyline(frame: &Frame, series: &Series, scale: &NiceScale, count: usize) -> (Vec<PathCommand>, Vec<(usize, Point)>) {
    let plot = frame.plot;
    let mut commands = Vec::new();
    let mut points = Vec::new();
    let mut pen_down = false;
    for (i, value) in series.values.iter().enumerate() {
        if !value.is_finite() {
            pen_down = false;
            continue;
        }
        let p = Point::new(
            band_center(frame, count, i),
            scale.map(scale.clamp(*value), plot.bottom(), plot.y),
        );
        commands.push(if pen_down {
            PathCommand::LineTo(p)
        } else {
            PathCommand::MoveTo(p)
        });
        pen_down = true;
        points.push((i, p));
    }
    (commands, points)
}

fn lines(frame: &Frame, series: &[(usize, &Series)], scale: &NiceScale, count: usize) -> Vec<Shape> {
    let mut shapes = Vec::new();
    for (index, s) in series {
        let color = frame.color(*index);
        let (commands, points) = polyline(frame, s, scale, count);
        shapes.push(Shape::Path {
            commands,
            paint: Paint::stroke(color, LINE_WIDTH),
            tooltip: None,
        });
        for (i, center) in points {
            shapes.push(Shape::Circle {
                center,
                radius: MARKER_RADIUS,
                paint: Paint::fill(color).with_stroke("#ffffff", 2.0),
                tooltip: Some(tooltip(s, i, s.values[i])),
            });
        }
    }
    shapes
}

fn areas(frame: &Frame, series: &[(usize, &Series)], scale: &NiceScale, count: usize) -> Vec<Shape> {
    let plot = frame.plot;
    let baseline = scale.map(scale.clamp(0.0), plot.bottom(), plot.y);
    let mut shapes = Vec::new();
    for (index, s) in series {
        let color = frame.color(*index);
        let (_, points) = polyline(frame, s, scale, count);
        let (Some((_, first)), Some((_, last))) = (points.first(), points.last()) else {
            continue;
        };

        let mut polygon = vec![PathCommand::MoveTo(Point::new(first.x, baseline))];
        polygon.extend(points.iter().map(|(_, p)| PathCommand::LineTo(*p)));
        polygon.push(PathCommand::LineTo(Point::new(last.x, baseline)));
        polygon.push(PathCommand::Close);
        shapes.push(Shape::Path {
            commands: polygon,
            paint: Paint::fill(color).with_opacity(0.35),
            tooltip: Some(s.name.clone()),
        });

        let mut outline = Vec::with_capacity(points.len());
        for (k, (_, p)) in points.iter().enumerate() {
            outline.push(if k == 0 {
                PathCommand::MoveTo(*p)
            } else {
                PathCommand::LineTo(*p)
            });
        }
        shapes.push(Shape::Path {
            commands: outline,
            paint: Paint::stroke(color, LINE_WIDTH),
            tooltip: None,
        });
    }
    shapes
}

/// 値軸の目盛り線（High品質では補助線も）
fn grid_lines(frame: &Frame, scale: &NiceScale, orientation: Orientation) -> Vec<Shape> {
    let plot = frame.plot;
    let line_at = |value: f64, color: &str| match orientation {
        Orientation::Vertical => {
            let y = scale.map(value, plot.bottom(), plot.y);
            Shape::Line {
                from: Point::new(plot.x, y),
                to: Point::new(plot.right(), y),
                paint: Paint::stroke(color, 1.0),
            }
        }
        Orientation::Horizontal => {
            let x = scale.map(value, plot.x, plot.right());
            Shape::Line {
                from: Point::new(x, plot.y),
                to: Point::new(x, plot.bottom()),
                paint: Paint::stroke(color, 1.0),
            }
        }
    };

    let ticks = scale.ticks();
    let mut shapes = Vec::new();
    if frame.quality.minor_gridlines() {
        for pair in ticks.windows(2) {
            shapes.push(line_at((pair[0] + pair[1]) / 2.0, MINOR_GRID_COLOR));
        }
    }
    shapes.extend(ticks.iter().map(|t| line_at(*t, GRID_COLOR)));
    shapes
}

fn value_grid(frame: &Frame, scale: &NiceScale, orientation: Orientation) -> Shape {
    Shape::group("grid", grid_lines(frame, scale, orientation))
}

fn axis_lines(frame: &Frame) -> Vec<Shape> {
    let plot = frame.plot;
    vec![
        Shape::Line {
            from: Point::new(plot.x, plot.bottom()),
            to: Point::new(plot.right(), plot.bottom()),
            paint: Paint::stroke(AXIS_COLOR, 2.0),
        },
        Shape::Line {
            from: Point::new(plot.x, plot.y),
            to: Point::new(plot.x, plot.bottom()),
            paint: Paint::stroke(AXIS_COLOR, 2.0),
        },
    ]
}

fn axis_label(at: Point, text: String, anchor: TextAnchor) -> Shape {
    Shape::Text(
        Label::new(at, text, AXIS_FONT_SIZE)
            .anchored(anchor)
            .colored(LABEL_COLOR),
    )
}

/// 値軸の目盛りラベル
fn value_labels(frame: &Frame, scale: &NiceScale, side: Side, orientation: Orientation) -> Vec<Shape> {
    let plot = frame.plot;
    scale
        .ticks()
        .into_iter()
        .map(|tick| match (orientation, side) {
            (Orientation::Vertical, Side::Left) => axis_label(
                Point::new(plot.x - 10.0, scale.map(tick, plot.bottom(), plot.y) + 4.0),
                scale.label(tick),
                TextAnchor::End,
            ),
            (Orientation::Vertical, Side::Right) => axis_label(
                Point::new(plot.right() + 8.0, scale.map(tick, plot.bottom(), plot.y) + 4.0),
                scale.label(tick),
                TextAnchor::Start,
            ),
            (Orientation::Horizontal, _) => axis_label(
                Point::new(scale.map(tick, plot.x, plot.right()), plot.bottom() + 20.0),
                scale.label(tick),
                TextAnchor::Middle,
            ),
        })
        .collect()
}

/// 軸線・値ラベル・カテゴリラベル
fn axes(frame: &Frame, scale: &NiceScale, side: Side, orientation: Orientation, categories: &[String]) -> Shape {
    let plot = frame.plot;
    let mut shapes = axis_lines(frame);
    shapes.extend(value_labels(frame, scale, side, orientation));

    match orientation {
        Orientation::Vertical => {
            let fitted = fit_category_labels(categories, plot.width, frame.quality);
            for (i, label) in fitted.labels.into_iter().enumerate() {
                let Some(text) = label else { continue };
                let x = band_center(frame, categories.len(), i);
                if fitted.rotated {
                    let at = Point::new(x, plot.bottom() + 14.0);
                    shapes.push(Shape::Text(
                        Label::new(at, text, AXIS_FONT_SIZE)
                            .anchored(TextAnchor::End)
                            .colored(LABEL_COLOR)
                            .rotated(-45.0),
                    ));
                } else {
                    shapes.push(axis_label(Point::new(x, plot.bottom() + 20.0), text, TextAnchor::Middle));
                }
            }
        }
        Orientation::Horizontal => {
            let band = plot.height / categories.len().max(1) as f64;
            let columns = ((MARGIN_LEFT - 15.0) / 7.0).floor() as usize;
            for (i, category) in categories.iter().enumerate() {
                let y = plot.y + (i as f64 + 0.5) * band + 4.0;
                shapes.push(axis_label(
                    Point::new(plot.x - 10.0, y),
                    truncate_columns(category, columns),
                    TextAnchor::End,
                ));
            }
        }
    }
    Shape::group("axes", shapes)
}

fn axis_titles(frame: &Frame) -> Vec<Shape> {
    let plot = frame.plot;
    let mut shapes = Vec::new();
    if let Some(title) = frame.spec.x_title.as_deref().filter(|t| !t.trim().is_empty()) {
        shapes.push(Shape::Text(
            Label::new(
                Point::new(plot.center().x, f64::from(frame.canvas.height) - 20.0),
                title,
                14.0,
            )
            .anchored(TextAnchor::Middle)
            .bold(),
        ));
    }
    if let Some(title) = frame.spec.y_title.as_deref().filter(|t| !t.trim().is_empty()) {
        shapes.push(Shape::Text(
            Label::new(Point::new(20.0, plot.center().y), title, 14.0)
                .anchored(TextAnchor::Middle)
                .bold()
                .rotated(-90.0),
        ));
    }
    shapes
}

#[cfg(test)]
mod tests {
    use super::super::{ChartSpec, ChartStyle, Quality};
    use super::*;

    fn rects(shapes: &[Shape]) -> Vec<Rect> {
        shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Rect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_column_geometry() {
        let chart = ChartSpec::new(ChartKind::Column, "C")
            .with_series(Series::new("S", ["a", "b"], [50.0, 100.0]));
        let drawing = chart.layout(&ChartStyle::default()).unwrap();
        let bars = rects(drawing.group("columns").unwrap());
        assert_eq!(bars.len(), 2);

        // 600x400: 描画領域 x=80..500, y=50..320、目盛り 0..100
        assert!((bars[0].height - 135.0).abs() < 1e-9);
        assert!((bars[1].height - 270.0).abs() < 1e-9);
        assert!((bars[1].y - 50.0).abs() < 1e-9);
        assert!((bars[0].x - (80.0 + 21.0)).abs() < 1e-9);
        assert!((bars[0].width - 168.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_columns_hang_from_zero() {
        let chart = ChartSpec::new(ChartKind::Column, "C")
            .with_series(Series::new("S", ["a", "b"], [-20.0, 40.0]));
        let drawing = chart.layout(&ChartStyle::default()).unwrap();
        let bars = rects(drawing.group("columns").unwrap());
        let zero_y = bars[1].y + bars[1].height;
        assert!((bars[0].y - zero_y).abs() < 1e-9);
    }

    #[test]
    fn test_bar_chart_is_horizontal() {
        let chart = ChartSpec::new(ChartKind::Bar, "B")
            .with_series(Series::new("S", ["a", "b", "c"], [1.0, 2.0, 3.0]));
        let drawing = chart.layout(&ChartStyle::default()).unwrap();
        let bars = rects(drawing.group("bars").unwrap());
        assert_eq!(bars.len(), 3);
        assert!(bars.iter().all(|r| (r.x - 80.0).abs() < 1e-9));
        assert!(bars[2].width > bars[0].width);
    }

    #[test]
    fn test_line_gaps_split_path() {
        let chart = ChartSpec::new(ChartKind::Line, "L")
            .with_series(Series::new("S", ["a", "b", "c", "d"], [1.0, f64::NAN, 3.0, 4.0]));
        let drawing = chart.layout(&ChartStyle::default()).unwrap();
        let lines = drawing.group("lines").unwrap();
        let Shape::Path { commands, .. } = &lines[0] else {
            panic!("expected path");
        };
        let moves = commands
            .iter()
            .filter(|c| matches!(c, PathCommand::MoveTo(_)))
            .count();
        assert_eq!(moves, 2);
        let markers = lines.iter().filter(|s| matches!(s, Shape::Circle { .. })).count();
        assert_eq!(markers, 3);
    }

    #[test]
    fn test_bubble_area_scaling() {
        let chart = ChartSpec::new(ChartKind::Bubble, "B")
            .with_series(Series::new("S", ["1", "2"], [1.0, 2.0]).with_sizes([1.0, 4.0]));
        let drawing = chart.layout(&ChartStyle::default()).unwrap();
        let radii: Vec<f64> = drawing
            .group("bubbles")
            .unwrap()
            .iter()
            .filter_map(|s| match s {
                Shape::Circle { radius, .. } => Some(*radius),
                _ => None,
            })
            .collect();
        // 大きさ4倍で半径2倍（面積4倍）
        assert!((radii[1] / radii[0] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_bubble_size_is_data_error() {
        let chart = ChartSpec::new(ChartKind::Bubble, "B")
            .with_series(Series::new("S", ["1"], [1.0]).with_sizes([-1.0]));
        assert!(chart.layout(&ChartStyle::default()).is_err());
    }

    #[test]
    fn test_combo_secondary_axis() {
        let chart = ChartSpec::new(ChartKind::Combo, "Combo")
            .with_series(Series::new("Revenue", ["a", "b"], [1000.0, 2000.0]))
            .with_series(
                Series::new("Margin", ["a", "b"], [0.1, 0.2])
                    .with_combo(ComboPart::Line)
                    .on_secondary_axis(),
            );
        let drawing = chart.layout(&ChartStyle::default()).unwrap();
        assert_eq!(rects(drawing.group("columns").unwrap()).len(), 2);
        assert!(drawing.group("secondary-axis").is_some());

        // 第2軸のため凡例が右にずれる
        let legend = drawing.group("legend").unwrap();
        let Shape::Rect { rect, .. } = &legend[0] else {
            panic!("expected swatch");
        };
        assert_eq!(rect.x, 500.0 + 20.0 + SECONDARY_AXIS_WIDTH);
    }

    #[test]
    fn test_minor_gridlines_only_on_high() {
        let chart = |quality| {
            ChartSpec::new(ChartKind::Line, "L")
                .with_series(Series::new("S", ["a", "b"], [0.0, 100.0]))
                .with_style(ChartStyle {
                    quality,
                    ..Default::default()
                })
        };
        let high = chart(Quality::High).layout(&ChartStyle::default()).unwrap();
        let low = chart(Quality::Low).layout(&ChartStyle::default()).unwrap();
        let high_grid = high.group("grid").unwrap().len();
        let low_grid = low.group("grid").unwrap().len();
        assert_eq!(low_grid, 6);
        assert_eq!(high_grid, 11);
        // データの写像は品質に依存しない
        assert_eq!(high.group("lines"), low.group("lines"));
    }

    #[test]
    fn test_value_range_fixes_axis() {
        let chart = ChartSpec::new(ChartKind::Line, "L")
            .with_series(Series::new("S", ["a", "b"], [10.0, 20.0]))
            .with_value_range(0.0, 40.0);
        let drawing = chart.layout(&ChartStyle::default()).unwrap();
        let lines = drawing.group("lines").unwrap();
        let Shape::Circle { center, .. } = &lines[2] else {
            panic!("expected marker");
        };
        // 20 / 40 → 描画領域の高さの半分
        assert!((center.y - (320.0 - 135.0)).abs() < 1e-9);
    }
}
