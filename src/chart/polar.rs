//! Polar Charts
//!
//! 円・ドーナツ・レーダー・ゲージの幾何計算。角度は12時方向を0度とした時計回り。

use super::drawing::{Label, Paint, PathCommand, Shape, TextAnchor};
use super::layout::Point;
use super::cartesian::too_wide;
use super::scale::NiceScale;
use super::{ChartKind, Frame};
use crate::formatter::default_number;

const GRID_COLOR: &str = "#e0e0e0";
const MINOR_GRID_COLOR: &str = "#f2f2f2";
const LABEL_COLOR: &str = "#666666";
const TRACK_COLOR: &str = "#e6e6e6";
const NEEDLE_COLOR: &str = "#333333";

/// ドーナツの内径（外径に対する比）
const DONUT_HOLE: f64 = 0.55;
/// 割合ラベルを表示する最小の割合
const LABEL_MIN_SHARE: f64 = 0.05;

/// 円グラフの扇形（角度は度）
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PieSlice {
    pub start: f64,
    pub end: f64,
    pub value: f64,
}

impl PieSlice {
    pub fn sweep(&self) -> f64 {
        self.end - self.start
    }
}

/// 値を扇形の角度に割り振る
///
/// 扇形は隙間なく連続し、最後の（0でない）扇形はちょうど360度で終わります。
/// 非有限値は0として扱います。割合は最大値で割った重みから求めるため、
/// 合計が`f64`を超える値でも角度は変わりません。
///
/// # 戻り値
///
/// * `Err(String)` - 負の値がある、または合計が0
pub(crate) fn pie_slices(values: &[f64]) -> Result<Vec<PieSlice>, String> {
    if let Some(negative) = values.iter().find(|v| v.is_finite() && **v < 0.0) {
        return Err(format!("pie chart cannot show negative value {}", negative));
    }
    let weights: Vec<f64> = values
        .iter()
        .map(|v| if v.is_finite() { *v } else { 0.0 })
        .collect();
    let largest = weights.iter().copied().fold(0.0f64, f64::max);
    if !(largest > 0.0) {
        return Err("pie chart values sum to zero".to_string());
    }
    // 各重みは1以下になり、合計は値の個数を超えない
    let total: f64 = weights.iter().map(|w| w / largest).sum();
    let last = weights.iter().rposition(|w| *w > 0.0).unwrap_or(0);

    let mut cursor = 0.0;
    let mut slices = Vec::with_capacity(weights.len());
    for (i, weight) in weights.iter().enumerate() {
        let end = if i == last {
            360.0
        } else {
            (cursor + weight / largest / total * 360.0).min(360.0)
        };
        slices.push(PieSlice {
            start: cursor,
            end,
            value: *weight,
        });
        cursor = end;
    }
    Ok(slices)
}

pub(crate) fn layout(frame: &Frame) -> Result<Vec<Shape>, String> {
    match frame.spec.kind {
        ChartKind::Radar => radar_chart(frame),
        ChartKind::Gauge => gauge_chart(frame),
        _ => pie_chart(frame),
    }
}

/// 円・ドーナツ（最初の系列のみ）
fn pie_chart(frame: &Frame) -> Result<Vec<Shape>, String> {
    let Some(series) = frame.spec.series.first() else {
        return Err("chart has no series".to_string());
    };
    let slices = pie_slices(&series.values)?;

    let plot = frame.plot;
    let center = plot.center();
    let radius = plot.width.min(plot.height) / 2.0 * 0.9;
    let inner = (frame.spec.kind == ChartKind::Donut).then_some(radius * DONUT_HOLE);
    let label_radius = match inner {
        Some(hole) => (radius + hole) / 2.0,
        None => radius * 0.7,
    };

    let mut wedges = Vec::new();
    let mut labels = Vec::new();
    for (i, slice) in slices.iter().enumerate() {
        if slice.sweep() <= 0.0 {
            continue;
        }
        let share = slice.sweep() / 360.0;
        let category = series.categories.get(i).map(String::as_str).unwrap_or("");
        wedges.push(Shape::Path {
            commands: wedge(center, radius, inner, slice),
            paint: Paint::fill(frame.color(i)).with_stroke("#ffffff", 2.0),
            tooltip: Some(format!(
                "{}: {} ({:.1}%)",
                category,
                default_number(slice.value),
                share * 100.0
            )),
        });
        if share > LABEL_MIN_SHARE {
            let mid = center.polar(label_radius, (slice.start + slice.end) / 2.0);
            labels.push(Shape::Text(
                Label::new(
                    Point::new(mid.x, mid.y + 4.0),
                    format!("{:.0}%", (share * 100.0).round()),
                    10.0,
                )
                .anchored(TextAnchor::Middle)
                .colored("#ffffff")
                .bold(),
            ));
        }
    }
    Ok(vec![
        Shape::group("slices", wedges),
        Shape::group("labels", labels),
    ])
}

/// 扇形（ドーナツでは環の一部）のパス
fn wedge(center: Point, radius: f64, inner: Option<f64>, slice: &PieSlice) -> Vec<PathCommand> {
    let arc = |r: f64, clockwise: bool, large_arc: bool, to: Point| PathCommand::Arc {
        radius: r,
        large_arc,
        clockwise,
        to,
    };

    // 1周は始点と終点が一致して描けないため半周ずつに分ける
    if slice.sweep() >= 360.0 - 1e-9 {
        let top = center.polar(radius, 0.0);
        let bottom = center.polar(radius, 180.0);
        let mut commands = vec![
            PathCommand::MoveTo(top),
            arc(radius, true, false, bottom),
            arc(radius, true, false, top),
            PathCommand::Close,
        ];
        if let Some(hole) = inner {
            let top = center.polar(hole, 0.0);
            let bottom = center.polar(hole, 180.0);
            // 逆回りで穴を抜く
            commands.extend([
                PathCommand::MoveTo(top),
                arc(hole, false, false, bottom),
                arc(hole, false, false, top),
                PathCommand::Close,
            ]);
        }
        return commands;
    }

    let large_arc = slice.sweep() > 180.0;
    let outer_start = center.polar(radius, slice.start);
    let outer_end = center.polar(radius, slice.end);
    match inner {
        None => vec![
            PathCommand::MoveTo(center),
            PathCommand::LineTo(outer_start),
            arc(radius, true, large_arc, outer_end),
            PathCommand::Close,
        ],
        Some(hole) => vec![
            PathCommand::MoveTo(outer_start),
            arc(radius, true, large_arc, outer_end),
            PathCommand::LineTo(center.polar(hole, slice.end)),
            arc(hole, false, large_arc, center.polar(hole, slice.start)),
            PathCommand::Close,
        ],
    }
}

/// 正多角形の同心リング
fn ring(center: Point, radius: f64, count: usize) -> Vec<PathCommand> {
    let mut commands: Vec<PathCommand> = (0..count)
        .map(|i| {
            let p = center.polar(radius, spoke_angle(i, count));
            if i == 0 {
                PathCommand::MoveTo(p)
            } else {
                PathCommand::LineTo(p)
            }
        })
        .collect();
    commands.push(PathCommand::Close);
    commands
}

fn spoke_angle(index: usize, count: usize) -> f64 {
    index as f64 * 360.0 / count as f64
}

fn radar_chart(frame: &Frame) -> Result<Vec<Shape>, String> {
    let categories = frame.categories();
    let n = categories.len();
    if n < 3 {
        return Err(format!("radar chart needs at least 3 categories, got {}", n));
    }

    let plot = frame.plot;
    let center = plot.center();
    let radius = plot.width.min(plot.height) / 2.0 * 0.8;

    let (lo, hi) = match frame.spec.value_range {
        Some(range) => range,
        None => frame
            .spec
            .series
            .iter()
            .flat_map(|s| s.finite_values())
            .fold((0.0f64, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v))),
    };
    let scale = match frame.spec.value_range {
        Some(_) => NiceScale::fixed(lo, hi),
        None => NiceScale::new(lo, hi.max(lo)),
    }
    .ok_or_else(|| too_wide(lo, hi))?;
    let to_radius = |value: f64| scale.map(scale.clamp(value), 0.0, radius);

    let mut grid = Vec::new();
    let ticks = scale.ticks();
    if frame.quality.minor_gridlines() {
        for pair in ticks.windows(2) {
            grid.push(Shape::Path {
                commands: ring(center, to_radius((pair[0] + pair[1]) / 2.0), n),
                paint: Paint::stroke(MINOR_GRID_COLOR, 1.0),
                tooltip: None,
            });
        }
    }
    for tick in &ticks {
        let r = to_radius(*tick);
        if r <= 0.0 {
            continue;
        }
        grid.push(Shape::Path {
            commands: ring(center, r, n),
            paint: Paint::stroke(GRID_COLOR, 1.0),
            tooltip: None,
        });
    }

    let mut axes = Vec::new();
    for (i, category) in categories.iter().enumerate() {
        let angle = spoke_angle(i, n);
        axes.push(Shape::Line {
            from: center,
            to: center.polar(radius, angle),
            paint: Paint::stroke(GRID_COLOR, 1.0),
        });
        let at = center.polar(radius + 14.0, angle);
        let anchor = if (at.x - center.x).abs() < 1.0 {
            TextAnchor::Middle
        } else if at.x > center.x {
            TextAnchor::Start
        } else {
            TextAnchor::End
        };
        axes.push(Shape::Text(
            Label::new(Point::new(at.x, at.y + 4.0), category.as_str(), 12.0)
                .anchored(anchor)
                .colored(LABEL_COLOR),
        ));
    }
    for tick in &ticks {
        axes.push(Shape::Text(
            Label::new(
                Point::new(center.x + 4.0, center.y - to_radius(*tick)),
                scale.label(*tick),
                10.0,
            )
            .colored(LABEL_COLOR),
        ));
    }

    let mut shapes = Vec::new();
    for (index, series) in frame.spec.series.iter().enumerate() {
        let color = frame.color(index);
        let points: Vec<Point> = (0..n)
            .map(|i| {
                let value = series.values.get(i).copied().filter(|v| v.is_finite());
                center.polar(value.map_or(0.0, &to_radius), spoke_angle(i, n))
            })
            .collect();
        let mut commands: Vec<PathCommand> = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if i == 0 {
                    PathCommand::MoveTo(*p)
                } else {
                    PathCommand::LineTo(*p)
                }
            })
            .collect();
        commands.push(PathCommand::Close);
        shapes.push(Shape::Path {
            commands,
            paint: Paint::fill(color)
                .with_opacity(0.25)
                .with_stroke(color, 2.0),
            tooltip: Some(series.name.clone()),
        });
        for (i, point) in points.iter().enumerate() {
            let Some(value) = series.values.get(i).copied().filter(|v| v.is_finite()) else {
                continue;
            };
            shapes.push(Shape::Circle {
                center: *point,
                radius: 3.0,
                paint: Paint::fill(color),
                tooltip: Some(format!(
                    "{} - {}: {}",
                    series.name,
                    categories[i],
                    default_number(value)
                )),
            });
        }
    }

    Ok(vec![
        Shape::group("grid", grid),
        Shape::group("axes", axes),
        Shape::group("series", shapes),
    ])
}

/// ゲージ（最初の有限値を半円上に表示）
fn gauge_chart(frame: &Frame) -> Result<Vec<Shape>, String> {
    let Some((series, value)) = frame
        .spec
        .series
        .iter()
        .find_map(|s| s.finite_values().next().map(|v| (s, v)))
    else {
        return Err("gauge has no finite value".to_string());
    };

    let (lo, hi) = frame
        .spec
        .value_range
        .unwrap_or((value.min(0.0), value.max(0.0)));
    let scale = match frame.spec.value_range {
        Some(_) => NiceScale::fixed(lo, hi),
        None => NiceScale::new(lo, hi),
    }
    .ok_or_else(|| too_wide(lo, hi))?;
    let ratio = scale.map(value, 0.0, 1.0).clamp(0.0, 1.0);

    let plot = frame.plot;
    let center = Point::new(plot.center().x, plot.y + plot.height * 0.75);
    let radius = (plot.width / 2.0).min(plot.height * 0.75) * 0.9;
    let thickness = radius * 0.2;
    let angle = -90.0 + ratio * 180.0;

    let start = center.polar(radius, -90.0);
    let mut dial = vec![Shape::Path {
        commands: vec![
            PathCommand::MoveTo(start),
            PathCommand::Arc {
                radius,
                large_arc: false,
                clockwise: true,
                to: center.polar(radius, 90.0),
            },
        ],
        paint: Paint::stroke(TRACK_COLOR, thickness),
        tooltip: None,
    }];
    if ratio > 0.0 {
        dial.push(Shape::Path {
            commands: vec![
                PathCommand::MoveTo(start),
                PathCommand::Arc {
                    radius,
                    large_arc: false,
                    clockwise: true,
                    to: center.polar(radius, angle),
                },
            ],
            paint: Paint::stroke(frame.color(0), thickness),
            tooltip: Some(format!("{}: {}", series.name, default_number(value))),
        });
    }
    dial.push(Shape::Line {
        from: center,
        to: center.polar(radius * 0.85, angle),
        paint: Paint::stroke(NEEDLE_COLOR, 3.0),
    });
    dial.push(Shape::Circle {
        center,
        radius: 6.0,
        paint: Paint::fill(NEEDLE_COLOR),
        tooltip: None,
    });

    let bound_label = |x: f64, text: String| {
        Shape::Text(
            Label::new(Point::new(x, center.y + 20.0), text, 12.0)
                .anchored(TextAnchor::Middle)
                .colored(LABEL_COLOR),
        )
    };
    let axes = vec![
        bound_label(center.x - radius, scale.label(scale.min())),
        bound_label(center.x + radius, scale.label(scale.max())),
    ];
    let reading = Shape::Text(
        Label::new(Point::new(center.x, center.y + 35.0), default_number(value), 20.0)
            .anchored(TextAnchor::Middle)
            .bold(),
    );

    Ok(vec![
        Shape::group("gauge", dial),
        Shape::group("axes", axes),
        Shape::group("value", vec![reading]),
    ])
}
