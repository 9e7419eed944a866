//! The two-panel scroll layout: narration steps on the left, the shared
//! chart on the right. The left panel's scroll offset drives the section
//! controller; the painter samples the tweened scene every frame.

use anyhow::Result;
use eframe::egui::{
    self, Align2, Color32, Context, FontId, Painter, Pos2, Rect, RichText, Sense, Shape, Stroke,
    pos2, vec2,
};

use crate::scene::{Scene, SeriesMark};
use crate::scroll::tracker;
use crate::util::{greyscale, with_opacity};

use super::ViewState;

/// One narration step occupies this many pixels of the left column; the
/// scroll offset divided by it is the active section index.
const STEP_HEIGHT: f32 = 230.0;
/// Trailing space after the last step so it can scroll fully into view.
const RUN_OUT: f32 = 500.0;

const BACKGROUND: Color32 = Color32::WHITE;
const TEXT: Color32 = Color32::from_gray(40);
const AXIS: Color32 = Color32::from_gray(150);

impl ViewState {
    pub(super) fn show(&mut self, ctx: &Context) -> Result<()> {
        let now = ctx.input(|input| input.time);

        // Dispatch against last frame's offset before painting anything, so
        // a failing handler surfaces instead of drawing a half-built scene.
        let section_count = self.story.controller.section_count();
        if let Some((index, progress)) =
            tracker::step_at(self.scroll_offset, STEP_HEIGHT, section_count)
        {
            if self.active_index != Some(index) {
                self.story
                    .controller
                    .activate(&mut self.story.scene, index, now)?;
                self.active_index = Some(index);
            }
            self.story
                .controller
                .update(&mut self.story.scene, index, progress, now)?;
        }

        egui::SidePanel::left("story-steps")
            .resizable(false)
            .default_width(340.0)
            .show(ctx, |ui| {
                ui.add_space(12.0);
                ui.heading(self.story.title);
                ui.add_space(8.0);

                let output = egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        for (index, step) in self.story.steps.iter().enumerate() {
                            let top = ui.cursor().top();
                            let active = self.active_index == Some(index);
                            let color = if active {
                                ui.visuals().strong_text_color()
                            } else {
                                ui.visuals().weak_text_color()
                            };

                            ui.label(RichText::new(&step.title).size(17.0).color(color).strong());
                            ui.add_space(4.0);
                            ui.label(RichText::new(&step.body).color(color));

                            let used = ui.cursor().top() - top;
                            if used < STEP_HEIGHT {
                                ui.add_space(STEP_HEIGHT - used);
                            }
                        }
                        ui.add_space(RUN_OUT);
                    });
                self.scroll_offset = output.state.offset.y;
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let scene = &self.story.scene;
            let desired = vec2(scene.width, scene.height);
            let (rect, response) = ui.allocate_exact_size(desired, Sense::hover());
            let painter = ui.painter_at(rect);
            draw_scene(&painter, rect, scene, now);

            if let Some(hover) = response.hover_pos()
                && let Some(name) = hovered_node_name(scene, rect, hover, now)
            {
                painter.text(
                    rect.left_top() + vec2(10.0, 10.0),
                    Align2::LEFT_TOP,
                    name,
                    FontId::proportional(13.0),
                    TEXT,
                );
            }
        });

        if self.story.scene.any_animating(now) {
            ctx.request_repaint();
        }
        Ok(())
    }
}

fn hovered_node_name(scene: &Scene, rect: Rect, hover: Pos2, now: f64) -> Option<String> {
    scene
        .nodes
        .iter()
        .filter(|node| node.opacity.value_at(now) > 0.1)
        .find(|node| {
            let center = rect.min + node.pos.value_at(now);
            let radius = node.radius.value_at(now);
            center.distance(hover) <= radius
        })
        .map(|node| node.name.clone())
}

fn draw_scene(painter: &Painter, rect: Rect, scene: &Scene, now: f64) {
    painter.rect_filled(rect, 0.0, BACKGROUND);
    let origin = rect.min.to_vec2();

    draw_y_axis(painter, rect, scene, now);
    draw_x_axis(painter, rect, scene, now);

    for link in &scene.links {
        let opacity = link.opacity.value_at(now);
        if opacity <= 0.0 {
            continue;
        }
        let start = rect.min + link.from.value_at(now);
        let end = rect.min + link.to.value_at(now);
        let color = with_opacity(Color32::from_gray(90), opacity);
        painter.line_segment([start, end], Stroke::new(1.5, color));
        draw_arrowhead(painter, start, end, color);
    }

    for bar in &scene.bars {
        let opacity = bar.opacity.value_at(now);
        if opacity <= 0.0 {
            continue;
        }
        let bar_rect = Rect::from_min_max(
            pos2(bar.x, bar.top) + origin,
            pos2(bar.x + bar.width, bar.bottom) + origin,
        );
        painter.rect_filled(bar_rect, 0.0, with_opacity(bar.color, opacity));
    }

    for series in &scene.series {
        draw_series(painter, rect, series, now);
    }

    for node in &scene.nodes {
        let opacity = node.opacity.value_at(now);
        if opacity <= 0.0 {
            continue;
        }
        let center = rect.min + node.pos.value_at(now);
        let radius = node.radius.value_at(now);
        let fill = with_opacity(greyscale(node.color, node.grey.value_at(now)), opacity);

        painter.circle_filled(center, radius, fill);
        painter.circle_stroke(
            center,
            radius,
            Stroke::new(2.0, with_opacity(BACKGROUND, opacity)),
        );
        painter.text(
            center,
            Align2::CENTER_CENTER,
            &node.label,
            FontId::proportional((radius * 0.8).max(8.0)),
            with_opacity(BACKGROUND, opacity),
        );
    }

    for label in &scene.labels {
        let opacity = label.opacity.value_at(now);
        if opacity <= 0.0 {
            continue;
        }
        painter.text(
            rect.min + label.pos.to_vec2(),
            Align2::CENTER_CENTER,
            &label.text,
            FontId::proportional(label.font_size),
            with_opacity(TEXT, opacity),
        );
    }
}

fn draw_y_axis(painter: &Painter, rect: Rect, scene: &Scene, now: f64) {
    let opacity = scene.y_axis.opacity.value_at(now);
    if opacity <= 0.0 {
        return;
    }
    let color = with_opacity(AXIS, opacity);
    let left = rect.left() + scene.margins.left;
    let right = rect.right() - scene.margins.right - 60.0;

    for tick in &scene.y_axis.ticks {
        let y = rect.top() + tick.at;
        painter.extend(Shape::dashed_line(
            &[pos2(left, y), pos2(right, y)],
            Stroke::new(1.0, color),
            4.0,
            4.0,
        ));
        painter.text(
            pos2(right + 6.0, y),
            Align2::LEFT_CENTER,
            &tick.text,
            FontId::proportional(12.0),
            color,
        );
    }
}

fn draw_x_axis(painter: &Painter, rect: Rect, scene: &Scene, now: f64) {
    let opacity = scene.x_axis.opacity.value_at(now);
    if opacity <= 0.0 {
        return;
    }
    let color = with_opacity(AXIS, opacity);
    let baseline = rect.bottom() - scene.margins.bottom;

    painter.line_segment(
        [
            pos2(rect.left() + scene.margins.left, baseline),
            pos2(rect.right() - scene.margins.right, baseline),
        ],
        Stroke::new(1.0, color),
    );
    for tick in &scene.x_axis.ticks {
        let x = rect.left() + tick.at;
        painter.line_segment(
            [pos2(x, baseline), pos2(x, baseline + 5.0)],
            Stroke::new(1.0, color),
        );
        painter.text(
            pos2(x, baseline + 8.0),
            Align2::CENTER_TOP,
            &tick.text,
            FontId::proportional(11.0),
            color,
        );
    }
}

fn draw_arrowhead(painter: &Painter, start: Pos2, end: Pos2, color: Color32) {
    let direction = end - start;
    let length = direction.length();
    if length < 1.0 {
        return;
    }
    let unit = direction / length;
    // Pull the tip back so it sits on the target node's rim.
    let tip = end - (unit * 18.0);
    let normal = vec2(-unit.y, unit.x);
    painter.add(Shape::convex_polygon(
        vec![
            tip,
            tip - (unit * 8.0) + (normal * 4.0),
            tip - (unit * 8.0) - (normal * 4.0),
        ],
        color,
        Stroke::NONE,
    ));
}

/// Draws a series clipped to its reveal fraction. Filled series render as a
/// fan of per-segment trapezoids down to the baseline, since egui fills only
/// convex polygons.
fn draw_series(painter: &Painter, rect: Rect, series: &SeriesMark, now: f64) {
    let opacity = series.opacity.value_at(now);
    let reveal = series.reveal.value_at(now);
    if opacity <= 0.0 || reveal <= 0.0 || series.points.len() < 2 {
        return;
    }

    let points = revealed_points(&series.points, reveal);
    if points.len() < 2 {
        return;
    }
    let on_screen: Vec<Pos2> = points.iter().map(|p| rect.min + p.to_vec2()).collect();

    if series.filled {
        let baseline = rect.top() + series.baseline;
        let fill = with_opacity(series.color, opacity * 0.35);
        for pair in on_screen.windows(2) {
            painter.add(Shape::convex_polygon(
                vec![
                    pair[0],
                    pair[1],
                    pos2(pair[1].x, baseline),
                    pos2(pair[0].x, baseline),
                ],
                fill,
                Stroke::NONE,
            ));
        }
    }
    painter.add(Shape::line(
        on_screen,
        Stroke::new(2.5, with_opacity(series.color, opacity)),
    ));
}

/// The prefix of `points` up to the reveal cutoff, with an interpolated
/// point at the cutoff itself so the wipe is smooth.
fn revealed_points(points: &[Pos2], reveal: f32) -> Vec<Pos2> {
    let reveal = reveal.clamp(0.0, 1.0);
    let first_x = points[0].x;
    let last_x = points[points.len() - 1].x;
    let cutoff = first_x + ((last_x - first_x) * reveal);

    let mut out = Vec::with_capacity(points.len());
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.x <= cutoff {
            out.push(a);
        }
        if a.x <= cutoff && b.x > cutoff {
            if cutoff > a.x {
                let t = (cutoff - a.x) / (b.x - a.x);
                out.push(pos2(cutoff, a.y + ((b.y - a.y) * t)));
            }
            return out;
        }
    }
    if let Some(last) = points.last()
        && last.x <= cutoff
    {
        out.push(*last);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_reveal_keeps_every_point() {
        let points = vec![pos2(0.0, 10.0), pos2(50.0, 5.0), pos2(100.0, 0.0)];
        assert_eq!(revealed_points(&points, 1.0), points);
    }

    #[test]
    fn partial_reveal_interpolates_the_cutoff() {
        let points = vec![pos2(0.0, 10.0), pos2(100.0, 0.0)];
        let clipped = revealed_points(&points, 0.5);
        assert_eq!(clipped, vec![pos2(0.0, 10.0), pos2(50.0, 5.0)]);
    }

    #[test]
    fn zero_reveal_yields_too_few_points_to_draw() {
        let points = vec![pos2(0.0, 10.0), pos2(100.0, 0.0)];
        let clipped = revealed_points(&points, 0.0);
        assert!(clipped.len() < 2);
    }
}
