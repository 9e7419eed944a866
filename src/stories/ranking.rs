//! "La batalla del retweet" — the ranking story. Bars compare total retweet
//! counts per candidate; the final step swaps the axis to follower growth
//! and draws each candidate's growth line across the last three days.

use anyhow::{Context, Result};
use eframe::egui::{pos2, vec2};

use crate::data::{GrowthSeries, RankingRow};
use crate::scale::{BandScale, LinearScale, TimeScale, domain_extent};
use crate::scene::{Anim, AnimVec2, BarMark, Margins, NodeMark, Scene, SeriesMark};
use crate::scroll::{SectionController, SectionSetBuilder};
use crate::util::{OrdinalColors, initials};

use super::{StepText, Story};

const WIDTH: f32 = 810.0;
const HEIGHT: f32 = 600.0;
const MARGINS: Margins = Margins {
    top: 0.0,
    left: 34.0,
    bottom: 40.0,
    right: 10.0,
};
const BAR_WIDTH: f32 = 10.0;
const NODE_R: f32 = 18.0;
const FADE_MS: f64 = 600.0;

const CHART_TOP: f32 = 40.0;
const CHART_BOTTOM: f32 = HEIGHT - MARGINS.bottom;

pub(super) fn build(rows: Vec<RankingRow>, growth: Vec<GrowthSeries>) -> Result<Story> {
    let mut scene = Scene::new(WIDTH, HEIGHT, MARGINS);

    let retweet_domain = domain_extent(rows.iter().map(|row| row.retweet_count as f64))
        .context("retweet ranking is empty")?;
    scene.y = LinearScale::new((0.0, retweet_domain.1), (CHART_BOTTOM, CHART_TOP));
    scene.set_y_domain((0.0, retweet_domain.1), "");
    scene.y_axis.opacity.jump(0.0);

    let band = BandScale::new(
        rows.iter().map(|row| row.handle.clone()),
        (MARGINS.left + 30.0, WIDTH - MARGINS.right),
    )?;

    scene.add_label(
        "vis-title.main",
        "LA BATALLA DEL RETWEET",
        pos2(WIDTH / 2.0, HEIGHT / 5.0),
        30.0,
    );
    scene.add_label(
        "vis-title.sub",
        "¿A quién le retuitean más?",
        pos2(WIDTH / 2.0, (HEIGHT / 5.0) + (HEIGHT / 10.0)),
        18.0,
    );
    scene.add_label(
        "axis.retweets",
        "# de Retweets",
        pos2(MARGINS.left + 60.0, CHART_TOP - 20.0),
        14.0,
    );
    scene.add_label(
        "axis.growth",
        "# de Seguidores Ganados",
        pos2(MARGINS.left + 100.0, CHART_TOP - 20.0),
        14.0,
    );
    scene.add_label(
        "axis.time",
        "Últimos 3 días",
        pos2(WIDTH / 2.0, HEIGHT - 12.0),
        14.0,
    );

    let mut colors = OrdinalColors::category10();
    for row in &rows {
        let center = band.position(&row.handle).unwrap_or(MARGINS.left);
        let color = colors.color(&row.handle);
        scene.bars.push(BarMark {
            handle: row.handle.clone(),
            x: center - (BAR_WIDTH / 2.0),
            width: BAR_WIDTH,
            top: scene.y.scale(row.retweet_count as f64),
            bottom: CHART_BOTTOM,
            color,
            opacity: Anim::fixed(0.0),
        });
        scene.nodes.push(NodeMark {
            handle: row.handle.clone(),
            name: row.name.clone(),
            label: initials(&row.name),
            color,
            pos: AnimVec2::fixed(vec2(
                center,
                scene.y.scale(row.retweet_count as f64) - NODE_R - 6.0,
            )),
            radius: Anim::fixed(NODE_R),
            opacity: Anim::fixed(0.0),
            grey: Anim::fixed(0.0),
        });
    }
    scene.x_band = Some(band);

    // Growth lines are laid out once; only their reveal fraction animates.
    let time = TimeScale::fit(
        growth
            .iter()
            .flat_map(|series| series.points.iter().map(|point| point.date)),
        (MARGINS.left + 30.0, WIDTH - MARGINS.right),
    )
    .context("follower growth has no dated points")?;
    let growth_extent = domain_extent(
        growth
            .iter()
            .flat_map(|series| series.points.iter().map(|point| point.count)),
    )
    .context("follower growth has no counts")?;
    let growth_scale = LinearScale::new(growth_extent, (CHART_BOTTOM, CHART_TOP));

    // Seed the palette in ranking order so each line matches its bar.
    let mut line_colors = OrdinalColors::category10();
    for row in &rows {
        line_colors.color(&row.handle);
    }
    for series in &growth {
        let points = series
            .points
            .iter()
            .map(|point| pos2(time.scale(point.date), growth_scale.scale(point.count)))
            .collect();
        scene.series.push(SeriesMark {
            id: series.handle.clone(),
            points,
            color: line_colors.color(&series.handle),
            filled: false,
            baseline: CHART_BOTTOM,
            opacity: Anim::fixed(0.0),
            reveal: Anim::fixed(0.0),
        });
    }
    scene.set_x_time(time, 3);
    scene.x_axis.opacity.jump(0.0);

    let sections = SectionSetBuilder::new()
        .on_activate(0, |scene, now| {
            show_title(scene, now);
            Ok(())
        })
        .on_activate(1, {
            let max_retweets = retweet_domain.1;
            move |scene, now| {
                show_bars(scene, max_retweets, now);
                Ok(())
            }
        })
        .on_activate(2, {
            move |scene, now| {
                show_growth_lines(scene, growth_extent, now);
                Ok(())
            }
        })
        .on_progress(2, |scene, progress, _now| {
            // While the reader is inside the step, the lines track the
            // scroll position directly instead of tweening.
            for series in &mut scene.series {
                series.reveal.jump(progress);
            }
            Ok(())
        })
        .build()?;

    Ok(Story {
        title: "La batalla del retweet",
        scene,
        controller: SectionController::new(sections),
        steps: step_texts(),
    })
}

fn show_title(scene: &mut Scene, now: f64) {
    for label in scene.labels_with_prefix("vis-title") {
        label.opacity.set(1.0, FADE_MS, now);
    }
    for label in scene.labels_with_prefix("axis") {
        label.opacity.set(0.0, FADE_MS, now);
    }
    for bar in &mut scene.bars {
        bar.opacity.set(0.0, FADE_MS, now);
    }
    for node in &mut scene.nodes {
        node.opacity.set(0.0, FADE_MS, now);
    }
    for series in &mut scene.series {
        series.opacity.jump(0.0);
        series.reveal.jump(0.0);
    }
    scene.y_axis.opacity.set(0.0, FADE_MS, now);
    scene.x_axis.opacity.jump(0.0);
}

fn show_bars(scene: &mut Scene, max_retweets: f64, now: f64) {
    for label in scene.labels_with_prefix("vis-title") {
        label.opacity.set(0.0, FADE_MS, now);
    }
    if let Some(label) = scene.label_mut("axis.retweets") {
        label.opacity.set(1.0, FADE_MS, now);
    }
    if let Some(label) = scene.label_mut("axis.growth") {
        label.opacity.set(0.0, FADE_MS, now);
    }
    if let Some(label) = scene.label_mut("axis.time") {
        label.opacity.set(0.0, FADE_MS, now);
    }

    scene.set_y_domain((0.0, max_retweets), "");
    let tops: Vec<(String, f32)> = scene
        .bars
        .iter()
        .map(|bar| (bar.handle.clone(), bar.top))
        .collect();
    for bar in &mut scene.bars {
        bar.opacity.set(1.0, FADE_MS, now);
    }
    for node in &mut scene.nodes {
        if let Some((_, top)) = tops.iter().find(|(handle, _)| *handle == node.handle) {
            node.pos
                .set(vec2(node.pos.target().x, top - NODE_R - 6.0), FADE_MS, now);
        }
        node.opacity.set(1.0, FADE_MS, now);
    }
    for series in &mut scene.series {
        series.opacity.jump(0.0);
        series.reveal.jump(0.0);
    }
    scene.y_axis.opacity.set(1.0, FADE_MS, now);
    scene.x_axis.opacity.set(0.0, FADE_MS, now);
}

fn show_growth_lines(scene: &mut Scene, growth_extent: (f64, f64), now: f64) {
    if let Some(label) = scene.label_mut("axis.retweets") {
        label.opacity.set(0.0, FADE_MS, now);
    }
    if let Some(label) = scene.label_mut("axis.growth") {
        label.opacity.set(1.0, FADE_MS, now);
    }
    if let Some(label) = scene.label_mut("axis.time") {
        label.opacity.set(1.0, FADE_MS, now);
    }

    scene.set_y_domain(growth_extent, "seguidores");
    for bar in &mut scene.bars {
        bar.opacity.jump(0.0);
    }
    for node in &mut scene.nodes {
        node.pos.set(
            vec2(node.pos.target().x, HEIGHT - MARGINS.bottom + 20.0),
            FADE_MS,
            now,
        );
    }
    for series in &mut scene.series {
        series.opacity.jump(1.0);
        series.reveal.set(1.0, FADE_MS, now);
    }
    scene.y_axis.opacity.set(1.0, FADE_MS, now);
    scene.x_axis.opacity.set(1.0, FADE_MS, now);
}

fn step_texts() -> Vec<StepText> {
    let step = |title: &str, body: &str| StepText {
        title: title.to_owned(),
        body: body.to_owned(),
    };
    vec![
        step(
            "La batalla del retweet",
            "En Twitter la moneda es el retweet: medimos cuántos acumula \
             cada candidato.",
        ),
        step(
            "El ranking",
            "Cada barra es el total de retweets que recibieron los tuits de \
             un candidato durante la campaña.",
        ),
        step(
            "Seguidores ganados",
            "El eje cambia a seguidores nuevos: las líneas recorren los \
             últimos tres días de crecimiento, cuenta por cuenta.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    use crate::data::GrowthPoint;

    fn row(handle: &str, name: &str, count: u64) -> RankingRow {
        RankingRow {
            handle: handle.to_owned(),
            name: name.to_owned(),
            img: String::new(),
            retweet_count: count,
        }
    }

    fn growth(handle: &str, counts: &[f64]) -> GrowthSeries {
        GrowthSeries {
            handle: handle.to_owned(),
            points: counts
                .iter()
                .enumerate()
                .map(|(day, &count)| GrowthPoint {
                    date: DateTime::from_timestamp_millis((day as i64) * 86_400_000).unwrap(),
                    count,
                })
                .collect(),
        }
    }

    fn story() -> Story {
        let rows = vec![
            row("petrogustavo", "Gustavo Petro", 5200),
            row("IvanDuque", "Iván Duque", 3100),
            row("sergio_fajardo", "Sergio Fajardo", 1800),
        ];
        let series = vec![
            growth("petrogustavo", &[100.0, 400.0, 900.0]),
            growth("IvanDuque", &[50.0, 300.0, 700.0]),
        ];
        build(rows, series).unwrap()
    }

    #[test]
    fn declares_three_sections() {
        let story = story();
        assert_eq!(story.controller.section_count(), 3);
        assert_eq!(story.steps.len(), 3);
        assert_eq!(story.scene.bars.len(), 3);
        assert_eq!(story.scene.series.len(), 2);
    }

    #[test]
    fn bar_step_fades_the_bars_in() {
        let mut story = story();
        story.controller.activate(&mut story.scene, 1, 0.0).unwrap();
        assert!(story.scene.bars.iter().all(|bar| bar.opacity.target() == 1.0));
        assert_eq!(story.scene.y_axis.opacity.target(), 1.0);
        // Lines stay hidden until their step.
        assert!(story.scene.series.iter().all(|s| s.reveal.target() == 0.0));
    }

    #[test]
    fn taller_ranking_gets_the_higher_bar() {
        let story = story();
        let top_of = |handle: &str| {
            story
                .scene
                .bars
                .iter()
                .find(|bar| bar.handle == handle)
                .unwrap()
                .top
        };
        // Screen y grows downward.
        assert!(top_of("petrogustavo") < top_of("IvanDuque"));
        assert!(top_of("IvanDuque") < top_of("sergio_fajardo"));
    }

    #[test]
    fn growth_step_hides_bars_and_reveals_lines() {
        let mut story = story();
        story.controller.activate(&mut story.scene, 2, 0.0).unwrap();
        assert!(story.scene.bars.iter().all(|bar| bar.opacity.target() == 0.0));
        assert!(story.scene.series.iter().all(|s| s.reveal.target() == 1.0));
        assert_eq!(story.scene.x_axis.opacity.target(), 1.0);
    }

    #[test]
    fn progress_inside_the_growth_step_drives_the_reveal() {
        let mut story = story();
        story.controller.activate(&mut story.scene, 2, 0.0).unwrap();
        story
            .controller
            .update(&mut story.scene, 2, 0.4, 1.0)
            .unwrap();
        assert!(story.scene.series.iter().all(|s| s.reveal.target() == 0.4));
    }

    #[test]
    fn empty_ranking_is_rejected_up_front() {
        let error = build(Vec::new(), vec![growth("x", &[1.0])]).unwrap_err();
        assert!(format!("{error:#}").contains("empty"));
    }
}
