//! "Tuits sospechosos" — the bot-hunt story. Each step draws the cumulative
//! retweet curve of one tweet, minute by minute, so organic spread and
//! suspiciously vertical spikes are easy to tell apart.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use eframe::egui::{Color32, pos2};

use crate::data::Tweet;
use crate::metrics::{self, Bucket};
use crate::scale::{LinearScale, TimeScale, domain_extent};
use crate::scene::{Anim, Margins, Scene, SeriesMark};
use crate::scroll::{SectionController, SectionSetBuilder};
use crate::util::OrdinalColors;

use super::{StepText, Story};

const WIDTH: f32 = 750.0;
const HEIGHT: f32 = 600.0;
const MARGINS: Margins = Margins {
    top: 0.0,
    left: 20.0,
    bottom: 40.0,
    right: 10.0,
};
const FADE_MS: f64 = 600.0;

const CHART_TOP: f32 = 220.0;
const CHART_BOTTOM: f32 = HEIGHT - MARGINS.bottom;

/// Curves are cut off once the running total passes this point; past it the
/// interesting part (the takeoff) is long over and the tail only flattens
/// the y scale.
const MAX_CUMULATIVE: usize = 200;

/// One tweet's precomputed curve, ready for a step handler to paint.
#[derive(Clone)]
struct Curve {
    id: String,
    text: String,
    color: Color32,
    buckets: Vec<Bucket>,
}

pub(super) fn build(featured: Tweet, suspects: Vec<Tweet>, now: DateTime<Utc>) -> Result<Story> {
    let mut scene = Scene::new(WIDTH, HEIGHT, MARGINS);
    scene.y = LinearScale::new((0.0, 1.0), (CHART_BOTTOM, CHART_TOP));

    scene.add_label(
        "vis-title.1",
        "TUITS SOSPECHOSOS",
        pos2(WIDTH / 2.0, 60.0),
        30.0,
    );
    scene.add_label(
        "vis-title.2",
        "Retweets acumulados, minuto a minuto",
        pos2(WIDTH / 2.0, 100.0),
        18.0,
    );
    scene.add_label(
        "vis-title.3",
        "Una cuenta real tarda en despegar;",
        pos2(WIDTH / 2.0, 140.0),
        16.0,
    );
    scene.add_label(
        "vis-title.4",
        "una granja de bots dispara la curva en segundos.",
        pos2(WIDTH / 2.0, 165.0),
        16.0,
    );
    scene.add_label("tweet-text", "", pos2(WIDTH / 2.0, CHART_TOP - 40.0), 15.0);

    // One reusable area mark; each step rewrites its points.
    scene.series.push(SeriesMark {
        id: "area".to_owned(),
        points: Vec::new(),
        color: Color32::WHITE,
        filled: true,
        baseline: CHART_BOTTOM,
        opacity: Anim::fixed(0.0),
        reveal: Anim::fixed(0.0),
    });

    let mut colors = OrdinalColors::embers();
    let mut curves = Vec::with_capacity(1 + suspects.len());
    for tweet in std::iter::once(featured).chain(suspects) {
        curves.push(Curve {
            id: tweet.id.clone(),
            text: tweet.text.clone(),
            color: colors.color(&tweet.id),
            buckets: bucketed(tweet, now),
        });
    }

    let mut builder = SectionSetBuilder::new().on_activate(0, |scene, now| {
        show_title(scene, now);
        Ok(())
    });
    for (offset, curve) in curves.iter().enumerate() {
        let curve = curve.clone();
        builder = builder.on_activate(offset + 1, move |scene, now| {
            show_curve(scene, &curve, now)
        });
    }
    let sections = builder.build()?;

    Ok(Story {
        title: "Tuits sospechosos",
        scene,
        controller: SectionController::new(sections),
        steps: step_texts(&curves),
    })
}

/// Collapses a tweet's retweets into cumulative buckets, anchored to `now`
/// so the curve always reaches the present, and capped at `MAX_CUMULATIVE`.
fn bucketed(tweet: Tweet, now: DateTime<Utc>) -> Vec<Bucket> {
    let mut events = tweet.retweets;
    metrics::anchor_to_now(&mut events, now);
    let mut buckets = metrics::cumulative_event_counts(&events);
    buckets.retain(|bucket| bucket.total <= MAX_CUMULATIVE);
    buckets
}

fn show_title(scene: &mut Scene, now: f64) {
    for label in scene.labels_with_prefix("vis-title") {
        label.opacity.set(1.0, FADE_MS, now);
    }
    if let Some(label) = scene.label_mut("tweet-text") {
        label.opacity.set(0.0, FADE_MS, now);
    }
    if let Some(series) = scene.series_mut("area") {
        series.opacity.jump(0.0);
        series.reveal.jump(0.0);
    }
    scene.y_axis.opacity.set(0.0, FADE_MS, now);
    scene.x_axis.opacity.set(0.0, FADE_MS, now);
}

/// Rescales both axes to the curve's own extent and wipes it in from the
/// left. A curve with no buckets cannot be charted and fails loudly.
fn show_curve(scene: &mut Scene, curve: &Curve, now: f64) -> Result<()> {
    let totals = domain_extent(curve.buckets.iter().map(|bucket| bucket.total as f64))
        .with_context(|| format!("tweet {} has no retweet curve to draw", curve.id))?;
    scene.set_y_domain((0.0, totals.1), "retweets");

    let time = TimeScale::fit(
        curve.buckets.iter().map(|bucket| bucket.at),
        (MARGINS.left + 40.0, WIDTH - MARGINS.right),
    )
    .with_context(|| format!("tweet {} has no timestamps to chart", curve.id))?;

    let points = curve
        .buckets
        .iter()
        .map(|bucket| pos2(time.scale(bucket.at), scene.y.scale(bucket.total as f64)))
        .collect();
    scene.set_x_time(time, 3);

    if let Some(series) = scene.series_mut("area") {
        series.points = points;
        series.color = curve.color;
        series.opacity.jump(1.0);
        series.reveal.jump(0.0);
        series.reveal.set(1.0, FADE_MS, now);
    }

    for label in scene.labels_with_prefix("vis-title") {
        label.opacity.set(0.0, FADE_MS, now);
    }
    if let Some(label) = scene.label_mut("tweet-text") {
        label.text = curve.text.clone();
        label.opacity.set(1.0, FADE_MS, now);
    }
    scene.y_axis.opacity.set(1.0, FADE_MS, now);
    scene.x_axis.opacity.set(1.0, FADE_MS, now);
    Ok(())
}

fn step_texts(curves: &[Curve]) -> Vec<StepText> {
    let mut steps = vec![
        StepText {
            title: "Tuits sospechosos".to_owned(),
            body: "Algunos tuits de campaña acumulan cientos de retweets en \
                   segundos. Veamos cómo se ve eso, curva por curva."
                .to_owned(),
        },
        StepText {
            title: "Un despegue normal".to_owned(),
            body: "Así crece un tuit retuiteado por gente de verdad: despacio \
                   al principio, después en oleadas."
                .to_owned(),
        },
    ];
    for (index, curve) in curves.iter().skip(1).enumerate() {
        steps.push(StepText {
            title: format!("Sospechoso #{}", index + 1),
            body: curve.text.clone(),
        });
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RetweetEvent;

    fn instant(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    fn tweet(id: &str, text: &str, retweet_millis: &[i64]) -> Tweet {
        Tweet {
            id: id.to_owned(),
            text: text.to_owned(),
            retweets: retweet_millis
                .iter()
                .map(|&millis| RetweetEvent {
                    created_at: instant(millis),
                })
                .collect(),
        }
    }

    fn now() -> DateTime<Utc> {
        instant(1_000_000)
    }

    fn story() -> Story {
        let featured = tweet("t-real", "Gracias por el apoyo", &[1000, 5000, 9000, 20_000]);
        let suspects = vec![
            tweet("t-bot-1", "RT masivo inmediato", &[1000, 1000, 1000, 1200]),
            tweet("t-bot-2", "Otro pico vertical", &[2000, 2000, 2500]),
        ];
        build(featured, suspects, now()).unwrap()
    }

    #[test]
    fn one_section_per_tweet_plus_the_title() {
        let story = story();
        assert_eq!(story.controller.section_count(), 4);
        assert_eq!(story.steps.len(), 4);
    }

    #[test]
    fn activating_a_tweet_step_draws_its_curve() {
        let mut story = story();
        story.controller.activate(&mut story.scene, 1, 0.0).unwrap();

        let series = story.scene.series_mut("area").unwrap();
        // 4 distinct timestamps plus the now-anchor.
        assert_eq!(series.points.len(), 5);
        assert_eq!(series.opacity.target(), 1.0);
        assert_eq!(series.reveal.target(), 1.0);
        assert_eq!(story.scene.y_axis.opacity.target(), 1.0);
    }

    #[test]
    fn duplicate_timestamps_collapse_into_one_point() {
        let mut story = story();
        story.controller.activate(&mut story.scene, 2, 1.0).unwrap();

        // t-bot-1: timestamps {1000 x3, 1200} + anchor -> 3 curve points.
        let series = story.scene.series_mut("area").unwrap();
        assert_eq!(series.points.len(), 3);
        // The curve is monotonically rising (screen y falls left to right).
        assert!(series.points.windows(2).all(|pair| pair[1].y < pair[0].y));
    }

    #[test]
    fn tweet_text_follows_the_active_step() {
        let mut story = story();
        story.controller.activate(&mut story.scene, 3, 0.0).unwrap();
        let label = story.scene.label_mut("tweet-text").unwrap();
        assert_eq!(label.text, "Otro pico vertical");
        assert_eq!(label.opacity.target(), 1.0);
    }

    #[test]
    fn curve_cut_off_past_the_cumulative_cap() {
        // 250 retweets in one second: the first bucket already exceeds the
        // cap, so nothing is left to chart and activation fails loudly.
        let flood: Vec<i64> = vec![1000; 250];
        let featured = tweet("t-flood", "pico imposible", &flood);
        let mut story = build(featured, vec![tweet("s", "x", &[1000])], now()).unwrap();

        let error = story
            .controller
            .activate(&mut story.scene, 1, 0.0)
            .unwrap_err();
        assert!(format!("{error:#}").contains("t-flood"));
        // The controller stayed on the title step.
        assert_eq!(story.controller.last_index(), 0);
    }

    #[test]
    fn scrolling_back_restores_the_title() {
        let mut story = story();
        story.controller.activate(&mut story.scene, 3, 0.0).unwrap();
        story.controller.activate(&mut story.scene, 0, 1.0).unwrap();

        let title = story.scene.label_mut("vis-title.1").unwrap();
        assert_eq!(title.opacity.target(), 1.0);
        let series = story.scene.series_mut("area").unwrap();
        assert_eq!(series.opacity.target(), 0.0);
    }
}
