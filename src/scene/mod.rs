//! Retained scene the step handlers mutate and the view paints. Elements
//! carry tweened attributes; handlers set targets with explicit durations
//! and the painter samples them at the current frame time.

mod anim;

pub use anim::{Anim, AnimVec2};

use eframe::egui::{Color32, Pos2, Vec2};

use crate::scale::{BandScale, LinearScale, TimeScale};

#[derive(Clone, Copy, Debug)]
pub struct Margins {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

pub struct Label {
    pub id: String,
    pub text: String,
    pub pos: Pos2,
    pub font_size: f32,
    pub opacity: Anim,
}

/// A candidate mark: a colored circle with the candidate's initials,
/// standing in for the avatar images the datasets reference by URL.
pub struct NodeMark {
    pub handle: String,
    pub name: String,
    pub label: String,
    pub color: Color32,
    pub pos: AnimVec2,
    pub radius: Anim,
    pub opacity: Anim,
    /// 0 = full color, 1 = fully greyed out.
    pub grey: Anim,
}

pub struct LinkMark {
    pub source: String,
    pub target: String,
    pub from: AnimVec2,
    pub to: AnimVec2,
    pub opacity: Anim,
}

pub struct BarMark {
    pub handle: String,
    pub x: f32,
    pub width: f32,
    pub top: f32,
    pub bottom: f32,
    pub color: Color32,
    pub opacity: Anim,
}

/// A polyline series, optionally filled down to a baseline. `reveal` clips
/// the series horizontally, 0 = hidden, 1 = fully drawn.
pub struct SeriesMark {
    pub id: String,
    pub points: Vec<Pos2>,
    pub color: Color32,
    pub filled: bool,
    pub baseline: f32,
    pub opacity: Anim,
    pub reveal: Anim,
}

pub struct Tick {
    pub at: f32,
    pub text: String,
}

pub struct Axis {
    pub ticks: Vec<Tick>,
    pub opacity: Anim,
}

impl Axis {
    fn hidden() -> Self {
        Self {
            ticks: Vec::new(),
            opacity: Anim::fixed(0.0),
        }
    }
}

pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
    pub x: LinearScale,
    pub y: LinearScale,
    pub x_time: Option<TimeScale>,
    pub x_band: Option<BandScale>,
    pub labels: Vec<Label>,
    pub nodes: Vec<NodeMark>,
    pub links: Vec<LinkMark>,
    pub bars: Vec<BarMark>,
    pub series: Vec<SeriesMark>,
    pub y_axis: Axis,
    pub x_axis: Axis,
}

impl Scene {
    pub fn new(width: f32, height: f32, margins: Margins) -> Self {
        Self {
            width,
            height,
            margins,
            x: LinearScale::new((0.0, 1.0), (0.0, width)),
            y: LinearScale::new((0.0, 1.0), (height, 0.0)),
            x_time: None,
            x_band: None,
            labels: Vec::new(),
            nodes: Vec::new(),
            links: Vec::new(),
            bars: Vec::new(),
            series: Vec::new(),
            y_axis: Axis::hidden(),
            x_axis: Axis::hidden(),
        }
    }

    pub fn add_label(&mut self, id: &str, text: &str, pos: Pos2, font_size: f32) {
        self.labels.push(Label {
            id: id.to_owned(),
            text: text.to_owned(),
            pos,
            font_size,
            opacity: Anim::fixed(0.0),
        });
    }

    pub fn label_mut(&mut self, id: &str) -> Option<&mut Label> {
        self.labels.iter_mut().find(|label| label.id == id)
    }

    pub fn labels_with_prefix(&mut self, prefix: &str) -> impl Iterator<Item = &mut Label> {
        self.labels
            .iter_mut()
            .filter(move |label| label.id.starts_with(prefix))
    }

    pub fn node_mut(&mut self, handle: &str) -> Option<&mut NodeMark> {
        self.nodes.iter_mut().find(|node| node.handle == handle)
    }

    pub fn series_mut(&mut self, id: &str) -> Option<&mut SeriesMark> {
        self.series.iter_mut().find(|series| series.id == id)
    }

    /// Points the y scale at a new domain and rebuilds the axis ticks. The
    /// topmost tick carries the unit so the axis reads as a sentence, the
    /// way the source pages label their axes.
    pub fn set_y_domain(&mut self, domain: (f64, f64), unit: &str) {
        self.y.set_domain(domain);
        let ticks = self.y.ticks(6);
        let top = ticks.iter().copied().fold(f64::MIN, f64::max);
        self.y_axis.ticks = ticks
            .into_iter()
            .map(|value| {
                let text = if value == top && !unit.is_empty() {
                    format!("{} {unit}", format_tick(value))
                } else {
                    format_tick(value)
                };
                Tick {
                    at: self.y.scale(value),
                    text,
                }
            })
            .collect();
    }

    /// Installs a time scale on the x axis and rebuilds its ticks.
    pub fn set_x_time(&mut self, scale: TimeScale, tick_count: usize) {
        self.x_axis.ticks = scale
            .ticks(tick_count)
            .into_iter()
            .map(|at| Tick {
                at: scale.scale(at),
                text: at.format("%d %b %H:%M").to_string(),
            })
            .collect();
        self.x_time = Some(scale);
    }

    /// True while any attribute is mid-transition; drives repaint requests.
    pub fn any_animating(&self, now: f64) -> bool {
        self.labels.iter().any(|label| label.opacity.animating(now))
            || self.nodes.iter().any(|node| {
                node.pos.animating(now)
                    || node.radius.animating(now)
                    || node.opacity.animating(now)
                    || node.grey.animating(now)
            })
            || self.links.iter().any(|link| {
                link.from.animating(now) || link.to.animating(now) || link.opacity.animating(now)
            })
            || self.bars.iter().any(|bar| bar.opacity.animating(now))
            || self.series.iter().any(|series| {
                series.opacity.animating(now) || series.reveal.animating(now)
            })
            || self.y_axis.opacity.animating(now)
            || self.x_axis.opacity.animating(now)
    }
}

fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{}", value as i64)
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    fn scene() -> Scene {
        Scene::new(
            710.0,
            500.0,
            Margins {
                top: 0.0,
                left: 20.0,
                bottom: 40.0,
                right: 10.0,
            },
        )
    }

    #[test]
    fn label_lookup_by_id_and_prefix() {
        let mut scene = scene();
        scene.add_label("vis-title.main", "¿QUIÉN SIGUE A QUIÉN?", pos2(0.0, 0.0), 28.0);
        scene.add_label("vis-title.sub", "Las redes", pos2(0.0, 40.0), 18.0);
        scene.add_label("axis.y", "seguidores", pos2(0.0, 80.0), 12.0);

        assert!(scene.label_mut("vis-title.sub").is_some());
        assert_eq!(scene.labels_with_prefix("vis-title").count(), 2);
    }

    #[test]
    fn y_domain_change_rebuilds_ticks_with_unit_on_top() {
        let mut scene = scene();
        scene.y = LinearScale::new((0.0, 1.0), (450.0, 50.0));
        scene.set_y_domain((0.0, 40.0), "seguidores");

        assert!(!scene.y_axis.ticks.is_empty());
        let top = scene
            .y_axis
            .ticks
            .iter()
            .max_by(|a, b| a.text.len().cmp(&b.text.len()))
            .unwrap();
        assert!(top.text.ends_with("seguidores"));
        // Ticks land inside the pixel range.
        assert!(scene.y_axis.ticks.iter().all(|t| t.at >= 50.0 && t.at <= 450.0));
    }

    #[test]
    fn animation_tracking_covers_node_attributes() {
        let mut scene = scene();
        scene.nodes.push(NodeMark {
            handle: "petrogustavo".to_owned(),
            name: "Gustavo Petro".to_owned(),
            label: "GP".to_owned(),
            color: Color32::RED,
            pos: AnimVec2::fixed(Vec2::ZERO),
            radius: Anim::fixed(15.0),
            opacity: Anim::fixed(0.0),
            grey: Anim::fixed(0.0),
        });
        assert!(!scene.any_animating(0.0));

        scene
            .node_mut("petrogustavo")
            .unwrap()
            .opacity
            .set(1.0, 600.0, 0.0);
        assert!(scene.any_animating(0.3));
        assert!(!scene.any_animating(1.0));
    }
}
