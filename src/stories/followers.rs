//! "¿Quién sigue a quién?" — the follow-graph story. Candidates sit on a
//! political-index x scale; the y scale carries their follower (later,
//! following) counts, recomputed from the edge list on every layout.

use std::collections::HashMap;

use anyhow::Result;
use eframe::egui::{Vec2, pos2, vec2};

use crate::data::{Candidate, FollowEdge};
use crate::metrics::{self, FollowMetric};
use crate::scale::{LinearScale, domain_extent};
use crate::scene::{Anim, AnimVec2, LinkMark, Margins, NodeMark, Scene};
use crate::scroll::{SectionController, SectionSetBuilder};
use crate::util::{OrdinalColors, initials};

use super::{StepText, Story};

const WIDTH: f32 = 710.0;
const HEIGHT: f32 = 500.0;
const MARGINS: Margins = Margins {
    top: 0.0,
    left: 20.0,
    bottom: 40.0,
    right: 10.0,
};
const MAIN_NODE_R: f32 = 27.0;
const NEIGH_NODE_R: f32 = 20.0;
const NODE_R: f32 = 15.0;
const FADE_MS: f64 = 600.0;

pub(super) fn build(candidates: Vec<Candidate>, edges: Vec<FollowEdge>) -> Result<Story> {
    let mut scene = Scene::new(WIDTH, HEIGHT, MARGINS);
    scene.x = LinearScale::new((0.0, 100.0), (50.0, WIDTH - 50.0));
    scene.y = LinearScale::new((0.0, 1.0), (HEIGHT - 50.0, 50.0));

    let domain = metric_domain(&candidates, &edges, FollowMetric::Followers)?;
    scene.set_y_domain(domain, FollowMetric::Followers.unit());

    scene.add_label(
        "vis-title.main",
        "¿QUIÉN SIGUE A QUIÉN?",
        pos2(WIDTH / 2.0, HEIGHT / 5.0),
        30.0,
    );
    scene.add_label(
        "vis-title.sub",
        "Las redes entre los candidatos",
        pos2(WIDTH / 2.0, (HEIGHT / 5.0) + (HEIGHT / 10.0)),
        18.0,
    );

    let positions = layout_positions(&scene, &candidates, &edges, FollowMetric::Followers);
    for edge in &edges {
        let from = positions.get(&edge.source).copied().unwrap_or(Vec2::ZERO);
        let to = positions.get(&edge.target).copied().unwrap_or(Vec2::ZERO);
        scene.links.push(LinkMark {
            source: edge.source.clone(),
            target: edge.target.clone(),
            from: AnimVec2::fixed(from),
            to: AnimVec2::fixed(to),
            opacity: Anim::fixed(0.0),
        });
    }

    let mut colors = OrdinalColors::category10();
    for candidate in &candidates {
        let at = positions
            .get(&candidate.handle)
            .copied()
            .unwrap_or(Vec2::ZERO);
        scene.nodes.push(NodeMark {
            handle: candidate.handle.clone(),
            name: candidate.name.clone(),
            label: initials(&candidate.name),
            color: colors.color(&candidate.handle),
            pos: AnimVec2::fixed(at),
            radius: Anim::fixed(NODE_R),
            opacity: Anim::fixed(0.0),
            grey: Anim::fixed(0.0),
        });
    }

    let sections = SectionSetBuilder::new()
        .on_activate(0, |scene, now| {
            show_title(scene, now);
            Ok(())
        })
        .on_activate(1, |scene, now| {
            show_graph(scene, now);
            Ok(())
        })
        .on_activate(2, {
            let edges = edges.clone();
            move |scene, now| {
                highlight_followers(scene, &["TimoFARC", "LuisAlfreRamos"], &edges, now);
                Ok(())
            }
        })
        .on_activate(3, {
            let edges = edges.clone();
            move |scene, now| {
                highlight_followers(scene, &["JERobledo"], &edges, now);
                Ok(())
            }
        })
        .on_activate(4, {
            let candidates = candidates.clone();
            let edges = edges.clone();
            move |scene, now| {
                reposition(scene, &candidates, &edges, FollowMetric::Followers, now)?;
                highlight_followers(scene, &["mluciaramirez"], &edges, now);
                Ok(())
            }
        })
        .on_activate(5, {
            let candidates = candidates.clone();
            let edges = edges.clone();
            move |scene, now| {
                reset_nodes(scene);
                reposition(scene, &candidates, &edges, FollowMetric::Following, now)?;
                scene.y_axis.opacity.set(1.0, FADE_MS, now);
                Ok(())
            }
        })
        .on_activate(6, |scene, now| {
            // The source page highlights Vargas without passing the edge
            // list, so only the node itself grows. Kept as-is.
            highlight_following(scene, "German_Vargas", &[], now);
            Ok(())
        })
        .on_activate(7, {
            let candidates = candidates.clone();
            let edges = edges.clone();
            move |scene, now| {
                reposition(scene, &candidates, &edges, FollowMetric::Following, now)?;
                highlight_following(scene, "CarlosHolmesTru", &edges, now);
                Ok(())
            }
        })
        .on_activate(8, {
            let candidates = candidates.clone();
            let edges = edges.clone();
            move |scene, now| {
                reset_nodes(scene);
                reposition(scene, &candidates, &edges, FollowMetric::Followers, now)?;
                scene.y_axis.opacity.set(1.0, FADE_MS, now);
                Ok(())
            }
        })
        .build()?;

    Ok(Story {
        title: "¿Quién sigue a quién?",
        scene,
        controller: SectionController::new(sections),
        steps: step_texts(),
    })
}

fn metric_domain(
    candidates: &[Candidate],
    edges: &[FollowEdge],
    metric: FollowMetric,
) -> Result<(f64, f64)> {
    domain_extent(
        candidates
            .iter()
            .map(|candidate| metric.count(&candidate.handle, edges) as f64),
    )
}

fn layout_positions(
    scene: &Scene,
    candidates: &[Candidate],
    edges: &[FollowEdge],
    metric: FollowMetric,
) -> HashMap<String, Vec2> {
    candidates
        .iter()
        .map(|candidate| {
            let count = metric.count(&candidate.handle, edges) as f64;
            let at = vec2(
                scene.x.scale(candidate.political_index),
                scene.y.scale(count),
            );
            (candidate.handle.clone(), at)
        })
        .collect()
}

fn show_title(scene: &mut Scene, now: f64) {
    scene.y_axis.opacity.jump(0.0);
    for link in &mut scene.links {
        link.opacity.jump(0.0);
    }
    for node in &mut scene.nodes {
        node.opacity.set(0.0, FADE_MS, now);
    }
    for label in scene.labels_with_prefix("vis-title") {
        label.opacity.set(1.0, FADE_MS, now);
    }
}

fn show_graph(scene: &mut Scene, now: f64) {
    for label in scene.labels_with_prefix("vis-title") {
        label.opacity.set(0.0, FADE_MS, now);
    }
    for link in &mut scene.links {
        link.opacity.set(0.0, FADE_MS, now);
    }
    for node in &mut scene.nodes {
        node.grey.set(0.0, FADE_MS, now);
        node.opacity.set(1.0, FADE_MS, now);
        node.radius.set(NODE_R, FADE_MS, now);
    }
    scene.y_axis.opacity.set(1.0, FADE_MS, now);
}

/// Grows the focus nodes and their followers, greys out everyone else, and
/// lights only the edges pointing at a focus handle.
fn highlight_followers(scene: &mut Scene, focus: &[&str], edges: &[FollowEdge], now: f64) {
    for node in &mut scene.nodes {
        if focus.contains(&node.handle.as_str()) {
            node.radius.set(MAIN_NODE_R, FADE_MS, now);
            node.grey.set(0.0, FADE_MS, now);
            node.opacity.set(1.0, FADE_MS, now);
        } else if focus
            .iter()
            .any(|handle| metrics::is_follower(&node.handle, handle, edges))
        {
            node.radius.set(NEIGH_NODE_R, FADE_MS, now);
            node.grey.set(0.0, FADE_MS, now);
            node.opacity.set(1.0, FADE_MS, now);
        } else {
            node.radius.set(NODE_R, FADE_MS, now);
            node.grey.set(1.0, FADE_MS, now);
            node.opacity.set(0.7, FADE_MS, now);
        }
    }

    for link in &mut scene.links {
        let lit = focus.contains(&link.target.as_str());
        link.opacity.set(if lit { 1.0 } else { 0.0 }, FADE_MS, now);
    }
    scene.y_axis.opacity.set(1.0, FADE_MS, now);
}

/// The dual of `highlight_followers`: grows the accounts the focus handle
/// follows and lights the edges leaving it.
fn highlight_following(scene: &mut Scene, focus: &str, edges: &[FollowEdge], now: f64) {
    for node in &mut scene.nodes {
        if node.handle == focus {
            node.radius.set(MAIN_NODE_R, FADE_MS, now);
            node.grey.set(0.0, FADE_MS, now);
            node.opacity.set(1.0, FADE_MS, now);
        } else if metrics::is_followed_by(&node.handle, focus, edges) {
            node.radius.set(NEIGH_NODE_R, FADE_MS, now);
            node.grey.set(0.0, FADE_MS, now);
            node.opacity.set(1.0, FADE_MS, now);
        } else {
            node.radius.set(NODE_R, FADE_MS, now);
            node.grey.set(1.0, FADE_MS, now);
            node.opacity.set(0.7, FADE_MS, now);
        }
    }

    for link in &mut scene.links {
        let lit = link.source == focus;
        link.opacity.set(if lit { 1.0 } else { 0.0 }, FADE_MS, now);
    }
    scene.y_axis.opacity.set(1.0, FADE_MS, now);
}

/// Re-derives the y domain for `metric`, moves every node to its new spot,
/// and snaps the (hidden) links to the matching endpoints.
fn reposition(
    scene: &mut Scene,
    candidates: &[Candidate],
    edges: &[FollowEdge],
    metric: FollowMetric,
    now: f64,
) -> Result<()> {
    let domain = metric_domain(candidates, edges, metric)?;
    scene.set_y_domain(domain, metric.unit());

    let positions = layout_positions(scene, candidates, edges, metric);
    for node in &mut scene.nodes {
        if let Some(target) = positions.get(&node.handle) {
            node.pos.set(*target, FADE_MS, now);
        }
    }
    for link in &mut scene.links {
        if let Some(at) = positions.get(&link.source) {
            link.from.jump(*at);
        }
        if let Some(at) = positions.get(&link.target) {
            link.to.jump(*at);
        }
        link.opacity.jump(0.0);
    }
    Ok(())
}

fn reset_nodes(scene: &mut Scene) {
    for node in &mut scene.nodes {
        node.grey.jump(0.0);
        node.radius.jump(NODE_R);
        node.opacity.jump(1.0);
    }
}

fn step_texts() -> Vec<StepText> {
    let step = |title: &str, body: &str| StepText {
        title: title.to_owned(),
        body: body.to_owned(),
    };
    vec![
        step(
            "¿Quién sigue a quién?",
            "Las cuentas de Twitter de los candidatos presidenciales forman \
             una red: unos se siguen entre sí, otros se ignoran por completo.",
        ),
        step(
            "La red completa",
            "Cada candidato aparece según su posición en el espectro político \
             y la cantidad de candidatos que lo siguen.",
        ),
        step(
            "Timochenko y Ramos",
            "Los extremos del espectro: pocos candidatos siguen a TimoFARC o \
             a LuisAlfreRamos.",
        ),
        step(
            "Robledo",
            "JERobledo es de los más seguidos por los demás candidatos.",
        ),
        step(
            "Marta Lucía Ramírez",
            "mluciaramirez recibe seguidores de ambos lados del espectro.",
        ),
        step(
            "¿Y a quién siguen?",
            "El eje cambia: ahora la altura muestra a cuántos candidatos \
             sigue cada cuenta.",
        ),
        step(
            "Vargas Lleras",
            "German_Vargas casi no sigue a ningún otro candidato.",
        ),
        step(
            "Holmes Trujillo",
            "CarlosHolmesTru, en cambio, sigue a buena parte de sus rivales.",
        ),
        step(
            "Explora la red",
            "De vuelta al mapa de seguidores: recorre la red completa.",
        ),
    ]
}
