use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use eframe::egui::{self, Context};

use crate::data::{StoryData, StoryKind, load_story_data};
use crate::stories::{self, Story};

mod view;

pub struct ScrollyVisApp {
    data_dir: PathBuf,
    story_kind: StoryKind,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<StoryData, String>>,
    },
    Ready(Box<ViewState>),
    Error(String),
}

struct ViewState {
    story: Story,
    active_index: Option<usize>,
    scroll_offset: f32,
}

impl ViewState {
    fn new(story: Story) -> Self {
        Self {
            story,
            active_index: None,
            scroll_offset: 0.0,
        }
    }
}

impl ScrollyVisApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, data_dir: PathBuf, story_kind: StoryKind) -> Self {
        let state = Self::start_load(data_dir.clone(), story_kind);
        Self {
            data_dir,
            story_kind,
            state,
        }
    }

    fn spawn_load(data_dir: PathBuf, story: StoryKind) -> Receiver<Result<StoryData, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_story_data(&data_dir, story).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_dir: PathBuf, story: StoryKind) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_dir, story),
        }
    }
}

impl eframe::App for ScrollyVisApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    // Story construction happens here, on the UI thread: the
                    // step handlers close over the scene and are not Send.
                    transition = Some(match result.map(stories::build) {
                        Ok(Ok(story)) => AppState::Ready(Box::new(ViewState::new(story))),
                        Ok(Err(error)) => AppState::Error(format!("{error:#}")),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Cargando los datos de la historia...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("No se pudo preparar la historia");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Reintentar").clicked() {
                        transition =
                            Some(Self::start_load(self.data_dir.clone(), self.story_kind));
                    }
                });
            }
            AppState::Ready(view) => {
                if let Err(error) = view.show(ctx) {
                    transition = Some(AppState::Error(format!("{error:#}")));
                }
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
