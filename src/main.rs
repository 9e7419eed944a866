mod app;
mod data;
mod metrics;
mod scale;
mod scene;
mod scroll;
mod stories;
mod util;

use std::path::PathBuf;

use clap::Parser;

use crate::data::StoryKind;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding the story datasets (JSON).
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Which scroll story to present.
    #[arg(long, value_enum, default_value_t = StoryKind::Followers)]
    story: StoryKind,
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "scrollyvis",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ScrollyVisApp::new(
                cc,
                args.data_dir.clone(),
                args.story,
            )))
        }),
    )
}
