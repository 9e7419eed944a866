//! The three scroll stories. Each builder turns its loaded datasets into a
//! scene, a section controller wired with that story's step handlers, and
//! the narration text shown in the step column.

mod followers;
mod ranking;
mod shady;

use anyhow::Result;
use chrono::Utc;

use crate::data::StoryData;
use crate::scene::Scene;
use crate::scroll::SectionController;

pub struct StepText {
    pub title: String,
    pub body: String,
}

pub struct Story {
    pub title: &'static str,
    pub scene: Scene,
    pub controller: SectionController,
    pub steps: Vec<StepText>,
}

impl std::fmt::Debug for Story {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Story")
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

pub fn build(data: StoryData) -> Result<Story> {
    match data {
        StoryData::Followers { candidates, edges } => followers::build(candidates, edges),
        StoryData::Ranking { rows, growth } => ranking::build(rows, growth),
        StoryData::Shady { featured, suspects } => shady::build(featured, suspects, Utc::now()),
    }
}
