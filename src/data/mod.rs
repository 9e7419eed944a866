mod load;
mod model;
mod parse;

pub use load::load_story_data;
pub use model::{
    Candidate, FollowEdge, GrowthPoint, GrowthSeries, RankingRow, RetweetEvent, StoryData,
    StoryKind, Tweet,
};
