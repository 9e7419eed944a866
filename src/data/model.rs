use chrono::{DateTime, Utc};

/// Which scroll story the app presents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum StoryKind {
    /// Who follows whom among the candidates.
    Followers,
    /// Retweet ranking bars and follower-growth lines.
    Ranking,
    /// Cumulative retweet curves for suspicious tweets.
    Shady,
}

/// A tracked account, keyed by its unique handle.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub handle: String,
    pub name: String,
    pub img: String,
    pub political_index: f64,
}

/// A directed follow relation between two handles. Immutable once loaded;
/// the edge set is the sole source of truth for follower counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FollowEdge {
    pub source: String,
    pub target: String,
}

impl FollowEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A single retweet of a parent tweet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetweetEvent {
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    pub retweets: Vec<RetweetEvent>,
}

#[derive(Clone, Copy, Debug)]
pub struct GrowthPoint {
    pub date: DateTime<Utc>,
    pub count: f64,
}

#[derive(Clone, Debug)]
pub struct GrowthSeries {
    pub handle: String,
    pub points: Vec<GrowthPoint>,
}

/// One row of the retweet-count ranking.
#[derive(Clone, Debug)]
pub struct RankingRow {
    pub handle: String,
    pub name: String,
    pub img: String,
    pub retweet_count: u64,
}

/// Everything a story needs, loaded and validated up front. A story is only
/// constructed once all of its datasets have arrived intact.
#[derive(Clone, Debug)]
pub enum StoryData {
    Followers {
        candidates: Vec<Candidate>,
        edges: Vec<FollowEdge>,
    },
    Ranking {
        rows: Vec<RankingRow>,
        growth: Vec<GrowthSeries>,
    },
    Shady {
        featured: Tweet,
        suspects: Vec<Tweet>,
    },
}
