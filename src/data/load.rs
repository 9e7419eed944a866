use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use super::model::{StoryData, StoryKind};
use super::parse::{
    parse_candidates, parse_edges, parse_growth, parse_ranking, parse_tweet, parse_tweets,
};

/// Loads every dataset a story needs from `data_dir`. All-or-nothing: the
/// first file that fails to read or parse aborts the whole load, so a story
/// is never set up over partial data.
pub fn load_story_data(data_dir: &Path, story: StoryKind) -> Result<StoryData> {
    match story {
        StoryKind::Followers => {
            let candidates = parse_candidates(&read_dataset(data_dir, "candidates.json")?)
                .context("failed to parse candidates.json")?;
            let edges = parse_edges(
                &read_dataset(data_dir, "candidates_friendships.json")?,
                &candidates,
            )
            .context("failed to parse candidates_friendships.json")?;
            Ok(StoryData::Followers { candidates, edges })
        }
        StoryKind::Ranking => {
            let rows = parse_ranking(&read_dataset(data_dir, "retweet_ranking.json")?)
                .context("failed to parse retweet_ranking.json")?;
            let growth = parse_growth(&read_dataset(data_dir, "follower_growth.json")?)
                .context("failed to parse follower_growth.json")?;
            Ok(StoryData::Ranking { rows, growth })
        }
        StoryKind::Shady => {
            let featured = parse_tweet(&read_dataset(data_dir, "featured_tweet.json")?)
                .context("failed to parse featured_tweet.json")?;
            let suspects = parse_tweets(&read_dataset(data_dir, "shady_tweets.json")?)
                .context("failed to parse shady_tweets.json")?;
            if suspects.is_empty() {
                return Err(anyhow!("shady_tweets.json contains no tweets"));
            }
            Ok(StoryData::Shady { featured, suspects })
        }
    }
}

fn read_dataset(data_dir: &Path, name: &str) -> Result<String> {
    let path = data_dir.join(name);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read dataset {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_missing_dataset_aborts_the_load() {
        let missing = Path::new("/nonexistent-data-dir");
        let error = load_story_data(missing, StoryKind::Followers).unwrap_err();
        assert!(error.to_string().contains("candidates.json"));
    }
}
