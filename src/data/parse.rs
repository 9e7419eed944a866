use std::collections::HashSet;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use super::model::{
    Candidate, FollowEdge, GrowthPoint, GrowthSeries, RankingRow, RetweetEvent, Tweet,
};

/// The fixed-millisecond format the upstream exporter writes timestamps in.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

#[derive(Clone, Debug, Deserialize)]
struct RawCandidate {
    #[serde(rename = "screenName")]
    screen_name: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    img: String,
    #[serde(rename = "politicalIndex", default)]
    political_index: f64,
}

#[derive(Clone, Debug, Deserialize)]
struct RawEdge {
    source: String,
    target: String,
}

#[derive(Clone, Debug, Deserialize)]
struct RawRetweet {
    created_at: String,
}

#[derive(Clone, Debug, Deserialize)]
struct RawTweet {
    #[serde(rename = "id_tweet", default)]
    id: Option<serde_json::Value>,
    #[serde(rename = "tweet_text", default)]
    text: String,
    #[serde(rename = "Retweets", default)]
    retweets: Vec<RawRetweet>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawGrowthPoint {
    date: String,
    // The upstream exporter names this field `cambio`.
    #[serde(alias = "cambio")]
    count: f64,
}

#[derive(Clone, Debug, Deserialize)]
struct RawGrowthSeries {
    twitter_handle: String,
    #[serde(default)]
    growth: Vec<RawGrowthPoint>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawRankingRow {
    twitter_handle: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    img: String,
    #[serde(rename = "retweet_count", alias = "cuenta_retweets", default)]
    retweet_count: u64,
}

pub(super) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parses retweet timestamps, dropping the ones that fail to parse. A bad
/// timestamp is a data error in one event, not a reason to abort the render.
fn convert_retweets(raw: Vec<RawRetweet>, tweet_id: &str) -> Vec<RetweetEvent> {
    raw.into_iter()
        .filter_map(|retweet| match parse_timestamp(&retweet.created_at) {
            Some(created_at) => Some(RetweetEvent { created_at }),
            None => {
                log::warn!(
                    "skipping retweet of tweet {tweet_id} with malformed timestamp {:?}",
                    retweet.created_at
                );
                None
            }
        })
        .collect()
}

fn convert_tweet(raw: RawTweet, fallback_id: usize) -> Tweet {
    let id = match raw.id {
        Some(serde_json::Value::String(id)) => id,
        Some(value) => value.to_string(),
        None => format!("tweet-{fallback_id}"),
    };
    let retweets = convert_retweets(raw.retweets, &id);
    Tweet {
        id,
        text: raw.text,
        retweets,
    }
}

pub(super) fn parse_candidates(raw: &str) -> Result<Vec<Candidate>> {
    let parsed: Vec<RawCandidate> =
        serde_json::from_str(raw).context("invalid candidate list JSON")?;
    if parsed.is_empty() {
        return Err(anyhow!("candidate list is empty"));
    }

    Ok(parsed
        .into_iter()
        .map(|candidate| Candidate {
            handle: candidate.screen_name,
            name: candidate.name,
            img: candidate.img,
            political_index: candidate.political_index,
        })
        .collect())
}

/// Edges reference candidates by handle; an edge endpoint that does not
/// resolve to a known candidate is a load error, not a silent drop.
pub(super) fn parse_edges(raw: &str, candidates: &[Candidate]) -> Result<Vec<FollowEdge>> {
    let parsed: Vec<RawEdge> = serde_json::from_str(raw).context("invalid follow edge JSON")?;
    let known = candidates
        .iter()
        .map(|candidate| candidate.handle.as_str())
        .collect::<HashSet<_>>();

    let mut edges = Vec::with_capacity(parsed.len());
    for edge in parsed {
        for endpoint in [&edge.source, &edge.target] {
            if !known.contains(endpoint.as_str()) {
                return Err(anyhow!("follow edge references unknown handle {endpoint}"));
            }
        }
        edges.push(FollowEdge::new(edge.source, edge.target));
    }
    Ok(edges)
}

pub(super) fn parse_tweets(raw: &str) -> Result<Vec<Tweet>> {
    let parsed: Vec<RawTweet> = serde_json::from_str(raw).context("invalid tweet list JSON")?;
    Ok(parsed
        .into_iter()
        .enumerate()
        .map(|(index, tweet)| convert_tweet(tweet, index))
        .collect())
}

pub(super) fn parse_tweet(raw: &str) -> Result<Tweet> {
    let parsed: RawTweet = serde_json::from_str(raw).context("invalid tweet JSON")?;
    Ok(convert_tweet(parsed, 0))
}

pub(super) fn parse_growth(raw: &str) -> Result<Vec<GrowthSeries>> {
    let parsed: Vec<RawGrowthSeries> =
        serde_json::from_str(raw).context("invalid growth series JSON")?;

    Ok(parsed
        .into_iter()
        .map(|series| {
            let points = series
                .growth
                .into_iter()
                .filter_map(|point| match parse_timestamp(&point.date) {
                    Some(date) => Some(GrowthPoint {
                        date,
                        count: point.count,
                    }),
                    None => {
                        log::warn!(
                            "skipping growth point for {} with malformed date {:?}",
                            series.twitter_handle,
                            point.date
                        );
                        None
                    }
                })
                .collect();
            GrowthSeries {
                handle: series.twitter_handle,
                points,
            }
        })
        .collect())
}

pub(super) fn parse_ranking(raw: &str) -> Result<Vec<RankingRow>> {
    let parsed: Vec<RawRankingRow> =
        serde_json::from_str(raw).context("invalid ranking JSON")?;
    if parsed.is_empty() {
        return Err(anyhow!("ranking list is empty"));
    }

    Ok(parsed
        .into_iter()
        .map(|row| RankingRow {
            handle: row.twitter_handle,
            name: row.name,
            img: row.img,
            retweet_count: row.retweet_count,
        })
        .collect())
}
