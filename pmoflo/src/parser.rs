//! Mapping from the raw FLO payload to a [`ChartSnapshot`]
//!
//! The payload is first deserialized into [`raw`] structures whose fields are
//! all optional, then every track is validated into a [`ChartEntry`]. The
//! first missing or invalid field aborts the whole parse: a snapshot is either
//! complete or not produced at all.

use crate::error::ParseError;
use crate::models::{raw, ChartEntry, ChartSnapshot};
use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

/// Local hour at which the daily chart rolls over
pub const ROLLOVER_HOUR: i64 = 22;

static RESIZE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn resize_pattern() -> &'static Regex {
    RESIZE_PATTERN
        .get_or_init(|| Regex::new(r"/dims/resize/\d+x\d+").expect("valid resize pattern"))
}

/// Parse a raw chart payload, stamping it with the current chart date
pub fn parse(payload: &Value, image_size: u32) -> Result<ChartSnapshot, ParseError> {
    parse_at(payload, image_size, Local::now().naive_local())
}

/// Parse a raw chart payload as if the local time were `now`
pub fn parse_at(
    payload: &Value,
    image_size: u32,
    now: NaiveDateTime,
) -> Result<ChartSnapshot, ParseError> {
    let response = raw::ChartResponse::deserialize(payload).map_err(ParseError::Json)?;

    let data = response
        .data
        .ok_or_else(|| ParseError::missing("data"))?;
    let name = data
        .name
        .ok_or_else(|| ParseError::missing("data.name"))?;
    let tracks = data
        .track_list
        .ok_or_else(|| ParseError::missing("data.trackList"))?;

    let entries = tracks
        .into_iter()
        .enumerate()
        .map(|(index, track)| parse_track(index, track, image_size))
        .collect::<Result<Vec<_>, _>>()?;

    #[cfg(feature = "logging")]
    tracing::debug!("Parsed FLO chart '{}' with {} entries", name, entries.len());

    Ok(ChartSnapshot {
        name,
        date: chart_date_at(now),
        image_size,
        entries,
    })
}

fn parse_track(
    index: usize,
    track: raw::Track,
    image_size: u32,
) -> Result<ChartEntry, ParseError> {
    let field = |path: &str| ParseError::missing(format!("data.trackList[{}].{}", index, path));

    let title = track.name.ok_or_else(|| field("name"))?;
    let artist = track
        .representation_artist
        .ok_or_else(|| field("representationArtist"))?
        .name
        .ok_or_else(|| field("representationArtist.name"))?;

    let images = track
        .album
        .ok_or_else(|| field("album"))?
        .img_list
        .ok_or_else(|| field("album.imgList"))?;
    let cover = images
        .into_iter()
        .next()
        .ok_or(ParseError::EmptyImageList { index })?
        .url
        .ok_or_else(|| field("album.imgList[0].url"))?;

    let rank_info = track.rank.ok_or_else(|| field("rank"))?;
    let badge = rank_info
        .rank_badge
        .ok_or_else(|| field("rank.rankBadge"))?;
    let new_yn = rank_info.new_yn.ok_or_else(|| field("rank.newYn"))?;

    let rank = rank_for_index(index)?;
    let last_pos = rank_badge_value(&badge)
        .and_then(|delta| delta.checked_add(i64::from(rank)))
        .ok_or_else(|| ParseError::InvalidRankBadge {
            index,
            value: badge.to_string(),
        })?;

    Ok(ChartEntry {
        title,
        artist,
        image: resize_image_url(&cover, image_size),
        rank,
        last_pos,
        is_new: new_yn == "Y",
    })
}

/// 1-based rank of the track at `index`
fn rank_for_index(index: usize) -> Result<u32, ParseError> {
    index
        .checked_add(1)
        .and_then(|r| u32::try_from(r).ok())
        .ok_or(ParseError::RankOverflow { index })
}

/// Read `rankBadge` as a signed integer, from a numeric string or a number
fn rank_badge_value(badge: &Value) -> Option<i64> {
    match badge {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// Rewrite the `/dims/resize/WxH` segment of a FLO image URL to `size`x`size`
///
/// URLs without the marker are returned unchanged.
///
/// ```
/// use pmoflo::parser::resize_image_url;
///
/// let url = "https://cdn.music-flo.com/image/v2/album/1/dims/resize/500x500/quality/90";
/// assert_eq!(
///     resize_image_url(url, 128),
///     "https://cdn.music-flo.com/image/v2/album/1/dims/resize/128x128/quality/90"
/// );
/// ```
pub fn resize_image_url(url: &str, size: u32) -> String {
    resize_pattern()
        .replace(url, format!("/dims/resize/{}x{}", size, size).as_str())
        .into_owned()
}

/// Date of the chart published at `now`: the latest 22:00 at or before it
pub fn chart_date_at(now: NaiveDateTime) -> NaiveDateTime {
    let rollover = NaiveTime::MIN + TimeDelta::hours(ROLLOVER_HOUR);
    let today = now.date().and_time(rollover);

    if now.time() < rollover {
        today - TimeDelta::days(1)
    } else {
        today
    }
}

/// Date of the chart published now, in local time
pub fn chart_date() -> NaiveDateTime {
    chart_date_at(Local::now().naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn track(name: &str, artist: &str, badge: Value, new_yn: &str) -> Value {
        json!({
            "name": name,
            "representationArtist": { "name": artist },
            "album": {
                "imgList": [
                    { "url": "https://cdn.music-flo.com/image/v2/album/418/565/13/04/413565418_65eff0ee.jpg?1710223604458/dims/resize/500x500/quality/90" },
                    { "url": "https://cdn.music-flo.com/image/v2/album/418/565/13/04/413565418_65eff0ee.jpg?1710223604458/dims/resize/1000x1000/quality/90" }
                ]
            },
            "rank": { "rankBadge": badge, "newYn": new_yn }
        })
    }

    fn payload(tracks: Vec<Value>) -> Value {
        json!({ "data": { "name": "FLO 차트", "trackList": tracks } })
    }

    #[test]
    fn test_ranks_follow_list_order() {
        let raw = payload(vec![
            track("Supernova", "aespa", json!("0"), "N"),
            track("밤양갱", "비비 (BIBI)", json!("1"), "N"),
            track("Magnetic", "ILLIT (아일릿)", json!("-1"), "N"),
        ]);
        let snapshot = parse_at(&raw, 256, at(2024, 5, 20, 12, 0, 0)).unwrap();

        assert_eq!(snapshot.name, "FLO 차트");
        assert_eq!(snapshot.len(), 3);
        for (i, entry) in snapshot.entries.iter().enumerate() {
            assert_eq!(entry.rank as usize, i + 1);
        }
        assert_eq!(snapshot.entries[1].title, "밤양갱");
        assert_eq!(snapshot.entries[1].artist, "비비 (BIBI)");
    }

    #[test]
    fn test_last_pos_worked_example() {
        // rankBadge is read as the signed change from the current position:
        // a track at rank 5 with badge "2" sat at rank 7 last period.
        let mut tracks: Vec<Value> = (0..4)
            .map(|i| track(&format!("t{}", i), "a", json!("0"), "N"))
            .collect();
        tracks.push(track("climber", "a", json!("2"), "N"));
        tracks[0] = track("drop", "a", json!("-3"), "N");

        let snapshot = parse_at(&payload(tracks), 256, at(2024, 5, 20, 12, 0, 0)).unwrap();
        assert_eq!(snapshot.entries[4].rank, 5);
        assert_eq!(snapshot.entries[4].last_pos, 7);
        assert_eq!(snapshot.entries[0].last_pos, -2);
        assert_eq!(snapshot.entries[1].last_pos, 2);
    }

    #[test]
    fn test_rank_badge_overflow_is_error() {
        let raw = payload(vec![track("a", "b", json!("9223372036854775807"), "N")]);
        let err = parse_at(&raw, 256, at(2024, 5, 20, 12, 0, 0)).unwrap_err();
        match err {
            ParseError::InvalidRankBadge { index, value } => {
                assert_eq!(index, 0);
                assert_eq!(value, "\"9223372036854775807\"");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rank_badge_at_lower_bound() {
        let raw = payload(vec![track("a", "b", json!(i64::MIN), "N")]);
        let snapshot = parse_at(&raw, 256, at(2024, 5, 20, 12, 0, 0)).unwrap();
        assert_eq!(snapshot.entries[0].last_pos, i64::MIN + 1);
    }

    #[test]
    fn test_rank_for_index() {
        assert_eq!(rank_for_index(0).unwrap(), 1);
        assert_eq!(rank_for_index(99).unwrap(), 100);
        let err = rank_for_index(u32::MAX as usize).unwrap_err();
        assert!(matches!(err, ParseError::RankOverflow { .. }));
    }

    #[test]
    fn test_numeric_rank_badge_accepted() {
        let raw = payload(vec![track("a", "b", json!(3), "N")]);
        let snapshot = parse_at(&raw, 256, at(2024, 5, 20, 12, 0, 0)).unwrap();
        assert_eq!(snapshot.entries[0].last_pos, 4);
    }

    #[test]
    fn test_invalid_rank_badge() {
        let raw = payload(vec![track("a", "b", json!("NEW"), "Y")]);
        let err = parse_at(&raw, 256, at(2024, 5, 20, 12, 0, 0)).unwrap_err();
        assert!(matches!(err, ParseError::InvalidRankBadge { index: 0, .. }));
    }

    #[test]
    fn test_is_new_only_for_literal_y() {
        let raw = payload(vec![
            track("a", "b", json!("0"), "Y"),
            track("c", "d", json!("0"), "N"),
            track("e", "f", json!("0"), "y"),
            track("g", "h", json!("0"), ""),
        ]);
        let snapshot = parse_at(&raw, 256, at(2024, 5, 20, 12, 0, 0)).unwrap();
        let flags: Vec<bool> = snapshot.entries.iter().map(|e| e.is_new).collect();
        assert_eq!(flags, vec![true, false, false, false]);
    }

    #[test]
    fn test_missing_new_flag_is_error() {
        let mut item = track("a", "b", json!("0"), "N");
        item["rank"].as_object_mut().unwrap().remove("newYn");
        let err = parse_at(&payload(vec![item]), 256, at(2024, 5, 20, 12, 0, 0)).unwrap_err();
        match err {
            ParseError::Missing { path } => assert_eq!(path, "data.trackList[0].rank.newYn"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_artist_fails_whole_parse() {
        let mut broken = track("c", "d", json!("0"), "N");
        broken.as_object_mut().unwrap().remove("representationArtist");
        let raw = payload(vec![track("a", "b", json!("0"), "N"), broken]);

        let err = parse_at(&raw, 256, at(2024, 5, 20, 12, 0, 0)).unwrap_err();
        match err {
            ParseError::Missing { path } => {
                assert_eq!(path, "data.trackList[1].representationArtist")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_type_is_json_error() {
        let raw = json!({ "data": { "name": "chart", "trackList": { "not": "a list" } } });
        let err = parse_at(&raw, 256, at(2024, 5, 20, 12, 0, 0)).unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn test_missing_data() {
        let err = parse_at(&json!({ "code": "2000000" }), 256, at(2024, 5, 20, 12, 0, 0))
            .unwrap_err();
        assert!(matches!(err, ParseError::Missing { ref path } if path == "data"));
    }

    #[test]
    fn test_empty_image_list() {
        let mut item = track("a", "b", json!("0"), "N");
        item["album"]["imgList"] = json!([]);
        let err = parse_at(&payload(vec![item]), 256, at(2024, 5, 20, 12, 0, 0)).unwrap_err();
        assert!(matches!(err, ParseError::EmptyImageList { index: 0 }));
    }

    #[test]
    fn test_empty_track_list() {
        let snapshot = parse_at(&payload(vec![]), 256, at(2024, 5, 20, 12, 0, 0)).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_first_image_is_resized() {
        let raw = payload(vec![track("a", "b", json!("0"), "N")]);
        let snapshot = parse_at(&raw, 128, at(2024, 5, 20, 12, 0, 0)).unwrap();
        assert_eq!(snapshot.image_size, 128);
        assert_eq!(
            snapshot.entries[0].image,
            "https://cdn.music-flo.com/image/v2/album/418/565/13/04/413565418_65eff0ee.jpg?1710223604458/dims/resize/128x128/quality/90"
        );
    }

    #[test]
    fn test_resize_rewrites_single_segment() {
        let url = "https://cdn.music-flo.com/a/300x300/dims/resize/300x300/quality/90";
        let resized = resize_image_url(url, 128);
        assert_eq!(
            resized,
            "https://cdn.music-flo.com/a/300x300/dims/resize/128x128/quality/90"
        );
        assert_eq!(resized.matches("/dims/resize/128x128/").count(), 1);
    }

    #[test]
    fn test_resize_without_marker() {
        let url = "https://cdn.music-flo.com/image/album/1.jpg";
        assert_eq!(resize_image_url(url, 128), url);
    }

    #[test]
    fn test_chart_date_before_rollover() {
        assert_eq!(
            chart_date_at(at(2024, 3, 1, 21, 59, 59)),
            at(2024, 2, 29, 22, 0, 0)
        );
    }

    #[test]
    fn test_chart_date_after_rollover() {
        assert_eq!(
            chart_date_at(at(2024, 3, 1, 22, 0, 1)),
            at(2024, 3, 1, 22, 0, 0)
        );
        assert_eq!(
            chart_date_at(at(2024, 3, 1, 22, 0, 0)),
            at(2024, 3, 1, 22, 0, 0)
        );
    }

    #[test]
    fn test_chart_date_crosses_year() {
        assert_eq!(
            chart_date_at(at(2025, 1, 1, 0, 30, 0)),
            at(2024, 12, 31, 22, 0, 0)
        );
    }

    #[test]
    fn test_parse_stamps_chart_date() {
        let raw = payload(vec![]);
        let snapshot = parse_at(&raw, 256, at(2024, 5, 20, 23, 15, 0)).unwrap();
        assert_eq!(snapshot.date, at(2024, 5, 20, 22, 0, 0));
    }
}
