//! Programme classification and schedule construction.
//!
//! Second phase of a run. Each programme resolves its owning service and
//! its de-duplicated Program record; the record is classified at most once
//! (fill-once), while a schedule entry is appended for every occurrence.
//! Start/stop timestamps are converted to UTC and rewritten onto the
//! source programme record in normalized form.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info};

use crate::classify;
use crate::config::Config;
use crate::convert::ConvertError;
use crate::episode::{self, EpisodeIdentity};
use crate::keywords;
use crate::model::{
    Advisories, AirDate, Credits, PersonRank, ProgramArtwork, ProgramDetails, ScheduleEntry,
};
use crate::store::GuideStore;
use crate::xmltv::{XmltvDocument, XmltvProgramme, XmltvRating};

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S %z";

/// Build programs and schedule entries for every programme in the
/// document. Timestamp failures are fatal for the whole run.
pub fn build_programs_and_schedule(
    doc: &mut XmltvDocument,
    config: &Config,
    store: &mut GuideStore,
) -> Result<(), ConvertError> {
    info!(programmes = doc.programmes.len(), "building schedule entries and programs");

    for programme in &mut doc.programmes {
        let identity = episode::extract(programme);

        let service_key = format!("{}-{}", store.source_id, programme.channel);
        let service_id = store.find_or_create_service(&service_key);

        let uid = episode::program_uid(programme);
        let program_id = store.find_or_create_program(&uid);

        if !store.program(program_id).is_populated() {
            let details = classify_programme(programme, &identity, config, store);
            store.program_mut(program_id).details = Some(details);
        }

        let start = parse_timestamp(&programme.start, "start")?;
        let stop = parse_timestamp(&programme.stop, "stop")?;
        let duration_secs = (stop - start).num_seconds();

        // Normalize the source record to UTC; downstream consumers of the
        // document see canonical timestamps.
        programme.start = format_utc(start);
        programme.stop = format_utc(start + Duration::seconds(duration_secs));

        store.service_mut(service_id).schedule.push(ScheduleEntry {
            program: program_id,
            start,
            duration_secs,
        });
    }

    Ok(())
}

fn parse_timestamp(value: &str, field: &'static str) -> Result<DateTime<Utc>, ConvertError> {
    DateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ConvertError::Timestamp {
            field,
            value: value.to_string(),
        })
}

fn format_utc(dt: DateTime<Utc>) -> String {
    format!("{} +0000", dt.format("%Y%m%d%H%M%S"))
}

/// Populate a program record from its first occurrence.
fn classify_programme(
    programme: &XmltvProgramme,
    identity: &EpisodeIdentity,
    config: &Config,
    store: &mut GuideStore,
) -> ProgramDetails {
    let categories: Vec<String> = programme
        .categories
        .iter()
        .map(|c| c.text.clone())
        .collect();

    let mut details = ProgramDetails {
        flags: classify::classify_categories(&categories),
        ..Default::default()
    };

    details.flags.is_series = (identity.season_number > 0 && identity.episode_number > 0)
        || !programme.subtitle_tracks.is_empty()
        || classify::has_series_category(&categories);
    details.flags.is_movie = identity.is_movie_type() || details.flags.is_movie;

    if let Some(premiere) = &programme.premiere {
        let lowered = premiere.to_lowercase();
        details.flags.is_season_premiere = lowered.contains("season");
        details.flags.is_series_premiere = lowered.contains("series");
    }

    details.title = first_text(&programme.titles);
    if identity.number_of_parts > 1 {
        let part_token = format!("({}/{})", identity.part_number, identity.number_of_parts);
        let stripped = details.title.replace(&part_token, "");
        details.title = format!("{} {}", stripped.trim_end(), part_token);
    }
    details.episode_title = first_text(&programme.sub_titles);
    details.description = first_text(&programme.descriptions);
    details.language = programme
        .language
        .clone()
        .or_else(|| programme.titles.first().and_then(|t| t.language.clone()))
        .unwrap_or_default();

    details.season_number = identity.season_number;
    details.episode_number = identity.episode_number;

    let date = programme.date.as_deref().unwrap_or_default();
    if details.flags.is_movie {
        details.year = date.get(..4).and_then(|y| y.parse().ok()).unwrap_or(0);
        details.original_air_date = AirDate::Unknown;
        details.half_stars = half_star_rating(&programme.star_ratings);
        details.mpaa_rating = mpaa_rating(&programme.ratings);
    } else {
        details.original_air_date = air_date(date);
    }

    details.advisories = advisories(&programme.ratings);
    if !config.ingest.exclude_cast_and_crew {
        details.credits = credits(programme, store);
    }
    assign_guide_image(&mut details, programme, store);
    resolve_series_identity(&mut details, programme, identity, store);

    keywords::assign_program_keywords(&mut details, &categories, &mut store.keyword_groups);

    details
}

fn first_text(texts: &[crate::xmltv::XmltvText]) -> String {
    texts.first().map(|t| t.text.clone()).unwrap_or_default()
}

/// `YYYY-MM-DD` from an 8+ digit date string; epoch placeholder otherwise.
fn air_date(date: &str) -> AirDate {
    if date.len() >= 8 {
        if let Ok(day) = NaiveDate::parse_from_str(&date[..8], "%Y%m%d") {
            return AirDate::Day(day);
        }
        debug!(date, "unparsable original-air-date, using epoch placeholder");
    }
    AirDate::epoch()
}

/// First parsable `numerator/denominator` star rating on the 0–8 half-star
/// scale. Malformed fractions and zero denominators are skipped.
fn half_star_rating(star_ratings: &[XmltvRating]) -> i32 {
    for rating in star_ratings {
        let parts: Vec<&str> = rating.value.split('/').collect();
        if parts.len() != 2 {
            continue;
        }
        let (Ok(numerator), Ok(denominator)) =
            (parts[0].trim().parse::<f64>(), parts[1].trim().parse::<f64>())
        else {
            continue;
        };
        if denominator == 0.0 {
            continue;
        }
        return (numerator / denominator * 8.0 + 0.125) as i32;
    }
    0
}

/// Map an MPAA rating entry through the numeric class table; 0 if absent
/// or unmapped.
fn mpaa_rating(ratings: &[XmltvRating]) -> i32 {
    let value = ratings.iter().find_map(|r| {
        let system = r.system.as_deref()?;
        if system.eq_ignore_ascii_case("mpaa")
            || system.eq_ignore_ascii_case("motion picture association of america")
        {
            Some(r.value.as_str())
        } else {
            None
        }
    });

    match value {
        Some(v) => match v.replace('-', "").to_lowercase().as_str() {
            "g" => 1,
            "pg" => 2,
            "pg13" => 3,
            "r" => 4,
            "nc17" => 5,
            "x" => 6,
            "nr" => 7,
            "ao" => 8,
            _ => 0,
        },
        None => 0,
    }
}

/// Exact-match advisory table over `advisory`-system rating entries.
/// Unmatched values are ignored.
fn advisories(ratings: &[XmltvRating]) -> Advisories {
    let mut adv = Advisories::default();
    for rating in ratings {
        let is_advisory = rating
            .system
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case("advisory"))
            .unwrap_or(false);
        if !is_advisory {
            continue;
        }
        match rating.value.to_lowercase().as_str() {
            "adult situations" => adv.has_adult = true,
            "brief nudity" => adv.has_brief_nudity = true,
            "graphic language" => adv.has_graphic_language = true,
            "graphic violence" => adv.has_graphic_violence = true,
            "adult language" => adv.has_language = true,
            "mild violence" => adv.has_mild_violence = true,
            "nudity" => adv.has_nudity = true,
            "rape" => adv.has_rape = true,
            "strong sexual content" => adv.has_strong_sexual_content = true,
            "violence" => adv.has_violence = true,
            _ => {}
        }
    }
    adv
}

/// Map cast-and-crew lists onto role lists, find-or-creating one Person
/// per name. Adapters extend the writer list, composers the producer
/// list, and editors/presenters/commentators the host list.
fn credits(programme: &XmltvProgramme, store: &mut GuideStore) -> Credits {
    let mut credits = Credits::default();
    let c = &programme.credits;

    let mut push = |list: &mut Vec<PersonRank>, name: &str, character: Option<String>| {
        let person = store.find_or_create_person(name);
        list.push(PersonRank {
            person,
            rank: list.len() + 1,
            character,
        });
    };

    for name in &c.directors {
        push(&mut credits.directors, name, None);
    }
    for actor in &c.actors {
        push(&mut credits.actors, &actor.name, actor.role.clone());
    }
    for name in &c.writers {
        push(&mut credits.writers, name, None);
    }
    for name in &c.adapters {
        push(&mut credits.writers, name, None);
    }
    for name in &c.producers {
        push(&mut credits.producers, name, None);
    }
    for name in &c.composers {
        push(&mut credits.producers, name, None);
    }
    for name in &c.editors {
        push(&mut credits.hosts, name, None);
    }
    for name in &c.presenters {
        push(&mut credits.hosts, name, None);
    }
    for name in &c.commentators {
        push(&mut credits.hosts, name, None);
    }
    for name in &c.guests {
        push(&mut credits.guests, name, None);
    }

    credits
}

/// Pick the primary guide image and record the full artwork list.
///
/// With a single icon it is used directly. With several, the first icon
/// whose width/height ratio is below 0.7 (a portrait poster) wins,
/// falling back to the first icon.
fn assign_guide_image(
    details: &mut ProgramDetails,
    programme: &XmltvProgramme,
    store: &mut GuideStore,
) {
    let icons = &programme.icons;
    if icons.is_empty() {
        return;
    }

    let chosen = if icons.len() == 1 {
        &icons[0]
    } else {
        icons
            .iter()
            .find(|icon| (icon.width as f64) / (icon.height as f64) < 0.7)
            .unwrap_or(&icons[0])
    };
    details.guide_image = Some(store.find_or_create_guide_image(&chosen.src));

    details.artwork = icons
        .iter()
        .map(|icon| ProgramArtwork {
            uri: icon.src.clone(),
            width: icon.width,
            height: icon.height,
        })
        .collect();
}

/// Resolve series identity and the generic flag.
///
/// With a `dd_progid` identifier, series info is keyed by the embedded
/// series id; `SH`-typed series/sports content is generic. Without one,
/// series-like or new/repeat-marked programs key series info by their own
/// title, and a season-less program with an episode title is generic.
/// Anything left that is not a movie is generic.
fn resolve_series_identity(
    details: &mut ProgramDetails,
    programme: &XmltvProgramme,
    identity: &EpisodeIdentity,
    store: &mut GuideStore,
) {
    let flags = &details.flags;

    if identity.has_identifier() {
        if identity.content_type == "SH"
            && (flags.is_series || flags.is_sports)
            && !flags.is_miniseries
            && !flags.is_paid_programming
        {
            details.is_generic = true;
        }

        if !flags.is_movie {
            let series = store.find_or_create_series_info(&identity.series_id);
            if store.series_info(series).title.is_empty() {
                store.series_info_mut(series).title = details.title.clone();
            }
            details.series = Some(series);
        }
    } else if flags.is_series || flags.is_sports || programme.new || programme.previously_shown {
        let series = store.find_or_create_series_info(&details.title);
        if store.series_info(series).title.is_empty() {
            store.series_info_mut(series).title = details.title.clone();
        }
        details.series = Some(series);

        if identity.season_number == 0 && !details.episode_title.is_empty() {
            details.is_generic = true;
        }
    } else if !flags.is_movie {
        details.is_generic = true;
    }
}
