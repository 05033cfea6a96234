//! Normalized guide data model.
//!
//! These types form the per-run guide data store: one lineup of channel
//! bindings, canonical services with ordered schedule entries, de-duplicated
//! programs, persons, and guide images. Entities reference each other
//! through typed arena indices issued by the run's registries (see
//! [`crate::store`]); nothing here holds shared ownership.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Arena index of a [`Service`] within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ServiceId(pub usize);

/// Arena index of a [`Program`] within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ProgramId(pub usize);

/// Arena index of a [`Person`] within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PersonId(pub usize);

/// Arena index of a [`GuideImage`] within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ImageId(pub usize);

/// Arena index of a [`SeriesInfo`] within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SeriesId(pub usize);

/// A named, ordered list of channel-to-service bindings.
///
/// Created once per run; the first creator fixes the name.
#[derive(Debug, Clone, Serialize)]
pub struct Lineup {
    /// Slugged name: label upper-cased with spaces replaced by hyphens.
    pub name: String,
    /// The configured label the slug was derived from.
    pub display_name: String,
    pub channels: Vec<Channel>,
}

/// One position of a service within a lineup.
#[derive(Debug, Clone, Serialize)]
pub struct Channel {
    pub service: ServiceId,
    pub number: i32,
    pub sub_number: i32,
}

/// Canonical record for a broadcast channel, independent of lineup position.
#[derive(Debug, Clone, Serialize)]
pub struct Service {
    /// Identity key: `"{source_id}-{channel_id}"`.
    pub key: String,
    pub source_id: i32,
    /// Set only on first creation; never overwritten afterwards.
    pub call_sign: String,
    /// Descriptive name; a second display name may replace it later.
    pub name: String,
    pub logo: Option<ImageId>,
    /// Raw URI of the station logo, kept alongside the image reference.
    pub logo_url: Option<String>,
    /// Ordered airings; grows by one per programme occurrence.
    pub schedule: Vec<ScheduleEntry>,
}

/// One scheduled airing of a program on a service.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntry {
    pub program: ProgramId,
    pub start: DateTime<Utc>,
    pub duration_secs: i64,
}

/// A cast or crew member, de-duplicated by exact name.
#[derive(Debug, Clone, Serialize)]
pub struct Person {
    pub name: String,
}

/// A person's position within one role list of a program.
#[derive(Debug, Clone, Serialize)]
pub struct PersonRank {
    pub person: PersonId,
    /// 1-based position in the role list, in encounter order.
    pub rank: usize,
    /// Character played; actors only.
    pub character: Option<String>,
}

/// A guide image, de-duplicated by URI.
#[derive(Debug, Clone, Serialize)]
pub struct GuideImage {
    pub uri: String,
}

/// Series grouping record, created lazily for series- and sports-like
/// programs. `title` is filled from the first program that claims it.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesInfo {
    pub key: String,
    pub title: String,
}

/// Auxiliary artwork metadata attached to a program.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramArtwork {
    pub uri: String,
    pub width: i32,
    pub height: i32,
}

/// Original-air-date with an explicit unknown state instead of a magic
/// minimum-date sentinel. Movies without a listed date are `Unknown`;
/// non-movies without a usable date fall back to the epoch day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AirDate {
    Day(NaiveDate),
    Unknown,
}

impl Default for AirDate {
    fn default() -> Self {
        AirDate::Unknown
    }
}

impl AirDate {
    /// The non-movie fallback when the source lists no usable date.
    pub fn epoch() -> Self {
        AirDate::Day(NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch date"))
    }
}

/// Content-classification flags computed from a programme's category texts
/// and episode identity.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ProgramFlags {
    pub is_action: bool,
    pub is_adult_only: bool,
    pub is_comedy: bool,
    pub is_documentary: bool,
    pub is_drama: bool,
    pub is_educational: bool,
    pub is_horror: bool,
    pub is_indy: bool,
    pub is_kids: bool,
    pub is_music: bool,
    pub is_news: bool,
    pub is_reality: bool,
    pub is_romance: bool,
    pub is_science_fiction: bool,
    pub is_soap: bool,
    pub is_thriller: bool,
    pub is_limited_series: bool,
    pub is_miniseries: bool,
    pub is_movie: bool,
    pub is_paid_programming: bool,
    pub is_episodic: bool,
    pub is_serial: bool,
    pub is_series: bool,
    pub is_short_film: bool,
    pub is_special: bool,
    pub is_sports: bool,
    pub is_season_premiere: bool,
    pub is_series_premiere: bool,
}

/// Content advisories mapped from `advisory`-system rating entries.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Advisories {
    pub has_adult: bool,
    pub has_brief_nudity: bool,
    pub has_graphic_language: bool,
    pub has_graphic_violence: bool,
    pub has_language: bool,
    pub has_mild_violence: bool,
    pub has_nudity: bool,
    pub has_rape: bool,
    pub has_strong_sexual_content: bool,
    pub has_violence: bool,
}

/// Cast and crew role lists. Adapters merge into `writers`, composers into
/// `producers`, and editors/presenters/commentators into `hosts`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Credits {
    pub directors: Vec<PersonRank>,
    pub actors: Vec<PersonRank>,
    pub writers: Vec<PersonRank>,
    pub producers: Vec<PersonRank>,
    pub hosts: Vec<PersonRank>,
    pub guests: Vec<PersonRank>,
}

/// A keyword attached to a program: the owning group's numeric id plus the
/// word itself.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramKeyword {
    pub group_id: i32,
    pub word: String,
}

/// A de-duplicated program record.
///
/// `details` is the fill-once state: `None` means the record was created by
/// the registry but not yet classified; `Some` means it is fully populated
/// and no later occurrence of the same UID re-derives it.
#[derive(Debug, Clone, Serialize)]
pub struct Program {
    pub uid: String,
    pub source_id: i32,
    pub details: Option<ProgramDetails>,
}

impl Program {
    pub fn is_populated(&self) -> bool {
        self.details.is_some()
    }
}

/// The populated half of a [`Program`], written exactly once per UID.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProgramDetails {
    pub title: String,
    pub episode_title: String,
    pub description: String,
    pub language: String,
    /// Release year; movies only, 0 otherwise.
    pub year: i32,
    pub season_number: i32,
    pub episode_number: i32,
    pub original_air_date: AirDate,
    /// 0–8 half-star scale; movies only.
    pub half_stars: i32,
    /// Numeric MPAA class (g=1 … ao=8); movies only, 0 if unmapped.
    pub mpaa_rating: i32,
    /// Lacks strong series/episode identity; downstream consumers treat the
    /// program as non-episodic.
    pub is_generic: bool,
    pub flags: ProgramFlags,
    pub advisories: Advisories,
    pub credits: Credits,
    pub guide_image: Option<ImageId>,
    pub artwork: Vec<ProgramArtwork>,
    pub series: Option<SeriesId>,
    pub keywords: Vec<ProgramKeyword>,
}
