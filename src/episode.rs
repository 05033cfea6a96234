//! Episode and series identity extraction.
//!
//! Programme listings carry episode numbers in several coding systems at
//! once. Extraction scans them in a fixed priority: `dd_progid` supplies
//! the strongest identity (content type, series id, production number),
//! `xmltv_ns` supplies season/episode/part, and the on-screen forms
//! (`sxxexx`, `onscreen`, `common`) fill season/episode only where a
//! higher-priority system has not. The first match per system wins.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::xmltv::XmltvProgramme;

/// Matches a `dd_progid` value: content type, 8-digit series id, 4-digit
/// production number.
static PROG_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new("(MV|SH|EP|SP)[0-9]{8}.[0-9]{4}").expect("prog id pattern"));

/// Identity fields gathered from a programme's episode-number entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeIdentity {
    /// Normalized `dd_progid` (upper case, `.` replaced by `_`); empty when
    /// the programme carries none.
    pub tms_id: String,
    /// First two characters of the identifier: `MV`, `SH`, `EP`, or `SP`.
    pub content_type: String,
    /// Eight-digit series id from the identifier.
    pub series_id: String,
    pub production_number: i32,
    /// 1-based; 0 means unknown.
    pub season_number: i32,
    /// 1-based; 0 means unknown.
    pub episode_number: i32,
    pub part_number: i32,
    pub number_of_parts: i32,
}

impl EpisodeIdentity {
    pub fn has_identifier(&self) -> bool {
        !self.tms_id.is_empty()
    }

    pub fn is_movie_type(&self) -> bool {
        self.content_type == "MV"
    }
}

/// Scan a programme's episode-number entries and assemble its identity.
pub fn extract(programme: &XmltvProgramme) -> EpisodeIdentity {
    let mut id = EpisodeIdentity::default();
    let mut ns_seen = false;

    for ep in &programme.episode_nums {
        let system = match &ep.system {
            Some(s) if !ep.text.is_empty() => s.to_lowercase(),
            _ => continue,
        };

        match system.as_str() {
            "dd_progid" => {
                if id.tms_id.is_empty() && PROG_ID.is_match(&ep.text) {
                    id.tms_id = ep.text.to_uppercase().replace('.', "_");
                    id.content_type = id.tms_id.get(..2).unwrap_or_default().to_string();
                    id.series_id = id.tms_id.get(2..10).unwrap_or_default().to_string();
                    id.production_number = id
                        .tms_id
                        .get(11..15)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(0);
                }
            }
            "xmltv_ns" => {
                if !ns_seen {
                    ns_seen = true;
                    parse_xmltv_ns(&ep.text, &mut id);
                }
            }
            "sxxexx" | "onscreen" | "common" => parse_onscreen(&ep.text, &mut id),
            _ => {}
        }
    }

    id
}

/// `season/total.episode/total.part/total`, all zero-based, the slash
/// denominators optional. Unparsable fields read as zero before the +1
/// shift, so `"0.0.0"` yields season 1 / episode 1 / part 1.
fn parse_xmltv_ns(text: &str, id: &mut EpisodeIdentity) {
    let fields: Vec<&str> = text.split('.').collect();
    let numerator = |i: usize| -> i32 {
        fields
            .get(i)
            .and_then(|f| f.split('/').next())
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    };

    id.season_number = numerator(0) + 1;
    id.episode_number = numerator(1) + 1;
    id.part_number = numerator(2) + 1;
    id.number_of_parts = fields
        .get(2)
        .and_then(|f| f.split('/').nth(1))
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(1);
}

/// On-screen form `sNNeMM` (case-insensitive). Fills season/episode only
/// when a higher-priority system left them unset.
fn parse_onscreen(text: &str, id: &mut EpisodeIdentity) {
    let lowered = text.to_lowercase();
    let Some(stripped) = lowered.get(1..) else {
        return;
    };
    let parts: Vec<&str> = stripped.split('e').collect();
    if parts.len() != 2 {
        return;
    }

    if id.season_number == 0 {
        id.season_number = parts[0].parse().unwrap_or(0);
    }
    if id.episode_number == 0 {
        id.episode_number = parts[1].parse().unwrap_or(0);
    }
}

/// Identity key for the program registry.
///
/// The `dd_progid` text is used verbatim (case preserved) when present.
/// Otherwise the UID is a deterministic order-sensitive polynomial hash
/// (base 397) over the first title, first subtitle, first description, and
/// raw date string, masked to a non-negative 31-bit value and stringified
/// as decimal. Distinct tuples can in principle collide — a known
/// theoretical limitation of this scheme, accepted for compatibility.
pub fn program_uid(programme: &XmltvProgramme) -> String {
    let dd = programme.episode_nums.iter().find(|ep| {
        ep.system
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case("dd_progid"))
            .unwrap_or(false)
    });
    if let Some(ep) = dd {
        return ep.text.clone();
    }

    let component = |text: Option<&str>| text.map(stable_hash).unwrap_or(0);

    let mut hash = component(programme.titles.first().map(|t| t.text.as_str()));
    hash = hash.wrapping_mul(397) ^ component(programme.sub_titles.first().map(|t| t.text.as_str()));
    hash = hash.wrapping_mul(397) ^ component(programme.descriptions.first().map(|t| t.text.as_str()));
    hash = hash.wrapping_mul(397) ^ component(programme.date.as_deref());

    (hash & 0x7fff_ffff).to_string()
}

/// Deterministic 32-bit polynomial string hash (base 31 over UTF-8 bytes).
/// Stable across runs and platforms, unlike the default hasher.
fn stable_hash(s: &str) -> i32 {
    let mut h: i32 = 0;
    for b in s.bytes() {
        h = h.wrapping_mul(31).wrapping_add(b as i32);
    }
    h
}
