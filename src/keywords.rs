//! Keyword taxonomy: primary-group selection, per-program keyword
//! assignment, and the bounded overflow paging pass.
//!
//! Every classified program is filed under at most one primary group,
//! chosen by a fixed priority ladder. Remaining free-text categories become
//! keywords inside that group. After all programs are processed, each
//! group is sorted and paged: consumers display at most two pages of 99
//! keywords per group, so a secondary "overflow" group receives the slice
//! `[99, 198)`. Keywords past the 198th stay in the primary group but are
//! invisible to the paging scheme (preserved source behavior; see
//! DESIGN.md).

use serde::Serialize;
use std::collections::HashMap;

use crate::model::{ProgramDetails, ProgramKeyword};

/// The enumerated keyword groups. Discriminants are the wire-visible group
/// ids; primaries are spaced so each overflow group (primary id − 1) gets
/// its own id without collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(i32)]
pub enum KeywordGroupKind {
    Educational = 2,
    Kids = 4,
    Movies = 6,
    Music = 8,
    News = 10,
    PaidProgramming = 12,
    Premieres = 14,
    Reality = 16,
    Series = 18,
    Special = 20,
    Sports = 22,
}

impl KeywordGroupKind {
    pub fn id(self) -> i32 {
        self as i32
    }

    /// The group's defining keyword text.
    pub fn label(self) -> &'static str {
        match self {
            KeywordGroupKind::Educational => "Educational",
            KeywordGroupKind::Kids => "Kids",
            KeywordGroupKind::Movies => "Movies",
            KeywordGroupKind::Music => "Music",
            KeywordGroupKind::News => "News",
            KeywordGroupKind::PaidProgramming => "Paid Programming",
            KeywordGroupKind::Premieres => "Premieres",
            KeywordGroupKind::Reality => "Reality",
            KeywordGroupKind::Series => "Series",
            KeywordGroupKind::Special => "Special",
            KeywordGroupKind::Sports => "Sports",
        }
    }
}

/// A keyword inside a group, de-duplicated by word.
#[derive(Debug, Clone, Serialize)]
pub struct Keyword {
    pub word: String,
    /// 1-based insertion order within the group.
    pub index: usize,
}

/// A bounded bucket of category keywords.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordGroup {
    /// Numeric group id: the kind's id for primaries, kind id − 1 for
    /// overflow groups.
    pub id: i32,
    pub kind: KeywordGroupKind,
    pub overflow: bool,
    pub keywords: Vec<Keyword>,
}

impl KeywordGroup {
    /// Find or create a keyword by word (exact match) and return a copy
    /// for attachment to a program.
    pub fn find_or_create_keyword(&mut self, word: &str) -> Keyword {
        if let Some(existing) = self.keywords.iter().find(|k| k.word == word) {
            return existing.clone();
        }
        let keyword = Keyword {
            word: word.to_string(),
            index: self.keywords.len() + 1,
        };
        self.keywords.push(keyword.clone());
        keyword
    }
}

/// Registry of keyword groups for one run, plus the run-wide flat keyword
/// collection produced by the taxonomy pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeywordIndex {
    #[serde(skip)]
    index: HashMap<i32, usize>,
    pub groups: Vec<KeywordGroup>,
    /// Flat, sorted-per-group keyword collection; filled by
    /// [`build_taxonomy`].
    pub keywords: Vec<Keyword>,
}

impl KeywordIndex {
    /// Find or create the group for `kind`, primary or overflow.
    pub fn find_or_create(&mut self, kind: KeywordGroupKind, overflow: bool) -> usize {
        let id = if overflow { kind.id() - 1 } else { kind.id() };
        if let Some(&slot) = self.index.get(&id) {
            return slot;
        }
        let slot = self.groups.len();
        self.groups.push(KeywordGroup {
            id,
            kind,
            overflow,
            keywords: Vec::new(),
        });
        self.index.insert(id, slot);
        slot
    }

    pub fn group_by_id(&self, id: i32) -> Option<&KeywordGroup> {
        self.index.get(&id).map(|&slot| &self.groups[slot])
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

/// Priority ladder for primary-group selection; first match wins.
fn primary_group(details: &ProgramDetails) -> Option<KeywordGroupKind> {
    let f = &details.flags;
    let ladder: [(bool, KeywordGroupKind); 10] = [
        (f.is_movie, KeywordGroupKind::Movies),
        (f.is_paid_programming, KeywordGroupKind::PaidProgramming),
        (f.is_sports, KeywordGroupKind::Sports),
        (f.is_kids, KeywordGroupKind::Kids),
        (f.is_educational, KeywordGroupKind::Educational),
        (f.is_news, KeywordGroupKind::News),
        (f.is_special, KeywordGroupKind::Special),
        (f.is_reality, KeywordGroupKind::Reality),
        (f.is_music, KeywordGroupKind::Music),
        (f.is_series, KeywordGroupKind::Series),
    ];
    ladder
        .into_iter()
        .find_map(|(hit, kind)| if hit { Some(kind) } else { None })
}

/// Categories already captured structurally; never duplicated as keywords.
const STOP_LIST: &[&str] = &[
    "sport",
    "sports event",
    "sports non-event",
    "series",
    "movie",
    "feature film",
];

/// Assign a classified program its keywords: the primary group's defining
/// keyword, premiere synthetics, one keyword per remaining free-text
/// category, and an `Uncategorized` fallback so every filed program is
/// discoverable by category search.
pub fn assign_program_keywords(
    details: &mut ProgramDetails,
    categories: &[String],
    taxonomy: &mut KeywordIndex,
) {
    let Some(kind) = primary_group(details) else {
        return;
    };

    let primary_slot = taxonomy.find_or_create(kind, false);
    details.keywords.push(ProgramKeyword {
        group_id: kind.id(),
        word: kind.label().to_string(),
    });

    if details.flags.is_season_premiere || details.flags.is_series_premiere {
        let premiere_slot = taxonomy.find_or_create(KeywordGroupKind::Premieres, false);
        details.keywords.push(ProgramKeyword {
            group_id: KeywordGroupKind::Premieres.id(),
            word: KeywordGroupKind::Premieres.label().to_string(),
        });
        if details.flags.is_season_premiere {
            let kw = taxonomy.groups[premiere_slot].find_or_create_keyword("Season Premiere");
            details.keywords.push(ProgramKeyword {
                group_id: KeywordGroupKind::Premieres.id(),
                word: kw.word,
            });
        }
        if details.flags.is_series_premiere {
            let kw = taxonomy.groups[premiere_slot].find_or_create_keyword("Series Premiere");
            details.keywords.push(ProgramKeyword {
                group_id: KeywordGroupKind::Premieres.id(),
                word: kw.word,
            });
        }
    }

    for category in categories {
        if STOP_LIST.contains(&category.to_lowercase().as_str()) {
            continue;
        }
        let kw = taxonomy.groups[primary_slot].find_or_create_keyword(category);
        details.keywords.push(ProgramKeyword {
            group_id: kind.id(),
            word: kw.word,
        });
    }

    if details.keywords.len() <= 1 {
        let kw = taxonomy.groups[primary_slot].find_or_create_keyword("Uncategorized");
        details.keywords.push(ProgramKeyword {
            group_id: kind.id(),
            word: kw.word,
        });
    }
}

/// Cap of keywords per displayed group page.
const GROUP_PAGE: usize = 99;

/// Post-pass over the finished groups: sort each group's keywords
/// alphabetically, append them to the run-wide flat collection, and page
/// groups larger than one page into an overflow group holding
/// `[99, 198)`. Runs once, strictly after all programs are classified.
pub fn build_taxonomy(taxonomy: &mut KeywordIndex) {
    let primary_count = taxonomy.groups.len();

    for slot in 0..primary_count {
        taxonomy.groups[slot]
            .keywords
            .sort_by(|a, b| a.word.to_lowercase().cmp(&b.word.to_lowercase()));

        let sorted = taxonomy.groups[slot].keywords.clone();
        taxonomy.keywords.extend(sorted.iter().cloned());

        if sorted.len() > GROUP_PAGE {
            let kind = taxonomy.groups[slot].kind;
            let overflow_slot = taxonomy.find_or_create(kind, true);
            let end = sorted.len().min(GROUP_PAGE * 2);
            taxonomy.groups[overflow_slot].keywords = sorted[GROUP_PAGE..end].to_vec();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgramFlags;

    fn details_with(update: impl FnOnce(&mut ProgramFlags)) -> ProgramDetails {
        let mut details = ProgramDetails::default();
        update(&mut details.flags);
        details
    }

    fn cats(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ladder_prefers_movie_over_everything() {
        let details = details_with(|f| {
            f.is_movie = true;
            f.is_sports = true;
            f.is_news = true;
        });
        assert_eq!(primary_group(&details), Some(KeywordGroupKind::Movies));
    }

    #[test]
    fn ladder_order_sports_before_kids() {
        let details = details_with(|f| {
            f.is_kids = true;
            f.is_sports = true;
        });
        assert_eq!(primary_group(&details), Some(KeywordGroupKind::Sports));
    }

    #[test]
    fn no_group_no_keywords() {
        let mut details = ProgramDetails::default();
        let mut taxonomy = KeywordIndex::default();
        assign_program_keywords(&mut details, &cats(&["cooking"]), &mut taxonomy);
        assert!(details.keywords.is_empty());
        assert_eq!(taxonomy.group_count(), 0);
    }

    #[test]
    fn stop_list_categories_are_skipped() {
        let mut details = details_with(|f| f.is_sports = true);
        let mut taxonomy = KeywordIndex::default();
        assign_program_keywords(
            &mut details,
            &cats(&["Sports event", "sport", "Basketball"]),
            &mut taxonomy,
        );

        let sports = taxonomy.group_by_id(KeywordGroupKind::Sports.id()).unwrap();
        assert_eq!(sports.keywords.len(), 1);
        assert_eq!(sports.keywords[0].word, "Basketball");
        // Program carries the group label plus the surviving category.
        assert_eq!(details.keywords.len(), 2);
    }

    #[test]
    fn uncategorized_fallback_when_only_the_label_remains() {
        // Every category is stop-listed, so only the group label survives
        // and the fallback keyword is attached.
        let mut details = details_with(|f| f.is_sports = true);
        let mut taxonomy = KeywordIndex::default();
        assign_program_keywords(&mut details, &cats(&["sport", "sports event"]), &mut taxonomy);

        assert_eq!(details.keywords.len(), 2);
        assert_eq!(details.keywords[1].word, "Uncategorized");
    }

    #[test]
    fn surviving_category_suppresses_fallback() {
        let mut details = details_with(|f| f.is_news = true);
        let mut taxonomy = KeywordIndex::default();
        assign_program_keywords(&mut details, &cats(&["news"]), &mut taxonomy);

        let words: Vec<&str> = details.keywords.iter().map(|k| k.word.as_str()).collect();
        assert_eq!(words, vec!["News", "news"]);
    }

    #[test]
    fn premiere_synthetics() {
        let mut details = details_with(|f| {
            f.is_series = true;
            f.is_season_premiere = true;
            f.is_series_premiere = true;
        });
        let mut taxonomy = KeywordIndex::default();
        assign_program_keywords(&mut details, &cats(&["drama"]), &mut taxonomy);

        let words: Vec<&str> = details.keywords.iter().map(|k| k.word.as_str()).collect();
        assert!(words.contains(&"Premieres"));
        assert!(words.contains(&"Season Premiere"));
        assert!(words.contains(&"Series Premiere"));

        let premieres = taxonomy
            .group_by_id(KeywordGroupKind::Premieres.id())
            .unwrap();
        assert_eq!(premieres.keywords.len(), 2);
    }

    #[test]
    fn keywords_dedup_within_group() {
        let mut taxonomy = KeywordIndex::default();
        let slot = taxonomy.find_or_create(KeywordGroupKind::News, false);
        let a = taxonomy.groups[slot].find_or_create_keyword("Weather");
        let b = taxonomy.groups[slot].find_or_create_keyword("Weather");
        assert_eq!(a.index, b.index);
        assert_eq!(taxonomy.groups[slot].keywords.len(), 1);
    }

    fn filled_group(taxonomy: &mut KeywordIndex, count: usize) -> usize {
        let slot = taxonomy.find_or_create(KeywordGroupKind::Series, false);
        for i in 0..count {
            taxonomy.groups[slot].find_or_create_keyword(&format!("kw{:04}", i));
        }
        slot
    }

    #[test]
    fn overflow_pages_a_large_group() {
        let mut taxonomy = KeywordIndex::default();
        let slot = filled_group(&mut taxonomy, 150);
        build_taxonomy(&mut taxonomy);

        // Primary retains all 150, sorted.
        assert_eq!(taxonomy.groups[slot].keywords.len(), 150);
        let overflow = taxonomy
            .group_by_id(KeywordGroupKind::Series.id() - 1)
            .unwrap();
        assert!(overflow.overflow);
        assert_eq!(overflow.keywords.len(), 51);
        assert_eq!(overflow.keywords[0].word, "kw0099");
        assert_eq!(overflow.keywords.last().unwrap().word, "kw0149");
        assert_eq!(taxonomy.keywords.len(), 150);
    }

    #[test]
    fn overflow_caps_at_two_pages() {
        let mut taxonomy = KeywordIndex::default();
        filled_group(&mut taxonomy, 250);
        build_taxonomy(&mut taxonomy);

        let overflow = taxonomy
            .group_by_id(KeywordGroupKind::Series.id() - 1)
            .unwrap();
        // Overflow holds exactly [99, 198); the tail past 198 is not paged.
        assert_eq!(overflow.keywords.len(), 99);
        assert_eq!(overflow.keywords[0].word, "kw0099");
        assert_eq!(overflow.keywords.last().unwrap().word, "kw0197");
    }

    #[test]
    fn small_groups_get_no_overflow() {
        let mut taxonomy = KeywordIndex::default();
        filled_group(&mut taxonomy, 10);
        build_taxonomy(&mut taxonomy);

        assert_eq!(taxonomy.group_count(), 1);
        assert!(taxonomy
            .group_by_id(KeywordGroupKind::Series.id() - 1)
            .is_none());
    }

    #[test]
    fn taxonomy_sorts_each_group() {
        let mut taxonomy = KeywordIndex::default();
        let slot = taxonomy.find_or_create(KeywordGroupKind::News, false);
        taxonomy.groups[slot].find_or_create_keyword("Weather");
        taxonomy.groups[slot].find_or_create_keyword("crime");
        taxonomy.groups[slot].find_or_create_keyword("Politics");
        build_taxonomy(&mut taxonomy);

        let words: Vec<&str> = taxonomy.groups[slot]
            .keywords
            .iter()
            .map(|k| k.word.as_str())
            .collect();
        assert_eq!(words, vec!["crime", "Politics", "Weather"]);
    }
}
