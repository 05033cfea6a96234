//! Category-driven content classification.
//!
//! Free-text programme categories drive ~25 boolean flags. The ladder of
//! independent substring tests is expressed as an ordered rule table of
//! (matcher, setter) pairs evaluated once per category list, so the
//! ruleset can be tested and extended without touching control flow.
//! Matching is case-insensitive throughout.

use crate::model::ProgramFlags;

/// How a rule matches a category text.
#[derive(Debug, Clone, Copy)]
enum Matcher {
    Contains(&'static str),
    Equals(&'static str),
}

impl Matcher {
    fn matches(&self, category_lower: &str) -> bool {
        match self {
            Matcher::Contains(needle) => category_lower.contains(needle),
            Matcher::Equals(needle) => category_lower == *needle,
        }
    }
}

/// The flag table. Several flags have more than one trigger; each trigger
/// is its own row so the table stays flat.
const RULES: &[(Matcher, fn(&mut ProgramFlags))] = &[
    (Matcher::Contains("action"), |f| f.is_action = true),
    (Matcher::Contains("adventure"), |f| f.is_action = true),
    (Matcher::Contains("adults only"), |f| f.is_adult_only = true),
    (Matcher::Contains("comedy"), |f| f.is_comedy = true),
    (Matcher::Contains("documentary"), |f| f.is_documentary = true),
    (Matcher::Contains("drama"), |f| f.is_drama = true),
    (Matcher::Contains("educational"), |f| f.is_educational = true),
    (Matcher::Contains("horror"), |f| f.is_horror = true),
    (Matcher::Contains("independent"), |f| f.is_indy = true),
    (Matcher::Contains("indy"), |f| f.is_indy = true),
    (Matcher::Contains("kids"), |f| f.is_kids = true),
    (Matcher::Contains("children"), |f| f.is_kids = true),
    (Matcher::Contains("music"), |f| f.is_music = true),
    (Matcher::Contains("news"), |f| f.is_news = true),
    (Matcher::Contains("reality"), |f| f.is_reality = true),
    (Matcher::Contains("romance"), |f| f.is_romance = true),
    (Matcher::Contains("romantic"), |f| f.is_romance = true),
    (Matcher::Contains("science fiction"), |f| {
        f.is_science_fiction = true
    }),
    (Matcher::Contains("soap"), |f| f.is_soap = true),
    (Matcher::Contains("suspense"), |f| f.is_thriller = true),
    (Matcher::Contains("thriller"), |f| f.is_thriller = true),
    (Matcher::Contains("limited series"), |f| {
        f.is_limited_series = true
    }),
    (Matcher::Contains("miniseries"), |f| f.is_miniseries = true),
    (Matcher::Contains("movie"), |f| f.is_movie = true),
    (Matcher::Equals("feature film"), |f| f.is_movie = true),
    (Matcher::Contains("paid programming"), |f| {
        f.is_paid_programming = true
    }),
    (Matcher::Contains("episodic"), |f| f.is_episodic = true),
    (Matcher::Contains("serial"), |f| f.is_serial = true),
    (Matcher::Equals("short film"), |f| f.is_short_film = true),
    (Matcher::Contains("special"), |f| f.is_special = true),
    (Matcher::Contains("sports event"), |f| f.is_sports = true),
    (Matcher::Contains("sports non-event"), |f| f.is_sports = true),
    (Matcher::Contains("team event"), |f| f.is_sports = true),
    (Matcher::Contains("sports talk"), |f| f.is_sports = true),
];

/// Evaluate the rule table over a category list.
///
/// Composite flags that also depend on episode identity or other programme
/// fields (`is_series`, the final `is_movie`, premieres, `is_generic`) are
/// finished by the schedule builder; this pass covers the purely
/// category-driven portion.
pub fn classify_categories(categories: &[String]) -> ProgramFlags {
    let mut flags = ProgramFlags::default();
    let lowered: Vec<String> = categories.iter().map(|c| c.to_lowercase()).collect();

    for (matcher, apply) in RULES {
        if lowered.iter().any(|c| matcher.matches(c)) {
            apply(&mut flags);
        }
    }

    flags
}

/// The category half of the series rule: an exact `series` category counts
/// unless a `sports talk` category is also present.
pub fn has_series_category(categories: &[String]) -> bool {
    let exact_series = categories.iter().any(|c| c.eq_ignore_ascii_case("series"));
    let sports_talk = categories
        .iter()
        .any(|c| c.to_lowercase().contains("sports talk"));
    exact_series && !sports_talk
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let flags = classify_categories(&cats(&["Action/Adventure", "NEWS"]));
        assert!(flags.is_action);
        assert!(flags.is_news);
        assert!(!flags.is_comedy);
    }

    #[test]
    fn one_category_can_set_multiple_flags() {
        let flags = classify_categories(&cats(&["romantic comedy drama"]));
        assert!(flags.is_romance);
        assert!(flags.is_comedy);
        assert!(flags.is_drama);
    }

    #[test]
    fn short_film_requires_exact_match() {
        assert!(classify_categories(&cats(&["Short Film"])).is_short_film);
        assert!(!classify_categories(&cats(&["a short film retrospective"])).is_short_film);
    }

    #[test]
    fn feature_film_requires_exact_match() {
        assert!(classify_categories(&cats(&["Feature Film"])).is_movie);
        assert!(!classify_categories(&cats(&["feature film festival"])).is_movie);
        assert!(classify_categories(&cats(&["made-for-tv movie"])).is_movie);
    }

    #[test]
    fn sports_triggers() {
        assert!(classify_categories(&cats(&["Sports event"])).is_sports);
        assert!(classify_categories(&cats(&["sports non-event"])).is_sports);
        assert!(classify_categories(&cats(&["team event"])).is_sports);
        assert!(classify_categories(&cats(&["Sports talk"])).is_sports);
        assert!(!classify_categories(&cats(&["sport"])).is_sports);
    }

    #[test]
    fn unknown_categories_set_nothing() {
        let flags = classify_categories(&cats(&["cooking", "travel"]));
        assert!(!flags.is_action && !flags.is_news && !flags.is_sports && !flags.is_movie);
    }

    #[test]
    fn series_category_rule() {
        assert!(has_series_category(&cats(&["Series"])));
        assert!(!has_series_category(&cats(&["series", "sports talk"])));
        assert!(!has_series_category(&cats(&["drama series"])));
    }

    #[test]
    fn empty_category_list_yields_default_flags() {
        let flags = classify_categories(&[]);
        assert!(!flags.is_movie && !flags.is_series && !flags.is_sports);
    }
}
