//! Curated offensive-phrase lexicon
//!
//! Phrases are grouped by [`Theme`] and matched as contiguous,
//! case-insensitive substrings of the raw message. All phrases are compiled
//! into one Aho-Corasick automaton searched in overlapping mode, so a phrase
//! nested inside another ("nigger" inside "sandnigger") is still reported.

use aho_corasick::AhoCorasick;
use bullyguard_core::{Error, Result, Theme};
use std::collections::HashSet;

const RACIAL_SLURS: &[&str] = &[
    "nigger",
    "nigga",
    "chink",
    "spic",
    "wetback",
    "gook",
    "kike",
    "jap",
    "towelhead",
    "sandnigger",
    "beaner",
    "coon",
    "jungle bunny",
    "porch monkey",
];

const GENDER_SLURS: &[&str] = &[
    "bitch", "slut", "whore", "cunt", "pussy", "dick", "cock", "faggot", "dyke", "lesbo", "tranny",
    "shemale", "fag", "queer", "homo",
];

const SUICIDAL_IDEATION: &[&str] = &[
    "kill myself",
    "want to die",
    "end it all",
    "no reason to live",
    "better off dead",
    "suicide",
    "self harm",
    "cut myself",
    "overdose",
    "hang myself",
    "jump off",
    "swallow pills",
    "bleed out",
];

const GENERAL_BULLYING: &[&str] = &[
    "ugly",
    "fat",
    "stupid",
    "idiot",
    "moron",
    "retard",
    "loser",
    "worthless",
    "nobody",
    "hate you",
    "wish you were dead",
    "kill yourself",
    "go die",
    "you suck",
    "pathetic",
];

/// Theme → ordered, duplicate-free phrase table
#[derive(Debug, Clone)]
pub struct Lexicon {
    /// Phrases indexed by position in [`Theme::OFFENSIVE`]
    entries: [Vec<String>; 4],

    matcher: AhoCorasick,

    /// Automaton pattern id → (theme index, phrase index)
    owners: Vec<(usize, usize)>,
}

impl Lexicon {
    /// Build a lexicon from custom phrase lists.
    ///
    /// Phrases are lowercased and trimmed; empty phrases and repeats within a
    /// theme are dropped (first occurrence wins). The same phrase may appear
    /// under several themes.
    pub fn new<I, P>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Theme, P)>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let mut table: [Vec<String>; 4] = Default::default();

        for (theme, phrases) in entries {
            let index = theme.offensive_index().ok_or_else(|| {
                Error::config("the 'safe' theme cannot carry lexicon phrases")
            })?;
            let slot = &mut table[index];
            for phrase in phrases {
                let phrase = phrase.as_ref().trim().to_lowercase();
                if !phrase.is_empty() && !slot.contains(&phrase) {
                    slot.push(phrase);
                }
            }
        }

        Self::compile(table)
    }

    fn compile(entries: [Vec<String>; 4]) -> Result<Self> {
        let mut patterns = Vec::new();
        let mut owners = Vec::new();
        for (theme_idx, phrases) in entries.iter().enumerate() {
            for (phrase_idx, phrase) in phrases.iter().enumerate() {
                patterns.push(phrase.as_str());
                owners.push((theme_idx, phrase_idx));
            }
        }

        let matcher = AhoCorasick::builder().build(&patterns).map_err(|e| {
            Error::classifier(format!("Failed to build lexicon matcher: {e}"))
        })?;

        Ok(Self {
            entries,
            matcher,
            owners,
        })
    }

    /// Offensive themes in their fixed iteration order
    pub fn themes(&self) -> [Theme; 4] {
        Theme::OFFENSIVE
    }

    /// Phrases for a theme, in lexicon order. Empty for [`Theme::Safe`].
    pub fn keywords_for_theme(&self, theme: Theme) -> &[String] {
        match theme.offensive_index() {
            Some(index) => &self.entries[index],
            None => &[],
        }
    }

    /// Number of phrases across all themes
    pub fn total_phrases(&self) -> usize {
        self.owners.len()
    }

    /// Presence-test every phrase against `text`
    pub fn scan(&self, text: &str) -> LexiconMatches {
        let lowered = text.to_lowercase();

        let mut hit = vec![false; self.owners.len()];
        for m in self.matcher.find_overlapping_iter(&lowered) {
            hit[m.pattern().as_usize()] = true;
        }

        let mut theme_counts = [0usize; 4];
        let mut seen = HashSet::new();
        let mut phrases = Vec::new();

        for (pattern_id, (theme_idx, phrase_idx)) in self.owners.iter().enumerate() {
            if !hit[pattern_id] {
                continue;
            }
            theme_counts[*theme_idx] += 1;

            let phrase = &self.entries[*theme_idx][*phrase_idx];
            if seen.insert(phrase.as_str()) {
                phrases.push(phrase.clone());
            }
        }

        LexiconMatches {
            theme_counts,
            phrases,
        }
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        let to_owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let entries = [
            to_owned(RACIAL_SLURS),
            to_owned(GENDER_SLURS),
            to_owned(SUICIDAL_IDEATION),
            to_owned(GENERAL_BULLYING),
        ];

        // The built-in lists are plain ASCII literals; building cannot fail.
        Self::compile(entries).expect("built-in lexicon must compile")
    }
}

/// Outcome of a lexicon scan over one message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexiconMatches {
    theme_counts: [usize; 4],
    phrases: Vec<String>,
}

impl LexiconMatches {
    /// Number of distinct phrases of `theme` present in the text
    pub fn count(&self, theme: Theme) -> usize {
        theme
            .offensive_index()
            .map(|i| self.theme_counts[i])
            .unwrap_or(0)
    }

    /// Per-theme counts in [`Theme::OFFENSIVE`] order
    pub fn counts(&self) -> impl Iterator<Item = (Theme, usize)> + '_ {
        Theme::OFFENSIVE
            .iter()
            .copied()
            .zip(self.theme_counts.iter().copied())
    }

    /// Phrase hits summed across themes
    pub fn total(&self) -> usize {
        self.theme_counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Matched phrases without duplicates, in lexicon order
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn into_phrases(self) -> Vec<String> {
        self.phrases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lexicon_sizes() {
        let lexicon = Lexicon::default();
        assert_eq!(lexicon.keywords_for_theme(Theme::RacialSlurs).len(), 14);
        assert_eq!(lexicon.keywords_for_theme(Theme::GenderSlurs).len(), 15);
        assert_eq!(lexicon.keywords_for_theme(Theme::SuicidalIdeation).len(), 13);
        assert_eq!(lexicon.keywords_for_theme(Theme::GeneralBullying).len(), 15);
        assert_eq!(lexicon.total_phrases(), 57);
        assert!(lexicon.keywords_for_theme(Theme::Safe).is_empty());
    }

    #[test]
    fn test_scan_is_case_insensitive_and_contiguous() {
        let lexicon = Lexicon::default();

        let matches = lexicon.scan("I want to KILL MYSELF");
        assert_eq!(matches.count(Theme::SuicidalIdeation), 1);
        assert_eq!(matches.phrases(), ["kill myself"]);

        let matches = lexicon.scan("kill the lights, then myself");
        assert!(matches.is_empty());
    }

    #[test]
    fn test_scan_counts_presence_not_frequency() {
        let lexicon = Lexicon::default();
        let matches = lexicon.scan("stupid stupid stupid");
        assert_eq!(matches.count(Theme::GeneralBullying), 1);
        assert_eq!(matches.phrases(), ["stupid"]);
    }

    #[test]
    fn test_scan_reports_nested_phrases() {
        let lexicon = Lexicon::default();
        let matches = lexicon.scan("sandnigger");
        assert_eq!(matches.count(Theme::RacialSlurs), 2);
        assert!(matches.phrases().contains(&"nigger".to_string()));
        assert!(matches.phrases().contains(&"sandnigger".to_string()));
    }

    #[test]
    fn test_custom_lexicon_dedupes_within_theme_only() {
        let lexicon = Lexicon::new(vec![
            (Theme::GeneralBullying, vec!["Loser", "loser ", "creep"]),
            (Theme::GenderSlurs, vec!["creep"]),
        ])
        .unwrap();

        assert_eq!(
            lexicon.keywords_for_theme(Theme::GeneralBullying),
            ["loser", "creep"]
        );
        assert_eq!(lexicon.total_phrases(), 3);

        let matches = lexicon.scan("what a creep");
        assert_eq!(matches.count(Theme::GeneralBullying), 1);
        assert_eq!(matches.count(Theme::GenderSlurs), 1);
        assert_eq!(matches.total(), 2);
        assert_eq!(matches.phrases(), ["creep"]);
    }

    #[test]
    fn test_safe_theme_rejected() {
        let result = Lexicon::new(vec![(Theme::Safe, vec!["hello"])]);
        assert!(result.is_err());
    }
}
