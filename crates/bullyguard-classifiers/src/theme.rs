//! Dominant-theme scoring

use crate::lexicon::{Lexicon, LexiconMatches};
use bullyguard_core::Theme;

/// Dominant theme of `text` and its share of all theme hits
pub fn detect_theme(lexicon: &Lexicon, text: &str) -> (Theme, f64) {
    theme_from_matches(&lexicon.scan(text))
}

/// Pick the dominant theme from an existing scan.
///
/// No hits yields `(Safe, 1.0)`. Otherwise the highest count wins and ties
/// go to the theme listed first in [`Theme::OFFENSIVE`].
pub fn theme_from_matches(matches: &LexiconMatches) -> (Theme, f64) {
    let total = matches.total();
    if total == 0 {
        return (Theme::Safe, 1.0);
    }

    let mut best = (Theme::Safe, 0usize);
    for (theme, count) in matches.counts() {
        if count > best.1 {
            best = (theme, count);
        }
    }

    (best.0, best.1 as f64 / total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matches_is_safe() {
        let lexicon = Lexicon::default();
        assert_eq!(
            detect_theme(&lexicon, "Hello, how are you today?"),
            (Theme::Safe, 1.0)
        );
    }

    #[test]
    fn test_single_theme() {
        let lexicon = Lexicon::default();
        assert_eq!(
            detect_theme(&lexicon, "You're so ugly and stupid, nobody likes you."),
            (Theme::GeneralBullying, 1.0)
        );
        assert_eq!(
            detect_theme(&lexicon, "I want to kill myself"),
            (Theme::SuicidalIdeation, 1.0)
        );
    }

    #[test]
    fn test_density_confidence() {
        let lexicon = Lexicon::default();
        // general: ugly, stupid; suicidal: overdose
        let (theme, confidence) = detect_theme(&lexicon, "ugly stupid overdose");
        assert_eq!(theme, Theme::GeneralBullying);
        assert!((confidence - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_tie_break_follows_fixed_order() {
        let lexicon = Lexicon::default();

        // one suicidal phrase, one general phrase
        let (theme, confidence) = detect_theme(&lexicon, "loser, overdose");
        assert_eq!(theme, Theme::SuicidalIdeation);
        assert_eq!(confidence, 0.5);

        // one gender slur, one racial slur
        let (theme, _) = detect_theme(&lexicon, "bitch coon");
        assert_eq!(theme, Theme::RacialSlurs);
    }
}
