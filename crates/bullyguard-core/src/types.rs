//! Core types for BullyGuard

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Binary classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Class 0
    Safe,
    /// Class 1
    Cyberbullying,
}

impl Label {
    /// Class index used by the trained model (0 = safe, 1 = cyberbullying)
    pub fn index(self) -> usize {
        match self {
            Self::Safe => 0,
            Self::Cyberbullying => 1,
        }
    }

    /// Map a class index back to a label
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Safe),
            1 => Some(Self::Cyberbullying),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Cyberbullying => "Cyberbullying",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offensive content category
///
/// `Safe` is only ever produced when no offensive theme matched. The
/// offensive variants have a fixed order, [`Theme::OFFENSIVE`], which is
/// also the tie-break order when two themes score equally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Safe,
    RacialSlurs,
    GenderSlurs,
    SuicidalIdeation,
    GeneralBullying,
}

impl Theme {
    /// Offensive themes in lexicon order
    pub const OFFENSIVE: [Theme; 4] = [
        Theme::RacialSlurs,
        Theme::GenderSlurs,
        Theme::SuicidalIdeation,
        Theme::GeneralBullying,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::RacialSlurs => "racial_slurs",
            Self::GenderSlurs => "gender_slurs",
            Self::SuicidalIdeation => "suicidal_ideation",
            Self::GeneralBullying => "general_bullying",
        }
    }

    /// Position in [`Theme::OFFENSIVE`], `None` for `Safe`
    pub fn offensive_index(self) -> Option<usize> {
        Self::OFFENSIVE.iter().position(|t| *t == self)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "safe" => Ok(Self::Safe),
            "racial_slurs" => Ok(Self::RacialSlurs),
            "gender_slurs" => Ok(Self::GenderSlurs),
            "suicidal_ideation" => Ok(Self::SuicidalIdeation),
            "general_bullying" => Ok(Self::GeneralBullying),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

/// Result of classifying one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Final label
    pub classification: Label,

    /// Fused confidence (0.0-1.0)
    pub confidence: f64,

    /// Dominant offensive theme, `safe` when nothing matched
    pub theme: Theme,

    /// Matched lexicon phrases, without duplicates
    pub keywords: Vec<String>,
}

impl ClassificationResult {
    /// The result returned for empty or whitespace-only input
    pub fn safe() -> Self {
        Self {
            classification: Label::Safe,
            confidence: 1.0,
            theme: Theme::Safe,
            keywords: Vec::new(),
        }
    }

    pub fn is_cyberbullying(&self) -> bool {
        self.classification == Label::Cyberbullying
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_serialization_shape() {
        let result = ClassificationResult {
            classification: Label::Cyberbullying,
            confidence: 0.75,
            theme: Theme::GeneralBullying,
            keywords: vec!["ugly".to_string()],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["classification"], "Cyberbullying");
        assert_eq!(json["theme"], "general_bullying");
        assert_eq!(json["confidence"], 0.75);
        assert_eq!(json["keywords"][0], "ugly");
    }

    #[test]
    fn test_safe_result() {
        let json = serde_json::to_string(&ClassificationResult::safe()).unwrap();
        assert_eq!(
            json,
            r#"{"classification":"Safe","confidence":1.0,"theme":"safe","keywords":[]}"#
        );
    }

    #[test]
    fn test_theme_names_round_trip_through_from_str() {
        for theme in Theme::OFFENSIVE.iter().chain(std::iter::once(&Theme::Safe)) {
            assert_eq!(theme.as_str().parse::<Theme>().unwrap(), *theme);
        }
        assert!("hate_speech".parse::<Theme>().is_err());
    }

    #[test]
    fn test_label_index() {
        assert_eq!(Label::from_index(0), Some(Label::Safe));
        assert_eq!(Label::from_index(1), Some(Label::Cyberbullying));
        assert_eq!(Label::from_index(2), None);
        assert_eq!(Label::Cyberbullying.index(), 1);
    }
}
