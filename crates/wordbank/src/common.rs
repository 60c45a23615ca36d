//! 📦 Common data structures: the building blocks of wordbank.
//!
//! 🎬 COLD OPEN: INT. CLASSROOM, 8:59 AM.
//!
//! A word walks in. It has a translation. It has a category. It has a difficulty
//! tier it did not choose and would like to appeal. Nobody is taking appeals.
//! The bell rings. The word is a `Record` now. It will ride a chunk to the database
//! with ninety-nine of its closest friends and never be heard from again (locally).
//!
//! 🦆
//!
//! The closed sets (`Category`, `Difficulty`) are enums on purpose: an unknown tag
//! fails at parse time, before any chunk leaves the building.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// 🎯 One vocabulary entry: term, translation, category, difficulty.
///
/// Serialized with the destination table's column names (`word`, `korean`,
/// `category`, `difficulty`), because that is what the table calls them and
/// the table was here first.
///
/// Dataset files get some slack on the way in: `term`/`word`/`영어`,
/// `translation`/`korean`/`meaning`/`한글`, `카테고리`, `난이도` all land in the
/// right field. Extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// 📖 The English vocabulary item.
    #[serde(rename = "word", alias = "term", alias = "영어")]
    pub term: String,
    /// 🇰🇷 The Korean gloss.
    #[serde(
        rename = "korean",
        alias = "translation",
        alias = "meaning",
        alias = "한글"
    )]
    pub translation: String,
    #[serde(alias = "카테고리")]
    pub category: Category,
    #[serde(alias = "난이도")]
    pub difficulty: Difficulty,
}

impl Record {
    /// 🏗️ Builds a record. No validation here; that is `validate::validate_records`' job.
    pub fn new(
        term: impl Into<String>,
        translation: impl Into<String>,
        category: Category,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            term: term.into(),
            translation: translation.into(),
            category,
            difficulty,
        }
    }
}

/// 🏷️ The topical tag. Fifteen of them. No more, no less, no "Misc".
///
/// Deserializes case-insensitively through `FromStr` ("education", " Education "
/// and "EDUCATION" are all the same subject), serializes as the capitalized name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Category {
    Education,
    Career,
    Emotions,
    Health,
    Sports,
    Technology,
    Nature,
    Travel,
    Hobbies,
    Music,
    Art,
    Science,
    History,
    Politics,
    Economy,
}

impl Category {
    /// 📋 Every category, in the order the dataset has always listed them.
    pub const ALL: [Category; 15] = [
        Category::Education,
        Category::Career,
        Category::Emotions,
        Category::Health,
        Category::Sports,
        Category::Technology,
        Category::Nature,
        Category::Travel,
        Category::Hobbies,
        Category::Music,
        Category::Art,
        Category::Science,
        Category::History,
        Category::Politics,
        Category::Economy,
    ];

    /// 🏷️ The wire name. Matches what serde writes, so the two can never disagree.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Education => "Education",
            Self::Career => "Career",
            Self::Emotions => "Emotions",
            Self::Health => "Health",
            Self::Sports => "Sports",
            Self::Technology => "Technology",
            Self::Nature => "Nature",
            Self::Travel => "Travel",
            Self::Hobbies => "Hobbies",
            Self::Music => "Music",
            Self::Art => "Art",
            Self::Science => "Science",
            Self::History => "History",
            Self::Politics => "Politics",
            Self::Economy => "Economy",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> anyhow::Result<Self> {
        let trimmed = raw.trim();
        match Category::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
        {
            Some(category) => Ok(*category),
            None => bail!(
                "💀 '{}' is not a category we teach. The syllabus is: {}",
                raw,
                Category::ALL
                    .iter()
                    .map(Category::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

impl TryFrom<String> for Category {
    type Error = anyhow::Error;

    fn try_from(raw: String) -> anyhow::Result<Self> {
        raw.parse()
    }
}

/// 📈 How hard the word is. Three tiers, like a salsa menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            // -- 🌶️ "extra spicy" is not a tier. we asked.
            _ => bail!(
                "💀 '{}' is not a difficulty. Pick one of: easy, medium, hard.",
                raw
            ),
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = anyhow::Error;

    fn try_from(raw: String) -> anyhow::Result<Self> {
        raw.parse()
    }
}
