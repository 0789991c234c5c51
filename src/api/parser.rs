//! Score tag extraction from raw model answers

use crate::error::{RagError, Result};
use regex::Regex;
use std::sync::OnceLock;

fn score_tag_regex() -> &'static Regex {
    static SCORE_TAG: OnceLock<Regex> = OnceLock::new();
    SCORE_TAG.get_or_init(|| Regex::new(r"\[SCORE:(\d)\]").expect("static regex"))
}

/// A model answer split into score and prose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnswer {
    pub score: u8,
    pub text: String,
    /// False when the default score was used
    pub tagged: bool,
}

/// Pulls the `[SCORE:n]` tag out of an answer
#[derive(Debug, Clone, Copy)]
pub struct ScoreParser {
    default_score: u8,
}

impl Default for ScoreParser {
    fn default() -> Self {
        Self { default_score: 4 }
    }
}

impl ScoreParser {
    pub fn new(default_score: u8) -> Result<Self> {
        if !(1..=7).contains(&default_score) {
            return Err(RagError::Config(format!(
                "default score must be within 1..=7, got {}",
                default_score
            )));
        }
        Ok(Self { default_score })
    }

    /// Extract the first valid score tag.
    ///
    /// Only that occurrence is removed and the rest is trimmed. Tags with a
    /// digit outside 1–7 are not score tags. Without a tag the default score
    /// is returned and the text is left untouched.
    pub fn parse(&self, raw: &str) -> ParsedAnswer {
        let tag = score_tag_regex().captures_iter(raw).find_map(|caps| {
            let whole = caps.get(0)?;
            let score: u8 = caps.get(1)?.as_str().parse().ok()?;
            (1..=7).contains(&score).then_some((whole.start(), whole.end(), score))
        });

        match tag {
            Some((start, end, score)) => {
                let text = format!("{}{}", &raw[..start], &raw[end..]);
                ParsedAnswer {
                    score,
                    text: text.trim().to_string(),
                    tagged: true,
                }
            }
            None => {
                log::warn!(
                    "No score tag in model answer; defaulting to {}",
                    self.default_score
                );
                ParsedAnswer {
                    score: self.default_score,
                    text: raw.to_string(),
                    tagged: false,
                }
            }
        }
    }
}
