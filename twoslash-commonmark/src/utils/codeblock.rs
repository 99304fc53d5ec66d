//! Fenced code block info strings.

/// Meta word that marks a fence as a Twoslash sample.
pub const TWOSLASH_META: &str = "twoslash";

/// The parsed info string of a fenced code block, e.g. ``` ```ts twoslash ```.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FenceInfo {
  /// Language tag, empty when the fence has none.
  pub lang: String,
  /// Every whitespace-separated word after the language tag.
  pub meta: Vec<String>,
}

impl FenceInfo {
  /// Parse a comrak `info` string.
  #[must_use]
  pub fn parse(info: &str) -> Self {
    let mut words = info.split_whitespace();
    let lang = words.next().unwrap_or_default().to_string();
    Self {
      lang,
      meta: words.map(str::to_string).collect(),
    }
  }

  /// Whether the fence carries the given meta word.
  #[must_use]
  pub fn has_meta(&self, word: &str) -> bool {
    self.meta.iter().any(|m| m == word)
  }

  /// Whether the fence is a Twoslash sample.
  #[must_use]
  pub fn is_twoslash(&self) -> bool {
    self.has_meta(TWOSLASH_META)
  }

  /// Meta words as string slices.
  pub fn meta_words(&self) -> impl Iterator<Item = &str> {
    self.meta.iter().map(String::as_str)
  }

  /// Language to label and highlight the block with.
  #[must_use]
  pub fn language(&self) -> &str {
    if self.lang.is_empty() {
      "txt"
    } else {
      &self.lang
    }
  }
}
