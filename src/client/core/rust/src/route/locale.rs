/* src/client/core/rust/src/route/locale.rs */

use std::borrow::Cow;

use regex::Regex;

/// Strips a leading `/<locale>/` segment for any of the configured locales.
/// The prefix regex is built once from the locale list and reused.
#[derive(Debug, Clone, Default)]
pub struct LocaleNormalizer {
  locales: Vec<String>,
  prefix: Option<Regex>,
}

impl LocaleNormalizer {
  pub fn new<I, S>(locales: I) -> Result<Self, regex::Error>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let locales: Vec<String> =
      locales.into_iter().map(Into::<String>::into).filter(|l| !l.is_empty()).collect();
    if locales.is_empty() {
      return Ok(Self::default());
    }
    let alternatives: Vec<String> = locales.iter().map(|l| regex::escape(l)).collect();
    let prefix = Regex::new(&format!("^/({})/", alternatives.join("|")))?;
    Ok(Self { locales, prefix: Some(prefix) })
  }

  /// Handles paths for non-current locales too; identity without locales.
  pub fn drop_locale<'a>(&self, path: &'a str) -> Cow<'a, str> {
    match self.prefix {
      Some(ref re) => re.replace(path, "/"),
      None => Cow::Borrowed(path),
    }
  }

  pub fn locales(&self) -> &[String] {
    &self.locales
  }

  pub fn is_empty(&self) -> bool {
    self.locales.is_empty()
  }
}
