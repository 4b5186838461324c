/* src/client/core/rust/src/route/pattern.rs */

use regex::Regex;

use crate::errors::PatternError;

/// Compiled page template, e.g. `/product/[slug]` or `/product/*`.
/// Static segments are matched literally; the (single) wildcard segment
/// matches one non-empty run without slashes. Anchored at both ends.
#[derive(Debug, Clone)]
pub struct PagePattern {
  template: String,
  param: Option<String>,
  regex: Regex,
}

impl PagePattern {
  pub fn parse(template: &str) -> Result<Self, PatternError> {
    if template.is_empty() {
      return Err(PatternError::Empty);
    }
    if !template.starts_with('/') {
      return Err(PatternError::NotRooted(template.to_string()));
    }

    let trimmed = template.trim_end_matches('/');
    let mut source = String::from("^");
    let mut param = None;
    for segment in trimmed.split('/').skip(1) {
      if segment.starts_with("[...") || segment.starts_with("[[") {
        return Err(PatternError::CatchAll(template.to_string()));
      }
      source.push('/');
      match wildcard_name(segment) {
        Some(name) => {
          if param.is_some() {
            return Err(PatternError::MultipleWildcards(template.to_string()));
          }
          param = Some(name.to_string());
          source.push_str("([^/]+)");
        }
        None => source.push_str(&regex::escape(segment)),
      }
    }
    if trimmed.is_empty() {
      source.push('/');
    }
    source.push('$');

    let regex = Regex::new(&source).map_err(|_| PatternError::Invalid(template.to_string()))?;
    Ok(Self { template: template.to_string(), param, regex })
  }

  pub fn template(&self) -> &str {
    &self.template
  }

  /// Name of the wildcard segment: `slug` for `[slug]`, `*` for `*`.
  pub fn param(&self) -> Option<&str> {
    self.param.as_deref()
  }

  pub fn matches(&self, path: &str) -> bool {
    self.regex.is_match(path)
  }

  /// Value captured by the wildcard segment, if `path` matches.
  pub fn slug<'p>(&self, path: &'p str) -> Option<&'p str> {
    self.regex.captures(path)?.get(1).map(|m| m.as_str())
  }
}

fn wildcard_name(segment: &str) -> Option<&str> {
  if segment == "*" {
    return Some("*");
  }
  let inner = segment.strip_prefix('[')?.strip_suffix(']')?;
  (!inner.is_empty()).then_some(inner)
}

pub struct RegisteredPage<T> {
  pub pattern: PagePattern,
  pub target: T,
}

/// Result of resolving a canonical path against the registry.
pub struct PageMatch<'r, T> {
  pub page: &'r RegisteredPage<T>,
  pub slug: Option<String>,
}

/// Ordered set of opt-in pages. The first registered pattern wins.
pub struct PageRegistry<T> {
  pages: Vec<RegisteredPage<T>>,
}

impl<T> PageRegistry<T> {
  pub fn new() -> Self {
    Self { pages: Vec::new() }
  }

  pub fn register(&mut self, template: &str, target: T) -> Result<(), PatternError> {
    let pattern = PagePattern::parse(template)?;
    self.pages.push(RegisteredPage { pattern, target });
    Ok(())
  }

  pub fn match_page(&self, path: &str) -> Option<PageMatch<'_, T>> {
    self.pages.iter().find(|page| page.pattern.matches(path)).map(|page| PageMatch {
      page,
      slug: page.pattern.slug(path).map(String::from),
    })
  }

  pub fn is_registered(&self, path: &str) -> bool {
    self.pages.iter().any(|page| page.pattern.matches(path))
  }

  pub fn iter(&self) -> impl Iterator<Item = &RegisteredPage<T>> {
    self.pages.iter()
  }

  pub fn len(&self) -> usize {
    self.pages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pages.is_empty()
  }
}

impl<T> Default for PageRegistry<T> {
  fn default() -> Self {
    Self::new()
  }
}
