use super::{Filter, FilterContext, FilterProvider};
use crate::collection::Document;
use crate::common::{tokenize, Value};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use regex::Regex;
use std::any::Any;
use std::fmt::{Display, Formatter};
use std::sync::OnceLock;

/// Matches string fields against a regular expression. The pattern is
/// compiled on first use; an invalid pattern fails every evaluation.
pub(crate) struct RegexFilter {
    field_name: String,
    pattern: String,
    compiled: OnceLock<Result<Regex, regex::Error>>,
}

impl RegexFilter {
    pub(crate) fn new(field_name: String, pattern: String) -> Self {
        RegexFilter {
            field_name,
            pattern,
            compiled: OnceLock::new(),
        }
    }

    fn regex(&self) -> PotashResult<&Regex> {
        match self.compiled.get_or_init(|| Regex::new(&self.pattern)) {
            Ok(regex) => Ok(regex),
            Err(e) => {
                log::error!("Invalid regex {} for field {}: {}", self.pattern, self.field_name, e);
                Err(PotashError::from(e.clone()))
            }
        }
    }
}

impl Display for RegexFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} =~ /{}/)", self.field_name, self.pattern)
    }
}

impl FilterProvider for RegexFilter {
    fn apply(&self, document: &Document, context: &FilterContext) -> PotashResult<bool> {
        let regex = self.regex()?;
        match context.resolve(document, &self.field_name) {
            Value::String(text) => Ok(regex.is_match(&text)),
            _ => Ok(false),
        }
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Matches when at least one element of an array field satisfies the inner
/// filter. Scalar elements are exposed to the inner filter as the field `$`.
pub(crate) struct ElementMatchFilter {
    field_name: String,
    filter: Filter,
}

impl ElementMatchFilter {
    pub(crate) fn new(field_name: String, filter: Filter) -> Self {
        ElementMatchFilter { field_name, filter }
    }

    fn match_element(&self, element: &Value, context: &FilterContext) -> PotashResult<bool> {
        match element {
            Value::Document(document) => self.filter.apply(document, context),
            _ => {
                let mut document = Document::new();
                document.put("$", element.clone())?;
                self.filter.apply(&document, context)
            }
        }
    }
}

impl Display for ElementMatchFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} elemMatch {})", self.field_name, self.filter)
    }
}

impl FilterProvider for ElementMatchFilter {
    fn apply(&self, document: &Document, context: &FilterContext) -> PotashResult<bool> {
        if self.filter.as_any().is::<ElementMatchFilter>() {
            log::error!("Element match filter {} cannot nest another element match", self);
            return Err(PotashError::new(
                "Element match filter cannot nest another element match",
                ErrorKind::FilterError,
            ));
        }

        match context.resolve(document, &self.field_name) {
            Value::Null => Ok(false),
            Value::Array(elements) => {
                for element in &elements {
                    if self.match_element(element, context)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            other => {
                log::error!(
                    "Element match can only be applied on an array field, found {}",
                    other.type_name()
                );
                Err(PotashError::new(
                    "Element match can only be applied on an array field",
                    ErrorKind::FilterError,
                ))
            }
        }
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The words a full-text query looks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TextQuery {
    /// Any of the words. Empty when the query held only stop words.
    AnyWord(Vec<String>),
    Prefix(String),
    Suffix(String),
    Contains(String),
}

impl TextQuery {
    fn parse(query: &str) -> PotashResult<TextQuery> {
        let query = query.trim();
        if !query.contains('*') {
            let mut words = tokenize(query);
            words.sort();
            words.dedup();
            return Ok(TextQuery::AnyWord(words));
        }

        let term = query.trim_matches('*');
        if term.is_empty() {
            log::error!("Text query '{}' has no word besides wildcards", query);
            return Err(PotashError::new(
                "A wildcard text query needs a word, e.g. 'dat*', '*base' or '*tab*'",
                ErrorKind::FilterError,
            ));
        }
        if !term.chars().all(char::is_alphanumeric) {
            log::error!("Wildcard text query '{}' is not a single word", query);
            return Err(PotashError::new(
                "A wildcard text query must be a single word",
                ErrorKind::FilterError,
            ));
        }

        let term = term.to_lowercase();
        Ok(match (query.starts_with('*'), query.ends_with('*')) {
            (true, true) => TextQuery::Contains(term),
            (true, false) => TextQuery::Suffix(term),
            _ => TextQuery::Prefix(term),
        })
    }

    pub(crate) fn matches_word(&self, word: &str) -> bool {
        match self {
            TextQuery::AnyWord(words) => words.iter().any(|w| w == word),
            TextQuery::Prefix(term) => word.starts_with(term.as_str()),
            TextQuery::Suffix(term) => word.ends_with(term.as_str()),
            TextQuery::Contains(term) => word.contains(term.as_str()),
        }
    }
}

/// Full-text search on a string field or an array of strings.
///
/// A query of plain words matches documents holding any of them; a single
/// word with a leading and/or trailing `*` matches by suffix, prefix or
/// substring. Matching is case-insensitive. A `full-text` index on the field
/// answers the query and orders its candidates by the number of query
/// words they contain.
pub(crate) struct TextFilter {
    field_name: String,
    query: String,
    parsed: OnceLock<PotashResult<TextQuery>>,
}

impl TextFilter {
    pub(crate) fn new(field_name: String, query: String) -> Self {
        TextFilter {
            field_name,
            query,
            parsed: OnceLock::new(),
        }
    }

    pub(crate) fn text_query(&self) -> PotashResult<&TextQuery> {
        self.parsed
            .get_or_init(|| TextQuery::parse(&self.query))
            .as_ref()
            .map_err(Clone::clone)
    }

    fn words_of(value: &Value) -> Vec<String> {
        match value {
            Value::String(text) => tokenize(text),
            Value::Array(elements) => elements
                .iter()
                .filter_map(Value::as_str)
                .flat_map(tokenize)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// The text filter inside `filter`, if it is one.
pub(crate) fn as_text_filter(filter: &Filter) -> Option<&TextFilter> {
    filter.as_any().downcast_ref::<TextFilter>()
}

impl Display for TextFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} text {:?})", self.field_name, self.query)
    }
}

impl FilterProvider for TextFilter {
    fn apply(&self, document: &Document, context: &FilterContext) -> PotashResult<bool> {
        let query = self.text_query()?;
        let words = Self::words_of(&context.resolve(document, &self.field_name));
        Ok(words.iter().any(|word| query.matches_word(word)))
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
