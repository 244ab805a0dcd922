// Copyright 2026 Pixq Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;

use anyhow::Result;

const NEGATION: char = '-';

/// One whitespace-free unit of a query, optionally negated with a leading `-`.
///
/// Equality is textual: `cat` and `-cat` are different terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Term(String);

impl Term {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            anyhow::bail!("tag must not be empty");
        }
        if trimmed.chars().any(char::is_whitespace) {
            anyhow::bail!("tag {trimmed:?} must not contain whitespace");
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_negated(&self) -> bool {
        self.0.len() > 1 && self.0.starts_with(NEGATION)
    }

    /// The tag literal without its negation marker.
    pub fn literal(&self) -> &str {
        if self.is_negated() {
            &self.0[NEGATION.len_utf8()..]
        } else {
            &self.0
        }
    }

    /// The excluding form of this tag. Already negated terms are returned as-is.
    pub fn negated(&self) -> Self {
        if self.is_negated() {
            self.clone()
        } else {
            Self(format!("{NEGATION}{}", self.0))
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, duplicate-free terms. Text is only split in [`Query::parse`] and only
/// joined in `Display`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    terms: Vec<Term>,
}

impl Query {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Splits free text on whitespace. Repeated terms keep their first position.
    pub fn parse(text: &str) -> Self {
        let mut query = Self::empty();
        for word in text.split_whitespace() {
            let term = Term(word.to_string());
            if !query.contains(&term) {
                query.terms.push(term);
            }
        }
        query
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn contains(&self, term: &Term) -> bool {
        self.terms.contains(term)
    }

    pub fn add_tag(&self, tag: &Term) -> Self {
        if self.contains(tag) {
            return self.clone();
        }
        let mut terms = self.terms.clone();
        terms.push(tag.clone());
        Self { terms }
    }

    pub fn remove_tag(&self, tag: &Term) -> Self {
        Self {
            terms: self.terms.iter().filter(|t| *t != tag).cloned().collect(),
        }
    }

    /// Pivots the whole search to `tag`; whatever was there before is dropped.
    pub fn restrict_to_only(&self, tag: &Term) -> Self {
        Self {
            terms: vec![tag.clone()],
        }
    }

    pub fn clear(&self) -> Self {
        Self::empty()
    }

    /// The URL form of this query, `None` when there are no terms.
    pub fn to_param(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, term) in self.terms.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            f.write_str(term.as_str())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn term(s: &str) -> Term {
        Term::parse(s).expect("term")
    }

    #[test]
    fn add_to_empty_yields_single_term() {
        let q = Query::empty().add_tag(&term("cat"));
        assert_eq!(q.to_string(), "cat");
    }

    #[test]
    fn add_appends_and_keeps_order() {
        let q = Query::parse("cat dog").add_tag(&term("bird"));
        assert_eq!(q.to_string(), "cat dog bird");
    }

    #[test]
    fn add_existing_is_noop() {
        let q = Query::parse("cat dog");
        assert_eq!(q.add_tag(&term("cat")), q);
    }

    #[test]
    fn negated_and_plain_forms_are_independent() {
        let q = Query::parse("cat").add_tag(&term("-cat"));
        assert_eq!(q.to_string(), "cat -cat");
        assert_eq!(q.remove_tag(&term("cat")).to_string(), "-cat");
    }

    #[test]
    fn remove_last_term_yields_absent_param() {
        let q = Query::parse("cat").remove_tag(&term("cat"));
        assert!(q.is_empty());
        assert_eq!(q.to_param(), None);
    }

    #[test]
    fn restrict_to_only_discards_prior_terms() {
        let q = Query::parse("cat dog -bird").restrict_to_only(&term("fox"));
        assert_eq!(q.to_string(), "fox");
    }

    #[test]
    fn clear_empties_any_query() {
        assert!(Query::parse("cat dog").clear().is_empty());
    }

    #[test]
    fn parse_collapses_whitespace_and_duplicates() {
        let q = Query::parse("  cat   dog cat\t-bird ");
        assert_eq!(q.to_string(), "cat dog -bird");
        assert_eq!(q.terms().len(), 3);
    }

    #[test]
    fn term_rejects_whitespace_and_empty() {
        assert!(Term::parse("").is_err());
        assert!(Term::parse("   ").is_err());
        assert!(Term::parse("long hair").is_err());
        assert_eq!(term(" cat ").as_str(), "cat");
    }

    #[test]
    fn term_negation_helpers() {
        assert!(term("-cat").is_negated());
        assert!(!term("-").is_negated());
        assert_eq!(term("-cat").literal(), "cat");
        assert_eq!(term("cat").negated().as_str(), "-cat");
        assert_eq!(term("-cat").negated().as_str(), "-cat");
    }

    fn term_strategy() -> impl Strategy<Value = Term> {
        "-?[a-z:_]{1,6}".prop_map(|s| term(&s))
    }

    fn query_strategy() -> impl Strategy<Value = Query> {
        prop::collection::vec("-?[a-z:_]{1,6}", 0..6)
            .prop_map(|words| Query::parse(&words.join(" ")))
    }

    proptest! {
        #[test]
        fn add_is_idempotent(q in query_strategy(), t in term_strategy()) {
            let once = q.add_tag(&t);
            prop_assert_eq!(once.add_tag(&t), once);
        }

        #[test]
        fn remove_after_add_drops_tag(q in query_strategy(), t in term_strategy()) {
            let removed = q.add_tag(&t).remove_tag(&t);
            prop_assert!(!removed.contains(&t));
            prop_assert_eq!(removed.remove_tag(&t), removed);
        }

        #[test]
        fn text_form_round_trips(q in query_strategy()) {
            prop_assert_eq!(Query::parse(&q.to_string()), q);
        }
    }
}
