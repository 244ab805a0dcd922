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

//! Quick filter toggles and the effective query they produce.
//!
//! Toggles never touch the stored [`Query`]. They only contribute terms to an
//! [`EffectiveQuery`], which exists solely at the request boundary and has no way
//! back into search state.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

use crate::tag_query::Query;
use crate::tag_query::Term;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickFilter {
    Sfw,
    Realistic,
}

impl QuickFilter {
    /// Every filter in application order. Later filters land further from the base query.
    pub const ALL: [QuickFilter; 2] = [QuickFilter::Sfw, QuickFilter::Realistic];

    pub fn name(self) -> &'static str {
        match self {
            QuickFilter::Sfw => "sfw",
            QuickFilter::Realistic => "realistic",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.name() == name)
            .ok_or_else(|| {
                anyhow::anyhow!("unknown quick filter {name:?} (expected sfw or realistic)")
            })
    }
}

impl fmt::Display for QuickFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterState {
    #[default]
    Unset,
    Only,
    Not,
}

impl FilterState {
    /// URL decoding is lenient: anything but `only` / `not` is unset.
    pub fn from_param(value: &str) -> Self {
        match value {
            "only" => FilterState::Only,
            "not" => FilterState::Not,
            _ => FilterState::Unset,
        }
    }

    pub fn as_param(self) -> Option<&'static str> {
        match self {
            FilterState::Unset => None,
            FilterState::Only => Some("only"),
            FilterState::Not => Some("not"),
        }
    }

    /// Button label shown next to the filter name.
    pub fn label(self) -> &'static str {
        self.as_param().unwrap_or("any")
    }

    /// Strict parse for user input, accepting the button labels too.
    pub fn from_label(value: &str) -> Result<Self> {
        match value {
            "any" | "unset" => Ok(FilterState::Unset),
            "only" => Ok(FilterState::Only),
            "not" => Ok(FilterState::Not),
            other => anyhow::bail!("unknown filter state {other:?} (expected any, only or not)"),
        }
    }
}

/// Toggle states keyed by filter. Unset filters are never stored, so two values
/// compare equal exactly when they constrain the search the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuickFilters(BTreeMap<QuickFilter, FilterState>);

impl QuickFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, filter: QuickFilter) -> FilterState {
        self.0.get(&filter).copied().unwrap_or_default()
    }

    pub fn with(&self, filter: QuickFilter, state: FilterState) -> Self {
        let mut next = self.0.clone();
        if state == FilterState::Unset {
            next.remove(&filter);
        } else {
            next.insert(filter, state);
        }
        Self(next)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterTerms {
    pub only: Vec<String>,
    pub not: Vec<String>,
}

impl FilterTerms {
    fn new(only: &[&str], not: &[&str]) -> Self {
        Self {
            only: only.iter().map(|s| s.to_string()).collect(),
            not: not.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn for_state(&self, state: FilterState) -> &[String] {
        match state {
            FilterState::Unset => &[],
            FilterState::Only => &self.only,
            FilterState::Not => &self.not,
        }
    }
}

/// The literal terms each filter injects. These belong to the search backend's tag
/// vocabulary, so they are versioned and can be overridden from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub version: String,
    pub sfw: FilterTerms,
    pub realistic: FilterTerms,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            sfw: FilterTerms::new(&["-rating:s", "-rating:q", "-rating:e"], &["-rating:g"]),
            realistic: FilterTerms::new(&["realistic"], &["-realistic"]),
        }
    }
}

impl Vocabulary {
    pub fn terms(&self, filter: QuickFilter) -> &FilterTerms {
        match filter {
            QuickFilter::Sfw => &self.sfw,
            QuickFilter::Realistic => &self.realistic,
        }
    }

    /// Every configured literal must survive the term parse boundary unchanged.
    pub fn validate(&self) -> Result<()> {
        for filter in QuickFilter::ALL {
            let terms = self.terms(filter);
            for literal in terms.only.iter().chain(terms.not.iter()) {
                let term = Term::parse(literal)
                    .with_context(|| format!("vocabulary {} for {filter}", self.version))?;
                if term.as_str() != literal {
                    anyhow::bail!(
                        "vocabulary {} for {filter}: term {literal:?} has surrounding whitespace",
                        self.version
                    );
                }
            }
        }
        Ok(())
    }
}

/// The query actually sent to the search backend. Deliberately not convertible
/// into a [`Query`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EffectiveQuery(String);

impl EffectiveQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EffectiveQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn apply_quick_filters(
    query: &Query,
    filters: &QuickFilters,
    vocabulary: &Vocabulary,
) -> EffectiveQuery {
    let mut parts: Vec<&str> = Vec::new();
    for filter in QuickFilter::ALL.into_iter().rev() {
        let injected = vocabulary.terms(filter).for_state(filters.get(filter));
        parts.extend(injected.iter().map(String::as_str));
    }
    parts.extend(query.terms().iter().map(Term::as_str));
    let text = parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    EffectiveQuery(text)
}
