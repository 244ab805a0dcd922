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

use clap::ValueEnum;
use serde::Serialize;

use crate::quick_filter::FilterState;
use crate::quick_filter::QuickFilter;
use crate::quick_filter::QuickFilters;
use crate::tag_query::Query;

pub const PARAM_TAG: &str = "tag";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_PAGE: &str = "page";
pub const DEFAULT_PAGE: u64 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a search view needs to be linkable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchState {
    #[serde(rename = "tag", serialize_with = "serialize_query")]
    pub query: Query,
    pub filters: QuickFilters,
    pub sort: SortOrder,
    pub page: u64,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: Query::empty(),
            filters: QuickFilters::new(),
            sort: SortOrder::default(),
            page: DEFAULT_PAGE,
        }
    }
}

fn serialize_query<S: serde::Serializer>(query: &Query, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&query.to_string())
}

/// Pages are positive integers; anything else means the first page.
pub fn parse_page(value: &str) -> u64 {
    match value.trim().parse::<u64>() {
        Ok(page) if page >= 1 => page,
        _ => DEFAULT_PAGE,
    }
}

impl SearchState {
    /// Decodes already-split parameters. When a key repeats, the first value wins.
    pub fn from_params<'a, I>(params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tag = None;
        let mut sort = None;
        let mut page = None;
        let mut filters: [Option<&str>; QuickFilter::ALL.len()] = [None; QuickFilter::ALL.len()];

        for (key, value) in params {
            match key {
                PARAM_TAG => {
                    tag.get_or_insert(value);
                }
                PARAM_SORT => {
                    sort.get_or_insert(value);
                }
                PARAM_PAGE => {
                    page.get_or_insert(value);
                }
                other => {
                    if let Some(idx) = QuickFilter::ALL.iter().position(|f| f.name() == other) {
                        filters[idx].get_or_insert(value);
                    }
                }
            }
        }

        let mut toggles = QuickFilters::new();
        for (filter, value) in QuickFilter::ALL.into_iter().zip(filters) {
            if let Some(value) = value {
                toggles = toggles.with(filter, FilterState::from_param(value));
            }
        }

        Self {
            query: tag.map(Query::parse).unwrap_or_default(),
            filters: toggles,
            sort: sort.and_then(SortOrder::from_param).unwrap_or_default(),
            page: page.map(parse_page).unwrap_or(DEFAULT_PAGE),
        }
    }

    /// Non-default fields only, in a fixed order: tag, filters, sort, page.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(tag) = self.query.to_param() {
            params.push((PARAM_TAG, tag));
        }
        for filter in QuickFilter::ALL {
            if let Some(value) = self.filters.get(filter).as_param() {
                params.push((filter.name(), value.to_string()));
            }
        }
        if self.sort != SortOrder::default() {
            params.push((PARAM_SORT, self.sort.as_str().to_string()));
        }
        if self.page != DEFAULT_PAGE {
            params.push((PARAM_PAGE, self.page.to_string()));
        }
        params
    }

    /// Accepts a full URL, a path with a query, `?a=b`, or a bare `a=b` string.
    /// Unknown or malformed values fall back to defaults.
    pub fn from_url(input: &str) -> Self {
        let pairs = decode_pairs(query_part(input));
        Self::from_params(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn to_query_string(&self) -> String {
        encode_pairs(self.to_params().iter().map(|(k, v)| (*k, v.as_str())))
    }

    /// Link target for this state under `base_path`, without a `?` when everything
    /// is default.
    pub fn href(&self, base_path: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            base_path.to_string()
        } else {
            format!("{base_path}?{query}")
        }
    }
}

/// A bare `a=b` string is taken whole, so an unencoded `?` inside a value survives.
fn query_part(input: &str) -> &str {
    let input = input.trim();
    let input = input.split_once('#').map_or(input, |(head, _)| head);
    if let Some(query) = input.strip_prefix('?') {
        return query;
    }
    if input.starts_with('/') || input.contains("://") {
        return input.split_once('?').map_or("", |(_, query)| query);
    }
    input
}

/// `application/x-www-form-urlencoded` decoding. Undecodable values are kept raw.
pub fn decode_pairs(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

pub fn encode_pairs<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}
