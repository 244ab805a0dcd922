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

use clap::ValueEnum;
use serde::Serialize;

use crate::quick_filter::EffectiveQuery;
use crate::quick_filter::Vocabulary;
use crate::quick_filter::apply_quick_filters;
use crate::search::PARAM_PAGE;
use crate::search::PARAM_SORT;
use crate::search::PARAM_TAG;
use crate::search::SearchState;
use crate::search::SortOrder;
use crate::search::encode_pairs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// Paged image listing
    Images,
    /// Tag counts for the sidebar
    Tags,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Images => "/api/images",
            Endpoint::Tags => "/api/tags",
        }
    }
}

/// The only consumer of [`EffectiveQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendRequest {
    pub endpoint: Endpoint,
    pub query: EffectiveQuery,
    pub page: u64,
    pub sort: SortOrder,
}

impl BackendRequest {
    pub fn new(endpoint: Endpoint, state: &SearchState, vocabulary: &Vocabulary) -> Self {
        Self {
            endpoint,
            query: apply_quick_filters(&state.query, &state.filters, vocabulary),
            page: state.page,
            sort: state.sort,
        }
    }

    /// Image listing takes `tag`, `page` and `sort`; tag counts only take `q`.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        match self.endpoint {
            Endpoint::Images => {
                if !self.query.is_empty() {
                    params.push((PARAM_TAG, self.query.as_str().to_string()));
                }
                params.push((PARAM_PAGE, self.page.to_string()));
                params.push((PARAM_SORT, self.sort.as_str().to_string()));
            }
            Endpoint::Tags => {
                if !self.query.is_empty() {
                    params.push(("q", self.query.as_str().to_string()));
                }
            }
        }
        params
    }

    pub fn path_and_query(&self) -> String {
        let query = encode_pairs(self.params().iter().map(|(k, v)| (*k, v.as_str())));
        if query.is_empty() {
            self.endpoint.path().to_string()
        } else {
            format!("{}?{query}", self.endpoint.path())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(endpoint: Endpoint, url: &str) -> BackendRequest {
        BackendRequest::new(endpoint, &SearchState::from_url(url), &Vocabulary::default())
    }

    #[test]
    fn images_request_carries_effective_query_page_and_sort() {
        let req = request(Endpoint::Images, "tag=cat&sfw=only&page=2&sort=asc");
        assert_eq!(req.query.as_str(), "-rating:s -rating:q -rating:e cat");
        assert_eq!(
            req.path_and_query(),
            "/api/images?tag=-rating%3As%20-rating%3Aq%20-rating%3Ae%20cat&page=2&sort=asc"
        );
    }

    #[test]
    fn images_request_without_terms_omits_tag() {
        let req = request(Endpoint::Images, "");
        assert_eq!(req.path_and_query(), "/api/images?page=1&sort=desc");
    }

    #[test]
    fn tags_request_uses_q_only() {
        let req = request(Endpoint::Tags, "tag=cat&realistic=not&page=4");
        assert_eq!(req.path_and_query(), "/api/tags?q=-realistic%20cat");
        assert_eq!(request(Endpoint::Tags, "").path_and_query(), "/api/tags");
    }

    #[test]
    fn effective_terms_never_reach_the_state_url() {
        let state = SearchState::from_url("tag=cat&sfw=only");
        let _ = BackendRequest::new(Endpoint::Images, &state, &Vocabulary::default());
        assert_eq!(state.to_query_string(), "tag=cat&sfw=only");
    }
}
