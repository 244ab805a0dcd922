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

use anyhow::Result;
use serde::Serialize;

use crate::backend::BackendRequest;
use crate::quick_filter::EffectiveQuery;
use crate::search::SearchState;

#[derive(Debug, Clone, Serialize)]
pub struct StateOut {
    pub href: String,
    pub query_string: String,
    #[serde(flatten)]
    pub state: SearchState,
    pub terms: Vec<String>,
    pub effective: EffectiveQuery,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestOut {
    #[serde(flatten)]
    pub request: BackendRequest,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentOut {
    pub tags: Vec<String>,
    pub limit: usize,
    pub persistent: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorOut {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct JsonResponse {
    pub ok: bool,
    pub schema_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StateOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent: Option<RecentOut>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOut>,
}

impl JsonResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            schema_version: "1".to_string(),
            ..Default::default()
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            ok: false,
            schema_version: "1".to_string(),
            error: Some(ErrorOut {
                code: "error".to_string(),
                message: message.to_string(),
            }),
            ..Default::default()
        }
    }

    pub fn with_action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    pub fn with_state(mut self, state: StateOut) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_request(mut self, request: RequestOut) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_recent(mut self, recent: RecentOut) -> Self {
        self.recent = Some(recent);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

pub fn print_json(resp: &JsonResponse) -> Result<()> {
    let text = serde_json::to_string_pretty(resp)?;
    println!("{text}");
    Ok(())
}

pub fn print_warnings(warnings: &[String]) {
    for warn in warnings {
        eprintln!("warning: {warn}");
    }
}
