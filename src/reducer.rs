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

use crate::quick_filter::FilterState;
use crate::quick_filter::QuickFilter;
use crate::search::DEFAULT_PAGE;
use crate::search::SearchState;
use crate::search::SortOrder;
use crate::tag_query::Term;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    AddTag(Term),
    ExcludeTag(Term),
    RemoveTag(Term),
    OnlyTag(Term),
    ClearTags,
    SetFilter(QuickFilter, FilterState),
    SetSort(SortOrder),
    SetPage(u64),
    NextPage,
    PrevPage,
}

impl SearchAction {
    pub fn name(&self) -> &'static str {
        match self {
            SearchAction::AddTag(_) => "add",
            SearchAction::ExcludeTag(_) => "exclude",
            SearchAction::RemoveTag(_) => "remove",
            SearchAction::OnlyTag(_) => "only",
            SearchAction::ClearTags => "clear",
            SearchAction::SetFilter(..) => "filter",
            SearchAction::SetSort(_) => "sort",
            SearchAction::SetPage(_) => "page",
            SearchAction::NextPage => "next",
            SearchAction::PrevPage => "prev",
        }
    }
}

/// Anything that can change the result set goes back to the first page.
pub fn reduce(state: &SearchState, action: &SearchAction) -> SearchState {
    match action {
        SearchAction::AddTag(tag) => add_tag(state, tag),
        SearchAction::ExcludeTag(tag) => add_tag(state, &tag.negated()),
        SearchAction::RemoveTag(tag) => remove_tag(state, tag),
        SearchAction::OnlyTag(tag) => only_tag(state, tag),
        SearchAction::ClearTags => clear_tags(state),
        SearchAction::SetFilter(filter, value) => set_filter(state, *filter, *value),
        SearchAction::SetSort(sort) => set_sort(state, *sort),
        SearchAction::SetPage(page) => set_page(state, *page),
        SearchAction::NextPage => set_page(state, state.page.saturating_add(1)),
        SearchAction::PrevPage => set_page(state, state.page.saturating_sub(1)),
    }
}

pub fn add_tag(state: &SearchState, tag: &Term) -> SearchState {
    SearchState {
        query: state.query.add_tag(tag),
        page: DEFAULT_PAGE,
        ..state.clone()
    }
}

pub fn remove_tag(state: &SearchState, tag: &Term) -> SearchState {
    SearchState {
        query: state.query.remove_tag(tag),
        page: DEFAULT_PAGE,
        ..state.clone()
    }
}

pub fn only_tag(state: &SearchState, tag: &Term) -> SearchState {
    SearchState {
        query: state.query.restrict_to_only(tag),
        page: DEFAULT_PAGE,
        ..state.clone()
    }
}

pub fn clear_tags(state: &SearchState) -> SearchState {
    SearchState {
        query: state.query.clear(),
        page: DEFAULT_PAGE,
        ..state.clone()
    }
}

pub fn set_filter(state: &SearchState, filter: QuickFilter, value: FilterState) -> SearchState {
    SearchState {
        filters: state.filters.with(filter, value),
        page: DEFAULT_PAGE,
        ..state.clone()
    }
}

pub fn set_sort(state: &SearchState, sort: SortOrder) -> SearchState {
    SearchState {
        sort,
        page: DEFAULT_PAGE,
        ..state.clone()
    }
}

/// Page 0 is clamped to the first page.
pub fn set_page(state: &SearchState, page: u64) -> SearchState {
    SearchState {
        page: page.max(DEFAULT_PAGE),
        ..state.clone()
    }
}
