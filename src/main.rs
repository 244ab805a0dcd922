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

mod backend;
mod cli;
mod config;
mod output;
mod quick_filter;
mod recent;
mod reducer;
mod search;
mod store;
mod tag_query;

use std::path::PathBuf;

use anyhow::Context as _;
use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::Shell;

use crate::backend::BackendRequest;
use crate::backend::Endpoint;
use crate::cli::ActionCommand;
use crate::cli::Cli;
use crate::cli::Commands;
use crate::cli::RecentCommand;
use crate::config::Config;
use crate::config::ConfigCtx;
use crate::output::JsonResponse;
use crate::output::RecentOut;
use crate::output::RequestOut;
use crate::output::StateOut;
use crate::output::print_json;
use crate::output::print_warnings;
use crate::quick_filter::FilterState;
use crate::quick_filter::QuickFilter;
use crate::quick_filter::apply_quick_filters;
use crate::recent::RecentTags;
use crate::reducer::SearchAction;
use crate::search::SearchState;
use crate::store::Store;
use crate::store::StoreMode;
use crate::tag_query::Term;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Init { path } => cmd_init(path),
        Commands::Parse(args) => handle_result(cmd_parse(&args.url, args.json), args.json),
        Commands::Apply(args) => {
            handle_result(cmd_apply(&args.url, args.action, args.json), args.json)
        }
        Commands::Request(args) => handle_result(
            cmd_request(&args.url, args.endpoint, args.json),
            args.json,
        ),
        Commands::Recent(args) => handle_result(cmd_recent(args.command, args.json), args.json),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}

fn handle_result(result: Result<()>, json: bool) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            if json {
                let resp = JsonResponse::error(&format!("{err:#}"));
                print_json(&resp)?;
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

fn cmd_init(path: Option<PathBuf>) -> Result<()> {
    let root = path.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&root).with_context(|| format!("create dir {root:?}"))?;

    let config = config::load_global_config()?;
    let store_path = if config.store_path.is_absolute() {
        config.store_path.clone()
    } else {
        root.join(&config.store_path)
    };
    Store::init(&store_path)?;

    println!("Initialized pixq store at {}", store_path.display());
    Ok(())
}

fn state_out(state: SearchState, config: &Config) -> StateOut {
    StateOut {
        href: state.href(&config.search_path),
        query_string: state.to_query_string(),
        terms: state.query.terms().iter().map(|t| t.to_string()).collect(),
        effective: apply_quick_filters(&state.query, &state.filters, &config.vocabulary),
        state,
    }
}

fn cmd_parse(url: &str, json: bool) -> Result<()> {
    let ctx = ConfigCtx::load_from_cwd()?;
    let state = SearchState::from_url(url);

    if json {
        let resp = JsonResponse::ok().with_state(state_out(state, &ctx.config));
        print_json(&resp)?;
    } else {
        let effective = apply_quick_filters(&state.query, &state.filters, &ctx.config.vocabulary);
        println!("href: {}", state.href(&ctx.config.search_path));
        println!("tag: {}", state.query);
        for term in state.query.terms() {
            if term.is_negated() {
                println!("  - {}", term.literal());
            } else {
                println!("  + {term}");
            }
        }
        for filter in QuickFilter::ALL {
            println!("{filter}: {}", state.filters.get(filter).label());
        }
        println!("sort: {}", state.sort);
        println!("page: {}", state.page);
        println!("effective: {effective}");
    }

    Ok(())
}

fn to_action(command: &ActionCommand) -> Result<SearchAction> {
    let action = match command {
        ActionCommand::Add { tag, .. } => SearchAction::AddTag(Term::parse(tag)?),
        ActionCommand::Exclude { tag } => SearchAction::ExcludeTag(Term::parse(tag)?),
        ActionCommand::Remove { tag } => SearchAction::RemoveTag(Term::parse(tag)?),
        ActionCommand::Only { tag } => SearchAction::OnlyTag(Term::parse(tag)?),
        ActionCommand::Clear => SearchAction::ClearTags,
        ActionCommand::Filter { name, state } => SearchAction::SetFilter(
            QuickFilter::from_name(name)?,
            FilterState::from_label(state)?,
        ),
        ActionCommand::Sort { order } => SearchAction::SetSort(*order),
        ActionCommand::Page { page } => SearchAction::SetPage(*page),
        ActionCommand::Next => SearchAction::NextPage,
        ActionCommand::Prev => SearchAction::PrevPage,
    };
    Ok(action)
}

fn cmd_apply(url: &str, command: ActionCommand, json: bool) -> Result<()> {
    let ctx = ConfigCtx::load_from_cwd()?;
    let action = to_action(&command)?;
    let state = SearchState::from_url(url);
    let next = reducer::reduce(&state, &action);

    let mut warnings = Vec::new();
    let mut recent_out = None;
    if let (ActionCommand::Add { manual: true, .. }, SearchAction::AddTag(tag)) =
        (&command, &action)
    {
        let (mut recent, open_warnings) = open_recent(&ctx, StoreMode::ReadWrite);
        warnings.extend(open_warnings);
        recent.record(tag.as_str());
        warnings.extend(recent.take_warnings());
        recent_out = Some(recent_out_for(&recent, &ctx.config));
    }

    if json {
        let mut resp = JsonResponse::ok()
            .with_action(action.name())
            .with_state(state_out(next, &ctx.config));
        if let Some(recent) = recent_out {
            resp = resp.with_recent(recent);
        }
        print_json(&resp.with_warnings(warnings))?;
    } else {
        println!("{}", next.href(&ctx.config.search_path));
        print_warnings(&warnings);
    }

    Ok(())
}

fn cmd_request(url: &str, endpoint: Endpoint, json: bool) -> Result<()> {
    let ctx = ConfigCtx::load_from_cwd()?;
    let state = SearchState::from_url(url);
    let request = BackendRequest::new(endpoint, &state, &ctx.config.vocabulary);
    let url = request.path_and_query();

    if json {
        let resp = JsonResponse::ok().with_request(RequestOut { request, url });
        print_json(&resp)?;
    } else {
        println!("{url}");
    }

    Ok(())
}

fn open_recent(ctx: &ConfigCtx, mode: StoreMode) -> (RecentTags<Store>, Vec<String>) {
    let limit = ctx.config.recent_limit;
    let Some(path) = ctx.store_path() else {
        let warning = "recent tags unavailable: store not found; run `pixq init` first";
        return (RecentTags::detached(limit), vec![warning.to_string()]);
    };
    match Store::open(&path, mode) {
        Ok(store) => (RecentTags::load(store, limit), Vec::new()),
        Err(err) => (
            RecentTags::detached(limit),
            vec![format!("recent tags unavailable: {err:#}")],
        ),
    }
}

fn recent_out_for(recent: &RecentTags<Store>, config: &Config) -> RecentOut {
    RecentOut {
        tags: recent.tags().to_vec(),
        limit: config.recent_limit,
        persistent: recent.is_persistent(),
    }
}

fn cmd_recent(command: RecentCommand, json: bool) -> Result<()> {
    let ctx = ConfigCtx::load_from_cwd()?;
    let (mode, tag) = match command {
        RecentCommand::List => (StoreMode::ReadOnly, None),
        RecentCommand::Add { tag } => (StoreMode::ReadWrite, Some(Term::parse(&tag)?)),
    };
    let (mut recent, mut warnings) = open_recent(&ctx, mode);
    if let Some(tag) = tag {
        recent.record(tag.as_str());
    }
    warnings.extend(recent.take_warnings());

    if json {
        let resp = JsonResponse::ok()
            .with_recent(recent_out_for(&recent, &ctx.config))
            .with_warnings(warnings);
        print_json(&resp)?;
    } else {
        for tag in recent.tags() {
            println!("{tag}");
        }
        print_warnings(&warnings);
    }

    Ok(())
}

fn cmd_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "pixq", &mut std::io::stdout());
    Ok(())
}
