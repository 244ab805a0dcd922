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

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;

use crate::backend::Endpoint;
use crate::search::SortOrder;

#[derive(Parser, Debug)]
#[command(name = "pixq", version, about = "Tag query state engine for image search links")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the recent-tags store
    Init {
        /// Directory to create the store in
        path: Option<PathBuf>,
    },

    /// Decode a search URL into its canonical state
    Parse(ParseArgs),

    /// Apply one search action and print the next URL
    Apply(ApplyArgs),

    /// Build the backend request for a search URL
    Request(RequestArgs),

    /// Recently added manual tags
    Recent(RecentArgs),

    /// Print shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Search URL, path, or query string
    pub url: String,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Search URL, path, or query string
    pub url: String,

    #[command(subcommand)]
    pub action: ActionCommand,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ActionCommand {
    /// Add a tag to the query
    Add {
        #[arg(allow_hyphen_values = true)]
        tag: String,

        /// Also remember the tag as a manually added tag
        #[arg(long)]
        manual: bool,
    },

    /// Add the negated form of a tag
    Exclude {
        #[arg(allow_hyphen_values = true)]
        tag: String,
    },

    /// Remove a term from the query
    Remove {
        #[arg(allow_hyphen_values = true)]
        tag: String,
    },

    /// Replace the query with a single tag
    Only {
        #[arg(allow_hyphen_values = true)]
        tag: String,
    },

    /// Drop every term
    Clear,

    /// Set a quick filter (any, only, not)
    Filter { name: String, state: String },

    /// Change the sort order
    Sort {
        #[arg(value_enum)]
        order: SortOrder,
    },

    /// Jump to a page
    Page { page: u64 },

    /// Next page
    Next,

    /// Previous page
    Prev,
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Search URL, path, or query string
    pub url: String,

    /// Backend endpoint
    #[arg(long, value_enum, default_value_t = Endpoint::Images)]
    pub endpoint: Endpoint,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RecentArgs {
    #[command(subcommand)]
    pub command: RecentCommand,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum RecentCommand {
    /// Show recent tags, most recent first
    List,

    /// Record a manually added tag
    Add {
        #[arg(allow_hyphen_values = true)]
        tag: String,
    },
}
