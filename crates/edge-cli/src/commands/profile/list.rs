use crate::config::Profiles;
use crate::globals::Globals;
use crate::output::{self, Block};
use crate::CmdOutput;
use chrono::{TimeZone, Utc};
use clap::Parser;
use prettytable::row;
use std::convert::Infallible;

/// List the profiles stored in your local configuration
#[derive(Parser, Debug)]
#[command(name = "list")]
pub struct ListArgs {}

#[derive(strum_macros::Display, Debug)]
pub enum ListMessage {
    #[strum(to_string = "{rendered}")]
    Profiles {
        rendered: String,
        data: serde_json::Value,
    },
    #[strum(to_string = "No profiles found. Run `edge sso` or `edge profile create <NAME>` to add one.")]
    Empty,
}

impl CmdOutput for ListMessage {
    fn code(&self) -> String {
        match self {
            ListMessage::Profiles { .. } => "profile/list",
            ListMessage::Empty => "profile/list-empty",
        }
        .to_string()
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        crate::errors::OK
    }

    fn data(&self) -> Option<serde_json::Value> {
        match self {
            ListMessage::Profiles { data, .. } => Some(data.clone()),
            ListMessage::Empty => Some(serde_json::json!([])),
        }
    }
}

fn timestamp(secs: i64) -> Option<chrono::DateTime<Utc>> {
    (secs > 0)
        .then(|| Utc.timestamp_opt(secs, 0).single())
        .flatten()
}

fn render_table(profiles: &Profiles) -> String {
    let rows = profiles
        .iter()
        .map(|(name, p)| row![name, p.default, p.email])
        .collect();
    output::table(row!["NAME", "DEFAULT", "EMAIL"], rows)
}

fn render_verbose(profiles: &Profiles) -> String {
    let mut block = Block::new();
    for (name, p) in profiles {
        block
            .line(0, format!("Profile: {name}"))
            .field(1, "Default", p.default)
            .field(1, "Email", &p.email)
            .field(1, "Token", &p.token)
            .time(1, "Access token created", &timestamp(p.access_token_created))
            .field(1, "Access token TTL", p.access_token_ttl)
            .time(1, "Refresh token created", &timestamp(p.refresh_token_created))
            .field(1, "Refresh token TTL", p.refresh_token_ttl)
            .blank();
    }
    block.render()
}

pub fn render(profiles: &Profiles, verbose: bool) -> ListMessage {
    if profiles.is_empty() {
        return ListMessage::Empty;
    }

    let data = profiles
        .iter()
        .map(|(name, p)| serde_json::json!({ "name": name, "default": p.default, "email": p.email }))
        .collect();
    let rendered = if verbose {
        render_verbose(profiles)
    } else {
        render_table(profiles)
    };
    ListMessage::Profiles { rendered, data }
}

pub fn run(_: ListArgs, globals: &Globals) -> Result<ListMessage, Infallible> {
    Ok(render(&globals.config.profiles, globals.verbose()))
}
