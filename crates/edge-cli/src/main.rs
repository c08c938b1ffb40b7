use atty::Stream;
use clap::Parser;
use commands::Command;
use env_logger::fmt::Formatter;
use env_logger::{Builder, Env};
use globals::{GlobalFlags, Globals};
use human_panic::setup_panic;
use log::Record;
use std::fmt::Display;
use std::io::Write;

mod api;
mod auth;
mod commands;
mod config;
mod errors;
mod globals;
mod manifest;
mod output;
#[cfg(test)]
mod test_utils;
mod theme;

#[derive(Debug, Parser)]
#[command(name = "edge", version, about = "Manage services on the edge platform")]
pub struct BaseArgs {
    #[command(flatten)]
    pub flags: GlobalFlags,

    #[command(subcommand)]
    pub command: Command,
}

/// Shared by every command's message and error types.
pub trait CmdOutput {
    fn code(&self) -> String;
    fn exitcode(&self) -> errors::ExitCode;
    fn data(&self) -> Option<serde_json::Value> {
        None
    }
}

impl CmdOutput for std::convert::Infallible {
    fn code(&self) -> String {
        match *self {}
    }

    fn exitcode(&self) -> errors::ExitCode {
        match *self {}
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(serialized) => println!("{serialized}"),
        Err(e) => log::error!("Failed to serialize output: {e}"),
    }
}

pub fn report_error<E: CmdOutput + Display>(e: E, json: bool) -> errors::ExitCode {
    if json {
        print_json(&serde_json::json!({ "code": e.code(), "message": e.to_string() }));
    }
    log::error!("{e}");
    e.exitcode()
}

/// Prints a command's outcome and returns the process exit code.
pub fn run_cmd<M, E>(result: Result<M, E>, json: bool) -> errors::ExitCode
where
    M: CmdOutput + Display,
    E: CmdOutput + Display,
{
    match result {
        Ok(message) => {
            if json {
                let data = message.data().unwrap_or_else(|| {
                    serde_json::json!({ "code": message.code(), "message": message.to_string() })
                });
                print_json(&data);
            } else {
                let text = message.to_string();
                if !text.is_empty() {
                    println!("{text}");
                }
            }
            message.exitcode()
        }
        Err(e) => report_error(e, json),
    }
}

#[tokio::main]
async fn main() {
    // Use human panic to give nicer error logs in the case of a runtime panic
    setup_panic!(Metadata {
        name: env!("CARGO_PKG_NAME").into(),
        version: env!("CARGO_PKG_VERSION").into(),
        authors: env!("CARGO_PKG_AUTHORS").into(),
        homepage: env!("CARGO_PKG_HOMEPAGE").into(),
    });

    let base_args: BaseArgs = BaseArgs::parse();
    setup_logger(base_args.flags.verbose);

    if let Err(e) = base_args.flags.validate() {
        std::process::exit(report_error(e, false));
    }

    let json = base_args.flags.json;
    let globals = match Globals::load(base_args.flags) {
        Ok(globals) => globals,
        Err(e) => std::process::exit(report_error(e, json)),
    };

    let exit_code = commands::run_command(base_args.command, globals).await;
    std::process::exit(exit_code);
}

fn setup_logger(verbose_logging: bool) {
    let env = Env::new()
        .filter_or("EDGE_LOG", "INFO")
        .write_style("EDGE_LOG_STYLE");
    let mut builder = Builder::from_env(env);

    let log_formatter = |buf: &mut Formatter, record: &Record| {
        // If stderr is being piped elsewhere, add timestamps and remove colors
        if atty::isnt(Stream::Stderr) {
            let timestamp = buf.timestamp_millis();
            writeln!(
                buf,
                "[{} {}] {}",
                timestamp,
                record.metadata().level(),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "[{}] {}",
                buf.default_styled_level(record.metadata().level()),
                record.args()
            )
        }
    };

    builder
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);
    if verbose_logging {
        builder.filter(Some("edge"), log::LevelFilter::Debug);
    }
    builder.format(log_formatter).init();
}
