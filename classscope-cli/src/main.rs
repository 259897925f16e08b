mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })
    .expect("failed to set Ctrl+C handler");

    let cli = Cli::parse();

    // Show classscope info+ on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("classscope", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    match &cli.command {
        Command::Info { path } => commands::info::run(path, &cli.global),
        Command::Pool { path } => commands::pool::run(path, &cli.global),
        Command::Attrs { path } => commands::attrs::run(path, &cli.global),
        Command::Methods { path, name } => {
            commands::methods::run(path, name.as_deref(), &cli.global)
        }
        Command::Disasm {
            path,
            method,
            bytes,
            no_offsets,
            raw,
        } => commands::disasm::run(
            path,
            method.as_deref(),
            commands::disasm::DisasmOptions {
                bytes: *bytes,
                offsets: !*no_offsets,
                raw: *raw,
            },
        ),
    }
}
