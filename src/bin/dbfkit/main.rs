use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};

mod cli;
mod cmd_export;
mod cmd_import;
mod cmd_info;
mod cmd_schema;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Info { path, json } => cmd_info::exec(path, json),

        cli::Cmd::Export { path } => cmd_export::exec(path),

        cli::Cmd::Import {
            tsv,
            path,
            code_page,
        } => cmd_import::exec(tsv, path, code_page),

        cli::Cmd::AddField {
            path,
            name,
            r#type,
            width,
            decimals,
        } => cmd_schema::exec_add(path, name, r#type, width, decimals),

        cli::Cmd::DeleteField { path, field } => cmd_schema::exec_delete(path, field),

        cli::Cmd::AlterField {
            path,
            field,
            name,
            r#type,
            width,
            decimals,
        } => cmd_schema::exec_alter(path, field, name, r#type, width, decimals),

        cli::Cmd::Reorder { path, order } => cmd_schema::exec_reorder(path, order),
    }
}
