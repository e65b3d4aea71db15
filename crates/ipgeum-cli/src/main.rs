//! Ipgeum CLI - Korean bank deposit notification parser
//!
//! Usage:
//!   ipgeum init                     Initialize database
//!   ipgeum parse "농협 입금..."     Parse a notification and print JSON
//!   ipgeum ingest --file sms.txt    Parse and store a notification
//!   ipgeum serve --port 3000        Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Parse {
            text,
            file,
            companies,
            today,
            with_db,
        } => {
            let input = commands::read_text(text.as_deref(), file.as_deref())?;
            let db = if with_db {
                Some(commands::open_db(&cli.db, cli.no_encrypt)?)
            } else {
                None
            };
            commands::cmd_parse(&input, &companies, today, db.as_ref()).await
        }
        Commands::Ingest { text, file } => {
            let input = commands::read_text(text.as_deref(), file.as_deref())?;
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_ingest(&db, &input).await.map(|_| ())
        }
        Commands::Companies { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(CompaniesAction::List) => commands::cmd_companies_list(&db),
                Some(CompaniesAction::Add { name, pending }) => {
                    commands::cmd_companies_add(&db, &name, !pending)
                }
                Some(CompaniesAction::Approve { name }) => {
                    commands::cmd_companies_set_approved(&db, &name, true)
                }
                Some(CompaniesAction::Revoke { name }) => {
                    commands::cmd_companies_set_approved(&db, &name, false)
                }
                Some(CompaniesAction::Remove { name }) => {
                    commands::cmd_companies_remove(&db, &name)
                }
            }
        }
        Commands::Members { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_members_list(&db, None),
                Some(MembersAction::List { category }) => {
                    commands::cmd_members_list(&db, category.as_deref())
                }
                Some(MembersAction::Add(args)) => {
                    commands::cmd_members_add(&db, &args.into_member())
                }
                Some(MembersAction::Update { id, member }) => {
                    commands::cmd_members_update(&db, id, &member.into_member())
                }
                Some(MembersAction::Remove { id }) => commands::cmd_members_remove(&db, id),
            }
        }
        Commands::Deposits {
            limit,
            company,
            action,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_deposits_list(&db, limit, company.as_deref()),
                Some(DepositsAction::Remove { id }) => commands::cmd_deposits_remove(&db, id),
                Some(DepositsAction::Companies) => commands::cmd_deposits_companies(&db),
            }
        }
        Commands::Serve { port, host } => {
            commands::cmd_serve(&cli.db, &host, port, cli.no_encrypt).await
        }
    }
}
