use std::{env, path::PathBuf, str::FromStr};

use anyhow::Result;
use clap::ArgMatches;
use dotenvy::{dotenv, var as envar};
use reedline::Signal;
use tracing::debug;

mod actions;
mod command_parser;
mod menu;
mod prompt;
mod repl;
mod server;

use actions::Context;
use libris::{
    backup::State, config::Config, export::Export, service::CatalogService, store::CatalogStore,
};

/// Whether the read eval print loop should keep going.
pub enum Flow {
    Continue,
    Exit,
}

fn joined(matches: &ArgMatches, id: &str) -> String {
    matches
        .get_many::<String>(id)
        .map(|x| x.cloned().collect::<Vec<String>>().join(" "))
        .unwrap_or_default()
}

async fn handle_matches(matches: &ArgMatches, ctx: &Context) -> Result<Flow> {
    let output = match matches.subcommand() {
        Some(("search", _matches)) => actions::search(ctx, &joined(_matches, "title")).await?,
        Some(("list", _matches)) => match _matches.subcommand() {
            Some(("books", _)) => actions::list_books(ctx).await?,
            Some(("authors", _)) => actions::list_authors(ctx).await?,
            Some(("alive", _matches)) => {
                let year = _matches.get_one::<i64>("year").copied().unwrap_or_default();
                actions::list_alive(ctx, year).await?
            }
            Some(("languages", _)) => actions::list_languages(ctx).await?,
            Some(("language", _matches)) => {
                let code = _matches.get_one::<String>("code").cloned().unwrap_or_default();
                actions::list_language(ctx, &code).await?
            }
            Some((name, _matches)) => unimplemented!("{}", name),
            None => unreachable!("subcommand required"),
        },
        Some(("stats", _)) => actions::statistics(ctx).await?,
        Some(("top", _matches)) => actions::top(ctx, _matches.get_one::<u32>("count").copied()).await?,
        Some(("author", _matches)) => actions::author(ctx, &joined(_matches, "name")).await?,
        Some(("range", _matches)) => {
            let from = _matches.get_one::<i64>("from").copied().unwrap_or_default();
            let to = _matches.get_one::<i64>("to").copied().unwrap_or_default();
            actions::range(ctx, from, to).await?
        }
        Some(("backup", _matches)) => {
            let file = _matches.get_one::<String>("file").cloned().unwrap_or_default();
            let state = State::load(&ctx.service).await?;
            std::fs::write(&file, state.serialize()?)?;
            format!("Wrote {} books to {file}", state.books().len())
        }
        Some(("restore", _matches)) => {
            let file = _matches.get_one::<String>("file").cloned().unwrap_or_default();
            let state = State::deserialize(&std::fs::read_to_string(&file)?)?;
            let report = state.restore(&ctx.service).await?;
            format!(
                "Added {} books, {} were already in the catalog, {} were invalid",
                report.created, report.skipped, report.rejected
            )
        }
        Some(("export", _matches)) => {
            let data = Export::new(&ctx.service).await?;
            match _matches.get_one::<String>("file") {
                Some(file) => Export::export(data, std::fs::File::create(file)?)?,
                None => Export::export(data, std::io::stdout())?,
            }
            return Ok(Flow::Continue);
        }
        Some(("config", _)) => Config::default_as_string()?,
        Some(("menu", _)) => {
            menu::run(ctx).await?;
            return Ok(Flow::Continue);
        }
        Some(("exit", _)) => return Ok(Flow::Exit),
        Some((name, _matches)) => unimplemented!("{}", name),
        None => unreachable!("subcommand required"),
    };
    println!("{output}");
    Ok(Flow::Continue)
}

async fn handle_command(command: String, ctx: &Context) -> Result<Flow> {
    let args = command_parser::arg_parser();
    let Some(command) = shlex::split(&command) else {
        anyhow::bail!("Invalid command");
    };
    let matches = args.try_get_matches_from(command)?;
    handle_matches(&matches, ctx).await
}

fn database_location(config: &Config) -> Result<PathBuf> {
    if dotenv().is_ok() {
        if let Ok(db_url) = envar("DATABASE_URL") {
            return Ok(PathBuf::from(db_url));
        }
    }
    config.database_path()
}

async fn connect_to_db(config: &Config) -> Result<CatalogStore> {
    let location = database_location(config)?;
    debug!("Opening catalog at {}", location.display());
    CatalogStore::connect(location).await
}

fn init_tracing(config: &Config) -> Result<()> {
    let level = tracing::Level::from_str(&config.log_level)?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn print_error(config: &Config, e: &anyhow::Error) {
    eprintln!("{}", config.output_error.format_str(format!("{e:#}")));
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::read_config()?;
    init_tracing(&config)?;

    let args_parsed = command_parser::arg_parser_cli().get_matches_from(env::args_os().skip(1));

    let service = CatalogService::new(connect_to_db(&config).await?);
    let ctx = Context::new(service, config);

    match args_parsed.subcommand() {
        Some(("repl", _)) => {
            let mut repl = repl::Repl::new(command_parser::generate_completions())?;
            loop {
                match repl.read_line() {
                    Ok(Signal::Success(buffer)) => match handle_command(buffer, &ctx).await {
                        Ok(Flow::Continue) => (),
                        Ok(Flow::Exit) => break,
                        Err(e) => print_error(&ctx.config, &e),
                    },
                    Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => {
                        println!("\nAborted!");
                        break;
                    }
                    Ok(signal) => debug!("Ignoring {:?}", signal),
                    Err(e) => {
                        print_error(&ctx.config, &e);
                        break;
                    }
                }
            }
        }
        Some(("serve", _matches)) => {
            let port = _matches.get_one::<u16>("port").copied().unwrap_or(3000);
            server::start(ctx, port).await?;
        }
        _ => {
            if let Err(e) = handle_matches(&args_parsed, &ctx).await {
                print_error(&ctx.config, &e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
