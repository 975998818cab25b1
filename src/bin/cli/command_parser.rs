use clap::{value_parser, Arg, Command};

fn year_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .help(help)
        .required(true)
        .allow_negative_numbers(true)
        .value_parser(value_parser!(i64))
}

fn words_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).help(help).required(true).num_args(1..)
}

pub fn arg_parser() -> Command {
    Command::new("libris")
        .about("Personal digital library")
        .multicall(true)
        .subcommand_required(true)
        .subcommand(
            Command::new("search")
                .about("Search a title and add the best match to the catalog")
                .arg(words_arg("title", "Title to search for")),
        )
        .subcommand(
            Command::new("list")
                .about("List what the catalog holds")
                .subcommand_required(true)
                .subcommand(Command::new("books").about("Every stored book"))
                .subcommand(Command::new("authors").about("Every credited author"))
                .subcommand(
                    Command::new("alive")
                        .about("Authors still alive in a given year")
                        .arg(year_arg("year", "Year the authors were alive in")),
                )
                .subcommand(Command::new("languages").about("Languages of stored books"))
                .subcommand(
                    Command::new("language")
                        .about("Books available in a language")
                        .arg(Arg::new("code").help("Language code, e.g. en").required(true)),
                ),
        )
        .subcommand(Command::new("stats").about("Download statistics"))
        .subcommand(
            Command::new("top")
                .about("Most downloaded books")
                .arg(
                    Arg::new("count")
                        .help("How many books to show")
                        .value_parser(value_parser!(u32)),
                ),
        )
        .subcommand(
            Command::new("author")
                .about("Find an author by the start of their name")
                .arg(words_arg("name", "Start of the author's name")),
        )
        .subcommand(
            Command::new("range")
                .about("Authors born and deceased within a range of years")
                .arg(year_arg("from", "First year of the range"))
                .arg(year_arg("to", "Last year of the range")),
        )
        .subcommand(
            Command::new("backup")
                .about("Write the whole catalog to a JSON file")
                .arg(Arg::new("file").required(true)),
        )
        .subcommand(
            Command::new("restore")
                .about("Add the books of a JSON backup to the catalog")
                .arg(Arg::new("file").required(true)),
        )
        .subcommand(
            Command::new("export")
                .about("Export the catalog as CSV, to stdout unless a file is given")
                .arg(Arg::new("file")),
        )
        .subcommand(Command::new("config").about("Print the default configuration"))
        .subcommand(Command::new("menu").about("Interactive numbered menu"))
        .subcommand(Command::new("exit").about("Leave the read eval print loop"))
}

pub fn arg_parser_cli() -> Command {
    arg_parser()
        .subcommand(Command::new("repl").about("Launch a read eval print loop"))
        .subcommand(
            Command::new("serve")
                .about("Accept searches over HTTP")
                .arg(
                    Arg::new("port")
                        .default_value("3000")
                        .value_parser(value_parser!(u16)),
                ),
        )
}

pub fn generate_completions() -> Vec<String> {
    let cmd = arg_parser();
    fn add_command(parent_fn_name: &str, cmd: &Command, subcmds: &mut Vec<String>) {
        let fn_name = format!(
            "{parent_fn_name} {cmd_name}",
            parent_fn_name = parent_fn_name,
            cmd_name = cmd.get_name()
        )
        .trim()
        .to_string();
        subcmds.push(fn_name.clone());
        for subcmd in cmd.get_subcommands() {
            add_command(&fn_name, subcmd, subcmds);
        }
    }
    let mut subcmds = vec![];
    for subcmd in cmd.get_subcommands() {
        add_command("", subcmd, &mut subcmds);
    }
    subcmds.sort();
    subcmds
}
