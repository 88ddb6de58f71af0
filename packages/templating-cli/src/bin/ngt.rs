/**
 * Templating CLI - ngt
 *
 * Compiles a template file and prints its binder tree
 */
use clap::{Arg, ArgAction, Command};
use std::path::Path;
use std::process;

use templating_cli::compile::{compile_template, describe_tree};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let matches = Command::new("ngt")
        .version(templating_cli::version())
        .about("Compiles templates into binder trees")
        .arg(
            Arg::new("template")
                .value_name("TEMPLATE")
                .required(true)
                .help("Path to the template markup"),
        )
        .arg(
            Arg::new("directives")
                .short('d')
                .long("directives")
                .value_name("FILE")
                .help("Directive registration file (JSON)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the binder tree as JSON"),
        )
        .get_matches();

    let template = matches
        .get_one::<String>("template")
        .map(String::as_str)
        .unwrap_or_default();
    let directives = matches.get_one::<String>("directives").map(Path::new);

    let factory = match compile_template(Path::new(template), directives) {
        Ok(factory) => factory,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(1);
        }
    };

    if matches.get_flag("json") {
        match serde_json::to_string_pretty(&factory.describe()) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("Error: {}", err);
                process::exit(1);
            }
        }
    } else {
        print!("{}", describe_tree(&factory));
    }
}
