//! Command-line interface for blockscript
//! This binary tokenizes and parses single statements with the bundled grammar, for grammar
//! authors checking what a line of learner input turns into.
//!
//! Usage:
//!   blocks tokens `<text>`                                  - Print the token sequence
//!   blocks parse `<text>` [--strategy `<s>`] [--format `<f>`] - Print blueprints or parse trees
//!   blocks rules                                          - Print the compiled rule table
//!
//! Set `RUST_LOG=blockscript=debug` to see grammar compilation and parser statistics.

use blockscript::blocks::config::{EngineConfig, Loader};
use blockscript::blocks::grammar::Alternative;
use blockscript::blocks::parsing::Strategy;
use blockscript::blocks::pipeline::{Engine, GrammarSources};
use clap::{value_parser, Arg, ArgMatches, Command};
use config::ConfigError;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config_arg = Arg::new("config")
        .long("config")
        .short('c')
        .help("TOML file layered over the built-in configuration");

    let matches = Command::new("blocks")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Turn one line of pseudo-code into a block blueprint")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("tokens")
                .about("Print the tokens of a statement")
                .arg(Arg::new("text").help("Statement text").required(true).index(1)),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a statement and print its blueprints")
                .arg(Arg::new("text").help("Statement text").required(true).index(1))
                .arg(
                    Arg::new("strategy")
                        .long("strategy")
                        .short('s')
                        .help("Parsing strategy: 'chart' or 'descent'")
                        .value_parser(value_parser!(Strategy)),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format: 'json', 'yaml' or 'tree'")
                        .value_parser(["json", "yaml", "tree"])
                        .default_value("json"),
                )
                .arg(
                    Arg::new("max-trees")
                        .long("max-trees")
                        .help("Maximum number of parses to print")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("forest-cap")
                        .long("forest-cap")
                        .help("Alternatives kept per chart forest node")
                        .value_parser(value_parser!(usize)),
                )
                .arg(config_arg.clone()),
        )
        .subcommand(
            Command::new("rules")
                .about("Print the compiled rule table")
                .arg(config_arg),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("tokens", tokens_matches)) => handle_tokens_command(tokens_matches),
        Some(("parse", parse_matches)) => handle_parse_command(parse_matches),
        Some(("rules", rules_matches)) => handle_rules_command(rules_matches),
        _ => unreachable!(),
    }
}

fn load_config(matches: &ArgMatches) -> EngineConfig {
    layered_config(matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(2);
    })
}

/// Built-in defaults, then `--config`, then the individual flags.
fn layered_config(matches: &ArgMatches) -> Result<EngineConfig, ConfigError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Ok(Some(strategy)) = matches.try_get_one::<Strategy>("strategy") {
        loader = loader.set_override("parser.strategy", strategy.to_string())?;
    }
    if let Ok(Some(max_trees)) = matches.try_get_one::<usize>("max-trees") {
        loader = loader.set_override("parser.max_trees", *max_trees as i64)?;
    }
    if let Ok(Some(cap)) = matches.try_get_one::<usize>("forest-cap") {
        loader = loader.set_override("parser.forest_cap", *cap as i64)?;
    }
    loader.build()
}

fn build_engine(matches: &ArgMatches) -> Engine {
    let config = load_config(matches);
    Engine::from_sources(&GrammarSources::bundled(), &config).unwrap_or_else(|e| {
        eprintln!("Grammar error: {}", e);
        std::process::exit(2);
    })
}

/// Handle the tokens command
fn handle_tokens_command(matches: &ArgMatches) {
    let text = matches.get_one::<String>("text").unwrap();
    let engine = Engine::standard().unwrap_or_else(|e| {
        eprintln!("Grammar error: {}", e);
        std::process::exit(2);
    });
    for token in engine.tokenize(text) {
        println!("{}", token);
    }
}

/// Handle the parse command
fn handle_parse_command(matches: &ArgMatches) {
    let text = matches.get_one::<String>("text").unwrap();
    let format = matches.get_one::<String>("format").unwrap();
    let engine = build_engine(matches);

    let trees = engine.parse_trees(text).unwrap_or_else(|e| {
        eprintln!("Parse error: {}", e);
        std::process::exit(1);
    });
    if trees.is_empty() {
        eprintln!("No parse for {:?}", text);
        std::process::exit(1);
    }

    if format == "tree" {
        for tree in &trees {
            print!("{}", tree.to_outline());
        }
        return;
    }

    let blueprints = trees
        .iter()
        .map(|tree| engine.evaluate(tree))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Evaluation error: {}", e);
            std::process::exit(1);
        });

    let formatted = match format.as_str() {
        "yaml" => serde_yaml::to_string(&blueprints).map_err(|e| e.to_string()),
        _ => serde_json::to_string_pretty(&blueprints).map_err(|e| e.to_string()),
    };
    match formatted {
        Ok(output) => println!("{}", output.trim_end()),
        Err(e) => {
            eprintln!("Error formatting blueprints: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle the rules command
fn handle_rules_command(matches: &ArgMatches) {
    let engine = build_engine(matches);
    let grammar = engine.grammar();
    let rules = grammar.rules();

    println!("start: {}", grammar.start());
    println!("locales: {}", engine.config().grammar.locales.join(", "));
    println!();
    for symbol in rules.symbols() {
        let alternatives: Vec<String> = rules
            .alternatives(symbol)
            .iter()
            .map(Alternative::to_string)
            .collect();
        if alternatives.is_empty() {
            println!("{}", symbol);
        } else {
            println!("{} -> {}", symbol, alternatives.join(" | "));
        }
    }
    println!();
    println!("max unit chain depth: {}", grammar.max_unit_chain_depth());
}
