use std::env;
use std::fs;
use std::io::{self, Write};

use anyhow::Error;
use clap::{values_t, App, AppSettings, Arg};
use env_logger::{fmt, Builder, Target};
use log::{error, info, Level, LevelFilter, Record};

use qbfpre::{Engine, Options, PreprocessResult};

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stderr)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("QBFPRE_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn banner() {
    info!("This is qbfpre {}", env!("CARGO_PKG_VERSION"));
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("qbfpre")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::DisableHelpSubcommand)
        .about("Preprocesses a QBF in prenex conjunctive normal form")
        .arg_from_usage("[INPUT] 'The QDIMACS input file to use (stdin if omitted)'")
        .arg_from_usage("[OUTPUT] -o --output=[FILE] 'Write the simplified formula here (stdout if omitted)'")
        .arg(
            Arg::from_usage("[config-option] -c --set")
                .value_name("OPTION>=<VALUE")
                .help("Set a single option, e.g. '-c elim=false'. See qbfpre::config::Options for the list.")
                .multiple(true)
                .number_of_values(1),
        )
        .arg_from_usage("[ignore-embedded] --ignore-embedded-options 'Ignore 'c --name[=value]' option comments in the input'")
        .arg_from_usage("[qrat-file] --qrat=[FILE] 'Write a QRAT proof of every rewrite to this file'")
        .arg_from_usage("[qrat-msg] --qrat-messages 'Annotate each QRAT line with a human-readable justification'")
        .arg_from_usage("-n --no-output 'Suppress writing the simplified formula'")
        .arg_from_usage("--solve 'Decide the simplified formula via an external QBF solver (not implemented)'")
        .get_matches();

    init_logging();
    banner();

    let mut options = Options::new();

    let file: Box<dyn io::Read> = match matches.value_of("INPUT") {
        Some(path) => {
            info!("reading file '{}'", path);
            Box::new(fs::File::open(path)?)
        }
        None => {
            info!("reading from stdin");
            Box::new(io::stdin())
        }
    };

    let parsed = qbfpre_dimacs::parse(file)?;

    if !matches.is_present("ignore-embedded") {
        for embedded in &parsed.embedded_options {
            apply_option(&mut options, &embedded.name, embedded.value.as_deref());
        }
    }

    for raw in values_t!(matches, "config-option", String).unwrap_or_default() {
        let (name, value) = match raw.find('=') {
            Some(pos) => (&raw[..pos], Some(&raw[pos + 1..])),
            None => (raw.as_str(), None),
        };
        apply_option(&mut options, name, value);
    }

    if matches.is_present("qrat-msg") {
        options.qrat_messages = true;
    }
    if matches.value_of("qrat-file").is_some() {
        options.qrat_proof = true;
    }

    let mut engine = Engine::new(options);

    if let Some(path) = matches.value_of("qrat-file") {
        info!("writing QRAT proof to file '{}'", path);
        engine.write_qrat_proof_to(Box::new(fs::File::create(path)?));
    }

    engine.load(parsed.formula)?;

    let result = engine.preprocess();

    if matches.is_present("solve") {
        engine.solve()?;
    }

    let stats = engine.stats();
    info!(
        "{} rounds, {} units, {} pure literals, {} subsumed, {} eliminated, {} expanded",
        stats.fixpoint_rounds,
        stats.units_propagated,
        stats.pure_literals,
        stats.clauses_subsumed,
        stats.variables_eliminated,
        stats.variables_expanded,
    );

    match result {
        PreprocessResult::False => {
            println!("s cnf 0 0 0");
            println!("0");
            Ok(20)
        }
        PreprocessResult::True => {
            println!("s cnf 1 0 0");
            Ok(10)
        }
        PreprocessResult::Simplified => {
            if !matches.is_present("no-output") {
                let output = engine.output_formula();
                let mut sink: Box<dyn io::Write> = match matches.value_of("OUTPUT") {
                    Some(path) => Box::new(fs::File::create(path)?),
                    None => Box::new(io::stdout()),
                };
                qbfpre_dimacs::write_header(&mut sink, output.matrix.var_count(), output.matrix.len())?;
                qbfpre_dimacs::write_prefix(&mut sink, &output.prefix)?;
                qbfpre_dimacs::write_clauses(&mut sink, output.matrix.iter())?;
            }
            Ok(0)
        }
    }
}

/// Applies a single `name[=value]` option to `options` via a throwaway engine, so the CLI and the
/// engine's embedded-option handling share exactly one parser for option syntax.
fn apply_option(options: &mut Options, name: &str, value: Option<&str>) {
    let mut probe = Engine::new(options.clone());
    match probe.set_option(name, value) {
        Ok(()) => *options = probe.options().clone(),
        Err(err) => error!("{}", err),
    }
}
