// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod helper;
mod host_hooks;

use std::io::{BufRead, Write as _};
use std::path::PathBuf;

use clap::{Parser as ClapParser, Subcommand};
use helper::{exit_with_parse_errors, initialize_global_object, value_to_display_string};
use host_hooks::CliHostHooks;
use kestrel_vm::ecmascript::execution::agent::Options;
use kestrel_vm::ecmascript::execution::{initialize_host_defined_realm, Agent};
use kestrel_vm::ecmascript::scripts_and_modules::module::{
    evaluate_module, link_module, load_requested_modules, parse_module,
};
use kestrel_vm::ecmascript::scripts_and_modules::script::{parse_script, script_evaluation};
use kestrel_vm::ecmascript::types::{Object, String as JsString};

/// A specification-faithful ECMAScript interpreter
#[derive(Debug, ClapParser)]
#[command(name = "kestrel")]
#[command(about = "A specification-faithful ECMAScript interpreter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parses a file and reports any syntax errors
    Parse {
        /// The path of the file to parse
        path: String,
    },

    /// Evaluates a file
    Eval {
        /// Treat the file as a module
        #[arg(short, long)]
        module: bool,

        /// Print compiled instructions and the executed instruction stream
        #[arg(short, long)]
        verbose: bool,

        /// The files to evaluate
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Runs a line-based read-eval-print loop
    Repl {},
}

fn main() {
    let args = Cli::parse();
    match args.command {
        Command::Parse { path } => {
            let agent = &mut Agent::new(Options::default(), &CliHostHooks);
            initialize_host_defined_realm(
                agent,
                None::<fn(&mut Agent, _) -> Object>,
                None::<fn(&mut Agent, _) -> Object>,
                Some(initialize_global_object),
            );
            let realm = agent.current_realm_id();
            let source = std::fs::read_to_string(&path).unwrap_or_else(|error| {
                eprintln!("Could not read {}: {}", path, error);
                std::process::exit(1);
            });
            let source_text = JsString::from_string(agent, source);
            if let Err(errors) = parse_script(agent, source_text, realm, None) {
                exit_with_parse_errors(errors, &path);
            }
            println!("{}: parsed successfully", path);
        }
        Command::Eval {
            module,
            verbose,
            paths,
        } => {
            let agent = &mut Agent::new(
                Options {
                    print_internals: verbose,
                    ..Default::default()
                },
                &CliHostHooks,
            );
            initialize_host_defined_realm(
                agent,
                None::<fn(&mut Agent, _) -> Object>,
                None::<fn(&mut Agent, _) -> Object>,
                Some(initialize_global_object),
            );
            let realm = agent.current_realm_id();
            for path in paths {
                let source = std::fs::read_to_string(&path).unwrap_or_else(|error| {
                    eprintln!("Could not read {}: {}", path, error);
                    std::process::exit(1);
                });
                let source_text = JsString::from_string(agent, source);
                if module {
                    let specifier = canonical_specifier(&path);
                    let specifier = JsString::from_string(agent, specifier);
                    let module =
                        match parse_module(agent, source_text, realm, specifier) {
                            Ok(module) => module,
                            Err(errors) => exit_with_parse_errors(errors, &path),
                        };
                    load_requested_modules(agent, module);
                    agent.run_jobs();
                    if let Err(error) = link_module(agent, module) {
                        let message = error.to_string(agent);
                        eprintln!("Uncaught {}", message.to_string_lossy(agent));
                        std::process::exit(1);
                    }
                    evaluate_module(agent, module);
                    agent.run_jobs();
                } else {
                    let script = match parse_script(agent, source_text, realm, None) {
                        Ok(script) => script,
                        Err(errors) => exit_with_parse_errors(errors, &path),
                    };
                    match script_evaluation(agent, script) {
                        Ok(_) => agent.run_jobs(),
                        Err(error) => {
                            let message = value_to_display_string(agent, error.value());
                            eprintln!("Uncaught {}", message);
                            std::process::exit(1);
                        }
                    }
                }
            }
        }
        Command::Repl {} => {
            let agent = &mut Agent::new(Options::default(), &CliHostHooks);
            initialize_host_defined_realm(
                agent,
                None::<fn(&mut Agent, _) -> Object>,
                None::<fn(&mut Agent, _) -> Object>,
                Some(initialize_global_object),
            );
            let realm = agent.current_realm_id();
            let stdin = std::io::stdin();
            loop {
                print!("> ");
                std::io::stdout().flush().expect("could not flush stdout");
                let mut line = String::new();
                match stdin.lock().read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(_) => break,
                }
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "exit" {
                    break;
                }
                let source_text = JsString::from_string(agent, line);
                let script = match parse_script(agent, source_text, realm, None) {
                    Ok(script) => script,
                    Err(errors) => {
                        for error in errors {
                            eprintln!("{}", error);
                        }
                        continue;
                    }
                };
                match script_evaluation(agent, script) {
                    Ok(value) => {
                        let rendered = value_to_display_string(agent, value);
                        println!("{}", rendered);
                    }
                    Err(error) => {
                        let rendered = value_to_display_string(agent, error.value());
                        eprintln!("Uncaught {}", rendered);
                    }
                }
                agent.run_jobs();
            }
        }
    }
}

fn canonical_specifier(path: &str) -> String {
    PathBuf::from(path)
        .canonicalize()
        .map(|path| path.to_string_lossy().into_owned())
        .unwrap_or_else(|_| path.to_string())
}
