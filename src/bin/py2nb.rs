// py2nb
// Copyright (C) 2019  py2nb developers
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <http://www.gnu.org/licenses/>.

#[macro_use]
extern crate log;

use std::path::Path;
use std::process::exit;

use clap::{crate_version, App, Arg, ArgMatches};

use py2nb::exec::{self, ExecOutcome, Executor};
use py2nb::{convert_script, notebook, Grammar};

fn main() {
    let matches = App::new("py2nb")
        .version(crate_version!())
        .about("Convert a python script to a jupyter notebook")
        .arg(
            Arg::with_name("script")
                .help("Name of the script (.py) to convert to a jupyter notebook (.ipynb)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("no-validate")
                .long("no-validate")
                .help("Skip notebook validation"),
        )
        .arg(
            Arg::with_name("execute")
                .long("execute")
                .help("Execute the notebook after conversion"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("FILE")
                .help("Output notebook filename (default: the script name with its extension swapped)"),
        )
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase the verbosity of messages sent to stderr"),
        )
        .get_matches();

    // Warnings (in particular degraded execution outcomes) are visible by
    // default; `-v` raises the level to info and beyond.
    stderrlog::new()
        .modules(vec![module_path!().to_string(), "py2nb".to_string()])
        .verbosity(1 + matches.occurrences_of("verbosity") as usize)
        .color(if atty::is(atty::Stream::Stderr) {
            stderrlog::ColorChoice::Auto
        } else {
            stderrlog::ColorChoice::Never
        })
        .init()
        .unwrap();

    exit(run(&matches));
}

fn run(matches: &ArgMatches) -> i32 {
    let script = Path::new(matches.value_of("script").unwrap());
    if !script.exists() {
        eprintln!("Error: File {} not found", script.display());
        return 1;
    }

    let grammar = Grammar::default();
    let validate = !matches.is_present("no-validate");
    let output = matches.value_of("output").map(Path::new);

    let notebook_path = match convert_script(script, output, &grammar, validate) {
        Ok(path) => path,
        Err(error) => {
            eprintln!("Error during conversion: {}", error);
            return 1;
        }
    };
    println!(
        "✓ Successfully converted {} to {}",
        script.display(),
        notebook_path.display()
    );

    if matches.is_present("execute") {
        execute(&exec::Nbconvert::default(), &notebook_path);
    }

    // Parse the freshly written notebook back; a failure here is fatal, but
    // the file is left on disk for inspection.
    if validate {
        if let Err(error) = notebook::read_notebook(&notebook_path) {
            eprintln!(
                "Notebook validation failed for {}: {}",
                notebook_path.display(),
                error
            );
            return 1;
        }
        info!("Notebook validation passed.");
    }

    0
}

/// Ask the collaborator to run the notebook.  Execution is best-effort: any
/// failure is reported and the unexecuted notebook is kept as-is.
fn execute(executor: &dyn Executor, notebook_path: &Path) {
    match executor.execute(notebook_path, exec::DEFAULT_TIMEOUT) {
        ExecOutcome::Executed => {
            println!(
                "✓ Successfully executed notebook: {}",
                notebook_path.display()
            );
        }
        ExecOutcome::Failed(report) => {
            warn!("Notebook execution failed: {}", report.trim());
            warn!("Original notebook available: {}", notebook_path.display());
        }
        ExecOutcome::TimedOut(timeout) => {
            warn!(
                "Notebook execution timed out after {} seconds",
                timeout.as_secs()
            );
            warn!("Original notebook available: {}", notebook_path.display());
        }
        ExecOutcome::Unavailable(error) => {
            warn!(
                "jupyter nbconvert could not be launched ({}); install it with `pip install nbconvert`",
                error
            );
            warn!("Original notebook available: {}", notebook_path.display());
        }
    }
}
