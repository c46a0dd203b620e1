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

use std::path::Path;
use std::process::exit;

use clap::{crate_version, App, Arg, ArgMatches};

use py2nb::{convert_notebook, Grammar};

fn main() {
    let matches = App::new("nb2py")
        .version(crate_version!())
        .about("Convert a jupyter notebook to a python script")
        .arg(
            Arg::with_name("notebook")
                .help("Name of the notebook (.ipynb) to convert to a script (.py)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("FILE")
                .help("Output script filename (default: the notebook name with its extension swapped)"),
        )
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase the verbosity of messages sent to stderr"),
        )
        .get_matches();

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
    let notebook = Path::new(matches.value_of("notebook").unwrap());
    if !notebook.exists() {
        eprintln!("Error: File {} not found", notebook.display());
        return 1;
    }

    let grammar = Grammar::default();
    let output = matches.value_of("output").map(Path::new);

    match convert_notebook(notebook, output, &grammar) {
        Ok(script) => {
            println!(
                "✓ Successfully converted {} to {}",
                notebook.display(),
                script.display()
            );
            0
        }
        Err(error) => {
            eprintln!("Error during conversion: {}", error);
            1
        }
    }
}
