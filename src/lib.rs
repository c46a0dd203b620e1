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

//! Convert python scripts to jupyter notebooks and back.
//!
//! Scripts use a small comment-based markup to encode cell boundaries and
//! cell types:
//!
//! * `#|` (or `# |`) starts a markdown cell line;
//! * `#!` (or `# !`) starts a shell-command cell line;
//! * `#-` (or `# -`) splits two adjacent code cells.
//!
//! Everything else is plain code.  The conversion is lossless in both
//! directions provided no plain code line happens to begin with one of the
//! markup prefixes.

#[macro_use]
extern crate log;

pub mod convert;
pub mod exec;
pub mod grammar;
pub mod notebook;

pub use crate::convert::{convert_notebook, convert_script};
pub use crate::grammar::Grammar;
pub use crate::notebook::Notebook;
