//! ---
//! osr_section: "06-command-line"
//! osr_subsection: "binary"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Command line front end for regression result analysis."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use std::io::{self, BufRead, Write};

use osr_compat::VersionPrompt;

/// Asks on stderr and reads the answer from stdin, leaving stdout to reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl VersionPrompt for StdinPrompt {
    fn ask_energyplus(&mut self, openstudio: &str, default: &str) -> io::Result<String> {
        ask(
            &mut io::stderr().lock(),
            &mut io::stdin().lock(),
            openstudio,
            default,
        )
    }
}

fn ask(
    out: &mut impl Write,
    input: &mut impl BufRead,
    openstudio: &str,
    default: &str,
) -> io::Result<String> {
    write!(
        out,
        "OpenStudio {openstudio} is not in the compatibility matrix. EnergyPlus version [{default}]: "
    )?;
    out.flush()?;
    read_answer(input)
}

fn read_answer(input: &mut impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input stream closed",
        ));
    }
    Ok(line.trim().to_owned())
}
