use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use std::io::{self, Write};

/// Print the completion script for `shell` to stdout
pub fn execute(shell: Shell, cmd: &mut Command) -> Result<()> {
    write_to(shell, cmd, &mut io::stdout().lock())
}

pub fn write_to(shell: Shell, cmd: &mut Command, out: &mut dyn Write) -> Result<()> {
    let bin_name = cmd.get_bin_name().unwrap_or(cmd.get_name()).to_string();
    generate(shell, cmd, bin_name, out);
    out.flush()?;
    Ok(())
}
