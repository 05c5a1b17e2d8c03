use eyre::Context;
use session::utils::absolute_path;
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

/// A `file:line` location where `run` stops
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Breakpoint {
    pub path: PathBuf,
    pub line: usize,
}

impl FromStr for Breakpoint {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path_str, lineno_str) = s
            .rsplit_once(':')
            .ok_or_else(|| eyre::eyre!("breakpoint specification '{s}' has no colon"))?;

        let line: usize = lineno_str.parse().wrap_err("invalid line number")?;
        eyre::ensure!(line > 0, "line numbers start at 1");

        // relative paths are taken from the current working directory
        let cwd = std::env::current_dir().context("getting current working directory")?;
        let path = absolute_path(Path::new(path_str), &cwd);

        Ok(Self { path, line })
    }
}
