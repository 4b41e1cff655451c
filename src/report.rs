//! Rendering and delivery of the ranked result.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::topn::TopNList;

/// Rank that owns the global list.
pub const COORDINATOR_RANK: usize = 0;

/// Final output of a run, produced once by the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub global: TopNList,
    /// Each rank's top-N over its own partition, indexed by rank.
    pub per_worker: Vec<TopNList>,
    pub total_cars: u128,
    pub rejected: u64,
}

/// Which lists end up in the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum View {
    #[default]
    Global,
    PerWorker,
    Both,
}

impl Report {
    /// One `Rank <r>: Traffic Light <id>, Cars: <n>` line per entry.
    pub fn render(&self, view: View) -> String {
        let mut out = String::new();
        if matches!(view, View::PerWorker | View::Both) {
            for (rank, list) in self.per_worker.iter().enumerate() {
                push_lines(&mut out, rank, list);
            }
        }
        if matches!(view, View::Global | View::Both) {
            push_lines(&mut out, COORDINATOR_RANK, &self.global);
        }
        out
    }
}

fn push_lines(out: &mut String, rank: usize, list: &TopNList) {
    for entry in list {
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "Rank {rank}: Traffic Light {}, Cars: {}",
            entry.light_id, entry.total_cars
        );
    }
}

/// Where rendered output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    Stdout,
    File(PathBuf),
}

impl Sink {
    /// `-` selects standard output.
    pub fn from_arg(arg: &Path) -> Self {
        if arg == Path::new("-") {
            Sink::Stdout
        } else {
            Sink::File(arg.to_path_buf())
        }
    }

    pub fn write(&self, rendered: &str) -> Result<(), Error> {
        match self {
            Sink::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(rendered.as_bytes())
                    .and_then(|()| stdout.flush())
                    .map_err(|source| Error::Output {
                        path: PathBuf::from("-"),
                        source,
                    })
            }
            Sink::File(path) => fs::write(path, rendered).map_err(|source| Error::Output {
                path: path.clone(),
                source,
            }),
        }
    }
}
