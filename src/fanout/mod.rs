//! Run several independent solvers in parallel.
//!
//! Every run owns its own [`CubePacker`] and writes its result to its own
//! file, named after the run index. Runs share nothing; a run that fails to
//! write its output does not affect the others.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use rayon::prelude::{IntoParallelIterator, ParallelIterator};

use crate::{
    error::Result,
    report::write_result,
    shape::Shape,
    solver::{CubePacker, Outcome, Progress, SolverConfig},
};

mod compression;
pub use compression::{Compression, Writer};

/// Configuration for [`run`].
#[derive(Debug, Clone)]
pub struct FanoutConfig {
    /// Number of independent runs.
    pub runs: usize,

    /// Cube side length.
    pub length: usize,

    /// Directory the run outputs are written to.
    pub output_dir: PathBuf,

    pub compression: Compression,

    /// Run `i` is seeded with `base_seed + i`. `None` seeds every run from
    /// entropy.
    pub base_seed: Option<u64>,

    /// Attempt budget for each run.
    pub max_attempts: Option<u64>,

    /// Progress logging cadence for each run.
    pub report_interval: u64,
}

impl FanoutConfig {
    /// One run per CPU, writing to the current directory.
    pub fn new(length: usize) -> Self {
        Self {
            runs: num_cpus::get(),
            length,
            output_dir: PathBuf::from("."),
            compression: Compression::None,
            base_seed: None,
            max_attempts: None,
            report_interval: crate::solver::DEFAULT_REPORT_INTERVAL,
        }
    }

    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_base_seed(mut self, seed: u64) -> Self {
        self.base_seed = Some(seed);
        self
    }

    pub fn with_max_attempts(mut self, attempts: u64) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// The output path of run `index`.
    pub fn output_path(&self, index: usize) -> PathBuf {
        output_path(&self.output_dir, index, self.compression)
    }

    fn solver_config(&self, index: usize) -> SolverConfig {
        let mut config = SolverConfig::default().with_report_interval(self.report_interval);
        config.seed = self.base_seed.map(|s| s.wrapping_add(index as u64));
        config.max_attempts = self.max_attempts;
        config
    }
}

/// `<dir>/execution_<index>.txt`, with `.gz` appended for gzip.
pub fn output_path(dir: &Path, index: usize, compression: Compression) -> PathBuf {
    dir.join(format!("execution_{index}{}", compression.extension()))
}

/// What happened to one run.
#[derive(Debug)]
pub struct RunReport {
    pub index: usize,
    pub path: PathBuf,
    /// The search outcome, or the error that stopped the run.
    pub outcome: Result<Outcome>,
    pub attempts: u64,
}

/// Execute `config.runs` isolated solver runs on the rayon pool.
///
/// `on_finished` is called from the worker thread as each run completes.
/// The returned reports are ordered by run index.
pub fn run<F>(config: &FanoutConfig, shape: &Shape, on_finished: F) -> Result<Vec<RunReport>>
where
    F: Fn(&RunReport) + Sync,
{
    std::fs::create_dir_all(&config.output_dir)?;

    log::info!(
        "Starting {} runs for a cube of length {} into {}",
        config.runs,
        config.length,
        config.output_dir.display()
    );

    let reports = (0..config.runs)
        .into_par_iter()
        .map(|index| {
            let report = run_one(config, shape, index);
            on_finished(&report);
            report
        })
        .collect();

    Ok(reports)
}

fn run_one(config: &FanoutConfig, shape: &Shape, index: usize) -> RunReport {
    let path = config.output_path(index);

    let observer = move |p: &Progress| {
        if !p.finished {
            log::info!(
                "Run {index}: attempt [{}]: No of placed shapes {}",
                p.attempts,
                p.placed
            );
        }
    };

    let solved = CubePacker::new(config.length).map(|packer| {
        packer
            .with_config(config.solver_config(index))
            .with_observer(observer)
            .solve(shape)
    });

    let result = match solved {
        Ok(result) => result,
        Err(e) => {
            return RunReport {
                index,
                path,
                outcome: Err(e),
                attempts: 0,
            }
        }
    };

    let written = File::create(&path).and_then(|file| {
        let mut writer = Writer::new(config.compression, BufWriter::new(file));
        write_result(&mut writer, &result)?;
        writer.finish()?.into_inner().map_err(|e| e.into_error())?;
        Ok(())
    });

    let outcome = match written {
        Ok(()) => Ok(result.outcome),
        Err(e) => {
            log::warn!("Run {index}: failed to write {}: {e}", path.display());
            Err(e.into())
        }
    };

    RunReport {
        index,
        path,
        outcome,
        attempts: result.stats.attempts,
    }
}

#[cfg(test)]
use std::io::Read;

#[cfg(test)]
use flate2::read::GzDecoder;

#[test]
fn each_run_writes_its_own_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = FanoutConfig::new(2)
        .with_runs(3)
        .with_output_dir(dir.path())
        .with_base_seed(11);

    let finished = std::sync::atomic::AtomicUsize::new(0);
    let reports = run(&config, &Shape::from_size(1, 1, 2).unwrap(), |_| {
        finished.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    })
    .unwrap();

    assert_eq!(finished.into_inner(), 3);
    assert_eq!(reports.len(), 3);

    for (i, report) in reports.iter().enumerate() {
        assert_eq!(report.index, i);
        assert_eq!(report.path, dir.path().join(format!("execution_{i}.txt")));
        assert_eq!(report.outcome.as_ref().unwrap(), &Outcome::Solved);

        let text = std::fs::read_to_string(&report.path).unwrap();
        assert!(text.contains("[4] ---------------- "));
    }
}

#[test]
fn gzip_output_and_infeasible_runs() {
    let dir = tempfile::tempdir().unwrap();
    let config = FanoutConfig::new(5)
        .with_runs(2)
        .with_output_dir(dir.path().join("nested"))
        .with_compression(Compression::Gzip);

    let reports = run(&config, &Shape::from_size(1, 1, 2).unwrap(), |_| {}).unwrap();

    for report in &reports {
        assert_eq!(report.outcome.as_ref().unwrap(), &Outcome::Infeasible);
        assert!(report.path.to_string_lossy().ends_with(".txt.gz"));

        let mut text = String::new();
        GzDecoder::new(File::open(&report.path).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        assert!(text.starts_with("Cube could not be solved!"));
    }
}

#[test]
fn seeds_follow_run_index() {
    let config = FanoutConfig::new(3).with_base_seed(40).with_max_attempts(9);
    assert_eq!(config.solver_config(0).seed, Some(40));
    assert_eq!(config.solver_config(2).seed, Some(42));
    assert_eq!(config.solver_config(2).max_attempts, Some(9));
    assert_eq!(FanoutConfig::new(3).solver_config(1).seed, None);
}

#[test]
fn large_cube_run_completes() {
    let dir = tempfile::tempdir().unwrap();
    let config = FanoutConfig::new(20)
        .with_runs(1)
        .with_output_dir(dir.path())
        .with_base_seed(0);

    let reports = run(&config, &Shape::from_size(1, 1, 1).unwrap(), |_| {}).unwrap();

    assert_eq!(reports[0].outcome.as_ref().unwrap(), &Outcome::Solved);
    assert_eq!(reports[0].attempts, 8000);

    let text = std::fs::read_to_string(&reports[0].path).unwrap();
    assert!(text.contains("[8000] ---------------- "));
}
