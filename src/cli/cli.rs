use std::{io::Write, path::PathBuf, time::Duration};

use clap::{Args, Parser, ValueEnum};
use cubepack::{
    fanout::{self, FanoutConfig},
    orientation::OrientationSet,
    report::{write_orientations, write_result},
    shape::Shape,
    solver::{CubePacker, Outcome, SolveResult, SolverConfig, DEFAULT_REPORT_INTERVAL},
};
use indicatif::{ProgressBar, ProgressStyle};

fn finish_bar(bar: &ProgressBar, duration: Duration, result: &SolveResult) {
    let time = duration.as_micros();
    let secs = time / 1_000_000;
    let micros = time % 1_000_000;
    let attempts = result.stats.attempts;

    let msg = match result.outcome {
        Outcome::Solved => format!(
            "Done! Placed {} shapes after {attempts} attempts in {secs}.{micros:06} s",
            result.placements().len()
        ),
        Outcome::Infeasible => "Shape size does not divide the cube volume".to_string(),
        Outcome::Exhausted => {
            format!("No packing exists. Gave up after {attempts} attempts in {secs}.{micros:06} s")
        }
        Outcome::BudgetExceeded => {
            format!("Attempt budget of {attempts} used up in {secs}.{micros:06} s")
        }
    };

    bar.finish_with_message(msg);
}

fn unknown_bar() -> ProgressBar {
    let template = "[{elapsed_precise}] [{spinner:10.cyan/blue}] {pos} {msg}";

    let style = ProgressStyle::with_template(template)
        .unwrap()
        .tick_strings(&[
            ">---------",
            "=>--------",
            "<=>-------",
            "-<=>------",
            "--<=>-----",
            "---<=>----",
            "----<=>---",
            "-----<=>--",
            "------<=>-",
            "-------<=>",
            "--------<=",
            "---------<",
            "--------<=",
            "-------<=>",
            "------<=>-",
            "-----<=>--",
            "---<=>----",
            "--<=>-----",
            "-<=>------",
            "<=>-------",
            "=>--------",
        ]);

    let bar = ProgressBar::new(100).with_style(style);

    bar.enable_steady_tick(Duration::from_millis(66));

    bar
}

pub fn make_bar(len: u64) -> indicatif::ProgressBar {
    let bar = ProgressBar::new(len);

    let pos_width = format!("{len}").len();

    let template =
        format!("[{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos:>{pos_width}}}/{{len}} {{msg}} remaining: [{{eta_precise}}]");

    bar.set_style(
        ProgressStyle::with_template(&template)
            .unwrap()
            .progress_chars("#>-"),
    );
    bar
}

#[derive(Clone, Parser)]
pub enum Opts {
    /// Pack a cube with copies of a shape and print the placements
    Solve(SolveOpts),
    /// Run several independent solvers in parallel, one output file each
    Fanout(FanoutOpts),
    /// List the distinct orientations of a shape
    Orientations(ShapeArgs),
}

#[derive(Clone, Args)]
pub struct ShapeArgs {
    /// A built-in shape: bar, tee, ell or tripod.
    #[clap(long, default_value = "tee")]
    pub preset: String,

    /// Explicit shape points as `x,y,z;x,y,z;...`. Overrides `--preset`.
    #[clap(long, conflicts_with = "size")]
    pub points: Option<String>,

    /// A solid box shape with these extents. Overrides `--preset`.
    #[clap(long, num_args = 3, value_names = ["X", "Y", "Z"])]
    pub size: Option<Vec<usize>>,
}

impl ShapeArgs {
    fn shape(&self) -> cubepack::Result<Shape> {
        if let Some(points) = &self.points {
            return points.parse();
        }

        match self.size.as_deref() {
            Some(&[x, y, z]) => Shape::from_size(x, y, z),
            _ => Shape::preset(&self.preset),
        }
    }
}

#[derive(Clone, Args)]
pub struct SearchArgs {
    /// Seed for the orientation shuffle. Random if not given.
    #[clap(long, short)]
    pub seed: Option<u64>,

    /// Stop searching after this many attempts.
    #[clap(long, short = 'a')]
    pub max_attempts: Option<u64>,

    /// Report progress every this many attempts.
    #[clap(long, default_value_t = DEFAULT_REPORT_INTERVAL)]
    pub report_interval: u64,
}

#[derive(Clone, Args)]
pub struct SolveOpts {
    /// The side length of the cube to fill.
    pub length: usize,

    #[clap(flatten)]
    pub shape: ShapeArgs,

    #[clap(flatten)]
    pub search: SearchArgs,

    /// Log progress instead of showing a progress bar.
    #[clap(long, short)]
    pub quiet: bool,
}

#[derive(Clone, Args)]
pub struct FanoutOpts {
    /// The side length of the cube to fill.
    pub length: usize,

    /// Number of runs. Defaults to the number of CPUs.
    #[clap(long, short = 'n')]
    pub runs: Option<usize>,

    /// Directory for the `execution_<i>.txt` files.
    #[clap(long, short, default_value = ".")]
    pub output_dir: PathBuf,

    /// Compress the output files
    #[clap(long, short = 'z', value_enum, default_value = "none")]
    pub compression: Compression,

    #[clap(flatten)]
    pub shape: ShapeArgs,

    #[clap(flatten)]
    pub search: SearchArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Compression {
    None,
    Gzip,
}

impl From<Compression> for fanout::Compression {
    fn from(value: Compression) -> Self {
        match value {
            Compression::None => fanout::Compression::None,
            Compression::Gzip => fanout::Compression::Gzip,
        }
    }
}

fn exit_with(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

fn shape_or_exit(args: &ShapeArgs) -> Shape {
    match args.shape() {
        Ok(shape) => shape,
        Err(e) => exit_with(e),
    }
}

pub fn solve(opts: &SolveOpts) {
    let shape = shape_or_exit(&opts.shape);

    let mut config = SolverConfig::default().with_report_interval(opts.search.report_interval);
    config.seed = opts.search.seed;
    config.max_attempts = opts.search.max_attempts;

    let packer = match CubePacker::new(opts.length) {
        Ok(p) => p.with_config(config),
        Err(e) => exit_with(e),
    };

    let start = std::time::Instant::now();

    let result = if opts.quiet {
        packer.with_observer(cubepack::solver::LogObserver).solve(&shape)
    } else {
        let bar = unknown_bar();
        bar.println(format!(
            "Packing a cube of length {} with a shape of {} cubes",
            opts.length,
            shape.size()
        ));

        let result = packer.with_observer(bar.clone()).solve(&shape);
        finish_bar(&bar, start.elapsed(), &result);
        result
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = write_result(&mut out, &result).and_then(|_| out.flush()) {
        exit_with(e);
    }
}

pub fn fanout(opts: &FanoutOpts) {
    let shape = shape_or_exit(&opts.shape);

    let mut config = FanoutConfig::new(opts.length)
        .with_output_dir(&opts.output_dir)
        .with_compression(opts.compression.into());
    config.runs = opts.runs.unwrap_or(config.runs);
    config.base_seed = opts.search.seed;
    config.max_attempts = opts.search.max_attempts;
    config.report_interval = opts.search.report_interval;

    let bar = make_bar(config.runs as u64);
    bar.set_message("runs finished");

    let reports = fanout::run(&config, &shape, |report| {
        match &report.outcome {
            Ok(outcome) => bar.println(format!(
                "Run {}: {outcome:?} after {} attempts, written to {}",
                report.index,
                report.attempts,
                report.path.display()
            )),
            Err(e) => bar.println(format!("Run {} failed: {e}", report.index)),
        }
        bar.inc(1);
    });

    let reports = match reports {
        Ok(r) => r,
        Err(e) => {
            bar.abandon();
            exit_with(e);
        }
    };

    bar.finish();

    let solved = reports
        .iter()
        .filter(|r| matches!(r.outcome, Ok(Outcome::Solved)))
        .count();
    println!("{solved} of {} runs found a packing.", reports.len());
}

fn orientations(args: &ShapeArgs) {
    let shape = shape_or_exit(args);
    let orientations = OrientationSet::generate(&shape);

    println!("{} distinct orientations", orientations.len());
    if let Err(e) = write_orientations(std::io::stdout().lock(), &orientations) {
        exit_with(e);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();

    match opts {
        Opts::Solve(s) => solve(&s),
        Opts::Fanout(f) => fanout(&f),
        Opts::Orientations(a) => orientations(&a),
    }
}
