use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{ error, info, LevelFilter };

use meshload::format::{ FormattedCount, FormattedDuration };
use meshload::load::{ run_load_job, LoadOutcome, LoadReport };
use meshload::logger;
use meshload::settings::Settings;

/// Loads Wavefront OBJ files and reports their contents.
#[derive(Parser, Debug)]
#[command(name = "meshload", version)]
struct Args {
    /// OBJ files to load
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// JSON settings file; command line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short = 'j', long)]
    threads: Option<u32>,

    #[arg(long)]
    log_level: Option<LevelFilter>,

    /// Skip loading material libraries
    #[arg(long)]
    no_materials: bool,

    /// Stop loading remaining files after the first failure
    #[arg(long)]
    fail_fast: bool,

    /// Lines between releasing parser buffers (0 disables)
    #[arg(long)]
    reclaim_interval: Option<usize>,

    /// List every object of each loaded file
    #[arg(short = 'l', long)]
    list: bool,
}

impl Args {
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(threads) = self.threads {
            settings.thread_count = threads;
        }
        if let Some(level) = self.log_level {
            settings.log_level = level;
        }
        if let Some(interval) = self.reclaim_interval {
            settings.reclaim_interval = interval;
        }
        settings.resolve_materials &= !self.no_materials;
        settings.fail_fast |= self.fail_fast;
        settings.list_objects |= self.list;
    }
}

fn print_report(report: &LoadReport, list_objects: bool) {
    for (path, outcome) in report.files.iter() {
        match outcome {
            LoadOutcome::Loaded(model, elapsed) => {
                let stats = &model.stats;
                println!("{}: {} objects, {} vertices, {} faces, {} lines, {} points ({})",
                    path.display(),
                    stats.objects,
                    FormattedCount(stats.vertices),
                    FormattedCount(stats.faces),
                    FormattedCount(stats.lines),
                    FormattedCount(stats.points),
                    FormattedDuration(*elapsed));
                if list_objects {
                    for obj in model.objects.iter() {
                        let material = match (obj.object.material.as_str(), &obj.material) {
                            ("", _) => "-".to_string(),
                            (name, Some(_)) => name.to_string(),
                            (name, None) => format!("{name} (unresolved)"),
                        };
                        println!("  {:<32} {:?} {:>12} vertices  {}",
                            obj.name(),
                            obj.object.kind,
                            FormattedCount(obj.vertex_count()),
                            material);
                    }
                }
            },
            LoadOutcome::Failed(err) => println!("{}: FAILED {}", path.display(), err),
            LoadOutcome::Skipped => println!("{}: skipped", path.display()),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = logger::init(LevelFilter::Info) {
        eprintln!("Unable to initialise logger: {err}");
    }

    let mut settings = match args.config.as_deref() {
        Some(path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                error!("{}: {}", path.display(), err);
                return ExitCode::FAILURE;
            },
        },
        None => Settings::default(),
    };
    args.apply_to(&mut settings);
    log::set_max_level(settings.log_level);

    info!("Loading {} files on {} threads", args.files.len(), settings.thread_count);
    let list_objects = settings.list_objects;
    let report = run_load_job(args.files, Arc::new(settings));

    print_report(&report, list_objects);
    for worker in report.workers.iter() {
        info!("{worker}");
    }
    info!("Finished in {}", FormattedDuration(report.elapsed));

    match report.failure_count() {
        0 => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
