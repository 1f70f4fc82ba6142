use std::fs::File;
use std::io::BufReader;
use std::path::{ Path, PathBuf };
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{ Duration, Instant };

use log::{ debug, error, info };

use cancellation::{ CancellationToken, CancellationTokenSource };
use flume::{ Receiver, RecvTimeoutError, Sender, TrySendError };
use meshload_obj::{ build_model, load_material_libraries, Model, ObjError, ObjParser };

use crate::format::FormattedDuration;
use crate::settings::Settings;

type WorkerId = u32;

type BoxError = Box<dyn std::error::Error + 'static>;

// Interval between progress reports while files are still loading
const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

// A message from the master thread to a worker
#[derive(Clone)]
pub struct LoadWork(pub usize, pub PathBuf);

// A message from a worker thread to the master thread
pub enum LoadThreadMessage {
    Ready,
    Loaded(WorkerId, usize, Box<Model>, Duration),
    Failed(WorkerId, usize, ObjError),
    Cancelled(usize),
    Terminated,
}

/// Outcome of loading a single file.
pub enum LoadOutcome {
    Loaded(Box<Model>, Duration),
    Failed(ObjError),
    Skipped,
}

pub struct LoadReport {
    pub files: Vec<(PathBuf, LoadOutcome)>,
    pub workers: Vec<WorkerStats>,
    pub elapsed: Duration,
}

impl LoadReport {
    pub fn failure_count(&self) -> usize {
        self.files.iter()
            .filter(|(_, outcome)| !matches!(outcome, LoadOutcome::Loaded(..)))
            .count()
    }
}

#[derive(Clone, Debug)]
pub struct WorkerStats {
    pub id: WorkerId,
    pub total_time: Duration,
    pub total_files_loaded: u32,
}

impl std::fmt::Display for WorkerStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Thread {}: {} files loaded in {}",
            self.id,
            self.total_files_loaded,
            FormattedDuration(self.total_time))
    }
}

/// Streams one OBJ file through the parser, checking for cancellation between lines.
/// Returns `None` if cancelled.
pub fn load_file(path: &Path, settings: &Settings, cancellation_token: &CancellationToken) -> Result<Option<Model>, ObjError> {
    if !path.exists() {
        return Err(ObjError::General(format!("expected obj file at path {}", path.display())));
    }
    let mut reader = BufReader::new(File::open(path)?);
    let mut buffer = Vec::new();
    let mut parser = ObjParser::with_options(settings.parse_options());
    while parser.parse_next(&mut reader, &mut buffer)? {
        if cancellation_token.is_canceled() {
            debug!("Cancelled {} at line {}", path.display(), parser.line_number());
            return Ok(None);
        }
    }
    let document = parser.finish();

    let libraries = if settings.resolve_materials {
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        load_material_libraries(&document, base_dir)?
    } else {
        Vec::new()
    };
    build_model(&document, libraries).map(Some)
}

fn start_load_thread(
    id: WorkerId,
    settings: &Settings,
    cancellation_token: &CancellationToken,
    work_receiver: &Receiver<LoadWork>,
    result_sender: &Sender<LoadThreadMessage>
) -> Result<(), BoxError> {
    use LoadThreadMessage::*;

    result_sender.send(Ready)?;

    // Receive messages
    for LoadWork(index, path) in work_receiver.iter() {
        if cancellation_token.is_canceled() {
            result_sender.send(Cancelled(index))?;
            continue;
        }
        let time = Instant::now();
        let message = match load_file(&path, settings, cancellation_token) {
            Ok(Some(model)) => Loaded(id, index, Box::new(model), time.elapsed()),
            Ok(None) => Cancelled(index),
            Err(err) => Failed(id, index, err),
        };
        result_sender.send(message)?;
    }

    Ok(())
}

pub struct LoadThread {
    pub id: WorkerId,
    pub handle: JoinHandle<()>,
    pub stats: WorkerStats,
}

pub struct LoadWorkerHandle {
    pub cts: CancellationTokenSource,
    pub work_sender: Sender<LoadWork>,
    pub result_receiver: Receiver<LoadThreadMessage>,
    pub thread_handles: Vec<LoadThread>,
}

pub fn start_background_load_threads(settings: Arc<Settings>) -> LoadWorkerHandle {
    let thread_count = settings.thread_count.max(1);
    let cts = CancellationTokenSource::new();
    let (work_sender, work_receiver) = flume::bounded(thread_count as usize);
    let (result_sender, result_receiver) = flume::unbounded();

    let thread_handles = (0..thread_count)
        .map(|id| {
            let settings = settings.clone();
            let cancellation_token = cts.token().clone();
            let work_receiver = work_receiver.clone();
            let result_sender = result_sender.clone();
            let work = move || {
                if let Err(err) = start_load_thread(id, &settings, &cancellation_token, &work_receiver, &result_sender) {
                    info!("Thread {id} terminated due to error: {err}");
                }
                // Notify master thread that we've terminated.
                // NOTE: There may be nobody listening...
                result_sender.send(LoadThreadMessage::Terminated).ok();
            };
            let handle = std::thread::Builder::new()
                .name(format!("Load Thread {id}"))
                .spawn(work)
                .expect("failed to spawn load thread");

            LoadThread {
                id,
                handle,
                stats: WorkerStats { id, total_time: Duration::ZERO, total_files_loaded: 0 },
            }
        })
        .collect::<Vec<_>>();

    LoadWorkerHandle {
        cts,
        work_sender,
        result_receiver,
        thread_handles,
    }
}

/// Loads every file on a pool of worker threads.
///
/// With `fail_fast` set, the first failure cancels files still queued or in
/// progress; they are reported as skipped.
pub fn run_load_job(files: Vec<PathBuf>, settings: Arc<Settings>) -> LoadReport {
    use LoadThreadMessage::*;

    let start_time = Instant::now();
    let fail_fast = settings.fail_fast;
    let mut handle = start_background_load_threads(settings);
    let mut outcomes = files.iter().map(|_| None).collect::<Vec<Option<LoadOutcome>>>();
    let mut next_file_index = 0;
    let mut completed_count = 0;
    let mut last_progress = Instant::now();

    while completed_count < files.len() {
        // Refill the work queue
        while next_file_index < files.len() && !handle.cts.token().is_canceled() {
            let work = LoadWork(next_file_index, files[next_file_index].clone());
            match handle.work_sender.try_send(work) {
                Ok(()) => next_file_index += 1,
                // Queue full, try again later
                Err(TrySendError::Full(_)) => break,
                Err(TrySendError::Disconnected(_)) => {
                    error!("Load threads stopped unexpectedly");
                    handle.cts.cancel();
                    break;
                },
            }
        }

        // Nothing more will be queued; account for it now
        if handle.cts.token().is_canceled() {
            while next_file_index < files.len() {
                outcomes[next_file_index] = Some(LoadOutcome::Skipped);
                completed_count += 1;
                next_file_index += 1;
            }
        }

        // Poll for completed work
        match handle.result_receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(Ready) => {},
            Ok(Loaded(id, index, model, elapsed)) => {
                info!("Loaded {} in {}", files[index].display(), FormattedDuration(elapsed));
                let stats = &mut handle.thread_handles[id as usize].stats;
                stats.total_time += elapsed;
                stats.total_files_loaded += 1;
                outcomes[index] = Some(LoadOutcome::Loaded(model, elapsed));
                completed_count += 1;
            },
            Ok(Failed(_, index, err)) => {
                error!("Failed to load {}: {}", files[index].display(), err);
                if fail_fast {
                    handle.cts.cancel();
                }
                outcomes[index] = Some(LoadOutcome::Failed(err));
                completed_count += 1;
            },
            Ok(Cancelled(index)) => {
                outcomes[index] = Some(LoadOutcome::Skipped);
                completed_count += 1;
            },
            Ok(Terminated) => {},
            Err(RecvTimeoutError::Timeout) => {},
            Err(RecvTimeoutError::Disconnected) => {
                error!("All load threads terminated");
                break;
            },
        }

        if last_progress.elapsed() >= PROGRESS_INTERVAL {
            info!("{completed_count} of {} files complete", files.len());
            last_progress = Instant::now();
        }
    }

    // Closing the queue lets the workers drain and exit
    let LoadWorkerHandle { work_sender, thread_handles, .. } = handle;
    drop(work_sender);
    let workers = thread_handles.into_iter()
        .map(|thread| {
            if thread.handle.join().is_err() {
                error!("Load thread {} panicked", thread.id);
            }
            thread.stats
        })
        .collect();

    let files = files.into_iter()
        .zip(outcomes)
        .map(|(path, outcome)| (path, outcome.unwrap_or(LoadOutcome::Skipped)))
        .collect();

    LoadReport { files, workers, elapsed: start_time.elapsed() }
}
