#![cfg(unix)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use chunk_forecast::silence::{is_silenced, silenced, SilenceGuard};
use chunk_forecast::{
    Chunk, ChunkedForecastRunner, EvaluationWindow, ForecastError, ForecastModel, Result,
    RunnerConfig, TimeSeriesWindow, TrainedForecastModel,
};
use rstest::rstest;
use std::fs::File;
use std::os::fd::AsRawFd;
use std::panic;
use std::sync::Mutex;

// Descriptors 1 and 2 are shared by every test in this binary
static TEST_LOCK: Mutex<()> = Mutex::new(());

fn serial() -> std::sync::MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Device and inode currently behind a descriptor
fn identity(fd: i32) -> (u64, u64) {
    let mut stat: libc::stat = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::fstat(fd, &mut stat) };
    assert_eq!(rc, 0, "fstat({}) failed", fd);
    (stat.st_dev as u64, stat.st_ino as u64)
}

fn streams() -> [(u64, u64); 2] {
    [identity(libc::STDOUT_FILENO), identity(libc::STDERR_FILENO)]
}

fn null_device() -> (u64, u64) {
    let null = File::open("/dev/null").unwrap();
    identity(null.as_raw_fd())
}

#[test]
fn test_streams_point_at_null_device_while_silenced() {
    let _serial = serial();
    let before = streams();

    let inside = silenced(streams).unwrap();

    assert_eq!(inside, [null_device(), null_device()]);
    assert_eq!(streams(), before);
}

#[test]
fn test_streams_restored_after_error() {
    let _serial = serial();
    let before = streams();

    let outcome: std::result::Result<(), ForecastError> = silenced(|| {
        println!("fitting noise");
        eprintln!("more noise");
        Err(ForecastError::Fitting("did not converge".to_string()))
    })
    .unwrap();

    assert!(outcome.is_err());
    assert_eq!(streams(), before);
    assert!(!is_silenced());
}

#[test]
fn test_streams_restored_after_panic() {
    let _serial = serial();
    let before = streams();

    let caught = panic::catch_unwind(|| {
        let _ = silenced(|| {
            if true {
                panic!("optimizer blew up");
            }
        });
    });

    assert!(caught.is_err());
    assert_eq!(streams(), before);
    assert!(!is_silenced());

    // the lock is usable again afterwards
    assert_eq!(silenced(|| 7).unwrap(), 7);
}

#[test]
fn test_nested_scopes_restore_once() {
    let _serial = serial();
    let before = streams();

    let inner_depth_ok = silenced(|| {
        let nested = silenced(is_silenced).unwrap();
        // the outer redirection is still in place after the inner scope ends
        nested && streams() == [null_device(), null_device()]
    })
    .unwrap();

    assert!(inner_depth_ok);
    assert_eq!(streams(), before);
}

#[test]
fn test_guard_restores_on_drop() {
    let _serial = serial();
    let before = streams();

    let guard = SilenceGuard::acquire().unwrap();
    assert!(is_silenced());
    drop(guard);

    assert!(!is_silenced());
    assert_eq!(streams(), before);
}

#[test]
fn test_concurrent_callers_serialize() {
    let _serial = serial();
    let before = streams();

    let handles: Vec<_> = (0..4)
        .map(|i| std::thread::spawn(move || silenced(move || i * 2).unwrap()))
        .collect();
    let mut values: Vec<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    values.sort_unstable();

    assert_eq!(values, vec![0, 2, 4, 6]);
    assert_eq!(streams(), before);
}

#[derive(Debug)]
struct TrainedLast(f64);

impl TrainedForecastModel for TrainedLast {
    fn predict(&self, future: &[DateTime<Utc>]) -> Result<Vec<f64>> {
        Ok(vec![self.0; future.len()])
    }

    fn name(&self) -> &str {
        "last"
    }
}

/// Prints while fitting, opens its own silencing scope, and refuses windows
/// starting with a negative value
#[derive(Debug)]
struct NoisyLast;

impl ForecastModel for NoisyLast {
    type Trained = TrainedLast;

    fn train(&self, window: &TimeSeriesWindow) -> Result<Self::Trained> {
        println!("fitting {} points", window.len());
        let values = window.values();
        if values[0] < 0.0 {
            eprintln!("solver diverged");
            return Err(ForecastError::Fitting("solver diverged".to_string()));
        }
        silenced(|| TrainedLast(values[values.len() - 1])).map_err(ForecastError::from)
    }

    fn name(&self) -> &str {
        "noisy last"
    }
}

fn chunks(first_values: &[f64]) -> Vec<Chunk> {
    let start = Utc.with_ymd_and_hms(2021, 1, 4, 0, 0, 0).unwrap();
    first_values
        .iter()
        .enumerate()
        .map(|(i, &first)| {
            let training = TimeSeriesWindow::from_parts(
                vec![start, start + Duration::minutes(1)],
                vec![first, 2.0],
            )
            .unwrap();
            let evaluation =
                EvaluationWindow::from_parts(vec![start + Duration::minutes(2)], vec![3.0]).unwrap();
            Chunk::new(format!("K{}", i), training, evaluation).unwrap()
        })
        .collect()
}

#[rstest]
#[case(false)]
#[case(true)]
fn test_streams_restored_after_successful_run(#[case] parallel: bool) {
    let _serial = serial();
    let before = streams();

    let runner =
        ChunkedForecastRunner::new(NoisyLast, RunnerConfig::default().with_parallel(parallel))
            .unwrap();
    let results = runner.run(&chunks(&[1.0, 1.0, 1.0, 1.0])).unwrap();

    assert_eq!(results.len(), 4);
    assert_eq!(streams(), before);
    assert!(!is_silenced());
}

#[rstest]
#[case(false)]
#[case(true)]
fn test_streams_restored_after_failing_run(#[case] parallel: bool) {
    let _serial = serial();
    let before = streams();

    let runner =
        ChunkedForecastRunner::new(NoisyLast, RunnerConfig::default().with_parallel(parallel))
            .unwrap();
    let err = runner.run(&chunks(&[1.0, -1.0, 1.0])).unwrap_err();

    assert_eq!(err.chunk_index(), Some(1));
    assert_eq!(streams(), before);
    assert!(!is_silenced());
}

#[rstest]
#[case(false)]
#[case(true)]
fn test_streams_restored_after_isolated_run(#[case] parallel: bool) {
    let _serial = serial();
    let before = streams();

    let runner =
        ChunkedForecastRunner::new(NoisyLast, RunnerConfig::default().with_parallel(parallel))
            .unwrap();
    let report = runner.run_isolated(&chunks(&[-1.0, 1.0, -1.0])).unwrap();

    assert_eq!(report.failed_indices(), vec![0, 2]);
    assert_eq!(streams(), before);
}
