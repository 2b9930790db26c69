//! End-to-end uniform run example.
//!
//! Demonstrates: build profile → install a logger at the configured
//! verbosity → run → inspect the outcome and the files written.

use log::{Log, Metadata, Record};
use stepwise_bench::reference_profile;
use stepwise_engine::RunContext;

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() {
    println!("=== Stepwise Uniform Run Example ===\n");

    let outdir = std::env::temp_dir().join("stepwise_uniform_run");
    if outdir.exists() {
        std::fs::remove_dir_all(&outdir).unwrap();
    }

    let mut controller = reference_profile(&outdir).unwrap();
    // At least per-frame progress, whatever the profile asks for.
    let filter = RunContext::level_filter(controller.config().verbosity.max(1));
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(filter);

    println!("{controller}\n");

    let outcome = controller.run().unwrap();
    println!(
        "frames={}, last_frame={}, solver_calls={}, total={}μs (step={}μs, write={}μs)",
        outcome.frames,
        outcome.last_frame,
        outcome.metrics.solver_calls,
        outcome.metrics.total_us,
        outcome.metrics.step_us,
        outcome.metrics.write_us,
    );
    if let Some(status) = outcome.status {
        println!(
            "last status: steps={}, cfl_max={:.3}, dt=[{}, {}]",
            status.num_steps, status.cfl_max, status.dt_min, status.dt_max
        );
    }

    let mut files: Vec<_> = std::fs::read_dir(&outdir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    println!("\n{} files in {}:", files.len(), outdir.display());
    for f in files {
        println!("  {f}");
    }
}
