//! Simulate command - replay a scroll session over a page layout.
//!
//! The layout is loaded into an in-memory host. Each step scrolls the
//! container content up by a fixed amount, fires the first configured event
//! and waits for the debounced scan. Images are fetched either over HTTP or
//! by an offline fetcher with a fixed latency.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use lazyload::trigger::DEBOUNCE_DELAY;
use lazyload::{
    ElementId, HttpImageFetcher, ImageFetcher, LazyLoad, LazyLoadOptions, Loader, LoaderSnapshot,
    MemoryFetcher, MemoryHost,
};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::error::CliError;
use crate::layout::Layout;

/// Extra wait after the debounce so the scan and its drain have run.
const SETTLE_MARGIN: Duration = Duration::from_millis(20);

/// Poll interval while waiting for the loader to go idle.
const IDLE_POLL: Duration = Duration::from_millis(25);

/// Default offline fetch latency in milliseconds.
pub const DEFAULT_LATENCY_MS: u64 = 100;

/// Default time to wait for outstanding loads, in seconds.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30;

/// Arguments for the simulate command.
pub struct SimulateArgs {
    pub layout: PathBuf,
    pub concurrent: Option<usize>,
    pub on: Option<String>,
    pub speed: Option<f64>,
    pub scroll_step: f64,
    pub steps: u32,
    pub offline: bool,
    pub latency_ms: u64,
    pub idle_timeout_secs: u64,
}

/// What the simulator observed.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Image ids swapped during each step; step 0 is the initial pass.
    pub steps: Vec<Vec<String>>,
    /// Image ids still waiting to be revealed.
    pub pending: Vec<String>,
    /// Final loader counters.
    pub metrics: LoaderSnapshot,
    /// Whether every started load finished before the idle timeout.
    pub drained: bool,
}

impl Report {
    /// Number of images swapped in.
    pub fn loaded(&self) -> usize {
        self.steps.iter().map(Vec::len).sum()
    }
}

/// Scroll plan for one simulation.
#[derive(Debug, Clone, Copy)]
pub struct Plan {
    pub scroll_step: f64,
    pub steps: u32,
    pub idle_timeout: Duration,
}

/// Run the simulate command.
pub fn run(args: SimulateArgs) -> Result<(), CliError> {
    let layout = Layout::load(&args.layout)?;
    let options = LazyLoadOptions {
        on: args.on.clone(),
        concurrent: args.concurrent,
        speed: args.speed,
        ..Default::default()
    };
    // Reject bad options before spinning up anything.
    options.resolve().map_err(lazyload::LazyLoadError::from)?;

    let plan = Plan {
        scroll_step: args.scroll_step,
        steps: args.steps,
        idle_timeout: Duration::from_secs(args.idle_timeout_secs),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    println!(
        "Simulating {} image(s) from {}",
        layout.images.len(),
        args.layout.display()
    );

    let report = if args.offline {
        let fetcher = MemoryFetcher::new(Duration::from_millis(args.latency_ms));
        runtime.block_on(simulate(&layout, &options, fetcher, plan))?
    } else {
        let fetcher = HttpImageFetcher::new()?;
        runtime.block_on(simulate(&layout, &options, fetcher, plan))?
    };

    print_report(&report);
    Ok(())
}

/// Replays `plan` over `layout` with the given fetcher.
pub async fn simulate<F: ImageFetcher>(
    layout: &Layout,
    options: &LazyLoadOptions,
    fetcher: F,
    plan: Plan,
) -> Result<Report, CliError> {
    let host = Arc::new(MemoryHost::new());
    let container = host.create_element(None, layout.container.into());

    let mut ids: HashMap<ElementId, String> = HashMap::new();
    for image in &layout.images {
        let element = host.create_element(Some(container), image.rect.into());
        host.set_attribute(element, "data-original", &image.src);
        ids.insert(element, image.id.clone());
    }

    let lazy = LazyLoad::new(host.clone(), Arc::new(fetcher));
    let session = lazy.attach(container, options)?;
    let event = session
        .config()
        .first_event()
        .unwrap_or(lazyload::config::DEFAULT_EVENTS)
        .to_string();

    let mut steps = Vec::with_capacity(plan.steps as usize + 1);
    let mut seen = 0;

    sleep(DEBOUNCE_DELAY + SETTLE_MARGIN).await;
    steps.push(newly_swapped(&host, &ids, &mut seen));

    for step in 1..=plan.steps {
        if session.is_dormant() {
            debug!(step, "Session dormant, stopping early");
            break;
        }
        host.scroll_content(container, 0.0, -plan.scroll_step);
        let listeners = host.fire(container, &event);
        debug!(step, listeners, event = %event, "Scroll step");

        sleep(DEBOUNCE_DELAY + SETTLE_MARGIN).await;
        steps.push(newly_swapped(&host, &ids, &mut seen));
    }

    let drained = wait_for_idle(lazy.loader(), plan.idle_timeout).await;
    if !drained {
        warn!(timeout_secs = plan.idle_timeout.as_secs(), "Loads still outstanding at timeout");
    }
    if let Some(last) = steps.last_mut() {
        last.extend(newly_swapped(&host, &ids, &mut seen));
    }

    let pending = session
        .candidates()
        .iter()
        .filter_map(|element| ids.get(element).cloned())
        .collect();
    session.detach();

    let metrics = lazy.loader().metrics();
    info!(%metrics, "Simulation finished");

    Ok(Report {
        steps,
        pending,
        metrics,
        drained,
    })
}

/// Image ids swapped since the last call.
fn newly_swapped(host: &MemoryHost, ids: &HashMap<ElementId, String>, seen: &mut usize) -> Vec<String> {
    let swaps = host.swaps();
    let fresh = swaps[*seen..]
        .iter()
        .filter_map(|swap| ids.get(&swap.element).cloned())
        .collect();
    *seen = swaps.len();
    fresh
}

async fn wait_for_idle<F: ImageFetcher>(loader: &Loader<MemoryHost, F>, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while !loader.is_idle() {
        if Instant::now() >= deadline {
            return false;
        }
        sleep(IDLE_POLL).await;
    }
    true
}

fn print_report(report: &Report) {
    for (step, loaded) in report.steps.iter().enumerate() {
        if loaded.is_empty() {
            println!("  step {:>3}: -", step);
        } else {
            println!("  step {:>3}: {}", step, loaded.join(", "));
        }
    }

    println!();
    println!("Loaded:  {}", report.loaded());
    if !report.pending.is_empty() {
        println!("Pending: {}", report.pending.join(", "));
    }
    println!("Metrics: {}", report.metrics);
    if !report.drained {
        println!("Warning: some loads did not finish before the timeout");
    }
}
