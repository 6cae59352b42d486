use std::cell::RefCell;
use std::rc::Rc;

use deimos::prelude::*;

/// Shared log that recording passes append their name to when executed.
pub type ExecutionLog = Rc<RefCell<Vec<String>>>;

pub fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

/// Creates a headless backing store ready for automated tests
pub fn make_resources() -> PipelineResources<HeadlessBackend> {
    init_logger();
    PipelineResources::new(HeadlessBackend::new())
}

/// Creates a headless backing store with a backend that rejects extents above `max_extent`
pub fn make_resources_with_limit(max_extent: u32) -> PipelineResources<HeadlessBackend> {
    init_logger();
    PipelineResources::new(HeadlessBackend::with_max_extent(max_extent))
}

pub fn make_log() -> ExecutionLog {
    Rc::new(RefCell::new(vec![]))
}

/// A pass that records its name in the log every time it executes
pub fn record_pass<'cb>(name: &str, log: &ExecutionLog) -> CallbackPass<'cb, HeadlessBackend> {
    usage_pass(name, log, vec![], vec![])
}

/// A recording pass that also declares reads and writes during setup
pub fn usage_pass<'cb>(
    name: &str,
    log: &ExecutionLog,
    reads: Vec<AnyResource>,
    writes: Vec<AnyResource>,
) -> CallbackPass<'cb, HeadlessBackend> {
    let label = name.to_owned();
    let log = log.clone();
    PassBuilder::<HeadlessBackend>::new(name)
        .setup_fn(move |graph, _| {
            for resource in &reads {
                graph.reads(resource)?;
            }
            for resource in &writes {
                graph.writes(resource)?;
            }
            Ok(())
        })
        .execute_fn(move |_, _| {
            log.borrow_mut().push(label.clone());
            Ok(())
        })
        .build()
}

pub fn logged(log: &ExecutionLog) -> Vec<String> {
    log.borrow().clone()
}
