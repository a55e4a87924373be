//! Shared helpers for the integration suite.
//!
//! Provides a deterministic tracer rig (sequential ids, manual clock,
//! capture sink) and a miniature flow interpreter that drives the tracer
//! through nested step definitions the way a flow engine would: one span
//! per component entry/exit, route passes for nested bodies, forked
//! carriers for fan-out branches, and unwind-to-the-flow-root on failure.

#![allow(dead_code)] // each integration binary uses a subset of these helpers

use flowtrace::capture::{CaptureSink, SpanSink};
use flowtrace::time::{ManualClock, TimeSource};
use flowtrace::tracer::{FlowTracer, SpanCarrier};
use flowtrace::types::{
    ComponentIdentity, ComponentLocation, StepOutcome, join_outcomes,
};
use flowtrace::util::SeqIds;
use std::sync::Arc;

/// Nanoseconds the manual clock advances per interpreted step.
pub const STEP_NANOS: u64 = 1_000;

/// Installs a tracing subscriber honoring `RUST_LOG`. Safe to call from
/// every test; only the first call installs.
pub fn init_test_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A tracer wired for deterministic assertions.
pub struct TestRig {
    pub tracer: FlowTracer,
    pub sink: Arc<CaptureSink>,
    pub clock: Arc<ManualClock>,
}

/// Builds a rig with sequential span ids and a manual clock.
pub fn rig() -> TestRig {
    init_test_logging();
    let sink = Arc::new(CaptureSink::new());
    let clock = Arc::new(ManualClock::new());
    let tracer = FlowTracer::builder()
        .sink(Arc::clone(&sink) as Arc<dyn SpanSink>)
        .id_source(Arc::new(SeqIds::new()))
        .time_source(Arc::clone(&clock) as Arc<dyn TimeSource>)
        .artifact_id("test-app")
        .build();
    TestRig {
        tracer,
        sink,
        clock,
    }
}

/// One step of a miniature flow definition.
#[derive(Debug, Clone)]
pub enum Step {
    /// A leaf processor that succeeds.
    Op {
        namespace: &'static str,
        name: &'static str,
    },
    /// A leaf processor that fails.
    Failing {
        namespace: &'static str,
        name: &'static str,
        error_type: &'static str,
        message: &'static str,
    },
    /// A scope running its body as a single route pass.
    Scope {
        namespace: &'static str,
        name: &'static str,
        body: Vec<Step>,
    },
    /// A router running each branch as its own route pass over a forked
    /// carrier.
    FanOut {
        namespace: &'static str,
        name: &'static str,
        branches: Vec<Vec<Step>>,
    },
}

pub fn op(namespace: &'static str, name: &'static str) -> Step {
    Step::Op { namespace, name }
}

pub fn failing(
    namespace: &'static str,
    name: &'static str,
    error_type: &'static str,
    message: &'static str,
) -> Step {
    Step::Failing {
        namespace,
        name,
        error_type,
        message,
    }
}

pub fn scope(namespace: &'static str, name: &'static str, body: Vec<Step>) -> Step {
    Step::Scope {
        namespace,
        name,
        body,
    }
}

pub fn fan_out(namespace: &'static str, name: &'static str, branches: Vec<Vec<Step>>) -> Step {
    Step::FanOut {
        namespace,
        name,
        branches,
    }
}

/// The flow-level error handler wired into a run.
#[derive(Debug, Clone, Copy)]
pub enum Handler {
    /// Runs the handler, then the flow still fails.
    Propagate,
    /// Runs the handler, then the flow recovers.
    Continue,
}

impl Handler {
    fn identity(self) -> ComponentIdentity {
        match self {
            Self::Propagate => ComponentIdentity::error_handler("core", "on-error-propagate"),
            Self::Continue => ComponentIdentity::error_handler("core", "on-error-continue"),
        }
    }
}

/// Runs `steps` as the body of a flow with no error handler.
pub fn run_flow(rig: &TestRig, flow_name: &str, steps: &[Step]) -> StepOutcome {
    run_flow_with_handler(rig, flow_name, steps, None)
}

/// Runs `steps` as the body of a flow, dispatching a failure to `handler`
/// if one is wired.
///
/// A step failure unwinds through the interpreter's call stack, closing
/// every intervening scope and route span with the failure, until the flow
/// root is the innermost open span again. The handler span therefore
/// parents at the flow root, the declared error boundary.
pub fn run_flow_with_handler(
    rig: &TestRig,
    flow_name: &str,
    steps: &[Step],
    handler: Option<Handler>,
) -> StepOutcome {
    let mut carrier = rig.tracer.begin_execution();
    let flow_location = ComponentLocation::flow(flow_name);
    let root = rig
        .tracer
        .start_span(&mut carrier, &ComponentIdentity::flow_root("core"), &flow_location);

    let mut outcome = run_steps(rig, &mut carrier, &flow_location, steps);
    if let Some(handler) = handler {
        if !outcome.is_success() {
            let handler_location = flow_location.clone().processor(steps.len());
            let span = rig
                .tracer
                .start_span(&mut carrier, &handler.identity(), &handler_location);
            rig.clock.advance(STEP_NANOS);
            rig.tracer
                .end_span(&mut carrier, span, StepOutcome::Success)
                .unwrap();
            if matches!(handler, Handler::Continue) {
                outcome = StepOutcome::Success;
            }
        }
    }

    rig.tracer
        .end_span(&mut carrier, root, outcome.clone())
        .unwrap();
    assert!(carrier.is_empty(), "flow must close every span it opened");
    outcome
}

/// Runs a step list sequentially, short-circuiting on the first failure.
pub fn run_steps(
    rig: &TestRig,
    carrier: &mut SpanCarrier,
    base: &ComponentLocation,
    steps: &[Step],
) -> StepOutcome {
    for (index, step) in steps.iter().enumerate() {
        let location = base.clone().processor(index);
        let outcome = run_step(rig, carrier, &location, step);
        if !outcome.is_success() {
            return outcome;
        }
    }
    StepOutcome::Success
}

fn run_step(
    rig: &TestRig,
    carrier: &mut SpanCarrier,
    location: &ComponentLocation,
    step: &Step,
) -> StepOutcome {
    match step {
        Step::Op { namespace, name } => {
            let span = rig.tracer.start_span(
                carrier,
                &ComponentIdentity::operation(*namespace, *name),
                location,
            );
            rig.clock.advance(STEP_NANOS);
            rig.tracer
                .end_span(carrier, span, StepOutcome::Success)
                .unwrap();
            StepOutcome::Success
        }
        Step::Failing {
            namespace,
            name,
            error_type,
            message,
        } => {
            let span = rig.tracer.start_span(
                carrier,
                &ComponentIdentity::operation(*namespace, *name),
                location,
            );
            rig.clock.advance(STEP_NANOS);
            let outcome = StepOutcome::failure(*error_type, *message);
            rig.tracer
                .end_span(carrier, span, outcome.clone())
                .unwrap();
            outcome
        }
        Step::Scope {
            namespace,
            name,
            body,
        } => {
            let identity = ComponentIdentity::scope(*namespace, *name);
            let span = rig.tracer.start_span(carrier, &identity, location);
            let route = rig
                .tracer
                .start_route_span(carrier, &identity, location, 0)
                .unwrap();
            let outcome = run_steps(rig, carrier, &location.clone().route(0), body);
            rig.tracer
                .end_span(carrier, route, outcome.clone())
                .unwrap();
            rig.tracer
                .end_span(carrier, span, outcome.clone())
                .unwrap();
            outcome
        }
        Step::FanOut {
            namespace,
            name,
            branches,
        } => {
            let identity = ComponentIdentity::router(*namespace, *name);
            let span = rig.tracer.start_span(carrier, &identity, location);
            // Every branch runs to completion on its own fork; one branch
            // failing never stops a sibling.
            let forks = carrier.fork_n(branches.len());
            let mut outcomes = Vec::with_capacity(branches.len());
            for (index, (branch, mut fork)) in branches.iter().zip(forks).enumerate() {
                let route = rig
                    .tracer
                    .start_route_span(&mut fork, &identity, location, index)
                    .unwrap();
                let branch_outcome =
                    run_steps(rig, &mut fork, &location.clone().route(index), branch);
                rig.tracer
                    .end_span(&mut fork, route, branch_outcome.clone())
                    .unwrap();
                outcomes.push(branch_outcome);
            }
            let joined = join_outcomes(outcomes);
            rig.tracer
                .end_span(carrier, span, joined.clone())
                .unwrap();
            joined
        }
    }
}
