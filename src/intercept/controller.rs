//! InterceptionController: one capture -> fetch -> rewrite -> resume cycle
//! per user submit
//!
//! Phases: `Idle -> Capturing -> FetchingDefaults -> Rewriting -> Resuming -> Idle`.
//! The defaults fetch is the only suspension point. Cycles do not share an
//! in-flight request; a second trigger during a fetch starts its own cycle.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use super::guard::ReentrancyGuard;
use super::host::{QuickConnectHost, Trigger};
use super::resume::{resume_with, ResumeStrategy};
use crate::config::{QuickConnectConfig, RewritePolicy};
use crate::defaults::{DefaultsDocument, DefaultsProvider, DefaultsSource};
use crate::rewrite::RewriteEngine;

/// Cycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Phase {
    #[default]
    Idle,
    Capturing,
    FetchingDefaults,
    Rewriting,
    Resuming,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Capturing => write!(f, "capturing"),
            Phase::FetchingDefaults => write!(f, "fetching-defaults"),
            Phase::Rewriting => write!(f, "rewriting"),
            Phase::Resuming => write!(f, "resuming"),
        }
    }
}

/// What the event listener must do with the captured event
pub enum Capture {
    /// Leave the event alone (guard held, or nothing to do)
    PassThrough,
    /// The input was rewritten synchronously; let the event continue
    RewrittenInPlace { changed: bool },
    /// Stop propagation and default now, then drive the future to completion
    Deferred(LocalBoxFuture<'static, CycleReport>),
}

impl Capture {
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Capture::PassThrough)
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Capture::Deferred(_))
    }
}

impl fmt::Debug for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capture::PassThrough => write!(f, "PassThrough"),
            Capture::RewrittenInPlace { changed } => {
                f.debug_struct("RewrittenInPlace").field("changed", changed).finish()
            }
            Capture::Deferred(_) => write!(f, "Deferred(..)"),
        }
    }
}

/// Outcome of one deferred cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: u64,
    /// The input value was replaced
    pub rewritten: bool,
    /// Label of the strategy that resumed the action, `None` if it was dropped
    pub resumed_by: Option<String>,
}

/// Diagnostic counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptionStats {
    /// Events ignored because the re-entrancy guard was held
    pub pass_throughs: u64,
    /// Synchronous baseline rewrites
    pub in_place: u64,
    pub cycles_started: u64,
    pub cycles_completed: u64,
    /// Input values actually changed
    pub rewrites: u64,
    /// Cycles where no resume strategy was available
    pub resume_failures: u64,
}

/// Drives interception cycles against a host
pub struct InterceptionController<H, S> {
    host: H,
    provider: DefaultsProvider<S>,
    engine: RewriteEngine,
    resumers: Vec<Box<dyn ResumeStrategy>>,
    guard: ReentrancyGuard,
    log_rewrites: bool,
    phase: Cell<Phase>,
    next_cycle: Cell<u64>,
    stats: Cell<InterceptionStats>,
}

impl<H, S> InterceptionController<H, S>
where
    H: QuickConnectHost + 'static,
    S: DefaultsSource + 'static,
{
    pub fn new(
        config: &QuickConnectConfig,
        host: H,
        source: S,
        resumers: Vec<Box<dyn ResumeStrategy>>,
        guard: ReentrancyGuard,
    ) -> Self {
        Self {
            host,
            provider: DefaultsProvider::new(source, config.cache_policy),
            engine: RewriteEngine::from_config(config),
            resumers,
            guard,
            log_rewrites: config.log_rewrites,
            phase: Cell::new(Phase::Idle),
            next_cycle: Cell::new(1),
            stats: Cell::new(InterceptionStats::default()),
        }
    }

    /// Entry point for every qualifying event.
    ///
    /// Must be called synchronously from the capture-phase listener: a
    /// `Deferred` result means the native action has to be suppressed
    /// before the listener returns.
    pub fn capture(self: &Rc<Self>, trigger: Trigger) -> Capture {
        if self.guard.is_reemitting() {
            self.bump(|s| s.pass_throughs += 1);
            return Capture::PassThrough;
        }

        match (self.engine.policy(), trigger) {
            (RewritePolicy::Baseline, _) => {
                let changed = self.rewrite_input(&DefaultsDocument::default());
                self.bump(|s| s.in_place += 1);
                Capture::RewrittenInPlace { changed }
            }
            // Only the synchronous baseline variant reacts to blur
            (RewritePolicy::ServerDefaults, Trigger::Blur) => Capture::PassThrough,
            (RewritePolicy::ServerDefaults, Trigger::Click | Trigger::Submit) => {
                let cycle = self.next_cycle.get();
                self.next_cycle.set(cycle + 1);
                self.enter(cycle, Phase::Capturing);
                self.bump(|s| s.cycles_started += 1);
                Capture::Deferred(Box::pin(Rc::clone(self).run_cycle(cycle)))
            }
        }
    }

    /// Fetch, rewrite, resume. Each step starts only after the previous one finished.
    pub async fn run_cycle(self: Rc<Self>, cycle: u64) -> CycleReport {
        self.enter(cycle, Phase::FetchingDefaults);
        let defaults = self.provider.load().await;

        self.enter(cycle, Phase::Rewriting);
        let rewritten = self.rewrite_input(&defaults);

        self.enter(cycle, Phase::Resuming);
        let resumed_by = resume_with(&self.resumers, &self.guard);
        if resumed_by.is_none() {
            self.bump(|s| s.resume_failures += 1);
            qc_warn!("cycle {}: no way to resume Quick Connect, submit dropped", cycle);
        }

        self.enter(cycle, Phase::Idle);
        self.bump(|s| s.cycles_completed += 1);
        CycleReport {
            cycle,
            rewritten,
            resumed_by: resumed_by.map(str::to_string),
        }
    }

    /// Rewrite the input value; writes back and notifies only on change
    fn rewrite_input(&self, defaults: &DefaultsDocument) -> bool {
        let Some(before) = self.host.read_input() else {
            return false;
        };
        if before.trim().is_empty() {
            return false;
        }

        let after = self.engine.rewrite(&before, defaults);
        if after == before {
            return false;
        }

        if self.log_rewrites {
            qc_log!("Enhanced QuickConnect URL: {}", after);
        }
        self.host.write_input(&after);
        self.host.notify_input_changed();
        self.bump(|s| s.rewrites += 1);
        true
    }

    fn enter(&self, cycle: u64, phase: Phase) {
        self.phase.set(phase);
        if cfg!(debug_assertions) {
            qc_log!("cycle {}: {}", cycle, phase);
        }
    }

    fn bump(&self, update: impl FnOnce(&mut InterceptionStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }

    /// Phase of the most recently advanced cycle
    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn stats(&self) -> InterceptionStats {
        self.stats.get()
    }

    pub fn guard(&self) -> &ReentrancyGuard {
        &self.guard
    }

    pub fn provider(&self) -> &DefaultsProvider<S> {
        &self.provider
    }

    pub fn engine(&self) -> &RewriteEngine {
        &self.engine
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}
