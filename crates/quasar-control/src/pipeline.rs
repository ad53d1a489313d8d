// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The generic pipeline runner.

use crate::binding::SettingsMailbox;
use crate::error::PipelineError;
use crate::ordering::resolve_stage_order;
use quasar_core::service_registry::StageSource;
use quasar_core::{PipelineContext, PipelineKind, Stage, StageId, StagePhase};
use std::sync::{Arc, Mutex};

/// A pipeline shared between the thread that drives it and its settings observers.
pub type SharedPipeline<C> = Arc<Mutex<Pipeline<C>>>;

/// Lifecycle state of a [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Built, never started.
    Created,
    /// Started; `execute` may be called.
    Started,
    /// Shut down. The pipeline can be started again.
    Shutdown,
}

/// Runs an ordered set of stages over a shared context.
///
/// Stages are pulled from the [`StageSource`] and ordered when the pipeline
/// starts. The pipeline owns its context between `start` and `shutdown`.
pub struct Pipeline<C: PipelineContext> {
    source: Arc<dyn StageSource<C>>,
    stages: Vec<Box<dyn Stage<C>>>,
    context: Option<C>,
    state: PipelineState,
    mailbox: SettingsMailbox<C::Settings>,
}

impl<C: PipelineContext> Pipeline<C> {
    /// Creates a pipeline pulling its stages from `source`.
    pub fn new(source: Arc<dyn StageSource<C>>) -> Self {
        Self {
            source,
            stages: Vec::new(),
            context: None,
            state: PipelineState::Created,
            mailbox: SettingsMailbox::new(),
        }
    }

    /// Wraps the pipeline for sharing with other threads.
    pub fn into_shared(self) -> SharedPipeline<C> {
        Arc::new(Mutex::new(self))
    }

    /// The kind of pipeline, derived from its context type.
    pub fn kind(&self) -> PipelineKind {
        C::KIND
    }

    /// The current lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Returns `true` between a successful `start` and `shutdown`.
    pub fn is_started(&self) -> bool {
        self.state == PipelineState::Started
    }

    /// Ids of the running stages, in execution order.
    pub fn stage_order(&self) -> Vec<StageId> {
        self.stages.iter().map(|stage| stage.id()).collect()
    }

    /// The context, while the pipeline is started.
    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    /// Mutable access to the context, while the pipeline is started.
    pub fn context_mut(&mut self) -> Option<&mut C> {
        self.context.as_mut()
    }

    /// The mailbox holding settings delivered while the pipeline was busy.
    pub fn settings_mailbox(&self) -> SettingsMailbox<C::Settings> {
        self.mailbox.clone()
    }

    /// Resolves and orders the stages, then starts them in order.
    ///
    /// If a stage fails to start, the stages started before it are shut down
    /// in reverse order and the pipeline stays stopped.
    pub fn start(&mut self, mut context: C) -> Result<(), PipelineError> {
        if self.is_started() {
            return Err(PipelineError::AlreadyStarted { pipeline: C::KIND });
        }

        let mut stages = resolve_stage_order(self.source.resolve_stages())?;
        log::info!(
            "Starting {} pipeline with {} stage(s): [{}]",
            C::KIND,
            stages.len(),
            stages
                .iter()
                .map(|stage| stage.id().name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        for index in 0..stages.len() {
            if let Err(source) = stages[index].on_start(&mut context) {
                let failed = stages[index].id();
                log::error!("Stage '{failed}' failed to start: {source}");
                for started in stages[..index].iter_mut().rev() {
                    if let Err(e) = started.on_shutdown(&mut context) {
                        log::warn!("Stage '{}' failed to shut down during rollback: {e}", started.id());
                    }
                }
                return Err(PipelineError::Stage {
                    pipeline: C::KIND,
                    stage: failed,
                    phase: StagePhase::Start,
                    source,
                });
            }
        }

        self.stages = stages;
        self.context = Some(context);
        self.state = PipelineState::Started;
        Ok(())
    }

    /// Runs one tick: every stage executes once, in order.
    ///
    /// Settings parked in the mailbox are applied before the first stage.
    /// The tick stops at the first failing stage.
    pub fn execute(&mut self) -> Result<(), PipelineError> {
        if !self.is_started() {
            return Err(PipelineError::NotStarted { pipeline: C::KIND });
        }
        let Some(context) = self.context.as_mut() else {
            return Err(PipelineError::NotStarted { pipeline: C::KIND });
        };

        if let Some(settings) = self.mailbox.take() {
            log::debug!("Applying deferred settings to the {} pipeline", C::KIND);
            push_settings(&mut self.stages, context, settings);
        }

        for stage in &mut self.stages {
            stage.on_execute(context).map_err(|source| PipelineError::Stage {
                pipeline: C::KIND,
                stage: stage.id(),
                phase: StagePhase::Execute,
                source,
            })?;
        }
        Ok(())
    }

    /// Shuts the stages down in reverse order and returns the context.
    ///
    /// The pipeline is stopped whatever the outcome. A failing stage aborts
    /// the call; the stages ordered before it are not shut down and the
    /// context is dropped.
    pub fn shutdown(&mut self) -> Result<C, PipelineError> {
        if !self.is_started() {
            return Err(PipelineError::NotStarted { pipeline: C::KIND });
        }
        self.state = PipelineState::Shutdown;
        let mut stages = std::mem::take(&mut self.stages);
        let Some(mut context) = self.context.take() else {
            return Err(PipelineError::NotStarted { pipeline: C::KIND });
        };

        for stage in stages.iter_mut().rev() {
            stage.on_shutdown(&mut context).map_err(|source| PipelineError::Stage {
                pipeline: C::KIND,
                stage: stage.id(),
                phase: StagePhase::Shutdown,
                source,
            })?;
        }
        log::info!("{} pipeline shut down", C::KIND);
        Ok(context)
    }

    /// Stores `settings` in the context and notifies every stage.
    ///
    /// Ignored while the pipeline is stopped; the next context is built from
    /// the current settings anyway.
    pub fn apply_settings(&mut self, settings: C::Settings) {
        match self.context.as_mut() {
            Some(context) => push_settings(&mut self.stages, context, settings),
            None => log::debug!("{} pipeline is stopped, settings change ignored", C::KIND),
        }
    }
}

fn push_settings<C: PipelineContext>(stages: &mut [Box<dyn Stage<C>>], context: &mut C, settings: C::Settings) {
    context.set_settings(settings);
    let settings = context.settings();
    for stage in stages.iter_mut() {
        stage.on_settings_changed(settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quasar_core::StageError;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct Journal {
        entries: Vec<String>,
        settings: u32,
    }

    impl PipelineContext for Journal {
        type Settings = u32;
        const KIND: PipelineKind = PipelineKind::Update;
        fn settings(&self) -> &u32 {
            &self.settings
        }
        fn set_settings(&mut self, settings: u32) {
            self.settings = settings;
        }
    }

    struct Recorder {
        id: StageId,
        after: &'static [StageId],
        fail_start: bool,
        fail_execute: bool,
        seen_settings: Arc<StdMutex<Vec<u32>>>,
    }

    impl Recorder {
        fn new(id: StageId) -> Self {
            Self {
                id,
                after: &[],
                fail_start: false,
                fail_execute: false,
                seen_settings: Arc::default(),
            }
        }
    }

    impl Stage<Journal> for Recorder {
        fn id(&self) -> StageId {
            self.id
        }
        fn execute_after(&self) -> &'static [StageId] {
            self.after
        }
        fn on_start(&mut self, ctx: &mut Journal) -> Result<(), StageError> {
            if self.fail_start {
                return Err(StageError::MissingResource("device"));
            }
            ctx.entries.push(format!("start {}", self.id));
            Ok(())
        }
        fn on_execute(&mut self, ctx: &mut Journal) -> Result<(), StageError> {
            if self.fail_execute {
                return Err(StageError::execution("boom"));
            }
            ctx.entries.push(format!("execute {}", self.id));
            Ok(())
        }
        fn on_shutdown(&mut self, ctx: &mut Journal) -> Result<(), StageError> {
            ctx.entries.push(format!("shutdown {}", self.id));
            Ok(())
        }
        fn on_settings_changed(&mut self, settings: &u32) {
            self.seen_settings.lock().unwrap().push(*settings);
        }
    }

    fn boxed(stage: Recorder) -> Box<dyn Stage<Journal>> {
        Box::new(stage)
    }

    const A: StageId = StageId::new("a");
    const B: StageId = StageId::new("b");
    const C: StageId = StageId::new("c");

    fn pipeline(build: fn() -> Vec<Box<dyn Stage<Journal>>>) -> Pipeline<Journal> {
        Pipeline::new(Arc::new(build))
    }

    fn abc() -> Vec<Box<dyn Stage<Journal>>> {
        let mut c = Recorder::new(C);
        c.after = &[B];
        let mut b = Recorder::new(B);
        b.after = &[A];
        vec![boxed(c), boxed(b), boxed(Recorder::new(A))]
    }

    #[test]
    fn test_lifecycle_runs_in_order_and_reverse() {
        let mut pipeline = pipeline(abc);
        pipeline.start(Journal::default()).unwrap();
        assert_eq!(pipeline.stage_order(), vec![A, B, C]);
        pipeline.execute().unwrap();
        let journal = pipeline.shutdown().unwrap();
        assert_eq!(
            journal.entries,
            vec![
                "start a",
                "start b",
                "start c",
                "execute a",
                "execute b",
                "execute c",
                "shutdown c",
                "shutdown b",
                "shutdown a",
            ]
        );
        assert_eq!(pipeline.state(), PipelineState::Shutdown);
    }

    #[test]
    fn test_execute_before_start_is_rejected() {
        let mut pipeline = pipeline(abc);
        assert!(matches!(pipeline.execute(), Err(PipelineError::NotStarted { .. })));
        assert!(matches!(pipeline.shutdown(), Err(PipelineError::NotStarted { .. })));
    }

    #[test]
    fn test_double_start_is_rejected() {
        let mut pipeline = pipeline(abc);
        pipeline.start(Journal::default()).unwrap();
        assert!(matches!(
            pipeline.start(Journal::default()),
            Err(PipelineError::AlreadyStarted { .. })
        ));
    }

    #[test]
    fn test_failed_start_rolls_back_started_stages() {
        fn stages() -> Vec<Box<dyn Stage<Journal>>> {
            let mut b = Recorder::new(B);
            b.fail_start = true;
            vec![boxed(Recorder::new(A)), boxed(b), boxed(Recorder::new(C))]
        }
        let mut pipeline = pipeline(stages);
        let err = pipeline.start(Journal::default()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Stage { stage, phase: StagePhase::Start, .. } if stage == B
        ));
        assert!(!pipeline.is_started());
        assert!(pipeline.context().is_none());
    }

    #[test]
    fn test_execute_stops_at_first_failure() {
        fn stages() -> Vec<Box<dyn Stage<Journal>>> {
            let mut b = Recorder::new(B);
            b.fail_execute = true;
            vec![boxed(Recorder::new(A)), boxed(b), boxed(Recorder::new(C))]
        }
        let mut pipeline = pipeline(stages);
        pipeline.start(Journal::default()).unwrap();
        let err = pipeline.execute().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Stage { stage, phase: StagePhase::Execute, .. } if stage == B
        ));
        let entries = &pipeline.context().unwrap().entries;
        assert!(entries.contains(&"execute a".to_string()));
        assert!(!entries.contains(&"execute c".to_string()));
    }

    #[test]
    fn test_pipeline_restarts_after_shutdown() {
        let mut pipeline = pipeline(abc);
        pipeline.start(Journal::default()).unwrap();
        pipeline.shutdown().unwrap();
        pipeline.start(Journal::default()).unwrap();
        assert_eq!(pipeline.stage_order(), vec![A, B, C]);
    }

    #[test]
    fn test_apply_settings_reaches_context_and_stages() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let stage_seen = Arc::clone(&seen);
        let source = move || {
            let mut stage = Recorder::new(A);
            stage.seen_settings = Arc::clone(&stage_seen);
            vec![boxed(stage)]
        };
        let mut pipeline = Pipeline::new(Arc::new(source));
        pipeline.start(Journal::default()).unwrap();
        pipeline.apply_settings(7);
        assert_eq!(*pipeline.context().unwrap().settings(), 7);
        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }

    #[test]
    fn test_mailbox_is_applied_on_next_execute() {
        let mut pipeline = pipeline(abc);
        pipeline.start(Journal::default()).unwrap();
        pipeline.settings_mailbox().post(42);
        assert_eq!(*pipeline.context().unwrap().settings(), 0);
        pipeline.execute().unwrap();
        assert_eq!(*pipeline.context().unwrap().settings(), 42);
    }
}
