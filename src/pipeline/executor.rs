use super::compose::compose;
use super::core::{RunReport, Signal, StageReport, StageStats};
use super::stage::{chain, Outlet, Process, Stage, StageRef};
use crate::config::PipelineConfig;
use crate::error::PipeResult;
use crate::logger::{LogLevel, LOGGER};
use std::time::Instant;

/// A named, composed chain of stages
///
/// # Example
/// ```
/// use pipechain::pipeline::{Pipeline, Signal};
///
/// let pipeline = Pipeline::<u32>::builder("my-pipeline")
///     .add_generator("double", |x: &mut u32| { *x *= 2; Signal::Done })
///     .add_generator("inc", |x: &mut u32| { *x += 1; Signal::Done })
///     .build()
///     .unwrap();
///
/// let report = pipeline.run(&20).unwrap();
/// assert_eq!(report.records_delivered(), 1);
/// ```
pub struct Pipeline<T: Clone + 'static> {
    head: StageRef<T>,
    config: PipelineConfig,
}

impl<T: Clone + 'static> Pipeline<T> {
    /// Create a new pipeline builder
    pub fn builder(name: impl Into<String>) -> PipelineBuilder<T> {
        PipelineBuilder::new(name)
    }

    /// Create a builder preconfigured from `config`
    pub fn from_config(config: PipelineConfig) -> PipelineBuilder<T> {
        PipelineBuilder::new(config.name.clone()).with_config(config)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// First stage of the chain
    pub fn head(&self) -> &StageRef<T> {
        &self.head
    }

    /// Number of stages from head to terminator
    pub fn stage_count(&self) -> usize {
        chain(&self.head).count()
    }

    pub fn stage_names(&self) -> Vec<String> {
        chain(&self.head).map(|s| s.name().to_string()).collect()
    }

    /// Lifetime counters of every stage, head first
    pub fn stats(&self) -> Vec<(String, StageStats)> {
        chain(&self.head)
            .map(|s| (s.name().to_string(), s.stats()))
            .collect()
    }

    /// Push one record through the chain
    ///
    /// Everything downstream happens inside this call. A stage error stops the
    /// run and is returned unchanged.
    pub fn run(&self, record: &T) -> PipeResult<RunReport> {
        let level = self.config.log_level;
        LOGGER.log(
            level,
            &format!(
                "Starting pipeline '{}' with {} stages",
                self.config.name,
                self.stage_count()
            ),
            "pipeline",
        );

        let before: Vec<StageStats> = if self.config.collect_stats {
            chain(&self.head).map(|s| s.stats()).collect()
        } else {
            Vec::new()
        };

        let start = Instant::now();
        let result = self.head.execute(record);
        let duration = start.elapsed();

        if let Err(e) = result {
            LOGGER.log(
                LogLevel::Error,
                &format!(
                    "Pipeline '{}' failed after {:.3}ms: {}",
                    self.config.name,
                    duration.as_secs_f64() * 1000.0,
                    e
                ),
                "pipeline",
            );
            return Err(e);
        }

        let stage_reports = if self.config.collect_stats {
            // Pair by position; a stage re-linked mid-run starts from zero
            chain(&self.head)
                .enumerate()
                .map(|(index, stage)| {
                    let earlier = before.get(index).copied().unwrap_or_default();
                    StageReport::new(stage.name(), stage.stats().since(&earlier))
                })
                .collect()
        } else {
            Vec::new()
        };

        LOGGER.log(
            level,
            &format!(
                "Pipeline '{}' completed in {:.3}ms",
                self.config.name,
                duration.as_secs_f64() * 1000.0
            ),
            "pipeline",
        );

        Ok(RunReport::new(&self.config.name, duration, stage_reports))
    }

    /// Push each record through the chain in order, stopping at the first error
    pub fn run_all<'a, I>(&self, records: I) -> PipeResult<Vec<RunReport>>
    where
        I: IntoIterator<Item = &'a T>,
    {
        records.into_iter().map(|record| self.run(record)).collect()
    }
}

impl<T: Clone + 'static> std::fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.config.name)
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing pipelines
pub struct PipelineBuilder<T: Clone + 'static> {
    config: PipelineConfig,
    stages: Vec<StageRef<T>>,
}

impl<T: Clone + 'static> PipelineBuilder<T> {
    /// Create a new pipeline builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config: PipelineConfig::new(name),
            stages: Vec::new(),
        }
    }

    /// Replace the configuration; the builder's name is kept when the config
    /// carries the default one
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        let name = if config.name == PipelineConfig::default().name {
            std::mem::take(&mut self.config.name)
        } else {
            config.name.clone()
        };
        self.config = PipelineConfig { name, ..config };
        self
    }

    /// Add an already constructed stage
    pub fn add_stage(mut self, stage: StageRef<T>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Add a generator stage built from a step callable
    pub fn add_generator<F>(self, name: impl Into<String>, step: F) -> Self
    where
        F: FnMut(&mut T) -> Signal + 'static,
    {
        self.add_stage(Stage::generator(name, step))
    }

    /// Add a custom stage built from a [`Process`] implementation
    pub fn add_custom<P>(self, name: impl Into<String>, process: P) -> Self
    where
        P: Process<T> + 'static,
    {
        self.add_stage(Stage::custom(name, process))
    }

    /// Add a custom stage built from a closure
    pub fn add_custom_fn<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: FnMut(&T, &Outlet<'_, T>) -> PipeResult<()> + 'static,
    {
        self.add_stage(Stage::custom_fn(name, f))
    }

    /// Validate the configuration and compose the stages
    pub fn build(self) -> PipeResult<Pipeline<T>> {
        self.config.validate()?;
        let head = compose(self.stages)?;

        LOGGER.log(
            LogLevel::Debug,
            &format!(
                "Built pipeline '{}' starting at stage '{}'",
                self.config.name,
                head.name()
            ),
            "pipeline",
        );

        Ok(Pipeline {
            head,
            config: self.config,
        })
    }
}
