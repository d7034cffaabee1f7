use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::core::{Signal, StageStats};
use crate::error::{PipeError, PipeResult};
use crate::logger::{LogLevel, LOGGER};

/// Shared handle to a stage
///
/// Stages are reference counted so that a tail can be shared by several heads.
/// `Rc` keeps the whole chain on one thread.
pub type StageRef<T> = Rc<Stage<T>>;

type StepFn<T> = dyn FnMut(&mut T) -> PipeResult<Signal>;

/// Logic of a custom stage
///
/// `process` receives every record handed to the stage and decides how many
/// records to forward, and which, through the [`Outlet`]. Forwarding nothing
/// filters the record out; forwarding many fans it out.
///
/// # Example
/// ```
/// use pipechain::pipeline::{Outlet, Process, Stage};
/// use pipechain::error::PipeResult;
///
/// struct Repeat(usize);
///
/// impl Process<u32> for Repeat {
///     fn process(&mut self, record: &u32, outlet: &Outlet<'_, u32>) -> PipeResult<()> {
///         for _ in 0..self.0 {
///             outlet.forward(record)?;
///         }
///         Ok(())
///     }
/// }
///
/// let stage = Stage::<u32>::custom("repeat", Repeat(3));
/// stage.execute(&7).unwrap();
/// assert_eq!(stage.stats().forwarded, 3);
/// ```
pub trait Process<T> {
    fn process(&mut self, record: &T, outlet: &Outlet<'_, T>) -> PipeResult<()>;
}

/// Closure adapter for [`Stage::custom_fn`]
struct FnProcess<F>(F);

impl<T, F> Process<T> for FnProcess<F>
where
    F: FnMut(&T, &Outlet<'_, T>) -> PipeResult<()>,
{
    fn process(&mut self, record: &T, outlet: &Outlet<'_, T>) -> PipeResult<()> {
        (self.0)(record, outlet)
    }
}

/// Downstream side of a stage, handed to [`Process::process`]
pub struct Outlet<'a, T> {
    stage: &'a Stage<T>,
}

impl<'a, T: Clone + 'static> Outlet<'a, T> {
    /// Pass a record to the successor of the executing stage
    pub fn forward(&self, record: &T) -> PipeResult<()> {
        self.stage.forward(record)
    }

    pub fn has_successor(&self) -> bool {
        !self.stage.is_terminal()
    }

    pub fn stage_name(&self) -> &str {
        self.stage.name()
    }
}

enum StageKind<T> {
    Generator(RefCell<Box<StepFn<T>>>),
    Custom(RefCell<Box<dyn Process<T>>>),
}

/// A named link in a processing chain
///
/// A stage is either a *generator*, driven by the engine through a step
/// callable returning [`Signal`], or a *custom* stage whose [`Process`]
/// implementation forwards records itself. Both forms hold at most one
/// successor and expose the same `execute` / `forward` / `set_successor`
/// surface.
///
/// Stages are `!Send` and `!Sync`; one chain runs on one thread.
pub struct Stage<T> {
    name: String,
    kind: StageKind<T>,
    next: RefCell<Option<StageRef<T>>>,
    executions: Cell<u64>,
    forwarded: Cell<u64>,
}

impl<T: Clone + 'static> Stage<T> {
    fn with_kind(name: impl Into<String>, kind: StageKind<T>) -> StageRef<T> {
        Rc::new(Self {
            name: name.into(),
            kind,
            next: RefCell::new(None),
            executions: Cell::new(0),
            forwarded: Cell::new(0),
        })
    }

    /// Build a generator stage from an infallible step callable
    ///
    /// The step mutates a private copy of the input. Each `Continue` forwards
    /// the copy and calls the step again; `Done` forwards it one last time.
    pub fn generator<F>(name: impl Into<String>, mut step: F) -> StageRef<T>
    where
        F: FnMut(&mut T) -> Signal + 'static,
    {
        Self::try_generator(name, move |record: &mut T| Ok(step(record)))
    }

    /// Build a generator stage whose step may fail
    pub fn try_generator<F>(name: impl Into<String>, step: F) -> StageRef<T>
    where
        F: FnMut(&mut T) -> PipeResult<Signal> + 'static,
    {
        Self::with_kind(name, StageKind::Generator(RefCell::new(Box::new(step))))
    }

    /// Build a custom stage from a [`Process`] implementation
    pub fn custom<P>(name: impl Into<String>, process: P) -> StageRef<T>
    where
        P: Process<T> + 'static,
    {
        Self::with_kind(name, StageKind::Custom(RefCell::new(Box::new(process))))
    }

    /// Build a custom stage from a closure
    pub fn custom_fn<F>(name: impl Into<String>, f: F) -> StageRef<T>
    where
        F: FnMut(&T, &Outlet<'_, T>) -> PipeResult<()> + 'static,
    {
        Self::custom(name, FnProcess(f))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_generator(&self) -> bool {
        matches!(self.kind, StageKind::Generator(_))
    }

    /// Current downstream neighbor, if any
    pub fn successor(&self) -> Option<StageRef<T>> {
        self.next.borrow().clone()
    }

    pub fn is_terminal(&self) -> bool {
        self.next.borrow().is_none()
    }

    /// Replace this stage's successor and return it for fluent chaining
    ///
    /// Fails with [`PipeError::CyclicPipeline`] when `next`'s chain already
    /// reaches this stage; the existing link is kept in that case.
    pub fn set_successor(&self, next: StageRef<T>) -> PipeResult<StageRef<T>> {
        if chain(&next).any(|stage| std::ptr::eq(stage.as_ref(), self)) {
            LOGGER.log(
                LogLevel::Warn,
                &format!(
                    "Refusing to link '{}' -> '{}': the chain would loop",
                    self.name, next.name
                ),
                "pipeline::stage",
            );
            return Err(PipeError::CyclicPipeline(self.name.clone()));
        }

        self.link(next.clone());
        Ok(next)
    }

    /// Unlink the successor, making this stage a terminator
    pub fn clear_successor(&self) -> Option<StageRef<T>> {
        self.next.borrow_mut().take()
    }

    /// Store a link without the cycle check; callers have already validated it
    pub(crate) fn link(&self, next: StageRef<T>) {
        LOGGER.log(
            LogLevel::Debug,
            &format!("Linked stage '{}' -> '{}'", self.name, next.name),
            "pipeline::stage",
        );
        *self.next.borrow_mut() = Some(next);
    }

    /// Pass a record to the successor; a no-op on a terminator
    pub fn forward(&self, record: &T) -> PipeResult<()> {
        self.forwarded.set(self.forwarded.get() + 1);

        // Clone the handle so a stage may re-link while records are in flight
        let next = self.next.borrow().clone();
        match next {
            Some(next) => next.execute(record),
            None => Ok(()),
        }
    }

    /// Run one record through this stage and, transitively, everything after it
    ///
    /// Errors raised by stage logic are returned unchanged.
    pub fn execute(&self, record: &T) -> PipeResult<()> {
        self.executions.set(self.executions.get() + 1);

        match &self.kind {
            StageKind::Generator(step) => self.drive(step, record),
            StageKind::Custom(process) => {
                let mut process = process
                    .try_borrow_mut()
                    .map_err(|_| PipeError::Reentrant(self.name.clone()))?;
                process.process(record, &Outlet { stage: self })
            }
        }
    }

    /// Generator loop: forward after every `Continue`, then once after `Done`
    fn drive(&self, step: &RefCell<Box<StepFn<T>>>, record: &T) -> PipeResult<()> {
        let mut x = record.clone();

        let mut signal = self.step(step, &mut x)?;
        while signal == Signal::Continue {
            self.forward(&x)?;
            signal = self.step(step, &mut x)?;
        }
        self.forward(&x)
    }

    fn step(&self, step: &RefCell<Box<StepFn<T>>>, x: &mut T) -> PipeResult<Signal> {
        // The borrow ends before forwarding so downstream stages never see it held
        let mut step = step
            .try_borrow_mut()
            .map_err(|_| PipeError::Reentrant(self.name.clone()))?;
        (*step)(x)
    }

    pub fn stats(&self) -> StageStats {
        StageStats {
            executions: self.executions.get(),
            forwarded: self.forwarded.get(),
        }
    }

    pub fn reset_stats(&self) {
        self.executions.set(0);
        self.forwarded.set(0);
    }
}

impl<T> fmt::Debug for Stage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            StageKind::Generator(_) => "generator",
            StageKind::Custom(_) => "custom",
        };
        let next = self
            .next
            .try_borrow()
            .ok()
            .and_then(|next| next.as_ref().map(|stage| stage.name.clone()));
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("kind", &kind)
            .field("successor", &next)
            .finish()
    }
}

impl<T> Drop for Stage<T> {
    fn drop(&mut self) {
        LOGGER.log(
            LogLevel::Debug,
            &format!("Dropping stage '{}'", self.name),
            "pipeline::stage",
        );
    }
}

/// Iterator over a chain, from a head to its terminator
pub struct Chain<T> {
    current: Option<StageRef<T>>,
}

impl<T: Clone + 'static> Iterator for Chain<T> {
    type Item = StageRef<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let stage = self.current.take()?;
        self.current = stage.successor();
        Some(stage)
    }
}

/// Walk the chain starting at `head`
pub fn chain<T: Clone + 'static>(head: &StageRef<T>) -> Chain<T> {
    Chain {
        current: Some(head.clone()),
    }
}
