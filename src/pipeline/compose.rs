use std::collections::HashSet;
use std::rc::Rc;

use super::stage::{chain, StageRef};
use crate::error::{PipeError, PipeResult};
use crate::logger::{LogLevel, LOGGER};

/// Link an ordered list of stages into one chain and return its head
///
/// - no stages: [`PipeError::EmptyPipeline`]
/// - one stage: returned as is, its links untouched
/// - more: `stages[i]` is linked to `stages[i + 1]`, last pair first
///
/// The list is validated before any link is written. A stage listed twice, or
/// a last stage whose existing downstream chain leads back into the list, is
/// rejected with [`PipeError::CyclicPipeline`] and no link changes.
///
/// # Example
/// ```
/// use pipechain::pipeline::{compose, Signal, Stage};
///
/// let head = compose(vec![
///     Stage::generator("inc", |x: &mut i32| { *x += 1; Signal::Done }),
///     Stage::generator("dbl", |x: &mut i32| { *x *= 2; Signal::Done }),
/// ])
/// .unwrap();
///
/// assert_eq!(head.name(), "inc");
/// head.execute(&1).unwrap();
/// ```
pub fn compose<T, I>(stages: I) -> PipeResult<StageRef<T>>
where
    T: Clone + 'static,
    I: IntoIterator<Item = StageRef<T>>,
{
    let stages: Vec<StageRef<T>> = stages.into_iter().collect();

    let (head, last) = match (stages.first(), stages.last()) {
        (Some(head), Some(last)) => (head.clone(), last.clone()),
        _ => {
            LOGGER.log(
                LogLevel::Warn,
                "Refusing to compose a pipeline with no stages",
                "pipeline::compose",
            );
            return Err(PipeError::EmptyPipeline);
        }
    };

    if stages.len() == 1 {
        return Ok(head);
    }

    let mut seen = HashSet::with_capacity(stages.len());
    for stage in &stages {
        if !seen.insert(Rc::as_ptr(stage)) {
            return Err(PipeError::CyclicPipeline(stage.name().to_string()));
        }
    }

    // Links past the last stage survive composition, so they must not loop back
    if let Some(tail) = last.successor() {
        if let Some(stage) = chain(&tail).find(|stage| seen.contains(&Rc::as_ptr(stage))) {
            return Err(PipeError::CyclicPipeline(stage.name().to_string()));
        }
    }

    for pair in stages.windows(2).rev() {
        pair[0].link(pair[1].clone());
    }

    LOGGER.log(
        LogLevel::Debug,
        &format!(
            "Composed pipeline of {} stages starting at '{}'",
            stages.len(),
            head.name()
        ),
        "pipeline::compose",
    );

    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Outlet, Signal, Stage};
    use std::cell::RefCell;

    fn passthrough(name: &str) -> StageRef<i32> {
        Stage::generator(name, |_: &mut i32| Signal::Done)
    }

    fn names(head: &StageRef<i32>) -> Vec<String> {
        chain(head).map(|s| s.name().to_string()).collect()
    }

    #[test]
    fn test_compose_empty_fails() {
        let err = compose(Vec::<StageRef<i32>>::new()).unwrap_err();
        assert!(matches!(err, PipeError::EmptyPipeline));
    }

    #[test]
    fn test_compose_single_returns_same_stage() {
        let only = passthrough("only");
        let head = compose(vec![only.clone()]).unwrap();
        assert!(Rc::ptr_eq(&head, &only));
        assert!(head.is_terminal());
    }

    #[test]
    fn test_compose_links_in_order() {
        let head = compose(vec![passthrough("a"), passthrough("b"), passthrough("c")]).unwrap();
        assert_eq!(names(&head), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_compose_matches_manual_linking() {
        let composed_log = Rc::new(RefCell::new(Vec::new()));
        let manual_log = Rc::new(RefCell::new(Vec::new()));

        let build = |log: Rc<RefCell<Vec<i32>>>| {
            let a = Stage::generator("a", |x: &mut i32| {
                *x += 1;
                Signal::Done
            });
            let mut left = 2;
            let b = Stage::generator("b", move |x: &mut i32| {
                *x *= 10;
                left -= 1;
                Signal::from_done(left == 0)
            });
            let c = Stage::custom_fn("c", move |x: &i32, _: &Outlet<'_, i32>| {
                log.borrow_mut().push(*x);
                Ok(())
            });
            (a, b, c)
        };

        let (a, b, c) = build(composed_log.clone());
        compose(vec![a, b, c]).unwrap().execute(&1).unwrap();

        let (a, b, c) = build(manual_log.clone());
        a.set_successor(b).unwrap().set_successor(c).unwrap();
        a.execute(&1).unwrap();

        assert_eq!(*composed_log.borrow(), vec![20, 200]);
        assert_eq!(*composed_log.borrow(), *manual_log.borrow());
    }

    #[test]
    fn test_compose_rejects_duplicate_stage() {
        let a = passthrough("a");
        let b = passthrough("b");
        let err = compose(vec![a.clone(), b.clone(), a.clone()]).unwrap_err();

        assert!(matches!(err, PipeError::CyclicPipeline(ref name) if name == "a"));
        assert!(a.is_terminal());
        assert!(b.is_terminal());
    }

    #[test]
    fn test_compose_rejects_tail_looping_back() {
        let a = passthrough("a");
        let b = passthrough("b");
        let c = passthrough("c");
        // c already feeds into a
        c.set_successor(a.clone()).unwrap();

        let err = compose(vec![a.clone(), b.clone(), c.clone()]).unwrap_err();

        assert!(matches!(err, PipeError::CyclicPipeline(_)));
        assert!(a.is_terminal());
        assert!(b.is_terminal());
    }

    #[test]
    fn test_compose_keeps_existing_tail_links() {
        let a = passthrough("a");
        let b = passthrough("b");
        let downstream = passthrough("downstream");
        b.set_successor(downstream).unwrap();

        let head = compose(vec![a, b]).unwrap();
        assert_eq!(names(&head), vec!["a", "b", "downstream"]);
    }

    #[test]
    fn test_compose_relinks_middle_stages() {
        let a = passthrough("a");
        let b = passthrough("b");
        let c = passthrough("c");
        let stale = passthrough("stale");
        a.set_successor(stale).unwrap();

        let head = compose(vec![a, b, c]).unwrap();
        assert_eq!(names(&head), vec!["a", "b", "c"]);
    }
}
