use crate::error::PipeResult;
use crate::pipeline::{Outlet, Signal, Stage, StageRef};

/// One-to-one transform: `f` mutates the record, which is forwarded once
///
/// # Example
/// ```
/// use pipechain::pipeline::stages::{map, Collector};
///
/// let sink = Collector::new("sink");
/// let square = map("square", |x: &mut i64| *x = *x * *x);
/// square.set_successor(sink.stage()).unwrap();
///
/// square.execute(&9).unwrap();
/// assert_eq!(sink.records(), vec![81]);
/// ```
pub fn map<T, F>(name: impl Into<String>, mut f: F) -> StageRef<T>
where
    T: Clone + 'static,
    F: FnMut(&mut T) + 'static,
{
    Stage::generator(name, move |record: &mut T| {
        f(record);
        Signal::Done
    })
}

/// Observe each record, then forward it untouched
pub fn inspect<T, F>(name: impl Into<String>, mut f: F) -> StageRef<T>
where
    T: Clone + 'static,
    F: FnMut(&T) + 'static,
{
    Stage::custom_fn(name, move |record: &T, outlet: &Outlet<'_, T>| -> PipeResult<()> {
        f(record);
        outlet.forward(record)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stages::Collector;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_map_forwards_exactly_once() {
        let sink = Collector::new("sink");
        let inc = map("inc", |x: &mut i32| *x += 1);
        inc.set_successor(sink.stage()).unwrap();

        inc.execute(&1).unwrap();
        inc.execute(&5).unwrap();

        assert_eq!(sink.records(), vec![2, 6]);
        assert!(inc.is_generator());
    }

    #[test]
    fn test_inspect_passes_records_through() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let sink = Collector::new("sink");
        let tap = inspect("tap", move |x: &String| log.borrow_mut().push(x.len()));
        tap.set_successor(sink.stage()).unwrap();

        tap.execute(&"abc".to_string()).unwrap();

        assert_eq!(*seen.borrow(), vec![3]);
        assert_eq!(sink.records(), vec!["abc".to_string()]);
    }
}
