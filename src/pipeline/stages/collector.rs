use std::cell::RefCell;
use std::rc::Rc;

use crate::pipeline::{Outlet, Stage, StageRef};

/// Stage that keeps a copy of every record reaching it
///
/// The collector hands out its stage through [`Collector::stage`]; the buffer
/// stays readable from the collector after the stage is linked. Records are
/// still forwarded, so a collector can sit in the middle of a chain.
pub struct Collector<T: Clone + 'static> {
    records: Rc<RefCell<Vec<T>>>,
    stage: StageRef<T>,
}

impl<T: Clone + 'static> Collector<T> {
    pub fn new(name: impl Into<String>) -> Self {
        let records: Rc<RefCell<Vec<T>>> = Rc::new(RefCell::new(Vec::new()));
        let buffer = records.clone();
        let stage = Stage::custom_fn(name, move |record: &T, outlet: &Outlet<'_, T>| {
            buffer.borrow_mut().push(record.clone());
            outlet.forward(record)
        });
        Self { records, stage }
    }

    /// Handle to link into a chain
    pub fn stage(&self) -> StageRef<T> {
        self.stage.clone()
    }

    pub fn records(&self) -> Vec<T> {
        self.records.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Signal;

    #[test]
    fn test_collector_keeps_records_in_order() {
        let sink = Collector::new("sink");
        let stage = sink.stage();
        stage.execute(&"a").unwrap();
        stage.execute(&"b").unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.records(), vec!["a", "b"]);

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_collector_in_middle_still_forwards() {
        let middle = Collector::new("middle");
        let end = Collector::new("end");
        let head = Stage::generator("head", |x: &mut i32| {
            *x += 1;
            Signal::Done
        });
        head.set_successor(middle.stage())
            .unwrap()
            .set_successor(end.stage())
            .unwrap();

        head.execute(&1).unwrap();

        assert_eq!(middle.records(), vec![2]);
        assert_eq!(end.records(), vec![2]);
    }
}
