use crate::pipeline::{Outlet, Stage, StageRef};

/// Fan each record out into `count` copies
///
/// Every copy starts from the incoming record and is shaped by
/// `f(&mut copy, index)` before it is forwarded, so copies never see each
/// other's changes.
pub fn expand<T, F>(name: impl Into<String>, count: usize, mut f: F) -> StageRef<T>
where
    T: Clone + 'static,
    F: FnMut(&mut T, usize) + 'static,
{
    Stage::custom_fn(name, move |record: &T, outlet: &Outlet<'_, T>| {
        for index in 0..count {
            let mut copy = record.clone();
            f(&mut copy, index);
            outlet.forward(&copy)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stages::Collector;

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        id: usize,
        tag: &'static str,
    }

    #[test]
    fn test_expand_copies_from_base_record() {
        let sink = Collector::new("sink");
        let reader = expand("reader", 3, |p: &mut Point, i| p.id += i);
        reader.set_successor(sink.stage()).unwrap();

        reader.execute(&Point { id: 10, tag: "base" }).unwrap();

        let ids: Vec<usize> = sink.records().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
        assert!(sink.records().iter().all(|p| p.tag == "base"));
    }

    #[test]
    fn test_expand_zero_forwards_nothing() {
        let sink = Collector::new("sink");
        let none = expand("none", 0, |_: &mut i32, _| {});
        none.set_successor(sink.stage()).unwrap();

        none.execute(&1).unwrap();

        assert!(sink.is_empty());
        assert_eq!(none.stats().forwarded, 0);
    }
}
