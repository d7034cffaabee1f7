use crate::pipeline::{Outlet, Stage, StageRef};

/// Forward a record only when `predicate` holds; others stop here
pub fn filter<T, F>(name: impl Into<String>, mut predicate: F) -> StageRef<T>
where
    T: Clone + 'static,
    F: FnMut(&T) -> bool + 'static,
{
    Stage::custom_fn(name, move |record: &T, outlet: &Outlet<'_, T>| {
        if predicate(record) {
            outlet.forward(record)
        } else {
            Ok(())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stages::Collector;

    #[test]
    fn test_filter_drops_failing_records() {
        let sink = Collector::new("sink");
        let evens = filter("evens", |x: &u8| x % 2 == 0);
        evens.set_successor(sink.stage()).unwrap();

        for i in 0..7u8 {
            evens.execute(&i).unwrap();
        }

        assert_eq!(sink.records(), vec![0, 2, 4, 6]);
        let stats = evens.stats();
        assert_eq!(stats.executions, 7);
        assert_eq!(stats.forwarded, 4);
    }

    #[test]
    fn test_filter_with_state() {
        let sink = Collector::new("sink");
        let mut seen = std::collections::HashSet::new();
        let dedup = filter("dedup", move |x: &i32| seen.insert(*x));
        dedup.set_successor(sink.stage()).unwrap();

        for x in [3, 1, 3, 2, 1] {
            dedup.execute(&x).unwrap();
        }

        assert_eq!(sink.records(), vec![3, 1, 2]);
    }
}
