use std::time::Instant;

use crate::types::{Condition, EvaluationReport, LeafOutcome, Predicate};

pub(crate) fn evaluate<P, T>(condition: &Condition<P>, ctx: &T) -> Result<bool, P::Error>
where
    P: Predicate<T>,
    T: ?Sized,
{
    match condition {
        Condition::Leaf(predicate) => predicate.test(ctx),
        Condition::AllOf(children) => {
            for child in children {
                if !evaluate(child, ctx)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Condition::AnyOf(children) => {
            for child in children {
                if evaluate(child, ctx)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

#[derive(Default)]
struct Recorder {
    path: Vec<usize>,
    tested: Vec<LeafOutcome>,
    skipped: usize,
}

pub(crate) fn evaluate_detailed<P, T>(
    condition: &Condition<P>,
    ctx: &T,
) -> Result<EvaluationReport, P::Error>
where
    P: Predicate<T>,
    T: ?Sized,
{
    let start = Instant::now();
    let mut recorder = Recorder::default();
    let result = eval_recorded(condition, ctx, &mut recorder)?;
    let duration = start.elapsed();
    Ok(EvaluationReport::new(
        result,
        recorder.tested,
        recorder.skipped,
        duration,
    ))
}

fn eval_recorded<P, T>(
    condition: &Condition<P>,
    ctx: &T,
    recorder: &mut Recorder,
) -> Result<bool, P::Error>
where
    P: Predicate<T>,
    T: ?Sized,
{
    match condition {
        Condition::Leaf(predicate) => {
            let result = predicate.test(ctx)?;
            recorder
                .tested
                .push(LeafOutcome::new(recorder.path.clone(), result));
            Ok(result)
        }
        // AND stops at the first false, OR at the first true.
        Condition::AllOf(children) => eval_children(children, ctx, recorder, false),
        Condition::AnyOf(children) => eval_children(children, ctx, recorder, true),
    }
}

fn eval_children<P, T>(
    children: &[Condition<P>],
    ctx: &T,
    recorder: &mut Recorder,
    stop_on: bool,
) -> Result<bool, P::Error>
where
    P: Predicate<T>,
    T: ?Sized,
{
    for (i, child) in children.iter().enumerate() {
        recorder.path.push(i);
        let result = eval_recorded(child, ctx, recorder);
        recorder.path.pop();
        if result? == stop_on {
            recorder.skipped += children[i + 1..]
                .iter()
                .map(Condition::leaf_count)
                .sum::<usize>();
            return Ok(stop_on);
        }
    }
    Ok(!stop_on)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::convert::Infallible;

    use crate::{all_of, any_of, leaf, Condition, Predicate};

    /// Leaf with a fixed outcome that logs its name when tested.
    #[derive(Debug, Clone, PartialEq)]
    struct Probe {
        name: &'static str,
        outcome: bool,
    }

    type Log = RefCell<Vec<&'static str>>;

    impl Predicate<Log> for Probe {
        type Error = Infallible;

        fn test(&self, log: &Log) -> Result<bool, Infallible> {
            log.borrow_mut().push(self.name);
            Ok(self.outcome)
        }
    }

    fn probe(name: &'static str, outcome: bool) -> Condition<Probe> {
        leaf(Probe { name, outcome })
    }

    fn run(tree: &Condition<Probe>) -> (bool, Vec<&'static str>) {
        let log = Log::default();
        let result = tree.evaluate(&log).unwrap();
        (result, log.into_inner())
    }

    /// Fails with its own name.
    struct Broken(&'static str);

    impl Predicate<()> for Broken {
        type Error = String;

        fn test(&self, (): &()) -> Result<bool, String> {
            Err(self.0.to_owned())
        }
    }

    #[test]
    fn leaf_returns_predicate_result() {
        assert_eq!(run(&probe("a", true)), (true, vec!["a"]));
        assert_eq!(run(&probe("a", false)), (false, vec!["a"]));
    }

    #[test]
    fn all_of_true_when_every_child_true() {
        let tree = all_of([probe("a", true), probe("b", true), probe("c", true)]);
        assert_eq!(run(&tree), (true, vec!["a", "b", "c"]));
    }

    #[test]
    fn all_of_stops_at_first_false() {
        let tree = all_of([probe("a", true), probe("b", false), probe("c", true)]);
        assert_eq!(run(&tree), (false, vec!["a", "b"]));
    }

    #[test]
    fn any_of_stops_at_first_true() {
        let tree = any_of([probe("a", false), probe("b", true), probe("c", true)]);
        assert_eq!(run(&tree), (true, vec!["a", "b"]));
    }

    #[test]
    fn any_of_false_when_no_child_true() {
        let tree = any_of([probe("a", false), probe("b", false)]);
        assert_eq!(run(&tree), (false, vec!["a", "b"]));
    }

    #[test]
    fn empty_composites_use_vacuous_truth() {
        assert_eq!(run(&all_of([])), (true, vec![]));
        assert_eq!(run(&any_of([])), (false, vec![]));
    }

    #[test]
    fn nested_short_circuit_skips_whole_subtree() {
        let tree = any_of([
            probe("a", true),
            all_of([probe("b", false), probe("c", true)]),
        ]);
        assert_eq!(run(&tree), (true, vec!["a"]));
    }

    #[test]
    fn leaf_error_propagates_unchanged() {
        let tree = all_of([leaf(Broken("first")), leaf(Broken("second"))]);
        assert_eq!(tree.evaluate(&()), Err("first".to_owned()));
    }

    #[test]
    fn short_circuit_avoids_later_errors() {
        let tree: Condition<Broken> = any_of([all_of([]), leaf(Broken("never"))]);
        assert_eq!(tree.evaluate(&()), Ok(true));
    }

    #[test]
    fn detailed_records_paths_and_skips() {
        let tree = any_of([
            all_of([probe("a", true), probe("b", false), probe("c", true)]),
            probe("d", true),
            probe("e", false),
        ]);
        let log = Log::default();
        let report = tree.evaluate_detailed(&log).unwrap();

        assert!(report.result());
        let paths: Vec<&[usize]> = report.tested().iter().map(|o| o.path()).collect();
        assert_eq!(paths, vec![&[0, 0][..], &[0, 1][..], &[1][..]]);
        let results: Vec<bool> = report.tested().iter().map(|o| o.result()).collect();
        assert_eq!(results, vec![true, false, true]);
        // c inside the allOf, e after the satisfied anyOf child
        assert_eq!(report.skipped(), 2);
        assert_eq!(log.into_inner(), vec!["a", "b", "d"]);
    }

    #[test]
    fn detailed_matches_plain_evaluation() {
        let trees = [
            all_of([probe("a", true), any_of([probe("b", false), probe("c", true)])]),
            any_of([probe("a", false), all_of([])]),
            all_of([probe("a", false)]),
            probe("a", true),
        ];
        for tree in &trees {
            let plain = tree.evaluate(&Log::default()).unwrap();
            let detailed = tree.evaluate_detailed(&Log::default()).unwrap();
            assert_eq!(plain, detailed.result(), "mismatch for {tree:?}");
        }
    }

    #[test]
    fn detailed_root_leaf_has_empty_path() {
        let report = probe("a", false).evaluate_detailed(&Log::default()).unwrap();
        assert_eq!(report.tested().len(), 1);
        assert!(report.tested()[0].path().is_empty());
        assert_eq!(report.skipped(), 0);
    }
}
