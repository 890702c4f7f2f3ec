use core::cell::Cell;
use core::ops::ControlFlow;
use std::rc::Rc;

use smbo::prelude::*;

fn space() -> SearchSpace {
    SearchSpace::builder()
        .continuous("x", -1.0, 1.0)
        .build()
        .unwrap()
}

struct StopAfter {
    limit: usize,
    calls: Rc<Cell<usize>>,
}

impl Objective for StopAfter {
    type Error = Error;

    fn evaluate(&self, candidate: &Candidate) -> Result<f64> {
        self.calls.set(self.calls.get() + 1);
        Ok(candidate.float("x").unwrap().powi(2))
    }

    fn after_evaluation(&self, history: &[Observation]) -> ControlFlow<()> {
        if history.len() >= self.limit {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

#[test]
fn after_evaluation_can_stop_the_run() {
    let mut opt = Optimizer::builder(space())
        .n_initial_points(10)
        .n_calls(10)
        .seed(0)
        .build()
        .unwrap();
    let calls = Rc::new(Cell::new(0));
    let objective = StopAfter {
        limit: 4,
        calls: Rc::clone(&calls),
    };

    let result = opt.run(objective).unwrap();

    assert_eq!(result.n_evaluations(), 4);
    assert_eq!(calls.get(), 4);
    assert_eq!(opt.phase(), Phase::Terminated);
    assert!(matches!(opt.ask(), Err(Error::Terminated)));
}

struct ThresholdStop {
    target: f64,
}

impl Objective for ThresholdStop {
    type Error = String;

    fn evaluate(&self, candidate: &Candidate) -> core::result::Result<f64, String> {
        Ok(candidate.float("x").unwrap().abs())
    }

    fn after_evaluation(&self, history: &[Observation]) -> ControlFlow<()> {
        match history.last() {
            Some(o) if o.value < self.target => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }
}

#[test]
fn early_stop_on_target_value() {
    let mut opt = Optimizer::builder(space())
        .n_initial_points(50)
        .n_calls(50)
        .seed(5)
        .build()
        .unwrap();

    let result = opt.run(ThresholdStop { target: 0.3 }).unwrap();

    let last = result.history().last().unwrap();
    assert!(last.value < 0.3);
    assert!(result.history()[..result.n_evaluations() - 1]
        .iter()
        .all(|o| o.value >= 0.3));
}

#[test]
fn closures_borrow_their_environment() {
    let offset = 0.25;
    let mut opt = Optimizer::builder(space())
        .n_initial_points(3)
        .n_calls(3)
        .seed(1)
        .build()
        .unwrap();

    let result = opt
        .run(|c: &Candidate| Ok::<_, Error>((c.float("x").unwrap() - offset).abs()))
        .unwrap();
    assert_eq!(result.n_evaluations(), 3);
}
