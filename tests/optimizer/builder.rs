use smbo::prelude::*;
use smbo::surrogate::{GaussianProcess, Kernel};

fn space() -> SearchSpace {
    SearchSpace::builder()
        .log_uniform("lr", 1e-4, 1.0)
        .build()
        .unwrap()
}

fn invalid_config(result: Result<Optimizer>) -> String {
    match result {
        Err(Error::InvalidConfig(msg)) => msg,
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn defaults() {
    let opt = Optimizer::new(space()).unwrap();
    assert_eq!(opt.n_calls(), 100);
    assert_eq!(opt.n_initial_points(), 10);
    assert_eq!(opt.phase(), Phase::Initializing);
    assert_eq!(opt.n_evaluations(), 0);
    assert!(!opt.surrogate().is_fitted());
}

#[test]
fn zero_budgets_are_rejected() {
    let msg = invalid_config(Optimizer::builder(space()).n_calls(0).build());
    assert!(msg.contains("n_calls"));

    let msg = invalid_config(Optimizer::builder(space()).n_initial_points(0).build());
    assert!(msg.contains("n_initial_points"));
}

#[test]
fn initial_points_are_clamped_to_the_budget() {
    let opt = Optimizer::builder(space())
        .n_initial_points(20)
        .n_calls(5)
        .build()
        .unwrap();
    assert_eq!(opt.n_initial_points(), 5);
}

#[test]
fn acquisition_parameters_are_validated() {
    invalid_config(
        Optimizer::builder(space())
            .acquisition(Acquisition::ExpectedImprovement { xi: -0.1 })
            .build(),
    );
    invalid_config(
        Optimizer::builder(space())
            .acquisition(Acquisition::LowerConfidenceBound {
                kappa: f64::INFINITY,
            })
            .build(),
    );
    invalid_config(
        Optimizer::builder(space())
            .acquisition(Acquisition::Hedge {
                eta: -1.0,
                xi: 0.01,
                kappa: 1.96,
            })
            .build(),
    );
}

#[test]
fn acquisition_optimizer_sizes_are_validated() {
    invalid_config(
        Optimizer::builder(space())
            .acquisition_optimizer(AcquisitionOptimizer::Sampling { n_points: 0 })
            .build(),
    );
    invalid_config(
        Optimizer::builder(space())
            .acquisition_optimizer(AcquisitionOptimizer::LocalSearch {
                n_points: 10,
                n_restarts: 0,
            })
            .build(),
    );
}

#[test]
fn failure_policy_values_must_be_finite() {
    invalid_config(
        Optimizer::builder(space())
            .failure_policy(FailurePolicy::Penalty(f64::NAN))
            .build(),
    );
    invalid_config(
        Optimizer::builder(space())
            .failure_policy(FailurePolicy::WorstObserved {
                default: f64::INFINITY,
            })
            .build(),
    );
}

#[test]
fn same_seed_same_proposals() {
    let build = || {
        Optimizer::builder(space())
            .n_initial_points(4)
            .seed(99)
            .build()
            .unwrap()
    };
    let (mut a, mut b) = (build(), build());
    for _ in 0..4 {
        let (ca, cb) = (a.ask().unwrap(), b.ask().unwrap());
        assert_eq!(ca, cb);
        a.tell(ca, Ok::<_, String>(1.0)).unwrap();
        b.tell(cb, Ok::<_, String>(1.0)).unwrap();
    }
}

#[test]
fn custom_surrogate_is_used() {
    let opt = Optimizer::builder(space())
        .surrogate(
            GaussianProcess::builder()
                .kernel(Kernel::SquaredExponential)
                .max_train_points(20)
                .build(),
        )
        .build()
        .unwrap();
    assert!(!opt.surrogate().is_fitted());
}
