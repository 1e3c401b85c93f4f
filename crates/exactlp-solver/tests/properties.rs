use exactlp_solver::{Path, Problem, Rational, Relation, SolutionStatus, Solver};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn row(text: &str) -> Vec<Rational> {
    text.split_whitespace().map(|t| t.parse().unwrap()).collect()
}

fn r(text: &str) -> Rational {
    text.parse().unwrap()
}

fn problem(num_variables: usize, rows: &[(&str, Relation, &str)], objective: &str) -> Problem {
    let mut problem = Problem::new(num_variables);
    for (coefficients, relation, rhs) in rows {
        problem.add_constraint(row(coefficients), *relation, r(rhs)).unwrap();
    }
    problem.set_objective(row(objective)).unwrap();
    problem
}

fn textbook() -> Problem {
    problem(
        2,
        &[
            ("5 3", Relation::Le, "30"),
            ("2 3", Relation::Le, "24"),
            ("1 3", Relation::Le, "18"),
        ],
        "-8 -6",
    )
}

#[test]
fn known_optimum() {
    init_logger();
    let solution = Solver::new().solve(&textbook()).unwrap();
    assert_eq!(solution.status, SolutionStatus::Optimal);
    assert_eq!(solution.path, Path::Primal);
    assert_eq!(solution.values, row("3 5"));
    assert_eq!(solution.objective_value, Some(r("-54")));
}

#[test]
fn forced_dual_matches_primal() {
    init_logger();
    let primal = Solver::new().with_path(Path::Primal).solve(&textbook()).unwrap();
    let dual = Solver::new().with_path(Path::Dual).solve(&textbook()).unwrap();
    assert_eq!(dual.status, SolutionStatus::Optimal);
    assert_eq!(dual.path, Path::Dual);
    assert_eq!(dual.values, primal.values);
    assert_eq!(dual.objective_value, primal.objective_value);
}

#[test]
fn contradictory_bounds_are_infeasible() {
    init_logger();
    let p = problem(1, &[("1", Relation::Le, "5"), ("1", Relation::Ge, "6")], "1");

    let report = Solver::new().check_feasibility(&p).unwrap();
    assert!(!report.is_feasible());
    assert_eq!(report.to_string(), "The problem is infeasible.");

    // Non-negative costs route to the dual, which is unbounded here.
    let solution = Solver::new().solve(&p).unwrap();
    assert_eq!(solution.path, Path::Dual);
    assert_eq!(solution.status, SolutionStatus::Infeasible);
    assert_eq!(solution.to_string(), "The problem is infeasible.\n");

    let primal = Solver::new().with_path(Path::Primal).solve(&p).unwrap();
    assert_eq!(primal.status, SolutionStatus::Infeasible);
}

#[test]
fn unbounded_direction() {
    init_logger();
    let p = problem(2, &[("1 0", Relation::Ge, "-3")], "1 -2");
    let solution = Solver::new().solve(&p).unwrap();
    assert_eq!(solution.status, SolutionStatus::Unbounded);
    assert_eq!(solution.to_string(), "Solution is unbounded\n");
    assert!(solution.values.is_empty());
    assert!(solution.objective_value.is_none());

    let dual = Solver::new().with_path(Path::Dual).solve(&p).unwrap();
    assert_eq!(dual.status, SolutionStatus::Unbounded);
}

#[test]
fn free_variable_takes_negative_value() {
    init_logger();
    let mut p = problem(1, &[("1", Relation::Ge, "-3")], "1");
    p.declare_free(0).unwrap();

    for path in [Path::Auto, Path::Primal, Path::Dual] {
        let solution = Solver::new().with_path(path).solve(&p).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal, "{path}");
        assert_eq!(solution.values, row("-3"), "{path}");
        assert_eq!(solution.objective_value, Some(r("-3")), "{path}");
    }

    let mut unconstrained = Problem::new(1);
    unconstrained.set_objective(row("1")).unwrap();
    unconstrained.declare_free(0).unwrap();
    let solution = Solver::new().solve(&unconstrained).unwrap();
    assert_eq!(solution.status, SolutionStatus::Unbounded);
}

#[test]
fn solving_twice_gives_the_same_answer() {
    let p = problem(
        3,
        &[
            ("1 1 1", Relation::Eq, "10"),
            ("2 -1 0", Relation::Ge, "1/2"),
            ("0 3 -1", Relation::Le, "7/3"),
        ],
        "3 -1 2",
    );
    let before = p.clone();
    let solver = Solver::new();
    let first = solver.solve(&p).unwrap();
    let second = solver.solve(&p).unwrap();
    assert_eq!(first, second);
    assert_eq!(p, before);
}

#[test]
fn optimum_satisfies_constraints_exactly() {
    init_logger();
    let p = problem(
        3,
        &[
            ("1 1 1", Relation::Eq, "10"),
            ("2 -1 0", Relation::Ge, "1/2"),
            ("0 3 -1", Relation::Le, "7/3"),
            ("1/3 0 1/7", Relation::Le, "3"),
        ],
        "3 -1 2",
    );
    for path in [Path::Primal, Path::Dual] {
        let solution = Solver::new().with_path(path).solve(&p).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal, "{path}");
        assert!(p.violated_constraints(&solution.values).is_empty(), "{path}");
        assert_eq!(
            solution.objective_value,
            Some(p.objective_value(&solution.values)),
            "{path}"
        );
    }
}

#[test]
fn sample_four_by_four() {
    init_logger();
    let p = problem(
        4,
        &[
            ("10 5 -5 12", Relation::Le, "200"),
            ("8 9 5 1", Relation::Le, "664"),
            ("9 6 4 7", Relation::Le, "668"),
            ("35 12 12 54", Relation::Le, "346"),
        ],
        "-564 -986 -32 -8",
    );
    let solution = Solver::new().solve(&p).unwrap();
    assert_eq!(solution.objective_value, Some(r("-85289/3")));
    assert_eq!(solution.values, row("0 173/6 0 0"));
    assert!(p.violated_constraints(&solution.values).is_empty());
}

#[test]
fn sample_three_variables() {
    init_logger();
    let p = problem(
        3,
        &[
            ("8 6 -2", Relation::Le, "65"),
            ("1 -2 4", Relation::Le, "26"),
            ("0 2 3", Relation::Le, "59"),
            ("-2 6 0", Relation::Le, "23"),
        ],
        "-95 -84 -6",
    );
    let solution = Solver::new().solve(&p).unwrap();
    assert_eq!(solution.objective_value, Some(r("-65965/61")));
    assert_eq!(solution.values, row("353/61 703/122 484/61"));
}

#[test]
fn sample_infeasible() {
    let p = problem(
        3,
        &[("1 1 6", Relation::Le, "5"), ("-1 -1 8", Relation::Le, "-6")],
        "-1 2 3",
    );
    assert!(!Solver::new().check_feasibility(&p).unwrap().is_feasible());
    assert_eq!(Solver::new().solve(&p).unwrap().status, SolutionStatus::Infeasible);
}

#[test]
fn sample_exponential() {
    init_logger();
    let rows = [
        "1 0 0 0 0 0 0 0 0 0",
        "4 1 0 0 0 0 0 0 0 0",
        "8 4 1 0 0 0 0 0 0 0",
        "16 8 4 1 0 0 0 0 0 0",
        "32 16 8 4 1 0 0 0 0 0",
        "64 32 16 8 4 1 0 0 0 0",
        "128 64 32 16 8 4 1 0 0 0",
        "256 128 64 32 16 8 4 1 0 0",
        "512 256 128 64 32 16 8 4 1 0",
        "1024 512 256 128 64 32 16 8 4 1",
    ];
    let rhs = ["5", "25", "125", "625", "3125", "15625", "78125", "390625", "1953125", "9765625"];
    let constraints: Vec<_> = rows.iter().zip(rhs).map(|(c, b)| (*c, Relation::Le, b)).collect();
    let p = problem(10, &constraints, "-512 -256 -128 -64 -32 -16 -8 -4 -2 -1");

    let solution = Solver::new().solve(&p).unwrap();
    assert_eq!(solution.objective_value, Some(r("-9765625")));
    assert_eq!(solution.values, row("0 0 0 0 0 0 0 0 0 9765625"));
}
