//! Built-in sample problems, in the problem-file format.

pub struct Sample {
    pub name: &'static str,
    pub description: &'static str,
    pub source: &'static str,
}

pub const SAMPLES: &[Sample] = &[
    Sample {
        name: "four-variables",
        description: "4 variables, 4 constraints, bounded optimum",
        source: "\
variables 4
minimize -564 -986 -32 -8
10 5 -5 12 <= 200
8 9 5 1 <= 664
9 6 4 7 <= 668
35 12 12 54 <= 346
",
    },
    Sample {
        name: "three-variables",
        description: "3 variables, 4 constraints, fractional optimum",
        source: "\
variables 3
minimize -95 -84 -6
8 6 -2 <= 65
1 -2 4 <= 26
0 2 3 <= 59
-2 6 0 <= 23
",
    },
    Sample {
        name: "unbounded",
        description: "objective decreases without bound",
        source: "\
variables 2
minimize 1 -2
1 0 <= 5
0 -1 <= 3
",
    },
    Sample {
        name: "infeasible",
        description: "no point satisfies both constraints",
        source: "\
variables 3
minimize -1 2 3
1 1 6 <= 5
-1 -1 8 <= -6
",
    },
    Sample {
        name: "exponential",
        description: "Klee-Minty cube in 10 dimensions",
        source: "\
variables 10
minimize -512 -256 -128 -64 -32 -16 -8 -4 -2 -1
1 0 0 0 0 0 0 0 0 0 <= 5
4 1 0 0 0 0 0 0 0 0 <= 25
8 4 1 0 0 0 0 0 0 0 <= 125
16 8 4 1 0 0 0 0 0 0 <= 625
32 16 8 4 1 0 0 0 0 0 <= 3125
64 32 16 8 4 1 0 0 0 0 <= 15625
128 64 32 16 8 4 1 0 0 0 <= 78125
256 128 64 32 16 8 4 1 0 0 <= 390625
512 256 128 64 32 16 8 4 1 0 <= 1953125
1024 512 256 128 64 32 16 8 4 1 <= 9765625
",
    },
];

pub fn sample(name: &str) -> Option<&'static Sample> {
    SAMPLES.iter().find(|s| s.name == name)
}
