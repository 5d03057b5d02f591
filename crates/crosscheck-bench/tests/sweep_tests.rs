// Dweve Crosscheck - Correctness and benchmark harness for concurrent programs
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Sweep engine tests driven by scripted program output.

use crosscheck_bench::{
    catalog, BenchError, Grid, Parameter, ParameterTuple, RowLabelRule, SweepDefinition,
    SweepEngine, SweepInput, SweepSettings,
};
use crosscheck_core::{FailureKind, Invocation, ProgramKind, ProgramUnderTest};
use crosscheck_test::{Response, ScriptedRunner};
use proptest::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ===== Helpers =====

fn flag(invocation: &Invocation, name: &str) -> usize {
    let prefix = format!("--{}=", name);
    invocation
        .args
        .iter()
        .find_map(|a| a.strip_prefix(&prefix))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn hasher() -> ProgramUnderTest {
    ProgramUnderTest::file_hasher(["hasher"])
}

fn settings(dir: &TempDir) -> SweepSettings {
    SweepSettings::default().with_timings_dir(dir.path().join("timings"))
}

fn data_worker_sweep(inputs: &[&str], data_workers: &[usize]) -> SweepDefinition {
    SweepDefinition {
        name: "data-workers".to_string(),
        program: ProgramKind::FileHasher,
        inputs: inputs.iter().map(|i| SweepInput::new(*i)).collect(),
        base: ParameterTuple::new().with(Parameter::HashWorkers, 32usize),
        grid: Grid::Explicit {
            points: data_workers
                .iter()
                .map(|&d| ParameterTuple::new().with(Parameter::DataWorkers, d))
                .collect(),
        },
        columns: vec![Parameter::HashWorkers, Parameter::DataWorkers],
        repetitions: Some(3),
        metric: "hashGroupTime".to_string(),
        row_label: RowLabelRule::Plain,
        table: "data_workers".to_string(),
        baseline: None,
    }
}

/// Reports `hashGroupTime` as ten times the data worker count.
fn scaled_runner() -> ScriptedRunner {
    ScriptedRunner::from_fn(|inv| {
        Response::stdout(format!(
            "hashGroupTime: {}µs\n1: 0\n",
            flag(inv, "data-workers") * 10
        ))
    })
}

fn table_lines(dir: &TempDir, table: &str) -> Vec<String> {
    fs::read_to_string(dir.path().join("timings").join(table))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

// ===== Tests =====

#[test]
fn test_rows_follow_input_major_order() {
    let dir = TempDir::new().unwrap();
    let runner = scaled_runner();
    let program = hasher();
    let engine = SweepEngine::new(&program, &runner, settings(&dir));

    let summary = engine
        .run_sweep(&data_worker_sweep(&["in/a.txt", "in/b.txt"], &[1, 4, 16]))
        .unwrap();

    assert!(summary.is_complete());
    assert_eq!(summary.rows.len(), 6);
    assert_eq!(runner.invocation_count(), 18);
    assert_eq!(
        table_lines(&dir, "data_workers.csv"),
        vec![
            "in/a.txt,32,1,10,0",
            "in/a.txt,32,4,40,0",
            "in/a.txt,32,16,160,0",
            "in/b.txt,32,1,10,0",
            "in/b.txt,32,4,40,0",
            "in/b.txt,32,16,160,0",
        ]
    );
}

#[test]
fn test_constant_samples_have_zero_deviation() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::always("hashTime: 10µs\n");
    let program = hasher();
    let engine = SweepEngine::new(&program, &runner, settings(&dir));
    let definition = SweepDefinition {
        grid: Grid::Explicit {
            points: vec![ParameterTuple::new()],
        },
        columns: vec![],
        repetitions: None,
        metric: "hashTime".to_string(),
        ..data_worker_sweep(&["in/a.txt"], &[])
    };

    let summary = engine.run_sweep(&definition).unwrap();

    assert_eq!(runner.invocation_count(), 20);
    assert_eq!(summary.rows[0].mean, 10.0);
    assert_eq!(summary.rows[0].std_dev, 0.0);
    assert_eq!(table_lines(&dir, "data_workers.csv"), vec!["in/a.txt,10,0"]);
}

#[test]
fn test_sample_deviation_of_varying_runs() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::new()
        .push_stdout("hashGroupTime: 2µs\n")
        .push_stdout("hashGroupTime: 4µs\n")
        .push_stdout("hashGroupTime: 6µs\n");
    let program = hasher();
    let engine = SweepEngine::new(&program, &runner, settings(&dir));

    let summary = engine
        .run_sweep(&data_worker_sweep(&["in/a.txt"], &[1]))
        .unwrap();

    assert_eq!(summary.rows[0].mean, 4.0);
    assert_eq!(summary.rows[0].std_dev, 2.0);
}

#[test]
fn test_missing_metric_skips_point_only() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::from_fn(|inv| {
        if flag(inv, "data-workers") == 4 {
            Response::stdout("hashTime: 3µs\n")
        } else {
            Response::stdout("hashGroupTime: 5µs\n")
        }
    });
    let program = hasher();
    let engine = SweepEngine::new(&program, &runner, settings(&dir));

    let summary = engine
        .run_sweep(&data_worker_sweep(&["in/a.txt"], &[1, 4, 16]))
        .unwrap();

    assert_eq!(summary.rows.len(), 2);
    assert_eq!(summary.failures.len(), 1);
    let failure = &summary.failures[0];
    assert_eq!(failure.kind, FailureKind::MetricNotFound);
    assert_eq!(failure.repetition, 1);
    assert!(failure.point.contains("data-workers=4"));
    // The failing point stops at its first repetition.
    assert_eq!(runner.invocation_count(), 3 + 1 + 3);
    assert_eq!(table_lines(&dir, "data_workers.csv").len(), 2);
}

#[test]
fn test_crashing_run_skips_point() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::new()
        .push_stdout("hashGroupTime: 5µs\n")
        .push(Response::failure(2, "fatal error: all goroutines are asleep"))
        .push_stdout("hashGroupTime: 5µs\n")
        .push_stdout("hashGroupTime: 5µs\n")
        .push_stdout("hashGroupTime: 5µs\n");
    let program = hasher();
    let engine = SweepEngine::new(&program, &runner, settings(&dir));

    let summary = engine
        .run_sweep(&data_worker_sweep(&["in/a.txt"], &[1, 2]))
        .unwrap();

    assert_eq!(summary.failures[0].kind, FailureKind::ProcessFailed);
    assert_eq!(summary.failures[0].repetition, 2);
    assert_eq!(summary.rows.len(), 1);
    assert_eq!(summary.rows[0].columns, vec!["32", "2"]);
}

#[test]
fn test_table_truncated_on_rerun() {
    let dir = TempDir::new().unwrap();
    let runner = scaled_runner();
    let program = hasher();
    let engine = SweepEngine::new(&program, &runner, settings(&dir));

    engine
        .run_sweep(&data_worker_sweep(&["in/a.txt"], &[1, 2]))
        .unwrap();
    engine
        .run_sweep(&data_worker_sweep(&["in/a.txt"], &[8]))
        .unwrap();

    assert_eq!(table_lines(&dir, "data_workers.csv"), vec!["in/a.txt,32,8,80,0"]);
}

#[test]
fn test_doubling_grid_over_real_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("five.txt");
    fs::write(&input, "1 2\n3 4\n5 6\n7 8\n9 10\n").unwrap();
    let runner = ScriptedRunner::from_fn(|inv| {
        Response::stdout(format!("hashTime: {}µs\n", 100 / flag(inv, "hash-workers")))
    });
    let program = hasher();
    let engine = SweepEngine::new(&program, &runner, settings(&dir));
    let definition = SweepDefinition {
        repetitions: Some(2),
        ..catalog::hash_times(vec![SweepInput::new(&input)])
    };

    let summary = engine.run_sweep(&definition).unwrap();

    let workers: Vec<&str> = summary.rows.iter().map(|r| r.columns[0].as_str()).collect();
    assert_eq!(workers, vec!["1", "2", "4", "5"]);
    assert_eq!(summary.rows[3].mean, 20.0);
    assert!(summary.table.ends_with("hash_times.csv"));
}

#[test]
fn test_empty_input_is_invalid_grid_and_keeps_table() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("empty.txt");
    fs::write(&input, "").unwrap();
    let timings = dir.path().join("timings");
    fs::create_dir_all(&timings).unwrap();
    fs::write(timings.join("hash_times.csv"), "previous,1,2,3\n").unwrap();

    let runner = ScriptedRunner::new();
    let program = hasher();
    let engine = SweepEngine::new(&program, &runner, settings(&dir));

    let err = engine
        .run_sweep(&catalog::hash_times(vec![SweepInput::new(&input)]))
        .unwrap_err();

    assert!(matches!(err, BenchError::InvalidGrid { .. }));
    assert_eq!(
        fs::read_to_string(timings.join("hash_times.csv")).unwrap(),
        "previous,1,2,3\n"
    );
    assert_eq!(runner.invocation_count(), 0);
}

#[test]
fn test_unbuffered_rows_get_suffix() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::always("hashGroupTime: 7µs\n");
    let program = hasher();
    let engine = SweepEngine::new(&program, &runner, settings(&dir));
    let definition = SweepDefinition {
        repetitions: Some(1),
        ..catalog::hash_group_times(vec![SweepInput::new("input/coarse.txt")], 32)
    };

    engine.run_sweep(&definition).unwrap();

    let lines = table_lines(&dir, "hash_group_times.csv");
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "input/coarse.txt,1,1,false,7,0");
    assert_eq!(lines[1], "input/coarse.txt-unbuffered,32,1,true,7,0");
    assert_eq!(lines[7], "input/coarse.txt,32,32,false,7,0");

    let first = &runner.invocations()[1];
    assert!(first.args.contains(&"--data-buffered=false".to_string()));
    assert!(first.args.contains(&"--data-use-channels=true".to_string()));
}

#[test]
fn test_nbody_sweep_invocations() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::always("overall: 1.5e+00\n");
    let program = ProgramUnderTest::nbody(["bin/nbody"]);
    let engine = SweepEngine::new(&program, &runner, settings(&dir));
    let definition = SweepDefinition {
        repetitions: Some(1),
        ..catalog::nbody_times(catalog::nbody_inputs(Path::new("input"))[..1].to_vec())
    };

    let summary = engine.run_sweep(&definition).unwrap();

    assert_eq!(
        table_lines(&dir, "nbody_times.csv"),
        vec![
            "input/nb-10.txt,sequential,1,1.5,0",
            "input/nb-10.txt,parallel,1,1.5,0",
            "input/nb-10.txt,parallel,2,1.5,0",
            "input/nb-10.txt,parallel,3,1.5,0",
            "input/nb-10.txt,parallel,4,1.5,0",
        ]
    );
    assert_eq!(summary.rows.len(), 5);

    let invocations = runner.invocations();
    assert_eq!(invocations[0].program, "bin/nbody");
    assert!(invocations[0].args.contains(&"1000000".to_string()));
    assert_eq!(invocations[4].program, "mpiexec");
    assert_eq!(invocations[4].args[..3], ["-n", "4", "bin/nbody"]);
}

#[test]
fn test_nbody_speedup_over_sequential() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::from_fn(|inv| {
        if inv.program == "mpiexec" {
            Response::stdout("overall: 2\n")
        } else {
            Response::stdout("overall: 8\n")
        }
    });
    let program = ProgramUnderTest::nbody(["bin/nbody"]);
    let engine = SweepEngine::new(&program, &runner, settings(&dir));
    let definition = SweepDefinition {
        repetitions: Some(1),
        ..catalog::nbody_times(catalog::nbody_inputs(Path::new("input"))[..2].to_vec())
    };

    let summary = engine.run_sweep(&definition).unwrap();

    assert_eq!(summary.speedups.len(), 8);
    assert!(summary.speedups.iter().all(|s| s.speedup == 4.0));
    assert_eq!(summary.speedups[0].input, Path::new("input/nb-10.txt"));
    assert_eq!(summary.speedups[0].point, "process-count=1 algorithm=parallel");
    assert_eq!(summary.speedups[4].input, Path::new("input/nb-100.txt"));
    assert_eq!(table_lines(&dir, "nbody_times.csv")[0], "input/nb-10.txt,sequential,1,8,0");
}

#[test]
fn test_no_speedup_without_baseline_row() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::from_fn(|inv| {
        if inv.program == "mpiexec" {
            Response::stdout("overall: 2\n")
        } else {
            Response::failure(1, "segfault")
        }
    });
    let program = ProgramUnderTest::nbody(["bin/nbody"]);
    let engine = SweepEngine::new(&program, &runner, settings(&dir));
    let definition = SweepDefinition {
        repetitions: Some(1),
        ..catalog::nbody_times(catalog::nbody_inputs(Path::new("input"))[..1].to_vec())
    };

    let summary = engine.run_sweep(&definition).unwrap();

    assert_eq!(summary.rows.len(), 4);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.speedups.is_empty());
}

#[test]
fn test_program_kind_must_match() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::new();
    let program = hasher();
    let engine = SweepEngine::new(&program, &runner, settings(&dir));

    let err = engine
        .run_sweep(&catalog::nbody_times(vec![]))
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::InvalidConfig);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn grid_produces_points_times_inputs(
        inputs in 1usize..4,
        workers in prop::collection::vec(1usize..64, 1..6),
    ) {
        let dir = TempDir::new().unwrap();
        let runner = scaled_runner();
        let program = hasher();
        let engine = SweepEngine::new(&program, &runner, settings(&dir));
        let names: Vec<String> = (0..inputs).map(|i| format!("in/{}.txt", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let definition = SweepDefinition {
            repetitions: Some(1),
            ..data_worker_sweep(&refs, &workers)
        };

        let summary = engine.run_sweep(&definition).unwrap();

        prop_assert_eq!(summary.rows.len(), inputs * workers.len());
        for (idx, row) in summary.rows.iter().enumerate() {
            prop_assert_eq!(&row.input, &names[idx / workers.len()]);
            prop_assert_eq!(&row.columns[1], &workers[idx % workers.len()].to_string());
        }
    }
}
