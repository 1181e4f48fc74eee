use std::cell::RefCell;
use std::collections::HashSet;

use super::{StalledAugmenter, quick_config, small_dataset};
use crate::nn::RoundArtifact;
use crate::nn::model_io::list_round_artifacts;
use crate::round_loop::report::{RUN_PERF_FILE, STEP_PERF_FILE};
use crate::round_loop::{Phase, PhaseEvent, RoundLoop, RunConfig};

#[test]
fn test_patience_stops_after_stalled_rounds() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        total_step: 10,
        patience: 2,
        ..quick_config(dir.path())
    };
    let mut rounds = RoundLoop::new(config)
        .unwrap()
        .with_augmenter(Box::new(StalledAugmenter));
    let outcome = rounds.run_once(0, &small_dataset()).unwrap();

    assert_eq!(outcome.history.num_student_rounds(), 2);
    assert_eq!(outcome.history.len(), 3);
    assert!(outcome.history.records()[1..].iter().all(|r| r.new_edges == 0));
}

#[test]
fn test_observer_sees_phases_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let events = RefCell::new(Vec::new());
    let config = RunConfig {
        total_step: 1,
        ..quick_config(dir.path())
    };
    let mut rounds = RoundLoop::new(config)
        .unwrap()
        .with_observer(|e: &PhaseEvent| events.borrow_mut().push(*e));
    rounds.run_once(0, &small_dataset()).unwrap();
    drop(rounds);

    let phases: Vec<(usize, Phase)> = events.into_inner().iter().map(|e| (e.round, e.phase)).collect();
    assert_eq!(
        phases,
        vec![
            (0, Phase::BaseTraining),
            (1, Phase::TeacherSelect),
            (1, Phase::StudentTraining),
            (1, Phase::Augment),
            (1, Phase::Ensemble),
            (1, Phase::StopCheck),
        ]
    );
}

fn undirected(edges: &[(usize, usize)]) -> HashSet<(usize, usize)> {
    edges.iter().map(|&(s, d)| (s.min(d), s.max(d))).collect()
}

#[test]
fn test_topology_grows_monotonically_and_stays_symmetric() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        keep_models: true,
        use_metric: true,
        eval_new_adj: true,
        ..quick_config(dir.path())
    };
    let mut rounds = RoundLoop::new(config).unwrap();
    let outcome = rounds.run_once(0, &small_dataset()).unwrap();

    let counts: Vec<usize> = outcome.history.records().iter().map(|r| r.edge_count).collect();
    assert!(counts.windows(2).all(|w| w[1] >= w[0]), "{counts:?}");

    let run_dir = rounds.run_dir(0);
    let artifacts = list_round_artifacts(&run_dir).unwrap();
    assert_eq!(artifacts.len(), outcome.history.len());

    let mut previous: Option<HashSet<(usize, usize)>> = None;
    for (_, path) in artifacts {
        let artifact = RoundArtifact::load(&path).unwrap();
        let directed: HashSet<_> = artifact.edge_list.iter().copied().collect();
        assert!(directed.iter().all(|&(s, d)| directed.contains(&(d, s))));

        let current = undirected(&artifact.edge_list);
        if let Some(prev) = &previous {
            assert!(prev.is_subset(&current));
        }
        previous = Some(current);
    }

    for record in outcome.history.records() {
        for a in [Some(record.accuracy), record.ensembled].into_iter().flatten() {
            assert!((0.0..=1.0).contains(&a.val));
            assert!((0.0..=1.0).contains(&a.test));
        }
    }
    if let Some(p) = outcome.new_edge_precision {
        assert!((0.0..=1.0).contains(&p));
    }
}

#[test]
fn test_run_all_writes_reports_and_removes_models() {
    let dir = tempfile::tempdir().unwrap();
    let exp_dir = dir.path().join("exp");
    let config = RunConfig {
        total_run: 2,
        total_step: 1,
        ..quick_config(&exp_dir)
    };
    let mut rounds = RoundLoop::new(config).unwrap();
    let summary = rounds.run_all(&small_dataset()).unwrap();

    assert_eq!(summary.outcomes.len(), 2);
    assert!(summary.failed_runs.is_empty());
    assert!(exp_dir.join(RUN_PERF_FILE).exists());
    for run in 0..2 {
        let run_dir = rounds.run_dir(run);
        assert!(run_dir.join(STEP_PERF_FILE).exists());
        assert!(list_round_artifacts(&run_dir).unwrap().is_empty());
    }
}

#[test]
fn test_diverging_runs_are_reported_as_failed() {
    let dir = tempfile::tempdir().unwrap();
    // 蒸馏项权重为无穷大，第 1 轮的损失必然非有限
    let config = RunConfig {
        total_run: 2,
        lambda1: f32::INFINITY,
        ..quick_config(dir.path())
    };
    let summary = RoundLoop::new(config)
        .unwrap()
        .run_all(&small_dataset())
        .unwrap();
    assert!(summary.outcomes.is_empty());
    assert_eq!(summary.failed_runs, vec![0, 1]);
    // 发散前已保存的基线模型同样要清理
    for run in 0..2 {
        let run_dir = dir.path().join(format!("run_{run}"));
        assert!(list_round_artifacts(&run_dir).unwrap().is_empty());
    }
}
