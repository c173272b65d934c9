//! End to end reconstruction with a scripted solver.

use std::collections::HashSet;

use rust_projective_sfm::config::LocalSelectConfig;
use rust_projective_sfm::graph::AssociatedIndex;
use rust_projective_sfm::scene::SceneView;
use rust_projective_sfm::{
    CameraMatrix, LocalNeighborhoodSelector, Motion, MotionId, PairwiseGraph,
    ProjectiveReconstruction, ProjectiveSolver, ReconstructionConfig, ReconstructionError,
    SceneWorkingGraph, ViewId,
};

fn camera(view: ViewId) -> CameraMatrix {
    let mut p = CameraMatrix::identity();
    p[(0, 3)] = view.index() as f64;
    p[(1, 3)] = 1.0;
    p
}

/// Records every call and fails the views it is told to.
#[derive(Default)]
struct ScriptedSolver {
    fail: HashSet<ViewId>,
    bootstrap: Vec<ViewId>,
    attempts: Vec<ViewId>,
    /// Scene size when each attempt was made.
    scene_sizes: Vec<usize>,
    saved: Vec<ViewId>,
}

impl ProjectiveSolver for ScriptedSolver {
    type Lookup = ();

    fn initialize_scene(
        &mut self,
        _db: &(),
        graph: &PairwiseGraph,
        seed: ViewId,
        common: &[usize],
        motions: &[MotionId],
    ) -> Option<Vec<(ViewId, CameraMatrix)>> {
        assert!(common.len() >= 6);
        let mut views = vec![seed];
        views.extend(motions.iter().map(|&m| graph.motion(m).other(seed)));
        self.bootstrap = views.clone();
        Some(views.into_iter().map(|v| (v, camera(v))).collect())
    }

    fn expand_by_one_view(
        &mut self,
        _db: &(),
        _graph: &PairwiseGraph,
        working: &SceneWorkingGraph,
        view: ViewId,
    ) -> Option<CameraMatrix> {
        assert!(!working.is_known(view));
        self.attempts.push(view);
        self.scene_sizes.push(working.num_views());
        (!self.fail.contains(&view)).then(|| camera(view))
    }

    fn save_inliers(&mut self, entry: &mut SceneView) {
        self.saved.push(entry.view);
        entry.inliers.views = vec![entry.view];
        entry.inliers.observations = vec![(0..10).collect()];
    }
}

fn shared_features(graph: &mut PairwiseGraph, a: ViewId, b: ViewId, count_f: usize) {
    let m = graph.connect(a, b, true, count_f, 0).unwrap();
    graph
        .set_inliers(m, (0..10).map(|i| AssociatedIndex::new(i, i)).collect())
        .unwrap();
}

/// n x n grid, 4-connected, with uneven scores.
fn grid(n: usize) -> (PairwiseGraph, Vec<ViewId>) {
    let mut graph = PairwiseGraph::new();
    let views: Vec<ViewId> = (0..n * n)
        .map(|i| graph.create_view(format!("grid_{}", i), 500).unwrap())
        .collect();
    for r in 0..n {
        for c in 0..n {
            let i = r * n + c;
            if c + 1 < n {
                shared_features(&mut graph, views[i], views[i + 1], 50 + (i * 17) % 40);
            }
            if r + 1 < n {
                shared_features(&mut graph, views[i], views[i + n], 50 + (i * 11) % 40);
            }
        }
    }
    (graph, views)
}

fn by_count(m: &Motion) -> f64 {
    m.count_f as f64
}

fn reconstruction(solver: ScriptedSolver) -> ProjectiveReconstruction<ScriptedSolver, fn(&Motion) -> f64> {
    ProjectiveReconstruction::with_scorer(
        solver,
        by_count as fn(&Motion) -> f64,
        ReconstructionConfig::default(),
    )
}

#[test]
fn test_isolated_view_fails() {
    let mut graph = PairwiseGraph::new();
    graph.create_view("alone", 300).unwrap();

    let mut recon = ProjectiveReconstruction::new(ScriptedSolver::default());
    assert!(matches!(
        recon.process(&(), &graph),
        Err(ReconstructionError::NoSeeds)
    ));
    assert!(recon.solver().attempts.is_empty());
}

#[test]
fn test_four_cycle_is_fully_resolved() {
    let mut graph = PairwiseGraph::new();
    let a = graph.create_view("A", 100).unwrap();
    let b = graph.create_view("B", 100).unwrap();
    let c = graph.create_view("C", 100).unwrap();
    let d = graph.create_view("D", 100).unwrap();
    for (x, y) in [(a, b), (b, c), (c, d), (d, a)] {
        shared_features(&mut graph, x, y, 40);
    }

    let mut recon = reconstruction(ScriptedSolver::default());
    let summary = recon.process(&(), &graph).unwrap();

    assert_eq!(summary.seed, a);
    assert_eq!(recon.solver().bootstrap, vec![a, b, d]);
    // C was the only open view after the bootstrap
    assert_eq!(recon.solver().attempts, vec![c]);
    assert_eq!(recon.solver().scene_sizes, vec![3]);
    assert_eq!(summary.expanded, vec![c]);
    assert_eq!(recon.work_graph().num_views(), 4);
    assert!(summary.abandoned.is_empty());
}

#[test]
fn test_grid_views_resolved_once() {
    let (graph, views) = grid(5);

    let mut recon = reconstruction(ScriptedSolver::default());
    let summary = recon.process(&(), &graph).unwrap();

    assert_eq!(summary.num_resolved(), views.len());
    let resolved: HashSet<ViewId> = recon.work_graph().view_ids().into_iter().collect();
    assert_eq!(resolved.len(), recon.work_graph().num_views());

    // cameras are the ones the solver returned
    for entry in recon.work_graph().views() {
        assert_eq!(entry.projective(), &camera(entry.view));
    }

    // inliers saved for the seed and every expanded view
    let saved = &recon.solver().saved;
    assert_eq!(saved.len(), 1 + summary.expanded.len());
    assert_eq!(saved[0], summary.seed);

    // the scene only ever grows by one view per attempt
    for pair in recon.solver().scene_sizes.windows(2) {
        assert_eq!(pair[1], pair[0] + 1);
    }
}

#[test]
fn test_rejected_views_are_never_retried() {
    let (graph, views) = grid(5);

    // fail a few interior views so that their neighbors stay reachable
    let mut solver = ScriptedSolver::default();
    for i in [7, 12, 18] {
        solver.fail.insert(views[i]);
    }
    let mut recon = reconstruction(solver);
    let summary = recon.process(&(), &graph).unwrap();

    let attempts = &recon.solver().attempts;
    let unique: HashSet<&ViewId> = attempts.iter().collect();
    assert_eq!(unique.len(), attempts.len());

    for view in &summary.rejected {
        assert!(!recon.work_graph().is_known(*view));
        assert!(recon.explored().contains(view));
    }
    for view in recon.work_graph().view_ids() {
        assert!(recon.explored().contains(&view));
    }
    assert_eq!(
        summary.num_resolved() + summary.rejected.len() + summary.abandoned.len(),
        recon.explored().len()
    );
}

#[test]
fn test_other_component_is_untouched() {
    let mut graph = PairwiseGraph::new();
    let v: Vec<ViewId> = (0..6)
        .map(|i| graph.create_view(format!("v{}", i), 100).unwrap())
        .collect();
    shared_features(&mut graph, v[0], v[1], 90);
    shared_features(&mut graph, v[1], v[2], 90);
    shared_features(&mut graph, v[2], v[3], 90);
    // weaker, disconnected pair
    shared_features(&mut graph, v[4], v[5], 60);

    let mut recon = reconstruction(ScriptedSolver::default());
    let summary = recon.process(&(), &graph).unwrap();

    assert_eq!(summary.num_resolved(), 4);
    assert!(!recon.explored().contains(&v[4]));
    assert!(!recon.explored().contains(&v[5]));
}

#[test]
fn test_non_3d_motion_does_not_open_views() {
    let mut graph = PairwiseGraph::new();
    let v: Vec<ViewId> = (0..3)
        .map(|i| graph.create_view(format!("v{}", i), 100).unwrap())
        .collect();
    shared_features(&mut graph, v[0], v[1], 90);
    graph.connect(v[1], v[2], false, 200, 190).unwrap();

    let mut recon = reconstruction(ScriptedSolver::default());
    let summary = recon.process(&(), &graph).unwrap();

    assert_eq!(summary.num_resolved(), 2);
    assert!(recon.solver().attempts.is_empty());
    assert!(!recon.explored().contains(&v[2]));
}

#[test]
fn test_local_selection_over_reconstruction() {
    let (graph, _) = grid(5);
    let mut recon = reconstruction(ScriptedSolver::default());
    recon.process(&(), &graph).unwrap();

    let selector = LocalNeighborhoodSelector::new(
        LocalSelectConfig {
            max_views: 6,
            ..Default::default()
        },
        by_count as fn(&Motion) -> f64,
    );
    for target in recon.work_graph().view_ids() {
        let local = selector.select(&graph, recon.work_graph(), target).unwrap();
        assert!(local.num_views() <= 6);
        assert_eq!(local.view_ids()[0], target);

        // entries are copies of the full scene
        for entry in local.views() {
            let source = recon.work_graph().lookup_view(entry.view).unwrap();
            assert_eq!(entry.projective(), source.projective());
            assert_eq!(entry.inliers, source.inliers);
        }
    }
}
