use anyhow::{bail, Result};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rust_projective_sfm::io::graph_csv::load_pairwise_graph;
use rust_projective_sfm::{DefaultMotionScore, ReconstructionConfig, SeedSelector};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(graph_dir) = args.next() else {
        bail!("usage: projective-sfm <graph_dir> [config.yaml]");
    };
    let config = match args.next() {
        Some(path) => ReconstructionConfig::from_yaml_file(&path)?,
        None => ReconstructionConfig::default(),
    };

    debug!("Effective config:\n{}", config.to_yaml_string()?);

    println!("Loading pairwise graph from: {}", graph_dir);
    let graph = load_pairwise_graph(&graph_dir)?;
    let num_3d = graph.motions().filter(|m| m.is_3d).count();
    println!(
        "Loaded {} views, {} motions ({} with 3D structure)",
        graph.num_views(),
        graph.num_motions(),
        num_3d
    );

    let selector = SeedSelector::new(config.seed.clone(), DefaultMotionScore);
    let seeds = selector.select(&graph);
    if seeds.is_empty() {
        println!("No seeds: no view has a 3D motion");
        return Ok(());
    }

    println!("{} seeds:", seeds.len());
    for seed in &seeds {
        let motions: Vec<String> = seed
            .motions
            .iter()
            .map(|&m| graph.view(graph.motion(m).other(seed.seed)).name.clone())
            .collect();
        println!(
            "  {:<24} score {:>10.1}  with [{}]",
            graph.view(seed.seed).name,
            seed.score,
            motions.join(", ")
        );
    }

    let best = &seeds[0];
    let reachable = graph.reachable_3d(best.seed);
    println!(
        "{} of {} views reachable from {} through 3D motions",
        reachable.len(),
        graph.num_views(),
        graph.view(best.seed).name
    );

    Ok(())
}
