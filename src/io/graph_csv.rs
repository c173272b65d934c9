//! Load a pairwise graph from a directory of CSV files.
//!
//! ```text
//! views.csv         name, total_observations
//! motions.csv       src_name, dst_name, is_3d, count_f, count_h[, f00 .. f22]
//! associations.csv  motion_row, src_feature, dst_feature      (optional)
//! ```
//!
//! No header rows; lines starting with `#` are comments. `motion_row` is the
//! zero-based row of the motion in `motions.csv`. The optional nine trailing
//! values of a motion are its fundamental matrix in row-major order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use nalgebra::Matrix3;
use tracing::{info, warn};

use crate::graph::{AssociatedIndex, MotionId, PairwiseGraph};

/// Read `views.csv`, `motions.csv` and, if present, `associations.csv`.
pub fn load_pairwise_graph<P: AsRef<Path>>(root: P) -> Result<PairwiseGraph> {
    let root = root.as_ref();
    let mut graph = PairwiseGraph::new();

    load_views(&mut graph, root.join("views.csv"))?;
    load_motions(&mut graph, root.join("motions.csv"))?;

    let assoc_path = root.join("associations.csv");
    if assoc_path.exists() {
        load_associations(&mut graph, assoc_path)?;
    } else {
        warn!(
            "No associations.csv in {}, motions have no inliers",
            root.display()
        );
    }

    info!(
        "Loaded pairwise graph with {} views and {} motions",
        graph.num_views(),
        graph.num_motions()
    );
    Ok(graph)
}

fn records(csv_path: &Path) -> Result<Vec<StringRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open {}", csv_path.display()))?;

    let mut out = Vec::new();
    for rec in rdr.records() {
        out.push(rec.with_context(|| format!("Malformed row in {}", csv_path.display()))?);
    }
    Ok(out)
}

fn load_views(graph: &mut PairwiseGraph, csv_path: PathBuf) -> Result<()> {
    for (row, rec) in records(&csv_path)?.iter().enumerate() {
        if rec.len() < 2 {
            bail!("{} row {}: expected 2 columns", csv_path.display(), row);
        }
        let name = rec[0].trim();
        let total: usize = rec[1]
            .trim()
            .parse()
            .with_context(|| format!("{} row {}: bad observation count", csv_path.display(), row))?;
        graph.create_view(name, total)?;
    }
    Ok(())
}

fn load_motions(graph: &mut PairwiseGraph, csv_path: PathBuf) -> Result<()> {
    for (row, rec) in records(&csv_path)?.iter().enumerate() {
        if rec.len() < 5 {
            bail!("{} row {}: expected at least 5 columns", csv_path.display(), row);
        }
        let src = graph
            .lookup(rec[0].trim())
            .with_context(|| format!("{} row {}: unknown view {}", csv_path.display(), row, &rec[0]))?;
        let dst = graph
            .lookup(rec[1].trim())
            .with_context(|| format!("{} row {}: unknown view {}", csv_path.display(), row, &rec[1]))?;
        let is_3d = parse_bool(rec[2].trim())
            .with_context(|| format!("{} row {}: bad is_3d flag", csv_path.display(), row))?;
        let count_f: usize = rec[3]
            .trim()
            .parse()
            .with_context(|| format!("{} row {}: bad count_f", csv_path.display(), row))?;
        let count_h: usize = rec[4]
            .trim()
            .parse()
            .with_context(|| format!("{} row {}: bad count_h", csv_path.display(), row))?;

        let id = graph.connect(src, dst, is_3d, count_f, count_h)?;

        match rec.len() {
            5 => {}
            14 => {
                let mut values = [0.0f64; 9];
                for (i, v) in values.iter_mut().enumerate() {
                    *v = rec[5 + i].trim().parse().with_context(|| {
                        format!("{} row {}: bad fundamental entry {}", csv_path.display(), row, i)
                    })?;
                }
                if let Some(motion) = graph.motion_mut(id) {
                    motion.fundamental = Matrix3::from_row_slice(&values);
                }
            }
            n => bail!(
                "{} row {}: expected 5 or 14 columns, got {}",
                csv_path.display(),
                row,
                n
            ),
        }
    }
    Ok(())
}

fn load_associations(graph: &mut PairwiseGraph, csv_path: PathBuf) -> Result<()> {
    let mut by_motion: HashMap<usize, Vec<AssociatedIndex>> = HashMap::new();
    for (row, rec) in records(&csv_path)?.iter().enumerate() {
        if rec.len() < 3 {
            bail!("{} row {}: expected 3 columns", csv_path.display(), row);
        }
        let parse = |col: usize| -> Result<usize> {
            rec[col]
                .trim()
                .parse()
                .with_context(|| format!("{} row {}: bad value in column {}", csv_path.display(), row, col))
        };
        let motion = parse(0)?;
        let src = parse(1)?;
        let dst = parse(2)?;
        if motion >= graph.num_motions() {
            bail!(
                "{} row {}: motion row {} out of range",
                csv_path.display(),
                row,
                motion
            );
        }
        by_motion
            .entry(motion)
            .or_default()
            .push(AssociatedIndex::new(src, dst));
    }

    for (motion, inliers) in by_motion {
        graph.set_inliers(MotionId::new(motion as u32), inliers)?;
    }
    Ok(())
}

fn parse_bool(s: &str) -> Result<bool> {
    match s {
        "1" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "false" | "FALSE" | "False" => Ok(false),
        _ => bail!("expected a boolean, got {:?}", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_load_graph() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "views.csv", "# name,total\nimg0,120\nimg1,95\nimg2,80\n");
        write(
            dir.path(),
            "motions.csv",
            "img0,img1,true,60,10\nimg1,img2,0,40,35,0,0,0,0,0,-1,0,1,0\n",
        );
        write(dir.path(), "associations.csv", "0,1,2\n0,3,4\n1,5,6\n");

        let graph = load_pairwise_graph(dir.path()).unwrap();
        assert_eq!(graph.num_views(), 3);
        assert_eq!(graph.num_motions(), 2);

        let img1 = graph.lookup("img1").unwrap();
        assert_eq!(graph.view(img1).total_observations, 95);

        let m0 = graph.motion(MotionId::new(0));
        assert!(m0.is_3d);
        assert_eq!(m0.inliers, vec![AssociatedIndex::new(1, 2), AssociatedIndex::new(3, 4)]);

        let m1 = graph.motion(MotionId::new(1));
        assert!(!m1.is_3d);
        assert_eq!(m1.count_h, 35);
        assert_eq!(m1.fundamental[(1, 2)], -1.0);
        assert_eq!(m1.fundamental[(2, 1)], 1.0);
    }

    #[test]
    fn test_associations_are_optional() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "views.csv", "a,10\nb,10\n");
        write(dir.path(), "motions.csv", "a,b,1,5,1\n");

        let graph = load_pairwise_graph(dir.path()).unwrap();
        assert!(graph.motion(MotionId::new(0)).inliers.is_empty());
    }

    #[test]
    fn test_unknown_view_in_motion() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "views.csv", "a,10\n");
        write(dir.path(), "motions.csv", "a,missing,1,5,1\n");

        assert!(load_pairwise_graph(dir.path()).is_err());
    }

    #[test]
    fn test_partial_fundamental_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "views.csv", "a,10\nb,10\n");
        write(dir.path(), "motions.csv", "a,b,1,5,1,0.5,0.1,0.2\n");

        let err = load_pairwise_graph(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("expected 5 or 14 columns, got 8"));
    }

    #[test]
    fn test_bad_number_names_row() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "views.csv", "a,10\nb,10\n");
        write(dir.path(), "motions.csv", "a,b,1,5,1\n");
        write(dir.path(), "associations.csv", "0,1,1\n0,x,2\n");

        let err = load_pairwise_graph(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("row 1: bad value in column 1"));
    }

    #[test]
    fn test_association_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "views.csv", "a,10\nb,10\n");
        write(dir.path(), "motions.csv", "a,b,1,5,1\n");
        write(dir.path(), "associations.csv", "3,0,0\n");

        assert!(load_pairwise_graph(dir.path()).is_err());
    }
}
