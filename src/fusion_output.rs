//! Fusion report output
//!

use std::fs::File;
use std::io::{BufWriter, Write};

use camino::Utf8Path;
use log::info;
use serde::Serialize;
use simple_error::{SimpleResult, try_with};

use crate::component_tree::NodeIndex;
use crate::filenames::{FUSION_JSON_FILENAME, FUSION_TABLE_FILENAME};
use crate::gene::{gene_set_accessions, gene_set_label};
use crate::model::Model;

pub fn log_fusion_summary(model: &Model) {
    if model.fusions.is_empty() {
        info!("No fusion events found");
        return;
    }
    for fusion in model.fusions.iter() {
        info!(
            "Fusion {}: components {} + {} -> {}, {} formations with {} points",
            fusion.index,
            fusion.component_a,
            fusion.component_b,
            fusion.component_c,
            fusion.formations.len(),
            fusion.point_count()
        );
    }
}

fn write_fusion_table_impl(f: &mut impl Write, model: &Model) -> std::io::Result<()> {
    writeln!(
        f,
        "#fusion\tcomponent_a\tcomponent_b\tcomponent_c\tformation\tpertinent_inner\tpoint\tpoint_component\tpoint_node\touter_genes"
    )?;
    for fusion in model.fusions.iter() {
        for formation in fusion.formations.iter() {
            let pertinent_inner = gene_set_label(&model.genes, &formation.pertinent_inner);
            for point in formation.points.iter() {
                writeln!(
                    f,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    fusion.index,
                    fusion.component_a,
                    fusion.component_b,
                    fusion.component_c,
                    formation.index,
                    pertinent_inner,
                    point.index,
                    point.component,
                    point.node,
                    gene_set_label(&model.genes, &point.outer_genes)
                )?;
            }
        }
    }
    Ok(())
}

/// Write a tab-separated table with one row per fusion point
pub fn write_fusion_table(output_dir: &Utf8Path, model: &Model) -> SimpleResult<()> {
    let filename = output_dir.join(FUSION_TABLE_FILENAME);

    info!("Writing fusion table to file: '{filename}'");

    let f = try_with!(
        File::create(&filename),
        "Unable to create fusion table file: '{}'",
        filename
    );
    let mut f = BufWriter::new(f);
    try_with!(
        write_fusion_table_impl(&mut f, model).and_then(|_| f.flush()),
        "Unable to write fusion table file: '{}'",
        filename
    );
    Ok(())
}

#[derive(Serialize)]
struct PointReport {
    index: usize,
    component: usize,
    node: NodeIndex,
    outer_genes: Vec<String>,
}

#[derive(Serialize)]
struct FormationReport {
    pertinent_inner: Vec<String>,
    points: Vec<PointReport>,
}

#[derive(Serialize)]
struct FusionReport {
    index: usize,
    component_a: usize,
    component_b: usize,
    component_c: usize,
    formations: Vec<FormationReport>,
}

fn get_fusion_reports(model: &Model) -> Vec<FusionReport> {
    let genes = &model.genes;
    model
        .fusions
        .iter()
        .map(|fusion| FusionReport {
            index: fusion.index,
            component_a: fusion.component_a,
            component_b: fusion.component_b,
            component_c: fusion.component_c,
            formations: fusion
                .formations
                .iter()
                .map(|formation| FormationReport {
                    pertinent_inner: gene_set_accessions(genes, &formation.pertinent_inner),
                    points: formation
                        .points
                        .iter()
                        .map(|point| PointReport {
                            index: point.index,
                            component: point.component,
                            node: point.node,
                            outer_genes: gene_set_accessions(genes, &point.outer_genes),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

/// Write all fusions, with genes given by accession, in json format
pub fn write_fusion_json(output_dir: &Utf8Path, model: &Model) -> SimpleResult<()> {
    let filename = output_dir.join(FUSION_JSON_FILENAME);

    info!("Writing fusion json to file: '{filename}'");

    let f = try_with!(
        File::create(&filename),
        "Unable to create fusion json file: '{}'",
        filename
    );
    try_with!(
        serde_json::to_writer_pretty(&f, &get_fusion_reports(model)),
        "Unable to write fusion json file: '{}'",
        filename
    );
    Ok(())
}
