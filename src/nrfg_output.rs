//! NRFG output
//!
//! The recombined grouping is written as nested json arrays of gene accessions and as a single
//! Newick-like line. Both forms wrap the top-level forest in one root group.
//!

use std::fs::File;
use std::io::{BufWriter, Write};

use camino::Utf8Path;
use log::info;
use serde_json::Value;
use simple_error::{SimpleResult, try_with};

use crate::create_nrfg::{EvidenceClass, Nrfg};
use crate::filenames::{NRFG_JSON_FILENAME, NRFG_NEWICK_FILENAME, SPLIT_TABLE_FILENAME};
use crate::gene::{Gene, gene_set_label};

fn write_split_table_impl(f: &mut impl Write, genes: &[Gene], nrfg: &Nrfg) -> std::io::Result<()> {
    writeln!(f, "#split\tsize\tfor\tagainst\tunused\tfrequency\taccepted")?;
    let accepted = nrfg.accepted_splits.iter().collect::<std::collections::BTreeSet<_>>();
    for evidence in nrfg.split_evidence.iter() {
        let frequency = match evidence.frequency() {
            Some(x) => format!("{x:.4}"),
            None => "NA".to_string(),
        };
        writeln!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            gene_set_label(genes, &evidence.split),
            evidence.split.len(),
            evidence.count(EvidenceClass::For),
            evidence.count(EvidenceClass::Against),
            evidence.count(EvidenceClass::Unused),
            frequency,
            accepted.contains(&evidence.split)
        )?;
    }
    Ok(())
}

/// Write every candidate split with its evidence counts and acceptance status
pub fn write_split_table(output_dir: &Utf8Path, genes: &[Gene], nrfg: &Nrfg) -> SimpleResult<()> {
    let filename = output_dir.join(SPLIT_TABLE_FILENAME);

    info!("Writing split table to file: '{filename}'");

    let f = try_with!(
        File::create(&filename),
        "Unable to create split table file: '{}'",
        filename
    );
    let mut f = BufWriter::new(f);
    try_with!(
        write_split_table_impl(&mut f, genes, nrfg).and_then(|_| f.flush()),
        "Unable to write split table file: '{}'",
        filename
    );
    Ok(())
}

fn get_nrfg_value(genes: &[Gene], nrfg: &Nrfg) -> Value {
    match nrfg.root() {
        Some(x) => x.to_json(genes),
        None => Value::Array(Vec::new()),
    }
}

fn get_nrfg_newick(genes: &[Gene], nrfg: &Nrfg) -> String {
    match nrfg.root() {
        Some(x) => x.to_newick(genes) + ";",
        None => ";".to_string(),
    }
}

pub fn write_nrfg_json(output_dir: &Utf8Path, genes: &[Gene], nrfg: &Nrfg) -> SimpleResult<()> {
    let filename = output_dir.join(NRFG_JSON_FILENAME);

    info!("Writing nrfg json to file: '{filename}'");

    let f = try_with!(
        File::create(&filename),
        "Unable to create nrfg json file: '{}'",
        filename
    );
    try_with!(
        serde_json::to_writer_pretty(&f, &get_nrfg_value(genes, nrfg)),
        "Unable to write nrfg json file: '{}'",
        filename
    );
    Ok(())
}

pub fn write_nrfg_newick(output_dir: &Utf8Path, genes: &[Gene], nrfg: &Nrfg) -> SimpleResult<()> {
    let filename = output_dir.join(NRFG_NEWICK_FILENAME);

    info!("Writing nrfg newick to file: '{filename}'");

    let f = try_with!(
        File::create(&filename),
        "Unable to create nrfg newick file: '{}'",
        filename
    );
    let mut f = BufWriter::new(f);
    try_with!(
        writeln!(f, "{}", get_nrfg_newick(genes, nrfg)).and_then(|_| f.flush()),
        "Unable to write nrfg newick file: '{}'",
        filename
    );
    Ok(())
}
