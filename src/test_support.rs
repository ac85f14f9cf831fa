use bgcrank::model::{AdmetRecord, BgcRecord, ChemCluster, Compound, MsFeature};

#[allow(dead_code)]
pub fn bgc_record(
    sample: &str,
    tool: &str,
    index: i64,
    cluster_type: &str,
    start: f64,
    end: f64,
    score: Option<f64>,
) -> BgcRecord {
    BgcRecord {
        sample_id: sample.to_string(),
        tool: tool.to_string(),
        cluster_index: index,
        cluster_type: cluster_type.to_string(),
        start,
        end,
        score,
        core_enzymes: vec![],
        mibig_hits: vec![],
    }
}

#[allow(dead_code)]
pub fn ms_feature(id: &str, sample: &str, mz: f64, rt: f64, intensity: f64) -> MsFeature {
    MsFeature {
        feature_id: id.to_string(),
        sample_id: sample.to_string(),
        mz,
        rt,
        intensity,
        intensity_normalized: None,
    }
}

#[allow(dead_code)]
pub fn compound(id: &str, name: &str, source: &str, smiles: &str) -> Compound {
    Compound {
        compound_id: id.to_string(),
        name: name.to_string(),
        source: source.to_string(),
        smiles: smiles.to_string(),
        known_activity: String::new(),
    }
}

#[allow(dead_code)]
pub fn admet_record(compound: &str, pass: Option<bool>) -> AdmetRecord {
    AdmetRecord {
        compound_id: compound.to_string(),
        mw: Some(320.0),
        logp: Some(3.1),
        tpsa: Some(75.0),
        qed: Some(0.55),
        rule_of_five_pass: pass,
    }
}

#[allow(dead_code)]
pub fn chem_cluster(compound: &str, cluster: &str, size: Option<u64>) -> ChemCluster {
    ChemCluster {
        compound_id: compound.to_string(),
        cluster_id: cluster.to_string(),
        cluster_size: size,
    }
}
