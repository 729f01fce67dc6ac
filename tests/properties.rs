use moldb::{
    extract, filter, similarity, DescriptorRegistry, Family, FeatureTable, FilterCriteria,
    GraphToolkit, PipelineConfig,
};
use proptest::prelude::*;

const POOL: &[&str] = &[
    "c1ccccc1N",
    "NCCN",
    "c1ccccc1O",
    "OCCO",
    "CCOCC",
    "COc1ccccc1",
    "CCS",
    "CSC",
    "c1ccccc1[N+](=O)[O-]",
    "CC#N",
    "CS(=O)(=O)O",
    "FC(F)(F)c1ccccc1",
    "OC(=O)c1ccccc1",
    "Fc1ccccc1",
    "Brc1ccccc1",
    "OB(O)c1ccccc1",
    "CCN(C)C",
    "Nc1ccc(Br)cc1",
    "c1ccncc1",
    "CCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC",
];

fn build(indices: &[usize]) -> FeatureTable {
    let rows: Vec<&str> = indices.iter().map(|&i| POOL[i]).collect();
    extract(
        &GraphToolkit::new(),
        &DescriptorRegistry::standard(),
        &PipelineConfig::default(),
        &rows,
    )
    .table
}

fn group_names() -> Vec<&'static str> {
    DescriptorRegistry::<GraphToolkit>::standard()
        .descriptors()
        .iter()
        .filter(|d| d.family.is_group())
        .map(|d| d.name)
        .collect()
}

fn arb_rows() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..POOL.len(), 0..12)
}

fn arb_groups() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(group_names(), 0..6)
}

fn open(include: &[&str], exclude: &[&str]) -> FilterCriteria {
    FilterCriteria {
        molwt_cutoff: f64::INFINITY,
        logp_cutoff: f64::INFINITY,
        ..FilterCriteria::default()
    }
    .include(include.iter().copied())
    .exclude(exclude.iter().copied())
}

proptest! {
    #[test]
    fn columns_follow_registry(indices in arb_rows()) {
        let registry = DescriptorRegistry::<GraphToolkit>::standard();
        let expected: Vec<&str> = registry.names().collect();
        let table = build(&indices);
        prop_assert_eq!(table.len(), indices.len());
        for row in table.rows() {
            let names: Vec<&str> = row.features().map(|(name, _)| name).collect();
            prop_assert_eq!(&names, &expected);
        }
    }

    #[test]
    fn empty_inclusion_selects_nothing(indices in arb_rows(), exclude in arb_groups()) {
        let table = build(&indices);
        let filtered = filter(&table, &open(&[], &exclude)).unwrap();
        prop_assert!(filtered.is_empty());
    }

    #[test]
    fn exclusion_is_monotone(
        indices in arb_rows(),
        include in arb_groups(),
        exclude in arb_groups(),
        extra in prop::sample::select(group_names()),
    ) {
        let table = build(&indices);
        let before = filter(&table, &open(&include, &exclude)).unwrap();
        let mut more = exclude.clone();
        more.push(extra);
        let after = filter(&table, &open(&include, &more)).unwrap();
        prop_assert!(after.len() <= before.len());
        prop_assert!(after.positions().iter().all(|p| before.positions().contains(p)));
    }

    #[test]
    fn cutoffs_are_strict(indices in arb_rows(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!indices.is_empty());
        let table = build(&indices);
        let all = group_names();
        let target = pick.index(table.len());
        let molwt = table.rows()[target].get("molwt").unwrap().as_f64();
        let logp = table.rows()[target].get("logp").unwrap().as_f64();

        let by_weight = FilterCriteria { molwt_cutoff: molwt, ..open(&all, &[]) };
        let kept = filter(&table, &by_weight).unwrap();
        prop_assert!(kept.rows().iter().all(|r| r.get("molwt").unwrap().as_f64() < molwt));
        prop_assert!(!kept.positions().contains(&target));

        let by_logp = FilterCriteria { logp_cutoff: logp, ..open(&all, &[]) };
        let kept = filter(&table, &by_logp).unwrap();
        prop_assert!(kept.rows().iter().all(|r| r.get("logp").unwrap().as_f64() < logp));
        prop_assert!(!kept.positions().contains(&target));
    }

    #[test]
    fn filtered_rows_are_distinct(indices in arb_rows(), include in arb_groups()) {
        let table = build(&indices);
        let filtered = filter(&table, &open(&include, &[])).unwrap();
        let smiles: std::collections::HashSet<&str> =
            filtered.rows().iter().map(|r| r.smiles()).collect();
        prop_assert_eq!(smiles.len(), filtered.len());
    }

    #[test]
    fn similarity_bounds_and_count(indices in arb_rows(), threshold in 0usize..8) {
        let table = build(&indices);
        let filtered = filter(&table, &open(&group_names(), &[])).unwrap();
        let n = filtered.len();
        let sims = similarity(&filtered, threshold);
        prop_assert_eq!(sims.len(), n * (n + 1) / 2);
        prop_assert!(sims.iter().all(|s| (0.0..=1.0).contains(s)));

        // Self-pairs sit at offsets 0, n, 2n - 1, ...
        let mut at = 0;
        for i in 0..n {
            prop_assert_eq!(sims[at], 1.0);
            at += n - i;
        }
    }

    #[test]
    fn parallel_matches_sequential(indices in arb_rows()) {
        let table = build(&indices);
        let filtered = filter(&table, &open(&group_names(), &[])).unwrap();
        prop_assert_eq!(similarity(&filtered, 0), similarity(&filtered, usize::MAX));
    }
}

#[test]
fn group_families_exclude_scalars() {
    let names = group_names();
    assert!(!names.contains(&"logp"));
    assert!(!names.contains(&"molwt"));
    let registry = DescriptorRegistry::<GraphToolkit>::standard();
    assert_eq!(
        registry.family(Family::ReactionClass).count(),
        5,
    );
}
