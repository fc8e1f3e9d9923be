use std::collections::BTreeSet;

use crate::DatasetMap;

/// Distinct taint labels across all known datasets.
pub fn available_taints(datasets: &DatasetMap) -> BTreeSet<String> {
    datasets
        .values()
        .flat_map(|dataset| dataset.taints.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::available_taints;
    use crate::{Dataset, DatasetMap};

    #[test]
    fn empty_map_has_no_taints() {
        assert!(available_taints(&DatasetMap::new()).is_empty());
    }

    #[test]
    fn taints_are_unioned_without_duplicates() {
        let mut datasets = DatasetMap::new();
        datasets.insert("ds1".into(), Dataset::with_taints(["malware", "2020"]));
        datasets.insert("ds2".into(), Dataset::with_taints(["2020", "benign"]));
        datasets.insert("ds3".into(), Dataset::default());

        let taints: Vec<_> = available_taints(&datasets).into_iter().collect();
        assert_eq!(taints, vec!["2020", "benign", "malware"]);
    }

    #[test]
    fn duplicates_within_one_dataset_collapse() {
        let mut datasets = DatasetMap::new();
        datasets.insert("ds1".into(), Dataset::with_taints(["a", "a", "a"]));
        assert_eq!(available_taints(&datasets).len(), 1);
    }
}
