use std::collections::BTreeSet;

use crate::models::{Combination, VariableDomain};

/// Expand the declared variables of an asset into every combination it must be dumped for.
///
/// The first declared variable is the outermost loop and the last one advances fastest.
/// Variables missing from the domain keep a single implicit slot and stay unbound, so an
/// asset with no variables yields exactly one empty combination. A variable configured with
/// an empty value list yields no combinations at all.
pub fn expand_combinations(vars: &[String], domain: &VariableDomain) -> Vec<Combination> {
    let mut combinations = vec![Combination::default()];
    let mut seen = BTreeSet::new();

    for name in vars {
        if !seen.insert(name.as_str()) {
            continue;
        }

        let Some(values) = domain.get(name) else {
            continue;
        };
        if values.is_empty() {
            return Vec::new();
        }

        combinations = combinations
            .into_iter()
            .flat_map(|base| {
                values
                    .iter()
                    .map(move |value| base.clone().with(name.as_str(), value.as_str()))
            })
            .collect();
    }

    combinations
}
