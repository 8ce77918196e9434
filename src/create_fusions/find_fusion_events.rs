use std::collections::BTreeSet;

use itertools::Itertools;
use log::debug;
use simple_error::{SimpleResult, bail};

use crate::component::Component;
use crate::fusion::Fusion;

/// Find every pair of components which combine to form a third component
///
/// Components are expected to be stored in index order. Fusions are indexed in discovery order,
/// iterating over component pairs in index order.
///
pub fn find_fusion_events(components: &[Component]) -> SimpleResult<Vec<Fusion>> {
    let all_outgoing = components
        .iter()
        .map(|x| x.outgoing_components(components))
        .collect::<Vec<_>>();

    let mut fusions = Vec::new();
    for (component_a, component_b) in (0..components.len()).tuple_combinations() {
        let a_outgoing = &all_outgoing[component_a];
        let b_outgoing = &all_outgoing[component_b];
        if a_outgoing.is_empty() || b_outgoing.is_empty() {
            continue;
        }

        let candidates = a_outgoing
            .intersection(b_outgoing)
            .copied()
            .collect::<BTreeSet<_>>();

        let mut result_c = None;
        for &candidate in candidates.iter() {
            // Reject the candidate if it is better explained as formed from another candidate
            if let Some(&other) = candidates
                .iter()
                .find(|&&other| other != candidate && all_outgoing[candidate].contains(&other))
            {
                debug!(
                    "Component {candidate} is not formed directly from components {component_a} and {component_b}, it produces candidate component {other}"
                );
                continue;
            }

            if let Some(existing) = result_c {
                bail!(
                    "Components {} and {} appear to form more than one component: {} and {}",
                    component_a,
                    component_b,
                    existing,
                    candidate
                );
            }
            result_c = Some(candidate);
        }

        if let Some(component_c) = result_c {
            debug!("Found fusion event: {component_a} + {component_b} -> {component_c}");
            fusions.push(Fusion::new(
                fusions.len(),
                component_a,
                component_b,
                component_c,
            ));
        }
    }
    Ok(fusions)
}
