use std::collections::BTreeMap;
use crate::metrics;
use crate::models::snapshot::{Extent, HourlySample, MetricDescriptor};

/// Computes per-metric and per-(group, unit) value extents over the hourly
/// series. A metric with no non-null sample gets no entry; the group extents
/// are folded incrementally across member metrics.
///
/// # Arguments
///
/// * 'samples' - the trimmed hourly series
/// * 'descriptors' - the retained metric descriptors
pub fn calculate(
    samples: &[HourlySample],
    descriptors: &[MetricDescriptor],
) -> (BTreeMap<String, Extent>, BTreeMap<String, Extent>) {
    let mut metric_extents = BTreeMap::new();
    let mut group_extents: BTreeMap<String, Extent> = BTreeMap::new();

    for descriptor in descriptors {
        let mut extent: Option<Extent> = None;
        for sample in samples {
            if let Some(Some(value)) = sample.metrics.get(&descriptor.key) {
                extent = Some(match extent {
                    Some(e) => Extent { min: e.min.min(*value), max: e.max.max(*value) },
                    None => Extent { min: *value, max: *value },
                });
            }
        }
        let Some(extent) = extent else { continue };

        metric_extents.insert(descriptor.key.clone(), extent);

        group_extents
            .entry(group_key(&descriptor.key, &descriptor.unit))
            .and_modify(|e| {
                e.min = e.min.min(extent.min);
                e.max = e.max.max(extent.max);
            })
            .or_insert(extent);
    }

    (metric_extents, group_extents)
}

/// Extent key combining group id and unit, so unlike units never share an axis
pub fn group_key(key: &str, unit: &str) -> String {
    let group = metrics::metric_group(key, unit);
    let unit = if unit.is_empty() { "unitless" } else { unit };

    format!("{}|{}", group.id, unit)
}
