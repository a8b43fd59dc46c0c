//! H3 grouping of call points for the clustered point layer.

use std::collections::BTreeMap;

use crime_dash_dataset_models::GeoPoint;
use crime_dash_pipeline_models::map::{ClusterCell, ClusterSummary};
use h3o::{CellIndex, LatLng, Resolution};

/// Groups points into H3 cells at `resolution`, ordered by numeric cell
/// index. Points with out-of-range coordinates are skipped.
#[must_use]
pub fn cluster_points(
    points: impl IntoIterator<Item = GeoPoint>,
    resolution: Resolution,
) -> Vec<ClusterSummary> {
    let mut cells: BTreeMap<u64, u64> = BTreeMap::new();

    for point in points {
        let Ok(coord) = LatLng::new(point.latitude, point.longitude) else {
            log::warn!(
                "Skipping call point with invalid coordinates ({}, {})",
                point.longitude,
                point.latitude
            );
            continue;
        };
        *cells.entry(u64::from(coord.to_cell(resolution))).or_default() += 1;
    }

    cells
        .into_iter()
        .filter_map(|(index, count)| {
            let cell = CellIndex::try_from(index).ok()?;
            let center = LatLng::from(cell);
            Some(ClusterSummary {
                cell: ClusterCell {
                    cell: cell.to_string(),
                    count,
                },
                center: GeoPoint::new(center.lng(), center.lat()),
            })
        })
        .collect()
}
