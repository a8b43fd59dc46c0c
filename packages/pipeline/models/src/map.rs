//! Map specification: a base map plus named, independently toggleable
//! layers carrying `GeoJSON` payloads.

use crime_dash_dataset_models::GeoPoint;
use geojson::FeatureCollection;
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

/// Name of the marker layer.
pub const MARKERS_LAYER: &str = "cameras";
/// Name of the tract outline layer.
pub const TRACTS_LAYER: &str = "Tracts";
/// Name of the clustered call point layer.
pub const CALLS_LAYER: &str = "Calls";
/// Name of the choropleth layer.
pub const CHOROPLETH_LAYER: &str = "Choropleth";

/// What a layer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "camelCase")]
pub enum LayerKind {
    /// Fixed point markers.
    Markers,
    /// Unfilled tract outlines with tooltips.
    TractOutline,
    /// Filtered call points, clustered.
    PointCluster,
    /// Tracts filled by filtered call count.
    Choropleth,
}

impl LayerKind {
    /// Returns `true` for layers whose content depends on the selection.
    #[must_use]
    pub const fn is_dynamic(self) -> bool {
        matches!(self, Self::PointCluster | Self::Choropleth)
    }
}

/// Drawing style for a layer. Unset fields use the renderer's default.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerStyle {
    /// Stroke (and marker) color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Stroke weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Fill opacity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    /// Stroke opacity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_opacity: Option<f64>,
    /// Marker radius.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Whether point markers are filled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
}

/// Call points grouped into one H3 cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCell {
    /// H3 cell index as a hex string.
    pub cell: String,
    /// Number of call points in the cell.
    pub count: u64,
}

/// A cluster cell with its center point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    /// Cell identity and count.
    #[serde(flatten)]
    pub cell: ClusterCell,
    /// Cell center.
    pub center: GeoPoint,
}

/// Graduated color legend for the choropleth.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    /// Caption.
    pub name: String,
    /// Palette name.
    pub palette: String,
    /// Bin edges, ascending; `colors.len() + 1` values. Empty when no
    /// tract has data.
    pub thresholds: Vec<f64>,
    /// One fill color per bin.
    pub colors: Vec<String>,
    /// Fill for tracts with no matching rows.
    pub no_data_color: String,
}

/// One named map layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayer {
    /// Unique layer name shown in the layer control.
    pub name: String,
    /// What the layer draws.
    pub kind: LayerKind,
    /// Whether the layer is initially visible.
    pub show: bool,
    /// Whether the layer is an overlay (as opposed to a base layer).
    pub overlay: bool,
    /// Drawing style.
    pub style: LayerStyle,
    /// Feature properties shown in a hover tooltip.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tooltip_fields: Vec<String>,
    /// Layer geometry.
    pub features: FeatureCollection,
    /// H3 cluster summary, only for [`LayerKind::PointCluster`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clusters: Vec<ClusterSummary>,
    /// Color legend, only for [`LayerKind::Choropleth`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
}

impl MapLayer {
    /// Creates a visible overlay with no tooltip, clusters, or legend.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: LayerKind,
        style: LayerStyle,
        features: FeatureCollection,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            show: true,
            overlay: true,
            style,
            tooltip_fields: Vec::new(),
            features,
            clusters: Vec::new(),
            legend: None,
        }
    }

    /// Total number of features.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.features.features.len()
    }

    /// Number of features carrying filtered data. For the choropleth this
    /// excludes "no data" tracts; for other layers it equals
    /// [`Self::feature_count`].
    #[must_use]
    pub fn data_feature_count(&self) -> usize {
        match self.kind {
            LayerKind::Choropleth => self
                .features
                .features
                .iter()
                .filter(|f| {
                    f.property("hasData")
                        .and_then(serde_json::Value::as_bool)
                        .unwrap_or(false)
                })
                .count(),
            LayerKind::Markers | LayerKind::TractOutline | LayerKind::PointCluster => {
                self.feature_count()
            }
        }
    }
}

/// Layer control widget settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerControl {
    /// Whether the control starts collapsed.
    pub collapsed: bool,
}

/// A complete map: base settings plus ordered layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSpec {
    /// Initial center as `[latitude, longitude]`.
    pub center: [f64; 2],
    /// Initial zoom.
    pub zoom: u8,
    /// Tile set name.
    pub tiles: String,
    /// Tract extent as `[[south, west], [north, east]]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_bounds: Option<[[f64; 2]; 2]>,
    /// Layers in draw order.
    pub layers: Vec<MapLayer>,
    /// Layer control settings.
    pub layer_control: LayerControl,
}

impl MapSpec {
    /// Looks up a layer by name.
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&MapLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Sets one layer's visibility without touching the others. Returns
    /// `false` if no layer has that name.
    pub fn set_layer_visibility(&mut self, name: &str, show: bool) -> bool {
        match self.layers.iter_mut().find(|layer| layer.name == name) {
            Some(layer) => {
                layer.show = show;
                true
            }
            None => false,
        }
    }

    /// Flips one layer's visibility, returning the new state.
    pub fn toggle_layer(&mut self, name: &str) -> Option<bool> {
        let layer = self.layers.iter_mut().find(|layer| layer.name == name)?;
        layer.show = !layer.show;
        Some(layer.show)
    }

    /// Names of the layers currently visible.
    #[must_use]
    pub fn visible_layers(&self) -> Vec<&str> {
        self.layers
            .iter()
            .filter(|layer| layer.show)
            .map(|layer| layer.name.as_str())
            .collect()
    }
}
