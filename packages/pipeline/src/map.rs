//! Map assembly: static marker and tract layers plus the two
//! selection-driven layers.

use crime_dash_config::{ChoroplethConfig, MapConfig};
use crime_dash_dataset::DatasetStore;
use crime_dash_dataset::loader::{
    EVENT_ID_FIELD, EVENT_TIME_FIELD, EVENT_TRACT_FIELD, EVENT_TYPE_FIELD, TRACT_ID_FIELD,
};
use crime_dash_pipeline_models::MapMode;
use crime_dash_pipeline_models::map::{
    CALLS_LAYER, CHOROPLETH_LAYER, LayerControl, LayerKind, LayerStyle, Legend, MARKERS_LAYER,
    MapLayer, MapSpec, TRACTS_LAYER,
};
use crime_dash_pipeline_models::output::{FilteredView, TractCounts};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use h3o::Resolution;
use serde_json::json;

use crate::cluster::cluster_points;
use crate::color::ColorScale;

/// Radius of individual call point markers.
const CALL_POINT_RADIUS: f64 = 3.0;

/// Resolved map styling, shared by every run.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    /// Base map settings.
    pub map: MapConfig,
    /// Choropleth styling.
    pub choropleth: ChoroplethConfig,
    /// Choropleth bin colors, light to dark.
    pub colors: Vec<String>,
    /// H3 resolution for the call point clusters.
    pub resolution: Resolution,
}

/// Builds the full map for one filtered view. Both dynamic layers are
/// always present; `mode` decides which of them starts visible.
#[must_use]
pub fn build_map(
    store: &DatasetStore,
    view: &FilteredView<'_>,
    counts: &TractCounts,
    mode: MapMode,
    settings: &MapSettings,
) -> MapSpec {
    let mut calls = call_layer(view, settings);
    calls.show = mode == MapMode::PointCluster;

    let mut choropleth = choropleth_layer(store, counts, settings);
    choropleth.show = mode == MapMode::Choropleth;

    let fit_bounds = store.bounds().map(|rect| {
        let (min, max) = (rect.min(), rect.max());
        [[min.y, min.x], [max.y, max.x]]
    });

    MapSpec {
        center: settings.map.center,
        zoom: settings.map.zoom,
        tiles: settings.map.tiles.clone(),
        fit_bounds,
        layers: vec![
            marker_layer(store, settings),
            tract_layer(store, settings),
            calls,
            choropleth,
        ],
        layer_control: LayerControl { collapsed: false },
    }
}

fn marker_layer(store: &DatasetStore, settings: &MapSettings) -> MapLayer {
    let features = store
        .markers()
        .iter()
        .map(|marker| {
            feature(
                geojson::Value::from(&geo::Point::from(marker.location)),
                JsonObject::new(),
            )
        })
        .collect();

    MapLayer::new(
        MARKERS_LAYER,
        LayerKind::Markers,
        LayerStyle {
            color: Some(settings.map.marker_color.clone()),
            fill: Some(true),
            ..LayerStyle::default()
        },
        collection(features),
    )
}

fn tract_layer(store: &DatasetStore, settings: &MapSettings) -> MapLayer {
    let features = store
        .tracts()
        .iter()
        .map(|tract| {
            feature(
                geojson::Value::from(&tract.geometry),
                properties(json!({ TRACT_ID_FIELD: tract.tract_id })),
            )
        })
        .collect();

    let mut layer = MapLayer::new(
        TRACTS_LAYER,
        LayerKind::TractOutline,
        LayerStyle {
            color: Some(settings.map.outline_color.clone()),
            weight: Some(settings.map.outline_weight),
            fill_opacity: Some(0.0),
            ..LayerStyle::default()
        },
        collection(features),
    );
    layer.tooltip_fields = vec![TRACT_ID_FIELD.to_string()];
    layer
}

fn call_layer(view: &FilteredView<'_>, settings: &MapSettings) -> MapLayer {
    let features = view
        .iter()
        .filter_map(|event| {
            let location = event.location?;
            Some(feature(
                geojson::Value::from(&geo::Point::from(location)),
                properties(json!({
                    EVENT_ID_FIELD: event.id,
                    EVENT_TIME_FIELD: event.time_created.format("%Y-%m-%dT%H:%M:%S").to_string(),
                    EVENT_TYPE_FIELD: event.call_type,
                    EVENT_TRACT_FIELD: event.census_tract,
                })),
            ))
        })
        .collect();

    let mut layer = MapLayer::new(
        CALLS_LAYER,
        LayerKind::PointCluster,
        LayerStyle {
            radius: Some(CALL_POINT_RADIUS),
            fill: Some(true),
            ..LayerStyle::default()
        },
        collection(features),
    );
    layer.clusters = cluster_points(view.iter().filter_map(|e| e.location), settings.resolution);
    layer
}

/// Joins tract counts to polygons. Every polygon is kept; those without
/// matching rows carry `hasData: false` and the no-data fill. Counts for
/// tracts with no polygon are dropped here but remain in `counts`.
fn choropleth_layer(store: &DatasetStore, counts: &TractCounts, settings: &MapSettings) -> MapLayer {
    let joined: Vec<(&str, u64)> = store
        .tracts()
        .iter()
        .map(|tract| (tract.tract_id.as_str(), counts.get(&tract.tract_id)))
        .collect();

    let data = joined.iter().map(|(_, count)| *count).filter(|c| *c > 0);
    let scale = data
        .clone()
        .min()
        .zip(data.max())
        .map(|(min, max)| ColorScale::new(min, max, settings.colors.clone()));

    let no_data = &settings.choropleth.no_data_color;
    let features = store
        .tracts()
        .iter()
        .zip(&joined)
        .map(|(tract, (tract_id, count))| {
            let fill = match &scale {
                Some(scale) if *count > 0 => scale.color_for(*count),
                _ => no_data.as_str(),
            };
            feature(
                geojson::Value::from(&tract.geometry),
                properties(json!({
                    TRACT_ID_FIELD: tract_id,
                    "count": count,
                    "hasData": *count > 0,
                    "fill": fill,
                })),
            )
        })
        .collect();

    let mut layer = MapLayer::new(
        CHOROPLETH_LAYER,
        LayerKind::Choropleth,
        LayerStyle {
            fill_opacity: Some(settings.choropleth.fill_opacity),
            line_opacity: Some(settings.choropleth.line_opacity),
            ..LayerStyle::default()
        },
        collection(features),
    );
    layer.tooltip_fields = vec![TRACT_ID_FIELD.to_string(), "count".to_string()];
    layer.legend = Some(Legend {
        name: settings.choropleth.legend_name.clone(),
        palette: settings.choropleth.palette.clone(),
        thresholds: scale.as_ref().map(ColorScale::thresholds).unwrap_or_default(),
        colors: settings.colors.clone(),
        no_data_color: no_data.clone(),
    });
    layer
}

fn feature(value: geojson::Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

const fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn properties(value: serde_json::Value) -> JsonObject {
    match value {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::count_by_tract;
    use crate::filter::filter_events;
    use crate::fixtures::{date, full_selection, store};
    use crime_dash_config::DashboardConfig;
    use crime_dash_pipeline_models::DateRange;

    fn settings() -> MapSettings {
        let config = DashboardConfig::embedded();
        MapSettings {
            colors: crate::color::palette_colors(&config.choropleth.palette, config.choropleth.bins)
                .unwrap(),
            map: config.map,
            choropleth: config.choropleth,
            resolution: Resolution::Eight,
        }
    }

    fn build(selection: &crime_dash_pipeline_models::Selection) -> MapSpec {
        let store = store();
        let view = filter_events(&store, selection);
        let counts = count_by_tract(&view);
        build_map(&store, &view, &counts, selection.map_mode, &settings())
    }

    fn fill_of(layer: &MapLayer, tract: &str) -> String {
        layer
            .features
            .features
            .iter()
            .find(|f| f.property(TRACT_ID_FIELD).and_then(|v| v.as_str()) == Some(tract))
            .and_then(|f| f.property("fill"))
            .and_then(|v| v.as_str())
            .unwrap()
            .to_string()
    }

    #[test]
    fn layers_are_named_and_ordered() {
        let map = build(&full_selection());
        let names: Vec<&str> = map.layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["cameras", "Tracts", "Calls", "Choropleth"]);
        assert!(!map.layer_control.collapsed);
        assert_eq!(map.zoom, 11);
        assert_eq!(map.tiles, "cartodbpositron");
    }

    #[test]
    fn default_mode_shows_point_layer() {
        let map = build(&full_selection());
        assert_eq!(map.visible_layers(), vec!["cameras", "Tracts", "Calls"]);

        let mut selection = full_selection();
        selection.map_mode = MapMode::Choropleth;
        let map = build(&selection);
        assert_eq!(map.visible_layers(), vec!["cameras", "Tracts", "Choropleth"]);
    }

    #[test]
    fn static_layers_mirror_the_store() {
        let map = build(&full_selection());
        let markers = map.layer(MARKERS_LAYER).unwrap();
        assert_eq!(markers.feature_count(), 2);
        assert_eq!(markers.style.color.as_deref(), Some("red"));

        let tracts = map.layer(TRACTS_LAYER).unwrap();
        assert_eq!(tracts.feature_count(), 3);
        assert_eq!(tracts.style.fill_opacity, Some(0.0));
        assert_eq!(tracts.tooltip_fields, vec!["tract"]);
    }

    #[test]
    fn call_layer_skips_rows_without_location() {
        let map = build(&full_selection());
        let calls = map.layer(CALLS_LAYER).unwrap();
        assert_eq!(calls.feature_count(), 10);
        let clustered: u64 = calls.clusters.iter().map(|c| c.cell.count).sum();
        assert_eq!(clustered, 10);
    }

    #[test]
    fn choropleth_fills_by_count() {
        let mut selection = full_selection();
        selection.map_mode = MapMode::Choropleth;
        let map = build(&selection);
        let layer = map.layer(CHOROPLETH_LAYER).unwrap();
        let colors = settings().colors;

        assert_eq!(layer.feature_count(), 3);
        assert_eq!(layer.data_feature_count(), 3);
        assert_eq!(fill_of(layer, "3"), colors[0]);
        assert_eq!(fill_of(layer, "2"), colors[colors.len() - 1]);

        let legend = layer.legend.as_ref().unwrap();
        assert_eq!(legend.name, "Num. of Calls");
        assert_eq!(legend.thresholds.first(), Some(&1.0));
        assert_eq!(legend.thresholds.last(), Some(&5.0));
    }

    #[test]
    fn tracts_without_rows_get_no_data_fill() {
        let mut selection = full_selection();
        selection.date_range = DateRange::new(date(2015, 2, 1), date(2015, 2, 28));
        let map = build(&selection);
        let layer = map.layer(CHOROPLETH_LAYER).unwrap();

        assert_eq!(layer.data_feature_count(), 1);
        assert_eq!(fill_of(layer, "1"), "White");
        assert_eq!(fill_of(layer, "3"), "White");
        assert_ne!(fill_of(layer, "2"), "White");
    }

    #[test]
    fn empty_selection_gives_empty_dynamic_layers() {
        let mut selection = full_selection();
        selection.date_range = DateRange::new(date(2020, 1, 1), date(2020, 12, 31));
        let map = build(&selection);

        assert_eq!(map.layer(CALLS_LAYER).unwrap().feature_count(), 0);
        assert!(map.layer(CALLS_LAYER).unwrap().clusters.is_empty());

        let choropleth = map.layer(CHOROPLETH_LAYER).unwrap();
        assert_eq!(choropleth.data_feature_count(), 0);
        assert_eq!(choropleth.feature_count(), 3);
        assert!(choropleth.legend.as_ref().unwrap().thresholds.is_empty());

        assert_eq!(map.layer(MARKERS_LAYER).unwrap().feature_count(), 2);
        assert_eq!(map.layer(TRACTS_LAYER).unwrap().feature_count(), 3);
    }

    #[test]
    fn fit_bounds_cover_all_tracts() {
        let map = build(&full_selection());
        let [[south, west], [north, east]] = map.fit_bounds.unwrap();
        assert!((west - -90.09).abs() < 1e-9);
        assert!((south - 29.94).abs() < 1e-9);
        assert!((east - -90.06).abs() < 1e-9);
        assert!((north - 29.97).abs() < 1e-9);
    }
}
