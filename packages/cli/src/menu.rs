//! Interactive selection menu.
//!
//! Each widget of the dashboard becomes one menu entry. A change reruns
//! the pipeline through the [`Session`] and rewrites the output files.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use crime_dash_pipeline::session::Session;
use crime_dash_pipeline_models::map::MapSpec;
use crime_dash_pipeline_models::output::PipelineOutput;
use crime_dash_pipeline_models::{
    ALL_LABEL, DateRange, Granularity, MapMode, SelectionChange, SetFilter,
};
use dialoguer::{Input, MultiSelect, Select};

use crate::output;

/// Menu entries.
enum Action {
    Tracts,
    CallTypes,
    DateRange,
    Granularity,
    MapMode,
    ToggleLayer,
    Summary,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Tracts,
        Self::CallTypes,
        Self::DateRange,
        Self::Granularity,
        Self::MapMode,
        Self::ToggleLayer,
        Self::Summary,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Tracts => "Filter census tracts",
            Self::CallTypes => "Filter call types",
            Self::DateRange => "Set date range",
            Self::Granularity => "Set time granularity",
            Self::MapMode => "Set map mode",
            Self::ToggleLayer => "Toggle map layer",
            Self::Summary => "Show summary",
            Self::Quit => "Quit",
        }
    }
}

/// Layer visibility chosen by hand, applied over each fresh map.
type LayerOverrides = BTreeMap<String, bool>;

/// Runs the menu loop until the user quits.
///
/// # Errors
///
/// Returns an error if terminal input fails or an output file cannot be
/// written.
pub fn run(session: &mut Session, out_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut layers = LayerOverrides::new();
    publish(&session.render(), &layers, out_dir)?;

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        println!();
        let idx = Select::new()
            .with_prompt("Dashboard")
            .items(&labels)
            .default(0)
            .interact()?;

        let change = match Action::ALL[idx] {
            Action::Tracts => {
                let options = session.store().tract_options();
                prompt_set("Census tracts", &options, &session.selection().tracts)?
                    .map(SelectionChange::Tracts)
            }
            Action::CallTypes => {
                let options = session.store().call_type_options();
                prompt_set("Call types", &options, &session.selection().call_types)?
                    .map(SelectionChange::CallTypes)
            }
            Action::DateRange => {
                prompt_date_range(session.store().date_bounds())?.map(SelectionChange::DateRange)
            }
            Action::Granularity => Some(SelectionChange::Granularity(prompt_choice(
                "Time granularity",
                Granularity::all(),
                session.selection().granularity,
            )?)),
            Action::MapMode => Some(SelectionChange::MapMode(prompt_choice(
                "Map mode",
                MapMode::all(),
                session.selection().map_mode,
            )?)),
            Action::ToggleLayer => {
                let output = session.render();
                if toggle_layer(&output.map, &mut layers)? {
                    publish(&output, &layers, out_dir)?;
                }
                continue;
            }
            Action::Summary => {
                print_summary(&session.render(), &layers);
                continue;
            }
            Action::Quit => break,
        };

        let Some(change) = change else {
            continue;
        };
        if matches!(change, SelectionChange::MapMode(_)) {
            layers.clear();
        }
        let output = session.apply(change);
        publish(&output, &layers, out_dir)?;
    }

    Ok(())
}

/// Prompts for a multi-valued filter. Checking "All" gives the all-pass
/// filter; checking nothing gives an empty subset. Returns `None` when the
/// filter is unchanged.
fn prompt_set(
    prompt: &str,
    options: &[String],
    current: &SetFilter,
) -> Result<Option<SetFilter>, dialoguer::Error> {
    let mut items = vec![ALL_LABEL.to_string()];
    items.extend(options.iter().cloned());

    let mut checked = vec![current.is_all()];
    checked.extend(options.iter().map(|o| !current.is_all() && current.matches(o)));

    let picked = MultiSelect::new()
        .with_prompt(format!("{prompt} (space to toggle, enter to confirm)"))
        .items(&items)
        .defaults(&checked)
        .interact()?;

    let filter = if picked.contains(&0) {
        SetFilter::All
    } else {
        if picked.is_empty() {
            log::warn!("No {} selected; nothing will match", prompt.to_lowercase());
        }
        SetFilter::subset(picked.into_iter().map(|i| items[i].clone()))
    };

    Ok((&filter != current).then_some(filter))
}

/// Prompts for both ends of the range. An empty answer takes the
/// dataset's own bound for that end.
fn prompt_date_range(
    bounds: Option<(NaiveDate, NaiveDate)>,
) -> Result<Option<DateRange>, dialoguer::Error> {
    let Some((min, max)) = bounds else {
        log::warn!("The dataset has no events to filter by date");
        return Ok(None);
    };

    let start: String = Input::new()
        .with_prompt(format!("Start date (YYYY-MM-DD, empty for {min})"))
        .allow_empty(true)
        .interact_text()?;
    let end: String = Input::new()
        .with_prompt(format!("End date (YYYY-MM-DD, empty for {max})"))
        .allow_empty(true)
        .interact_text()?;

    match (date_or(&start, min), date_or(&end, max)) {
        (Ok(start), Ok(end)) => {
            if start > end {
                log::warn!("Start {start} is after end {end}; nothing will match");
            }
            Ok(Some(DateRange::new(start, end)))
        }
        (Err(e), _) | (_, Err(e)) => {
            log::warn!("{e}");
            Ok(None)
        }
    }
}

fn date_or(text: &str, fallback: NaiveDate) -> Result<NaiveDate, String> {
    if text.trim().is_empty() {
        Ok(fallback)
    } else {
        parse_date(text)
    }
}

fn parse_date(text: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {e}", text.trim()))
}

fn prompt_choice<T: Copy + PartialEq + std::fmt::Display>(
    prompt: &str,
    choices: &[T],
    current: T,
) -> Result<T, dialoguer::Error> {
    let labels: Vec<String> = choices.iter().map(ToString::to_string).collect();
    let default = choices.iter().position(|c| *c == current).unwrap_or(0);

    let idx = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(default)
        .interact()?;

    Ok(choices[idx])
}

/// Flips one layer chosen from the current map. Returns `false` if the
/// user backed out.
fn toggle_layer(map: &MapSpec, layers: &mut LayerOverrides) -> Result<bool, dialoguer::Error> {
    let mut map = with_overrides(map, layers);
    let labels: Vec<String> = map
        .layers
        .iter()
        .map(|layer| format!("[{}] {}", if layer.show { "x" } else { " " }, layer.name))
        .collect();

    let Some(idx) = Select::new()
        .with_prompt("Layer")
        .items(&labels)
        .default(0)
        .interact_opt()?
    else {
        return Ok(false);
    };

    let name = map.layers[idx].name.clone();
    Ok(map.toggle_layer(&name).is_some_and(|show| {
        layers.insert(name, show);
        true
    }))
}

fn with_overrides(map: &MapSpec, layers: &LayerOverrides) -> MapSpec {
    let mut map = map.clone();
    for (name, show) in layers {
        if !map.set_layer_visibility(name, *show) {
            log::debug!("Layer {name} no longer exists");
        }
    }
    map
}

fn publish(
    output: &PipelineOutput<'_>,
    layers: &LayerOverrides,
    out_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let map = with_overrides(&output.map, layers);
    let written = output::write_all(output, &map, out_dir)?;
    println!(
        "{} calls matched; wrote {} files to {}",
        output.filtered.len(),
        written.len(),
        out_dir.display()
    );
    Ok(())
}

fn print_summary(output: &PipelineOutput<'_>, layers: &LayerOverrides) {
    println!("{}", output.chart.title);
    println!("  rows:    {}", output.filtered.len());
    println!("  buckets: {} ({})", output.aggregated.len(), output.aggregated.granularity);
    for row in &output.aggregated.rows {
        println!("    {:<12} {}", row.bucket.label(), row.count);
    }

    let mut tracts: Vec<(&str, u64)> = output.tract_counts.iter().collect();
    tracts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    println!("  busiest tracts:");
    for (tract, count) in tracts.iter().take(5) {
        println!("    {tract:<12} {count}");
    }

    let map = with_overrides(&output.map, layers);
    println!("  visible layers: {}", map.visible_layers().join(", "));
}
