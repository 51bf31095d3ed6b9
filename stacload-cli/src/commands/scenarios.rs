use crate::formatter;
use stacload_core::ScenarioCatalog;

/// List the built-in scenarios with their weights and tags
pub fn scenarios_command() {
    let rows: Vec<Vec<String>> = ScenarioCatalog::stac()
        .iter()
        .map(|definition| {
            vec![
                definition.name.clone(),
                definition.weight.to_string(),
                definition.tags.iter().cloned().collect::<Vec<_>>().join(","),
                definition.kind.description().to_string(),
            ]
        })
        .collect();

    formatter::print_table(&["scenario", "weight", "tags", "description"], &rows);
    formatter::print_info("Weight 0 scenarios only run with a weight override or via run-once");
}
