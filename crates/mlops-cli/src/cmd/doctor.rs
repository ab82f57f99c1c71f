use crate::output::{print_json, print_table};
use mlops_core::preflight;

pub fn run(json: bool) -> anyhow::Result<()> {
    let tools = preflight::locate_tools();

    if json {
        print_json(&serde_json::json!({ "tools": tools }))?;
    } else {
        let rows: Vec<Vec<String>> = tools
            .iter()
            .map(|t| {
                vec![
                    t.name.to_string(),
                    t.path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "not found".to_string()),
                ]
            })
            .collect();
        print_table(&["tool", "path"], &rows);
    }

    let missing: Vec<&str> = tools
        .iter()
        .filter(|t| !t.installed())
        .map(|t| t.name)
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("missing required tools: {}", missing.join(", "));
    }
    Ok(())
}
