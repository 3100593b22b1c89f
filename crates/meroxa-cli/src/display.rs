//! Human-readable tables.
//!
//! List tables print one row per item under an optional header and a `─`
//! rule; detail tables print right-aligned `Label:` cells next to values.
//! An empty list renders as an empty string.

use meroxa_client::{Account, Environment, Resource};

/// Environment name shown for resources that are not in a dedicated one.
pub const COMMON_ENVIRONMENT: &str = "common";

/// Column-aligned rows with an optional header.
#[derive(Debug, Default)]
struct Table {
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(header: &[&str], hide_headers: bool) -> Self {
        Self {
            header: (!hide_headers).then(|| header.iter().map(ToString::to_string).collect()),
            rows: Vec::new(),
        }
    }

    fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn render(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0; columns];
        for cells in self.header.iter().chain(&self.rows) {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = Vec::new();
        if let Some(header) = &self.header {
            out.push(line(header, &widths));
            let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
            out.push("─".repeat(total));
        }
        out.extend(self.rows.iter().map(|cells| line(cells, &widths)));
        out.join("\n")
    }
}

fn line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}

/// `Label: value` pairs with the labels right-aligned.
fn details(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(label, _)| label.chars().count() + 1).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(label, value)| {
            let label = format!("{label}:");
            format!("{label:>width$} {value}").trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn environment_name(resource: &Resource) -> &str {
    resource
        .environment
        .as_ref()
        .map(|e| e.name.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(COMMON_ENVIRONMENT)
}

/// One row per resource.
pub fn resources_table(resources: &[Resource], hide_headers: bool) -> String {
    let mut table = Table::new(
        &["UUID", "NAME", "TYPE", "ENVIRONMENT", "URL", "STATE"],
        hide_headers,
    );
    for r in resources {
        table.row(vec![
            r.uuid.clone(),
            r.name.clone(),
            r.kind.clone(),
            environment_name(r).to_string(),
            r.url.clone(),
            r.status.state.clone(),
        ]);
    }
    table.render()
}

/// Details of one resource.
pub fn resource_table(resource: &Resource) -> String {
    let mut pairs = vec![
        ("UUID", resource.uuid.clone()),
        ("Name", resource.name.clone()),
        ("Type", resource.kind.clone()),
    ];
    if !resource.url.is_empty() {
        pairs.push(("URL", resource.url.clone()));
    }
    pairs.push(("State", resource.status.state.clone()));
    if !resource.status.details.is_empty() {
        pairs.push(("State details", resource.status.details.clone()));
    }
    match &resource.environment {
        Some(env) => {
            if !env.uuid.is_empty() {
                pairs.push(("Environment UUID", env.uuid.clone()));
            }
            if !env.name.is_empty() {
                pairs.push(("Environment Name", env.name.clone()));
            }
        }
        None => pairs.push(("Environment Name", COMMON_ENVIRONMENT.to_string())),
    }
    details(&pairs)
}

/// Supported resource types, sorted.
pub fn resource_types_table(types: &[String], hide_headers: bool) -> String {
    let mut sorted = types.to_vec();
    sorted.sort();
    let mut table = Table::new(&["TYPES"], hide_headers);
    for kind in sorted {
        table.row(vec![kind]);
    }
    table.render()
}

/// One row per environment.
pub fn environments_table(environments: &[Environment], hide_headers: bool) -> String {
    let mut table = Table::new(
        &["UUID", "NAME", "TYPE", "PROVIDER", "REGION", "STATE"],
        hide_headers,
    );
    for e in environments {
        table.row(vec![
            e.uuid.clone(),
            e.name.clone(),
            e.kind.clone(),
            e.provider.clone(),
            e.region.clone(),
            e.status.state.clone(),
        ]);
    }
    table.render()
}

/// Details of one environment.
pub fn environment_table(environment: &Environment) -> String {
    let mut pairs = vec![
        ("UUID", environment.uuid.clone()),
        ("Name", environment.name.clone()),
        ("Provider", environment.provider.clone()),
        ("Region", environment.region.clone()),
        ("Type", environment.kind.clone()),
    ];
    if let Some(created) = environment.created_at {
        pairs.push(("Created At", created.to_rfc3339()));
    }
    pairs.push(("Environment Status", environment.status.state.clone()));
    if !environment.status.details.is_empty() {
        pairs.push(("Environment Status Details", environment.status.details.clone()));
    }
    details(&pairs)
}

/// One row per account; the active one is marked `(current)`.
pub fn accounts_table(accounts: &[Account], current: &str, hide_headers: bool) -> String {
    let mut table = Table::new(&["UUID", "NAME"], hide_headers);
    for a in accounts {
        let name = if a.uuid == current {
            format!("{} (current)", a.name)
        } else {
            a.name.clone()
        };
        table.row(vec![a.uuid.clone(), name]);
    }
    table.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use meroxa_client::{EntityIdentifier, Status};

    fn resource(name: &str, env: Option<&str>) -> Resource {
        Resource {
            uuid: format!("{name}-uuid"),
            name: name.to_string(),
            kind: "postgres".to_string(),
            url: "postgres://db:5432/app".to_string(),
            status: Status {
                state: "ready".to_string(),
                details: String::new(),
            },
            environment: env.map(|n| EntityIdentifier {
                uuid: format!("{n}-uuid"),
                name: n.to_string(),
            }),
            ..Resource::default()
        }
    }

    #[test]
    fn empty_list_renders_nothing() {
        assert_eq!(resources_table(&[], false), "");
        assert_eq!(environments_table(&[], false), "");
        assert_eq!(accounts_table(&[], "", false), "");
    }

    #[test]
    fn resources_table_aligns_columns() {
        let out = resources_table(&[resource("pg", None), resource("warehouse", Some("prod"))], false);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("UUID"));
        assert!(lines[1].chars().all(|c| c == '─'));
        assert!(lines[2].contains(COMMON_ENVIRONMENT));
        assert!(lines[3].contains("prod"));
        // Every row starts its NAME column at the same offset.
        let offset = lines[0].find("NAME").expect("header has NAME");
        assert_eq!(lines[2].find("pg"), Some(offset));
        assert_eq!(lines[3].find("warehouse"), Some(offset));
    }

    #[test]
    fn hidden_headers_drop_header_and_rule() {
        let out = resources_table(&[resource("pg", None)], true);
        assert_eq!(out.lines().count(), 1);
        assert!(!out.contains("UUID"));
    }

    #[test]
    fn resource_details_include_environment() {
        let out = resource_table(&resource("pg", Some("prod")));
        assert!(out.contains("Environment Name: prod"));
        assert!(out.contains("Environment UUID: prod-uuid"));
        assert!(out.contains("            Name: pg"));
    }

    #[test]
    fn resource_details_default_to_common_environment() {
        let out = resource_table(&resource("pg", None));
        assert!(out.ends_with("Environment Name: common"));
        assert!(!out.contains("State details"));
    }

    #[test]
    fn resource_types_are_sorted() {
        let out = resource_types_table(&["s3".to_string(), "mysql".to_string()], true);
        assert_eq!(out, "mysql\ns3");
    }

    #[test]
    fn current_account_is_marked() {
        let accounts = [
            Account {
                uuid: "a-1".to_string(),
                name: "personal".to_string(),
            },
            Account {
                uuid: "a-2".to_string(),
                name: "work".to_string(),
            },
        ];
        let out = accounts_table(&accounts, "a-2", true);
        assert_eq!(out, "a-1  personal\na-2  work (current)");
    }
}
