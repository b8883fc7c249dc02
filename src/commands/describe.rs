//! Plugin self-description for the orchestration host.
//!
//! Metadata only; nothing here touches a lock.

use crate::cli::{DescribeArgs, DescribeFormat};
use crate::error::{Result, SerializerError};
use serde::{Deserialize, Serialize};

/// Top-level description reported to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Describe {
    pub commands: Vec<ExtensionCommand>,
}

/// A command group the host can invoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionCommand {
    pub name: String,
    pub description: String,
    /// Subcommands available under this group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
}

impl Describe {
    /// The description of this extension.
    pub fn current() -> Self {
        Self {
            commands: vec![ExtensionCommand {
                name: "serializer".to_string(),
                description: "extension commands".to_string(),
                commands: ["lock", "unlock", "describe", "initialize"]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            }],
        }
    }

    /// Render in the requested format.
    pub fn render(&self, format: DescribeFormat) -> Result<String> {
        match format {
            DescribeFormat::Text => Ok(self.render_text()),
            DescribeFormat::Json => serde_json::to_string_pretty(self).map_err(|e| {
                SerializerError::UserError(format!("failed to serialize description to JSON: {}", e))
            }),
            DescribeFormat::Yaml => serde_yaml::to_string(self).map_err(|e| {
                SerializerError::UserError(format!("failed to serialize description to YAML: {}", e))
            }),
        }
    }

    fn render_text(&self) -> String {
        let mut out = String::from("commands:\n");
        for command in &self.commands {
            out.push_str(&format!("  {}: {}\n", command.name, command.description));
            for sub in &command.commands {
                out.push_str(&format!("    - {}\n", sub));
            }
        }
        out
    }
}

pub(super) fn cmd_describe(args: DescribeArgs) -> Result<()> {
    let rendered = Describe::current().render(args.format)?;
    print!("{}", rendered);
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}
