// ABOUTME: CLI commands for managing tags
// ABOUTME: Tags are addressed by name (case-insensitive) or id

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use inquire::Confirm;
use tasklane_cli::App;
use tasklane_core::{TagCreateInput, TagUpdateInput};

use super::display::print_tag_table;

#[derive(Subcommand)]
pub enum TagCommands {
    /// Create a tag
    Add {
        name: String,
        /// Hex color such as #ff8800
        #[arg(short, long)]
        color: Option<String>,
    },
    /// List tags with how many tasks use them
    List,
    /// Rename a tag
    Rename {
        /// Current name or ID
        tag: String,
        new_name: String,
    },
    /// Delete a tag and remove it from every task
    Delete {
        /// Name or ID
        tag: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn handle_tag_command(app: &mut App, command: TagCommands) -> Result<()> {
    match command {
        TagCommands::Add { name, color } => {
            let owner = app.owner();
            let tag = app
                .tags
                .create(TagCreateInput { name, color }, owner.as_deref())
                .await?;
            println!("{}", format!("Tag '{}' created", tag.name).green());
            println!("ID: {}", tag.id.cyan());
            Ok(())
        }
        TagCommands::List => {
            if app.tags.tags().is_empty() {
                println!("{}", "No tags yet".yellow());
                println!("{}", "Use 'tasklane tag add <name>' to create one".dimmed());
                return Ok(());
            }
            print_tag_table(app.tags.tags(), app.tasks.tasks());
            Ok(())
        }
        TagCommands::Rename { tag, new_name } => {
            let existing = app.find_tag(&tag)?;
            let renamed = app
                .tags
                .update(
                    &existing.id,
                    TagUpdateInput {
                        name: Some(new_name),
                        ..Default::default()
                    },
                )
                .await?;
            println!(
                "{}",
                format!("Renamed '{}' to '{}'", existing.name, renamed.name).green()
            );
            Ok(())
        }
        TagCommands::Delete { tag, yes } => {
            let existing = app.find_tag(&tag)?;
            let prompt = format!("Delete tag '{}'?", existing.name);
            let confirmed = yes || Confirm::new(&prompt).with_default(false).prompt()?;

            if !confirmed {
                println!("{}", "Operation cancelled".yellow());
                return Ok(());
            }

            let detached = app.tags.delete(&existing.id).await?;
            app.tasks.forget_tag(&existing.id);
            println!(
                "{}",
                format!(
                    "Tag '{}' deleted and removed from {} task(s)",
                    existing.name, detached
                )
                .green()
            );
            Ok(())
        }
    }
}
