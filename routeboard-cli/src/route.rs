use clap::Subcommand;
use colored::Colorize;
use routeboard_lib::{Repository, repository::Route};

use crate::{Failure, Outcome, location};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the routes of the region
    List,
    /// Show a route and its locations
    Show { code: String },
    /// Add a new route to the region
    Add {
        code: String,
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Change the details of a route
    Edit {
        code: String,
        /// New route code
        #[arg(long)]
        new_code: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// New description, an empty string clears it
        #[arg(long)]
        description: Option<String>,
    },
    /// Remove a route
    Remove { code: String },
}

pub fn handle(repo: &Repository, region: &str, cmd: &Command) -> Outcome {
    match cmd {
        Command::List => {
            for route in repo.routes(region)? {
                let count = route.locations()?.len();
                println!(
                    "{}  {}  {}",
                    route.code()?.bold(),
                    route.name()?,
                    format!("({count} locations)").dimmed()
                );
            }
        }
        Command::Show { code } => {
            let route = find(repo, code)?;

            println!("{}  {}", route.code()?.bold(), route.name()?);
            if let Some(description) = route.description()? {
                println!("{}", description.dimmed());
            }
            for location in route.locations()? {
                println!(
                    "{:>4}. {}  {}  [{}]",
                    location.position()?,
                    location.code()?,
                    location.name()?,
                    location::served(&location)?
                );
            }
        }
        Command::Add {
            code,
            name,
            description,
        } => {
            repo.add_route(region, code, name, description.as_deref())?;
            println!("Added route {}", code.bold());
        }
        Command::Edit {
            code,
            new_code,
            name,
            description,
        } => {
            let route = find(repo, code)?;

            if let Some(name) = name {
                route.set_name(name)?;
            }
            if let Some(description) = description {
                route.set_description(Some(description.as_str()).filter(|d| !d.is_empty()))?;
            }
            if let Some(new_code) = new_code {
                route.set_code(new_code)?;
            }
        }
        Command::Remove { code } => {
            find(repo, code)?.remove()?;
            println!("Removed route {}", code.bold());
        }
    }

    Ok(())
}

/// The active route with `code`.
pub fn find(repo: &Repository, code: &str) -> Result<Route, Failure> {
    repo.route(code)?
        .ok_or_else(|| Failure::not_found(format!("No route with code '{code}'")))
}
