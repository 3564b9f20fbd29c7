use clap::{Args, Subcommand};
use colored::Colorize;
use routeboard_lib::{
    Repository,
    repository::{Location, NewLocation, Route},
    schedule::{DeliveryDays, DeliveryMode},
};

use crate::{Failure, Outcome, route};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the locations of a route in delivery order
    List { route: String },
    /// Add a location at the end of a route
    Add {
        route: String,
        code: String,
        name: String,
        #[arg(long)]
        address: Option<String>,
        /// Contact person or phone number
        #[arg(long)]
        contact: Option<String>,
        #[command(flatten)]
        mode: ModeArgs,
    },
    /// Change the details of a location
    Edit {
        route: String,
        code: String,
        #[arg(long)]
        new_code: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// Street address, an empty string clears it
        #[arg(long)]
        address: Option<String>,
        /// Contact person or phone number, an empty string clears it
        #[arg(long)]
        contact: Option<String>,
        /// Free form notes, an empty string clears them
        #[arg(long)]
        notes: Option<String>,
        #[command(flatten)]
        mode: ModeArgs,
    },
    /// Remove a location from its route
    Remove { route: String, code: String },
}

#[derive(Args, Debug, Clone)]
pub struct ModeArgs {
    /// Delivery mode: daily, alt1, alt2, weekday or weekend
    #[arg(short, long)]
    mode: Option<DeliveryMode>,
    /// Served weekdays, 0 (Sunday) to 6 (Saturday), instead of a mode
    #[arg(
        long,
        value_delimiter = ',',
        conflicts_with = "mode",
        value_parser = clap::value_parser!(u8).range(0..=6)
    )]
    days: Option<Vec<u8>>,
}

impl ModeArgs {
    fn delivery_days(&self) -> Option<DeliveryDays> {
        self.days.as_deref().map(DeliveryDays::from_days)
    }
}

pub fn handle(repo: &Repository, cmd: &Command) -> Outcome {
    match cmd {
        Command::List { route } => {
            for location in route::find(repo, route)?.locations()? {
                let contact = location
                    .contact()?
                    .map(|c| format!("  {}", c.dimmed()))
                    .unwrap_or_default();
                println!(
                    "{:>4}. {}  {}  [{}]{contact}",
                    location.position()?,
                    location.code()?.bold(),
                    location.name()?,
                    served(&location)?
                );
            }
        }
        Command::Add {
            route,
            code,
            name,
            address,
            contact,
            mode,
        } => {
            let route = route::find(repo, route)?;

            let mut location = NewLocation::new(code, name);
            location.address = address.clone();
            location.contact = contact.clone();
            location.delivery_mode = mode.mode;
            location.delivery_days = mode.delivery_days();

            route.add_location(&location)?;
            println!("Added location {} to {}", code.bold(), route.code()?);
        }
        Command::Edit {
            route,
            code,
            new_code,
            name,
            address,
            contact,
            notes,
            mode,
        } => {
            let location = find(&route::find(repo, route)?, code)?;

            if let Some(name) = name {
                location.set_name(name)?;
            }
            if let Some(address) = address {
                location.set_address(Some(address.as_str()).filter(|a| !a.is_empty()))?;
            }
            if let Some(contact) = contact {
                location.set_contact(Some(contact.as_str()).filter(|c| !c.is_empty()))?;
            }
            if let Some(notes) = notes {
                location.set_notes(Some(notes.as_str()).filter(|n| !n.is_empty()))?;
            }
            if let Some(mode) = mode.mode {
                location.set_delivery_mode(mode)?;
            }
            if let Some(days) = mode.delivery_days() {
                location.set_delivery_days(days)?;
            }
            if let Some(new_code) = new_code {
                location.set_code(new_code)?;
            }
        }
        Command::Remove { route, code } => {
            find(&route::find(repo, route)?, code)?.remove()?;
            println!("Removed location {}", code.bold());
        }
    }

    Ok(())
}

/// Served days if the location has them, else its delivery mode.
pub fn served(location: &Location) -> Result<String, Failure> {
    Ok(match location.delivery_days()? {
        Some(days) if !days.is_empty() => days.to_string(),
        _ => location.delivery_mode()?.to_string(),
    })
}

/// First active location on `route` with `code`.
fn find(route: &Route, code: &str) -> Result<Location, Failure> {
    for location in route.locations()? {
        if location.code()? == code {
            return Ok(location);
        }
    }

    Err(Failure::not_found(format!(
        "No location with code '{code}' on route {}",
        route.code()?
    )))
}
