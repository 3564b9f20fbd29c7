use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use colored::Colorize;
use routeboard_lib::{
    Repository,
    repository::{GalleryRow, Route},
    schedule::Schedule,
    session::SortSession,
    sort::{Row, SortEntry},
    store::{DbStore, SavedSortList},
};

use crate::{Failure, Outcome, gallery, route};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Preview the order an edit would produce
    Show(Edit),
    /// Reorder and save the new positions
    Apply(Edit),
    /// Save an edit as a named sort list for the region
    Save {
        name: String,
        #[command(flatten)]
        edit: Edit,
    },
    /// List the saved sort lists of the region
    Lists,
    /// Delete a saved sort list by id or name
    Delete { list: String },
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false, id = "target")]
pub struct Target {
    /// Reorder the locations of this route
    #[arg(long)]
    route: Option<String>,
    /// Reorder the gallery rows
    #[arg(long)]
    gallery: bool,
    /// Reorder the images of the gallery row with this title
    #[arg(long, value_name = "ROW")]
    images: Option<String>,
}

/// What an edit reorders.
enum Sorted {
    Locations(Route),
    GalleryRows,
    Images(GalleryRow),
}

#[derive(Args, Debug, Clone)]
pub struct Edit {
    #[command(flatten)]
    target: Target,
    /// Start from a saved sort list instead of the current order
    #[arg(short, long)]
    list: Option<String>,
    /// Position a row, as CODE=N or @ID=N. Leave N empty to let the row be placed automatically.
    #[arg(short, long = "order", value_name = "CODE=N", value_parser = parse_assignment)]
    orders: Vec<(String, String)>,
}

pub fn handle(repo: &Repository, region: &str, cmd: &Command) -> Outcome {
    let today = Local::now().date_naive();
    let schedule = repo.schedule();

    match cmd {
        Command::Show(edit) => {
            let (_, session) = open(repo, region, edit)?;
            print_duplicates(&session);
            print_order(&session, &session.resolve(today, &schedule), today, &schedule);
        }
        Command::Apply(edit) => {
            let (sorted, session) = open(repo, region, edit)?;
            print_duplicates(&session);

            let resolved = session.resolve(today, &schedule);
            match sorted {
                Sorted::Locations(route) => route.apply_sort(&resolved)?,
                Sorted::GalleryRows => repo.reorder_gallery_rows(&resolved)?,
                Sorted::Images(row) => row.reorder_images(&resolved)?,
            }

            print_order(&session, &resolved, today, &schedule);
            println!("{}", "Order saved".green());
        }
        Command::Save { name, edit } => {
            let (_, session) = open(repo, region, edit)?;
            print_duplicates(&session);

            let list = session.save_as(name)?;
            println!("Saved sort list {} ({})", list.name.bold(), list.id.dimmed());
        }
        Command::Lists => {
            for list in repo.sort_lists().load(region) {
                print_list(&list);
            }
        }
        Command::Delete { list } => {
            let session = SortSession::new(Vec::new(), region, repo.sort_lists());
            let removed = session.delete_list(list)?;
            println!("Deleted sort list {}", removed.name.bold());
        }
    }

    Ok(())
}

/// Open a session on the edit's target with the edit's list and positions applied.
fn open(
    repo: &Repository,
    region: &str,
    edit: &Edit,
) -> Result<(Sorted, SortSession<DbStore>), Failure> {
    let (sorted, rows) = match (&edit.target.route, &edit.target.images, edit.target.gallery) {
        (Some(code), _, _) => {
            let route = route::find(repo, code)?;
            let rows = route.rows()?;
            (Sorted::Locations(route), rows)
        }
        (None, Some(title), _) => {
            let row = gallery::find(repo, title)?;
            let rows = row
                .images()?
                .iter()
                .map(|i| i.row())
                .collect::<Result<Vec<Row>, _>>()?;
            (Sorted::Images(row), rows)
        }
        (None, None, _) => {
            let rows = repo
                .gallery_rows()?
                .iter()
                .map(|r| r.row())
                .collect::<Result<Vec<Row>, _>>()?;
            (Sorted::GalleryRows, rows)
        }
    };

    let mut session = SortSession::new(rows, region, repo.sort_lists());

    if let Some(list) = &edit.list {
        session.load_list(list)?;
    }

    for (key, order) in &edit.orders {
        let id = session.find_row(key)?.id.clone();
        session.set_order(&id, order);
    }

    Ok((sorted, session))
}

fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, order)) if !key.is_empty() => Ok((key.to_string(), order.to_string())),
        _ => Err(format!("expected CODE=N, got '{arg}'")),
    }
}

fn print_duplicates(session: &SortSession<DbStore>) {
    for duplicate in session.duplicates() {
        println!(
            "{} position {} is used by {}",
            "warning:".yellow().bold(),
            duplicate.order,
            duplicate.codes.join(", ")
        );
    }
}

fn print_order(
    session: &SortSession<DbStore>,
    resolved: &[SortEntry],
    today: NaiveDate,
    schedule: &Schedule,
) {
    for entry in resolved {
        let Some(row) = session.row(&entry.id) else {
            continue;
        };

        let position = entry
            .custom_order
            .map(|o| o.to_string())
            .unwrap_or_default();
        let line = format!(
            "{position:>4}. {}  {}  {}",
            row.code,
            row.label,
            format!("@{}", row.id).dimmed()
        );

        let served = match (row.delivery_days, row.delivery_mode) {
            (Some(days), _) if !days.is_empty() => Some(days.to_string()),
            (_, Some(mode)) => Some(mode.to_string()),
            _ => None,
        };

        match served {
            Some(served) if schedule.serves(row, today) => {
                println!("{line}  {}", format!("[{served}]").green());
            }
            Some(served) => println!("{}", format!("{line}  [{served}, off today]").dimmed()),
            None => println!("{line}"),
        }
    }
}

fn print_list(list: &SavedSortList) {
    println!(
        "{}  {}  {}",
        list.name.bold(),
        list.id.dimmed(),
        format!(
            "{} rows, created {}",
            list.sort_config.len(),
            list.created_at.format("%Y-%m-%d %H:%M")
        )
        .dimmed()
    );
}
