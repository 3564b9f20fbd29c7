use clap::Subcommand;
use colored::Colorize;
use routeboard_lib::{
    Repository,
    repository::{GalleryImage, GalleryRow, NewGalleryImage},
};

use crate::{Failure, Outcome};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List gallery rows in display order
    List,
    /// Add a row at the end of the gallery
    Add { title: String },
    /// Rename a row
    Rename { title: String, new_title: String },
    /// Remove a row
    Remove { title: String },
    /// Operate on the images of a row
    #[command(subcommand)]
    Image(ImageCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum ImageCommand {
    /// List the images of a row in display order
    List { row: String },
    /// Add an image at the end of a row
    Add {
        row: String,
        url: String,
        title: String,
        #[arg(long)]
        subtitle: Option<String>,
    },
    /// Change the details of an image
    Edit {
        row: String,
        title: String,
        #[arg(long)]
        new_title: Option<String>,
        #[arg(long)]
        url: Option<String>,
        /// An empty string clears it
        #[arg(long)]
        subtitle: Option<String>,
    },
    /// Remove an image from its row
    Remove { row: String, title: String },
}

pub fn handle(repo: &Repository, cmd: &Command) -> Outcome {
    match cmd {
        Command::List => {
            for row in repo.gallery_rows()? {
                let count = row.images()?.len();
                println!(
                    "{:>4}. {}  {}",
                    row.position()?,
                    row.title()?.bold(),
                    format!("({count} images)").dimmed()
                );
            }
        }
        Command::Add { title } => {
            repo.add_gallery_row(title)?;
            println!("Added gallery row {}", title.bold());
        }
        Command::Rename { title, new_title } => {
            find(repo, title)?.set_title(new_title)?;
        }
        Command::Remove { title } => {
            find(repo, title)?.remove()?;
            println!("Removed gallery row {}", title.bold());
        }
        Command::Image(cmd) => handle_image(repo, cmd)?,
    }

    Ok(())
}

fn handle_image(repo: &Repository, cmd: &ImageCommand) -> Outcome {
    match cmd {
        ImageCommand::List { row } => {
            for image in find(repo, row)?.images()? {
                let subtitle = image
                    .subtitle()?
                    .map(|s| format!("  {s}"))
                    .unwrap_or_default();
                println!(
                    "{:>4}. {}{subtitle}  {}",
                    image.position()?,
                    image.title()?.bold(),
                    image.url()?.dimmed()
                );
            }
        }
        ImageCommand::Add {
            row,
            url,
            title,
            subtitle,
        } => {
            let mut image = NewGalleryImage::new(url, title);
            image.subtitle = subtitle.clone().filter(|s| !s.is_empty());

            find(repo, row)?.add_image(&image)?;
            println!("Added image {} to {}", title.bold(), row);
        }
        ImageCommand::Edit {
            row,
            title,
            new_title,
            url,
            subtitle,
        } => {
            let image = find_image(&find(repo, row)?, title)?;

            if let Some(url) = url {
                image.set_url(url)?;
            }
            if let Some(subtitle) = subtitle {
                image.set_subtitle(Some(subtitle.as_str()).filter(|s| !s.is_empty()))?;
            }
            if let Some(new_title) = new_title {
                image.set_title(new_title)?;
            }
        }
        ImageCommand::Remove { row, title } => {
            find_image(&find(repo, row)?, title)?.remove()?;
            println!("Removed image {}", title.bold());
        }
    }

    Ok(())
}

pub fn find(repo: &Repository, title: &str) -> Result<GalleryRow, Failure> {
    for row in repo.gallery_rows()? {
        if row.title()? == title {
            return Ok(row);
        }
    }

    Err(Failure::not_found(format!("No gallery row titled '{title}'")))
}

fn find_image(row: &GalleryRow, title: &str) -> Result<GalleryImage, Failure> {
    for image in row.images()? {
        if image.title()? == title {
            return Ok(image);
        }
    }

    Err(Failure::not_found(format!(
        "No image titled '{title}' in gallery row {}",
        row.title()?
    )))
}
