use clap::{Parser, ValueEnum};
use libflickgrab::{get_images, DownloadRule, Event, EventBus, View};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "A gallery image fetcher",
    long_about = "Downloads every full-size image of a user's photostream, sets listing or favorites."
)]
pub struct Cli {
    username: String,
    #[arg(value_enum, default_value = "photostream")]
    view: ViewKind,
    #[arg(help = "Directory the images are written to. Defaults to ./images", long)]
    output_directory: Option<PathBuf>,
    #[arg(
        default_value = "500",
        help = "Delay step between download launches, in milliseconds.",
        long
    )]
    delay: u64,
    #[arg(
        help = "Count failed downloads toward run completion instead of leaving the \
        final event unfired when an item errors.",
        long
    )]
    count_failed_downloads: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ViewKind {
    Photostream,
    Sets,
    Favorites,
}

impl From<ViewKind> for View {
    fn from(kind: ViewKind) -> Self {
        match kind {
            ViewKind::Photostream => View::Photostream,
            ViewKind::Sets => View::Set,
            ViewKind::Favorites => View::Favorites,
        }
    }
}

pub async fn fetch(cli: Cli) {
    println!("Fetching images for {}....", cli.username);
    let mut bus = EventBus::new();
    bus.register(|event| match event {
        Event::PageCountLoaded => println!("{}", "Page count loaded".cyan()),
        Event::ImageUrlsLoaded => println!("{}", "Image urls loaded".cyan()),
        Event::DownloadFinished(image_url) => {
            println!("{} {}", "[Downloaded]".green(), image_url)
        }
        Event::AllDownloadsFinished => println!("{}", "All downloads finished".green()),
        Event::Error { stage, error } => {
            eprintln!("{} {} | {}", "[Error]".red(), stage, error)
        }
    });
    match get_images(
        &cli.username,
        cli.view.into(),
        cli.output_directory.clone(),
        DownloadRule {
            launch_interval: Duration::from_millis(cli.delay),
            count_failed_downloads: cli.count_failed_downloads,
        },
        &bus,
    )
    .await
    {
        Ok(_) => {
            println!(
                "Run complete. Images are in {}",
                cli.output_directory
                    .unwrap_or_else(|| PathBuf::from("images"))
                    .to_string_lossy()
            );
        }
        Err(e) => {
            println!("Download wasn't able to complete");
            println!("{}", e);
        }
    }
}
