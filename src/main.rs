use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::task::LocalSet;
use tracing::info;

use autorows::image_loader::scan_directory;
use autorows::layout::{compute_layout, LayoutConfig};
use autorows::models::LayoutResult;
use autorows::schedule::TokioScheduler;
use autorows::slideshow::{ActiveSetCoordinator, SlideRotator};

/// Lay the images of a directory out in justified rows.
#[derive(Debug, Parser)]
#[command(name = "autorows", version)]
struct Cli {
    /// Directory to scan for images
    dir: PathBuf,

    /// Container width in px
    #[arg(long, default_value_t = 1200.0)]
    width: f32,

    /// Images per row
    #[arg(long, default_value_t = 2)]
    columns: usize,

    /// Space between images in px
    #[arg(long, default_value_t = 10.0)]
    gutter: f32,

    /// Give a leading landscape image its own full-width row
    #[arg(long)]
    full_width_landscape: bool,

    /// Descend into subdirectories
    #[arg(long)]
    recursive: bool,

    /// After the layout, rotate through this many slides
    #[arg(long, value_name = "SLIDES")]
    slideshow: Option<usize>,

    /// Slide delay in ms
    #[arg(long, default_value_t = 1000)]
    delay: u64,
}

fn print_layout(layout: &LayoutResult) {
    for row in &layout.placements {
        let items: Vec<String> = row
            .items
            .iter()
            .map(|p| format!("{} @{}+{:.1}", p.item.correlation_id, p.left_px, p.width_px))
            .collect();
        println!(
            "row {:>3}  top {:>8.1}  height {:>7.1}  {}",
            row.row_index,
            row.top_px,
            row.row_height_px,
            items.join("  ")
        );
    }
    println!("total height {:.1}", layout.total_height_px);
}

async fn preview_slideshow(slides: Vec<String>, ticks: usize, delay: Duration) -> Result<()> {
    let scheduler = Rc::new(TokioScheduler::new());
    let active = ActiveSetCoordinator::new(slides, Vec::new());
    let rotator = SlideRotator::new(scheduler, delay, active);
    let changes = rotator.subscribe();
    rotator.start()?;

    for _ in 0..ticks {
        let change = changes.recv_async().await.context("Slideshow ended early")?;
        println!("slide {:>3}  {}", change.index, change.slide_id);
    }
    rotator.stop();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("autorows=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let items = scan_directory(&cli.dir, cli.recursive)?;
    if items.is_empty() {
        bail!("No images found in {:?}", cli.dir);
    }
    info!(count = items.len(), dir = ?cli.dir, "Laying out images");

    let config = LayoutConfig::new(cli.columns, cli.gutter, cli.full_width_landscape)?;
    let layout = compute_layout(&items, cli.width, &config)?;
    print_layout(&layout);

    if let Some(ticks) = cli.slideshow {
        let slides = items.into_iter().map(|i| i.correlation_id).collect();
        LocalSet::new()
            .run_until(preview_slideshow(slides, ticks, Duration::from_millis(cli.delay)))
            .await?;
    }

    Ok(())
}
