use std::sync::Arc;
use std::time::Duration;

use crate::app::{AppContext, CatalogError, Result};
use crate::config::parse_interval;
use crate::daemon::{Daemon, DaemonConfig};
use crate::domain::{Category, Movie};
use crate::router::{QueryResult, ResourceAddress};
use crate::sync::{SyncTarget, Synchronizer};

pub async fn sync(ctx: &AppContext, target: Option<&str>) -> Result<()> {
    let reports = match target {
        Some(name) => {
            let target = resolve_target(&ctx.synchronizer, name)?.clone();
            vec![ctx.synchronizer.sync(&target).await]
        }
        None => ctx.synchronizer.sync_all().await,
    };

    let mut failed = 0;
    for report in &reports {
        if report.is_failed() {
            failed += 1;
            eprintln!("{}", report);
        } else {
            println!("{}", report);
        }
    }

    if failed == reports.len() {
        return Err(CatalogError::Network(format!("{} sync(s) failed", failed)));
    }
    Ok(())
}

/// Match a target by tag first, then by category name.
fn resolve_target<'a>(synchronizer: &'a Synchronizer, name: &str) -> Result<&'a SyncTarget> {
    if let Some(target) = synchronizer.target_by_tag(name) {
        return Ok(target);
    }
    let category: Category = name.parse()?;
    synchronizer
        .target_for(category)
        .ok_or_else(|| {
            CatalogError::NotSupported(format!("{} is not synced from remote", category))
        })
}

pub async fn list(ctx: &AppContext, category: &str) -> Result<()> {
    let category: Category = category.parse()?;
    let movies = ctx.synchronizer.ensure_available(category).await?;

    if movies.is_empty() {
        println!("No {} movies", category);
        return Ok(());
    }

    for movie in &movies {
        let marker = if ctx.favorites.is_favorite(movie.id)? {
            "*"
        } else {
            " "
        };
        println!("{} {}", marker, movie_line(movie));
    }

    Ok(())
}

fn movie_line(movie: &Movie) -> String {
    let year = movie
        .release_year()
        .map(|y| y.to_string())
        .unwrap_or_else(|| "----".to_string());
    format!(
        "{:>8}  {}  {:>4.1}  {}",
        movie.id, year, movie.vote_average, movie.title
    )
}

pub fn show(ctx: &AppContext, id: i64) -> Result<()> {
    let Some(movie) = ctx.router.query(&ResourceAddress::Movie(id))?.into_movie() else {
        println!("Movie {} is not cached", id);
        return Ok(());
    };

    let released = movie
        .release_datetime()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    println!("{} ({})", movie.title, released);
    println!(
        "  Rating {:.1}, {} min{}",
        movie.vote_average,
        movie.runtime,
        if ctx.favorites.is_favorite(id)? {
            ", favorite"
        } else {
            ""
        }
    );
    println!("  Poster: {}", movie.poster_url(&ctx.config.remote.image_base_url));
    println!();
    println!("{}", movie.overview);

    let reviews = ctx.router.query(&ResourceAddress::MovieReviews(id))?;
    if let QueryResult::Reviews(reviews) = reviews {
        if !reviews.is_empty() {
            println!("\nReviews:");
            for review in reviews {
                println!("  {} - {}", review.author, review.url);
            }
        }
    }

    let trailers = ctx.router.query(&ResourceAddress::MovieTrailers(id))?;
    if let QueryResult::Trailers(trailers) = trailers {
        if !trailers.is_empty() {
            println!("\nTrailers:");
            for trailer in trailers {
                let link = trailer
                    .watch_url()
                    .unwrap_or_else(|| format!("{} {}", trailer.site, trailer.key));
                println!("  {} - {}", trailer.name, link);
            }
        }
    }

    Ok(())
}

pub fn set_favorite(ctx: &AppContext, id: i64, wanted: bool) -> Result<()> {
    let changed = ctx.favorites.set_favorite(id, wanted)?;
    let state = if wanted { "a favorite" } else { "not a favorite" };
    if changed {
        println!("Movie {} is now {}", id, state);
    } else {
        println!("Movie {} was already {}", id, state);
    }
    Ok(())
}

pub fn query(ctx: &AppContext, address: &str) -> Result<()> {
    let result = ctx.router.query_path(address)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub async fn daemon(
    ctx: &AppContext,
    interval: Option<&str>,
    no_initial_update: bool,
) -> Result<()> {
    let interval = interval
        .map(|s| parse_interval(s).map(Duration::from_secs))
        .transpose()
        .map_err(CatalogError::Config)?;

    let mut config =
        DaemonConfig::from_config(&ctx.config, ctx.synchronizer.targets(), interval)?;
    if no_initial_update {
        config.update_on_start = false;
    }

    let daemon = Arc::new(Daemon::new(ctx.synchronizer.clone(), config));
    daemon.run().await
}
