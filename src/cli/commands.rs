use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::news::service::NewsService;
use crate::news::NewsBatch;
use crate::storage::{FileStore, RecentSearches};

/// Write a default configuration file under the user config directory.
pub fn init(config_path: Option<PathBuf>) -> Result<()> {
    let config_file = match config_path {
        Some(path) => path,
        None => {
            let dir = Config::config_dir()?;
            if !dir.exists() {
                fs::create_dir_all(&dir)?;
                info!("Created configuration directory: {}", dir.display());
            }
            dir.join("config.toml")
        }
    };

    if config_file.exists() {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}",
            config_file.display()
        )));
    }

    let config = Config::default();
    config.save(&config_file)?;

    println!("Wrote default configuration to {}", config_file.display());
    println!();
    println!("Next steps:");
    println!("   1. Add your API keys under [api] api_keys = [\"...\"]");
    println!("   2. Fetch headlines: newsdesk headlines");

    Ok(())
}

pub async fn headlines(
    country: Option<String>,
    lang: Option<String>,
    page: usize,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let service = NewsService::from_config(&config)?;

    let country = country.unwrap_or(config.defaults.country);
    let lang = lang.unwrap_or(config.defaults.lang);

    let batch = service.top_headlines(&country, &lang, page).await;
    print_batch(&batch, &service);
    Ok(())
}

pub async fn category(
    name: String,
    country: Option<String>,
    lang: Option<String>,
    page: usize,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let service = NewsService::from_config(&config)?;

    let country = country.unwrap_or(config.defaults.country);
    let lang = lang.unwrap_or(config.defaults.lang);

    let batch = service.category_news(&name, &country, &lang, page).await;
    print_batch(&batch, &service);
    Ok(())
}

pub async fn search(
    query: String,
    lang: Option<String>,
    page: usize,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let service = NewsService::from_config(&config)?;

    let lang = lang.unwrap_or(config.defaults.lang);

    let batch = service.search(&query, &lang, page).await;

    // Recording the term is independent of whether the search succeeded.
    let recent = RecentSearches::new(FileStore::user_data()?);
    recent.save(&query)?;

    print_batch(&batch, &service);
    Ok(())
}

pub fn recent() -> Result<()> {
    let recent = RecentSearches::new(FileStore::user_data()?);
    let searches = recent.list();

    if searches.is_empty() {
        println!("No recent searches.");
    } else {
        for (i, query) in searches.iter().enumerate() {
            println!("{}. {}", i + 1, query);
        }
    }
    Ok(())
}

pub fn clear_recent() -> Result<()> {
    let recent = RecentSearches::new(FileStore::user_data()?);
    recent.clear_all()?;
    println!("Recent searches cleared.");
    Ok(())
}

fn print_batch(batch: &NewsBatch, service: &NewsService) {
    if batch.is_empty() {
        println!("No articles found.");
        return;
    }

    for article in &batch.articles {
        println!("• {}", article.title);
        println!("  {} — {}", article.source.name, article.url);
        if !article.description.is_empty() {
            println!("  {}", article.description);
        }
        println!();
    }

    println!("{} article(s)", batch.total_articles);
    if service.has_more_pages(batch) {
        println!("More pages may be available.");
    }
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let config_file = match config_path {
        Some(path) => path,
        None => Config::config_dir()?.join("config.toml"),
    };

    if config_file.exists() {
        debug!("Loading configuration from {}", config_file.display());
        Config::load_with_env(&config_file)
    } else {
        // No file yet: fall back to defaults plus environment overrides,
        // so NEWSDESK_API_KEYS alone is enough to get started.
        let mut config = Config::default();
        if let Ok(keys) = std::env::var("NEWSDESK_API_KEYS") {
            config.api.api_keys = keys
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn init_logging(debug: bool, verbose: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(debug)
        .with_line_number(debug)
        .init();

    tracing::debug!("Logging initialized");
    Ok(())
}
