use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use linktally::report;
use linktally_crawler::Crawler;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = commands::command_argument_builder();
    let matches = cmd.get_matches();

    tracing_subscriber::fmt::init();

    let url_arg = matches.get_one::<String>("URL").unwrap();
    let threads = *matches.get_one::<usize>("threads").unwrap();
    let timeout = *matches.get_one::<u64>("timeout").unwrap();
    let format = matches.get_one::<String>("format").unwrap();
    let quiet = matches.get_flag("quiet");

    // The only fatal input: a base URL that does not parse leaves no
    // origin to bound the crawl against.
    let base = match Url::parse(url_arg) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("✗ Invalid base URL '{}': {}", url_arg, e);
            std::process::exit(1);
        }
    };
    let host = match base.host_str() {
        Some(host) => host.to_string(),
        None => {
            eprintln!("✗ Base URL '{}' has no host", url_arg);
            std::process::exit(1);
        }
    };

    if !quiet {
        println!("\n🕷  Crawling {}", host);
        println!("Workers: {}\n", threads);
    }

    // Single spinner fed by the per-page progress callback
    let progress_bar = if !quiet {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let mut crawler = Crawler::with_timeout(timeout);

    if let Some(ref pb) = progress_bar {
        let pb = pb.clone();
        let attempted = Arc::new(AtomicUsize::new(0));
        crawler = crawler.with_progress_callback(Arc::new(move |_worker_id, _url| {
            let count = attempted.fetch_add(1, Ordering::Relaxed) + 1;
            pb.set_message(format!("Crawling... {} pages attempted", count));
            pb.tick();
        }));
    }

    // Per-page failures are recorded by the crawler and never abort the
    // run, so a completed traversal always exits 0.
    match crawler.crawl(url_arg, url_arg, threads).await {
        Ok(index) => {
            if let Some(ref pb) = progress_bar {
                pb.finish_and_clear();
            }
            if !quiet {
                println!("{} Crawl complete!\n", "✓".green().bold());
            }

            let output = match format.as_str() {
                "json" => report::generate_json_report(url_arg, &index),
                _ => report::generate_report(url_arg, &index),
            };
            print!("{}", output);
        }
        Err(e) => {
            if let Some(ref pb) = progress_bar {
                pb.finish_and_clear();
            }
            eprintln!("✗ Crawl failed: {}", e);
            std::process::exit(1);
        }
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
