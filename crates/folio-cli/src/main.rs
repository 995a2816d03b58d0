//! Folio CLI - Command Line Interface
//!
//! Loads a book catalog file into the embedded document store and runs the
//! catalog queries, alone or as a full report.
//!
//! Key Features:
//! - Language filter, genre counts, most rated books, language summary
//! - Index measurements before and after creation
//! - Title text search
//! - Text or JSON output
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use clap::{Parser, Subcommand};
use folio_books::{open_catalog, ratings_label, Book, Catalog, CatalogReport, CatalogResult};
use folio_common::FolioConfig;
use folio_document::{DocumentEngine, TextLanguage};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// =============================================================================
// CLI Arguments
// =============================================================================

#[derive(Parser)]
#[command(name = "folio")]
#[command(author = "AutomataNexus Development Team")]
#[command(version = "0.1.0")]
#[command(about = "Folio book catalog queries", long_about = None)]
struct Cli {
    /// Catalog file, a JSON array or JSON Lines of book documents
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all six queries with index measurements
    Report,
    /// Books written in a language
    Find {
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Number of books per genre
    Genres,
    /// Most rated books
    Top {
        #[arg(short)]
        n: Option<usize>,
    },
    /// Books and average page count per language
    Languages,
    /// Execution statistics of the language filter
    Explain {
        #[arg(short, long)]
        language: Option<String>,
        /// Measure again after creating the language index
        #[arg(long)]
        index: bool,
    },
    /// Search titles through the text index
    Search {
        term: Option<String>,
        /// Default language of the title text index
        #[arg(short, long)]
        language: Option<String>,
        /// Scan titles with a pattern instead of using the text index
        #[arg(long)]
        scan: bool,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        tracing::error!(error = %err, "folio failed");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CatalogResult<()> {
    let config = match &cli.config {
        Some(path) => FolioConfig::from_file(path)?,
        None => FolioConfig::default(),
    };

    let (catalog, summary) = open_catalog(&config, cli.data.as_deref())?;
    tracing::info!(
        books = summary.books,
        batches = summary.batches,
        authors = summary.authors,
        genres = summary.genres,
        "catalog loaded"
    );

    let queries = &config.queries;
    let json = cli.json;

    match cli.command {
        Commands::Report => {
            let report = CatalogReport::run(&catalog, queries)?;
            if json {
                print_json(&report)?;
            } else {
                print!("{}", report);
            }
        }
        Commands::Find { language } => {
            let language = language.unwrap_or_else(|| queries.language.clone());
            let books = catalog.books_by_language(&language)?;
            if json {
                print_json(&books)?;
            } else {
                println!("{} books in language {:?}", books.len(), language);
                for book in &books {
                    println!("{}", listing(book));
                }
            }
        }
        Commands::Genres => {
            let mut counts = catalog.genre_counts()?;
            counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.genre.cmp(&b.genre)));
            if json {
                print_json(&counts)?;
            } else {
                for count in &counts {
                    println!(
                        "{:<30} {}",
                        count.genre.as_deref().unwrap_or("(none)"),
                        count.count
                    );
                }
            }
        }
        Commands::Top { n } => {
            let top = catalog.top_rated(n.unwrap_or(queries.top_n))?;
            if json {
                print_json(&top)?;
            } else {
                for book in &top {
                    println!("{:>8}  [{}] {}", ratings_label(book), book.id(), book.title());
                }
            }
        }
        Commands::Languages => {
            let summary = catalog.language_summary()?;
            if json {
                print_json(&summary)?;
            } else {
                for row in &summary {
                    let avg = row
                        .avg_page_count
                        .map_or_else(|| "-".to_string(), |a| format!("{:.1}", a));
                    println!(
                        "{:<10} {:>6} books  avg pages {}",
                        row.language.as_deref().unwrap_or("(none)"),
                        row.total_books,
                        avg
                    );
                }
            }
        }
        Commands::Explain { language, index } => {
            let language = language.unwrap_or_else(|| queries.language.clone());
            if index {
                let comparison = catalog.compare_language_index(&language)?;
                if json {
                    print_json(&comparison)?;
                } else {
                    println!("{}", comparison);
                }
            } else {
                let stats = catalog.explain_language(&language)?;
                if json {
                    print_json(&stats)?;
                } else {
                    println!("{}", stats);
                }
            }
        }
        Commands::Search {
            term,
            language,
            scan,
        } => {
            let term = term.unwrap_or_else(|| queries.search_term.clone());
            if scan {
                let (books, stats) = catalog.scan_titles(&term)?;
                if json {
                    print_json(&books)?;
                } else {
                    println!("{}", stats);
                    for book in &books {
                        println!("{}", listing(book));
                    }
                }
            } else {
                let language = language.unwrap_or_else(|| queries.text_language.clone());
                search(&catalog, &term, TextLanguage::parse(&language)?, json)?;
            }
        }
    }

    Ok(())
}

fn search(
    catalog: &Catalog<DocumentEngine>,
    term: &str,
    language: TextLanguage,
    json: bool,
) -> CatalogResult<()> {
    catalog.index_titles(language)?;
    let (hits, stats) = catalog.search_titles(term, 0)?;

    if json {
        return print_json(&hits);
    }

    println!("{}", stats);
    for hit in &hits {
        println!("{:>6.3}  {}", hit.score, listing(&hit.book));
    }
    Ok(())
}

/// `[id] title (year)`, the year only when the book has a readable date.
fn listing(book: &Book) -> String {
    match book.published_date() {
        Some(date) => format!("[{}] {} ({})", book.id(), book.title(), date.format("%Y")),
        None => format!("[{}] {}", book.id(), book.title()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CatalogResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(folio_common::FolioError::from)?;
    println!("{}", text);
    Ok(())
}
