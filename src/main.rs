//! sharepoint_drive CLI - Interact with a SharePoint document library.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use tracing::{info, warn};

use sharepoint_drive::{
    parse_site_url, ConflictBehavior, Credentials, GraphAuthProvider, SharePointService,
    SiteAddress, SiteCollection,
};

/// CLI tool for interacting with a SharePoint site's document library.
#[derive(Parser)]
#[command(name = "sharepoint_drive")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Application (client) ID of the Entra ID app registration.
    #[arg(long, env = "OFFICE_CLIENT_ID")]
    client_id: String,

    /// Client secret of the app registration.
    #[arg(long, env = "OFFICE_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Directory (tenant) ID.
    #[arg(long, env = "OFFICE_TENANT_ID")]
    tenant_id: String,

    /// Full site URL, e.g. https://contoso.sharepoint.com/sites/Marketing or .../teams/Ops.
    #[arg(
        long,
        env = "SHAREPOINT_SITE_URL",
        conflicts_with_all = ["hostname", "site", "collection"]
    )]
    site_url: Option<String>,

    /// SharePoint hostname, e.g. contoso.sharepoint.com.
    #[arg(long, env = "SHAREPOINT_HOSTNAME", requires = "site")]
    hostname: Option<String>,

    /// Site name under the managed path given by --collection.
    #[arg(long, env = "SHAREPOINT_SITE", requires = "hostname")]
    site: Option<String>,

    /// Managed path of the site: sites or teams.
    #[arg(long, env = "SHAREPOINT_COLLECTION", requires = "site")]
    collection: Option<SiteCollection>,

    /// Enable debug logging.
    #[arg(long, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved site.
    Site,

    /// List children of a folder.
    List {
        /// Item ID of the folder.
        #[arg(default_value = "root")]
        item_id: String,
    },

    /// Search the document library.
    Search {
        /// Text to search for. Single quotes are not escaped.
        query: String,
    },

    /// Upload files to the root of the document library.
    Upload {
        /// File patterns to upload (supports glob patterns like *.xlsx, file_{1,2,3}.txt).
        #[arg(required = true)]
        patterns: Vec<String>,

        /// What to do when a large file already exists: fail, replace or rename.
        #[arg(long, default_value = "replace")]
        conflict: ConflictBehavior,
    },

    /// Download an item to the local filesystem.
    Download {
        /// Item ID to download.
        item_id: String,

        /// Local destination file.
        #[arg(long, short = 't')]
        to: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let address = match (&cli.site_url, &cli.hostname, &cli.site) {
        (Some(url), _, _) => {
            parse_site_url(url).with_context(|| format!("Invalid site URL: {}", url))?
        }
        (None, Some(hostname), Some(site)) => SiteAddress {
            hostname: hostname.clone(),
            collection: cli.collection.unwrap_or_default(),
            site_name: site.clone(),
        },
        _ => anyhow::bail!("Either --site-url or both --hostname and --site are required"),
    };

    let auth = GraphAuthProvider::new(Credentials::new(
        cli.client_id,
        cli.client_secret,
        cli.tenant_id,
    ));
    let service = SharePointService::from_address(auth, address);

    match cli.command {
        Commands::Site => {
            let metadata = service
                .run(|sharepoint| async move { Ok(sharepoint.site_metadata().clone()) })
                .await
                .context("Failed to resolve site")?;

            println!("{:<60} {:<30} {}", "ID", "NAME", "URL");
            println!("{}", metadata);
        }

        Commands::List { item_id } => {
            let children = service
                .run(|sharepoint| async move { sharepoint.list_children(&item_id).await })
                .await
                .context("Failed to list children")?;

            print_items(&children.value);
        }

        Commands::Search { query } => {
            let results = service
                .run(|sharepoint| async move { sharepoint.search(&query).await })
                .await
                .with_context(|| "Failed to search document library")?;

            print_items(&results.value);
        }

        Commands::Upload { patterns, conflict } => {
            let files_to_upload = collect_files(&patterns)?;

            if files_to_upload.is_empty() {
                anyhow::bail!("No files to upload");
            }

            println!("Uploading {} file(s)...", files_to_upload.len());

            service
                .run(|sharepoint| async move {
                    let total = files_to_upload.len();
                    for (idx, file_path) in files_to_upload.iter().enumerate() {
                        let filename = file_path.file_name().unwrap_or_default().to_string_lossy();
                        print!("[{}/{}] Uploading {}... ", idx + 1, total, filename);

                        match sharepoint
                            .upload_file_with_conflict(file_path, &filename, conflict)
                            .await
                        {
                            Ok(item) => {
                                println!("OK ({})", item.id);
                            }
                            Err(e) => {
                                println!("FAILED");
                                eprintln!("  Error: {}", e);
                            }
                        }
                    }
                    Ok(())
                })
                .await
                .context("Failed to open SharePoint session")?;

            println!("Done.");
        }

        Commands::Download { item_id, to } => {
            if let Some(parent) = to.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create directory: {:?}", parent))?;
                }
            }

            print!("Downloading {}... ", item_id);

            let destination = to.clone();
            let written = service
                .run(|sharepoint| async move {
                    sharepoint.download_file(&item_id, &destination).await
                })
                .await
                .context("Failed to download item")?;

            println!("OK");
            info!(bytes = written, "download finished");
            println!("Saved to: {:?}", to);
        }
    }

    Ok(())
}

fn print_items(items: &[sharepoint_drive::DriveItem]) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }

    println!("{:<40} {:>10} {:<30} {}", "ID", "SIZE", "TYPE", "NAME");
    println!("{}", "-".repeat(100));
    for item in items {
        println!("{}", item);
    }
}

/// Resolve upload arguments to existing local files, sorted and without duplicates.
fn collect_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut selected = BTreeSet::new();

    for candidate in patterns.iter().flat_map(|pattern| expand_braces(pattern)) {
        let found = files_matching(&candidate)?;
        if found.is_empty() {
            warn!(pattern = %candidate, "no files matched pattern");
        }
        selected.extend(found);
    }

    Ok(selected.into_iter().collect())
}

/// An existing file named exactly `candidate`, otherwise the files its glob matches.
fn files_matching(candidate: &str) -> Result<Vec<PathBuf>> {
    let literal = PathBuf::from(candidate);
    if literal.is_file() {
        return Ok(vec![literal]);
    }

    let entries =
        glob(candidate).with_context(|| format!("Invalid glob pattern: {}", candidate))?;
    Ok(entries
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect())
}

/// Expand `{a,b}` alternations, e.g. `report_{q1,q2}.xlsx`, leftmost group first.
fn expand_braces(pattern: &str) -> Vec<String> {
    let mut pending = vec![pattern.to_string()];
    let mut expanded = Vec::new();

    while let Some(candidate) = pending.pop() {
        let group = candidate
            .find('{')
            .and_then(|open| candidate[open..].find('}').map(|len| (open, open + len)));

        match group {
            Some((open, close)) => {
                let head = &candidate[..open];
                let tail = &candidate[close + 1..];
                // Pushed in reverse so alternatives pop in written order.
                pending.extend(
                    candidate[open + 1..close]
                        .split(',')
                        .rev()
                        .map(|alt| format!("{}{}{}", head, alt.trim(), tail)),
                );
            }
            None => expanded.push(candidate),
        }
    }

    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_braces_simple() {
        let result = expand_braces("report_{q1, q2,q3}.xlsx");
        assert_eq!(result, vec!["report_q1.xlsx", "report_q2.xlsx", "report_q3.xlsx"]);
    }

    #[test]
    fn test_expand_braces_unclosed_is_literal() {
        assert_eq!(expand_braces("budget_{2024.xlsx"), vec!["budget_{2024.xlsx"]);
    }

    #[test]
    fn test_expand_braces_no_braces() {
        let result = expand_braces("report.xlsx");
        assert_eq!(result, vec!["report.xlsx"]);
    }

    #[test]
    fn test_expand_braces_nested() {
        let result = expand_braces("{a,b}_{1,2}.txt");
        assert_eq!(result, vec!["a_1.txt", "a_2.txt", "b_1.txt", "b_2.txt"]);
    }

    #[test]
    fn test_collect_files_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("present.txt");
        std::fs::write(&file, b"x").unwrap();

        let patterns = vec![
            file.to_string_lossy().to_string(),
            dir.path().join("absent.txt").to_string_lossy().to_string(),
        ];
        let files = collect_files(&patterns).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_collect_files_sorts_and_dedups_overlapping_patterns() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        std::fs::write(&first, b"1").unwrap();
        std::fs::write(&second, b"2").unwrap();

        let root = dir.path().to_string_lossy().to_string();
        let patterns = vec![
            format!("{}/{{b,a}}.csv", root),
            format!("{}/*.csv", root),
            first.to_string_lossy().to_string(),
        ];
        let files = collect_files(&patterns).unwrap();
        assert_eq!(files, vec![first, second]);
    }
}
