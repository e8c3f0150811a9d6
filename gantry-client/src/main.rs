use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use backend_domain::services::KeyInput;
use backend_domain::{current_millis, AggregatedView, ScanCorrection};
use gantry_client::{
    ApiClient, ClientConfig, ScanOutcome, ScanSession, Snapshot, SnapshotStore, SnapshotWriter,
    SubMode, SyncConfig, SyncWorker,
};

#[derive(Parser, Debug)]
#[command(name = "gantry-console")]
#[command(about = "Terminal scanning console for the Gantry backend", long_about = None)]
struct Args {
    /// Backend base URL
    #[arg(long, default_value = "http://127.0.0.1:3432")]
    server: String,
    /// API token for the scanning module
    #[arg(long)]
    token: Option<String>,
    /// Operator display name
    #[arg(long)]
    operator: String,
    /// Container number to work
    #[arg(long)]
    container: String,
    /// Container mode when it has to be created (MANUAL or MANIFEST)
    #[arg(long, default_value = "MANUAL")]
    mode: String,
    /// Directory for crash-recovery snapshots
    #[arg(long, default_value = "./snapshots")]
    snapshot_dir: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let api = Arc::new(ApiClient::new(ClientConfig {
        base_url: args.server.clone(),
        api_token: args.token.clone(),
        operator: args.operator.clone(),
    }));

    let container = select_container(&api, &args).await?;
    println!(
        "container {} ({} mode, status {})",
        container.container_no,
        container.mode.as_str(),
        container.status.as_str()
    );

    let store = Arc::new(SnapshotStore::new(&args.snapshot_dir));
    let mut session = ScanSession::attach(api.clone(), container, args.operator.clone());
    let writer = SnapshotWriter::new(store.clone(), session.container().id.to_string());

    // Cached snapshot first, ledger reconciles on the next poll.
    if let Some(snapshot) = store.load(session.container().id.as_str()).await {
        session.view().restore_manifest_rows(snapshot.rows).await;
        println!("restored cached table from a previous run");
    }

    let sync = SyncWorker::new(
        api.clone(),
        session.container().container_no.clone(),
        session.view(),
        SyncConfig::default(),
    )
    .spawn();

    println!("scan codes, or :mode box|locate, :qty <row> <n> [pallet], :upload <file>, :export [diff], :show, :quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if line == ":quit" {
            break;
        }
        if let Some(rest) = line.strip_prefix(':') {
            if let Err(err) = run_command(&api, &mut session, rest).await {
                eprintln!("{}", err);
            }
        } else {
            scan_line(&mut session, &line).await;
        }
        schedule_snapshot(&session, &writer).await;
        print_view(&session.view().current().await);
    }

    writer.flush().await;
    sync.stop().await;
    Ok(())
}

async fn select_container(
    api: &ApiClient,
    args: &Args,
) -> Result<backend_domain::Container> {
    let existing = api.list_containers(None, Some(&args.container)).await?;
    if let Some(summary) = existing
        .into_iter()
        .find(|summary| summary.container.container_no == args.container)
    {
        return Ok(summary.container);
    }
    let created = api
        .create_container(&gantry_client::api::CreateContainer {
            container_no: args.container.clone(),
            description: String::new(),
            mode: args.mode.clone(),
            dock_no: String::new(),
            operator: args.operator.clone(),
        })
        .await?;
    Ok(created)
}

/// A pasted line stands in for one wedge burst: fast keystrokes then Enter.
async fn scan_line(session: &mut ScanSession, line: &str) {
    let at = current_millis();
    for ch in line.chars() {
        if let Err(err) = session.handle_key(KeyInput::Char(ch), at).await {
            eprintln!("{}", err);
            return;
        }
    }
    match session.handle_key(KeyInput::Enter, at).await {
        Ok(Some(ScanOutcome::Submitted(event))) => {
            println!("recorded {} x{}", event.sku, event.qty)
        }
        Ok(Some(ScanOutcome::Located { row_index })) => {
            println!("located row {}", row_index + 1)
        }
        Ok(None) => {}
        Err(err) => eprintln!("{}", err),
    }
}

async fn run_command(
    api: &Arc<ApiClient>,
    session: &mut ScanSession,
    command: &str,
) -> Result<()> {
    let parts: Vec<&str> = command.split_whitespace().collect();
    match parts.as_slice() {
        ["mode", "box"] => session.set_sub_mode(SubMode::Box),
        ["mode", "locate"] => session.set_sub_mode(SubMode::Locate),
        ["qty", row, qty, rest @ ..] => {
            let row: usize = row.parse()?;
            let qty: i64 = qty.parse()?;
            let pallet = rest.first().copied().unwrap_or("");
            let event = session.set_quantity(row.saturating_sub(1), qty, pallet).await?;
            println!("recorded {} x{}", event.sku, event.qty);
        }
        ["correct", id, qty] => {
            let correction = ScanCorrection {
                qty: qty.parse().ok(),
                ..ScanCorrection::default()
            };
            session.correct(id, correction).await?;
        }
        ["upload", path] => {
            let content = std::fs::read_to_string(path)?;
            session.upload_manifest(path, &content).await?;
            println!("manifest attached");
        }
        ["export"] => {
            let bytes = api.export_result(session.container().id.as_str()).await?;
            let path = format!("{}-result.xlsx", session.container().container_no);
            std::fs::write(&path, bytes).ok();
            println!("wrote {}", path);
        }
        ["export", "diff"] => {
            match api.export_diff(session.container().id.as_str()).await? {
                Some(bytes) => {
                    let path = format!("{}-diff.xlsx", session.container().container_no);
                    std::fs::write(&path, bytes).ok();
                    println!("wrote {}", path);
                }
                None => println!("no difference, nothing to export"),
            }
        }
        ["show"] => {}
        _ => eprintln!("unknown command: {}", command),
    }
    Ok(())
}

async fn schedule_snapshot(session: &ScanSession, writer: &SnapshotWriter) {
    let view = session.view().current().await;
    if let AggregatedView::Manifest { rows } = view {
        let blob = session.container().manifest.clone().unwrap_or_default();
        writer.schedule(Snapshot::new(
            blob.headers,
            rows,
            blob.sku_column_key,
            blob.qty_column_key,
        ));
    }
}

fn print_view(view: &AggregatedView) {
    match view {
        AggregatedView::Manifest { rows } => {
            for (i, row) in rows.iter().enumerate() {
                println!(
                    "{:>3}  {:<20} expected {:>5}  scanned {:>5}  pallet {:<8} {}",
                    i + 1,
                    row.sku,
                    row.expected_qty,
                    row.scanned_qty,
                    row.pallet_no,
                    row.operator
                );
            }
        }
        AggregatedView::Manual { entries } => {
            for entry in entries {
                println!(
                    "{:<20} qty {:>5}  pallet {:<8}",
                    entry.sku, entry.qty, entry.pallet_no
                );
            }
        }
    }
}
