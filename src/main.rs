use {
    anyhow::{Result, bail},
    clap::Parser,
    pump_sniper::{
        AnalysisBoard, Cli, Scanner,
        data::BinanceProvider,
        ui::{ClientState, render_setups, render_status, render_table, select_rows},
    },
    std::{
        panic,
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
    },
};

fn init_log() {
    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Warn)
    };

    env_logger::Builder::new()
        .filter(None, global_level)
        .filter(Some("pump_sniper"), my_code_level)
        .parse_default_env()
        .init();
}

fn print_board(board: &AnalysisBoard, state: &ClientState) {
    let rows = select_rows(board, &state.view, &state.favorites);
    println!("{}", render_table(&rows, &state.favorites));
    if let Some(setups) = render_setups(&rows) {
        println!("{}", setups);
    }
    println!("{}\n", render_status(board, rows.len()));
}

fn watch_ctrl_c(shutdown: Arc<AtomicBool>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::info!("Ctrl-C received, finishing current batch");
                shutdown.store(true, Ordering::SeqCst);
            }
            Err(e) => log::error!("Unable to listen for Ctrl-C: {}", e),
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        log::error!("CRITICAL PANIC:\n{}\nStack Trace:\n{}", info, backtrace);
    }));
    init_log();

    let args = Cli::parse();
    if args.rsi_period == 0 {
        bail!("--rsi-period must be at least 1");
    }

    // 1. Client state: favorites and the last view, overridden by CLI options
    let mut state = ClientState::load(&args.state_path);
    if let Some(symbol) = &args.favorite {
        let now_favorite = state.toggle_favorite(symbol);
        log::info!(
            "{} {} favorites",
            symbol.to_uppercase(),
            if now_favorite { "added to" } else { "removed from" }
        );
    }
    args.apply_to_view(&mut state.view);
    state.save(&args.state_path)?;
    if state.view.favorites_only && state.favorites.is_empty() {
        log::warn!("Favorites-only view is active but no favorites are saved");
    }

    // 2. Scanner
    let provider = Arc::new(BinanceProvider::with_default_limits()?);
    let mut scanner = Scanner::new(provider, args.analysis_params(), args.scanner_config());

    let shutdown = Arc::new(AtomicBool::new(false));
    watch_ctrl_c(shutdown.clone());

    // 3. Poll and print
    if args.once {
        let summary = scanner.scan_once(&shutdown, |_| {}).await?;
        print_board(scanner.board(), &state);
        log::info!(
            "Scanned {} symbols ({} failed){}",
            summary.analysed,
            summary.failed,
            if summary.interrupted { ", interrupted" } else { "" }
        );
    } else {
        scanner
            .run(shutdown, |board| print_board(board, &state))
            .await?;
    }
    Ok(())
}
