use {
    crate::{
        config::constants::table::{PCT_DECIMALS, PRICE_DECIMALS},
        engine::AnalysisBoard,
        models::{PairAnalysis, SignalSetup},
        utils::epoch_ms_to_utc,
    },
    serde::{Deserialize, Serialize},
    std::{cmp::Ordering, collections::BTreeSet},
    strum_macros::{Display, EnumIter, EnumString},
    tabled::{Table, Tabled, settings::Style},
};

/// Which rows survive the signal filter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SignalFilter {
    #[default]
    All,
    AnySignal,
    Reversal,
    SpikeOrCollapse,
    Breakout,
    Zone,
}

impl SignalFilter {
    pub fn matches(&self, row: &PairAnalysis) -> bool {
        match self {
            Self::All => true,
            Self::AnySignal => row.signals.any(),
            Self::Reversal => row.signals.any_reversal(),
            Self::SpikeOrCollapse => row.signals.any_spike_or_collapse(),
            Self::Breakout => row.breakout.bullish || row.breakout.bearish,
            Self::Zone => row.zone.is_signal(),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SortKey {
    Symbol,
    Price,
    #[default]
    Change,
    Rsi,
    Zone,
    Ema70Gap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn toggle(&self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Search, filter and sort settings for the table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableView {
    pub search: String,
    pub favorites_only: bool,
    pub filter: SignalFilter,
    pub sort: SortKey,
    pub direction: SortDirection,
}

/// Missing values sort last in either direction.
fn cmp_optional(a: Option<f64>, b: Option<f64>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => match direction {
            SortDirection::Ascending => x.total_cmp(&y),
            SortDirection::Descending => y.total_cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sort_value(row: &PairAnalysis, key: SortKey) -> Option<f64> {
    match key {
        SortKey::Symbol => None,
        SortKey::Price => Some(row.current_price),
        SortKey::Change => Some(row.price_change_percent),
        SortKey::Rsi => row.latest_rsi,
        // Lower rank is stronger, so negate to put the strongest zones first when descending.
        SortKey::Zone => Some(-(row.zone.rank() as f64)),
        SortKey::Ema70Gap => row.ema70_gap_pct,
    }
}

/// Rows of `board` that pass `view`, sorted. Ties break on symbol.
pub fn select_rows<'a>(
    board: &'a AnalysisBoard,
    view: &TableView,
    favorites: &BTreeSet<String>,
) -> Vec<&'a PairAnalysis> {
    let needle = view.search.trim().to_uppercase();
    let mut rows: Vec<&PairAnalysis> = board
        .rows()
        .filter(|r| needle.is_empty() || r.symbol.to_uppercase().contains(&needle))
        .filter(|r| !view.favorites_only || favorites.contains(&r.symbol))
        .filter(|r| view.filter.matches(r))
        .collect();

    rows.sort_by(|a, b| {
        let primary = match view.sort {
            SortKey::Symbol => match view.direction {
                SortDirection::Ascending => a.symbol.cmp(&b.symbol),
                SortDirection::Descending => b.symbol.cmp(&a.symbol),
            },
            key => cmp_optional(sort_value(a, key), sort_value(b, key), view.direction),
        };
        primary.then_with(|| a.symbol.cmp(&b.symbol))
    });
    rows
}

#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "★")]
    favorite: &'static str,
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "24h %")]
    change: String,
    #[tabled(rename = "RSI")]
    rsi: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Trend")]
    trend: String,
    #[tabled(rename = "Breakout")]
    breakout: String,
    #[tabled(rename = "Patterns")]
    patterns: String,
    #[tabled(rename = "Signals")]
    signals: String,
    #[tabled(rename = "EMA70 %")]
    ema70_gap: String,
    #[tabled(rename = "EMA200 %")]
    ema200_gap: String,
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", decimals, v))
}

fn join_flags(flags: &[(bool, &str)]) -> String {
    let parts: Vec<&str> = flags.iter().filter(|(on, _)| *on).map(|(_, s)| *s).collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(" ")
    }
}

fn to_table_row(row: &PairAnalysis, favorites: &BTreeSet<String>) -> TableRow {
    let trend = row.trend.as_ref().map_or_else(
        || "-".to_string(),
        |t| {
            let mut s = format!("{} {}", t.trend, t.kind);
            if t.is_near {
                s.push_str(" near");
            }
            if t.is_doji_after_breakout {
                s.push_str(" doji");
            }
            s
        },
    );

    TableRow {
        favorite: if favorites.contains(&row.symbol) { "★" } else { "" },
        symbol: row.symbol.clone(),
        price: format!("{:.*}", PRICE_DECIMALS, row.current_price),
        change: format!("{:+.*}", PCT_DECIMALS, row.price_change_percent),
        rsi: fmt_opt(row.latest_rsi, PCT_DECIMALS),
        zone: row.zone.to_string(),
        trend,
        breakout: join_flags(&[
            (row.breakout.bullish, "BULL"),
            (row.breakout.bearish, "BEAR"),
            (row.breakout.failure, "FAIL"),
            (row.tested_prev_high, "T-HIGH"),
            (row.tested_prev_low, "T-LOW"),
        ]),
        patterns: join_flags(&[
            (row.tops.double_top, "2TOP"),
            (row.tops.descending_top, "DESC-TOP"),
            (row.tops.top_failure, "TOP-FAIL"),
            (row.bottoms.double_bottom, "2BOT"),
            (row.bottoms.ascending_bottom, "ASC-BOT"),
            (row.bottoms.bottom_failure, "BOT-FAIL"),
            (row.rsi_divergence.bullish, "RSI-DIV+"),
            (row.rsi_divergence.bearish, "RSI-DIV-"),
            (row.volume_divergence.bullish, "VOL-DIV+"),
            (row.volume_divergence.bearish, "VOL-DIV-"),
            (row.engulfing.bullish, "ENG+"),
            (row.engulfing.bearish, "ENG-"),
        ]),
        signals: join_flags(&[
            (row.signals.bullish_to_bearish.is_signal(), "BULL→BEAR"),
            (row.signals.bearish_to_bullish.is_signal(), "BEAR→BULL"),
            (row.signals.bullish_spike.is_signal(), "SPIKE"),
            (row.signals.bearish_collapse.is_signal(), "COLLAPSE"),
        ]),
        ema70_gap: fmt_opt(row.ema70_gap_pct, PCT_DECIMALS),
        ema200_gap: fmt_opt(row.ema200_gap_pct, PCT_DECIMALS),
    }
}

/// Main scanner table.
pub fn render_table(rows: &[&PairAnalysis], favorites: &BTreeSet<String>) -> String {
    let table_rows: Vec<TableRow> = rows.iter().map(|r| to_table_row(r, favorites)).collect();
    Table::new(table_rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct SetupRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Setup")]
    kind: &'static str,
    #[tabled(rename = "Entry / SL / TP1 / TP2")]
    levels: String,
    #[tabled(rename = "Risk %")]
    risk: String,
}

/// Entry, stop and targets of every active composite signal in `rows`.
pub fn render_setups(rows: &[&PairAnalysis]) -> Option<String> {
    let setups: Vec<SetupRow> = rows
        .iter()
        .flat_map(|r| {
            [
                ("BULL→BEAR", r.signals.bullish_to_bearish),
                ("BEAR→BULL", r.signals.bearish_to_bullish),
                ("SPIKE", r.signals.bullish_spike),
                ("COLLAPSE", r.signals.bearish_collapse),
            ]
            .into_iter()
            .filter_map(move |(kind, signal): (&'static str, SignalSetup)| {
                let setup = signal.setup()?;
                Some(SetupRow {
                    symbol: r.symbol.clone(),
                    kind,
                    levels: signal.to_string(),
                    risk: fmt_opt(
                        (setup.entry > 0.0).then(|| setup.risk() / setup.entry * 100.0),
                        PCT_DECIMALS,
                    ),
                })
            })
        })
        .collect();
    if setups.is_empty() {
        return None;
    }
    Some(Table::new(setups).with(Style::rounded()).to_string())
}

/// One-line footer: row counts and last refresh.
pub fn render_status(board: &AnalysisBoard, shown: usize) -> String {
    let updated = board
        .last_updated_ms()
        .map_or_else(|| "never".to_string(), |ms| format!("{} UTC", epoch_ms_to_utc(ms)));
    format!(
        "{} of {} symbols on {} | updated {}",
        shown,
        board.len(),
        board.timeframe(),
        updated
    )
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            domain::Timeframe,
            engine::board::tests::sample_row,
            models::{TradeSetup, ZoneSignal},
        },
        std::str::FromStr,
    };

    fn board() -> AnalysisBoard {
        let mut board = AnalysisBoard::new(Timeframe::H4);
        let mut a = sample_row("AAAUSDT", Timeframe::H4, 100.0);
        a.price_change_percent = 5.0;
        a.zone = ZoneSignal::MaxZonePump;
        let mut b = sample_row("BBBUSDT", Timeframe::H4, 50.0);
        b.price_change_percent = -3.0;
        b.zone = ZoneSignal::NoStrongSignal;
        b.signals.bullish_to_bearish = SignalSetup::Signal(TradeSetup {
            entry: 49.0,
            stop_loss: 51.0,
            tp1: 47.0,
            tp2: 45.0,
        });
        let mut c = sample_row("CCCBTC", Timeframe::H4, 0.001);
        c.price_change_percent = 12.0;
        c.latest_rsi = None;
        c.zone = ZoneSignal::NoStrongSignal;
        board.merge_batch(vec![a, b, c], 1);
        board
    }

    fn symbols(rows: &[&PairAnalysis]) -> Vec<String> {
        rows.iter().map(|r| r.symbol.clone()).collect()
    }

    #[test]
    fn default_view_sorts_by_change_descending() {
        let board = board();
        let rows = select_rows(&board, &TableView::default(), &BTreeSet::new());
        assert_eq!(symbols(&rows), ["CCCBTC", "AAAUSDT", "BBBUSDT"]);
    }

    #[test]
    fn search_filter_and_favorites_compose() {
        let board = board();
        let favorites: BTreeSet<String> = ["BBBUSDT".to_string()].into();

        let view = TableView {
            search: "usdt".into(),
            ..Default::default()
        };
        assert_eq!(symbols(&select_rows(&board, &view, &favorites)), ["AAAUSDT", "BBBUSDT"]);

        let view = TableView {
            favorites_only: true,
            ..Default::default()
        };
        assert_eq!(symbols(&select_rows(&board, &view, &favorites)), ["BBBUSDT"]);

        let view = TableView {
            filter: SignalFilter::Reversal,
            ..Default::default()
        };
        assert_eq!(symbols(&select_rows(&board, &view, &favorites)), ["BBBUSDT"]);

        let view = TableView {
            filter: SignalFilter::Zone,
            ..Default::default()
        };
        assert_eq!(symbols(&select_rows(&board, &view, &favorites)), ["AAAUSDT"]);
    }

    #[test]
    fn missing_values_sort_last_both_ways() {
        let board = board();
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let view = TableView {
                sort: SortKey::Rsi,
                direction,
                ..Default::default()
            };
            let rows = select_rows(&board, &view, &BTreeSet::new());
            assert_eq!(rows.last().map(|r| r.symbol.as_str()), Some("CCCBTC"));
        }

        let view = TableView {
            sort: SortKey::Symbol,
            direction: SortDirection::Ascending,
            ..Default::default()
        };
        let rows = select_rows(&board, &view, &BTreeSet::new());
        assert_eq!(symbols(&rows), ["AAAUSDT", "BBBUSDT", "CCCBTC"]);
    }

    #[test]
    fn zone_sort_descending_lists_strongest_first() {
        let board = board();
        let mut view = TableView {
            sort: SortKey::Zone,
            direction: SortDirection::Descending,
            ..Default::default()
        };
        let rows = select_rows(&board, &view, &BTreeSet::new());
        assert_eq!(rows.first().map(|r| r.zone), Some(ZoneSignal::MaxZonePump));
        assert_eq!(rows.last().map(|r| r.zone), Some(ZoneSignal::NoStrongSignal));

        view.direction = view.direction.toggle();
        let rows = select_rows(&board, &view, &BTreeSet::new());
        assert_eq!(rows.last().map(|r| r.symbol.as_str()), Some("AAAUSDT"));
    }

    #[test]
    fn filters_and_keys_parse_from_cli_strings() {
        assert_eq!(SignalFilter::from_str("any-signal").ok(), Some(SignalFilter::AnySignal));
        assert_eq!(SignalFilter::from_str("SPIKE-OR-COLLAPSE").ok(), Some(SignalFilter::SpikeOrCollapse));
        assert_eq!(SortKey::from_str("ema70-gap").ok(), Some(SortKey::Ema70Gap));
        assert!(SortKey::from_str("volume").is_err());
        assert_eq!(SortDirection::Ascending.toggle(), SortDirection::Descending);
    }

    #[test]
    fn rendering_marks_favorites_and_setups() {
        let board = board();
        let favorites: BTreeSet<String> = ["AAAUSDT".to_string()].into();
        let rows = select_rows(&board, &TableView::default(), &favorites);

        let table = render_table(&rows, &favorites);
        assert!(table.contains("Symbol"));
        assert!(table.contains("★"));
        assert!(table.contains("MAX ZONE PUMP"));
        assert!(table.contains("BULL→BEAR"));

        let setups = render_setups(&rows).unwrap();
        assert!(setups.contains("BBBUSDT"));
        assert!(setups.contains("SL 51.000000"));
        assert!(setups.contains("Risk %"));
        assert!(setups.contains("4.08"));

        let none: Vec<&PairAnalysis> = rows.into_iter().filter(|r| r.symbol == "CCCBTC").collect();
        assert!(render_setups(&none).is_none());
        assert!(render_status(&board, 3).starts_with("3 of 3 symbols on 4h"));
    }
}
