//! Digest and alert text composition.
//!
//! HTML-formatted for the delivery channel (bold, italic, links only).
//! Ordering is deterministic: sections by category, symbols sorted
//! within each section.

use chrono::{DateTime, Utc};
use pulse_core::{Category, Symbol, SymbolCatalog, TickerUpdate};
use std::collections::HashMap;

/// Price rendering per symbol class.
///
/// Index symbols are percentages, the two largest caps render as whole
/// dollars, mid-caps with two decimals, everything else with four.
pub fn format_price(catalog: &SymbolCatalog, symbol: &Symbol, price: f64) -> String {
    if catalog.category(symbol) == Category::Index {
        return format!("{price:.2}%");
    }
    match symbol.as_str() {
        "ETHBTC" => format!("{price:.6}"),
        "BTCUSDT" | "ETHUSDT" => format!("${}", group_thousands(price.round() as i64)),
        "SOLUSDT" | "XRPUSDT" | "ADAUSDT" => format!("${price:.2}"),
        _ => format!("${price:.4}"),
    }
}

/// Signed percent with explicit plus for gains (e.g., "+1.25%").
pub fn format_pct(pct: f64) -> String {
    if pct >= 0.0 {
        format!("+{pct:.2}%")
    } else {
        format!("{pct:.2}%")
    }
}

/// Whole-number volume with thousands separators.
pub fn format_volume(volume: f64) -> String {
    group_thousands(volume.round() as i64)
}

/// Trade and chart links for one symbol.
pub fn symbol_links(symbol: &Symbol) -> (String, String) {
    let binance = format!(
        "https://www.binance.com/en/trade/{}_USDT",
        symbol.base_asset()
    );
    let tradingview = format!("https://www.tradingview.com/symbols/{symbol}");
    (binance, tradingview)
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn trend_arrow(pct: f64) -> &'static str {
    if pct >= 0.0 {
        "📈"
    } else {
        "📉"
    }
}

/// Compose the multi-symbol digest message.
pub fn compose_digest(
    catalog: &SymbolCatalog,
    snapshot: &HashMap<Symbol, TickerUpdate>,
    now: DateTime<Utc>,
) -> String {
    let header = format!(
        "🐋 <b>WhalePulse Market Report</b>\n⏰ {}\n\n",
        now.format("%Y-%m-%d %H:%M:%S")
    );

    let mut by_category: HashMap<Category, Vec<&TickerUpdate>> = HashMap::new();
    for update in snapshot.values() {
        by_category
            .entry(catalog.category(&update.symbol))
            .or_default()
            .push(update);
    }
    for updates in by_category.values_mut() {
        updates.sort_by(|a, b| a.symbol.as_str().cmp(b.symbol.as_str()));
    }

    let mut sections: Vec<String> = Vec::new();

    if let Some(majors) = by_category.get(&Category::Major) {
        sections.push("💰 <b>Major Cryptocurrencies</b>".to_string());
        for update in majors {
            let info = catalog.info(&update.symbol);
            let (binance, tradingview) = symbol_links(&update.symbol);
            sections.push(format!(
                "{} <b>{}</b>\n💵 {}\n📊 Vol: {}\n{} {}\n🔗 <a href='{}'>Trade</a> | <a href='{}'>Chart</a>\n",
                info.emoji,
                info.name,
                format_price(catalog, &update.symbol, update.price),
                format_volume(update.volume),
                trend_arrow(update.pct_change_24h),
                format_pct(update.pct_change_24h),
                binance,
                tradingview,
            ));
        }
    }

    if let Some(indices) = by_category.get(&Category::Index) {
        sections.push("\n📊 <b>Market Indices</b>".to_string());
        for update in indices {
            let info = catalog.info(&update.symbol);
            sections.push(format!(
                "{} <b>{}</b>\n📈 {}\n{} {}\n",
                info.emoji,
                info.name,
                format_price(catalog, &update.symbol, update.price),
                trend_arrow(update.pct_change_24h),
                format_pct(update.pct_change_24h),
            ));
        }
    }

    if let Some(others) = by_category.get(&Category::Other) {
        sections.push("\n💰 <b>Other Instruments</b>".to_string());
        for update in others {
            let info = catalog.info(&update.symbol);
            sections.push(format!(
                "{} <b>{}</b>\n💵 {}\n{} {}\n",
                info.emoji,
                info.name,
                format_price(catalog, &update.symbol, update.price),
                trend_arrow(update.pct_change_24h),
                format_pct(update.pct_change_24h),
            ));
        }
    }

    let footer = "\n🤖 <i>WhalePulse | Market Intelligence</i>";
    format!("{header}{}{footer}", sections.join("\n"))
}

/// Compose an immediate threshold alert for one symbol.
pub fn compose_alert(catalog: &SymbolCatalog, update: &TickerUpdate) -> String {
    let info = catalog.info(&update.symbol);
    format!(
        "🚨 <b>{}</b> Alert!\n💵 Price: {}\n{} Change: {}\n📊 Volume: {}",
        info.name,
        format_price(catalog, &update.symbol, update.price),
        trend_arrow(update.pct_change_24h),
        format_pct(update.pct_change_24h),
        format_volume(update.volume),
    )
}
