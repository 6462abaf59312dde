//! Symbol display metadata.
//!
//! Maps watched symbols to presentation info (name, emoji, category) with an
//! explicit default for unrecognized symbols. Built once at startup.

use crate::types::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Presentation grouping for digest sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Major tradable cryptocurrencies.
    Major,
    /// Synthetic market indices (dominance, total caps).
    Index,
    /// Anything not in the built-in table.
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Major => f.write_str("Major"),
            Category::Index => f.write_str("Index"),
            Category::Other => f.write_str("Other"),
        }
    }
}

/// Display metadata for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    pub emoji: String,
    pub category: Category,
}

impl SymbolInfo {
    fn new(name: &str, emoji: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            emoji: emoji.to_string(),
            category,
        }
    }
}

/// Symbol metadata lookup table, constructed once at startup.
#[derive(Debug, Clone)]
pub struct SymbolCatalog {
    entries: HashMap<Symbol, SymbolInfo>,
}

impl SymbolCatalog {
    /// Catalog with the built-in entries for known symbols.
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        let table: &[(&str, &str, &str, Category)] = &[
            ("BTCUSDT", "₿ Bitcoin", "₿", Category::Major),
            ("ETHUSDT", "⟠ Ethereum", "⟠", Category::Major),
            ("SOLUSDT", "◎ Solana", "◎", Category::Major),
            ("XRPUSDT", "⨯ Ripple", "⨯", Category::Major),
            ("ADAUSDT", "₳ Cardano", "₳", Category::Major),
            ("USDTDUSDT", "📊 USDT Dominance", "📊", Category::Index),
            ("BTBUSDT", "🔥 BTB Token", "🔥", Category::Index),
            ("TOTALUSDT", "📈 Total Market Cap", "📈", Category::Index),
            ("TOTAL2USDT", "📊 Total2 (Altcoins)", "📊", Category::Index),
            ("TOTAL3USDT", "📉 Total3 (Others)", "📉", Category::Index),
        ];
        for (symbol, name, emoji, category) in table {
            entries.insert(Symbol::new(*symbol), SymbolInfo::new(name, emoji, *category));
        }
        Self { entries }
    }

    /// Look up display info, falling back to a generic entry.
    pub fn info(&self, symbol: &Symbol) -> SymbolInfo {
        self.entries.get(symbol).cloned().unwrap_or_else(|| SymbolInfo {
            name: symbol.to_string(),
            emoji: "💰".to_string(),
            category: Category::Other,
        })
    }

    /// Category for a symbol (Other when unknown).
    pub fn category(&self, symbol: &Symbol) -> Category {
        self.entries
            .get(symbol)
            .map(|info| info.category)
            .unwrap_or(Category::Other)
    }
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
