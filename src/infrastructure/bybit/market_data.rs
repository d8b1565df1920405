//! Bybit v5 Market Data Service
//!
//! Public REST endpoints only:
//! - Instrument listing (USDT linear perpetuals in `Trading` status)
//! - Klines on any [`Timeframe`]
//! - 24h tickers

use crate::domain::errors::MarketDataError;
use crate::domain::market::candle::{Candle, Ticker};
use crate::domain::market::timeframe::Timeframe;
use crate::domain::ports::MarketDataService;
use crate::infrastructure::core::http_client_factory::{HttpClientFactory, build_url_with_query};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, info};

pub const BYBIT_MAINNET_URL: &str = "https://api.bybit.com";
pub const BYBIT_TESTNET_URL: &str = "https://api-testnet.bybit.com";

const SYMBOLS_CACHE_TTL_SECS: u64 = 3600;

pub struct BybitMarketDataService {
    client: ClientWithMiddleware,
    base_url: String,
    category: String,
    quote_coin: String,
    /// Cache for tradable symbols (symbol list + timestamp)
    symbols_cache: std::sync::RwLock<Option<(Vec<String>, Instant)>>,
}

impl BybitMarketDataService {
    pub fn builder() -> BybitMarketDataServiceBuilder {
        BybitMarketDataServiceBuilder::default()
    }

    async fn get_v5<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = build_url_with_query(&format!("{}{}", self.base_url, path), params)?;

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketDataError::Transport {
                reason: format!("{} request failed: {}", path, e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MarketDataError::Transport {
                reason: format!("{} returned HTTP {}: {}", path, status, error_text),
            }
            .into());
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse Bybit {} response", path))?;

        Ok(envelope.into_result()?)
    }
}

#[derive(Default)]
pub struct BybitMarketDataServiceBuilder {
    base_url: Option<String>,
    category: Option<String>,
    quote_coin: Option<String>,
}

impl BybitMarketDataServiceBuilder {
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn category(mut self, category: String) -> Self {
        self.category = Some(category);
        self
    }

    pub fn quote_coin(mut self, quote_coin: String) -> Self {
        self.quote_coin = Some(quote_coin);
        self
    }

    pub fn build(self) -> BybitMarketDataService {
        BybitMarketDataService {
            client: HttpClientFactory::create_client(),
            base_url: self
                .base_url
                .unwrap_or_else(|| BYBIT_MAINNET_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            category: self.category.unwrap_or_else(|| "linear".to_string()),
            quote_coin: self.quote_coin.unwrap_or_else(|| "USDT".to_string()),
            symbols_cache: std::sync::RwLock::new(None),
        }
    }
}

#[async_trait]
impl MarketDataService for BybitMarketDataService {
    async fn list_tradable_symbols(&self) -> Result<Vec<String>> {
        {
            let cache = self
                .symbols_cache
                .read()
                .map_err(|e| anyhow::anyhow!("symbols cache lock poisoned: {}", e))?;
            if let Some((symbols, cached_at)) = cache.as_ref()
                && cached_at.elapsed().as_secs() < SYMBOLS_CACHE_TTL_SECS
            {
                return Ok(symbols.clone());
            }
        }

        info!("BybitMarketDataService: Fetching {} instruments", self.category);

        let mut symbols = Vec::new();
        let mut cursor = String::new();
        loop {
            let mut params = vec![
                ("category", self.category.clone()),
                ("limit", "1000".to_string()),
            ];
            if !cursor.is_empty() {
                params.push(("cursor", cursor.clone()));
            }

            let page: InstrumentsPage = self
                .get_v5("/v5/market/instruments-info", &params)
                .await
                .context("Failed to fetch Bybit instruments")?;

            symbols.extend(page.tradable_symbols(&self.quote_coin));

            if page.next_page_cursor.is_empty() {
                break;
            }
            cursor = page.next_page_cursor;
        }

        info!(
            "BybitMarketDataService: Found {} tradable {} pairs",
            symbols.len(),
            self.quote_coin
        );

        {
            let mut cache = self
                .symbols_cache
                .write()
                .map_err(|e| anyhow::anyhow!("symbols cache lock poisoned: {}", e))?;
            *cache = Some((symbols.clone(), Instant::now()));
        }

        Ok(symbols)
    }

    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let params = [
            ("category", self.category.clone()),
            ("symbol", symbol.to_string()),
            ("interval", timeframe.to_bybit_interval().to_string()),
            ("limit", limit.to_string()),
        ];

        let page: KlinePage = self
            .get_v5("/v5/market/kline", &params)
            .await
            .with_context(|| format!("Failed to fetch {} klines for {}", timeframe, symbol))?;

        let candles = parse_kline_rows(symbol, page.list)?;
        debug!(
            "BybitMarketDataService: Fetched {} {} bars for {}",
            candles.len(),
            timeframe,
            symbol
        );
        Ok(candles)
    }

    async fn get_ticker(&self, symbol: &str) -> Result<Option<Ticker>> {
        let params = [
            ("category", self.category.clone()),
            ("symbol", symbol.to_string()),
        ];

        let page: TickerPage = self
            .get_v5("/v5/market/tickers", &params)
            .await
            .with_context(|| format!("Failed to fetch ticker for {}", symbol))?;

        Ok(page.into_ticker()?)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg")]
    ret_msg: String,
    result: Option<T>,
}

impl<T> Envelope<T> {
    fn into_result(self) -> Result<T, MarketDataError> {
        if self.ret_code != 0 {
            return Err(MarketDataError::Api {
                code: self.ret_code,
                message: self.ret_msg,
            });
        }
        self.result.ok_or_else(|| MarketDataError::Api {
            code: self.ret_code,
            message: format!("empty result: {}", self.ret_msg),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentInfo {
    symbol: String,
    status: String,
    quote_coin: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentsPage {
    list: Vec<InstrumentInfo>,
    #[serde(default)]
    next_page_cursor: String,
}

impl InstrumentsPage {
    fn tradable_symbols<'a>(&'a self, quote_coin: &'a str) -> impl Iterator<Item = String> + 'a {
        self.list
            .iter()
            .filter(move |i| i.quote_coin == quote_coin && i.status == "Trading")
            .map(|i| i.symbol.clone())
    }
}

/// Rows are `[startTime, open, high, low, close, volume, turnover]`, all
/// strings, newest first.
#[derive(Debug, Deserialize)]
struct KlinePage {
    list: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TickerInfo {
    symbol: String,
    last_price: String,
    /// Fraction, e.g. "0.0123" for +1.23%
    #[serde(rename = "price24hPcnt")]
    price_24h_pcnt: String,
    #[serde(rename = "volume24h")]
    volume_24h: String,
}

#[derive(Debug, Deserialize)]
struct TickerPage {
    list: Vec<TickerInfo>,
}

impl TickerPage {
    fn into_ticker(self) -> Result<Option<Ticker>, MarketDataError> {
        let Some(info) = self.list.into_iter().next() else {
            return Ok(None);
        };

        let field = |name: &str, raw: &str| {
            raw.parse::<f64>().map_err(|_| MarketDataError::InvalidData {
                symbol: info.symbol.clone(),
                reason: format!("{} '{}' is not a number", name, raw),
            })
        };

        Ok(Some(Ticker {
            last_price: field("lastPrice", &info.last_price)?,
            price_change_24h: field("price24hPcnt", &info.price_24h_pcnt)? * 100.0,
            volume_24h: field("volume24h", &info.volume_24h)?,
            symbol: info.symbol.clone(),
        }))
    }
}

/// Converts newest-first kline rows into an oldest-first candle series.
fn parse_kline_rows(symbol: &str, rows: Vec<Vec<String>>) -> Result<Vec<Candle>, MarketDataError> {
    let invalid = |reason: String| MarketDataError::InvalidData {
        symbol: symbol.to_string(),
        reason,
    };

    let mut candles = rows
        .iter()
        .map(|row| {
            if row.len() < 6 {
                return Err(invalid(format!("kline row has {} fields", row.len())));
            }
            let timestamp = row[0]
                .parse::<i64>()
                .map_err(|_| invalid(format!("bad kline start time '{}'", row[0])))?;
            let mut values = [0.0; 5];
            for (slot, raw) in values.iter_mut().zip(&row[1..6]) {
                *slot = raw
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("bad kline value '{}'", raw)))?;
            }
            let [open, high, low, close, volume] = values;
            Ok(Candle {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    candles.reverse();
    Ok(candles)
}
