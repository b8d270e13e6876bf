use crate::{
    config::ProviderConfig, error::DataError, provider::send_json, source::WhaleSource,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Transactions returned per [`WhaleReport`].
pub const MAX_REPORTED: usize = 5;

/// Minimum USD value when a request names none.
pub const DEFAULT_MIN_VALUE_USD: f64 = 500_000.0;

/// Smallest output, in satoshi, for a Bitcoin transaction to count as a whale (1 BTC).
pub const MIN_WHALE_OUTPUT_SATOSHI: u64 = 100_000_000;

/// Fixed BTC price used to value unconfirmed transactions.
pub const BTC_REFERENCE_PRICE_USD: f64 = 43_000.0;

/// Volume ratio one side must exceed for a directional [`WhaleSentiment`].
pub const SENTIMENT_RATIO: f64 = 1.5;

const SATOSHI_PER_BTC: f64 = 100_000_000.0;

/// Label of every [`WhaleReport::source`].
const REPORT_SOURCE: &str = "free_apis";

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Blockchain {
    #[display("bitcoin")]
    Bitcoin,
    #[display("ethereum")]
    Ethereum,
    #[display("binance-smart-chain")]
    BinanceSmartChain,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WhaleSide {
    #[display("buy")]
    Buy,
    #[display("sell")]
    Sell,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WhaleSentiment {
    #[display("bullish")]
    Bullish,
    #[display("bearish")]
    Bearish,
    #[display("neutral")]
    Neutral,
}

#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct WhaleTransaction {
    pub id: String,
    pub blockchain: Blockchain,
    pub amount_usd: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub side: WhaleSide,
    /// `"simulated"` for generated transactions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct WhaleReport {
    pub transactions: Vec<WhaleTransaction>,
    pub sentiment: WhaleSentiment,
    pub source: String,
}

impl WhaleReport {
    /// Build a report whose sentiment reflects every transaction, keeping only the first
    /// [`MAX_REPORTED`].
    pub fn new(mut transactions: Vec<WhaleTransaction>) -> Self {
        let sentiment = analyse_sentiment(&transactions);
        transactions.truncate(MAX_REPORTED);

        Self {
            transactions,
            sentiment,
            source: REPORT_SOURCE.to_string(),
        }
    }
}

/// Compare buy and sell USD volume.
pub fn analyse_sentiment(transactions: &[WhaleTransaction]) -> WhaleSentiment {
    let (buy, sell) = transactions
        .iter()
        .fold((0.0, 0.0), |(buy, sell), tx| match tx.side {
            WhaleSide::Buy => (buy + tx.amount_usd, sell),
            WhaleSide::Sell => (buy, sell + tx.amount_usd),
        });

    if buy > sell * SENTIMENT_RATIO {
        WhaleSentiment::Bullish
    } else if sell > buy * SENTIMENT_RATIO {
        WhaleSentiment::Bearish
    } else {
        WhaleSentiment::Neutral
    }
}

/// blockchain.info `/unconfirmed-transactions` response.
///
/// ### Raw Payload Examples
/// ```json
/// {
///     "txs": [
///         {
///             "hash": "b6f6991d03df0e2e04dafffcd6bc418aac66049e2cd74b80f14ac86db1e3f0da",
///             "time": 1700000000,
///             "out": [{ "value": 250000000, "addr": "bc1q..." }]
///         }
///     ]
/// }
/// ```
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct UnconfirmedTransactions {
    #[serde(default)]
    pub txs: Vec<UnconfirmedTransaction>,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct UnconfirmedTransaction {
    pub hash: String,
    /// Unix seconds.
    pub time: i64,
    #[serde(default)]
    pub out: Vec<TransactionOutput>,
}

#[derive(Clone, Copy, PartialEq, Debug, Deserialize)]
pub struct TransactionOutput {
    #[serde(default)]
    pub value: u64,
}

impl UnconfirmedTransaction {
    fn largest_output(&self) -> u64 {
        self.out.iter().map(|output| output.value).max().unwrap_or_default()
    }

    /// Value this transaction as a [`WhaleTransaction`] if any output exceeds
    /// [`MIN_WHALE_OUTPUT_SATOSHI`]. The side is unknown on-chain so `side` is supplied.
    // Satoshi values stay far below 2^53
    #[allow(clippy::cast_precision_loss)]
    pub fn to_whale(&self, side: WhaleSide) -> Option<WhaleTransaction> {
        let largest = self.largest_output();
        if largest <= MIN_WHALE_OUTPUT_SATOSHI {
            return None;
        }

        Some(WhaleTransaction {
            id: self.hash.clone(),
            blockchain: Blockchain::Bitcoin,
            amount_usd: largest as f64 * BTC_REFERENCE_PRICE_USD / SATOSHI_PER_BTC,
            timestamp: DateTime::from_timestamp(self.time, 0).unwrap_or_default(),
            side,
            confidence: None,
        })
    }
}

/// Whale tracker over free public APIs, generating plausible data when none is reachable.
#[derive(Debug, Clone)]
pub struct FreeWhaleTracker {
    client: reqwest::Client,
    base_url: String,
}

impl FreeWhaleTracker {
    pub fn new(client: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            base_url: config.blockchain_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Large unconfirmed Bitcoin transactions worth at least `min_value_usd`.
    pub async fn bitcoin_transactions(
        &self,
        min_value_usd: f64,
    ) -> Result<Vec<WhaleTransaction>, DataError> {
        let url = format!("{}/unconfirmed-transactions?format=json", self.base_url);
        debug!(%url, "fetching unconfirmed bitcoin transactions");

        let response = send_json::<UnconfirmedTransactions>(self.client.get(url))
            .await
            .map_err(|reason| DataError::capability("whale", reason))?;

        let mut rng = rand::rng();
        Ok(response
            .txs
            .iter()
            .filter_map(|tx| tx.to_whale(random_side(&mut rng, 0.5)))
            .filter(|tx| tx.amount_usd >= min_value_usd)
            .take(MAX_REPORTED)
            .collect())
    }
}

#[async_trait]
impl WhaleSource for FreeWhaleTracker {
    async fn recent_transactions(
        &self,
        blockchain: Option<Blockchain>,
        min_value_usd: f64,
    ) -> Result<WhaleReport, DataError> {
        let mut transactions = Vec::new();

        if matches!(blockchain, None | Some(Blockchain::Bitcoin)) {
            match self.bitcoin_transactions(min_value_usd).await {
                Ok(bitcoin) if !bitcoin.is_empty() => transactions.extend(bitcoin),
                Ok(_) => transactions.extend(generate(&mut rand::rng(), Utc::now())),
                Err(error) => {
                    warn!(%error, "bitcoin whale tracking failed, generating data");
                    transactions.extend(generate(&mut rand::rng(), Utc::now()));
                }
            }
        }

        // No free Ethereum source carries transaction values
        if matches!(blockchain, None | Some(Blockchain::Ethereum)) {
            transactions.extend(generate(&mut rand::rng(), Utc::now()));
        }

        if transactions.is_empty() {
            transactions = generate(&mut rand::rng(), Utc::now());
        }

        Ok(WhaleReport::new(transactions))
    }
}

/// Generate 3 to 5 whale transactions from the last two hours, newest first.
pub fn generate<R>(rng: &mut R, now: DateTime<Utc>) -> Vec<WhaleTransaction>
where
    R: Rng + ?Sized,
{
    const CHAINS: [Blockchain; 3] = [
        Blockchain::Bitcoin,
        Blockchain::Ethereum,
        Blockchain::BinanceSmartChain,
    ];

    let count = rng.random_range(3..=5);
    let mut transactions: Vec<WhaleTransaction> = (0..count)
        .map(|_| WhaleTransaction {
            id: generate_id(rng),
            blockchain: CHAINS[rng.random_range(0..CHAINS.len())],
            amount_usd: f64::from(rng.random_range(500_000_u32..5_500_000)),
            timestamp: now - TimeDelta::milliseconds(rng.random_range(0..7_200_000)),
            side: random_side(rng, 0.4),
            confidence: Some("simulated".to_string()),
        })
        .collect();

    transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    transactions
}

fn random_side<R>(rng: &mut R, buy_probability: f64) -> WhaleSide
where
    R: Rng + ?Sized,
{
    if rng.random_bool(buy_probability) {
        WhaleSide::Buy
    } else {
        WhaleSide::Sell
    }
}

fn generate_id<R>(rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();

    format!("tx_{suffix}")
}
