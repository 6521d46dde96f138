use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use super::{ensure_success, http_client, ProviderError};
use crate::analytics::Direction;
use crate::database::models::NewTrade;

const PROVIDER: &str = "Covalent";

/// BNB Smart Chain
pub const CHAIN_ID: &str = "56";

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<EnvelopeData>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    items: Option<Vec<ChainTransaction>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainTransaction {
    pub tx_hash: String,
    pub block_signed_at: DateTime<Utc>,
    #[serde(default)]
    pub log_events: Option<Vec<LogEvent>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogEvent {
    pub sender_contract_decimals: Option<u32>,
    pub sender_contract_ticker_symbol: Option<String>,
    pub decoded: Option<DecodedEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecodedEvent {
    pub name: String,
    pub params: Option<Vec<DecodedParam>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecodedParam {
    pub value: Option<Value>,
}

/// A decoded `Transfer(from, to, value)` log. `amount` is the value scaled
/// by the token's decimals, or `None` when either is missing.
#[derive(Debug, Clone, PartialEq)]
struct Transfer<'a> {
    from: &'a str,
    to: &'a str,
    amount: Option<f64>,
    ticker: &'a str,
}

fn param_str(params: &[DecodedParam], index: usize) -> Option<&str> {
    params.get(index)?.value.as_ref()?.as_str()
}

fn scaled_amount(params: &[DecodedParam], decimals: Option<u32>) -> Option<f64> {
    let raw = match params.get(2)?.value.as_ref()? {
        Value::String(s) => s.parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    Some(raw / 10f64.powi(decimals? as i32))
}

impl LogEvent {
    /// Every `Transfer` with params counts toward classification, including
    /// ones whose amount cannot be read (NFTs, missing decimals).
    fn transfer(&self) -> Option<Transfer<'_>> {
        let decoded = self.decoded.as_ref().filter(|d| d.name == "Transfer")?;
        let params = decoded.params.as_deref()?;

        Some(Transfer {
            from: param_str(params, 0).unwrap_or_default(),
            to: param_str(params, 1).unwrap_or_default(),
            amount: scaled_amount(params, self.sender_contract_decimals),
            ticker: self.sender_contract_ticker_symbol.as_deref().unwrap_or_default(),
        })
    }
}

fn positive(amount: Option<f64>) -> Option<f64> {
    amount.filter(|a| *a > 0.0)
}

impl ChainTransaction {
    /// Reads a swap (one token out, one token in) or a plain receive out of
    /// the transaction's transfer logs. Anything else yields `None`.
    pub fn decode(&self, wallet: &str, user_id: Uuid) -> Option<NewTrade> {
        let transfers: Vec<Transfer<'_>> = self
            .log_events
            .iter()
            .flatten()
            .filter_map(LogEvent::transfer)
            .collect();

        let trade = |symbol: String, price: f64, quantity: f64, notes: String| NewTrade {
            user_id,
            symbol,
            direction: Direction::Long,
            entry_price: price,
            exit_price: price,
            quantity,
            notes,
            exchange_trade_id: None,
            tx_hash: Some(self.tx_hash.clone()),
            created_at: self.block_signed_at,
        };

        match transfers.as_slice() {
            [] => None,
            [only] => {
                if !only.to.eq_ignore_ascii_case(wallet) {
                    return None;
                }
                let amount = positive(only.amount)?;
                Some(trade(
                    format!("{}/USD", only.ticker),
                    0.0,
                    amount,
                    format!("Received {:.4} {}", amount, only.ticker),
                ))
            }
            many => {
                let sent = many.iter().find(|t| t.from.eq_ignore_ascii_case(wallet))?;
                let received = many.iter().find(|t| t.to.eq_ignore_ascii_case(wallet))?;
                let amount_out = positive(sent.amount)?;
                let amount_in = positive(received.amount)?;

                let price = amount_out / amount_in;
                Some(trade(
                    format!("{}/{}", received.ticker, sent.ticker),
                    price,
                    amount_in,
                    format!(
                        "Swap {:.4} {} for {:.4} {}",
                        amount_out, sent.ticker, amount_in, received.ticker
                    ),
                ))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CovalentClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CovalentClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(PROVIDER)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn transactions_url(&self, wallet: &str, key: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::invalid(PROVIDER, "base URL cannot carry a path"))?
            .pop_if_empty()
            .extend([CHAIN_ID, "address", wallet, "transactions_v2", ""]);
        url.query_pairs_mut().append_pair("key", key);
        Ok(url)
    }

    /// Recent transactions of `wallet`; an empty list when Covalent has none
    pub async fn transactions(&self, wallet: &str) -> Result<Vec<ChainTransaction>, ProviderError> {
        let key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey(PROVIDER))?;
        let url = self.transactions_url(wallet, key)?;

        let response = self.client.get(url).send().await.map_err(ProviderError::http(PROVIDER))?;
        let envelope = ensure_success(PROVIDER, response)
            .await?
            .json::<Envelope>()
            .await
            .map_err(ProviderError::decode(PROVIDER))?;

        Ok(envelope.data.and_then(|d| d.items).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const WALLET: &str = "0xAbC0000000000000000000000000000000000001";
    const POOL: &str = "0x9990000000000000000000000000000000000999";

    fn transfer(from: &str, to: &str, value: &str, decimals: u32, ticker: &str) -> Value {
        json!({
            "sender_contract_decimals": decimals,
            "sender_contract_ticker_symbol": ticker,
            "decoded": {
                "name": "Transfer",
                "params": [{ "value": from }, { "value": to }, { "value": value }]
            }
        })
    }

    fn tx(events: Vec<Value>) -> ChainTransaction {
        serde_json::from_value(json!({
            "tx_hash": "0xdeadbeef",
            "block_signed_at": "2024-03-01T12:00:00Z",
            "log_events": events
        }))
        .unwrap()
    }

    #[test]
    fn decodes_swap() {
        let wallet = WALLET.to_lowercase();
        let t = tx(vec![
            transfer(&wallet, POOL, "200000000000000000000", 18, "USDT"),
            transfer(POOL, &wallet, "500000000000000000", 18, "BNB"),
        ]);

        let trade = t.decode(WALLET, Uuid::nil()).unwrap();
        assert_eq!(trade.symbol, "BNB/USDT");
        assert_eq!(trade.entry_price, 400.0);
        assert_eq!(trade.quantity, 0.5);
        assert_eq!(trade.notes, "Swap 200.0000 USDT for 0.5000 BNB");
        assert_eq!(trade.tx_hash.as_deref(), Some("0xdeadbeef"));
    }

    #[test]
    fn decodes_receive() {
        let t = tx(vec![transfer(POOL, WALLET, "2500000", 6, "USDC")]);
        let trade = t.decode(&WALLET.to_uppercase(), Uuid::nil()).unwrap();
        assert_eq!(trade.symbol, "USDC/USD");
        assert_eq!(trade.entry_price, 0.0);
        assert_eq!(trade.quantity, 2.5);
        assert_eq!(trade.notes, "Received 2.5000 USDC");
    }

    #[test]
    fn ignores_unrelated_transactions() {
        // single outgoing transfer
        let single = tx(vec![transfer(WALLET, POOL, "1000", 0, "CAKE")]);
        assert!(single.decode(WALLET, Uuid::nil()).is_none());
        // two transfers that never reach the wallet
        let other = "0x1110000000000000000000000000000000000111";
        let t = tx(vec![transfer(WALLET, POOL, "1", 0, "A"), transfer(POOL, other, "1", 0, "B")]);
        assert!(t.decode(WALLET, Uuid::nil()).is_none());
        // non-transfer logs
        let approval = json!({
            "sender_contract_decimals": 18,
            "decoded": { "name": "Approval", "params": [] }
        });
        assert!(tx(vec![approval]).decode(WALLET, Uuid::nil()).is_none());
        // no logs at all
        assert!(tx(vec![]).decode(WALLET, Uuid::nil()).is_none());
    }

    #[test]
    fn unreadable_transfers_still_count_toward_the_shape() {
        let nft = json!({
            "sender_contract_decimals": null,
            "sender_contract_ticker_symbol": "NFT",
            "decoded": {
                "name": "Transfer",
                "params": [{ "value": POOL }, { "value": WALLET }, { "value": "7" }]
            }
        });
        let t = tx(vec![nft, transfer(POOL, WALLET, "1000000", 6, "USDT")]);

        // Two transfers with nothing sent from the wallet is neither a swap nor a receive
        assert!(t.decode(WALLET, Uuid::nil()).is_none());
    }

    #[test]
    fn receive_without_decimals_is_skipped() {
        let mut event = transfer(POOL, WALLET, "1000000", 6, "USDT");
        event["sender_contract_decimals"] = Value::Null;
        assert!(tx(vec![event]).decode(WALLET, Uuid::nil()).is_none());
    }

    #[test]
    fn builds_chain_scoped_url() {
        let client = CovalentClient::new("https://api.covalenthq.com/v1", None).unwrap();
        let url = client.transactions_url(WALLET, "ckey").unwrap();
        assert_eq!(
            url.as_str(),
            format!("https://api.covalenthq.com/v1/56/address/{}/transactions_v2/?key=ckey", WALLET)
        );
    }

    #[tokio::test]
    async fn missing_key_fails_before_request() {
        let client = CovalentClient::new("http://127.0.0.1:1", None).unwrap();
        assert!(matches!(
            client.transactions(WALLET).await,
            Err(ProviderError::MissingApiKey("Covalent"))
        ));
    }

    #[tokio::test]
    async fn fetches_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/56/address/{}/transactions_v2/", WALLET)))
            .and(query_param("key", "ckey"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "items": [{
                    "tx_hash": "0x1",
                    "block_signed_at": "2024-03-01T12:00:00Z",
                    "log_events": null
                }] }
            })))
            .mount(&server)
            .await;

        let client = CovalentClient::new(&server.uri(), Some("ckey".into())).unwrap();
        let items = client.transactions(WALLET).await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].decode(WALLET, Uuid::nil()).is_none());
    }
}
