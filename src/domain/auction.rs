//! Auction bid break-even calculator.
//!
//! The winning bid is paid out to the rest of the party. Break-even is the
//! bid at which the winner's net equals an equal split of the proceeds:
//! `net * (party - 1) / party`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marketplace fee rate applied to the sale price.
pub const MARKET_FEE_RATE: f64 = 0.05;
pub const PARTY_SIZES: [u32; 3] = [4, 8, 16];
pub const DEFAULT_PARTY_SIZE: u32 = 4;
/// Suggested bids as fractions of break-even.
pub const BID_TIERS: [f64; 3] = [0.93, 0.96, 0.99];

const EVEN_TOLERANCE: f64 = 0.01;

/// Fee is 5% floored with a minimum of 1, waived at or below 1.
pub fn market_fee(price: f64) -> f64 {
    if price > 1.0 {
        (price * MARKET_FEE_RATE).floor().max(1.0)
    } else {
        0.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionQuote {
    pub market_price: f64,
    pub party_size: u32,
    pub fee: f64,
    pub net_price: f64,
    pub break_even: f64,
    pub suggested_bids: [f64; 3],
}

impl AuctionQuote {
    /// `None` for a missing or non-positive price.
    pub fn new(market_price: f64, party_size: u32) -> Option<Self> {
        if !market_price.is_finite() || market_price <= 0.0 {
            return None;
        }
        let party_size = party_size.max(1);
        let party = f64::from(party_size);

        let fee = market_fee(market_price);
        let net_price = market_price - fee;
        let break_even = net_price * (party - 1.0) / party;

        Some(Self {
            market_price,
            party_size,
            fee,
            net_price,
            break_even,
            suggested_bids: BID_TIERS.map(|tier| break_even * tier),
        })
    }

    pub fn analyze_bid(&self, bid: f64) -> Option<BidAnalysis> {
        if !bid.is_finite() || bid <= 0.0 {
            return None;
        }
        let party = f64::from(self.party_size);
        let my_share = self.net_price - bid + bid / party;
        let others_share = bid / party;

        let outcome = if (bid - self.break_even).abs() < EVEN_TOLERANCE {
            BidOutcome::Even
        } else if bid < self.break_even {
            BidOutcome::Profit
        } else {
            BidOutcome::Loss
        };

        Some(BidAnalysis {
            bid,
            my_share,
            others_share,
            difference: self.break_even - bid,
            profit_rate: (my_share - others_share) / others_share * 100.0,
            outcome,
        })
    }
}

impl fmt::Display for AuctionQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Market price: {:.2}", self.market_price)?;
        writeln!(f, "Fee:          {:.0}", self.fee)?;
        writeln!(f, "Net:          {:.2}", self.net_price)?;
        writeln!(
            f,
            "Break-even ({}-player party): {:.2}",
            self.party_size, self.break_even
        )?;
        for (tier, bid) in BID_TIERS.iter().zip(self.suggested_bids.iter()) {
            writeln!(f, "  {:.0}% bid: {:.2}", tier * 100.0, bid)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BidOutcome {
    Profit,
    Loss,
    Even,
}

impl BidOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            BidOutcome::Profit => "profit",
            BidOutcome::Loss => "loss",
            BidOutcome::Even => "break-even",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidAnalysis {
    pub bid: f64,
    pub my_share: f64,
    pub others_share: f64,
    pub difference: f64,
    pub profit_rate: f64,
    pub outcome: BidOutcome,
}
