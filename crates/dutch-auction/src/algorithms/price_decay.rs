//! # Price Decay
//!
//! Linear decrement per elapsed step, floored at the reserve.

use crate::domain::{Amount, Auction, AuctionError, Step};

/// Opening price: `reserve + duration * decrement`.
pub fn initial_price(
    reserve_price: Amount,
    duration_steps: Step,
    price_decrement: Amount,
) -> Result<Amount, AuctionError> {
    price_decrement
        .checked_mul(Amount::from(duration_steps))
        .and_then(|span| span.checked_add(reserve_price))
        .ok_or(AuctionError::PriceOverflow)
}

/// Price after `elapsed` steps.
///
/// Never drops below `reserve_price`, even for `elapsed` beyond the window.
pub fn price_after(
    initial_price: Amount,
    reserve_price: Amount,
    price_decrement: Amount,
    elapsed: Step,
) -> Amount {
    let decay = price_decrement
        .checked_mul(Amount::from(elapsed))
        .unwrap_or(Amount::MAX);
    initial_price.saturating_sub(decay).max(reserve_price)
}

/// Price of `auction` at `now_step`.
pub fn current_price(auction: &Auction, now_step: Step) -> Result<Amount, AuctionError> {
    let elapsed = now_step
        .checked_sub(auction.start_step())
        .ok_or(AuctionError::BeforeStart {
            now: now_step,
            start: auction.start_step(),
        })?;

    Ok(price_after(
        auction.initial_price(),
        auction.reserve_price(),
        auction.price_decrement(),
        elapsed,
    ))
}
