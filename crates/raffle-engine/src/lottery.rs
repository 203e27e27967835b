//! # External Lottery Draw
//!
//! Raffles configured with `use_lottery_integration` take their winning
//! number from an external draw. Only the contract lives here; a real
//! integration is deployment specific.

use raffle_store::Raffle;

/// Supplies the winning number for a `selection_number` raffle.
pub trait LotteryDraw: Send + Sync {
    /// The drawn number for `raffle`, or `None` if the draw has not
    /// happened yet. The engine normalizes the returned string before
    /// matching it against entries.
    fn winning_number(&self, raffle: &Raffle) -> Option<String>;
}

/// A draw that never produces a number. Installed when no integration is
/// configured, so lottery raffles fail with `WinningNumberUnavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLotteryDraw;

impl LotteryDraw for NoLotteryDraw {
    fn winning_number(&self, _raffle: &Raffle) -> Option<String> {
        None
    }
}
