//! Financial Engine: amortization math, credit scoring, loan offers and
//! lifecycle, penalties, and government-scheme eligibility. Every function is
//! a pure calculator over explicit inputs; no I/O, no ambient state.

pub mod credit;
pub mod emi;
pub mod loans;
pub mod offers;
pub mod schemes;

pub use credit::*;
pub use emi::*;
pub use loans::*;
pub use offers::*;
pub use schemes::*;
