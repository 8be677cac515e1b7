//! Domain model: banks, accounts, pix keys, transactions, the event codec and
//! the ports the application layer depends on.

pub mod account;
pub mod event;
pub mod ports;
pub mod transaction;
