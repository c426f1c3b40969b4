//! Background jobs that run beside request handling.

pub mod token_sweep;
