#![allow(
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

mod acquisition;
mod ask_tell;
mod builder;
mod failures;
mod objective;
mod scenarios;
