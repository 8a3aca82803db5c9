#![allow(async_fn_in_trait)]

pub mod bump;
pub mod commands;
pub mod context;
pub mod gacha;
pub mod time;
pub mod utils;
