//! Ad Rewards Bot Library
//!
//! A Telegram bot that rewards users for viewing ads.
//!
//! This crate provides the core functionality for:
//! - Loading and validating the bot settings and ad catalog
//! - Keeping a persisted ledger of clicks and referrals
//! - Handling `/start` and the inline menu buttons
//! - Sending the admin a daily summary and resetting the counters

pub mod commands;
pub mod config;
pub mod ledger;
pub mod rollover;
pub mod telegram;
