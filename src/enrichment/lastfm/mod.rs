//! Last.fm API integration
//!
//! Artist images, album covers and release dates from the Last.fm web
//! service. Every request needs an API key.
//!
//! API docs: https://www.last.fm/api

pub mod adapter;
mod client;
pub mod dto;

pub use client::LastFmClient;
