//! # FAQ Responder
//!
//! A retrieval-augmented question-answering webhook for WhatsApp support.
//!
//! Each inbound message is embedded, matched against a small FAQ corpus held
//! in an in-memory vector index, and answered by a chat model instructed to
//! use only the retrieved entries. The answer goes back to Twilio as TwiML
//! in the same HTTP response.
//!
//! ## Architecture
//!
//! ```text
//!  startup                          per request
//! ┌──────────┐   ┌──────────┐      ┌──────────┐   ┌────────────┐   ┌──────────┐
//! │  Corpus  │──▶│  Index   │◀─────│ Composer │──▶│ Chat model │   │  TwiML   │
//! │  (JSON)  │   │ (L2, RAM)│      └────▲─────┘   └────────────┘   └────▲─────┘
//! └──────────┘   └──────────┘           │                               │
//!                                  ┌────┴───────────────────────────────┴┐
//!                                  │        POST /whatsapp (axum)         │
//!                                  └──────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and API key |
//! | [`models`] | Core data types |
//! | [`corpus`] | FAQ corpus loading |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`index`] | In-memory nearest-neighbour index |
//! | [`chat`] | Chat-completion client |
//! | [`prompt`] | Prompt template and answer clean-up |
//! | [`composer`] | Retrieval-augmented answering |
//! | [`twiml`] | TwiML reply envelope |
//! | [`app`] | Startup and shared context |
//! | [`server`] | Webhook HTTP server |
//! | [`error`] | Error types |

pub mod app;
pub mod chat;
pub mod composer;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod index;
pub mod models;
pub mod prompt;
pub mod server;
pub mod twiml;
