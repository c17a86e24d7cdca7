//! # wisdom-way
//!
//! A web service that answers a topic with a passage from the world's
//! religious, spiritual, and philosophical texts, explains it, and shows
//! how other traditions said the same thing.
//!
//! ## Architecture
//!
//! Each search is a short pipeline around a hosted language model:
//!
//! ```text
//!              ┌──────────────────────────┐
//!              │ query + mode + source?   │
//!              └────────────┬─────────────┘
//!                           ▼
//!              ┌──────────────────────────┐
//!              │ Normalize                │  too short / bad mode ⇒ 400,
//!              │ sentinel source ⇒ none   │  no model call
//!              └────────────┬─────────────┘
//!                           ▼
//!              ┌──────────────────────────┐
//!              │ Verse prompt             │
//!              │ strict (one source) or   │
//!              │ general (mode category)  │
//!              └────────────┬─────────────┘
//!                           ▼
//!              ┌──────────────────────────┐
//!              │ Retrieve verse (1 call)  │──── null ──► all-null result
//!              └────────────┬─────────────┘
//!                           │ verse
//!              ┌────────────┴─────────────┐
//!              ▼                          ▼
//!      ┌───────────────┐         ┌─────────────────┐
//!      │ Analysis      │         │ Parallels       │
//!      │               │         │ minus own       │
//!      │               │         │ tradition       │
//!      └───────┬───────┘         └────────┬────────┘
//!              └────────────┬─────────────┘
//!                           ▼ both or fail
//!              ┌──────────────────────────┐
//!              │ Assemble SearchResult    │
//!              └──────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for the server and LLM provider
//! - [`error`] - `WisdomError`: validation vs. model service failures
//! - [`models`] - Modes, verses, analyses, results, and request/response types
//! - [`llm`] - The `ModelClient` capability and its Gemini / OpenAI / Ollama adapters
//! - [`search`] - Normalizer, prompts, retrieval, enrichment, assembly, and extras
//! - [`api`] - Axum HTTP handlers
//! - [`state`] - Shared application state

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod search;
pub mod state;
