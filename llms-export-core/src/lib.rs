#![doc = "llms-export-core: core logic library for llms-export."]

//! This crate contains the data models and export pipeline that turn a
//! documentation tree into plain text for LLM consumption.
//! Transport concerns (CLI, HTTP) live in the `llms-export` crate.
//!
//! # Usage
//! Load a [`loader::FsContentSource`], then call [`export::llm_text`] for a
//! single page or [`corpus::aggregate`] for a whole section.

pub mod config;
pub mod contract;
pub mod corpus;
pub mod export;
pub mod loader;
pub mod openapi;
pub mod section;
