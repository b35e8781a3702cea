//! Polyclinic - prescription intake service.
//!
//! Reads patient names off prescription photographs, files the images by
//! patient, and keeps patient and prescription records behind a small
//! authenticated HTTP API.

pub mod auth;
pub mod cli;
pub mod config;
pub mod extraction;
pub mod models;
pub mod ocr;
pub mod repository;
pub mod server;
pub mod storage;
pub mod utils;
