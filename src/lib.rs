/*
 * Responsibility
 * - モジュール公開 (integration test から参照できるようにする)
 * - ロジックは置かない
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
