// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Literal placeholder substitution over named text resources.

pub mod engine;
pub mod store;

pub use engine::{create_key, render, Substitutions};
pub use store::TemplateStore;
