// SPDX-License-Identifier: MIT

pub mod action;
pub mod builder;
pub mod emitter;
pub mod graph;
pub mod loader;
pub mod resolver;
pub mod types;
