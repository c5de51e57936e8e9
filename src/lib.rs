// SPDX-License-Identifier: MIT

//! Compiles task-dependency workflows into Oozie `workflow-app` documents.

pub mod error;
pub mod workflow;
