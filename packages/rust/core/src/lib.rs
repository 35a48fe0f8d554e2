//! Screening orchestration for cvscreen.
//!
//! This crate registers the screening tools, builds the recruiter
//! instructions, and runs the deterministic [`ScreeningAgent`] that turns one
//! resume into a verdict and a [`StructuredResult`](cvscreen_shared::StructuredResult).

pub mod agent;
pub mod instructions;
pub mod screening;
pub mod tools;

pub use agent::{AgentRequest, AgentResponse, AgentRuntime, EntryKind, TranscriptEntry, render_response};
pub use instructions::build_instructions;
pub use screening::{ScreeningAgent, ScreeningPolicy, ScreeningProgress, SilentProgress};
pub use tools::{TOOL_SPECS, ToolSpec, Toolbox};
