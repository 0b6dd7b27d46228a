// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relay loop and message pipeline for Murmur.
//!
//! The [`AgentLoop`] receives messages from the channel adapter and spawns
//! one detached [`Pipeline`] pass per message. Passes are independent:
//! concurrent messages from the same user interleave by arrival order, and
//! a failing pass never affects its neighbors.

pub mod context;
pub mod pipeline;
pub mod responder;
pub mod shutdown;

use std::sync::Arc;

use murmur_core::{ChannelAdapter, MurmurError};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub use pipeline::Pipeline;
pub use responder::Responder;

/// The relay loop: channel intake fanned out to detached pipeline passes.
pub struct AgentLoop {
    channel: Arc<dyn ChannelAdapter>,
    pipeline: Arc<Pipeline>,
}

impl AgentLoop {
    pub fn new(channel: Arc<dyn ChannelAdapter>, pipeline: Arc<Pipeline>) -> Self {
        Self { channel, pipeline }
    }

    /// Runs until the cancellation token fires or the channel closes.
    ///
    /// Each inbound message is handed to its own task immediately, so a
    /// slow generation never blocks intake.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), MurmurError> {
        info!("relay loop running");

        loop {
            tokio::select! {
                msg = self.channel.receive() => {
                    match msg {
                        Ok(inbound) => {
                            let pipeline = self.pipeline.clone();
                            tokio::spawn(pipeline.process(inbound));
                        }
                        Err(e) => {
                            error!(error = %e, "channel receive error, stopping relay loop");
                            break;
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping relay loop");
                    break;
                }
            }
        }

        info!("relay loop stopped");
        Ok(())
    }
}
