// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for generative-text API integrations.

use async_trait::async_trait;

use crate::error::MurmurError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for generation provider integrations.
///
/// A provider turns an instruction plus an ordered turn sequence into
/// generated text. Failures carry a [`ProviderErrorKind`] classification
/// so callers never inspect error messages.
///
/// [`ProviderErrorKind`]: crate::types::ProviderErrorKind
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a generation request and returns the full response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MurmurError>;
}
