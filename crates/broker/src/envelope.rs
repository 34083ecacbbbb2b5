// SPDX-License-Identifier: MIT

//! The inbound message envelope and the identity binding that accompanies it.

use foreman_core::BindingId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A free-form command directed at the workspace from a messaging channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEnvelope {
    pub channel: String,
    pub channel_tenant_id: String,
    pub channel_conversation_id: String,
    pub request_id: String,
    pub repo_root: String,
    pub command_text: String,
    #[serde(default)]
    pub target_type: Option<String>,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Assurance tier carried by a linked identity, from lowest to highest trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssuranceTier {
    Unverified,
    Verified,
    Elevated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityBinding {
    pub binding_id: BindingId,
    pub assurance_tier: AssuranceTier,
}
