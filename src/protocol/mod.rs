//! Wire protocol of the dashboard channel
//!
//! - [`inbound`] - Tagged inbound messages and their per-kind decoders
//! - [`outbound`] - Subscribe, command and training requests
//! - `lenient` - Number/string tolerant field decoders

pub mod inbound;
mod lenient;
pub mod outbound;

pub use inbound::{
    decode, Decoded, DeviceDescriptor, GlobalWeights, InboundMessage, IpData, MatrixPayload,
    TrafficReport, TrainingComplete,
};
pub use outbound::OutboundMessage;
