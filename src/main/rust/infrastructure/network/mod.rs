mod audio_relay;
mod port_allocator;

pub use audio_relay::AudioRelay;
pub use port_allocator::{PortAllocator, ReservedUdpPort, SingleClientListener};
