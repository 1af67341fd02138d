mod packet;
mod socketio;

pub use self::packet::{Handshake, Packet, PacketError};
pub use self::socketio::SocketIoChannel;
