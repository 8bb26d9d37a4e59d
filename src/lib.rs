//! A raw-socket HTTP(S) client built for request-smuggling research: it
//! implements its own TCP three-way handshake and segment framing
//! instead of going through the kernel's stream socket, and it builds
//! the intentionally-malformed CL.TE/TE.CL/TE.TE request shapes that
//! test those desync conditions.
//!
//! Requires `CAP_NET_RAW` (or root) to open the underlying raw socket;
//! see [`raw_socket::RawSocket::has_capabilities`].

pub mod bio;
pub mod checksum;
pub mod config;
pub mod connection;
pub mod error;
pub mod flags;
pub mod http;
pub mod logging;
pub mod net;
pub mod packet;
pub mod raw_socket;
pub mod session;
pub mod state_machine;
pub mod tls;

pub use connection::{TcpConnection, TcpEndpoint};
pub use error::{HaquestsError, Result};
pub use flags::TcpFlags;
pub use session::SessionTicket;
pub use state_machine::{StateMachine, TcpState};
pub use tls::TlsSession;
