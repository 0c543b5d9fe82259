//! Inbound adapters that translate monitor traffic into tracker service
//! calls while keeping file formats at the edge.
//!
//! Recorded monitor deliveries are replayed through [`replay`].

pub mod replay;
