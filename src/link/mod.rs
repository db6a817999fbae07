pub mod fragment;
pub mod lbt;
pub mod packet;
pub mod reassembler;
pub mod receiver;
pub mod sender;
pub mod state;
