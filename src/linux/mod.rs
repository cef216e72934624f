//! Linux character device backed links.

mod ioctl;
pub mod swic;

pub use self::swic::Swic;
